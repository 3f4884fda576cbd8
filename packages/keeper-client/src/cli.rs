//! Command-line surface: five subcommands sharing the account/working
//! directory flags, with environment overrides.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "keeper-client")]
#[command(about = "Offline-capable personal secrets vault client", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct CommonArgs {
    /// Vault account login
    #[arg(long = "ul", env = "USER_LOGIN", global = true, default_value = "")]
    pub user_login: String,

    /// Vault account password
    #[arg(long = "up", env = "USER_PASSWORD", global = true, default_value = "")]
    pub user_password: String,

    /// Working directory holding the local store
    #[arg(long = "wd", env = "WORKING_DIR", global = true, default_value = "keeper-data")]
    pub working_dir: PathBuf,

    /// Server address (host:port or full URL)
    #[arg(long = "addr", env = "RUN_ADDRESS", global = true, default_value = "127.0.0.1:8081")]
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Action {
    Get,
    Save,
    Delete,
}

#[derive(Args)]
pub struct ActionArgs {
    /// Action to perform
    #[arg(long = "a", value_enum)]
    pub action: Action,

    /// Item id (get, delete, or save of an existing item)
    #[arg(long = "id")]
    pub id: Option<Uuid>,

    /// Whether the item is newly minted on this device
    #[arg(long = "in", default_value_t = true, action = clap::ArgAction::Set)]
    pub new_on_device: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Text notes
    Text {
        #[command(flatten)]
        action: ActionArgs,

        /// Note body
        #[arg(long = "t")]
        text: Option<String>,
    },

    /// Payment cards (stored encrypted)
    Card {
        #[command(flatten)]
        action: ActionArgs,

        /// Card number
        #[arg(long = "n")]
        number: Option<String>,

        /// Card verification code
        #[arg(long = "c")]
        cvc: Option<String>,

        /// Holder name
        #[arg(long = "hn")]
        holder: Option<String>,
    },

    /// Login/password pairs (stored encrypted)
    Cred {
        #[command(flatten)]
        action: ActionArgs,

        /// Stored login
        #[arg(long = "l")]
        login: Option<String>,

        /// Stored password
        #[arg(long = "p")]
        password: Option<String>,
    },

    /// Binary files (stored encrypted)
    File {
        #[command(flatten)]
        action: ActionArgs,

        /// Path of the file to store
        #[arg(long = "f")]
        file: Option<PathBuf>,
    },

    /// Synchronize the local store with the server
    Sync,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_save() {
        let cli = Cli::try_parse_from([
            "keeper-client",
            "text",
            "--ul",
            "denis",
            "--up",
            "secret",
            "--wd",
            "devices/a",
            "--a",
            "save",
            "--t",
            "Denis the best",
            "--in",
            "true",
        ])
        .unwrap();
        assert_eq!(cli.common.user_login, "denis");
        assert_eq!(cli.common.working_dir, PathBuf::from("devices/a"));
        match cli.command {
            Command::Text { action, text } => {
                assert_eq!(action.action, Action::Save);
                assert!(action.new_on_device);
                assert_eq!(text.as_deref(), Some("Denis the best"));
            }
            _ => panic!("expected text subcommand"),
        }
    }

    #[test]
    fn parses_card_get_by_id() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "keeper-client",
            "card",
            "--ul",
            "denis",
            "--up",
            "secret",
            "--a",
            "get",
            "--id",
            &id.to_string(),
        ])
        .unwrap();
        match cli.command {
            Command::Card { action, .. } => {
                assert_eq!(action.action, Action::Get);
                assert_eq!(action.id, Some(id));
            }
            _ => panic!("expected card subcommand"),
        }
    }

    #[test]
    fn new_flag_accepts_false() {
        let cli = Cli::try_parse_from([
            "keeper-client",
            "text",
            "--a",
            "save",
            "--t",
            "edited",
            "--in",
            "false",
        ])
        .unwrap();
        match cli.command {
            Command::Text { action, .. } => assert!(!action.new_on_device),
            _ => panic!("expected text subcommand"),
        }
    }

    #[test]
    fn sync_needs_no_action() {
        let cli = Cli::try_parse_from(["keeper-client", "sync", "--ul", "denis", "--up", "pw"])
            .unwrap();
        assert!(matches!(cli.command, Command::Sync));
    }
}
