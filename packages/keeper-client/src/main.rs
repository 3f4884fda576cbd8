use clap::Parser;
use keeper_client::cli::{Cli, Command};
use keeper_client::remote::Remote;
use keeper_client::service::ClientService;
use keeper_client::commands;
use keeper_core::crypto::Dealer;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // One CLI invocation performs one action; a current-thread runtime
    // is enough.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(Cli::parse()))
}

async fn run(cli: Cli) -> eyre::Result<()> {
    init_logging();

    let remote = Remote::new(&cli.common.address)?;
    let service = ClientService::open(&cli.common.working_dir, remote)?;

    let session = service
        .authenticate(&cli.common.user_login, &cli.common.user_password)
        .await?;
    let user = session.user.clone();

    // Key material is user-specific: the server-assigned id plus login.
    let dealer = Dealer::new(&format!("{}{}", user.id, user.login));

    match cli.command {
        Command::Text { action, text } => {
            commands::text::run(&service, &user, &action, text)?;
        }
        Command::Card {
            action,
            number,
            cvc,
            holder,
        } => {
            commands::card::run(&service, &user, &dealer, &action, number, cvc, holder)?;
        }
        Command::Cred {
            action,
            login,
            password,
        } => {
            commands::credentials::run(&service, &user, &dealer, &action, login, password)?;
        }
        Command::File { action, file } => {
            commands::binary::run(&service, &user, &dealer, &action, file)?;
        }
        Command::Sync => {
            commands::sync::run(&service, &session, &cli.common.user_password).await?;
        }
    }
    Ok(())
}

/// Diagnostics go to stderr so stdout stays scriptable.
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,keeper_client=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
