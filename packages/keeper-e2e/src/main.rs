//! Keeper E2E suite CLI
//!
//! Runs the S1–S6 sync scenarios against a live server through the real
//! client binary.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use keeper_e2e::{report, run_all_tests, tests, E2eConfig};

#[derive(Parser)]
#[command(name = "keeper-e2e")]
#[command(about = "E2E scenario suite for the keeper vault", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenarios
    Run {
        /// Run only the scenario with this name (e.g. s5_tombstone_propagation)
        #[arg(short, long)]
        test: Option<String>,
    },

    /// Check that the server is reachable
    Status,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let config = E2eConfig::load();

    match cli.command {
        Commands::Status => {
            tests::check_server(&config).await?;
            println!("server reachable at {}", config.server_address);
            Ok(())
        }
        Commands::Run { test } => {
            let results = match test {
                Some(name) => {
                    tests::check_server(&config).await?;
                    let result = match name.as_str() {
                        "s1_text_round_trip" => tests::test_text_round_trip(&config).await,
                        "s2_encrypted_card" => tests::test_encrypted_card(&config).await,
                        "s3_encrypted_credentials" => {
                            tests::test_encrypted_credentials(&config).await
                        }
                        "s4_binary_round_trip" => tests::test_binary_round_trip(&config).await,
                        "s5_tombstone_propagation" => {
                            tests::test_tombstone_propagation(&config).await
                        }
                        "s6_lww_conflict" => tests::test_lww_conflict(&config).await,
                        other => keeper_e2e::TestResult::skip(other, "unknown scenario"),
                    };
                    vec![result]
                }
                None => run_all_tests(&config).await,
            };
            if report(&results) {
                Ok(())
            } else {
                std::process::exit(1);
            }
        }
    }
}
