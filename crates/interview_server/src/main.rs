//! Interview Escape - server and professor dashboard CLI.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use interview_server::{AppConfig, AppState, db::ResultRepository, router};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,interview_server=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port, host } => {
            let config = match host {
                Some(host) => config.with_host(host),
                None => config,
            };
            let config = match port {
                Some(port) => config.with_port(port),
                None => config,
            };
            run_server(config).await
        }
        Command::Results => print_results(&config),
    }
}

/// Run the HTTP game server
#[instrument(skip(config), fields(address = %config.bind_address()))]
async fn run_server(config: AppConfig) -> Result<()> {
    let address = config.bind_address();
    let state = AppState::from_config(config)?;
    state.repository.migrate()?;

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server ready at http://{}/", address);
    axum::serve(listener, router(state)).await?;

    info!("Server stopped");
    Ok(())
}

/// Print the professor dashboard
#[instrument(skip(config), fields(db = %config.database_path()))]
fn print_results(config: &AppConfig) -> Result<()> {
    let repository = ResultRepository::new(config.database_path().clone())?;
    repository.migrate()?;
    let summary = repository.summary()?;

    if summary.results().is_empty() {
        println!("Aucun résultat enregistré.");
        return Ok(());
    }

    println!(
        "{:<17} {:<28} {:<12} {:<14} {:>6}  L1 L2 L3 L4 L5",
        "Date", "Étudiant", "Groupe", "Spécialité", "Score"
    );
    for result in summary.results() {
        let levels = result
            .level_scores()
            .iter()
            .map(|points| format!("{:>2}", points))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "{:<17} {:<28} {:<12} {:<14} {:>5}%  {}",
            result.created_at().format("%Y-%m-%d %H:%M"),
            format!("{} {}", result.first_name(), result.last_name()),
            result.student_group(),
            result.specialty(),
            result.score(),
            levels
        );
    }

    if let Some(average) = summary.average_score() {
        println!();
        println!(
            "{} résultat(s), score moyen : {}%",
            summary.results().len(),
            average
        );
    }
    Ok(())
}
