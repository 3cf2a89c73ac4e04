use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medassist_core::medicine::MEDICINE_DISCLAIMER;
use medassist_core::{ApiClient, ChatSession, Config, Medicine, MedicineCatalog, TurnOutcome};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "medassist")]
#[command(version, about = "Terminal client for the AI medical assistant")]
struct Cli {
    /// Backend base URL (overrides MEDASSIST_API_BASE_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive assistant (default)
    Chat,
    /// Ask a single question and print the reply
    Ask {
        /// Your health question
        message: String,
    },
    /// Look up medicine information
    Medicine {
        /// Medicine name or part of it
        query: String,
        /// Search the backend instead of the built-in list
        #[arg(short, long)]
        remote: bool,
    },
    /// Check that the backend is reachable
    Health,
    /// Show or change the saved configuration
    Config {
        /// Backend base URL to save
        #[arg(long)]
        set_api_url: Option<String>,
        /// Request timeout in seconds to save
        #[arg(long)]
        set_timeout: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    let base_url = cli.api_url.clone().unwrap_or_else(|| config.api_base_url());
    let api = ApiClient::new(&base_url, config.request_timeout())?;

    let command = cli.command.unwrap_or(Commands::Chat);
    if matches!(command, Commands::Chat) {
        init_file_logging()?;
    } else {
        init_stderr_logging();
    }

    match command {
        Commands::Chat => run_tui(api).await,
        Commands::Ask { message } => ask(&api, &message).await,
        Commands::Medicine { query, remote } => search_medicine(&api, &query, remote).await,
        Commands::Health => health(&api).await,
        Commands::Config { set_api_url, set_timeout } => update_config(config, set_api_url, set_timeout),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The terminal belongs to the UI, so logs go to a file next to the config.
fn init_file_logging() -> Result<()> {
    let dir = Config::config_dir()?;
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("medassist.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Could not open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

async fn run_tui(api: ApiClient) -> Result<()> {
    tracing::info!(base_url = api.base_url(), "starting medassist");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(api, events.sender());

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event)?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(api: &ApiClient, message: &str) -> Result<()> {
    let mut session = ChatSession::new();
    let Some(outcome) = session.submit(api, message).await else {
        anyhow::bail!("Please enter a question");
    };

    if let Some(reply) = session.store().last() {
        println!("{}", reply.content);
    }
    match outcome {
        TurnOutcome::Replied(_) | TurnOutcome::Stale(_) => Ok(()),
        TurnOutcome::Failed(err) => Err(err.into()),
    }
}

async fn search_medicine(api: &ApiClient, query: &str, remote: bool) -> Result<()> {
    let (results, disclaimer) = if remote {
        let response = api.search_medicine(query).await?;
        (response.results, response.disclaimer)
    } else {
        let catalog = MedicineCatalog::sample();
        let results = catalog.search(query).into_iter().cloned().collect();
        (results, None)
    };

    if results.is_empty() {
        println!(
            "We couldn't find any medicine matching \"{}\". Please try a different search term or consult with a pharmacist.",
            query.trim()
        );
        return Ok(());
    }

    for medicine in &results {
        print_medicine(medicine);
    }
    println!("Disclaimer: {}", disclaimer.as_deref().unwrap_or(MEDICINE_DISCLAIMER));
    Ok(())
}

fn print_medicine(medicine: &Medicine) {
    println!("{}", medicine.name);
    println!("  Usage: {}", medicine.usage);
    println!("  Precautions:");
    for precaution in &medicine.precautions {
        println!("    • {}", precaution);
    }
    println!();
}

fn update_config(mut config: Config, api_url: Option<String>, timeout: Option<u64>) -> Result<()> {
    if api_url.is_some() || timeout.is_some() {
        if let Some(url) = api_url {
            config.api_base_url = Some(url);
        }
        if let Some(secs) = timeout {
            config.request_timeout_secs = Some(secs);
        }
        config.save()?;
        tracing::info!("configuration saved");
    }

    println!("Config file: {}", Config::config_dir()?.join("config.json").display());
    println!("API base URL: {}", config.api_base_url());
    println!("Request timeout: {}s", config.request_timeout().as_secs());
    Ok(())
}

async fn health(api: &ApiClient) -> Result<()> {
    let status = api.health().await?;
    let mut line = format!("{}: {}", api.base_url(), status.status);
    if let Some(service) = &status.service {
        line.push_str(&format!(" ({}", service));
        if let Some(version) = &status.version {
            line.push_str(&format!(" v{}", version));
        }
        line.push(')');
    }
    println!("{}", line);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_opens_the_tui() {
        let cli = Cli::parse_from(["medassist"]);
        assert!(cli.command.is_none());
        assert!(cli.api_url.is_none());
    }

    #[test]
    fn test_medicine_subcommand_flags() {
        let cli = Cli::parse_from(["medassist", "medicine", "ibu", "--remote", "--api-url", "http://x:1"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
        match cli.command {
            Some(Commands::Medicine { query, remote }) => {
                assert_eq!(query, "ibu");
                assert!(remote);
            }
            _ => panic!("expected medicine subcommand"),
        }
    }

    #[test]
    fn test_config_subcommand_flags() {
        let cli = Cli::parse_from(["medassist", "config", "--set-api-url", "http://clinic:8000", "--set-timeout", "10"]);
        match cli.command {
            Some(Commands::Config { set_api_url, set_timeout }) => {
                assert_eq!(set_api_url.as_deref(), Some("http://clinic:8000"));
                assert_eq!(set_timeout, Some(10));
            }
            _ => panic!("expected config subcommand"),
        }
    }
}
