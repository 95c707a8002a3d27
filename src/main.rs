//! Harness CLI: manifest fetch, standalone server control, page smoke check

use clap::{Parser, Subcommand};
use game_automation::{
    init_logging, ApiClient, BasePage, BrowserName, Config, DriverFixture, ManifestBody,
    ServerHandle,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "game-automation")]
#[command(about = "UI and API test harness for a tic-tac-toe web game", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Browser to drive (chrome, firefox, ie, edge)
    #[arg(long)]
    browser: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and print the application manifest
    Manifest,

    /// Start the standalone selenium server and report its health
    Server,

    /// Open the game page and print the status title
    Open,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let log_path = init_logging(&config.app.log_dir)?;
    println!("Logging to: {}", log_path.display());

    match cli.command {
        Commands::Manifest => {
            let client = ApiClient::new(&config)?;
            let (body, meta) = client.get_manifest().await?;

            println!("{} {}", meta.status.as_u16(), meta.reason);
            match body {
                ManifestBody::Json(value) => {
                    println!("{}", serde_json::to_string_pretty(&value)?)
                }
                ManifestBody::Text(text) => println!("{}", text),
            }
        }

        Commands::Server => {
            let browser: BrowserName = cli.browser.as_deref().unwrap_or("chrome").parse()?;
            let handle = ServerHandle::start(&config, browser).await?;
            println!("Standalone server starting at {}", handle.url());

            let mut healthy = false;
            for _ in 0..20 {
                if handle.health_check().await {
                    healthy = true;
                    break;
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }

            if healthy {
                println!("✓ Server is healthy");
            } else {
                eprintln!("✗ Server did not become healthy");
            }
            handle.stop().await?;
        }

        Commands::Open => {
            let fixture = DriverFixture::setup(&config, cli.browser.as_deref()).await?;
            let page = BasePage::new(&config);

            if page.open(&fixture.session).await {
                let title = page.title_html(&fixture.session).await?;
                println!("✓ Page opened, title: {}", title);
            } else {
                eprintln!("✗ Page did not open at {}", config.app.base_url);
            }
            fixture.teardown().await;
        }
    }

    Ok(())
}
