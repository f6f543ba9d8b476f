//! Terminal scanning station.
//!
//! Reads decoded QR text (for example from a keyboard-wedge scanner) line by
//! line from stdin and runs it through a scan session against the
//! registration service named by `CHECKIN_API_URL`.

use std::sync::Arc;

use anyhow::Context;
use scan_client::config::ClientConfig;
use scan_client::{RegistrationClient, ScanSession};
use tokio::io::{AsyncBufReadExt, BufReader};

mod commands;
use commands::{Command, HELP};
mod console;
use console::Console;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ClientConfig::from_env().context("Invalid scanner configuration")?;
    let client =
        RegistrationClient::new(&config).context("Failed to create registration client")?;

    log::info!("🚀 Scanning station for {}", config.api_url);

    let console = Arc::new(Console);
    let session = Arc::new(ScanSession::new(
        Arc::new(client.clone()),
        console.clone(),
        console,
        config.display,
    ));

    println!("{}", HELP);
    session.start().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        match Command::parse(&line) {
            Command::Decode(text) => {
                // Keep reading while the result is on display; the session
                // drops whatever arrives in the meantime.
                let session = session.clone();
                let text = text.to_string();
                tokio::spawn(async move {
                    if session.handle_decode(&text).await.is_none() {
                        println!("… scan ignored (scanner busy or stopped)");
                    }
                });
            }
            Command::Start => {
                if !session.start().await {
                    println!("Scanner is already running.");
                }
            }
            Command::Stop => session.stop().await,
            Command::List => match client.list_registered().await {
                Ok(ids) if ids.is_empty() => println!("No IDs checked in yet."),
                Ok(ids) => {
                    println!("{} checked in:", ids.len());
                    for id in ids {
                        println!("  {}", id);
                    }
                }
                Err(e) => println!("❌ {}", e),
            },
            Command::Clear => match client.clear_all().await {
                Ok(message) => println!("{}", message),
                Err(e) => println!("❌ {}", e),
            },
            Command::Reject { id, reason } => {
                match client.reject(id, reason, Some("scan-terminal")).await {
                    Ok(message) => println!("{}", message),
                    Err(e) => println!("❌ {}", e),
                }
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Invalid(message) => println!("{}", message),
        }
    }

    session.stop().await;
    log::info!("👋 Scanning station closed");
    Ok(())
}
