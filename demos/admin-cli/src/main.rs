//! `pronovet-admin`: a terminal look at a Pronovet deployment.
//!
//! ```text
//! PRONOVET_USERNAME=jdoe PRONOVET_PASSWORD=... pronovet-admin units
//! ```
//!
//! Logs in (unless the session file already holds a session), prints the
//! dashboard counts and the first page of the named collection
//! (`buildings` by default). Pass `--logout` to end the session instead.
//! Configuration comes from the `PRONOVET_*` variables; `RUST_LOG`
//! controls log output.

use std::sync::Arc;

use clap::Parser;
use pronovet::prelude::*;
use tracing_subscriber::EnvFilter;

const PAGE_SIZE: u32 = 10;

#[derive(Parser)]
#[command(name = "pronovet-admin")]
#[command(about = "Dashboard counts and one collection from a Pronovet API")]
#[command(version)]
struct Cli {
    /// Collection to list (`buildings`, `units`, `companies`, ...).
    #[arg(value_parser = parse_resource, default_value = "buildings")]
    collection: Resource,

    /// End the stored session instead of listing anything.
    #[arg(long)]
    logout: bool,
}

fn parse_resource(name: &str) -> Result<Resource, String> {
    Resource::parse(name).ok_or_else(|| {
        let known: Vec<String> =
            Resource::ALL.iter().map(ToString::to_string).collect();
        format!("unknown collection {name:?} (expected one of: {})", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ClientConfig::from_env()?;
    let client = ApiClient::builder()
        .config(config)
        .redirect(Arc::new(|route: &str| {
            eprintln!("Session expired. Log in again ({route}).");
        }))
        .build()?;

    if cli.logout {
        client.logout().await?;
        println!("Logged out.");
        return Ok(());
    }

    if !client.is_authenticated()? {
        let username = std::env::var("PRONOVET_USERNAME")
            .map_err(|_| "PRONOVET_USERNAME is not set")?;
        let password = std::env::var("PRONOVET_PASSWORD")
            .map_err(|_| "PRONOVET_PASSWORD is not set")?;
        client.login(&username, &password, true).await?;
    }

    if let Some(name) = client.display_name()? {
        println!("Welcome, {name}");
    }

    let stats = client.dashboard_stats().await?;
    println!();
    println!("  buildings  {:>6}", stats.buildings);
    println!("  units      {:>6}", stats.units);
    println!("  companies  {:>6}", stats.companies);
    println!("  contacts   {:>6}", stats.contact);
    println!("  OD forms   {:>6}", stats.odforms);
    println!("  users      {:>6}", stats.users);

    let page: Page<serde_json::Value> = client
        .list(cli.collection, &ListQuery::new().page(1).page_size(PAGE_SIZE))
        .await?;
    println!();
    println!("{}: {} total", cli.collection, page.count);
    for record in &page.results {
        let id = record.get("id").map(|v| v.to_string()).unwrap_or_default();
        let label = record
            .get("name")
            .or_else(|| record.get("full_name"))
            .or_else(|| record.get("username"))
            .and_then(|v| v.as_str())
            .unwrap_or("");
        println!("  {id:>5}  {label}");
    }
    if page.has_next() {
        println!("  ...");
    }

    tracing::debug!(records = page.results.len(), "done");
    Ok(())
}
