//! Fetch a raw OMDb response and print it next to the mapped domain value.
//! Usage:
//!   cargo run --bin omdb_props -- search <query>
//!   cargo run --bin omdb_props -- detail <imdb_id>
//! Requires OMDB_API_KEY in the environment (.env supported).

use anyhow::{Context, Result};
use cineseek::config::Config;
use cineseek::omdb::{MovieDetailResponse, SearchItem, SearchResponse};
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use reqwest::Client;
use serde_json::Value;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Lookup {
    Search,
    Detail,
}

#[derive(Parser)]
struct Args {
    lookup: Lookup,
    value: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    let config = Config::from_env()?;

    let param = match args.lookup {
        Lookup::Search => "s",
        Lookup::Detail => "i",
    };
    let url = format!(
        "{}/?apikey={}&{param}={}",
        config.base_url,
        urlencoding::encode(&config.api_key),
        urlencoding::encode(&args.value)
    );
    let raw: Value = Client::new()
        .get(&url)
        .send()
        .await
        .context("OMDb request failed")?
        .error_for_status()
        .context("OMDb returned an error status")?
        .json()
        .await
        .context("Failed to parse OMDb JSON")?;

    println!("Raw response:\n{}", serde_json::to_string_pretty(&raw)?);

    match args.lookup {
        Lookup::Search => {
            let parsed: SearchResponse = serde_json::from_value(raw)?;
            println!(
                "\nResponse={} totalResults={:?} error={:?}",
                parsed.response, parsed.total_results, parsed.error
            );
            for item in parsed.search.unwrap_or_default() {
                println!("{:#?}", SearchItem::into_summary(item));
            }
        }
        Lookup::Detail => {
            let parsed: MovieDetailResponse = serde_json::from_value(raw)?;
            println!("\nResponse={} error={:?}", parsed.response, parsed.error);
            if parsed.is_success() {
                println!("{:#?}", parsed.into_detail());
            }
        }
    }
    Ok(())
}
