use anyhow::{anyhow, Result};
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://www.omdbapi.com";
pub const DEFAULT_DB_PATH: &str = "cineseek.db";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub db_path: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup("OMDB_API_KEY")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| anyhow!("OMDB_API_KEY must be set"))?;
        let base_url = lookup("OMDB_BASE_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let db_path = lookup("CINESEEK_DB_PATH")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        Ok(Self {
            api_key,
            base_url,
            db_path,
        })
    }
}
