use std::env;

use anyhow::{bail, Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Конфигурация процесса. Читается один раз при старте; отсутствие
/// обязательного значения — фатальная ошибка запуска, не рантайма.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub warehouse_api_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token =
            env::var("TELOXIDE_TOKEN").context("TELOXIDE_TOKEN must be set in environment or .env")?;
        if bot_token.trim().is_empty() {
            bail!("TELOXIDE_TOKEN is empty");
        }

        let warehouse_api_url =
            env::var("WAREHOUSE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if warehouse_api_url.trim().is_empty() {
            bail!("WAREHOUSE_API_URL is empty");
        }

        Ok(Self {
            bot_token,
            warehouse_api_url,
        })
    }
}
