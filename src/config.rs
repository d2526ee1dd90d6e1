use std::{env, path::PathBuf};

use anyhow::{anyhow, Result};
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub bot: Bot,
}

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Bot {
    #[serde(default)]
    pub telegram: Telegram,
}

const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Telegram {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub chat_id: String,
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::from_env())
    }

    /// Missing variables become empty strings here; `ensure_telegram_credentials`
    /// turns them into a startup error with a clean exit code.
    fn from_env() -> Self {
        App {
            bot: Bot {
                telegram: Telegram {
                    token: env::var(TELEGRAM_BOT_TOKEN).unwrap_or_default(),
                    chat_id: env::var(TELEGRAM_CHAT_ID).unwrap_or_default(),
                },
            },
        }
    }

    fn override_with_env(mut self) -> Self {
        if let Ok(token) = env::var(TELEGRAM_BOT_TOKEN) {
            self.bot.telegram.token = token;
        }

        if let Ok(chat_id) = env::var(TELEGRAM_CHAT_ID) {
            self.bot.telegram.chat_id = chat_id;
        }

        self
    }

    /// Both credentials are required before the pipeline may touch the network.
    pub fn ensure_telegram_credentials(&self) -> Result<()> {
        if self.bot.telegram.token.is_empty() || self.bot.telegram.chat_id.is_empty() {
            return Err(anyhow!(
                "{} or {} is not set",
                TELEGRAM_BOT_TOKEN,
                TELEGRAM_CHAT_ID
            ));
        }

        Ok(())
    }
}

fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
