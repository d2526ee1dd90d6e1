use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{config::SETTINGS, util::http};

static TELEGRAM: Lazy<Arc<OnceLock<Telegram>>> = Lazy::new(|| Arc::new(OnceLock::new()));

struct Telegram {
    send_message_url: String,
}

impl Telegram {
    pub fn new() -> Self {
        Self {
            send_message_url: format!(
                "https://api.telegram.org/bot{}/sendMessage",
                SETTINGS.bot.telegram.token
            ),
        }
    }

    /// Posts the message to the configured chat and returns the API payload.
    /// A transport failure or an `ok: false` reply both surface as errors
    /// carrying whatever the API said.
    pub async fn send(&self, message: &str) -> Result<SendMessageResponse> {
        let payload = SendMessageRequest::new(&SETTINGS.bot.telegram.chat_id, message);
        let response = http::post_use_json::<SendMessageRequest, SendMessageResponse>(
            &self.send_message_url,
            None,
            Some(&payload),
        )
        .await
        .map_err(|err| anyhow!("Failed to send_message because: {:?}", err))?;

        if !response.ok {
            return Err(anyhow!(
                "Telegram rejected the message: {}",
                response
                    .description
                    .as_deref()
                    .unwrap_or("no description given")
            ));
        }

        Ok(response)
    }
}

impl Default for Telegram {
    fn default() -> Self {
        Self::new()
    }
}

fn get_client() -> Result<&'static Telegram> {
    Ok(TELEGRAM.get_or_init(Telegram::new))
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SendMessageResponse {
    pub ok: bool,
    pub description: Option<String>,
    pub result: Option<Message>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Message {
    pub message_id: i64,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
    disable_web_page_preview: bool,
}

impl<'a> SendMessageRequest<'a> {
    fn new(chat_id: &'a str, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        }
    }
}

pub async fn send(msg: &str) -> Result<SendMessageResponse> {
    get_client()?.send(msg).await
}
