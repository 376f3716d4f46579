use std::time::Duration;

use reqwest::{Client as HttpClient, ClientBuilder};
use serde::{Deserialize, Serialize};

use crate::config::Config;

use super::{
    error::Error,
    types::{Chat, GetChatRequest, Message, Response, SendMessageRequest},
};

#[derive(Clone)]
pub struct Client {
    client: HttpClient,
    api_url: String,
    token: String,
}

// The token is part of every method URL, keep it out of Debug output.
impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

fn redact(e: reqwest::Error) -> Error {
    Error::Http(e.without_url())
}

impl Client {
    pub fn new(api_url: String, token: String, timeout: Duration) -> Result<Self, Error> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .map_err(redact)?;
        Ok(Client {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn new_from_config(config: &Config) -> Result<Self, Error> {
        Client::new(
            config.telegram_api_url.clone(),
            config.telegram_bot_token.clone(),
            config.request_timeout(),
        )
    }

    fn handle_response<T>(response: Response) -> Result<T, Error>
    where
        T: for<'de> Deserialize<'de>,
    {
        match (response.ok, response.result) {
            (true, Some(result)) => Ok(serde_json::from_value(result)?),
            (true, None) => Err(Error::Unexpected(
                "No result in successful Telegram response".to_string(),
            )),
            (false, _) => Err(Error::Api {
                code: response.error_code.unwrap_or_default(),
                description: response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    pub async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: for<'de> Deserialize<'de>,
    {
        // Error statuses still carry the JSON envelope, so the body is decoded either way.
        let bytes = self
            .client
            .post(format!("{}/bot{}/{}", self.api_url, self.token, method))
            .json(body)
            .send()
            .await
            .map_err(redact)?
            .bytes()
            .await
            .map_err(redact)?;
        let response: Response = serde_json::from_slice(&bytes)?;

        Self::handle_response(response)
    }

    pub async fn get_chat(&self, chat: &str) -> Result<Chat, Error> {
        self.call("getChat", &GetChatRequest { chat_id: chat }).await
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message, Error> {
        self.call("sendMessage", &SendMessageRequest { chat_id, text })
            .await
    }
}

pub trait Messenger: Send + Sync + 'static {
    fn resolve_channel(&self, name: &str) -> impl Future<Output = Result<i64, Error>> + Send;

    fn send_text(&self, chat_id: i64, text: &str) -> impl Future<Output = Result<(), Error>> + Send;
}

impl Messenger for Client {
    async fn resolve_channel(&self, name: &str) -> Result<i64, Error> {
        Ok(self.get_chat(name).await?.id)
    }

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), Error> {
        self.send_message(chat_id, text).await.map(|_| ())
    }
}
