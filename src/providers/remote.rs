use std::time::Duration;
use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use log::{debug, trace, error, warn};
use crate::config::RemoteConfig;

/// System message sent with every request
pub const SYSTEM_PROMPT: &str
  = "You are an expert web developer. Create complete, standalone, \
     functional HTML documents with embedded CSS and JavaScript. \
     Return only the HTML code.";

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   fn new(role: &str, content: String) -> Self
    {   ChatMessage
        {   role: role.to_string()
          , content
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: usize
  , pub temperature: f32
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ChatMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

// ===== Remote Backend =====

/// Hosted chat-completion API
pub struct RemoteApiBackend
{   config: RemoteConfig
  , http_client: reqwest::Client
}

impl RemoteApiBackend
{   pub fn new(config: RemoteConfig)
      -> Result<Self, crate::error::Error>
    {   debug!("Creating RemoteApiBackend for {}", config.model);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })?;
        Ok(RemoteApiBackend
        {   config
          , http_client
        })
    }

    /// True when a credential is configured
    pub fn is_configured(&self) -> bool
    {   self.config.api_key.is_some()
    }

    /// Fixed system/user message pair for `description`
    pub fn build_request(&self, description: &str)
      -> ChatCompletionRequest
    {   ChatCompletionRequest
        {   model: self.config.model.clone()
          , messages: vec![
              ChatMessage::new("system", SYSTEM_PROMPT.to_string())
            , ChatMessage::new(
                "user",
                self.config.backend.render_prompt(description)
              )
            ]
          , max_tokens: self.config.backend.max_output_length
          , temperature: self.config.backend.temperature
        }
    }

    /// One request, no retry. Returns the assistant content verbatim.
    pub async fn call(&self, description: &str)
      -> Result<String, crate::error::Error>
    {   let api_key = self.config.api_key.as_ref()
          .ok_or_else(|| {
            debug!("No credential in {}", self.config.api_key_env);
            crate::error::Error::CredentialMissing(
              self.config.api_key_env.clone()
            )
          })?;

        let request = self.build_request(description);
        trace!("Chat completion request: {:?}", request);

        let response = self.http_client
          .post(format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
          ))
          .header("Authorization", format!("Bearer {}", api_key))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::TransportFailure(e.to_string())
          })?;

        let status = response.status();
        trace!("Chat completion status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            warn!("Chat completion API error {}: {}", status, body);
            return Err(crate::error::Error::NonSuccessStatus
            {   status: status.as_u16()
              , body
            });
        }

        let chat_response: ChatCompletionResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::MalformedResponse(e.to_string())
          })?;

        chat_response.choices.into_iter()
          .next()
          .map(|c| {
            trace!("Finish reason: {:?}", c.finish_reason);
            c.message.content
          })
          .ok_or_else(|| {
            error!("No choices in response");
            crate::error::Error::MalformedResponse(
              "response contained no choices".to_string()
            )
          })
    }
}

#[async_trait]
impl super::Backend for RemoteApiBackend
{   fn kind(&self) -> crate::BackendKind
    {   crate::BackendKind::RemoteApi
    }

    fn is_available(&self) -> bool
    {   self.is_configured()
    }

    async fn attempt(
      &self
    , request: &crate::request::GenerationRequest
    ) -> Result<String, crate::error::Error>
    {   let raw = self.call(&request.description).await?;
        crate::extract::accept(&raw)
    }
}
