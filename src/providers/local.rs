//! Local causal-language-model backend
//!
//! The model is probed at most once per process: the first candidate
//! that loads stays active for every later request, and a failed probe
//! marks the backend unavailable for good. Completions on the active
//! model may run concurrently.

use std::sync::Arc;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use log::{debug, trace, error, info, warn};
use crate::config::{LocalConfig, LocalModelCandidate};

/// A model ready for text completion
#[async_trait]
pub trait LoadedModel: Send + Sync
{   fn identifier(&self) -> &str;

    /// Continuation of `prompt`, without the prompt itself
    async fn complete(
      &self
    , prompt: &str
    , max_output_length: usize
    , temperature: f32
    ) -> Result<String, crate::error::Error>;
}

/// Loads models by identifier
#[async_trait]
pub trait ModelRuntime: Send + Sync
{   async fn load(&self, model: &str)
      -> Result<Arc<dyn LoadedModel>, crate::error::Error>;
}

// ===== Completion server wire types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions
{   pub num_predict: usize
  , pub temperature: f32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest
{   pub model: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>
  , pub stream: bool
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse
{   #[serde(default)]
    pub response: String
  , #[serde(default)]
    pub done: bool
}

// ===== HTTP runtime =====

/// Runtime backed by an Ollama-compatible completion server
#[derive(Debug, Clone)]
pub struct HttpModelRuntime
{   endpoint: String
  , http_client: reqwest::Client
}

impl HttpModelRuntime
{   pub fn new(
      endpoint: &str
    , timeout_secs: Option<u64>
    ) -> Result<Self, crate::error::Error>
    {   debug!("Creating HttpModelRuntime for {}", endpoint);
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          crate::error::Error::InvalidConfiguration(e.to_string())
        })?;
        Ok(HttpModelRuntime
        {   endpoint: endpoint.trim_end_matches('/').to_string()
          , http_client
        })
    }

    async fn post_generate(&self, request: &GenerateRequest)
      -> Result<GenerateResponse, crate::error::Error>
    {   trace!("Local generate request: {:?}", request);
        let response = self.http_client
          .post(format!("{}/api/generate", self.endpoint))
          .json(request)
          .send()
          .await
          .map_err(|e| {
            crate::error::Error::TransportFailure(e.to_string())
          })?;

        let status = response.status();
        trace!("Local generate status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(crate::error::Error::NonSuccessStatus
            {   status: status.as_u16()
              , body
            });
        }

        response.json().await.map_err(|e| {
          crate::error::Error::MalformedResponse(e.to_string())
        })
    }
}

#[async_trait]
impl ModelRuntime for HttpModelRuntime
{   async fn load(&self, model: &str)
      -> Result<Arc<dyn LoadedModel>, crate::error::Error>
    {   debug!("Loading local model {}", model);
        // A request without a prompt makes the server load the weights
        let request = GenerateRequest
        {   model: model.to_string()
          , prompt: None
          , stream: false
          , options: None
        };
        self.post_generate(&request).await.map_err(|e| {
          crate::error::Error::ModelUnavailable(
            format!("{}: {}", model, e)
          )
        })?;
        Ok(Arc::new(HttpModel
        {   identifier: model.to_string()
          , runtime: self.clone()
        }))
    }
}

struct HttpModel
{   identifier: String
  , runtime: HttpModelRuntime
}

#[async_trait]
impl LoadedModel for HttpModel
{   fn identifier(&self) -> &str
    {   &self.identifier
    }

    async fn complete(
      &self
    , prompt: &str
    , max_output_length: usize
    , temperature: f32
    ) -> Result<String, crate::error::Error>
    {   let request = GenerateRequest
        {   model: self.identifier.clone()
          , prompt: Some(prompt.to_string())
          , stream: false
          , options: Some(GenerateOptions
            {   num_predict: max_output_length
              , temperature
            })
        };
        let response = self.runtime.post_generate(&request).await?;
        if !response.done
        {   warn!("Completion from {} not marked done", self.identifier);
        }
        Ok(response.response)
    }
}

// ===== Backend =====

struct ActiveModel
{   candidate: LocalModelCandidate
  , model: Arc<dyn LoadedModel>
}

/// Local model stage of the chain
pub struct LocalModelBackend
{   enabled: bool
  , candidates: Vec<LocalModelCandidate>
  , runtime: Arc<dyn ModelRuntime>
  , active: OnceCell<Option<ActiveModel>>
}

impl LocalModelBackend
{   /// Backend using the HTTP completion server from `config`
    pub fn new(config: LocalConfig)
      -> Result<Self, crate::error::Error>
    {   let runtime = HttpModelRuntime::new(
          &config.endpoint,
          config.timeout_secs
        )?;
        Ok(Self::with_runtime(config, Arc::new(runtime)))
    }

    pub fn with_runtime(
      config: LocalConfig
    , runtime: Arc<dyn ModelRuntime>
    ) -> Self
    {   debug!(
          "Creating LocalModelBackend with {} candidates",
          config.candidates.len()
        );
        LocalModelBackend
        {   enabled: config.enabled
          , candidates: config.candidates
          , runtime
          , active: OnceCell::new()
        }
    }

    pub fn state(&self) -> crate::LocalModelState
    {   if !self.enabled || self.candidates.is_empty()
        {   return crate::LocalModelState::Disabled;
        }
        match self.active.get()
        {   None => crate::LocalModelState::NotProbed
          , Some(None) => crate::LocalModelState::Unavailable
          , Some(Some(active)) => crate::LocalModelState::Loaded(
              active.model.identifier().to_string()
            )
        }
    }

    /// Probe the candidates now if that has not happened yet
    pub async fn warm_up(&self) -> crate::LocalModelState
    {   if self.enabled
        {   let _ = self.active_model().await;
        }
        self.state()
    }

    async fn active_model(&self) -> Option<&ActiveModel>
    {   self.active
          .get_or_init(|| self.probe())
          .await
          .as_ref()
    }

    async fn probe(&self) -> Option<ActiveModel>
    {   for (rank, candidate) in self.candidates.iter().enumerate()
        {   let runtime = Arc::clone(&self.runtime);
            let model = candidate.model.clone();
            let loaded = tokio::spawn(async move {
              runtime.load(&model).await
            }).await;

            match loaded
            {   Ok(Ok(model)) => {
                  info!(
                    "Local model {} active (candidate {})",
                    candidate.model, rank
                  );
                  return Some(ActiveModel
                  {   candidate: candidate.clone()
                    , model
                  });
                }
              , Ok(Err(e)) => {
                  warn!("Local model {} failed: {}", candidate.model, e);
                }
              , Err(e) => {
                  error!("Local model {} panicked: {}", candidate.model, e);
                }
            }
        }
        warn!("No local model could be loaded");
        None
    }

    /// Text of one completion: the primed document prefix from the
    /// prompt followed by the model's continuation. The description is
    /// not part of the result.
    pub async fn call(&self, description: &str)
      -> Result<String, crate::error::Error>
    {   if !self.enabled
        {   return Err(crate::error::Error::ModelUnavailable(
              "local backend disabled".to_string()
            ));
        }
        let active = self.active_model().await.ok_or_else(|| {
          crate::error::Error::ModelUnavailable(
            "no candidate model could be loaded".to_string()
          )
        })?;

        let config = &active.candidate.backend;
        let prompt = config.render_prompt(description);
        debug!(
          "Local completion on {} ({} prompt chars)",
          active.candidate.model, prompt.len()
        );

        let model = Arc::clone(&active.model);
        let task_prompt = prompt.clone();
        let max_output_length = config.max_output_length;
        let temperature = config.temperature;
        let completion = tokio::spawn(async move {
          model.complete(&task_prompt, max_output_length, temperature)
            .await
        }).await;

        match completion
        {   Ok(Ok(text)) if text.trim().is_empty() => {
              warn!("Empty completion from {}", active.candidate.model);
              Err(crate::error::Error::GenerationException(
                "model produced no text".to_string()
              ))
            }
          , Ok(Ok(text)) => {
              Ok(format!("{}{}", config.primed_prefix(), text))
            }
          , Ok(Err(crate::error::Error::GenerationException(msg))) => {
              Err(crate::error::Error::GenerationException(msg))
            }
          , Ok(Err(e)) => {
              Err(crate::error::Error::GenerationException(e.to_string()))
            }
          , Err(e) => {
              error!("Local completion panicked: {}", e);
              Err(crate::error::Error::GenerationException(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl super::Backend for LocalModelBackend
{   fn kind(&self) -> crate::BackendKind
    {   crate::BackendKind::LocalModel
    }

    fn is_available(&self) -> bool
    {   matches!(
          self.state(),
          crate::LocalModelState::NotProbed
            | crate::LocalModelState::Loaded(_)
        )
    }

    async fn prepare(&self)
    {   LocalModelBackend::warm_up(self).await;
    }

    fn local_state(&self) -> Option<crate::LocalModelState>
    {   Some(self.state())
    }

    async fn attempt(
      &self
    , request: &crate::request::GenerationRequest
    ) -> Result<String, crate::error::Error>
    {   let raw = self.call(&request.description).await?;
        crate::extract::accept(&raw)
    }
}
