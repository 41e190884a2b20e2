//! Ordered fallback chain across the generation backends

use std::sync::Arc;
use log::{debug, trace, error, info, warn};
use crate::config::GeneratorConfig;
use crate::error::{Error, ErrorKind};
use crate::providers::{
  Backend, LocalModelBackend, RemoteApiBackend, TemplateBackend
};
use crate::request::{
  Attempt, GenerationOutcome, GenerationRequest, GenerationResult
};

/// Top-level generation policy.
///
/// Backends are tried once each, in order, and the first valid
/// document wins. The built-in fallback page answers if the chain is
/// exhausted, so generation always produces a document.
pub struct HtmlGenerator
{   backends: Vec<Arc<dyn Backend>>
  , remote_configured: bool
}

impl HtmlGenerator
{   /// Remote API, then local model, then templates
    pub fn new(
      remote: RemoteApiBackend
    , local: LocalModelBackend
    ) -> Self
    {   let remote_configured = remote.is_configured();
        HtmlGenerator
        {   backends: vec![
              Arc::new(remote) as Arc<dyn Backend>
            , Arc::new(local) as Arc<dyn Backend>
            , Arc::new(TemplateBackend::default()) as Arc<dyn Backend>
            ]
          , remote_configured
        }
    }

    pub fn from_config(config: GeneratorConfig)
      -> Result<Self, Error>
    {   config.validate()?;
        let remote = RemoteApiBackend::new(config.remote)?;
        let local = LocalModelBackend::new(config.local)?;
        Ok(Self::new(remote, local))
    }

    /// Arbitrary ordered chain. Availability is read from the listed
    /// backends themselves.
    pub fn with_backends(backends: Vec<Arc<dyn Backend>>) -> Self
    {   let remote_configured = backends.iter().any(|b| {
          b.kind() == crate::BackendKind::RemoteApi && b.is_available()
        });
        HtmlGenerator
        {   backends
          , remote_configured
        }
    }

    /// Settle local model availability ahead of the first request
    pub async fn warm_up(&self) -> crate::BackendAvailability
    {   for backend in &self.backends
        {   backend.prepare().await;
        }
        self.availability()
    }

    pub fn availability(&self) -> crate::BackendAvailability
    {   crate::BackendAvailability
        {   remote_configured: self.remote_configured
          , local: self.backends
              .iter()
              .find_map(|b| b.local_state())
              .unwrap_or(crate::LocalModelState::Disabled)
        }
    }

    /// Always returns a complete HTML document
    pub async fn generate(&self, description: &str) -> String
    {   self.generate_detailed(&GenerationRequest::new(description))
          .await
          .html
    }

    pub async fn generate_detailed(
      &self
    , request: &GenerationRequest
    ) -> GenerationOutcome
    {   debug!(
          "Generating for {} char description",
          request.description.len()
        );
        let mut attempts = Vec::with_capacity(self.backends.len() + 1);

        for backend in &self.backends
        {   let kind = backend.kind();
            trace!("Stage {:?}", kind);

            if !backend.is_available()
            {   debug!("Skipping unavailable {:?}", kind);
                attempts.push(Attempt
                {   backend: kind
                  , result: GenerationResult::Failure
                    {   reason: unavailable_reason(kind)
                    }
                  , rate_limited: false
                });
                continue;
            }

            let task_backend = Arc::clone(backend);
            let task_request = request.clone();
            let result = tokio::spawn(async move {
              task_backend.attempt(&task_request).await
            })
              .await
              .unwrap_or_else(|e| {
                error!("{:?} stage panicked: {}", kind, e);
                Err(Error::Other(e.to_string()))
              })
              .and_then(|html| {
                if crate::extract::is_valid_document(&html)
                {   Ok(html)
                } else
                {   Err(Error::ValidationFailed(
                      html.chars().take(40).collect()
                    ))
                }
              });

            let rate_limited = match &result
            {   Ok(html) => {
                  info!("{:?} produced {} bytes", kind, html.len());
                  false
                }
              , Err(e) => {
                  warn!("{:?} skipped: {}", kind, e);
                  e.is_rate_limited()
                }
            };
            let attempt = Attempt
            {   backend: kind
              , result: GenerationResult::from(result)
              , rate_limited
            };
            let winner = attempt.result.html().map(str::to_string);
            attempts.push(attempt);

            if let Some(html) = winner
            {   return GenerationOutcome
                {   html
                  , backend: kind
                  , attempts
                };
            }
        }

        warn!("Every backend failed, using the fallback page");
        let html = crate::fallback_page::build(&request.description);
        attempts.push(Attempt
        {   backend: crate::BackendKind::Fallback
          , result: GenerationResult::Success
            {   html: html.clone()
            }
          , rate_limited: false
        });
        GenerationOutcome
        {   html
          , backend: crate::BackendKind::Fallback
          , attempts
        }
    }
}

fn unavailable_reason(kind: crate::BackendKind) -> ErrorKind
{   match kind
    {   crate::BackendKind::RemoteApi => ErrorKind::CredentialMissing
      , crate::BackendKind::LocalModel => ErrorKind::ModelUnavailable
      , _ => ErrorKind::Other
    }
}
