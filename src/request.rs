//! Request and result types for the generation chain

use serde::{Deserialize, Serialize};
use crate::error::{Error, ErrorKind};

/// One description to turn into an HTML application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest
{   pub description: String
}

impl GenerationRequest
{   pub fn new(description: impl Into<String>) -> Self
    {   GenerationRequest
        {   description: description.into()
        }
    }
}

/// Outcome of one stage of the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult
{   Success
    {   html: String
    }
  , Failure
    {   reason: ErrorKind
    }
}

impl GenerationResult
{   pub fn is_success(&self) -> bool
    {   matches!(self, GenerationResult::Success { .. })
    }

    pub fn html(&self) -> Option<&str>
    {   match self
        {   GenerationResult::Success { html } => Some(html)
          , GenerationResult::Failure { .. } => None
        }
    }
}

impl From<Result<String, Error>> for GenerationResult
{   fn from(result: Result<String, Error>) -> Self
    {   match result
        {   Ok(html) => GenerationResult::Success { html }
          , Err(e) => GenerationResult::Failure { reason: e.kind() }
        }
    }
}

/// Record of one stage considered for a request
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt
{   pub backend: crate::BackendKind
  , pub result: GenerationResult
  , /// Set when the stage failed because of rate limiting
    pub rate_limited: bool
}

/// Final document plus the trail that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome
{   pub html: String
  , /// Backend whose output was returned
    pub backend: crate::BackendKind
  , /// Every stage considered, in order, including the winner;
    /// skipped stages carry their unavailability reason
    pub attempts: Vec<Attempt>
}

impl GenerationOutcome
{   /// Informational message for the requester when a model stage
    /// was skipped and a deterministic backend answered instead.
    pub fn notice(&self) -> Option<String>
    {   if self.backend.is_model()
        {   return None;
        }
        let failed: Vec<&Attempt> = self.attempts
          .iter()
          .filter(|a| a.backend.is_model() && !a.result.is_success())
          .collect();
        if failed.is_empty()
        {   return None;
        }
        let source = match self.backend
        {   crate::BackendKind::Template => "templates"
          , _ => "the built-in fallback page"
        };
        let cause = if failed.iter().any(|a| a.rate_limited)
        {   "models are rate-limited"
        } else
        {   "no model produced a usable document"
        };
        Some(format!("Using {} because {}", source, cause))
    }
}
