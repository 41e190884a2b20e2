pub mod error;
pub mod config;
pub mod request;
pub mod extract;
pub mod fallback_page;
pub mod templates;
pub mod providers;
pub mod failover;
pub mod client;
use serde::{Deserialize, Serialize};

pub use client::GeneratorService;
pub use config::GeneratorConfig;
pub use failover::HtmlGenerator;
pub use request::{GenerationOutcome, GenerationRequest, GenerationResult};

/*

htmlforge turns a short description of a web app into one
self-contained HTML document. Each request walks a strict chain and
stops at the first usable document:

  remote chat-completion API  (when a credential is set)
  local language model        (probed once per process)
  bundled template            (keyword-selected, never fails)
  fallback page               (safety net)

htmlforge/
├── Cargo.toml
├── src/
│   ├── lib.rs            # Re-exports and shared types
│   ├── main.rs           # CLI shell
│   ├── error.rs          # Error and ErrorKind
│   ├── config.rs         # Backend configuration
│   ├── request.rs        # Request, per-stage result, outcome
│   ├── extract.rs        # Document extraction and validity gate
│   ├── fallback_page.rs  # Last-resort page
│   ├── templates/        # Catalog, selector, bundled HTML
│   ├── providers/        # Remote, local and template backends
│   ├── failover.rs       # The fallback chain
│   └── client.rs         # Task-owning service handle
└── tests/

*/

/// HTMLFORGE SERVICE INTERFACE:

// ===== Generate =====

pub type GenerateReply = GenerationOutcome;
pub type GenerateReplySender
  = tokio::sync::mpsc::UnboundedSender<GenerateReply>;

pub struct GenerateArgs
{   pub description: String
  , pub reply: GenerateReplySender
}

// ===== GetAvailability =====

pub type GetAvailabilityReply = BackendAvailability;
pub type GetAvailabilityReplySender
  = tokio::sync::mpsc::UnboundedSender<GetAvailabilityReply>;

pub struct GetAvailabilityArgs
{   pub reply: GetAvailabilityReplySender
}

// ===== Shutdown =====

pub type ShutdownReply = Result<(), crate::error::Error>;
pub type ShutdownReplySender
  = tokio::sync::mpsc::UnboundedSender<ShutdownReply>;

pub struct ShutdownArgs
{   pub reply: ShutdownReplySender
}

// ===== GeneratorHand (sender side) =====

pub struct GeneratorHand
{   pub generate_tx
      : tokio::sync::mpsc::UnboundedSender<GenerateArgs>
  , pub get_availability_tx
      : tokio::sync::mpsc::UnboundedSender<GetAvailabilityArgs>
  , pub shutdown_tx
      : tokio::sync::mpsc::UnboundedSender<ShutdownArgs>
}

// ===== GeneratorFoot (receiver side) =====

pub struct GeneratorFoot
{   pub generate_rx
      : tokio::sync::mpsc::UnboundedReceiver<GenerateArgs>
  , pub get_availability_rx
      : tokio::sync::mpsc::UnboundedReceiver<GetAvailabilityArgs>
  , pub shutdown_rx
      : tokio::sync::mpsc::UnboundedReceiver<ShutdownArgs>
}

/// HTMLFORGE STRUCTURES:

/// Every source of a returned document, in chain order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum BackendKind
{   /// Hosted chat-completion API
    RemoteApi
  , /// Local causal language model
    LocalModel
  , /// Bundled hand-authored application
    Template
  , /// Built-in page echoing the description
    Fallback
}

impl BackendKind
{   /// True for the backends that run a language model
    pub fn is_model(&self) -> bool
    {   matches!(self, BackendKind::RemoteApi | BackendKind::LocalModel)
    }
}

/// Result of the one-time local model probe
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum LocalModelState
{   /// Disabled by configuration or no candidates
    Disabled
  , /// Not probed yet, probing happens on first use
    NotProbed
  , /// Identifier of the model kept for the process lifetime
    Loaded(String)
  , /// Every candidate failed; never retried
    Unavailable
}

/// Which backends can serve requests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendAvailability
{   pub remote_configured: bool
  , pub local: LocalModelState
}

impl BackendAvailability
{   /// True when only deterministic backends can answer
    pub fn templates_only(&self) -> bool
    {   !self.remote_configured
          && matches!(
            self.local,
            LocalModelState::Disabled | LocalModelState::Unavailable
          )
    }
}
