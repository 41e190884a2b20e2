//! Backends tried by the generation chain

pub mod remote;
pub mod local;
pub mod template;

pub use remote::RemoteApiBackend;
pub use local::{HttpModelRuntime, LoadedModel, LocalModelBackend, ModelRuntime};
pub use template::TemplateBackend;

use async_trait::async_trait;

/// One source of HTML in the chain
#[async_trait]
pub trait Backend: Send + Sync
{   fn kind(&self) -> crate::BackendKind;

    /// False when the backend must be skipped without being called
    fn is_available(&self) -> bool;

    /// Settle lazily probed state ahead of the first request
    async fn prepare(&self)
    {
    }

    /// Local model state, reported only by the local stage
    fn local_state(&self) -> Option<crate::LocalModelState>
    {   None
    }

    /// Produce a validated document for `request`
    async fn attempt(
      &self
    , request: &crate::request::GenerationRequest
    ) -> Result<String, crate::error::Error>;
}
