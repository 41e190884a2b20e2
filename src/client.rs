use std::sync::Arc;
use tokio::sync::mpsc;
use log::{debug, error, info};
use crate::GeneratorFoot;

/// Public API for the generator - owns the task
pub struct GeneratorService
{   hand: crate::GeneratorHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl GeneratorService
{   /// Spawn the service task around `generator`.
    /// Returns immediately.
    pub fn new(generator: crate::HtmlGenerator) -> Self
    {   debug!("Creating GeneratorService with task ownership");

        let (generate_tx, generate_rx)
          = mpsc::unbounded_channel();
        let (get_availability_tx, get_availability_rx)
          = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx)
          = mpsc::unbounded_channel();

        let hand = crate::GeneratorHand
        {   generate_tx
          , get_availability_tx
          , shutdown_tx
        };

        let foot = crate::GeneratorFoot
        {   generate_rx
          , get_availability_rx
          , shutdown_rx
        };

        let generator = Arc::new(generator);
        let _task_handle = tokio::spawn(async move {
          run_service_loop(foot, generator).await
        });

        GeneratorService
        {   hand
          , _task_handle
        }
    }

    /// Queue a generation - returns almost immediately
    pub async fn generate(
      &self
    , description: String
    ) -> Result<
        mpsc::UnboundedReceiver<crate::GenerateReply>,
        crate::error::Error
      >
    {   debug!("generate queuing {} chars", description.len());
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::GenerateArgs
        {   description
          , reply: reply_tx
        };

        self.hand.generate_tx
          .send(cmd)
          .map_err(|_| {
            error!("Service channel closed");
            crate::error::Error::Other(
              "Service disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Query backend availability - returns almost immediately
    pub async fn availability(
      &self
    ) -> Result<
        mpsc::UnboundedReceiver<crate::GetAvailabilityReply>,
        crate::error::Error
      >
    {   debug!("availability queuing command");
        let (reply_tx, reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::GetAvailabilityArgs
        {   reply: reply_tx
        };

        self.hand.get_availability_tx
          .send(cmd)
          .map_err(|_| {
            error!("Service channel closed");
            crate::error::Error::Other(
              "Service disconnected".to_string()
            )
          })?;

        Ok(reply_rx)
    }

    /// Gracefully shutdown the service
    pub async fn shutdown(self)
      -> Result<(), crate::error::Error>
    {   debug!("Shutting down GeneratorService");
        let (reply_tx, mut reply_rx)
          = mpsc::unbounded_channel();

        let cmd = crate::ShutdownArgs
        {   reply: reply_tx
        };

        self.hand.shutdown_tx
          .send(cmd)
          .map_err(|_| {
            error!("Service channel already closed");
            crate::error::Error::Other(
              "Service already shutdown".to_string()
            )
          })?;

        if let Some(result) = reply_rx.recv().await
        {   debug!("Service shutdown confirmed");
            result
        } else
        {   error!("Service dropped shutdown reply");
            Err(crate::error::Error::Other(
              "No shutdown confirmation".to_string()
            ))
        }
    }
}

/// Main service loop
///
/// tokio::select! only queues. Each generation runs on its own task
/// so concurrent callers do not wait on each other.
async fn run_service_loop(
  foot: crate::GeneratorFoot
, generator: Arc<crate::HtmlGenerator>
)
{   debug!("Starting GeneratorService loop");
    let GeneratorFoot
    {   mut generate_rx
      , mut get_availability_rx
      , mut shutdown_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = generate_rx.recv() => {
          debug!("Received Generate");
          let generator = Arc::clone(&generator);
          tokio::spawn(async move {
            let request = crate::GenerationRequest::new(cmd.description);
            let outcome = generator.generate_detailed(&request).await;
            let _ = cmd.reply.send(outcome);
          });
        }
      , Some(cmd) = get_availability_rx.recv() => {
          debug!("Received GetAvailability");
          let _ = cmd.reply.send(generator.availability());
        }
      , Some(cmd) = shutdown_rx.recv() => {
          debug!("Received Shutdown");
          let _ = cmd.reply.send(Ok(()));
          info!("GeneratorService shutting down");
          break;
        }
      , else => {
          debug!("All command channels closed");
          break;
        }
      }
    }
}
