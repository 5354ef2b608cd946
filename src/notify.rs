//! Best-effort mutation events on NATS.
//!
//! Every successful mutation publishes a single-value message naming the
//! mutation kind. Publishing is fire-and-forget: failures are logged by the
//! caller and never change the outcome of the mutation that triggered them.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

/// Subject all company mutation events are published to.
pub const EVENTS_SUBJECT: &str = "companies";

/// Deadline for a single broker write, publish and flush included.
pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);

/// Which mutation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// A company was created.
    Created,
    /// A company was updated.
    Updated,
    /// A company was soft-deleted.
    Deleted,
}

impl MutationKind {
    /// The wire payload for this mutation kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "company created",
            Self::Updated => "company updated",
            Self::Deleted => "company deleted",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for event publishing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    /// Could not establish the broker connection.
    #[error("broker connection failed: {0}")]
    Connect(String),
    /// The publish or flush failed.
    #[error("publish failed: {0}")]
    Publish(String),
    /// The write did not complete within [`WRITE_DEADLINE`].
    #[error("publish timed out after {0:?}")]
    Deadline(Duration),
}

/// Capability to publish a mutation event.
///
/// Object-safe so the orchestrator can hold any notifier behind a trait
/// object; tests substitute recording or failing implementations.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    /// Publish one mutation event. A single attempt, no retries.
    async fn publish(&self, kind: MutationKind) -> Result<(), NotifyError>;
}

/// NATS-backed event notifier.
///
/// Connects once at startup; `retry_on_initial_connect` keeps an absent
/// broker from blocking the service, so broker trouble only ever shows up
/// as logged publish failures.
#[derive(Clone)]
pub struct NatsEventNotifier {
    client: async_nats::Client,
    subject: String,
}

impl NatsEventNotifier {
    /// Connect to the broker and publish to the default subject.
    pub async fn connect(url: &str, client_name: &str) -> Result<Self, NotifyError> {
        let options = async_nats::ConnectOptions::new()
            .name(client_name)
            .connection_timeout(Duration::from_secs(10))
            .retry_on_initial_connect();

        let client = async_nats::connect_with_options(url.to_string(), options)
            .await
            .map_err(|e| NotifyError::Connect(e.to_string()))?;

        tracing::info!(url = url, subject = EVENTS_SUBJECT, "Connected to NATS");

        Ok(Self {
            client,
            subject: EVENTS_SUBJECT.to_string(),
        })
    }

    /// Override the subject (for tests against a shared broker).
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }
}

#[async_trait]
impl EventNotifier for NatsEventNotifier {
    async fn publish(&self, kind: MutationKind) -> Result<(), NotifyError> {
        let write = async {
            self.client
                .publish(self.subject.clone(), kind.as_str().as_bytes().to_vec().into())
                .await
                .map_err(|e| NotifyError::Publish(e.to_string()))?;
            self.client
                .flush()
                .await
                .map_err(|e| NotifyError::Publish(e.to_string()))
        };

        match tokio::time::timeout(WRITE_DEADLINE, write).await {
            Ok(result) => result?,
            Err(_) => return Err(NotifyError::Deadline(WRITE_DEADLINE)),
        }

        tracing::debug!(subject = %self.subject, kind = kind.as_str(), "Published mutation event");
        Ok(())
    }
}
