//! Where finished reports go.
//!
//! Delivery is an external concern: a [`ReadinessProvider`] prepares whatever
//! session the target needs and hands back a [`MessageSink`]. Retries live
//! here, never in the weather pipeline.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::{
    config::DeliverySettings,
    error::{BriefingError, Result},
};

#[async_trait]
pub trait MessageSink: Send + Sync + Debug {
    async fn send(&self, recipient: &str, text: &str) -> Result<()>;
}

#[async_trait]
pub trait ReadinessProvider: Send + Sync + Debug {
    /// Make the target ready to receive messages and return a session to send through.
    async fn ensure_ready(&self) -> Result<Box<dyn MessageSink>>;
}

/// Retries a sink a fixed number of extra times with a constant pause in between.
#[derive(Debug)]
pub struct RetryingSink<S> {
    inner: S,
    retries: u32,
    backoff: Duration,
}

impl<S: MessageSink> RetryingSink<S> {
    pub fn new(inner: S, retries: u32, backoff: Duration) -> Self {
        Self { inner, retries, backoff }
    }

    pub fn from_settings(inner: S, settings: &DeliverySettings) -> Self {
        Self::new(inner, settings.retries, settings.backoff())
    }
}

#[async_trait]
impl<S: MessageSink> MessageSink for RetryingSink<S> {
    async fn send(&self, recipient: &str, text: &str) -> Result<()> {
        let attempts = self.retries.saturating_add(1);
        let mut last_err = String::new();

        for attempt in 1..=attempts {
            match self.inner.send(recipient, text).await {
                Ok(()) => {
                    debug!(recipient, attempt, "Message delivered");
                    return Ok(());
                }
                Err(err) => {
                    warn!(recipient, attempt, attempts, error = %err, "Message delivery failed");
                    last_err = err.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }

        Err(BriefingError::Delivery {
            recipient: recipient.to_string(),
            attempts,
            reason: last_err,
        })
    }
}

/// Prints the report to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl MessageSink for ConsoleSink {
    async fn send(&self, recipient: &str, text: &str) -> Result<()> {
        let delivery_error = |err: std::io::Error| BriefingError::Delivery {
            recipient: recipient.to_string(),
            attempts: 1,
            reason: err.to_string(),
        };

        let mut stdout = tokio::io::stdout();
        let out = format!("→ {recipient}\n{text}\n");
        stdout.write_all(out.as_bytes()).await.map_err(delivery_error)?;
        stdout.flush().await.map_err(delivery_error)
    }
}

/// Always ready; sends through a retrying [`ConsoleSink`].
#[derive(Debug, Clone, Default)]
pub struct ConsoleReadiness {
    delivery: DeliverySettings,
}

impl ConsoleReadiness {
    pub fn new(delivery: DeliverySettings) -> Self {
        Self { delivery }
    }
}

#[async_trait]
impl ReadinessProvider for ConsoleReadiness {
    async fn ensure_ready(&self) -> Result<Box<dyn MessageSink>> {
        Ok(Box::new(RetryingSink::from_settings(ConsoleSink, &self.delivery)))
    }
}
