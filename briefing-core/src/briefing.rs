use tracing::{info, instrument};

use crate::{
    config::Config,
    error::Result,
    message::MessageBuilder,
    provider::{WeatherProvider, provider_from_config},
    sink::ReadinessProvider,
};

/// One end-to-end report: fetch, compose, deliver.
#[derive(Debug)]
pub struct Briefing {
    provider: Box<dyn WeatherProvider>,
    builder: MessageBuilder,
}

impl Briefing {
    pub fn new(provider: Box<dyn WeatherProvider>, builder: MessageBuilder) -> Self {
        Self { provider, builder }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = provider_from_config(config)?;
        let builder = MessageBuilder::new(config.message.clone())?;
        Ok(Self::new(provider, builder))
    }

    #[instrument(skip(self))]
    pub async fn compose(&self, city: &str) -> Result<String> {
        let record = self.provider.today(city).await?;
        Ok(self.builder.build(&record))
    }

    /// The target is made ready before any weather call.
    #[instrument(skip(self, readiness))]
    pub async fn deliver(
        &self,
        city: &str,
        recipient: &str,
        readiness: &dyn ReadinessProvider,
    ) -> Result<String> {
        let session = readiness.ensure_ready().await?;
        let text = self.compose(city).await?;
        session.send(recipient, &text).await?;

        info!(city, recipient, "Report delivered");
        Ok(text)
    }
}
