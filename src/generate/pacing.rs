use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

use crate::config::PacingConfig;
use crate::{ArticleError, Result};

/// Pause between consecutive calls to the generation service
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn wait(&self);
}

/// Sleeps for a delay drawn uniformly from `[min, max]`
#[derive(Debug, Clone)]
pub struct RandomPacer {
    min: Duration,
    max: Duration,
}

impl RandomPacer {
    pub fn new(min: Duration, max: Duration) -> Result<Self> {
        if min > max {
            return Err(ArticleError::Configuration(format!(
                "pacing minimum {:?} is larger than maximum {:?}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn from_config(config: &PacingConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            Duration::from_secs_f64(config.min_secs),
            Duration::from_secs_f64(config.max_secs),
        )
    }

    /// Draw the next delay
    pub fn next_delay(&self) -> Duration {
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

#[async_trait]
impl Pacer for RandomPacer {
    async fn wait(&self) {
        let delay = self.next_delay();
        tracing::info!("Waiting {:.1}s before the next request", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

/// Sleeps for the same delay every time
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPacer {
    delay: Duration,
}

impl FixedPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedPacer {
    async fn wait(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
