use async_trait::async_trait;

use super::errors::NotifyError;

/// Delivers one rendered digest to the operator channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}
