//! NATS publisher for prediction replies

use crate::types::prediction::PredictResponse;
use anyhow::Result;
use async_nats::{Client, Subject};
use tracing::debug;

/// Publishes replies to the inbox a requester is waiting on
#[derive(Clone)]
pub struct ReplyProducer {
    client: Client,
}

impl ReplyProducer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Publish a reply
    pub async fn reply(&self, inbox: Subject, response: &PredictResponse) -> Result<()> {
        let payload = serde_json::to_vec(response)?;

        self.client.publish(inbox, payload.into()).await?;

        debug!(
            request_id = %response.request_id,
            ok = response.error.is_none(),
            "Published prediction reply"
        );

        Ok(())
    }
}
