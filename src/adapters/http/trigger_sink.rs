//! reqwest-backed `TriggerSink`: delivers a named trigger to the
//! conversational front end over HTTP (spec §4.2, §6 `front_end`).

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::TriggerSink;

#[derive(Serialize)]
struct TriggerBody<'a> {
    name: &'a str,
}

pub struct HttpTriggerSink {
    client: Client,
    base_url: String,
    output_channel: String,
}

impl HttpTriggerSink {
    pub fn new(base_url: impl Into<String>, output_channel: impl Into<String>, timeout_secs: u64) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DomainError::DeliveryFailure(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            output_channel: output_channel.into(),
        })
    }
}

#[async_trait]
impl TriggerSink for HttpTriggerSink {
    async fn send(&self, user_id: Uuid, trigger: &str) -> DomainResult<()> {
        let url = format!(
            "{}/conversations/{}/trigger_intent?output_channel={}",
            self.base_url.trim_end_matches('/'),
            user_id,
            self.output_channel,
        );

        let response = self
            .client
            .post(&url)
            .json(&TriggerBody { name: trigger })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DomainError::DeliveryFailure(format!(
                "front end returned {} for trigger {trigger}",
                response.status()
            )));
        }
        Ok(())
    }
}
