// src/clients/probe.rs
use super::HttpProbe;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Plain HTTP GET probe used against the VIP.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        // Each probe must open a new connection so the balancer picks again.
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn get_text(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;
        Ok(response.text().await?)
    }
}
