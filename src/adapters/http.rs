use crate::config::WorkerConfig;
use crate::domain::model::{Request, Response};
use crate::domain::ports::Network;
use crate::utils::error::{NightPrayerError, Result};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(user_agent) = user_agent {
            builder = builder.user_agent(user_agent.to_string());
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &WorkerConfig) -> Result<Self> {
        Self::new(config.timeout(), config.user_agent())
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let network_error = |message: String| NightPrayerError::NetworkError {
            url: request.url.to_string(),
            message,
        };

        let method =
            Method::from_bytes(request.method.as_bytes()).map_err(|e| network_error(e.to_string()))?;

        tracing::debug!("{} {}", method, request.url);
        let response = self
            .client
            .request(method, request.url.clone())
            .send()
            .await
            .map_err(|e| network_error(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| network_error(e.to_string()))?
            .to_vec();

        tracing::debug!("HTTP {} for {} ({} bytes)", status, request.url, body.len());
        Ok(Response {
            status,
            headers,
            body,
        })
    }
}
