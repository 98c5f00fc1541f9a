//! Image-load probes
//!
//! A probe answers one question about one URL: does it load as an image. It reports exactly
//! once, success or failure. Cancellation is the caller's business (see
//! [`super::ProbeHandle`]); a probe just runs to completion or gets dropped.

use crate::error::ProbeError;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait ImageProbe: Send + Sync + 'static {
    async fn probe(&self, url: &str) -> Result<(), ProbeError>;
}

/// Answers from a fixed table. Unknown URLs fail.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    answers: HashMap<String, bool>,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, is_image: bool) -> Self {
        self.answers.insert(url.into(), is_image);
        self
    }
}

#[async_trait]
impl ImageProbe for StaticProbe {
    async fn probe(&self, url: &str) -> Result<(), ProbeError> {
        match self.answers.get(url) {
            Some(true) => Ok(()),
            Some(false) => Err(ProbeError::NotAnImage("unknown".to_string())),
            None => Err(ProbeError::Transport(format!("no answer for {url}"))),
        }
    }
}

#[cfg(feature = "http-probe")]
pub use http::HttpImageProbe;

#[cfg(feature = "http-probe")]
mod http {
    use super::ImageProbe;
    use crate::error::ProbeError;
    use async_trait::async_trait;
    use reqwest::header::CONTENT_TYPE;
    use std::time::Duration;

    /// Fetches the URL and accepts any 2xx response with an `image/*` content type
    #[derive(Debug, Clone)]
    pub struct HttpImageProbe {
        client: reqwest::Client,
    }

    impl HttpImageProbe {
        /// `timeout` bounds each request. `None` leaves requests unbounded.
        pub fn new(timeout: Option<Duration>) -> Result<Self, ProbeError> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder
                .build()
                .map_err(|e| ProbeError::Transport(e.to_string()))?;
            Ok(HttpImageProbe { client })
        }
    }

    #[async_trait]
    impl ImageProbe for HttpImageProbe {
        async fn probe(&self, url: &str) -> Result<(), ProbeError> {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| ProbeError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ProbeError::Status(status.as_u16()));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if content_type.starts_with("image/") {
                Ok(())
            } else {
                Err(ProbeError::NotAnImage(content_type))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_probe_answers() {
        let probe = StaticProbe::new()
            .with("https://a.test/x", true)
            .with("https://b.test/y", false);
        assert_eq!(probe.probe("https://a.test/x").await, Ok(()));
        assert!(matches!(
            probe.probe("https://b.test/y").await,
            Err(ProbeError::NotAnImage(_))
        ));
        assert!(matches!(
            probe.probe("https://c.test/").await,
            Err(ProbeError::Transport(_))
        ));
    }
}
