//! Conversion service for payloads that are not JSON.
//!
//! The table never reads or writes HDF5 itself. A [`ConversionService`]
//! receives base64 content together with the target encoding and replies with
//! base64 content or an error message.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use biom_core::{BiomError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Target encoding of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Json,
    Hdf5,
}

impl Direction {
    /// Wire name of the target encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Json => "json",
            Direction::Hdf5 => "hdf5",
        }
    }
}

/// What is sent to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub to: Direction,
    /// Base64-encoded source bytes.
    pub content: String,
}

impl ConversionRequest {
    /// Encode `bytes` for conversion to `to`.
    pub fn new(to: Direction, bytes: &[u8]) -> Self {
        Self {
            to,
            content: STANDARD.encode(bytes),
        }
    }
}

/// What the service replies. Exactly one field is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResponse {
    /// Base64-encoded converted bytes.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ConversionResponse {
    pub fn ok(bytes: &[u8]) -> Self {
        Self {
            content: Some(STANDARD.encode(bytes)),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            content: None,
            error: Some(message.into()),
        }
    }

    /// Decoded content, or the service's error message as an error.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if let Some(message) = self.error {
            return Err(BiomError::Conversion(message));
        }
        let content = self
            .content
            .ok_or_else(|| BiomError::Conversion("reply has neither content nor error".into()))?;
        STANDARD
            .decode(content.trim())
            .map_err(|e| BiomError::Conversion(format!("reply content is not base64: {e}")))
    }
}

/// A remote or local converter between BIOM encodings.
#[async_trait]
pub trait ConversionService: Send + Sync {
    async fn convert(&self, request: ConversionRequest) -> Result<ConversionResponse>;
}

/// Send `bytes` through `service` and return the converted bytes.
pub async fn convert_bytes(
    service: &dyn ConversionService,
    to: Direction,
    bytes: &[u8],
) -> Result<Vec<u8>> {
    debug!(?to, len = bytes.len(), "sending conversion request");
    let response = service.convert(ConversionRequest::new(to, bytes)).await?;
    match response.into_bytes() {
        Ok(converted) => {
            debug!(?to, len = converted.len(), "conversion succeeded");
            Ok(converted)
        }
        Err(e) => {
            warn!(?to, error = %e, "conversion failed");
            Err(e)
        }
    }
}

#[cfg(feature = "http")]
pub use self::http::{HttpConversionConfig, HttpConversionService};

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use biom_core::{BiomError, Result};
    use reqwest::Client;
    use tracing::debug;

    use super::{ConversionRequest, ConversionResponse, ConversionService};

    /// Where the conversion server lives.
    #[derive(Debug, Clone)]
    pub struct HttpConversionConfig {
        pub url: String,
        pub timeout: Duration,
    }

    impl HttpConversionConfig {
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                url: url.into(),
                timeout: Duration::from_secs(60),
            }
        }
    }

    /// Posts conversion requests as a form and reads a JSON reply.
    #[derive(Debug, Clone)]
    pub struct HttpConversionService {
        config: HttpConversionConfig,
        client: Client,
    }

    impl HttpConversionService {
        pub fn new(config: HttpConversionConfig) -> Result<Self> {
            let client = Client::builder()
                .timeout(config.timeout)
                .build()
                .map_err(|e| BiomError::Conversion(format!("failed to build HTTP client: {e}")))?;
            Ok(Self { config, client })
        }
    }

    /// Form body of a conversion request.
    fn form_fields(request: &ConversionRequest) -> [(&'static str, &str); 2] {
        [("to", request.to.as_str()), ("content", request.content.as_str())]
    }

    #[async_trait]
    impl ConversionService for HttpConversionService {
        async fn convert(&self, request: ConversionRequest) -> Result<ConversionResponse> {
            debug!(url = %self.config.url, to = request.to.as_str(), "posting conversion request");

            let response = self
                .client
                .post(&self.config.url)
                .form(&form_fields(&request))
                .send()
                .await
                .map_err(|e| BiomError::Conversion(format!("request failed: {e}")))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(BiomError::Conversion(format!("server returned {status}: {body}")));
            }

            response
                .json::<ConversionResponse>()
                .await
                .map_err(|e| BiomError::Conversion(format!("malformed reply: {e}")))
        }
    }

}
