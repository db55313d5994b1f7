//! XML API session over HTTPS.
//!
//! `reqwest` is asynchronous, while the poller is a blocking loop. Each
//! session therefore owns a current-thread tokio runtime and blocks on it per
//! request, the same way the synchronous health checks elsewhere wrap their
//! async counterparts.

use std::time::Duration;

use reqwest::Client;
use tokio::runtime::Runtime;
use tracing::{debug, info};

use super::{ApiRequest, DeviceSession, response};
use crate::config::AppConfig;
use crate::error::{ConfigError, PanpollError, TransportError};

/// Build the XML API endpoint URL for a host.
///
/// A bare host name gets an `https://` scheme. `port` is appended when set.
///
/// ```
/// use panpoll::device::endpoint_for;
///
/// assert_eq!(endpoint_for("fw01", None), "https://fw01/api/");
/// assert_eq!(endpoint_for("http://lab-fw", Some(8080)), "http://lab-fw:8080/api/");
/// ```
#[must_use]
pub fn endpoint_for(host: &str, port: Option<u16>) -> String {
    let trimmed = host.trim().trim_end_matches('/');
    let base = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    };
    port.map_or_else(
        || format!("{base}/api/"),
        |port| format!("{base}:{port}/api/"),
    )
}

/// A live session against one PAN-OS device or Panorama.
///
/// The session must be used from outside any async runtime: every request
/// blocks the calling thread on the session's private runtime.
pub struct XmlApiSession {
    host: String,
    endpoint: String,
    api_key: Option<String>,
    request_timeout: Duration,
    client: Client,
    runtime: Runtime,
}

impl XmlApiSession {
    /// Open a session using the device settings from `config`.
    ///
    /// When no API key is configured, one is generated from the configured
    /// user name and password.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingRequired` if the host or credentials are
    /// missing, `TransportError::ClientSetup` if the HTTP client or runtime
    /// cannot be built, and any transport error raised by key generation.
    pub fn connect(config: &AppConfig) -> Result<Self, PanpollError> {
        let host = config.require_host()?;
        let device = &config.device;
        device.validate()?;

        let client = Client::builder()
            .danger_accept_invalid_certs(!device.verify_tls)
            .build()
            .map_err(|e| TransportError::ClientSetup {
                message: e.to_string(),
            })?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::ClientSetup {
                message: format!("failed to create runtime: {e}"),
            })?;

        let mut session = Self {
            host: host.to_owned(),
            endpoint: endpoint_for(host, device.port),
            api_key: None,
            request_timeout: Duration::from_secs(device.request_timeout_secs),
            client,
            runtime,
        };

        let key = match (&device.api_key, &device.username, &device.password) {
            (Some(key), _, _) => key.clone(),
            (None, Some(user), Some(password)) => session.generate_key(user, password)?,
            _ => {
                return Err(ConfigError::MissingRequired {
                    field: String::from("device.api_key"),
                }
                .into());
            }
        };
        session.api_key = Some(key);
        info!(host = %session.host, "device session ready");
        Ok(session)
    }

    /// The device host this session talks to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn generate_key(&self, user: &str, password: &str) -> Result<String, TransportError> {
        debug!(host = %self.host, user, "generating API key");
        let body = self.request(&ApiRequest::Keygen {
            user: user.to_owned(),
            password: password.to_owned(),
        })?;
        response::api_key(&body)
    }

    async fn send(&self, request: &ApiRequest) -> Result<String, TransportError> {
        let mut params = request.params();
        if request.requires_key()
            && let Some(ref key) = self.api_key
        {
            params.push(("key", key.as_str()));
        }

        let reply = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable {
                host: self.host.clone(),
                message: e.to_string(),
            })?;

        let status = reply.status();
        if status.is_success() {
            return reply
                .text()
                .await
                .map_err(|e| TransportError::MalformedResponse {
                    message: format!("failed to read response body: {e}"),
                });
        }

        // PAN-OS answers a bad key with HTTP 403 and an error envelope.
        let body = reply.text().await.unwrap_or_default();
        match response::expect_success(&body) {
            Err(error @ TransportError::Api { .. }) => Err(error),
            _ => Err(TransportError::HttpStatus {
                status: status.as_u16(),
            }),
        }
    }
}

impl DeviceSession for XmlApiSession {
    fn request(&self, request: &ApiRequest) -> Result<String, TransportError> {
        debug!(host = %self.host, ?request, "sending XML API request");
        self.runtime.block_on(async {
            match tokio::time::timeout(self.request_timeout, self.send(request)).await {
                Ok(result) => result,
                Err(_) => Err(TransportError::RequestTimeout {
                    host: self.host.clone(),
                    seconds: self.request_timeout.as_secs(),
                }),
            }
        })
    }
}
