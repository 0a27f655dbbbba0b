//! HTTP upload adapter.
//!
//! Implements [`UploadPort`] with a one-shot POST: a fresh connection per
//! upload, the whole body written in one go, and the first 256 bytes of
//! the response kept for the log.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` wrapped in the
//!   `embedded_svc` blocking client.
//! - **all other targets**: replays a scripted response and records the
//!   request for inspection.

use log::info;
#[cfg(target_os = "espidf")]
use log::warn;

use crate::app::ports::{HttpResponse, UploadPort};
use crate::error::UploadError;

#[cfg(target_os = "espidf")]
use core::time::Duration;
#[cfg(target_os = "espidf")]
use embedded_svc::{
    http::{client::Client, Method, Status},
    io::{Read, Write},
};
#[cfg(target_os = "espidf")]
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

/// Socket timeout for a single upload.
#[cfg(target_os = "espidf")]
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(15);

#[cfg(target_os = "espidf")]
pub struct HttpUploader;

#[cfg(target_os = "espidf")]
impl HttpUploader {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "espidf")]
impl UploadPort for HttpUploader {
    fn post_binary(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, UploadError> {
        let conf = Configuration {
            timeout: Some(UPLOAD_TIMEOUT),
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&conf).map_err(|e| {
            warn!("HTTP: connection setup failed ({})", e);
            UploadError::Transport
        })?;
        let mut client = Client::wrap(connection);

        let content_length = body.len().to_string();
        let mut all_headers: Vec<(&str, &str)> = Vec::with_capacity(headers.len() + 1);
        all_headers.extend_from_slice(headers);
        all_headers.push(("Content-Length", content_length.as_str()));

        let mut request = client
            .request(Method::Post, url, &all_headers)
            .map_err(|e| {
                warn!("HTTP: request to {} failed ({:?})", url, e);
                UploadError::Transport
            })?;
        request.write_all(body).map_err(|e| {
            warn!("HTTP: body write failed ({:?})", e);
            UploadError::Transport
        })?;
        request.flush().map_err(|_| UploadError::Transport)?;

        let mut response = request.submit().map_err(|e| {
            warn!("HTTP: submit failed ({:?})", e);
            UploadError::Transport
        })?;
        let status = response.status();

        let mut buf = [0u8; 256];
        let mut filled = 0;
        while filled < buf.len() {
            match response.read(&mut buf[filled..]) {
                Ok(0) | Err(_) => break,
                Ok(n) => filled += n,
            }
        }
        let body = core::str::from_utf8(&buf[..filled]).unwrap_or("<binary>");
        info!("HTTP: {} bytes → {} (status {})", content_length, url, status);
        Ok(HttpResponse::new(status, body))
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// What the simulated uploader saw.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body_len: usize,
}

#[cfg(not(target_os = "espidf"))]
pub struct HttpUploader {
    reply: Result<HttpResponse, UploadError>,
    requests: Vec<RecordedRequest>,
}

#[cfg(not(target_os = "espidf"))]
impl HttpUploader {
    /// Every POST gets `reply`.
    pub fn new_simulated(reply: Result<HttpResponse, UploadError>) -> Self {
        Self {
            reply,
            requests: Vec::new(),
        }
    }

    pub fn requests(&self) -> &[RecordedRequest] {
        &self.requests
    }
}

#[cfg(not(target_os = "espidf"))]
impl UploadPort for HttpUploader {
    fn post_binary(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, UploadError> {
        self.requests.push(RecordedRequest {
            url: url.to_owned(),
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            body_len: body.len(),
        });
        info!("HTTP(sim): POST {} ({} bytes)", url, body.len());
        self.reply.clone()
    }
}
