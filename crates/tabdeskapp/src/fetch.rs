//! Remote wallpaper download.
//!
//! Many media hosts refuse cross-origin requests, so a fetch is tried once
//! directly and, if that does not yield usable media, once more through a
//! proxy. There are no further retries.

use crate::error::{DeskError, Result};
use crate::model::MediaKind;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Something that can perform an HTTP GET.
pub trait Transport {
    fn get(&self, url: &str) -> Result<FetchResponse>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        (**self).get(url)
    }
}

/// `reqwest` blocking client that follows redirects.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::limited(10))
            .build()
            .map_err(|e| DeskError::NetworkFetch(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<FetchResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DeskError::NetworkFetch(format!("{}: {}", url, e)))?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = resp
            .bytes()
            .map_err(|e| DeskError::NetworkFetch(format!("{}: {}", url, e)))?
            .to_vec();
        Ok(FetchResponse {
            status,
            content_type,
            bytes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub bytes: Vec<u8>,
    pub mime: String,
    pub via_proxy: bool,
}

pub struct MediaFetcher<T: Transport> {
    transport: T,
    proxy_url: String,
}

impl<T: Transport> MediaFetcher<T> {
    /// `proxy_url` must contain `{url}`, replaced by the encoded source URL.
    pub fn new(transport: T, proxy_url: impl Into<String>) -> Self {
        Self {
            transport,
            proxy_url: proxy_url.into(),
        }
    }

    pub fn proxied(&self, source: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(source.as_bytes()).collect();
        self.proxy_url.replace("{url}", &encoded)
    }

    pub fn fetch(&self, source: &str, kind: MediaKind) -> Result<FetchedMedia> {
        Url::parse(source)
            .map_err(|e| DeskError::InvalidInput(format!("invalid URL {}: {}", source, e)))?;

        let direct_failure = match self.attempt(source, kind) {
            Ok((bytes, mime)) => {
                return Ok(FetchedMedia {
                    bytes,
                    mime,
                    via_proxy: false,
                })
            }
            Err(reason) => reason,
        };
        warn!(url = source, reason = %direct_failure, "direct fetch failed, trying proxy");

        match self.attempt(&self.proxied(source), kind) {
            Ok((bytes, mime)) => Ok(FetchedMedia {
                bytes,
                mime,
                via_proxy: true,
            }),
            Err(proxy_failure) => Err(DeskError::NetworkFetch(format!(
                "direct: {}; proxy: {}",
                direct_failure, proxy_failure
            ))),
        }
    }

    fn attempt(&self, url: &str, kind: MediaKind) -> std::result::Result<(Vec<u8>, String), String> {
        let resp = self.transport.get(url).map_err(|e| e.to_string())?;
        if !(200..300).contains(&resp.status) {
            return Err(format!("HTTP {}", resp.status));
        }
        let mime = media_type(resp.content_type.as_deref());
        if !usable(kind, &mime) {
            return Err(format!("unexpected content type {}", mime));
        }
        debug!(url, bytes = resp.bytes.len(), mime = %mime, "fetched media");
        Ok((resp.bytes, mime))
    }
}

/// The bare MIME type, parameters dropped. Missing headers count as octet-stream.
fn media_type(content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty())
        .unwrap_or_else(|| OCTET_STREAM.to_string())
}

fn usable(kind: MediaKind, mime: &str) -> bool {
    let prefix = match kind {
        MediaKind::Video => "video/",
        MediaKind::Image => "image/",
    };
    mime.starts_with(prefix) || mime == OCTET_STREAM
}
