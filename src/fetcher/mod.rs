use std::net::IpAddr;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

use crate::normalizer::{NormalizedStudent, Normalizer};

pub const DEFAULT_API_HOST: &str = "dvonb.xyz";
pub const DEFAULT_TERM: &str = "2025-fall";
pub const DEFAULT_COURSE: &str = "itis-3135";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },

    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error! status: {status}")]
    Status { status: u16 },

    #[error("request failed: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    #[error("response is not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read payload file: {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// `https://<host>/api/<term>/<course>/students?full=1`
pub fn endpoint_url(host: &str, term: &str, course: &str) -> String {
    let host = host
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    format!(
        "https://{host}/api/{}/{}/students?full=1",
        term.trim().trim_matches('/'),
        course.trim().trim_matches('/')
    )
}

/// Scheme, host and port of `url`, used to absolutize relative media paths.
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Pulls the list of student objects out of whatever envelope the API used:
/// a bare array, `{"data": [...]}`, `{"students": [...]}`, or an object whose
/// values are the records. Anything else, and any entry that is not an
/// object, is dropped.
pub fn extract_records(payload: Value) -> Vec<Value> {
    let entries = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if matches!(map.get("data"), Some(Value::Array(_))) {
                match map.remove("data") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                }
            } else if matches!(map.get("students"), Some(Value::Array(_))) {
                match map.remove("students") {
                    Some(Value::Array(items)) => items,
                    _ => Vec::new(),
                }
            } else {
                map.into_iter().map(|(_, v)| v).collect()
            }
        }
        _ => Vec::new(),
    };
    entries.into_iter().filter(Value::is_object).collect()
}

pub fn parse_payload(body: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Parse { source: e })
}

#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    /// `None` waits for the server indefinitely.
    pub timeout_seconds: Option<u64>,
    pub proxy: Option<String>,
}

fn is_loopback(url: &reqwest::Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    host.eq_ignore_ascii_case("localhost")
        || host
            .trim_matches(|c| c == '[' || c == ']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

fn build_client(options: &ClientOptions, direct: bool) -> Result<reqwest::Client, FetchError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "rollcall/",
            env!("CARGO_PKG_VERSION")
        )),
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10));
    if let Some(secs) = options.timeout_seconds.filter(|s| *s > 0) {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if let Some(proxy) = options.proxy.as_deref().filter(|p| !p.trim().is_empty()) {
        let proxy = reqwest::Proxy::all(proxy).map_err(|e| FetchError::ProxySetup {
            proxy: proxy.to_string(),
            source: e,
        })?;
        builder = builder.proxy(proxy);
    } else if direct {
        builder = builder.no_proxy();
    }
    builder
        .build()
        .map_err(|e| FetchError::ClientBuild { source: e })
}

/// Read-only client for the class directory endpoint.
#[derive(Clone, Debug)]
pub struct DirectoryClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

impl DirectoryClient {
    pub fn new(endpoint: &str, options: &ClientOptions) -> Result<Self, FetchError> {
        let endpoint = reqwest::Url::parse(endpoint.trim()).map_err(|_| {
            FetchError::InvalidEndpoint {
                url: endpoint.to_string(),
            }
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(FetchError::InvalidEndpoint {
                url: endpoint.to_string(),
            });
        }
        // Loopback endpoints never go through environment proxies.
        let direct = is_loopback(&endpoint);
        Ok(Self {
            client: build_client(options, direct)?,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Issues the single GET and returns the decoded body.
    pub async fn fetch_payload(&self) -> Result<Value, FetchError> {
        let resp = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| FetchError::Network { source: e })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp
            .bytes()
            .await
            .map_err(|e| FetchError::Network { source: e })?;
        parse_payload(&body)
    }

    pub async fn fetch_students(
        &self,
        normalizer: &Normalizer,
    ) -> Result<Vec<NormalizedStudent>, FetchError> {
        let payload = self.fetch_payload().await?;
        Ok(normalizer.normalize_all(&extract_records(payload)))
    }
}

/// Reads a payload saved from an earlier response.
pub async fn load_payload_file(path: &str) -> Result<Value, FetchError> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| FetchError::FileRead {
            path: path.to_string(),
            source: e,
        })?;
    parse_payload(&body)
}
