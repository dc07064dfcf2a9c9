use crate::config::{Credentials, SentinelHubConfig};
use crate::core::request::ImageRequestSpec;
use crate::io::png::decode_png;
use crate::types::{PixelData, TileError, TileResult};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Source of raw tile pixels.
///
/// `Ok(None)` means the service answered without any image data.
pub trait ImageryClient {
    fn fetch(&mut self, spec: &ImageRequestSpec) -> TileResult<Option<PixelData>>;
}

/// Tokens are refreshed this long before they actually expire
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

// Process API request body

#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    input: ProcessInput<'a>,
    output: ProcessOutput,
    evalscript: &'a str,
}

#[derive(Debug, Serialize)]
struct ProcessInput<'a> {
    bounds: Bounds,
    data: Vec<InputData<'a>>,
}

#[derive(Debug, Serialize)]
struct Bounds {
    bbox: [f64; 4],
    properties: BoundsProperties,
}

#[derive(Debug, Serialize)]
struct BoundsProperties {
    crs: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InputData<'a> {
    #[serde(rename = "type")]
    collection: &'a str,
    data_filter: DataFilter,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataFilter {
    time_range: TimeRange,
}

#[derive(Debug, Serialize)]
struct TimeRange {
    from: String,
    to: String,
}

#[derive(Debug, Serialize)]
struct ProcessOutput {
    width: u32,
    height: u32,
    responses: Vec<OutputResponse>,
}

#[derive(Debug, Serialize)]
struct OutputResponse {
    identifier: &'static str,
    format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct OutputFormat {
    #[serde(rename = "type")]
    mime: &'static str,
}

impl<'a> ProcessRequest<'a> {
    fn from_spec(spec: &'a ImageRequestSpec) -> Self {
        let (width, height) = spec.size;
        Self {
            input: ProcessInput {
                bounds: Bounds {
                    bbox: spec.bbox.as_array(),
                    properties: BoundsProperties {
                        crs: spec.bbox.crs.opengis_url(),
                    },
                },
                data: vec![InputData {
                    collection: spec.collection.api_id(),
                    data_filter: DataFilter {
                        time_range: TimeRange {
                            from: spec.time_interval.from.to_rfc3339_opts(SecondsFormat::Secs, true),
                            to: spec.time_interval.to.to_rfc3339_opts(SecondsFormat::Secs, true),
                        },
                    },
                }],
            },
            output: ProcessOutput {
                width,
                height,
                responses: vec![OutputResponse {
                    identifier: "default",
                    format: OutputFormat { mime: "image/png" },
                }],
            },
            evalscript: spec.evalscript,
        }
    }
}

/// Absolute expiry for a token issued at `issued_at` with a lifetime in seconds
fn token_expiry(issued_at: DateTime<Utc>, expires_in: i64) -> TileResult<DateTime<Utc>> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
        .ok_or_else(|| TileError::Auth(format!("invalid token lifetime: {}s", expires_in)))
}

/// Blocking client for the Sentinel Hub Process API.
///
/// One instance holds the OAuth token for the whole run; it is requested on
/// the first fetch and renewed only after it expires.
pub struct SentinelHubClient {
    http: reqwest::blocking::Client,
    config: SentinelHubConfig,
    credentials: Credentials,
    token: Option<AccessToken>,
}

impl SentinelHubClient {
    pub fn new(credentials: Credentials, config: SentinelHubConfig) -> TileResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TileError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            credentials,
            token: None,
        })
    }

    /// Return a valid bearer token, requesting a new one if needed
    fn access_token(&mut self) -> TileResult<String> {
        let now = Utc::now();
        if let Some(token) = self.token.as_ref().filter(|t| t.is_valid_at(now)) {
            return Ok(token.value.clone());
        }

        log::info!("Requesting Sentinel Hub access token");
        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .map_err(|e| TileError::Auth(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TileError::Auth(format!(
                "token request failed with status {}: {}",
                status, body
            )));
        }

        let parsed: TokenResponse = response
            .json()
            .map_err(|e| TileError::Auth(format!("invalid token response: {}", e)))?;

        let token = AccessToken {
            value: parsed.access_token,
            expires_at: token_expiry(now, parsed.expires_in)?,
        };
        log::debug!("Access token valid until {}", token.expires_at);

        let value = token.value.clone();
        self.token = Some(token);
        Ok(value)
    }
}

impl ImageryClient for SentinelHubClient {
    fn fetch(&mut self, spec: &ImageRequestSpec) -> TileResult<Option<PixelData>> {
        let token = self.access_token()?;
        let body = ProcessRequest::from_spec(spec);

        log::debug!(
            "Process request: bbox={:?} size={:?} collection={}",
            spec.bbox.as_array(), spec.size, spec.collection
        );

        let response = self
            .http
            .post(&self.config.process_url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "image/png")
            .json(&body)
            .send()
            .map_err(|e| TileError::Http(format!("Process API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(TileError::Http(format!(
                "Process API request failed with status {}: {}",
                status, text
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| TileError::Http(format!("Failed to read response bytes: {}", e)))?;

        if bytes.is_empty() {
            log::warn!("Process API returned an empty body for bbox {:?}", spec.bbox.as_array());
            return Ok(None);
        }

        log::debug!("Received {} bytes", bytes.len());
        decode_png(&bytes).map(Some)
    }
}
