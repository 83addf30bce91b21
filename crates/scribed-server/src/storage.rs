//! Object storage client.
//!
//! Constructed once per worker alongside the model handle. The current
//! request path never touches it — audio arrives inline in the request
//! body — but the deployment contract constructs it at startup so a future
//! fetch-by-URI flow doesn't change the worker lifecycle. Construction
//! failure is a startup failure.

use tracing::info;

/// Minimal object-storage access client.
pub struct ObjectStorageClient {
    http: reqwest::Client,
    endpoint: Option<String>,
    bucket: Option<String>,
}

impl ObjectStorageClient {
    /// Build the client from the environment.
    ///
    /// Reads `SCRIBED_STORAGE_ENDPOINT` and `SCRIBED_STORAGE_BUCKET`; both
    /// are optional because the request path does not use storage yet.
    pub fn from_env() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        let endpoint = std::env::var("SCRIBED_STORAGE_ENDPOINT").ok();
        let bucket = std::env::var("SCRIBED_STORAGE_BUCKET").ok();
        info!(
            configured = endpoint.is_some(),
            "object storage client constructed"
        );
        Ok(Self { http, endpoint, bucket })
    }

    /// Whether an endpoint and bucket are configured.
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.bucket.is_some()
    }

    /// Fetch an object by key. Reserved for the future fetch-by-URI flow.
    pub async fn fetch(&self, key: &str) -> Result<bytes::Bytes, String> {
        let (Some(endpoint), Some(bucket)) = (&self.endpoint, &self.bucket) else {
            return Err("object storage not configured".into());
        };
        let url = format!("{endpoint}/{bucket}/{key}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| format!("storage request: {e}"))?;
        if !response.status().is_success() {
            return Err(format!("storage returned {}", response.status()));
        }
        response
            .bytes()
            .await
            .map_err(|e| format!("storage body: {e}"))
    }
}
