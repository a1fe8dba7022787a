use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{BlobTransport, BlockExplorer, ListedBlob, Locator, SubmitReceipt, TransportError};
use crate::codec;
use crate::namespace::Namespace;

pub const DEFAULT_API_URL: &str = "https://t.tech";
pub const DEFAULT_NETWORK: &str = "mocha-4";

/// A single call against the Twinkle API
pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client)
        -> Result<RequestBuilder, TransportError>;
}

// Join relative to the base path so relays mounted under a prefix keep it
fn endpoint(base_url: &Url, path: &str) -> Result<Url, TransportError> {
    let mut base = base_url.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(path)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitBlobRequest {
    /// Hex of the 29 byte namespace
    pub namespace: String,
    /// Hex of the blob
    pub data: String,
    pub network: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBlobResponse {
    pub block_height: u64,
    pub commitment: String,
    #[serde(default)]
    pub celestia_transaction_id: Option<String>,
    #[serde(default)]
    pub gas_fee_usd_cents: Option<f64>,
    #[serde(default)]
    pub twinkle_request_id: Option<String>,
    #[serde(default)]
    pub block_explorer: BlockExplorer,
}

impl ApiRequest for SubmitBlobRequest {
    type Response = SubmitBlobResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, TransportError> {
        let full_url = endpoint(base_url, "v0/blob")?;
        Ok(client.post(full_url).json(&self))
    }
}

#[derive(Debug, Clone)]
pub struct GetBlobRequest {
    /// Base64 of the 29 byte namespace
    pub namespace: String,
    pub commitment: String,
    pub height: u64,
    pub network: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetBlobResponse {
    /// Base64 of the blob
    #[serde(default)]
    pub data: Option<String>,
}

impl ApiRequest for GetBlobRequest {
    type Response = GetBlobResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, TransportError> {
        let full_url = endpoint(base_url, "v0/blob")?;
        Ok(client.get(full_url).query(&[
            ("namespace", self.namespace),
            ("blobCommitment", self.commitment),
            ("height", self.height.to_string()),
            ("network", self.network),
        ]))
    }
}

#[derive(Debug, Clone)]
pub struct ListBlobsRequest {
    /// Base64 of the 29 byte namespace
    pub namespace: String,
    pub network: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListBlobsResponse {
    #[serde(default)]
    pub blobs: Vec<ListedBlobResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListedBlobResponse {
    pub data: String,
    pub height: u64,
    pub commitment: String,
}

impl ApiRequest for ListBlobsRequest {
    type Response = ListBlobsResponse;

    fn build_request(
        self,
        base_url: &Url,
        client: &Client,
    ) -> Result<RequestBuilder, TransportError> {
        let full_url = endpoint(base_url, "v0/namespace/blobs")?;
        Ok(client.get(full_url).query(&[
            ("namespace", self.namespace),
            ("network", self.network),
        ]))
    }
}

/// HTTP client for the Twinkle blob API
///
/// When an API key is given it is sent as a bearer token on every request.
///  Without one the client expects to be pointed at a relay that adds it.
#[derive(Debug, Clone)]
pub struct TwinkleClient {
    pub remote: Url,
    client: Client,
}

impl TwinkleClient {
    pub fn new(
        remote: &Url,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| TransportError::InvalidApiKey(e.to_string()))?;
            value.set_sensitive(true);
            default_headers.insert(AUTHORIZATION, value);
        }
        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, TransportError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(TransportError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.remote
    }
}

#[async_trait]
impl BlobTransport for TwinkleClient {
    async fn submit(
        &self,
        namespace: &Namespace,
        data: &[u8],
        network: &str,
    ) -> Result<SubmitReceipt, TransportError> {
        let request = SubmitBlobRequest {
            namespace: namespace.to_hex(),
            data: codec::to_hex(data),
            network: network.to_string(),
        };
        let response = self.call(request).await?;
        tracing::info!(
            height = response.block_height,
            commitment = %response.commitment,
            network,
            "blob submitted"
        );

        Ok(SubmitReceipt {
            locator: Locator::new(response.block_height, response.commitment),
            transaction_id: response.celestia_transaction_id,
            fee_usd_cents: response.gas_fee_usd_cents,
            request_id: response.twinkle_request_id,
            explorer: response.block_explorer,
        })
    }

    async fn fetch(
        &self,
        namespace: &Namespace,
        locator: &Locator,
        network: &str,
    ) -> Result<Vec<u8>, TransportError> {
        let request = GetBlobRequest {
            namespace: namespace.to_base64(),
            commitment: locator.commitment.clone(),
            height: locator.height,
            network: network.to_string(),
        };
        tracing::debug!(%locator, network, "fetching blob");

        let response = match self.call(request).await {
            Ok(response) => response,
            Err(TransportError::HttpStatus(status, _)) if status == StatusCode::NOT_FOUND => {
                return Err(TransportError::NotFound(locator.clone()))
            }
            Err(e) => return Err(e),
        };

        match response.data {
            Some(data) => Ok(codec::from_base64(&data)?),
            None => Err(TransportError::NotFound(locator.clone())),
        }
    }

    async fn list(
        &self,
        namespace: &Namespace,
        network: &str,
    ) -> Result<Vec<ListedBlob>, TransportError> {
        let request = ListBlobsRequest {
            namespace: namespace.to_base64(),
            network: network.to_string(),
        };

        // an unused namespace has no blobs, not an error
        let response = match self.call(request).await {
            Ok(response) => response,
            Err(TransportError::HttpStatus(status, _)) if status == StatusCode::NOT_FOUND => {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e),
        };

        response
            .blobs
            .into_iter()
            .map(|blob| {
                Ok(ListedBlob {
                    locator: Locator::new(blob.height, blob.commitment),
                    data: codec::from_base64(&blob.data)?,
                })
            })
            .collect()
    }
}
