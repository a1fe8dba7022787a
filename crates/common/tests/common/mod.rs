//! Shared test utilities for pipeline and transport integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use ::common::codec;
use ::common::crypto::{KdfParams, Passphrase};
use ::common::namespace::Namespace;
use ::common::pipeline::Pipeline;
use ::common::session::Session;
use ::common::transport::{MemoryTransport, TwinkleClient};

pub const NETWORK: &str = "mocha-4";

/// Cheap key derivation so tests stay fast
pub fn fast_params() -> KdfParams {
    KdfParams::new(256, 1, 1).unwrap()
}

pub fn session(passphrase: &str) -> Session {
    Session::from_passphrase(Passphrase::new(passphrase).unwrap(), None)
}

/// A pipeline over an in-process transport
pub fn memory_pipeline(namespace: &str) -> Pipeline<MemoryTransport> {
    Pipeline::new(
        MemoryTransport::new(),
        Namespace::pad(namespace.as_bytes()),
        NETWORK,
    )
    .with_kdf_params(fast_params())
}

#[derive(Debug, Clone)]
struct MockBlob {
    namespace: Vec<u8>,
    network: String,
    height: u64,
    commitment: String,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    height: u64,
    blobs: Vec<MockBlob>,
    api_key: Option<String>,
    requests: usize,
}

/// In-process stand-in for the Twinkle blob API
#[derive(Debug, Clone, Default)]
pub struct MockTwinkle {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Deserialize)]
struct SubmitBody {
    namespace: String,
    data: String,
    network: String,
}

impl MockTwinkle {
    /// Require `Authorization: Bearer <key>` on every request
    pub fn with_api_key(key: &str) -> Self {
        let mock = Self::default();
        mock.state.lock().unwrap().api_key = Some(key.to_string());
        mock
    }

    pub fn requests(&self) -> usize {
        self.state.lock().unwrap().requests
    }

    pub fn blob_count(&self) -> usize {
        self.state.lock().unwrap().blobs.len()
    }

    /// Bind to an ephemeral port and serve until the test ends
    pub async fn spawn(self) -> Url {
        let app = Router::new()
            .route("/v0/blob", get(get_blob).post(submit_blob))
            .route("/v0/namespace/blobs", get(list_blobs))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let mut state = self.state.lock().unwrap();
        state.requests += 1;
        let Some(key) = state.api_key.as_ref() else {
            return Ok(());
        };
        let expected = format!("Bearer {}", key);
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some(value) if value == expected => Ok(()),
            _ => Err((StatusCode::UNAUTHORIZED, "missing or invalid API key").into_response()),
        }
    }
}

async fn submit_blob(
    State(mock): State<MockTwinkle>,
    headers: HeaderMap,
    Json(body): Json<SubmitBody>,
) -> Response {
    if let Err(response) = mock.authorize(&headers) {
        return response;
    }
    let (Ok(namespace), Ok(data)) = (codec::from_hex(&body.namespace), codec::from_hex(&body.data))
    else {
        return (StatusCode::BAD_REQUEST, "invalid hex").into_response();
    };
    if namespace.len() != 29 {
        return (StatusCode::BAD_REQUEST, "namespace must be 29 bytes").into_response();
    }

    let mut state = mock.state.lock().unwrap();
    state.height += 1;
    let height = state.height;
    let commitment = codec::to_base64(format!("commitment-{:024}", height));
    state.blobs.push(MockBlob {
        namespace,
        network: body.network,
        height,
        commitment: commitment.clone(),
        data,
    });

    Json(json!({
        "blockHeight": height,
        "commitment": commitment,
        "celestiaTransactionId": format!("tx{}", height),
        "gasFeeUsdCents": 0.25,
        "twinkleRequestId": format!("req-{}", height),
        "blockExplorer": {
            "transaction": format!("https://explorer.test/tx/tx{}", height),
            "block": format!("https://explorer.test/block/{}", height),
        }
    }))
    .into_response()
}

fn query_namespace(params: &HashMap<String, String>) -> Option<Vec<u8>> {
    params
        .get("namespace")
        .and_then(|ns| codec::from_base64(ns).ok())
}

async fn get_blob(
    State(mock): State<MockTwinkle>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = mock.authorize(&headers) {
        return response;
    }
    let (Some(namespace), Some(commitment), Some(height), Some(network)) = (
        query_namespace(&params),
        params.get("blobCommitment"),
        params.get("height").and_then(|h| h.parse::<u64>().ok()),
        params.get("network"),
    ) else {
        return (StatusCode::BAD_REQUEST, "missing parameters").into_response();
    };

    let state = mock.state.lock().unwrap();
    let found = state.blobs.iter().find(|blob| {
        blob.namespace == namespace
            && blob.height == height
            && &blob.commitment == commitment
            && &blob.network == network
    });
    match found {
        Some(blob) => Json(json!({ "data": codec::to_base64(&blob.data) })).into_response(),
        None => (StatusCode::NOT_FOUND, "blob not found").into_response(),
    }
}

async fn list_blobs(
    State(mock): State<MockTwinkle>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = mock.authorize(&headers) {
        return response;
    }
    let (Some(namespace), Some(network)) = (query_namespace(&params), params.get("network"))
    else {
        return (StatusCode::BAD_REQUEST, "missing parameters").into_response();
    };

    let state = mock.state.lock().unwrap();
    let blobs: Vec<_> = state
        .blobs
        .iter()
        .filter(|blob| blob.namespace == namespace && &blob.network == network)
        .map(|blob| {
            json!({
                "data": codec::to_base64(&blob.data),
                "height": blob.height,
                "commitment": blob.commitment,
            })
        })
        .collect();
    Json(json!({ "blobs": blobs })).into_response()
}

/// A Twinkle client pointed at a running mock
pub fn twinkle_client(url: &Url, api_key: Option<&str>) -> TwinkleClient {
    TwinkleClient::new(url, api_key, Duration::from_secs(10)).unwrap()
}
