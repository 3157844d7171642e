//! Library server client: folder listings and media capabilities over JSON-RPC

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::LibraryError;
use crate::{log_rpc_request, log_rpc_result};
use super::types::{FolderId, MediaCapabilities, MediaId};

pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8069";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const FOLDER_MODEL: &str = "oovideo.folder";
const MEDIA_MODEL: &str = "oovideo.media";

/// Remote metadata service the browser and player sessions talk to
#[async_trait]
pub trait LibraryService: Send + Sync {
    /// Listing of `folder` (root when `None`), still transport-encoded as JSON
    async fn browse_folder(&self, folder: Option<FolderId>) -> Result<String, LibraryError>;

    async fn media_info(&self, media: MediaId) -> Result<MediaCapabilities, LibraryError>;
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<RpcErrorData>,
}

#[derive(Deserialize)]
struct RpcErrorData {
    #[serde(default)]
    message: String,
}

impl RpcErrorBody {
    fn into_message(self) -> String {
        match self.data {
            Some(data) if !data.message.is_empty() => data.message,
            _ => self.message,
        }
    }
}

/// JSON-RPC client for the library server
#[derive(Clone, Debug)]
pub struct RpcLibraryClient {
    client: Client,
    base_url: String,
    next_id: Arc<AtomicU64>,
}

impl RpcLibraryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LibraryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing reqwest client (shared pool, proxy settings)
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/web/dataset/call_kw/{}/{}", self.base_url, model, method)
    }

    fn request_body(&self, model: &str, method: &str, args: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "method": "call",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "params": {
                "model": model,
                "method": method,
                "args": args,
                "kwargs": {},
            },
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        args: Value,
    ) -> Result<T, LibraryError> {
        let body = self.request_body(model, method, args);
        let response: RpcResponse = self
            .client
            .post(self.endpoint(model, method))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        decode_response(response)
    }
}

fn decode_response<T: DeserializeOwned>(response: RpcResponse) -> Result<T, LibraryError> {
    if let Some(error) = response.error {
        return Err(LibraryError::Rpc {
            message: error.into_message(),
        });
    }
    Ok(serde_json::from_value(response.result.unwrap_or(Value::Null))?)
}

#[async_trait]
impl LibraryService for RpcLibraryClient {
    async fn browse_folder(&self, folder: Option<FolderId>) -> Result<String, LibraryError> {
        log_rpc_request!("browse_folder", folder_id = ?folder);
        // An empty recordset (`false`) lists the root folders
        let arg = folder.map_or(Value::Bool(false), Value::from);
        let result = self.call(FOLDER_MODEL, "oovideo_browse", json!([arg])).await;
        log_rpc_result!("browse_folder", result);
        result
    }

    async fn media_info(&self, media: MediaId) -> Result<MediaCapabilities, LibraryError> {
        log_rpc_request!("media_info", media_id = media);
        let result = self.call(MEDIA_MODEL, "oovideo_media_info", json!([media])).await;
        log_rpc_result!("media_info", result);
        result
    }
}
