//! Proxmox VE upstream client.
//!
//! One outbound call per gateway request, no retry and no circuit breaker;
//! the upstream is a trusted internal service and a failed call is one
//! reported failure. The client enforces a request timeout, and dropping the
//! in-flight future (inbound connection gone) cancels the outbound call.

use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use pvegate_common::{Error, Result};

/// Pool whose members are the launchable resource templates.
const TEMPLATE_POOL: &str = "Templates";

/// Upstream connection settings.
///
/// `api_url` is the full API base, e.g. `https://pve.internal:8006/api2/json`.
#[derive(Clone, Debug)]
pub struct ProxmoxConfig {
    pub api_url: String,
    /// API token id, e.g. `gateway@pve!web`
    pub token_id: String,
    pub token_secret: String,
    pub timeout_secs: u64,
}

/// Client for the Proxmox VE management API.
pub struct ProxmoxClient {
    http: reqwest::Client,
    cfg: ProxmoxConfig,
}

impl ProxmoxClient {
    /// Build the client.
    ///
    /// Certificate validation is disabled for this client instance only: the
    /// upstream is an internal endpoint with a self-signed certificate. No
    /// other connection in the gateway shares this transport.
    pub fn new(cfg: ProxmoxConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| Error::Internal(format!("failed to build upstream client: {e}")))?;

        Ok(Self { http, cfg })
    }

    fn auth_header(&self) -> String {
        format!("PVEAPIToken={}={}", self.cfg.token_id, self.cfg.token_secret)
    }

    /// List the members of the template pool.
    pub async fn list_templates(&self) -> Result<Value> {
        let url = format!("{}/pools/{}", self.cfg.api_url, TEMPLATE_POOL);
        let request = self.http.get(&url);
        let body = self.execute("list_templates", request).await?;
        unwrap_members(body)
    }

    /// Open a VNC console-proxy session for one VM.
    ///
    /// Returns the short-lived session descriptor (ticket/port) the client
    /// uses to reach the hypervisor node directly; the console byte stream
    /// never passes through the gateway.
    pub async fn vnc_proxy(&self, node: &str, vmid: u32) -> Result<Value> {
        let url = format!(
            "{}/nodes/{}/qemu/{}/vncproxy",
            self.cfg.api_url, node, vmid
        );
        let request = self
            .http
            .post(&url)
            .json(&json!({"websocket": 1, "generate-password": 1}));
        let body = self.execute("vnc_proxy", request).await?;
        unwrap_data(body)
    }

    /// Send one upstream request and return the parsed JSON body.
    ///
    /// All failure modes (network error, timeout, non-2xx status, non-JSON
    /// body) come back as a gateway error; nothing escapes past here.
    async fn execute(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| self.classify(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            // Best available message; Proxmox puts details under "errors".
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("errors").map(|e| e.to_string()))
                .unwrap_or_default();
            warn!(operation, status = %status, "upstream returned an error status");
            return Err(Error::Upstream(format!(
                "upstream returned {status}{}{detail}",
                if detail.is_empty() { "" } else { ": " }
            )));
        }

        debug!(operation, status = %status, "upstream call succeeded");
        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Upstream(format!("invalid upstream body: {e}")))
    }

    fn classify(&self, operation: &str, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            warn!(operation, "upstream call timed out");
            Error::Timeout {
                seconds: self.cfg.timeout_secs,
            }
        } else {
            warn!(operation, error = %e, "upstream call failed");
            Error::Upstream(e.to_string())
        }
    }
}

/// Unwrap the upstream envelope down to `data`.
fn unwrap_data(body: Value) -> Result<Value> {
    match body {
        Value::Object(mut map) => map
            .remove("data")
            .ok_or_else(|| Error::Upstream("upstream response has no data field".into())),
        _ => Err(Error::Upstream("upstream response is not an object".into())),
    }
}

/// Unwrap the upstream envelope down to `data.members` (pool listing).
fn unwrap_members(body: Value) -> Result<Value> {
    let mut data = unwrap_data(body)?;
    match data.as_object_mut().and_then(|map| map.remove("members")) {
        Some(members) => Ok(members),
        None => Err(Error::Upstream(
            "upstream pool response has no members field".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_members_returns_inner_list_unchanged() {
        let body = json!({
            "data": {
                "members": [
                    {"vmid": 100, "name": "debian-template"},
                    {"vmid": 101, "name": "ubuntu-template"},
                ]
            }
        });
        let members = unwrap_members(body).unwrap();
        assert_eq!(members[0]["vmid"], 100);
        assert_eq!(members[1]["name"], "ubuntu-template");
    }

    #[test]
    fn test_unwrap_data_returns_session_descriptor() {
        let body = json!({"data": {"ticket": "abc", "port": 5901}});
        let data = unwrap_data(body).unwrap();
        assert_eq!(data["ticket"], "abc");
        assert_eq!(data["port"], 5901);
    }

    #[test]
    fn test_unexpected_shapes_are_upstream_errors() {
        assert!(unwrap_data(json!([1, 2, 3])).is_err());
        assert!(unwrap_data(json!({"result": {}})).is_err());
        assert!(unwrap_members(json!({"data": {}})).is_err());
        assert!(unwrap_members(json!({"data": null})).is_err());
    }

    #[test]
    fn test_auth_header_shape() {
        let client = ProxmoxClient::new(ProxmoxConfig {
            api_url: "https://pve.internal:8006/api2/json".into(),
            token_id: "gateway@pve!web".into(),
            token_secret: "s3cret".into(),
            timeout_secs: 10,
        })
        .unwrap();
        assert_eq!(client.auth_header(), "PVEAPIToken=gateway@pve!web=s3cret");
    }
}
