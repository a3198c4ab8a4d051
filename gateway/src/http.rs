//! HTTP transport to a gateway peer's REST endpoint.
//!
//! Every call is one `POST` of a JSON body to
//! `{peer_url}/v1/channels/{channel}/contracts/{contract}/{submit|evaluate}`:
//!
//! ```json
//! { "proposal": { ... }, "signature": "<hex>", "endorsing_peers": ["peer0.org1.example.com:7051"] }
//! ```
//!
//! The peer answers `{"payload": "<hex>"}` on success or
//! `{"error": {"kind": "...", "message": "..."}}` on failure, where `kind` is
//! one of `endorsement`, `timeout`, `rejected`, `key_not_found`,
//! `invalid_argument`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::proposal::{Proposal, SignedProposal};
use crate::transport::{
    ChannelBinding, EndorsementTargets, LedgerConnector, LedgerFault, LedgerTransport,
};
use crate::GatewayError;

/// Default TCP connect timeout; the request timeout comes from the topology.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds [`HttpTransport`]s.
#[derive(Clone, Debug)]
pub struct HttpConnector {
    connect_timeout: Duration,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerConnector for HttpConnector {
    async fn connect(
        &self,
        binding: &ChannelBinding,
    ) -> Result<Arc<dyn LedgerTransport>, GatewayError> {
        let transport = HttpTransport::new(
            &binding.gateway_peer.url,
            &binding.channel,
            &binding.contract,
            binding.topology.timeout(),
            self.connect_timeout,
        )?;
        Ok(Arc::new(transport))
    }
}

/// JSON-over-HTTP transport bound to one channel/contract on one gateway peer.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct ProposalBody<'a> {
    proposal: &'a Proposal,
    signature: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    endorsing_peers: Option<Vec<&'a str>>,
}

#[derive(Debug, Deserialize)]
struct GatewayResponse {
    #[serde(default)]
    payload: Option<String>,
    #[serde(default)]
    error: Option<GatewayFault>,
}

#[derive(Debug, Deserialize)]
struct GatewayFault {
    kind: String,
    #[serde(default)]
    message: String,
}

impl HttpTransport {
    pub fn new(
        peer_url: &str,
        channel: &str,
        contract: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: format!(
                "{}/v1/channels/{}/contracts/{}",
                peer_url.trim_end_matches('/'),
                channel,
                contract
            ),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, action: &str, body: &ProposalBody<'_>) -> Result<Vec<u8>, LedgerFault> {
        let url = format!("{}/{}", self.base_url, action);
        let response = self.http.post(&url).json(body).send().await.map_err(|e| {
            if e.is_timeout() {
                LedgerFault::Timeout(format!("request timed out: {e}"))
            } else {
                LedgerFault::Unavailable(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                LedgerFault::Timeout(format!("response timed out: {e}"))
            } else {
                LedgerFault::Unavailable(format!("failed to read response: {e}"))
            }
        })?;

        let parsed: Option<GatewayResponse> = serde_json::from_str(&text).ok();
        if let Some(fault) = parsed.as_ref().and_then(|r| r.error.as_ref()) {
            return Err(fault_from_wire(&fault.kind, &fault.message));
        }
        if !status.is_success() {
            return Err(LedgerFault::Unavailable(format!("gateway returned HTTP {status}")));
        }

        let payload = parsed
            .ok_or_else(|| LedgerFault::Unavailable("invalid JSON response".into()))?
            .payload
            .unwrap_or_default();
        hex::decode(&payload)
            .map_err(|e| LedgerFault::Unavailable(format!("invalid payload encoding: {e}")))
    }
}

#[async_trait]
impl LedgerTransport for HttpTransport {
    async fn submit(
        &self,
        proposal: &SignedProposal,
        targets: &EndorsementTargets,
    ) -> Result<Vec<u8>, LedgerFault> {
        let body = ProposalBody {
            proposal: &proposal.proposal,
            signature: &proposal.signature,
            endorsing_peers: targets
                .peers()
                .map(|peers| peers.iter().map(|p| p.as_str()).collect()),
        };
        self.post("submit", &body).await
    }

    async fn evaluate(&self, proposal: &SignedProposal) -> Result<Vec<u8>, LedgerFault> {
        let body = ProposalBody {
            proposal: &proposal.proposal,
            signature: &proposal.signature,
            endorsing_peers: None,
        };
        self.post("evaluate", &body).await
    }
}

fn fault_from_wire(kind: &str, message: &str) -> LedgerFault {
    let message = message.to_string();
    match kind {
        "endorsement" => LedgerFault::Endorsement(message),
        "timeout" => LedgerFault::Timeout(message),
        "key_not_found" => LedgerFault::KeyNotFound(message),
        "invalid_argument" => LedgerFault::InvalidArgument(message),
        _ => LedgerFault::Rejected(message),
    }
}
