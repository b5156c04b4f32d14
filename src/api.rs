//! HTTP client for the Megaphone backend.
//!
//! The backend issues rev-share authorization signatures, records
//! completed purchases and tracks incentivized interactions. Request
//! bodies mirror the backend's JSON conventions: camelCase keys, with
//! uint256 values carried as decimal strings.

use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MegaphoneError;

const API_KEY_HEADER: &str = "x-api-key";

/// Inputs for a rev-share signature request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRequest {
    pub amount: U256,
    pub auction_id: u64,
    pub fid: u64,
    /// Address credited with the revenue share.
    pub referrer: Address,
}

/// Payload for the best-effort purchase report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreBuyReport {
    pub auction_id: u64,
    pub fid: u64,
    pub amount: U256,
    pub tx_hash: B256,
    pub username: Option<String>,
    pub pfp_url: Option<String>,
    /// Operator fid credited for the referral.
    pub referrer: Option<u64>,
}

/// Backend acknowledgement of an incentivized interaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionReceipt {
    pub success: bool,
    pub fid: u64,
    pub auction_id: u64,
    pub interaction_level: u8,
}

/// The backend operations the purchase sequence depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreBuyBackend: Send + Sync {
    async fn rev_share_signature(
        &self,
        request: SignatureRequest,
    ) -> Result<Bytes, MegaphoneError>;

    async fn report_purchase(&self, report: PreBuyReport) -> Result<(), MegaphoneError>;

    async fn record_interaction(
        &self,
        fid: u64,
        interaction_level: u8,
    ) -> Result<InteractionReceipt, MegaphoneError>;
}

pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    /// Requests a signature authorizing a rev-share purchase. Requires an
    /// API key; fails with [`MegaphoneError::RevShare`] when the backend
    /// answers without a usable signature.
    pub async fn generate_signature(
        &self,
        request: &SignatureRequest,
    ) -> Result<Bytes, MegaphoneError> {
        debug!(auction_id = request.auction_id, fid = request.fid, "requesting rev-share signature");
        let response = self
            .keyed_post("/pre-buy/generate-signature")?
            .json(&signature_body(request))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        decode_signature(response.json::<SignatureResponse>().await?)
    }

    /// Reports a confirmed purchase so the backend can index it. No API
    /// key needed.
    pub async fn report_pre_buy(&self, report: &PreBuyReport) -> Result<(), MegaphoneError> {
        debug!(auction_id = report.auction_id, fid = report.fid, "reporting pre-buy");
        let response = self
            .post("/pre-buy/report-pre-buy")
            .json(&report_body(report))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(())
    }

    /// Records an incentivized interaction at level 1, 2 or 3. Requires
    /// an API key.
    pub async fn record_incentivized_interaction(
        &self,
        fid: u64,
        interaction_level: u8,
    ) -> Result<InteractionReceipt, MegaphoneError> {
        validate_interaction_level(interaction_level)?;

        debug!(fid, interaction_level, "recording incentivized interaction");
        let response = self
            .keyed_post("/incentivized-interaction")?
            .json(&InteractionBody {
                fid: fid.to_string(),
                interaction_level,
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }

        Ok(response.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    fn keyed_post(&self, path: &str) -> Result<RequestBuilder, MegaphoneError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MegaphoneError::config("an API key is required for this backend operation")
        })?;
        Ok(self.post(path).header(API_KEY_HEADER, api_key))
    }
}

#[async_trait]
impl PreBuyBackend for BackendClient {
    async fn rev_share_signature(
        &self,
        request: SignatureRequest,
    ) -> Result<Bytes, MegaphoneError> {
        self.generate_signature(&request).await
    }

    async fn report_purchase(&self, report: PreBuyReport) -> Result<(), MegaphoneError> {
        self.report_pre_buy(&report).await
    }

    async fn record_interaction(
        &self,
        fid: u64,
        interaction_level: u8,
    ) -> Result<InteractionReceipt, MegaphoneError> {
        self.record_incentivized_interaction(fid, interaction_level).await
    }
}

pub(crate) fn validate_interaction_level(level: u8) -> Result<(), MegaphoneError> {
    if !(1..=3).contains(&level) {
        return Err(MegaphoneError::Validation(format!(
            "interaction level must be 1, 2 or 3, got {level}"
        )));
    }

    Ok(())
}

async fn backend_error(response: reqwest::Response) -> MegaphoneError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    MegaphoneError::Backend {
        status: status.as_u16(),
        message: error_message(status, &body),
    }
}

/// Prefers the backend's `{"error": "..."}` body; falls back to the
/// status line when the body is absent or not JSON.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_owned()
        })
}

fn decode_signature(payload: SignatureResponse) -> Result<Bytes, MegaphoneError> {
    let raw = payload
        .signature
        .ok_or_else(|| MegaphoneError::RevShare("backend returned no signature".into()))?;
    let signature = raw
        .parse::<Bytes>()
        .map_err(|_| MegaphoneError::RevShare(format!("malformed signature: {raw}")))?;
    if signature.is_empty() {
        return Err(MegaphoneError::RevShare(
            "backend returned an empty signature".into(),
        ));
    }

    Ok(signature)
}

fn signature_body(request: &SignatureRequest) -> SignatureBody {
    SignatureBody {
        amount: request.amount.to_string(),
        auction_id: request.auction_id.to_string(),
        fid: request.fid.to_string(),
        referrer: request.referrer.to_string(),
    }
}

fn report_body(report: &PreBuyReport) -> ReportBody {
    ReportBody {
        auction_id: report.auction_id.to_string(),
        fid: report.fid.to_string(),
        amount: report.amount.to_string(),
        tx_hash: report.tx_hash.to_string(),
        username: report.username.clone(),
        pfp_url: report.pfp_url.clone(),
        referrer: report.referrer.map(|fid| fid.to_string()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignatureBody {
    amount: String,
    auction_id: String,
    fid: String,
    referrer: String,
}

#[derive(Debug, Deserialize)]
struct SignatureResponse {
    signature: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportBody {
    auction_id: String,
    fid: String,
    amount: String,
    tx_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pfp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    referrer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InteractionBody {
    fid: String,
    interaction_level: u8,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}
