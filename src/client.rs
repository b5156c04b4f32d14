//! Top-level Megaphone client and the orchestrated pre-buy sequence.

use alloy::{
    primitives::{Address, B256, U256},
    providers::Provider,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    api::{BackendClient, InteractionReceipt, PreBuyBackend, PreBuyReport, SignatureRequest},
    config::MegaphoneOptions,
    contract::{AuctionChain, AuctionSnapshot, MegaphoneContracts, PreBuyData, PreBuySettings},
    error::MegaphoneError,
    window::{AvailableDay, build_window},
};

/// Identifies the buyer and the slot being reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreBuyRequest {
    pub auction_id: u64,
    /// Farcaster id shown on the reserved day.
    pub fid: u64,
    pub display_name: String,
    /// Address paying for and receiving the slot.
    pub buyer: Address,
}

/// Outcome of one purchase attempt. `success` is false when the purchase
/// transaction mined but reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreBuyTransactionResult {
    pub success: bool,
    pub transaction_hash: B256,
}

/// Read-only view of what a client instance is wired to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfiguration {
    pub chain_id: u64,
    pub megaphone_address: Address,
    pub usdc_address: Address,
    pub backend_url: String,
    pub api_key_configured: bool,
    pub operator_fid: u64,
}

pub struct Megaphone<P>
where
    P: Provider + Clone,
{
    options: MegaphoneOptions,
    contracts: MegaphoneContracts<P>,
    backend: BackendClient,
}

impl<P> Megaphone<P>
where
    P: Provider + Clone,
{
    /// Builds a client without touching the network.
    pub fn new(provider: P, options: MegaphoneOptions) -> Self {
        let network = options.network;
        let contracts = MegaphoneContracts::new(
            provider,
            network.megaphone_address(),
            network.usdc_address(),
        );
        let backend = BackendClient::new(network.backend_url(), options.api_key.clone());

        Self {
            options,
            contracts,
            backend,
        }
    }

    /// Builds a client and checks that the provider is actually connected
    /// to the selected network.
    pub async fn connect(provider: P, options: MegaphoneOptions) -> Result<Self, MegaphoneError> {
        let client = Self::new(provider, options);
        let chain_id = client.contracts.chain_id().await?;
        let expected = client.options.network.chain_id();
        if chain_id != expected {
            return Err(MegaphoneError::config(format!(
                "provider is on chain {chain_id} but {:?} expects {expected}",
                client.options.network
            )));
        }
        info!(chain_id, network = ?client.options.network, "megaphone client connected");

        Ok(client)
    }

    pub fn configuration(&self) -> ClientConfiguration {
        ClientConfiguration {
            chain_id: self.options.network.chain_id(),
            megaphone_address: self.contracts.megaphone_address(),
            usdc_address: self.contracts.usdc_address(),
            backend_url: self.options.network.backend_url().to_owned(),
            api_key_configured: self.options.api_key.is_some(),
            operator_fid: self.options.operator_fid,
        }
    }

    pub async fn auction_snapshot(&self) -> Result<AuctionSnapshot, MegaphoneError> {
        self.contracts.auction_snapshot().await
    }

    pub async fn pre_buy_settings(&self) -> Result<PreBuySettings, MegaphoneError> {
        self.contracts.pre_buy_settings().await
    }

    pub async fn pre_buy_data(&self) -> Result<PreBuyData, MegaphoneError> {
        self.contracts.pre_buy_data().await
    }

    /// The ordered list of reservable future days, derived from one
    /// aggregated contract read.
    pub async fn available_days(&self) -> Result<Vec<AvailableDay>, MegaphoneError> {
        let data = self.contracts.pre_buy_data().await?;
        build_window(
            data.settings.min_pre_buy_id,
            data.settings.max_pre_buy_id,
            &data.pre_buy_status,
            data.snapshot.current_auction_id,
            data.snapshot.current_auction_end_time,
        )
    }

    pub async fn pre_buy_amount(&self) -> Result<U256, MegaphoneError> {
        self.contracts.pre_buy_amount().await
    }

    pub async fn usdc_balance(&self, account: Address) -> Result<U256, MegaphoneError> {
        self.contracts.usdc_balance(account).await
    }

    pub async fn usdc_allowance(&self, owner: Address) -> Result<U256, MegaphoneError> {
        self.contracts.usdc_allowance(owner).await
    }

    /// Reserves a future day at the current pre-buy price.
    pub async fn pre_buy(
        &self,
        request: PreBuyRequest,
    ) -> Result<PreBuyTransactionResult, MegaphoneError> {
        execute_pre_buy(&self.contracts, &self.backend, self.plan(request, None)).await
    }

    /// Reserves a future day with referral attribution. The referrer is
    /// credited a revenue share on-chain; requires an API key.
    pub async fn pre_buy_with_rev_share(
        &self,
        request: PreBuyRequest,
        referrer: Address,
    ) -> Result<PreBuyTransactionResult, MegaphoneError> {
        execute_pre_buy(&self.contracts, &self.backend, self.plan(request, Some(referrer))).await
    }

    pub async fn record_incentivized_interaction(
        &self,
        fid: u64,
        interaction_level: u8,
    ) -> Result<InteractionReceipt, MegaphoneError> {
        self.backend
            .record_incentivized_interaction(fid, interaction_level)
            .await
    }

    fn plan(&self, request: PreBuyRequest, referrer: Option<Address>) -> PreBuyPlan {
        PreBuyPlan {
            request,
            referrer,
            api_key_configured: self.options.api_key.is_some(),
            operator_fid: self.options.operator_fid,
        }
    }
}

struct PreBuyPlan {
    request: PreBuyRequest,
    referrer: Option<Address>,
    api_key_configured: bool,
    operator_fid: u64,
}

/// Runs the purchase sequence: price read, optional rev-share signature,
/// USDC approval, the purchase itself, then a best-effort report.
///
/// A reverted purchase is a normal outcome (`success: false`), not an
/// error, and is never reported. A failed report never fails a confirmed
/// purchase.
#[instrument(skip_all, fields(auction_id = plan.request.auction_id, fid = plan.request.fid))]
async fn execute_pre_buy<C, B>(
    chain: &C,
    backend: &B,
    plan: PreBuyPlan,
) -> Result<PreBuyTransactionResult, MegaphoneError>
where
    C: AuctionChain + ?Sized,
    B: PreBuyBackend + ?Sized,
{
    if plan.referrer.is_some() && !plan.api_key_configured {
        return Err(MegaphoneError::config(
            "an API key is required for rev-share purchases",
        ));
    }

    let request = &plan.request;
    let amount = chain.pre_buy_amount().await?;
    info!(%amount, "pre-buy price read");

    let authorization = match plan.referrer {
        Some(referrer) => {
            let signature = backend
                .rev_share_signature(SignatureRequest {
                    amount,
                    auction_id: request.auction_id,
                    fid: request.fid,
                    referrer,
                })
                .await?;
            info!(%referrer, "rev-share signature issued");
            Some((signature, referrer))
        }
        None => None,
    };

    chain.approve_usdc(request.buyer, amount).await?;

    let outcome = match authorization {
        Some((signature, referrer)) => {
            chain
                .pre_buy_auction_with_rev_share(
                    request.buyer,
                    amount,
                    request.auction_id,
                    request.fid,
                    request.display_name.clone(),
                    signature,
                    referrer,
                )
                .await?
        }
        None => {
            chain
                .pre_buy_auction(
                    request.buyer,
                    amount,
                    request.auction_id,
                    request.fid,
                    request.display_name.clone(),
                )
                .await?
        }
    };

    if outcome.success {
        info!(tx = %outcome.hash, "pre-buy confirmed");
        let report = PreBuyReport {
            auction_id: request.auction_id,
            fid: request.fid,
            amount,
            tx_hash: outcome.hash,
            username: Some(request.display_name.clone()),
            pfp_url: None,
            referrer: Some(plan.operator_fid),
        };
        if let Err(err) = backend.report_purchase(report).await {
            warn!(error = %err, "pre-buy report failed");
        }
    } else {
        warn!(tx = %outcome.hash, "pre-buy transaction reverted");
    }

    Ok(PreBuyTransactionResult {
        success: outcome.success,
        transaction_hash: outcome.hash,
    })
}
