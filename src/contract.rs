//! Typed access to the Megaphone auction contract and its USDC currency.

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, B256, Bytes, U256},
    providers::Provider,
    rpc::types::eth::TransactionRequest,
    sol_types::SolCall,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    abi::{IERC20, IMegaphone},
    error::MegaphoneError,
};

/// State of the currently running auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    pub current_auction_id: u64,
    /// Scheduled end of the running auction, unix seconds.
    pub current_auction_end_time: i64,
    pub settled: bool,
}

/// Pre-buy parameters from the contract settings.
///
/// `min_pre_buy_id` can be negative: the window the contract reports may
/// begin before the running auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreBuySettings {
    pub min_pre_buy_id: i64,
    pub max_pre_buy_id: i64,
    pub allow_pre_buy: bool,
    /// Current price of a pre-buy in USDC base units.
    pub pre_buy_price: U256,
    pub rev_share_percent: U256,
}

/// Everything the day-window builder needs, read in one multicall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreBuyData {
    pub snapshot: AuctionSnapshot,
    pub settings: PreBuySettings,
    /// `pre_buy_status[i]` covers relative day `min_pre_buy_id + i`.
    pub pre_buy_status: Vec<bool>,
}

/// Digest of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOutcome {
    pub hash: B256,
    pub success: bool,
}

/// Chain operations the purchase sequence runs against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuctionChain: Send + Sync {
    async fn pre_buy_amount(&self) -> Result<U256, MegaphoneError>;

    /// Approves the auction contract to spend `amount` of the buyer's
    /// USDC. Fails if the approval reverts.
    async fn approve_usdc(&self, buyer: Address, amount: U256) -> Result<B256, MegaphoneError>;

    async fn pre_buy_auction(
        &self,
        buyer: Address,
        amount: U256,
        auction_id: u64,
        fid: u64,
        name: String,
    ) -> Result<TxOutcome, MegaphoneError>;

    async fn pre_buy_auction_with_rev_share(
        &self,
        buyer: Address,
        amount: U256,
        auction_id: u64,
        fid: u64,
        name: String,
        signature: Bytes,
        referrer: Address,
    ) -> Result<TxOutcome, MegaphoneError>;
}

#[derive(Debug, Clone)]
pub struct MegaphoneContracts<P>
where
    P: Provider + Clone,
{
    provider: P,
    megaphone: IMegaphone::IMegaphoneInstance<P>,
    usdc: IERC20::IERC20Instance<P>,
}

impl<P> MegaphoneContracts<P>
where
    P: Provider + Clone,
{
    pub fn new(provider: P, megaphone_addr: Address, usdc_addr: Address) -> Self {
        let megaphone = IMegaphone::IMegaphoneInstance::new(megaphone_addr, provider.clone());
        let usdc = IERC20::IERC20Instance::new(usdc_addr, provider.clone());

        Self {
            provider,
            megaphone,
            usdc,
        }
    }

    pub fn megaphone_address(&self) -> Address {
        *self.megaphone.address()
    }

    pub fn usdc_address(&self) -> Address {
        *self.usdc.address()
    }

    pub async fn chain_id(&self) -> Result<u64, MegaphoneError> {
        self.provider
            .get_chain_id()
            .await
            .map_err(MegaphoneError::read)
    }

    pub async fn auction_snapshot(&self) -> Result<AuctionSnapshot, MegaphoneError> {
        let auction = self
            .megaphone
            .auction()
            .call()
            .await
            .map_err(MegaphoneError::read)?;
        snapshot_from(&auction)
    }

    pub async fn pre_buy_settings(&self) -> Result<PreBuySettings, MegaphoneError> {
        let multicall = self
            .provider
            .multicall()
            .add(self.megaphone.settings())
            .add(self.megaphone.getPreBuyAmount());

        let (settings, pre_buy_price) =
            multicall.aggregate().await.map_err(MegaphoneError::read)?;

        settings_from(&settings, pre_buy_price)
    }

    pub async fn pre_buy_status(&self) -> Result<Vec<bool>, MegaphoneError> {
        self.megaphone
            .getPreBuyStatus()
            .call()
            .await
            .map_err(MegaphoneError::read)
    }

    /// One aggregated read of everything the pre-buy window depends on,
    /// so the snapshot, settings and status vector come from a single
    /// block.
    pub async fn pre_buy_data(&self) -> Result<PreBuyData, MegaphoneError> {
        let multicall = self
            .provider
            .multicall()
            .add(self.megaphone.auction())
            .add(self.megaphone.settings())
            .add(self.megaphone.getPreBuyAmount())
            .add(self.megaphone.getPreBuyStatus());

        let (auction, settings, pre_buy_price, pre_buy_status) =
            multicall.aggregate().await.map_err(MegaphoneError::read)?;

        Ok(PreBuyData {
            snapshot: snapshot_from(&auction)?,
            settings: settings_from(&settings, pre_buy_price)?,
            pre_buy_status,
        })
    }

    pub async fn usdc_balance(&self, account: Address) -> Result<U256, MegaphoneError> {
        self.usdc
            .balanceOf(account)
            .call()
            .await
            .map_err(MegaphoneError::read)
    }

    /// The buyer's current USDC allowance towards the auction contract.
    pub async fn usdc_allowance(&self, owner: Address) -> Result<U256, MegaphoneError> {
        self.usdc
            .allowance(owner, *self.megaphone.address())
            .call()
            .await
            .map_err(MegaphoneError::read)
    }

    fn base_request(&self, from: Address, to: Address, calldata: Bytes) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_input(calldata)
    }

    async fn send_and_confirm(&self, tx: TransactionRequest) -> Result<TxOutcome, MegaphoneError> {
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(MegaphoneError::write)?;
        let receipt = pending.get_receipt().await.map_err(MegaphoneError::write)?;

        Ok(TxOutcome {
            hash: receipt.transaction_hash,
            success: receipt.status(),
        })
    }
}

#[async_trait]
impl<P> AuctionChain for MegaphoneContracts<P>
where
    P: Provider + Clone,
{
    async fn pre_buy_amount(&self) -> Result<U256, MegaphoneError> {
        self.megaphone
            .getPreBuyAmount()
            .call()
            .await
            .map_err(MegaphoneError::read)
    }

    async fn approve_usdc(&self, buyer: Address, amount: U256) -> Result<B256, MegaphoneError> {
        let calldata = Bytes::from(
            IERC20::approveCall {
                spender: *self.megaphone.address(),
                amount,
            }
            .abi_encode(),
        );

        let tx = self.base_request(buyer, *self.usdc.address(), calldata);
        let outcome = self.send_and_confirm(tx).await?;
        if !outcome.success {
            return Err(MegaphoneError::write(format!(
                "USDC approval reverted in {}",
                outcome.hash
            )));
        }
        info!(tx = ?outcome.hash, %amount, "usdc approval confirmed");

        Ok(outcome.hash)
    }

    async fn pre_buy_auction(
        &self,
        buyer: Address,
        amount: U256,
        auction_id: u64,
        fid: u64,
        name: String,
    ) -> Result<TxOutcome, MegaphoneError> {
        let calldata = Bytes::from(
            IMegaphone::preBuyAuctionCall {
                amount,
                auctionId: U256::from(auction_id),
                fid: U256::from(fid),
                name,
            }
            .abi_encode(),
        );

        let tx = self.base_request(buyer, *self.megaphone.address(), calldata);
        let outcome = self.send_and_confirm(tx).await?;
        info!(tx = ?outcome.hash, success = outcome.success, "pre-buy transaction mined");

        Ok(outcome)
    }

    async fn pre_buy_auction_with_rev_share(
        &self,
        buyer: Address,
        amount: U256,
        auction_id: u64,
        fid: u64,
        name: String,
        signature: Bytes,
        referrer: Address,
    ) -> Result<TxOutcome, MegaphoneError> {
        let calldata = Bytes::from(
            IMegaphone::preBuyAuctionWithRevShareCall {
                amount,
                auctionId: U256::from(auction_id),
                fid: U256::from(fid),
                name,
                signature,
                referrer,
            }
            .abi_encode(),
        );

        let tx = self.base_request(buyer, *self.megaphone.address(), calldata);
        let outcome = self.send_and_confirm(tx).await?;
        info!(
            tx = ?outcome.hash,
            success = outcome.success,
            %referrer,
            "rev-share pre-buy transaction mined"
        );

        Ok(outcome)
    }
}

fn snapshot_from(auction: &IMegaphone::auctionReturn) -> Result<AuctionSnapshot, MegaphoneError> {
    Ok(AuctionSnapshot {
        current_auction_id: u64::try_from(auction.tokenId)
            .map_err(|_| MegaphoneError::read("auction token id does not fit u64"))?,
        current_auction_end_time: i64::try_from(auction.endTime)
            .map_err(|_| MegaphoneError::read("auction end time does not fit i64"))?,
        settled: auction.settled,
    })
}

fn settings_from(
    settings: &IMegaphone::settingsReturn,
    pre_buy_price: U256,
) -> Result<PreBuySettings, MegaphoneError> {
    Ok(PreBuySettings {
        min_pre_buy_id: i64::try_from(settings.minPreBuyId)
            .map_err(|_| MegaphoneError::read("settings minPreBuyId does not fit i64"))?,
        max_pre_buy_id: i64::try_from(settings.maxPreBuyId)
            .map_err(|_| MegaphoneError::read("settings maxPreBuyId does not fit i64"))?,
        allow_pre_buy: settings.allowPreBuy,
        pre_buy_price,
        rev_share_percent: settings.revSharePercent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::I256;

    fn sample_auction() -> IMegaphone::auctionReturn {
        IMegaphone::auctionReturn {
            tokenId: U256::from(100u64),
            isDayPreBought: false,
            highestBidAmount: U256::from(12_000_000u64),
            highestBidFid: U256::from(9152u64),
            highestBidder: Address::ZERO,
            highestBidTimestamp: U256::ZERO,
            startTime: U256::from(1_736_874_000u64),
            endTime: U256::from(1_736_960_400u64),
            settled: false,
            metadataValidUntil: U256::ZERO,
            metadataFid: U256::ZERO,
        }
    }

    fn sample_settings() -> IMegaphone::settingsReturn {
        IMegaphone::settingsReturn {
            usdcToken: Address::ZERO,
            treasury: Address::ZERO,
            createBidReservePrice: U256::from(1_000_000u64),
            timeBuffer: U256::from(300u64),
            launched: true,
            scheduledEndTime: U256::from(1_736_960_400u64),
            maxExtensionTime: U256::ZERO,
            metadataValidUntil: U256::ZERO,
            metadataFid: U256::ZERO,
            minPreBuyId: I256::try_from(-2i64).unwrap(),
            maxPreBuyId: I256::try_from(7i64).unwrap(),
            allowPreBuy: true,
            verifierAddress: Address::ZERO,
            revSharePercent: U256::from(10u64),
            preBuyPremiumPercent: U256::from(20u64),
        }
    }

    #[test]
    fn snapshot_shapes_contract_words() {
        let snapshot = snapshot_from(&sample_auction()).unwrap();
        assert_eq!(snapshot.current_auction_id, 100);
        assert_eq!(snapshot.current_auction_end_time, 1_736_960_400);
        assert!(!snapshot.settled);
    }

    #[test]
    fn snapshot_rejects_out_of_range_words() {
        let mut auction = sample_auction();
        auction.tokenId = U256::MAX;
        assert!(matches!(
            snapshot_from(&auction),
            Err(MegaphoneError::ContractRead(_))
        ));

        let mut auction = sample_auction();
        auction.endTime = U256::MAX;
        assert!(matches!(
            snapshot_from(&auction),
            Err(MegaphoneError::ContractRead(_))
        ));
    }

    #[test]
    fn settings_keep_signed_window_bounds() {
        let settings = settings_from(&sample_settings(), U256::from(12_000_000u64)).unwrap();
        assert_eq!(settings.min_pre_buy_id, -2);
        assert_eq!(settings.max_pre_buy_id, 7);
        assert!(settings.allow_pre_buy);
        assert_eq!(settings.pre_buy_price, U256::from(12_000_000u64));
        assert_eq!(settings.rev_share_percent, U256::from(10u64));
    }

    #[test]
    fn settings_reject_unrepresentable_bounds() {
        let mut raw = sample_settings();
        raw.minPreBuyId = I256::MIN;
        assert!(matches!(
            settings_from(&raw, U256::ZERO),
            Err(MegaphoneError::ContractRead(_))
        ));
    }
}
