//! Client SDK for the Megaphone daily ad-slot auction on Base.
//!
//! Each day one slot is auctioned; future days can be reserved outright
//! at a fixed pre-buy price. This crate wraps the three surfaces that
//! flow touches:
//!
//! - the auction contract, through [`Megaphone`] (reads, USDC approval,
//!   the two purchase entrypoints),
//! - the signing backend, through [`BackendClient`] (rev-share
//!   signatures, purchase reports, incentivized interactions),
//! - the pre-buy day window, as pure calendar math in [`time`] and
//!   [`window`].
//!
//! [`panel`] adds headless state machines for the stock reserve-button
//! and timeline UI, so a frontend only binds widgets to them.

pub mod abi;
pub mod api;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod format;
pub mod logging;
pub mod panel;
pub mod time;
pub mod window;

pub use api::{BackendClient, InteractionReceipt, PreBuyBackend, PreBuyReport, SignatureRequest};
pub use client::{ClientConfiguration, Megaphone, PreBuyRequest, PreBuyTransactionResult};
pub use config::{MegaphoneOptions, Network};
pub use contract::{
    AuctionChain, AuctionSnapshot, MegaphoneContracts, PreBuyData, PreBuySettings, TxOutcome,
};
pub use error::MegaphoneError;
pub use format::{format_usdc, friendly_message};
pub use logging::init_logging;
pub use panel::{DayPicker, ReservePanel};
pub use time::{add_days, normalize_to_noon_eastern, to_calendar_date};
pub use window::{AvailableDay, build_window};
