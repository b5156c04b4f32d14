//! Headless state for the stock UI components.
//!
//! [`ReservePanel`] models the reserve-button lifecycle and
//! [`DayPicker`] the day timeline. Neither renders anything; a consumer
//! binds them to whatever widget layer it has and drives them from
//! [`crate::Megaphone`] calls.

use alloy::primitives::U256;

use crate::{
    error::MegaphoneError,
    format::{format_usdc, friendly_message},
    window::AvailableDay,
};

const LOADING_LABEL: &str = "Loading…";

/// Reserve-button state machine: price loading, ready, in-flight,
/// completed, with a sticky error line.
#[derive(Debug, Clone, Default)]
pub struct ReservePanel {
    amount: Option<U256>,
    submitting: bool,
    error: Option<String>,
    completed: Option<u64>,
    debug: bool,
}

impl ReservePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Surfaces raw error text instead of the friendly lines.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn amount(&self) -> Option<U256> {
        self.amount
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The auction id of a completed reservation, if any.
    pub fn completed_auction(&self) -> Option<u64> {
        self.completed
    }

    pub fn is_loading(&self) -> bool {
        self.amount.is_none() && self.error.is_none()
    }

    pub fn is_busy(&self) -> bool {
        self.submitting || self.is_loading()
    }

    pub fn can_submit(&self) -> bool {
        self.amount.is_some() && !self.submitting
    }

    pub fn amount_loaded(&mut self, amount: U256) {
        self.amount = Some(amount);
        self.error = None;
    }

    pub fn load_failed(&mut self, error: &MegaphoneError) {
        self.error = Some(friendly_message(error, self.debug));
    }

    /// Flags the submit in-flight and clears any stale error. Returns the
    /// amount being spent, or `None` when the panel is not ready.
    pub fn begin_submit(&mut self) -> Option<U256> {
        if !self.can_submit() {
            return None;
        }
        self.submitting = true;
        self.error = None;
        self.amount
    }

    pub fn submit_succeeded(&mut self, auction_id: u64) {
        self.submitting = false;
        self.completed = Some(auction_id);
    }

    pub fn submit_failed(&mut self, error: &MegaphoneError) {
        self.submitting = false;
        self.error = Some(friendly_message(error, self.debug));
    }

    /// Label for the button in its current state.
    pub fn button_label(&self) -> String {
        match self.amount {
            Some(amount) if !self.submitting => {
                format!("Reserve the Megaphone for {}", format_usdc(amount))
            }
            _ => LOADING_LABEL.to_owned(),
        }
    }
}

/// Selection model for the pre-buy timeline. Bought days are shown but
/// cannot be selected, and the selection rests on the first open day
/// until the consumer picks a different one.
#[derive(Debug, Clone, Default)]
pub struct DayPicker {
    days: Vec<AvailableDay>,
    selected: Option<u64>,
}

impl DayPicker {
    pub fn new(days: Vec<AvailableDay>) -> Self {
        let mut picker = Self {
            days,
            selected: None,
        };
        picker.reselect();
        picker
    }

    pub fn days(&self) -> &[AvailableDay] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn selected(&self) -> Option<&AvailableDay> {
        self.selected
            .and_then(|id| self.days.iter().find(|day| day.auction_id == id))
    }

    /// Selects an un-bought day. Returns whether the selection took.
    pub fn select(&mut self, auction_id: u64) -> bool {
        match self.days.iter().find(|day| day.auction_id == auction_id) {
            Some(day) if !day.is_bought => {
                self.selected = Some(auction_id);
                true
            }
            _ => false,
        }
    }

    /// Flips a day to bought after a confirmed purchase, without waiting
    /// for the next contract read. A selection pointing at that day moves
    /// on to the next open one.
    pub fn mark_bought(&mut self, auction_id: u64) {
        if let Some(day) = self
            .days
            .iter_mut()
            .find(|day| day.auction_id == auction_id)
        {
            day.is_bought = true;
        }
        self.reselect();
    }

    /// Swaps in a freshly built window, keeping the selection when the
    /// selected day is still present and un-bought.
    pub fn replace_days(&mut self, days: Vec<AvailableDay>) {
        self.days = days;
        self.reselect();
    }

    // A missing or no-longer-open selection falls back to the first
    // un-bought day; None only when every day is bought.
    fn reselect(&mut self) {
        let still_open = self.selected.is_some_and(|id| {
            self.days
                .iter()
                .any(|day| day.auction_id == id && !day.is_bought)
        });
        if !still_open {
            self.selected = self
                .days
                .iter()
                .find(|day| !day.is_bought)
                .map(|day| day.auction_id);
        }
    }
}
