//! User-facing rendering helpers.

use alloy::primitives::U256;

use crate::error::MegaphoneError;

// USDC carries six decimals; one cent is 10^4 base units.
const MICRO_PER_CENT: u64 = 10_000;
const HALF_CENT: u64 = 5_000;

/// Renders a USDC amount as dollars with two fraction digits, rounding
/// the half-cent up: `12_505_000` becomes `"12.51"`.
pub fn format_usdc(amount: U256) -> String {
    let cents = (amount + U256::from(HALF_CENT)) / U256::from(MICRO_PER_CENT);
    let dollars = cents / U256::from(100u64);
    let frac = (cents % U256::from(100u64)).to::<u64>();
    format!("{dollars}.{frac:02}")
}

/// Collapses a failure into a short sentence fit for a UI. With `debug`
/// set, the full error text is passed through instead.
pub fn friendly_message(error: &MegaphoneError, debug: bool) -> String {
    if debug {
        return error.to_string();
    }

    match error {
        MegaphoneError::Validation(message) | MegaphoneError::Configuration(message) => {
            message.clone()
        }
        MegaphoneError::Backend { .. } | MegaphoneError::Http(_) => {
            "Network error. Please try again.".into()
        }
        MegaphoneError::RevShare(_) => "Referral could not be authorized.".into(),
        MegaphoneError::DateRange(_) => "An error occurred. Please try again.".into(),
        other => classify_chain_message(&other.to_string()),
    }
}

/// Wallet and RPC errors arrive as free text; match the recognizable
/// phrasings and fall back to a generic line.
fn classify_chain_message(text: &str) -> String {
    let lower = text.to_lowercase();

    if lower.contains("user rejected")
        || lower.contains("user denied")
        || lower.contains("rejected the request")
    {
        "User rejected the request".into()
    } else if lower.contains("chain not configured")
        || lower.contains("chain id")
        || lower.contains("does not match the target chain")
    {
        "Chain not configured. Please switch to the correct network.".into()
    } else if lower.contains("insufficient funds") || lower.contains("insufficient balance") {
        "Insufficient funds".into()
    } else if lower.contains("reverted") || (lower.contains("transaction") && lower.contains("failed"))
    {
        "Transaction failed".into()
    } else if lower.contains("network") || lower.contains("connection") || lower.contains("timed out")
    {
        "Network error. Please try again.".into()
    } else {
        "An error occurred. Please try again.".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_whole_and_fractional_dollars() {
        assert_eq!(format_usdc(U256::from(12_000_000u64)), "12.00");
        assert_eq!(format_usdc(U256::from(12_500_000u64)), "12.50");
        assert_eq!(format_usdc(U256::from(1_234_560_000u64)), "1234.56");
        assert_eq!(format_usdc(U256::ZERO), "0.00");
    }

    #[test]
    fn rounds_the_half_cent_up() {
        assert_eq!(format_usdc(U256::from(12_505_000u64)), "12.51");
        assert_eq!(format_usdc(U256::from(12_504_999u64)), "12.50");
        // 0.999999 carries through to the next dollar.
        assert_eq!(format_usdc(U256::from(999_999u64)), "1.00");
        assert_eq!(format_usdc(U256::from(4_999u64)), "0.00");
        assert_eq!(format_usdc(U256::from(5_000u64)), "0.01");
    }

    #[test]
    fn debug_mode_passes_the_raw_error_through() {
        let err = MegaphoneError::write("execution reverted: day already bought");
        let message = friendly_message(&err, true);
        assert!(message.contains("execution reverted: day already bought"));
    }

    #[test]
    fn wallet_rejection_is_recognized() {
        let err = MegaphoneError::write("User rejected the request (code 4001)");
        assert_eq!(friendly_message(&err, false), "User rejected the request");
    }

    #[test]
    fn insufficient_funds_is_recognized() {
        let err = MegaphoneError::write("insufficient funds for gas * price + value");
        assert_eq!(friendly_message(&err, false), "Insufficient funds");
    }

    #[test]
    fn chain_mismatch_is_recognized() {
        let err = MegaphoneError::write("chain id 1 does not match the target chain");
        assert_eq!(
            friendly_message(&err, false),
            "Chain not configured. Please switch to the correct network."
        );
    }

    #[test]
    fn reverts_collapse_to_transaction_failed() {
        let err = MegaphoneError::write("execution reverted");
        assert_eq!(friendly_message(&err, false), "Transaction failed");
    }

    #[test]
    fn validation_messages_pass_through() {
        let err = MegaphoneError::Validation("interaction level must be 1, 2 or 3, got 9".into());
        assert_eq!(
            friendly_message(&err, false),
            "interaction level must be 1, 2 or 3, got 9"
        );
    }

    #[test]
    fn backend_failures_read_as_network_errors() {
        let err = MegaphoneError::Backend {
            status: 502,
            message: "Bad Gateway".into(),
        };
        assert_eq!(friendly_message(&err, false), "Network error. Please try again.");
    }

    #[test]
    fn unknown_chain_errors_fall_back_to_the_generic_line() {
        let err = MegaphoneError::write("some rpc oddity");
        assert_eq!(
            friendly_message(&err, false),
            "An error occurred. Please try again."
        );
    }
}
