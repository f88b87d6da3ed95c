//! Fee and tax arithmetic shared by transactions and settlements.
//!
//! The platform charges a percentage fee on the gross amount and tax (GST)
//! on that fee. All arithmetic is integer paise with truncating division;
//! the split always satisfies `net = amount - fee - tax`.

use crate::error::AppError;

/// Basis-point fee/tax rates applied to every transaction.
#[derive(Debug, Clone, Copy)]
pub struct FeePolicy {
    /// Fee on the gross amount, in basis points
    fee_bps: i64,
    /// Tax on the fee, in basis points
    tax_bps: i64,
}

/// The fee/tax/net decomposition of a gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountSplit {
    pub fee_paise: i64,
    pub tax_paise: i64,
    pub net_paise: i64,
}

impl FeePolicy {
    pub fn new(fee_bps: i64, tax_bps: i64) -> Self {
        Self { fee_bps, tax_bps }
    }

    /// Split a gross amount into fee, tax and merchant net.
    ///
    /// # Errors
    ///
    /// Rejects non-positive amounts; every caller has already promised the
    /// client a positive gross amount.
    pub fn split(&self, amount_paise: i64) -> Result<AmountSplit, AppError> {
        if amount_paise <= 0 {
            return Err(AppError::InvalidRequest(
                "Amount must be positive".to_string(),
            ));
        }
        let fee_paise = amount_paise * self.fee_bps / 10_000;
        let tax_paise = fee_paise * self.tax_bps / 10_000;
        Ok(AmountSplit {
            fee_paise,
            tax_paise,
            net_paise: amount_paise - fee_paise - tax_paise,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_percent_fee_with_gst() {
        // ₹1000.00 at 2% fee, 18% GST on the fee.
        let policy = FeePolicy::new(200, 1800);
        let split = policy.split(100_000).unwrap();
        assert_eq!(split.fee_paise, 2_000);
        assert_eq!(split.tax_paise, 360);
        assert_eq!(split.net_paise, 97_640);
    }

    #[test]
    fn test_split_preserves_total() {
        let policy = FeePolicy::new(200, 1800);
        for amount in [1, 99, 100, 12_345, 100_000, 9_999_999_999] {
            let split = policy.split(amount).unwrap();
            assert_eq!(
                split.net_paise + split.fee_paise + split.tax_paise,
                amount,
                "split of {amount} does not add back up"
            );
        }
    }

    #[test]
    fn test_split_truncates_sub_paise_fees() {
        let policy = FeePolicy::new(200, 1800);
        // 2% of 49 paise is 0.98 paise, which truncates to zero.
        let split = policy.split(49).unwrap();
        assert_eq!(split.fee_paise, 0);
        assert_eq!(split.tax_paise, 0);
        assert_eq!(split.net_paise, 49);
    }

    #[test]
    fn test_split_rejects_non_positive_amounts() {
        let policy = FeePolicy::new(200, 1800);
        assert!(matches!(policy.split(0), Err(AppError::InvalidRequest(_))));
        assert!(matches!(policy.split(-100), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_zero_rate_policy_passes_amount_through() {
        let policy = FeePolicy::new(0, 0);
        let split = policy.split(5_000).unwrap();
        assert_eq!(split.fee_paise, 0);
        assert_eq!(split.tax_paise, 0);
        assert_eq!(split.net_paise, 5_000);
    }
}
