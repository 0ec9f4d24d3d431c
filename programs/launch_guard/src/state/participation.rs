/**
 * Launch Participation State
 *
 * Contribution and original-allocation record per (launch, wallet).
 * The original allocation drives the vesting-based gradual release:
 * 25% sellable immediately, then 50% / 75% / 100% at 30 / 60 / 90 days
 * after launch completion.
 */

use anchor_lang::prelude::*;

use crate::{BPS_DENOMINATOR, SECONDS_PER_DAY};

/// Participation account, written by the sale layer through
/// `record_contribution` and read by the vesting gate and refunds
#[account]
pub struct LaunchParticipation {
    /// Launch this participation belongs to
    pub launch: Pubkey,

    /// Contributing wallet
    pub wallet: Pubkey,

    /// Total contributed (governance-mint units)
    pub contributed: u64,

    /// Original token allocation; the vesting base
    pub tokens_allocated: u64,

    /// Amount of the original allocation sold so far
    pub vesting_sold: u64,

    /// Contribution has been refunded (veto/cancel path)
    pub is_refunded: bool,

    /// When the refund was claimed (0 otherwise)
    pub refunded_at: i64,

    /// First contribution timestamp
    pub participated_at: i64,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 16],
}

impl LaunchParticipation {
    pub const LEN: usize = 8 + // discriminator
        32 + // launch
        32 + // wallet
        8 +  // contributed
        8 +  // tokens_allocated
        8 +  // vesting_sold
        1 +  // is_refunded
        8 +  // refunded_at
        8 +  // participated_at
        1 +  // bump
        16;  // reserved

    /// Sellable fraction of the original allocation, in bps, `days`
    /// after launch completion. Non-decreasing with exact breakpoints
    /// at 30/60/90 days.
    pub fn max_sellable_bps(days_since_completion: i64) -> u64 {
        if days_since_completion < 30 {
            2_500
        } else if days_since_completion < 60 {
            5_000
        } else if days_since_completion < 90 {
            7_500
        } else {
            10_000
        }
    }

    /// Maximum of the original allocation sellable at `now`
    pub fn max_sellable_amount(&self, completed_at: i64, now: i64) -> u64 {
        let days = (now - completed_at) / SECONDS_PER_DAY;
        let bps = Self::max_sellable_bps(days);
        ((self.tokens_allocated as u128) * (bps as u128) / (BPS_DENOMINATOR as u128)) as u64
    }

    /// Would selling `amount` at `now` violate the release schedule?
    /// Wallets with no recorded allocation are unrestricted.
    pub fn violates_gradual_release(&self, amount: u64, completed_at: i64, now: i64) -> bool {
        if self.tokens_allocated == 0 {
            return false;
        }
        let max = self.max_sellable_amount(completed_at, now);
        self.vesting_sold.saturating_add(amount) > max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participation(allocated: u64, sold: u64) -> LaunchParticipation {
        LaunchParticipation {
            launch: Pubkey::default(),
            wallet: Pubkey::default(),
            contributed: 0,
            tokens_allocated: allocated,
            vesting_sold: sold,
            is_refunded: false,
            refunded_at: 0,
            participated_at: 0,
            bump: 255,
            reserved: [0; 16],
        }
    }

    #[test]
    fn schedule_is_monotonic_with_exact_breakpoints() {
        assert_eq!(LaunchParticipation::max_sellable_bps(0), 2_500);
        assert_eq!(LaunchParticipation::max_sellable_bps(29), 2_500);
        assert_eq!(LaunchParticipation::max_sellable_bps(30), 5_000);
        assert_eq!(LaunchParticipation::max_sellable_bps(59), 5_000);
        assert_eq!(LaunchParticipation::max_sellable_bps(60), 7_500);
        assert_eq!(LaunchParticipation::max_sellable_bps(89), 7_500);
        assert_eq!(LaunchParticipation::max_sellable_bps(90), 10_000);
        assert_eq!(LaunchParticipation::max_sellable_bps(10_000), 10_000);

        let mut previous = 0;
        for day in 0..120 {
            let bps = LaunchParticipation::max_sellable_bps(day);
            assert!(bps >= previous);
            previous = bps;
        }
    }

    #[test]
    fn release_gate_counts_already_sold() {
        let completed = 0;
        let day_ten = 10 * SECONDS_PER_DAY;
        let p = participation(1_000, 200);

        // 25% of 1000 = 250 sellable; 200 sold, 50 headroom left
        assert!(!p.violates_gradual_release(50, completed, day_ten));
        assert!(p.violates_gradual_release(51, completed, day_ten));
    }

    #[test]
    fn later_phases_unlock_more() {
        let completed = 0;
        let p = participation(1_000, 250);

        assert!(p.violates_gradual_release(1, completed, 29 * SECONDS_PER_DAY));
        assert!(!p.violates_gradual_release(250, completed, 30 * SECONDS_PER_DAY));
        assert!(!p.violates_gradual_release(750, completed, 90 * SECONDS_PER_DAY));
        assert!(p.violates_gradual_release(751, completed, 90 * SECONDS_PER_DAY));
    }

    #[test]
    fn non_participants_are_unrestricted() {
        let p = participation(0, 0);
        assert!(!p.violates_gradual_release(u64::MAX, 0, 0));
    }
}
