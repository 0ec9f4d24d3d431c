/**
 * Liquidity Lock State
 *
 * Created when a launch completes successfully; immutable until the
 * unlock date passes.
 */

use anchor_lang::prelude::*;

/// Liquidity lock account, one per launched token
#[account]
pub struct LiquidityLock {
    /// Launched token mint
    pub mint: Pubkey,

    /// Owner allowed to withdraw after unlock
    pub lock_owner: Pubkey,

    /// Locked amount (governance-mint units held in escrow)
    pub locked_amount: u64,

    /// When the lock was created
    pub lock_date: i64,

    /// Earliest withdrawal timestamp
    pub unlock_date: i64,

    /// Liquidity has been withdrawn
    pub is_withdrawn: bool,

    /// When it was withdrawn (0 otherwise)
    pub withdrawn_at: i64,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 16],
}

impl LiquidityLock {
    pub const LEN: usize = 8 + // discriminator
        32 + // mint
        32 + // lock_owner
        8 +  // locked_amount
        8 +  // lock_date
        8 +  // unlock_date
        1 +  // is_withdrawn
        8 +  // withdrawn_at
        1 +  // bump
        16;  // reserved

    /// Lock still in force at `now`
    pub fn is_locked(&self, now: i64) -> bool {
        !self.is_withdrawn && now < self.unlock_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_releases_at_unlock_date() {
        let lock = LiquidityLock {
            mint: Pubkey::default(),
            lock_owner: Pubkey::default(),
            locked_amount: 1_000,
            lock_date: 100,
            unlock_date: 500,
            is_withdrawn: false,
            withdrawn_at: 0,
            bump: 255,
            reserved: [0; 16],
        };

        assert!(lock.is_locked(499));
        assert!(!lock.is_locked(500));
    }

    #[test]
    fn withdrawn_lock_is_not_locked() {
        let lock = LiquidityLock {
            mint: Pubkey::default(),
            lock_owner: Pubkey::default(),
            locked_amount: 1_000,
            lock_date: 100,
            unlock_date: 500,
            is_withdrawn: true,
            withdrawn_at: 120,
            bump: 255,
            reserved: [0; 16],
        };

        assert!(!lock.is_locked(200));
    }
}
