/**
 * Wallet Limits State
 *
 * Per-(mint, wallet) holding cap, anti-bot cooldown bookkeeping, and the
 * rolling sell history that feeds dump detection.
 */

use anchor_lang::prelude::*;

use crate::{
    BOT_VIOLATION_LIMIT, BPS_DENOMINATOR, DUMP_RATIO_BPS, DUMP_VIOLATION_SUSPEND,
    DUMP_WINDOW_SECONDS, SECONDS_PER_DAY,
};

/// Reason a trade was refused. Mirrors the rejection taxonomy one-to-one
/// so indexers can rely on stable codes.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum RejectReason {
    WalletLimitExceeded = 0,
    CooldownPeriodActive = 1,
    BotDetected = 2,
    PriceImpactTooHigh = 3,
    MaxTransactionsExceeded = 4,
    GradualReleaseViolation = 5,
    EmergencyStop = 6,
    TradingNotStarted = 7,
}

/// Outcome of trade validation. Penalized trades are allowed - the
/// penalty is redirected, not refused - so callers cannot collapse
/// "penalized" into "succeeded" or "rejected".
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum TradeOutcome {
    Allowed,
    AllowedWithPenalty { penalty: u64 },
    Rejected { reason: RejectReason },
}

impl TradeOutcome {
    /// The transfer may be applied by the caller
    pub fn is_allowed(&self) -> bool {
        !matches!(self, TradeOutcome::Rejected { .. })
    }

    /// Stable discriminant for events
    pub fn code(&self) -> u8 {
        match self {
            TradeOutcome::Allowed => 0,
            TradeOutcome::AllowedWithPenalty { .. } => 1,
            TradeOutcome::Rejected { .. } => 2,
        }
    }
}

/// One recorded sell, kept for rolling-window aggregation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct SellRecord {
    pub amount: u64,
    pub timestamp: i64,
    pub slot: u64,
}

impl SellRecord {
    pub const LEN: usize = 8 + 8 + 8;
}

/// Number of ring slots for the 24h sell window. The sell cooldown
/// floor (`MIN_SELL_COOLDOWN_SECONDS`) spaces sells at least 2700s
/// apart, so at most 32 fall strictly inside any 24h window and the
/// ring cannot evict a record that still counts.
pub const SELL_RING_SLOTS: usize = 32;

/// Wallet limits account, created lazily on a wallet's first trade
#[account]
pub struct WalletLimits {
    /// Launched token mint
    pub mint: Pubkey,

    /// Wallet being tracked
    pub wallet: Pubkey,

    /// Maximum holding under the currently applied cap phase
    pub max_amount: u64,

    /// Holding tracked through validated trades
    pub current_amount: u64,

    /// Timestamp of the last validated trade
    pub last_tx_time: i64,

    /// Slot of the last validated trade
    pub last_tx_slot: u64,

    /// Bot-gate and dump violations (shared counter)
    pub violation_count: u32,

    /// Terminal until reset by governance action
    pub is_restricted: bool,

    /// When the restriction was applied (0 when not restricted)
    pub restricted_at: i64,

    /// UTC day index of the daily sell counter
    pub day_index: u32,

    /// Total sold during `day_index`
    pub sold_today: u64,

    /// Rolling sell history (ring buffer)
    pub sell_ring: [SellRecord; SELL_RING_SLOTS],

    /// Next ring slot to overwrite
    pub sell_ring_head: u8,

    /// Number of populated ring slots
    pub sell_ring_len: u8,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl WalletLimits {
    pub const LEN: usize = 8 + // discriminator
        32 + // mint
        32 + // wallet
        8 +  // max_amount
        8 +  // current_amount
        8 +  // last_tx_time
        8 +  // last_tx_slot
        4 +  // violation_count
        1 +  // is_restricted
        8 +  // restricted_at
        4 +  // day_index
        8 +  // sold_today
        SellRecord::LEN * SELL_RING_SLOTS +
        1 +  // sell_ring_head
        1 +  // sell_ring_len
        1 +  // bump
        32;  // reserved

    /// UTC calendar-day index for a block timestamp
    pub fn day_index_for(timestamp: i64) -> u32 {
        (timestamp / SECONDS_PER_DAY) as u32
    }

    /// Reset the daily sell counter when the UTC day has rolled over
    pub fn roll_day(&mut self, now: i64) {
        let day = Self::day_index_for(now);
        if day != self.day_index {
            self.day_index = day;
            self.sold_today = 0;
        }
    }

    /// Anti-bot gate. Counts a violation when the wallet trades again
    /// within `min_slots`; the limit-th strike restricts the wallet.
    /// Returns true when the trade must be refused.
    pub fn register_bot_check(&mut self, current_slot: u64, min_slots: u64) -> bool {
        if self.last_tx_slot == 0 {
            return false;
        }
        if current_slot.saturating_sub(self.last_tx_slot) < min_slots {
            self.violation_count = self.violation_count.saturating_add(1);
            if self.violation_count >= BOT_VIOLATION_LIMIT {
                self.is_restricted = true;
                return true;
            }
        }
        false
    }

    /// Whether the sell cooldown still applies at `now`
    pub fn in_sell_cooldown(&self, now: i64, cooldown_seconds: i64) -> bool {
        self.last_tx_time > 0 && now - self.last_tx_time < cooldown_seconds
    }

    /// Append a sell to the ring and the daily counter
    pub fn record_sell(&mut self, amount: u64, now: i64, slot: u64) {
        self.roll_day(now);
        self.sold_today = self.sold_today.saturating_add(amount);

        let head = self.sell_ring_head as usize % SELL_RING_SLOTS;
        self.sell_ring[head] = SellRecord { amount, timestamp: now, slot };
        self.sell_ring_head = ((head + 1) % SELL_RING_SLOTS) as u8;
        if (self.sell_ring_len as usize) < SELL_RING_SLOTS {
            self.sell_ring_len += 1;
        }
    }

    /// Total sold within the trailing 24h window ending at `now`
    pub fn sold_in_window(&self, now: i64) -> u64 {
        let cutoff = now - DUMP_WINDOW_SECONDS;
        let mut total: u64 = 0;
        for i in 0..self.sell_ring_len as usize {
            let record = &self.sell_ring[i];
            if record.timestamp > cutoff {
                total = total.saturating_add(record.amount);
            }
        }
        total
    }

    /// Total sold during the current UTC day, as seen at `now`
    pub fn sold_today_at(&self, now: i64) -> u64 {
        if Self::day_index_for(now) != self.day_index {
            0
        } else {
            self.sold_today
        }
    }
}

/// Whether selling `total_sold_24h` against `current_balance` counts as a
/// dump: more than half the holdings moved inside the rolling window.
pub fn is_dump(total_sold_24h: u64, current_balance: u64) -> bool {
    if current_balance == 0 {
        return false;
    }
    (total_sold_24h as u128) * (BPS_DENOMINATOR as u128)
        > (current_balance as u128) * (DUMP_RATIO_BPS as u128)
}

/// Tiered dump penalty rate for a violation count (counted after the
/// current violation). `None` means the wallet is suspended instead.
pub fn dump_penalty_bps(violation_count: u32) -> Option<u64> {
    match violation_count {
        0 | 1 => Some(500),
        2 | 3 => Some(1000),
        4 | 5 => Some(2000),
        _ => None,
    }
}

/// Violation counts above this suspend the wallet outright
pub fn dump_suspends(violation_count: u32) -> bool {
    violation_count > DUMP_VIOLATION_SUSPEND
}

/// Penalty amount redirected to the penalty pool for a sell
pub fn dump_penalty_amount(sell_amount: u64, penalty_bps: u64) -> u64 {
    ((sell_amount as u128) * (penalty_bps as u128) / (BPS_DENOMINATOR as u128)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_limits() -> WalletLimits {
        WalletLimits {
            mint: Pubkey::default(),
            wallet: Pubkey::default(),
            max_amount: 50_000,
            current_amount: 0,
            last_tx_time: 0,
            last_tx_slot: 0,
            violation_count: 0,
            is_restricted: false,
            restricted_at: 0,
            day_index: 0,
            sold_today: 0,
            sell_ring: [SellRecord::default(); SELL_RING_SLOTS],
            sell_ring_head: 0,
            sell_ring_len: 0,
            bump: 255,
            reserved: [0; 32],
        }
    }

    #[test]
    fn three_rapid_trades_restrict_the_wallet() {
        let mut limits = fresh_limits();
        limits.last_tx_slot = 100;

        assert!(!limits.register_bot_check(101, 5)); // strike 1
        assert!(!limits.register_bot_check(102, 5)); // strike 2
        assert!(limits.register_bot_check(103, 5)); // strike 3
        assert!(limits.is_restricted);
        assert_eq!(limits.violation_count, 3);
    }

    #[test]
    fn spaced_trades_never_strike() {
        let mut limits = fresh_limits();
        limits.last_tx_slot = 100;

        assert!(!limits.register_bot_check(105, 5));
        assert_eq!(limits.violation_count, 0);
    }

    #[test]
    fn first_trade_skips_bot_gate() {
        let mut limits = fresh_limits();
        assert!(!limits.register_bot_check(1, 100));
        assert_eq!(limits.violation_count, 0);
    }

    #[test]
    fn window_aggregation_drops_old_sells() {
        let mut limits = fresh_limits();
        let now = 200_000;

        limits.record_sell(100, now - DUMP_WINDOW_SECONDS - 1, 1);
        limits.record_sell(300, now - 3600, 2);
        limits.record_sell(200, now - 60, 3);

        assert_eq!(limits.sold_in_window(now), 500);
    }

    #[test]
    fn daily_counter_resets_on_utc_rollover() {
        let mut limits = fresh_limits();
        let day_one = SECONDS_PER_DAY + 100;

        limits.record_sell(400, day_one, 1);
        assert_eq!(limits.sold_today_at(day_one), 400);

        let day_two = 2 * SECONDS_PER_DAY + 5;
        assert_eq!(limits.sold_today_at(day_two), 0);

        limits.record_sell(50, day_two, 2);
        assert_eq!(limits.sold_today, 50);
    }

    #[test]
    fn dump_requires_majority_of_balance() {
        // Scenario: balance 1000, selling 600 in-window is a dump
        assert!(is_dump(600, 1000));
        assert!(!is_dump(500, 1000));
        assert!(!is_dump(0, 0));
    }

    #[test]
    fn penalty_tiers_escalate_then_suspend() {
        assert_eq!(dump_penalty_bps(1), Some(500));
        assert_eq!(dump_penalty_bps(2), Some(1000));
        assert_eq!(dump_penalty_bps(3), Some(1000));
        assert_eq!(dump_penalty_bps(4), Some(2000));
        assert_eq!(dump_penalty_bps(5), Some(2000));
        assert_eq!(dump_penalty_bps(6), None);
        assert!(dump_suspends(6));
        assert!(!dump_suspends(5));
    }

    #[test]
    fn first_violation_penalty_is_five_percent() {
        // Scenario: first violation on a 600-unit sell costs 30 units
        let rate = dump_penalty_bps(1).unwrap();
        assert_eq!(dump_penalty_amount(600, rate), 30);
    }

    #[test]
    fn sell_cooldown_boundary() {
        let mut limits = fresh_limits();

        // first trade is exempt
        assert!(!limits.in_sell_cooldown(10, 3_600));

        limits.last_tx_time = 10_000;
        assert!(limits.in_sell_cooldown(10_000 + 3_599, 3_600));
        assert!(!limits.in_sell_cooldown(10_000 + 3_600, 3_600));
    }

    #[test]
    fn cooldown_spaced_sells_never_age_out_of_the_ring() {
        let mut limits = fresh_limits();
        let spacing = crate::MIN_SELL_COOLDOWN_SECONDS;

        // 33 sells at the minimum spacing; distinct amounts so a lost
        // record would change the sum
        for i in 0..=32i64 {
            limits.record_sell(i as u64, i * spacing, i as u64);
        }

        // at the last sell, the t=0 record sits exactly on the cutoff
        // and is legitimately excluded; sells 1..=32 are all in-window
        // and all still in the ring
        let now = 32 * spacing;
        assert_eq!(spacing * 32, DUMP_WINDOW_SECONDS);
        assert_eq!(limits.sold_in_window(now), (1..=32u64).sum::<u64>());
    }

    #[test]
    fn cloned_limits_carry_the_ring() {
        let mut limits = fresh_limits();
        limits.record_sell(100, 1_000, 1);

        let copy = limits.clone();
        assert_eq!(copy.sold_in_window(1_000), 100);
        assert_eq!(copy.sell_ring_len, limits.sell_ring_len);
    }

    #[test]
    fn ring_buffer_wraps_without_panicking() {
        let mut limits = fresh_limits();
        for i in 0..(SELL_RING_SLOTS as i64 + 8) {
            limits.record_sell(10, 1000 + i, i as u64);
        }
        assert_eq!(limits.sell_ring_len as usize, SELL_RING_SLOTS);
        assert_eq!(limits.sold_in_window(1000), 10 * (SELL_RING_SLOTS as u64));
    }
}
