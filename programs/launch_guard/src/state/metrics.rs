/**
 * Trading Metrics State
 *
 * Rolling volume, price, and liquidity statistics per token. Daily
 * counters reset exactly once per UTC calendar-day rollover, keyed off
 * the block timestamp so replay stays deterministic.
 */

use anchor_lang::prelude::*;

use crate::{PRICE_SCALE, SECONDS_PER_DAY};

/// Trading metrics account, created lazily on a token's first trade
#[account]
pub struct TradingMetrics {
    /// Launched token mint
    pub mint: Pubkey,

    /// Cumulative traded volume (raw token units)
    pub total_volume: u64,

    /// Volume during the current UTC day
    pub daily_volume: u64,

    /// Cumulative trade count
    pub total_trades: u64,

    /// Trades during the current UTC day
    pub daily_trades: u64,

    /// Wallets that have ever traded this token
    pub unique_traders: u64,

    /// Last reported price (PRICE_SCALE fixed-point, governance units per token)
    pub current_price: u64,

    /// 24h price change in signed basis points
    pub price_change_24h_bps: i32,

    /// Market cap derived from supply and price
    pub market_cap: u64,

    /// Current liquidity estimate (raw token units)
    pub liquidity: u64,

    /// Timestamp of the last update
    pub last_updated: i64,

    /// UTC day index of the daily counters
    pub day_index: u32,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl TradingMetrics {
    pub const LEN: usize = 8 + // discriminator
        32 + // mint
        8 +  // total_volume
        8 +  // daily_volume
        8 +  // total_trades
        8 +  // daily_trades
        8 +  // unique_traders
        8 +  // current_price
        4 +  // price_change_24h_bps
        8 +  // market_cap
        8 +  // liquidity
        8 +  // last_updated
        4 +  // day_index
        1 +  // bump
        32;  // reserved

    pub fn day_index_for(timestamp: i64) -> u32 {
        (timestamp / SECONDS_PER_DAY) as u32
    }

    /// Reset daily counters when the UTC day has rolled over
    pub fn roll_day(&mut self, now: i64) {
        let day = Self::day_index_for(now);
        if day != self.day_index {
            self.day_index = day;
            self.daily_volume = 0;
            self.daily_trades = 0;
        }
    }

    /// Fold one validated trade into the running statistics
    pub fn record_trade(&mut self, amount: u64, now: i64, new_trader: bool) {
        self.roll_day(now);

        self.total_volume = self.total_volume.saturating_add(amount);
        self.daily_volume = self.daily_volume.saturating_add(amount);
        self.total_trades = self.total_trades.saturating_add(1);
        self.daily_trades = self.daily_trades.saturating_add(1);
        if new_trader {
            self.unique_traders = self.unique_traders.saturating_add(1);
        }
        self.last_updated = now;
    }

    /// Apply an externally supplied market snapshot
    pub fn apply_market_data(
        &mut self,
        price: u64,
        price_change_24h_bps: i32,
        liquidity: u64,
        total_supply: u64,
        now: i64,
    ) {
        self.current_price = price;
        self.price_change_24h_bps = price_change_24h_bps;
        self.liquidity = liquidity;
        self.market_cap =
            ((total_supply as u128) * (price as u128) / (PRICE_SCALE as u128)) as u64;
        self.last_updated = now;
    }

    /// Would `amount` move more than `max_impact_bps` of current liquidity?
    /// Tokens with no liquidity recorded yet are exempt (bootstrap).
    pub fn exceeds_price_impact(&self, amount: u64, max_impact_bps: u16) -> bool {
        if self.liquidity == 0 {
            return false;
        }
        (amount as u128) * 10_000 > (self.liquidity as u128) * (max_impact_bps as u128)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_metrics() -> TradingMetrics {
        TradingMetrics {
            mint: Pubkey::default(),
            total_volume: 0,
            daily_volume: 0,
            total_trades: 0,
            daily_trades: 0,
            unique_traders: 0,
            current_price: 0,
            price_change_24h_bps: 0,
            market_cap: 0,
            liquidity: 0,
            last_updated: 0,
            day_index: 0,
            bump: 255,
            reserved: [0; 32],
        }
    }

    #[test]
    fn daily_counters_reset_on_day_rollover() {
        let mut metrics = fresh_metrics();
        let day_one = SECONDS_PER_DAY + 10;

        metrics.record_trade(1_000, day_one, true);
        metrics.record_trade(500, day_one + 60, false);
        assert_eq!(metrics.daily_volume, 1_500);
        assert_eq!(metrics.daily_trades, 2);

        metrics.record_trade(200, 2 * SECONDS_PER_DAY + 1, true);
        assert_eq!(metrics.daily_volume, 200);
        assert_eq!(metrics.daily_trades, 1);
        assert_eq!(metrics.total_volume, 1_700);
        assert_eq!(metrics.total_trades, 3);
        assert_eq!(metrics.unique_traders, 2);
    }

    #[test]
    fn price_impact_gate_uses_liquidity_ratio() {
        let mut metrics = fresh_metrics();

        // no liquidity yet: bootstrap exemption
        assert!(!metrics.exceeds_price_impact(1_000_000, 1000));

        metrics.liquidity = 100_000;
        // 10% cap: 10_000 is exactly at the limit, 10_001 over it
        assert!(!metrics.exceeds_price_impact(10_000, 1000));
        assert!(metrics.exceeds_price_impact(10_001, 1000));
    }

    #[test]
    fn market_cap_tracks_supply_times_price() {
        let mut metrics = fresh_metrics();
        metrics.apply_market_data(2 * PRICE_SCALE, -500, 10_000, 1_000_000, 99);
        assert_eq!(metrics.market_cap, 2_000_000);
        assert_eq!(metrics.price_change_24h_bps, -500);
        assert_eq!(metrics.last_updated, 99);
    }
}
