/**
 * Circuit Breaker State
 *
 * Token-wide emergency halt. While tripped, every trade for the token is
 * rejected with EmergencyStop until the cooling period elapses.
 */

use anchor_lang::prelude::*;

use crate::{
    state::TradingMetrics, BREAKER_HALT_SECONDS, PRICE_MOVE_TRIP_BPS,
    VOLUME_LIQUIDITY_TRIP_MULTIPLE, VOLUME_SPIKE_ADVISORY_MULTIPLE,
};

/// Why the breaker tripped
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum BreakerReason {
    None = 0,
    /// |24h price change| above the volatility threshold
    ExtremeVolatility = 1,
    /// Daily volume above a multiple of liquidity
    LiquidityCrisis = 2,
}

/// Circuit breaker account, one per launched token
#[account]
pub struct CircuitBreaker {
    /// Launched token mint
    pub mint: Pubkey,

    /// Timestamp of the last trip (0 = never tripped)
    pub tripped_at: i64,

    /// Halt is in force until this timestamp
    pub expires_at: i64,

    /// Reason code of the last trip (BreakerReason)
    pub reason: u8,

    /// Lifetime trip count
    pub trip_count: u32,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 16],
}

impl CircuitBreaker {
    pub const LEN: usize = 8 + // discriminator
        32 + // mint
        8 +  // tripped_at
        8 +  // expires_at
        1 +  // reason
        4 +  // trip_count
        1 +  // bump
        16;  // reserved

    /// Halt currently in force
    pub fn is_active(&self, now: i64) -> bool {
        now < self.expires_at
    }

    /// Record a trip starting at `now`
    pub fn trip(&mut self, now: i64, reason: BreakerReason) {
        self.tripped_at = now;
        self.expires_at = now + BREAKER_HALT_SECONDS;
        self.reason = reason as u8;
        self.trip_count = self.trip_count.saturating_add(1);
    }

    /// Evaluate trip conditions against the current metrics
    pub fn should_trip(metrics: &TradingMetrics) -> Option<BreakerReason> {
        if metrics.price_change_24h_bps.unsigned_abs() > PRICE_MOVE_TRIP_BPS {
            return Some(BreakerReason::ExtremeVolatility);
        }
        if metrics.liquidity > 0 {
            let crisis = (metrics.daily_volume as u128)
                > (metrics.liquidity as u128) * (VOLUME_LIQUIDITY_TRIP_MULTIPLE as u128);
            if crisis {
                return Some(BreakerReason::LiquidityCrisis);
            }
        }
        None
    }

    /// Advisory-only spike check: daily volume above a multiple of the
    /// 30-day average. Logs a warning, never trips.
    pub fn volume_spike_advisory(metrics: &TradingMetrics) -> bool {
        let avg_30d = metrics.total_volume / 30;
        metrics.daily_volume > avg_30d.saturating_mul(VOLUME_SPIKE_ADVISORY_MULTIPLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(price_change_bps: i32, daily_volume: u64, liquidity: u64) -> TradingMetrics {
        TradingMetrics {
            mint: Pubkey::default(),
            total_volume: daily_volume,
            daily_volume,
            total_trades: 1,
            daily_trades: 1,
            unique_traders: 1,
            current_price: 0,
            price_change_24h_bps: price_change_bps,
            market_cap: 0,
            liquidity,
            last_updated: 0,
            day_index: 0,
            bump: 255,
            reserved: [0; 32],
        }
    }

    #[test]
    fn trips_on_extreme_price_move() {
        // Scenario: -55% in 24h exceeds the 50% threshold
        assert_eq!(
            CircuitBreaker::should_trip(&metrics(-5500, 0, 1_000)),
            Some(BreakerReason::ExtremeVolatility)
        );
        assert_eq!(CircuitBreaker::should_trip(&metrics(5000, 0, 1_000)), None);
        assert_eq!(
            CircuitBreaker::should_trip(&metrics(5001, 0, 1_000)),
            Some(BreakerReason::ExtremeVolatility)
        );
    }

    #[test]
    fn trips_on_liquidity_crisis() {
        assert_eq!(
            CircuitBreaker::should_trip(&metrics(0, 2_001, 1_000)),
            Some(BreakerReason::LiquidityCrisis)
        );
        assert_eq!(CircuitBreaker::should_trip(&metrics(0, 2_000, 1_000)), None);
        // no liquidity recorded: crisis heuristic does not apply
        assert_eq!(CircuitBreaker::should_trip(&metrics(0, 2_001, 0)), None);
    }

    #[test]
    fn halt_lasts_one_hour() {
        let mut breaker = CircuitBreaker {
            mint: Pubkey::default(),
            tripped_at: 0,
            expires_at: 0,
            reason: 0,
            trip_count: 0,
            bump: 255,
            reserved: [0; 16],
        };

        breaker.trip(10_000, BreakerReason::ExtremeVolatility);
        assert!(breaker.is_active(10_000));
        assert!(breaker.is_active(10_000 + BREAKER_HALT_SECONDS - 1));
        assert!(!breaker.is_active(10_000 + BREAKER_HALT_SECONDS));
        assert_eq!(breaker.trip_count, 1);
    }

    #[test]
    fn spike_advisory_is_separate_from_tripping() {
        let mut m = metrics(0, 0, 0);
        m.total_volume = 3_000;
        m.daily_volume = 1_001; // avg 100/day, 10x = 1_000
        assert!(CircuitBreaker::volume_spike_advisory(&m));
        m.daily_volume = 1_000;
        assert!(!CircuitBreaker::volume_spike_advisory(&m));
    }
}
