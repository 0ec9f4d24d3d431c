/**
 * Market Monitoring Instructions
 *
 * Oracle-fed market snapshots plus the permissionless stability sweep
 * that arms the circuit breaker on extreme volatility or a liquidity
 * crisis.
 */

use anchor_lang::prelude::*;

use crate::{
    state::{CircuitBreaker, TokenLaunch, TradingMetrics},
    CircuitBreakerTripped, LaunchGuardError, MarketDataUpdated, CIRCUIT_BREAKER_SEED,
    LAUNCH_SEED, TRADING_METRICS_SEED,
};

// =============================================================================
// UPDATE MARKET DATA
// =============================================================================

#[derive(Accounts)]
pub struct UpdateMarketData<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
        has_one = authority @ LaunchGuardError::Unauthorized,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        init_if_needed,
        payer = authority,
        space = TradingMetrics::LEN,
        seeds = [TRADING_METRICS_SEED, launch.mint.as_ref()],
        bump,
    )]
    pub metrics: Account<'info, TradingMetrics>,

    pub system_program: Program<'info, System>,
}

pub fn update_market_data_handler(
    ctx: Context<UpdateMarketData>,
    price: u64,
    price_change_24h_bps: i32,
    liquidity: u64,
) -> Result<()> {
    let launch = &ctx.accounts.launch;
    let metrics = &mut ctx.accounts.metrics;
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    if metrics.mint == Pubkey::default() {
        metrics.mint = launch.mint;
        metrics.day_index = TradingMetrics::day_index_for(now);
        metrics.bump = ctx.bumps.metrics;
    }

    metrics.roll_day(now);
    metrics.apply_market_data(price, price_change_24h_bps, liquidity, launch.total_supply, now);

    emit!(MarketDataUpdated {
        launch: launch.key(),
        mint: launch.mint,
        price,
        price_change_24h_bps,
        liquidity,
        market_cap: metrics.market_cap,
    });

    Ok(())
}

// =============================================================================
// MONITOR STABILITY (permissionless crank)
// =============================================================================

#[derive(Accounts)]
pub struct MonitorStability<'info> {
    #[account(
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        seeds = [TRADING_METRICS_SEED, launch.mint.as_ref()],
        bump = metrics.bump,
    )]
    pub metrics: Account<'info, TradingMetrics>,

    #[account(
        mut,
        seeds = [CIRCUIT_BREAKER_SEED, launch.mint.as_ref()],
        bump = circuit_breaker.bump,
    )]
    pub circuit_breaker: Account<'info, CircuitBreaker>,
}

/// Returns true when trading is halted after this sweep
pub fn monitor_stability_handler(ctx: Context<MonitorStability>) -> Result<bool> {
    let metrics = &ctx.accounts.metrics;
    let breaker = &mut ctx.accounts.circuit_breaker;
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    if breaker.is_active(now) {
        return Ok(true);
    }

    if CircuitBreaker::volume_spike_advisory(metrics) {
        msg!(
            "volume spike advisory: daily volume {} against lifetime {}",
            metrics.daily_volume,
            metrics.total_volume
        );
    }

    let reason = match CircuitBreaker::should_trip(metrics) {
        Some(reason) => reason,
        None => return Ok(false),
    };

    breaker.trip(now, reason);

    emit!(CircuitBreakerTripped {
        launch: ctx.accounts.launch.key(),
        mint: ctx.accounts.launch.mint,
        reason: reason as u8,
        tripped_at: breaker.tripped_at,
        expires_at: breaker.expires_at,
        trip_count: breaker.trip_count,
    });

    Ok(true)
}
