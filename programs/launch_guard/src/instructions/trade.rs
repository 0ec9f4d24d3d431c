/**
 * Trade Validation Instructions
 *
 * The gatekeeper the transfer layer consults before moving a launched
 * token. Returns a typed TradeOutcome rather than failing the
 * transaction: rejections carry a reason, dump penalties are collected
 * in-line, and bot restrictions persist exactly as the gate describes.
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{transfer, Token, TokenAccount, Transfer};

use crate::{
    state::{
        dump_penalty_amount, dump_penalty_bps, dump_suspends, is_dump, CircuitBreaker,
        LaunchParticipation, RejectReason, TokenLaunch, TradeOutcome, TradingMetrics,
        WalletLimits,
    },
    DumpPenaltyApplied, LaunchGuardError, TradeValidated, WalletLimitRefreshed,
    WalletRestrictionReset, WhaleSellFlagged, CIRCUIT_BREAKER_SEED, DAILY_SELL_CAP_BPS,
    LAUNCH_SEED, PARTICIPATION_SEED, RESTRICTION_RESET_COOLOFF_SECONDS,
    TRADING_METRICS_SEED, WALLET_CAP_PHASE_SECONDS, WALLET_LIMITS_SEED, WHALE_SUPPLY_BPS,
};

// =============================================================================
// VALIDATE TRADE
// =============================================================================

#[derive(Accounts)]
pub struct ValidateTrade<'info> {
    #[account(mut)]
    pub trader: Signer<'info>,

    #[account(
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        init_if_needed,
        payer = trader,
        space = WalletLimits::LEN,
        seeds = [WALLET_LIMITS_SEED, launch.mint.as_ref(), trader.key().as_ref()],
        bump,
    )]
    pub wallet_limits: Account<'info, WalletLimits>,

    #[account(
        init_if_needed,
        payer = trader,
        space = TradingMetrics::LEN,
        seeds = [TRADING_METRICS_SEED, launch.mint.as_ref()],
        bump,
    )]
    pub metrics: Account<'info, TradingMetrics>,

    #[account(
        seeds = [CIRCUIT_BREAKER_SEED, launch.mint.as_ref()],
        bump = circuit_breaker.bump,
    )]
    pub circuit_breaker: Account<'info, CircuitBreaker>,

    /// CHECK: verified in the handler against the participation PDA for
    /// (launch, trader). The slot is mandatory: a wallet proves it never
    /// participated by the PDA holding no data, not by omitting the
    /// account.
    #[account(mut)]
    pub participation: UncheckedAccount<'info>,

    #[account(
        mut,
        constraint = trader_token_account.owner == trader.key()
            @ LaunchGuardError::Unauthorized,
        constraint = trader_token_account.mint == launch.mint
            @ LaunchGuardError::InvalidVault,
    )]
    pub trader_token_account: Account<'info, TokenAccount>,

    #[account(mut, address = launch.penalty_vault @ LaunchGuardError::InvalidVault)]
    pub penalty_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

/// Resolve the trader's participation record at its verified PDA.
/// Zero-length data at the right address means the wallet never
/// participated; populated data must deserialize and belong to this
/// program.
fn load_participation(
    info: &AccountInfo,
    expected: Pubkey,
) -> Result<Option<LaunchParticipation>> {
    require_keys_eq!(
        *info.key,
        expected,
        LaunchGuardError::InvalidParticipationAccount
    );
    if info.data_is_empty() {
        return Ok(None);
    }
    require!(
        *info.owner == crate::ID,
        LaunchGuardError::InvalidParticipationAccount
    );
    let data = info.try_borrow_data()?;
    Ok(Some(LaunchParticipation::try_deserialize(&mut data.as_ref())?))
}

/// Emit the validation event for a refused trade and build the outcome.
/// Rejections commit no trade state.
fn reject(
    launch: Pubkey,
    trader: Pubkey,
    amount: u64,
    is_sell: bool,
    reason: RejectReason,
) -> TradeOutcome {
    let outcome = TradeOutcome::Rejected { reason };
    emit!(TradeValidated {
        launch,
        trader,
        amount,
        is_sell,
        outcome: outcome.code(),
        reason: reason as u8,
        penalty: 0,
    });
    outcome
}

pub fn validate_trade_handler(
    ctx: Context<ValidateTrade>,
    amount: u64,
    is_sell: bool,
) -> Result<TradeOutcome> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let slot = clock.slot;

    let launch = &ctx.accounts.launch;
    let launch_key = launch.key();
    let trader_key = ctx.accounts.trader.key();
    let config = launch.config;

    require!(amount > 0, LaunchGuardError::InvalidAmount);

    if !launch.trading_open(now) {
        return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::TradingNotStarted));
    }

    if ctx.accounts.circuit_breaker.is_active(now) {
        return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::EmergencyStop));
    }

    // Lazy initialization: pin identity and the phase-derived cap on the
    // wallet's first observation. Identity persists even if this trade
    // is refused further down.
    let fresh_wallet = ctx.accounts.wallet_limits.wallet == Pubkey::default();
    if fresh_wallet {
        let wallet_limits = &mut ctx.accounts.wallet_limits;
        wallet_limits.mint = launch.mint;
        wallet_limits.wallet = trader_key;
        wallet_limits.max_amount = launch.max_wallet_amount(now);
        wallet_limits.bump = ctx.bumps.wallet_limits;
    }
    if ctx.accounts.metrics.mint == Pubkey::default() {
        let metrics = &mut ctx.accounts.metrics;
        metrics.mint = launch.mint;
        metrics.day_index = TradingMetrics::day_index_for(now);
        metrics.bump = ctx.bumps.metrics;
    }

    let (expected_participation, _) = Pubkey::find_program_address(
        &[PARTICIPATION_SEED, launch_key.as_ref(), trader_key.as_ref()],
        ctx.program_id,
    );
    let participation_info = ctx.accounts.participation.to_account_info();
    let mut participation = load_participation(&participation_info, expected_participation)?;

    // Trade bookkeeping is staged on a local copy and only written back
    // on the paths that are allowed to persist
    let mut limits = ctx.accounts.wallet_limits.clone().into_inner();

    if limits.is_restricted {
        return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::WalletLimitExceeded));
    }

    // Anti-bot gate: the restricting strike persists even though the
    // trade is refused
    if limits.register_bot_check(slot, config.min_slots_between_tx) {
        limits.restricted_at = now;
        ctx.accounts.wallet_limits.set_inner(limits);
        return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::BotDetected));
    }

    // Holding cap
    if is_sell {
        limits.current_amount = limits.current_amount.saturating_sub(amount);
    } else {
        let new_amount = limits
            .current_amount
            .checked_add(amount)
            .ok_or(LaunchGuardError::MathOverflow)?;
        if new_amount > limits.max_amount {
            return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::WalletLimitExceeded));
        }
        limits.current_amount = new_amount;
    }

    let mut outcome = TradeOutcome::Allowed;
    let mut whale_flagged = false;

    if is_sell {
        if limits.in_sell_cooldown(now, config.sell_cooldown_seconds) {
            return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::CooldownPeriodActive));
        }

        // Dump detection over the trailing 24h window. A dump is
        // penalized, not refused - unless violations have piled up past
        // the suspension point. The increment lives on the local copy,
        // so a later rejection discards it.
        let sold_24h = limits.sold_in_window(now).saturating_add(amount);
        let balance = ctx.accounts.trader_token_account.amount;
        if is_dump(sold_24h, balance) {
            limits.violation_count = limits.violation_count.saturating_add(1);
            if dump_suspends(limits.violation_count) {
                limits.is_restricted = true;
                limits.restricted_at = now;
                ctx.accounts.wallet_limits.set_inner(limits);
                return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::BotDetected));
            }
            if let Some(rate) = dump_penalty_bps(limits.violation_count) {
                outcome = TradeOutcome::AllowedWithPenalty {
                    penalty: dump_penalty_amount(amount, rate),
                };
            }
        }

        // Whale gate is advisory only: flagged and logged, never blocked
        if amount > launch.supply_fraction_bps(WHALE_SUPPLY_BPS) {
            whale_flagged = true;
            msg!(
                "whale sell flagged: {} units of mint {}",
                amount,
                launch.mint
            );
        }

        // Daily sell cap: 2% of total supply per wallet per UTC day
        let daily_cap = launch.supply_fraction_bps(DAILY_SELL_CAP_BPS);
        if limits.sold_today_at(now).saturating_add(amount) > daily_cap {
            return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::MaxTransactionsExceeded));
        }

        if config.gradual_release_enabled {
            if let Some(record) = &participation {
                if record.violates_gradual_release(amount, launch.completed_at, now) {
                    return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::GradualReleaseViolation));
                }
            }
        }
    }

    // Price impact applies to both sides of the book
    if ctx.accounts.metrics.exceeds_price_impact(amount, config.max_price_impact_bps) {
        return Ok(reject(launch_key, trader_key, amount, is_sell, RejectReason::PriceImpactTooHigh));
    }

    if is_sell {
        limits.record_sell(amount, now, slot);
    }

    // Commit
    limits.last_tx_time = now;
    limits.last_tx_slot = slot;
    ctx.accounts.wallet_limits.set_inner(limits);

    let penalty = match outcome {
        TradeOutcome::AllowedWithPenalty { penalty } => penalty,
        _ => 0,
    };
    if penalty > 0 {
        transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.trader_token_account.to_account_info(),
                    to: ctx.accounts.penalty_vault.to_account_info(),
                    authority: ctx.accounts.trader.to_account_info(),
                },
            ),
            penalty,
        )?;
        emit!(DumpPenaltyApplied {
            launch: launch_key,
            seller: trader_key,
            sell_amount: amount,
            penalty,
            violation_count: ctx.accounts.wallet_limits.violation_count,
        });
    }

    if is_sell && config.gradual_release_enabled {
        if let Some(record) = participation.as_mut() {
            if record.tokens_allocated > 0 {
                record.vesting_sold = record.vesting_sold.saturating_add(amount);
                let mut data = participation_info.try_borrow_mut_data()?;
                let mut cursor: &mut [u8] = &mut data;
                record.try_serialize(&mut cursor)?;
            }
        }
    }

    ctx.accounts.metrics.record_trade(amount, now, fresh_wallet);

    if whale_flagged {
        emit!(WhaleSellFlagged {
            launch: launch_key,
            seller: trader_key,
            amount,
            supply_bps_threshold: WHALE_SUPPLY_BPS,
        });
    }

    emit!(TradeValidated {
        launch: launch_key,
        trader: trader_key,
        amount,
        is_sell,
        outcome: outcome.code(),
        reason: u8::MAX,
        penalty,
    });

    Ok(outcome)
}

// =============================================================================
// REFRESH WALLET LIMIT (24h phase crank)
// =============================================================================

#[derive(Accounts)]
pub struct RefreshWalletLimit<'info> {
    #[account(
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        mut,
        seeds = [WALLET_LIMITS_SEED, launch.mint.as_ref(), wallet_limits.wallet.as_ref()],
        bump = wallet_limits.bump,
    )]
    pub wallet_limits: Account<'info, WalletLimits>,
}

pub fn refresh_wallet_limit_handler(ctx: Context<RefreshWalletLimit>) -> Result<()> {
    let launch = &ctx.accounts.launch;
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        launch.completed_at > 0 && now - launch.completed_at >= WALLET_CAP_PHASE_SECONDS,
        LaunchGuardError::CapPhaseNotReached
    );

    let wallet_limits = &mut ctx.accounts.wallet_limits;
    wallet_limits.max_amount = launch.max_wallet_amount(now);

    emit!(WalletLimitRefreshed {
        launch: launch.key(),
        wallet: wallet_limits.wallet,
        max_amount: wallet_limits.max_amount,
    });

    Ok(())
}

// =============================================================================
// RESET WALLET RESTRICTION (governance action)
// =============================================================================

#[derive(Accounts)]
pub struct ResetWalletRestriction<'info> {
    pub authority: Signer<'info>,

    #[account(
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
        has_one = authority @ LaunchGuardError::Unauthorized,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        mut,
        seeds = [WALLET_LIMITS_SEED, launch.mint.as_ref(), wallet_limits.wallet.as_ref()],
        bump = wallet_limits.bump,
    )]
    pub wallet_limits: Account<'info, WalletLimits>,
}

pub fn reset_wallet_restriction_handler(ctx: Context<ResetWalletRestriction>) -> Result<()> {
    let wallet_limits = &mut ctx.accounts.wallet_limits;
    let clock = Clock::get()?;

    require!(wallet_limits.is_restricted, LaunchGuardError::WalletNotRestricted);
    require!(
        clock.unix_timestamp - wallet_limits.restricted_at
            >= RESTRICTION_RESET_COOLOFF_SECONDS,
        LaunchGuardError::RestrictionResetTooEarly
    );

    wallet_limits.is_restricted = false;
    wallet_limits.restricted_at = 0;
    wallet_limits.violation_count = 0;

    emit!(WalletRestrictionReset {
        launch: ctx.accounts.launch.key(),
        wallet: wallet_limits.wallet,
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(allocated: u64) -> LaunchParticipation {
        LaunchParticipation {
            launch: Pubkey::new_unique(),
            wallet: Pubkey::new_unique(),
            contributed: 500,
            tokens_allocated: allocated,
            vesting_sold: 0,
            is_refunded: false,
            refunded_at: 0,
            participated_at: 42,
            bump: 254,
            reserved: [0; 16],
        }
    }

    fn serialized(record: &LaunchParticipation) -> Vec<u8> {
        let mut buf = vec![0u8; LaunchParticipation::LEN];
        let mut cursor: &mut [u8] = &mut buf;
        record.try_serialize(&mut cursor).unwrap();
        buf
    }

    #[test]
    fn empty_pda_data_means_non_participant() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0u64;
        let mut data: [u8; 0] = [];
        let info =
            AccountInfo::new(&key, false, false, &mut lamports, &mut data, &owner, false, 0);

        assert!(load_participation(&info, key).unwrap().is_none());
    }

    #[test]
    fn wrong_address_is_rejected_even_when_empty() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 0u64;
        let mut data: [u8; 0] = [];
        let info =
            AccountInfo::new(&key, false, false, &mut lamports, &mut data, &owner, false, 0);

        // a seller cannot substitute some other empty account for the
        // participation PDA to skip the vesting gate
        assert!(load_participation(&info, Pubkey::new_unique()).is_err());
    }

    #[test]
    fn populated_pda_yields_the_record() {
        let key = Pubkey::new_unique();
        let owner = crate::ID;
        let mut lamports = 1u64;
        let mut data = serialized(&record(1_000));
        let info =
            AccountInfo::new(&key, false, true, &mut lamports, &mut data, &owner, false, 0);

        let loaded = load_participation(&info, key).unwrap().unwrap();
        assert_eq!(loaded.tokens_allocated, 1_000);
        assert_eq!(loaded.vesting_sold, 0);
    }

    #[test]
    fn foreign_owned_record_is_rejected() {
        let key = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let mut lamports = 1u64;
        let mut data = serialized(&record(1_000));
        let info =
            AccountInfo::new(&key, false, true, &mut lamports, &mut data, &owner, false, 0);

        assert!(load_participation(&info, key).is_err());
    }
}
