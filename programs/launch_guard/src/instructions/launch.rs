/**
 * Launch Lifecycle Instructions
 *
 * Creation with validated anti-pump settings, tighten-only config
 * updates, completion (liquidity lock + circuit breaker), cancellation.
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, TokenAccount};

use crate::{
    state::{
        AntiPumpConfig, CircuitBreaker, LaunchStatus, LiquidityLock, TokenLaunch,
    },
    ConfigTightened, LaunchCancelled, LaunchCompleted, LaunchCreated, LaunchGuardError,
    BPS_DENOMINATOR, CIRCUIT_BREAKER_SEED, LAUNCH_SEED, LIQUIDITY_LOCK_SEED, SECONDS_PER_DAY,
};

// =============================================================================
// CREATE LAUNCH
// =============================================================================

#[derive(Accounts)]
pub struct CreateLaunch<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    pub mint: Account<'info, Mint>,

    pub governance_mint: Account<'info, Mint>,

    #[account(
        init,
        payer = creator,
        space = TokenLaunch::LEN,
        seeds = [LAUNCH_SEED, mint.key().as_ref()],
        bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    /// Escrow for raised contributions; must be owned by the launch PDA
    #[account(
        constraint = escrow_vault.owner == launch.key() @ LaunchGuardError::InvalidVault,
        constraint = escrow_vault.mint == governance_mint.key() @ LaunchGuardError::InvalidVault,
    )]
    pub escrow_vault: Account<'info, TokenAccount>,

    /// Funds veto rewards; must be owned by the launch PDA
    #[account(
        constraint = reward_vault.owner == launch.key() @ LaunchGuardError::InvalidVault,
        constraint = reward_vault.mint == governance_mint.key() @ LaunchGuardError::InvalidVault,
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    /// Collects dump penalties in the launched token
    #[account(
        constraint = penalty_vault.owner == launch.key() @ LaunchGuardError::InvalidVault,
        constraint = penalty_vault.mint == mint.key() @ LaunchGuardError::InvalidVault,
    )]
    pub penalty_vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
}

#[allow(clippy::too_many_arguments)]
pub fn create_launch_handler(
    ctx: Context<CreateLaunch>,
    launch_id: u64,
    authority: Pubkey,
    name: String,
    symbol: String,
    total_supply: u64,
    target_amount: u64,
    creator_pincode: [u8; 6],
    config: AntiPumpConfig,
) -> Result<()> {
    require!(
        !name.is_empty() && name.len() <= TokenLaunch::MAX_NAME_LEN,
        LaunchGuardError::InvalidTokenName
    );
    require!(
        !symbol.is_empty() && symbol.len() <= TokenLaunch::MAX_SYMBOL_LEN,
        LaunchGuardError::InvalidTokenSymbol
    );
    require!(total_supply > 0, LaunchGuardError::InvalidTotalSupply);
    require!(target_amount > 0, LaunchGuardError::InvalidTargetAmount);
    config.validate()?;

    let launch = &mut ctx.accounts.launch;
    let clock = Clock::get()?;

    launch.launch_id = launch_id;
    launch.creator = ctx.accounts.creator.key();
    launch.authority = authority;
    launch.mint = ctx.accounts.mint.key();
    launch.governance_mint = ctx.accounts.governance_mint.key();
    launch.name = name;
    launch.symbol = symbol;
    launch.total_supply = total_supply;
    launch.target_amount = target_amount;
    launch.raised_amount = 0;
    launch.escrow_vault = ctx.accounts.escrow_vault.key();
    launch.reward_vault = ctx.accounts.reward_vault.key();
    launch.penalty_vault = ctx.accounts.penalty_vault.key();
    launch.creator_pincode = creator_pincode;
    launch.status = LaunchStatus::Active as u8;
    launch.config = config;
    launch.participant_count = 0;
    launch.created_at = clock.unix_timestamp;
    launch.completed_at = 0;
    launch.vetoed_at = 0;
    launch.active_veto = Pubkey::default();
    launch.veto_round = 0;
    launch.bump = ctx.bumps.launch;

    emit!(LaunchCreated {
        launch: launch.key(),
        launch_id,
        creator: launch.creator,
        mint: launch.mint,
        total_supply,
        target_amount,
    });

    Ok(())
}

// =============================================================================
// TIGHTEN ANTI-PUMP CONFIG
// =============================================================================

#[derive(Accounts)]
pub struct TightenAntiPumpConfig<'info> {
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
        has_one = creator @ LaunchGuardError::Unauthorized,
    )]
    pub launch: Account<'info, TokenLaunch>,
}

pub fn tighten_config_handler(
    ctx: Context<TightenAntiPumpConfig>,
    new_config: AntiPumpConfig,
) -> Result<()> {
    let launch = &mut ctx.accounts.launch;

    require!(!launch.status().is_terminal(), LaunchGuardError::LaunchNotActive);
    new_config.validate()?;
    require!(
        launch.config.is_tightened_by(&new_config),
        LaunchGuardError::ConfigNotTightened
    );

    launch.config = new_config;

    emit!(ConfigTightened {
        launch: launch.key(),
        mint: launch.mint,
        max_wallet_bps_24h: new_config.max_wallet_bps_24h,
        max_wallet_bps_after: new_config.max_wallet_bps_after,
        sell_cooldown_seconds: new_config.sell_cooldown_seconds,
    });

    Ok(())
}

// =============================================================================
// COMPLETE LAUNCH
// =============================================================================

#[derive(Accounts)]
pub struct CompleteLaunch<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
        has_one = authority @ LaunchGuardError::Unauthorized,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        init,
        payer = authority,
        space = LiquidityLock::LEN,
        seeds = [LIQUIDITY_LOCK_SEED, launch.mint.as_ref()],
        bump,
    )]
    pub liquidity_lock: Account<'info, LiquidityLock>,

    #[account(
        init,
        payer = authority,
        space = CircuitBreaker::LEN,
        seeds = [CIRCUIT_BREAKER_SEED, launch.mint.as_ref()],
        bump,
    )]
    pub circuit_breaker: Account<'info, CircuitBreaker>,

    pub system_program: Program<'info, System>,
}

pub fn complete_launch_handler(ctx: Context<CompleteLaunch>) -> Result<()> {
    let launch = &mut ctx.accounts.launch;
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        launch.status() == LaunchStatus::Active,
        LaunchGuardError::LaunchNotActive
    );

    launch.status = LaunchStatus::Successful as u8;
    launch.completed_at = now;

    // Lock the mandated liquidity share of the raise until the lock
    // duration elapses
    let locked_amount = (launch.raised_amount as u128)
        .checked_mul(launch.config.min_liquidity_bps as u128)
        .ok_or(LaunchGuardError::MathOverflow)?
        / BPS_DENOMINATOR as u128;

    let lock = &mut ctx.accounts.liquidity_lock;
    lock.mint = launch.mint;
    lock.lock_owner = launch.creator;
    lock.locked_amount = locked_amount as u64;
    lock.lock_date = now;
    lock.unlock_date = now + launch.config.liquidity_lock_days as i64 * SECONDS_PER_DAY;
    lock.is_withdrawn = false;
    lock.withdrawn_at = 0;
    lock.bump = ctx.bumps.liquidity_lock;

    let breaker = &mut ctx.accounts.circuit_breaker;
    breaker.mint = launch.mint;
    breaker.tripped_at = 0;
    breaker.expires_at = 0;
    breaker.reason = 0;
    breaker.trip_count = 0;
    breaker.bump = ctx.bumps.circuit_breaker;

    emit!(LaunchCompleted {
        launch: launch.key(),
        mint: launch.mint,
        raised_amount: launch.raised_amount,
        locked_liquidity: lock.locked_amount,
        unlock_date: lock.unlock_date,
        completed_at: now,
    });

    Ok(())
}

// =============================================================================
// CANCEL LAUNCH
// =============================================================================

#[derive(Accounts)]
pub struct CancelLaunch<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
        has_one = authority @ LaunchGuardError::Unauthorized,
    )]
    pub launch: Account<'info, TokenLaunch>,
}

pub fn cancel_launch_handler(ctx: Context<CancelLaunch>) -> Result<()> {
    let launch = &mut ctx.accounts.launch;

    require!(
        matches!(launch.status(), LaunchStatus::Pending | LaunchStatus::Active),
        LaunchGuardError::LaunchNotActive
    );

    launch.status = LaunchStatus::Cancelled as u8;

    emit!(LaunchCancelled {
        launch: launch.key(),
        mint: launch.mint,
        raised_amount: launch.raised_amount,
    });

    Ok(())
}
