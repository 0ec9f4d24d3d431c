/**
 * Liquidity Lock Instructions
 *
 * Withdrawal of locked liquidity after the lock period, blocked for
 * vetoed or cancelled launches so the escrow stays whole for refunds.
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{transfer, Token, TokenAccount, Transfer};

use crate::{
    state::{LaunchStatus, LiquidityLock, TokenLaunch},
    LaunchGuardError, LiquidityWithdrawn, LAUNCH_SEED, LIQUIDITY_LOCK_SEED,
};

#[derive(Accounts)]
pub struct WithdrawLiquidity<'info> {
    #[account(mut)]
    pub lock_owner: Signer<'info>,

    #[account(
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        mut,
        seeds = [LIQUIDITY_LOCK_SEED, launch.mint.as_ref()],
        bump = liquidity_lock.bump,
        has_one = lock_owner @ LaunchGuardError::Unauthorized,
    )]
    pub liquidity_lock: Account<'info, LiquidityLock>,

    #[account(
        mut,
        constraint = owner_token_account.owner == lock_owner.key()
            @ LaunchGuardError::Unauthorized,
        constraint = owner_token_account.mint == launch.governance_mint
            @ LaunchGuardError::InvalidVault,
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    #[account(mut, address = launch.escrow_vault @ LaunchGuardError::InvalidVault)]
    pub escrow_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn withdraw_liquidity_handler(ctx: Context<WithdrawLiquidity>) -> Result<()> {
    let launch = &ctx.accounts.launch;
    let lock = &mut ctx.accounts.liquidity_lock;
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        !matches!(launch.status(), LaunchStatus::Vetoed | LaunchStatus::Cancelled),
        LaunchGuardError::LaunchVetoed
    );
    require!(!lock.is_locked(now), LaunchGuardError::LiquidityStillLocked);
    require!(!lock.is_withdrawn, LaunchGuardError::AlreadyWithdrawn);

    let mint_key = launch.mint;
    let seeds: &[&[u8]] = &[LAUNCH_SEED, mint_key.as_ref(), &[launch.bump]];

    transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.escrow_vault.to_account_info(),
                to: ctx.accounts.owner_token_account.to_account_info(),
                authority: ctx.accounts.launch.to_account_info(),
            },
            &[seeds],
        ),
        lock.locked_amount,
    )?;

    lock.is_withdrawn = true;
    lock.withdrawn_at = now;

    emit!(LiquidityWithdrawn {
        launch: launch.key(),
        lock_owner: lock.lock_owner,
        amount: lock.locked_amount,
        withdrawn_at: now,
    });

    Ok(())
}
