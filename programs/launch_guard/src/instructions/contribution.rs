/**
 * Contribution Instructions
 *
 * Bookkeeping hook for the sale layer: records a contribution, moves it
 * into escrow, and pins the contributor's original allocation (the base
 * for vesting-based gradual release). Allocation math stays with the
 * sale layer.
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{transfer, Token, TokenAccount, Transfer};

use crate::{
    state::{LaunchParticipation, LaunchStatus, TokenLaunch},
    ContributionRecorded, LaunchGuardError, LAUNCH_SEED, PARTICIPATION_SEED,
};

#[derive(Accounts)]
pub struct RecordContribution<'info> {
    pub authority: Signer<'info>,

    #[account(mut)]
    pub contributor: Signer<'info>,

    #[account(
        mut,
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
        has_one = authority @ LaunchGuardError::Unauthorized,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        init_if_needed,
        payer = contributor,
        space = LaunchParticipation::LEN,
        seeds = [PARTICIPATION_SEED, launch.key().as_ref(), contributor.key().as_ref()],
        bump,
    )]
    pub participation: Account<'info, LaunchParticipation>,

    #[account(
        mut,
        constraint = contributor_token_account.owner == contributor.key()
            @ LaunchGuardError::Unauthorized,
        constraint = contributor_token_account.mint == launch.governance_mint
            @ LaunchGuardError::InvalidVault,
    )]
    pub contributor_token_account: Account<'info, TokenAccount>,

    #[account(mut, address = launch.escrow_vault @ LaunchGuardError::InvalidVault)]
    pub escrow_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn record_contribution_handler(
    ctx: Context<RecordContribution>,
    amount: u64,
    tokens_allocated: u64,
) -> Result<()> {
    let launch = &mut ctx.accounts.launch;
    let participation = &mut ctx.accounts.participation;
    let clock = Clock::get()?;

    require!(
        launch.status() == LaunchStatus::Active,
        LaunchGuardError::LaunchNotActive
    );
    require!(amount > 0, LaunchGuardError::InvalidAmount);

    transfer(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.contributor_token_account.to_account_info(),
                to: ctx.accounts.escrow_vault.to_account_info(),
                authority: ctx.accounts.contributor.to_account_info(),
            },
        ),
        amount,
    )?;

    let first_contribution = participation.participated_at == 0;
    if first_contribution {
        participation.launch = launch.key();
        participation.wallet = ctx.accounts.contributor.key();
        participation.participated_at = clock.unix_timestamp;
        participation.bump = ctx.bumps.participation;
        launch.participant_count = launch.participant_count.saturating_add(1);
    }

    participation.contributed = participation
        .contributed
        .checked_add(amount)
        .ok_or(LaunchGuardError::MathOverflow)?;
    participation.tokens_allocated = participation
        .tokens_allocated
        .checked_add(tokens_allocated)
        .ok_or(LaunchGuardError::MathOverflow)?;
    launch.raised_amount = launch
        .raised_amount
        .checked_add(amount)
        .ok_or(LaunchGuardError::MathOverflow)?;

    emit!(ContributionRecorded {
        launch: launch.key(),
        contributor: ctx.accounts.contributor.key(),
        amount,
        tokens_allocated,
        raised_amount: launch.raised_amount,
    });

    Ok(())
}
