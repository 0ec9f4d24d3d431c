/**
 * Community Veto Instructions
 *
 * Stake-weighted veto lifecycle: voter profile registration, proposal
 * initiation, weighted voting with early termination, expiry
 * finalization, and the claim paths for refunds and yes-voter rewards.
 */

use anchor_lang::prelude::*;
use anchor_spl::token::{transfer, Token, TokenAccount, Transfer};

use crate::{
    state::{
        voting_power, CommunityVeto, LaunchParticipation, LaunchStatus, TokenLaunch,
        VetoStatus, VetoVoteRecord, VoterProfile,
    },
    ContributionRefunded, LaunchGuardError, VetoFinalized, VetoInitiated, VetoRewardClaimed,
    VetoVoteCast, BPS_DENOMINATOR, COMMUNITY_VETO_SEED, LAUNCH_SEED, MIN_VETO_STAKE,
    PARTICIPATION_SEED, VETO_REWARD_BPS, VETO_THRESHOLD_BPS, VETO_VOTE_RECORD_SEED,
    VETO_WINDOW_SECONDS, VOTER_PROFILE_SEED,
};

// =============================================================================
// REGISTER VOTER PROFILE
// =============================================================================

#[derive(Accounts)]
pub struct RegisterVoterProfile<'info> {
    #[account(mut)]
    pub voter: Signer<'info>,

    #[account(
        init_if_needed,
        payer = voter,
        space = VoterProfile::LEN,
        seeds = [VOTER_PROFILE_SEED, voter.key().as_ref()],
        bump,
    )]
    pub profile: Account<'info, VoterProfile>,

    pub system_program: Program<'info, System>,
}

pub fn register_voter_profile_handler(
    ctx: Context<RegisterVoterProfile>,
    pincode: [u8; 6],
) -> Result<()> {
    let profile = &mut ctx.accounts.profile;
    let clock = Clock::get()?;

    // Holding duration is anchored to first registration and never reset
    if profile.first_held_at == 0 {
        profile.voter = ctx.accounts.voter.key();
        profile.first_held_at = clock.unix_timestamp;
        profile.bump = ctx.bumps.profile;
    }
    profile.pincode = pincode;

    Ok(())
}

// =============================================================================
// INITIATE VETO
// =============================================================================

#[derive(Accounts)]
pub struct InitiateVeto<'info> {
    #[account(mut)]
    pub initiator: Signer<'info>,

    #[account(
        mut,
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        init,
        payer = initiator,
        space = CommunityVeto::LEN,
        seeds = [
            COMMUNITY_VETO_SEED,
            launch.key().as_ref(),
            &(launch.veto_round + 1).to_le_bytes(),
        ],
        bump,
    )]
    pub veto: Account<'info, CommunityVeto>,

    /// Initiator's governance token account, proving the minimum stake
    #[account(
        constraint = initiator_gov_account.owner == initiator.key()
            @ LaunchGuardError::Unauthorized,
        constraint = initiator_gov_account.mint == launch.governance_mint
            @ LaunchGuardError::InvalidVault,
    )]
    pub initiator_gov_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
}

pub fn initiate_veto_handler(ctx: Context<InitiateVeto>, reason: String) -> Result<()> {
    let launch = &mut ctx.accounts.launch;
    let veto = &mut ctx.accounts.veto;
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        launch.status() == LaunchStatus::Active,
        LaunchGuardError::LaunchNotActive
    );
    require!(
        launch.active_veto == Pubkey::default(),
        LaunchGuardError::CommunityVetoActive
    );
    require!(
        reason.len() <= CommunityVeto::MAX_REASON_LEN,
        LaunchGuardError::ReasonTooLong
    );
    require!(
        ctx.accounts.initiator_gov_account.amount >= MIN_VETO_STAKE,
        LaunchGuardError::InsufficientVotingPower
    );

    let round = launch.veto_round + 1;

    veto.launch = launch.key();
    veto.initiated_by = ctx.accounts.initiator.key();
    veto.reason = reason;
    veto.vote_start = now;
    veto.vote_end = now + VETO_WINDOW_SECONDS;
    veto.yes_power = 0;
    veto.no_power = 0;
    veto.total_power = 0;
    veto.voter_count = 0;
    veto.threshold_bps = VETO_THRESHOLD_BPS;
    veto.status = VetoStatus::Active as u8;
    veto.finalized_at = 0;
    veto.round = round;
    veto.bump = ctx.bumps.veto;

    launch.active_veto = veto.key();
    launch.veto_round = round;

    emit!(VetoInitiated {
        launch: launch.key(),
        veto: veto.key(),
        initiated_by: veto.initiated_by,
        round,
        vote_end: veto.vote_end,
        threshold_bps: veto.threshold_bps,
    });

    Ok(())
}

// =============================================================================
// CAST VETO VOTE
// =============================================================================

#[derive(Accounts)]
pub struct CastVetoVote<'info> {
    #[account(mut)]
    pub voter: Signer<'info>,

    #[account(
        mut,
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        mut,
        seeds = [COMMUNITY_VETO_SEED, launch.key().as_ref(), &veto.round.to_le_bytes()],
        bump = veto.bump,
        constraint = veto.key() == launch.active_veto @ LaunchGuardError::VetoNotActive,
    )]
    pub veto: Account<'info, CommunityVeto>,

    #[account(
        init_if_needed,
        payer = voter,
        space = VetoVoteRecord::LEN,
        seeds = [VETO_VOTE_RECORD_SEED, veto.key().as_ref(), voter.key().as_ref()],
        bump,
    )]
    pub vote_record: Account<'info, VetoVoteRecord>,

    #[account(
        mut,
        seeds = [VOTER_PROFILE_SEED, voter.key().as_ref()],
        bump = profile.bump,
    )]
    pub profile: Account<'info, VoterProfile>,

    /// Voter's governance token account, the balance base of voting power
    #[account(
        constraint = voter_gov_account.owner == voter.key()
            @ LaunchGuardError::Unauthorized,
        constraint = voter_gov_account.mint == launch.governance_mint
            @ LaunchGuardError::InvalidVault,
    )]
    pub voter_gov_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
}

pub fn cast_veto_vote_handler(ctx: Context<CastVetoVote>, support: bool) -> Result<()> {
    let launch = &mut ctx.accounts.launch;
    let veto = &mut ctx.accounts.veto;
    let vote_record = &mut ctx.accounts.vote_record;
    let profile = &mut ctx.accounts.profile;
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        veto.status() == VetoStatus::Active,
        LaunchGuardError::VetoNotActive
    );
    require!(now <= veto.vote_end, LaunchGuardError::VotingPeriodExpired);
    require!(vote_record.voted_at == 0, LaunchGuardError::AlreadyVoted);

    let holding_seconds = now - profile.first_held_at;
    let power = voting_power(
        ctx.accounts.voter_gov_account.amount,
        &profile.pincode,
        &launch.creator_pincode,
        holding_seconds,
        profile.governance_participation,
    );
    require!(power > 0, LaunchGuardError::InsufficientVotingPower);

    veto.record_vote(support, power);

    vote_record.veto = veto.key();
    vote_record.voter = ctx.accounts.voter.key();
    vote_record.support = support;
    vote_record.power = power;
    vote_record.voted_at = now;
    vote_record.reward_claimed = false;
    vote_record.bump = ctx.bumps.vote_record;

    profile.governance_participation = profile.governance_participation.saturating_add(1);

    emit!(VetoVoteCast {
        veto: veto.key(),
        voter: vote_record.voter,
        support,
        power,
        yes_power: veto.yes_power,
        total_power: veto.total_power,
    });

    // Early termination: once the threshold holds it cannot unhold, so
    // the proposal passes without waiting out the window
    if veto.threshold_reached() {
        veto.status = VetoStatus::Passed as u8;
        veto.finalized_at = now;
        launch.status = LaunchStatus::Vetoed as u8;
        launch.vetoed_at = now;

        emit!(VetoFinalized {
            launch: launch.key(),
            veto: veto.key(),
            passed: true,
            yes_power: veto.yes_power,
            no_power: veto.no_power,
            total_power: veto.total_power,
            voter_count: veto.voter_count,
        });
    }

    Ok(())
}

// =============================================================================
// FINALIZE VETO (permissionless, after window expiry)
// =============================================================================

#[derive(Accounts)]
pub struct FinalizeVeto<'info> {
    #[account(
        mut,
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        mut,
        seeds = [COMMUNITY_VETO_SEED, launch.key().as_ref(), &veto.round.to_le_bytes()],
        bump = veto.bump,
        constraint = veto.key() == launch.active_veto @ LaunchGuardError::VetoNotActive,
    )]
    pub veto: Account<'info, CommunityVeto>,
}

pub fn finalize_veto_handler(ctx: Context<FinalizeVeto>) -> Result<()> {
    let launch = &mut ctx.accounts.launch;
    let veto = &mut ctx.accounts.veto;
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;

    require!(
        veto.status() == VetoStatus::Active,
        LaunchGuardError::VetoNotActive
    );
    require!(now > veto.vote_end, LaunchGuardError::VotingPeriodNotEnded);

    let passed = veto.threshold_reached();
    veto.finalized_at = now;

    if passed {
        veto.status = VetoStatus::Passed as u8;
        launch.status = LaunchStatus::Vetoed as u8;
        launch.vetoed_at = now;
    } else {
        veto.status = VetoStatus::Failed as u8;
        // Clear the live-veto slot so a fresh round can be proposed
        launch.active_veto = Pubkey::default();
    }

    emit!(VetoFinalized {
        launch: launch.key(),
        veto: veto.key(),
        passed,
        yes_power: veto.yes_power,
        no_power: veto.no_power,
        total_power: veto.total_power,
        voter_count: veto.voter_count,
    });

    Ok(())
}

// =============================================================================
// CLAIM REFUND
// =============================================================================

#[derive(Accounts)]
pub struct ClaimRefund<'info> {
    #[account(mut)]
    pub contributor: Signer<'info>,

    #[account(
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        mut,
        seeds = [PARTICIPATION_SEED, launch.key().as_ref(), contributor.key().as_ref()],
        bump = participation.bump,
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
}

pub fn claim_refund_handler(ctx: Context<ClaimRefund>) -> Result<()> {
    let launch = &ctx.accounts.launch;
    let participation = &mut ctx.accounts.participation;
    let clock = Clock::get()?;

    require!(
        matches!(launch.status(), LaunchStatus::Vetoed | LaunchStatus::Cancelled),
        LaunchGuardError::RefundNotAvailable
    );
    require!(!participation.is_refunded, LaunchGuardError::AlreadyRefunded);
    require!(participation.contributed > 0, LaunchGuardError::NothingToClaim);

    let mint_key = launch.mint;
    let seeds: &[&[u8]] = &[LAUNCH_SEED, mint_key.as_ref(), &[launch.bump]];

    transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.escrow_vault.to_account_info(),
                to: ctx.accounts.contributor_token_account.to_account_info(),
                authority: ctx.accounts.launch.to_account_info(),
            },
            &[seeds],
        ),
        participation.contributed,
    )?;

    participation.is_refunded = true;
    participation.refunded_at = clock.unix_timestamp;

    emit!(ContributionRefunded {
        launch: launch.key(),
        contributor: ctx.accounts.contributor.key(),
        amount: participation.contributed,
    });

    Ok(())
}

// =============================================================================
// CLAIM VETO REWARD
// =============================================================================

#[derive(Accounts)]
pub struct ClaimVetoReward<'info> {
    #[account(mut)]
    pub voter: Signer<'info>,

    #[account(
        seeds = [LAUNCH_SEED, launch.mint.as_ref()],
        bump = launch.bump,
    )]
    pub launch: Account<'info, TokenLaunch>,

    #[account(
        seeds = [COMMUNITY_VETO_SEED, launch.key().as_ref(), &veto.round.to_le_bytes()],
        bump = veto.bump,
        constraint = veto.launch == launch.key() @ LaunchGuardError::VetoNotPassed,
    )]
    pub veto: Account<'info, CommunityVeto>,

    #[account(
        mut,
        seeds = [VETO_VOTE_RECORD_SEED, veto.key().as_ref(), voter.key().as_ref()],
        bump = vote_record.bump,
        constraint = vote_record.voter == voter.key() @ LaunchGuardError::Unauthorized,
    )]
    pub vote_record: Account<'info, VetoVoteRecord>,

    #[account(
        mut,
        constraint = voter_gov_account.owner == voter.key()
            @ LaunchGuardError::Unauthorized,
        constraint = voter_gov_account.mint == launch.governance_mint
            @ LaunchGuardError::InvalidVault,
    )]
    pub voter_gov_account: Account<'info, TokenAccount>,

    #[account(mut, address = launch.reward_vault @ LaunchGuardError::InvalidVault)]
    pub reward_vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

pub fn claim_veto_reward_handler(ctx: Context<ClaimVetoReward>) -> Result<()> {
    let launch = &ctx.accounts.launch;
    let veto = &ctx.accounts.veto;
    let vote_record = &mut ctx.accounts.vote_record;

    require!(
        veto.status() == VetoStatus::Passed,
        LaunchGuardError::VetoNotPassed
    );
    require!(vote_record.support, LaunchGuardError::NothingToClaim);
    require!(!vote_record.reward_claimed, LaunchGuardError::AlreadyClaimed);

    // 1% of the raise target, split pro rata across yes power
    let pool = ((launch.target_amount as u128) * (VETO_REWARD_BPS as u128)
        / (BPS_DENOMINATOR as u128)) as u64;
    let share = veto.reward_share(pool, vote_record.power);
    require!(share > 0, LaunchGuardError::NothingToClaim);

    let mint_key = launch.mint;
    let seeds: &[&[u8]] = &[LAUNCH_SEED, mint_key.as_ref(), &[launch.bump]];

    transfer(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            Transfer {
                from: ctx.accounts.reward_vault.to_account_info(),
                to: ctx.accounts.voter_gov_account.to_account_info(),
                authority: ctx.accounts.launch.to_account_info(),
            },
            &[seeds],
        ),
        share,
    )?;

    vote_record.reward_claimed = true;

    emit!(VetoRewardClaimed {
        launch: launch.key(),
        veto: veto.key(),
        voter: ctx.accounts.voter.key(),
        amount: share,
    });

    Ok(())
}
