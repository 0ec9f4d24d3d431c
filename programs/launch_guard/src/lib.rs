/**
 * Launch Guard
 *
 * Anti-pump-and-dump and launch-governance engine for a token
 * launchpad: time-phased wallet caps, trade validation with bot and
 * dump detection, vesting-based gradual release, circuit breakers, and
 * stake-weighted community veto with refunds and rewards.
 */

use anchor_lang::prelude::*;

pub mod state;
pub mod instructions;

use state::*;
use instructions::*;

declare_id!("2JT4ETnC5dWLoy8s9CemsetW9eXSsDyeFjcm7rWvvsgK");

// =============================================================================
// SEEDS
// =============================================================================

pub const LAUNCH_SEED: &[u8] = b"launch";
pub const WALLET_LIMITS_SEED: &[u8] = b"wallet_limits";
pub const TRADING_METRICS_SEED: &[u8] = b"trading_metrics";
pub const CIRCUIT_BREAKER_SEED: &[u8] = b"circuit_breaker";
pub const LIQUIDITY_LOCK_SEED: &[u8] = b"liquidity_lock";
pub const PARTICIPATION_SEED: &[u8] = b"participation";
pub const COMMUNITY_VETO_SEED: &[u8] = b"community_veto";
pub const VETO_VOTE_RECORD_SEED: &[u8] = b"veto_vote";
pub const VOTER_PROFILE_SEED: &[u8] = b"voter_profile";

// =============================================================================
// CONSTANTS
// =============================================================================

/// Basis points denominator (10000 = 100%)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Seconds in one UTC calendar day
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Hard ceiling on any wallet cap: 10% of supply
pub const MAX_WALLET_CAP_BPS: u16 = 1_000;

/// First-24h wallet cap phase length
pub const WALLET_CAP_PHASE_SECONDS: i64 = 24 * 60 * 60;

/// Minimum liquidity lock: 1 year
pub const MIN_LIQUIDITY_LOCK_DAYS: u32 = 365;

/// Minimum share of the raise locked as liquidity: 80%
pub const MIN_LIQUIDITY_BPS: u16 = 8_000;

/// Rapid-trade strikes before a wallet is restricted
pub const BOT_VIOLATION_LIMIT: u32 = 3;

/// Selling more than this share of holdings in 24h is a dump: 50%
pub const DUMP_RATIO_BPS: u64 = 5_000;

/// Rolling window for dump detection
pub const DUMP_WINDOW_SECONDS: i64 = 24 * 60 * 60;

/// Dump violations above this count suspend the wallet
pub const DUMP_VIOLATION_SUSPEND: u32 = 5;

/// Floor for the configurable sell cooldown: 45 minutes. 24h divided by
/// this spacing is exactly the sell-ring capacity, so the dump window
/// can never outgrow the ring.
pub const MIN_SELL_COOLDOWN_SECONDS: i64 = 45 * 60;

/// Per-wallet daily sell cap: 2% of total supply
pub const DAILY_SELL_CAP_BPS: u64 = 200;

/// Sells above 5% of supply are flagged as whale activity
pub const WHALE_SUPPLY_BPS: u64 = 500;

/// Cool-off before a restricted wallet may be reset: 24 hours
pub const RESTRICTION_RESET_COOLOFF_SECONDS: i64 = 24 * 60 * 60;

/// Fixed-point scale for reported prices (1.0 = 1_000_000)
pub const PRICE_SCALE: u64 = 1_000_000;

/// Circuit breaker halt duration: 1 hour
pub const BREAKER_HALT_SECONDS: i64 = 60 * 60;

/// |24h price move| that trips the breaker: 50%
pub const PRICE_MOVE_TRIP_BPS: u32 = 5_000;

/// Daily volume above this multiple of liquidity is a liquidity crisis
pub const VOLUME_LIQUIDITY_TRIP_MULTIPLE: u64 = 2;

/// Daily volume above this multiple of the 30-day average is logged
pub const VOLUME_SPIKE_ADVISORY_MULTIPLE: u64 = 10;

/// Raw units per governance token (6 decimals)
pub const GOV_UNIT: u64 = 1_000_000;

/// Minimum governance stake to initiate a veto: 10000 tokens
pub const MIN_VETO_STAKE: u64 = 10_000 * GOV_UNIT;

/// Voting power below this floors to zero (ineligible)
pub const MIN_VOTING_POWER: u64 = 1_000 * GOV_UNIT;

/// Veto voting window: 72 hours
pub const VETO_WINDOW_SECONDS: i64 = 72 * 60 * 60;

/// Yes-power share of total power needed to pass: 70%
pub const VETO_THRESHOLD_BPS: u16 = 7_000;

/// Yes-voter reward pool: 1% of the raise target
pub const VETO_REWARD_BPS: u64 = 100;

// =============================================================================
// PROGRAM
// =============================================================================

#[program]
pub mod launch_guard {
    use super::*;

    // =========================================================================
    // LAUNCH LIFECYCLE
    // =========================================================================

    /// Register a token launch with its anti-pump configuration
    #[allow(clippy::too_many_arguments)]
    pub fn create_launch(
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
        instructions::launch::create_launch_handler(
            ctx,
            launch_id,
            authority,
            name,
            symbol,
            total_supply,
            target_amount,
            creator_pincode,
            config,
        )
    }

    /// Replace the anti-pump configuration (tighten-only)
    pub fn tighten_anti_pump_config(
        ctx: Context<TightenAntiPumpConfig>,
        new_config: AntiPumpConfig,
    ) -> Result<()> {
        instructions::launch::tighten_config_handler(ctx, new_config)
    }

    /// Mark the raise successful, lock liquidity, arm the circuit breaker
    pub fn complete_launch(ctx: Context<CompleteLaunch>) -> Result<()> {
        instructions::launch::complete_launch_handler(ctx)
    }

    /// Cancel a pending or active launch (contributions become refundable)
    pub fn cancel_launch(ctx: Context<CancelLaunch>) -> Result<()> {
        instructions::launch::cancel_launch_handler(ctx)
    }

    // =========================================================================
    // CONTRIBUTIONS
    // =========================================================================

    /// Record a contribution and its token allocation
    pub fn record_contribution(
        ctx: Context<RecordContribution>,
        amount: u64,
        tokens_allocated: u64,
    ) -> Result<()> {
        instructions::contribution::record_contribution_handler(ctx, amount, tokens_allocated)
    }

    // =========================================================================
    // TRADE VALIDATION
    // =========================================================================

    /// Run a proposed trade through every protection gate.
    /// Returns the outcome; rejected trades do not fail the transaction.
    pub fn validate_trade(
        ctx: Context<ValidateTrade>,
        amount: u64,
        is_sell: bool,
    ) -> Result<TradeOutcome> {
        instructions::trade::validate_trade_handler(ctx, amount, is_sell)
    }

    /// Recompute a wallet's cap once the 24h phase has passed
    pub fn refresh_wallet_limit(ctx: Context<RefreshWalletLimit>) -> Result<()> {
        instructions::trade::refresh_wallet_limit_handler(ctx)
    }

    /// Lift a wallet restriction after the cool-off (launch authority)
    pub fn reset_wallet_restriction(ctx: Context<ResetWalletRestriction>) -> Result<()> {
        instructions::trade::reset_wallet_restriction_handler(ctx)
    }

    // =========================================================================
    // MARKET MONITORING
    // =========================================================================

    /// Feed a market snapshot into the trading metrics
    pub fn update_market_data(
        ctx: Context<UpdateMarketData>,
        price: u64,
        price_change_24h_bps: i32,
        liquidity: u64,
    ) -> Result<()> {
        instructions::monitor::update_market_data_handler(
            ctx,
            price,
            price_change_24h_bps,
            liquidity,
        )
    }

    /// Evaluate stability conditions; trips the circuit breaker when
    /// warranted. Returns true when trading is halted.
    pub fn monitor_stability(ctx: Context<MonitorStability>) -> Result<bool> {
        instructions::monitor::monitor_stability_handler(ctx)
    }

    // =========================================================================
    // COMMUNITY VETO
    // =========================================================================

    /// Register or update a voter profile (pincode, holding anchor)
    pub fn register_voter_profile(
        ctx: Context<RegisterVoterProfile>,
        pincode: [u8; 6],
    ) -> Result<()> {
        instructions::veto::register_voter_profile_handler(ctx, pincode)
    }

    /// Open a veto proposal against an active launch
    pub fn initiate_veto(ctx: Context<InitiateVeto>, reason: String) -> Result<()> {
        instructions::veto::initiate_veto_handler(ctx, reason)
    }

    /// Cast a stake-weighted vote; passes early once the threshold holds
    pub fn cast_veto_vote(ctx: Context<CastVetoVote>, support: bool) -> Result<()> {
        instructions::veto::cast_veto_vote_handler(ctx, support)
    }

    /// Settle an expired veto proposal (permissionless)
    pub fn finalize_veto(ctx: Context<FinalizeVeto>) -> Result<()> {
        instructions::veto::finalize_veto_handler(ctx)
    }

    /// Refund a contribution after a veto or cancellation
    pub fn claim_refund(ctx: Context<ClaimRefund>) -> Result<()> {
        instructions::veto::claim_refund_handler(ctx)
    }

    /// Claim a yes-voter's share of the reward pool for a passed veto
    pub fn claim_veto_reward(ctx: Context<ClaimVetoReward>) -> Result<()> {
        instructions::veto::claim_veto_reward_handler(ctx)
    }

    // =========================================================================
    // LIQUIDITY
    // =========================================================================

    /// Withdraw locked liquidity after the lock period
    pub fn withdraw_liquidity(ctx: Context<WithdrawLiquidity>) -> Result<()> {
        instructions::liquidity::withdraw_liquidity_handler(ctx)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

#[error_code]
pub enum LaunchGuardError {
    #[msg("Wallet cap out of range (1-1000 bps)")]
    InvalidWalletCap,

    #[msg("Liquidity lock shorter than 365 days")]
    InsufficientLiquidityLock,

    #[msg("Locked liquidity share below 8000 bps")]
    InsufficientLiquidity,

    #[msg("Price impact or slippage setting out of range")]
    InvalidPriceImpact,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Token name empty or too long")]
    InvalidTokenName,

    #[msg("Token symbol empty or too long")]
    InvalidTokenSymbol,

    #[msg("Total supply must be greater than zero")]
    InvalidTotalSupply,

    #[msg("Target amount must be greater than zero")]
    InvalidTargetAmount,

    #[msg("New configuration must be at least as restrictive")]
    ConfigNotTightened,

    #[msg("Launch is not in the required status")]
    LaunchNotActive,

    #[msg("Signer not authorized for this action")]
    Unauthorized,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    #[msg("Vault account does not match the launch")]
    InvalidVault,

    #[msg("Sell cooldown below the 2700-second floor")]
    InvalidSellCooldown,

    #[msg("Account is not the participation PDA for this trader")]
    InvalidParticipationAccount,

    #[msg("A veto proposal is already live for this launch")]
    CommunityVetoActive,

    #[msg("Veto reason exceeds 200 bytes")]
    ReasonTooLong,

    #[msg("Voting power below the minimum")]
    InsufficientVotingPower,

    #[msg("Veto proposal is not active")]
    VetoNotActive,

    #[msg("Voting period has expired")]
    VotingPeriodExpired,

    #[msg("Voting period has not ended")]
    VotingPeriodNotEnded,

    #[msg("Wallet has already voted on this proposal")]
    AlreadyVoted,

    #[msg("Veto proposal did not pass")]
    VetoNotPassed,

    #[msg("Nothing to claim")]
    NothingToClaim,

    #[msg("Reward already claimed")]
    AlreadyClaimed,

    #[msg("Contribution already refunded")]
    AlreadyRefunded,

    #[msg("Refunds are not available for this launch")]
    RefundNotAvailable,

    #[msg("Liquidity is still locked")]
    LiquidityStillLocked,

    #[msg("Liquidity already withdrawn")]
    AlreadyWithdrawn,

    #[msg("Launch was vetoed or cancelled")]
    LaunchVetoed,

    #[msg("24h cap phase has not passed yet")]
    CapPhaseNotReached,

    #[msg("Wallet is not restricted")]
    WalletNotRestricted,

    #[msg("Restriction cool-off has not passed")]
    RestrictionResetTooEarly,
}

// =============================================================================
// EVENTS
// =============================================================================

#[event]
pub struct LaunchCreated {
    pub launch: Pubkey,
    pub launch_id: u64,
    pub creator: Pubkey,
    pub mint: Pubkey,
    pub total_supply: u64,
    pub target_amount: u64,
}

#[event]
pub struct ConfigTightened {
    pub launch: Pubkey,
    pub mint: Pubkey,
    pub max_wallet_bps_24h: u16,
    pub max_wallet_bps_after: u16,
    pub sell_cooldown_seconds: i64,
}

#[event]
pub struct LaunchCompleted {
    pub launch: Pubkey,
    pub mint: Pubkey,
    pub raised_amount: u64,
    pub locked_liquidity: u64,
    pub unlock_date: i64,
    pub completed_at: i64,
}

#[event]
pub struct LaunchCancelled {
    pub launch: Pubkey,
    pub mint: Pubkey,
    pub raised_amount: u64,
}

#[event]
pub struct ContributionRecorded {
    pub launch: Pubkey,
    pub contributor: Pubkey,
    pub amount: u64,
    pub tokens_allocated: u64,
    pub raised_amount: u64,
}

#[event]
pub struct TradeValidated {
    pub launch: Pubkey,
    pub trader: Pubkey,
    pub amount: u64,
    pub is_sell: bool,
    pub outcome: u8,
    pub reason: u8,
    pub penalty: u64,
}

#[event]
pub struct DumpPenaltyApplied {
    pub launch: Pubkey,
    pub seller: Pubkey,
    pub sell_amount: u64,
    pub penalty: u64,
    pub violation_count: u32,
}

#[event]
pub struct WhaleSellFlagged {
    pub launch: Pubkey,
    pub seller: Pubkey,
    pub amount: u64,
    pub supply_bps_threshold: u64,
}

#[event]
pub struct WalletLimitRefreshed {
    pub launch: Pubkey,
    pub wallet: Pubkey,
    pub max_amount: u64,
}

#[event]
pub struct WalletRestrictionReset {
    pub launch: Pubkey,
    pub wallet: Pubkey,
}

#[event]
pub struct MarketDataUpdated {
    pub launch: Pubkey,
    pub mint: Pubkey,
    pub price: u64,
    pub price_change_24h_bps: i32,
    pub liquidity: u64,
    pub market_cap: u64,
}

#[event]
pub struct CircuitBreakerTripped {
    pub launch: Pubkey,
    pub mint: Pubkey,
    pub reason: u8,
    pub tripped_at: i64,
    pub expires_at: i64,
    pub trip_count: u32,
}

#[event]
pub struct VetoInitiated {
    pub launch: Pubkey,
    pub veto: Pubkey,
    pub initiated_by: Pubkey,
    pub round: u32,
    pub vote_end: i64,
    pub threshold_bps: u16,
}

#[event]
pub struct VetoVoteCast {
    pub veto: Pubkey,
    pub voter: Pubkey,
    pub support: bool,
    pub power: u128,
    pub yes_power: u128,
    pub total_power: u128,
}

#[event]
pub struct VetoFinalized {
    pub launch: Pubkey,
    pub veto: Pubkey,
    pub passed: bool,
    pub yes_power: u128,
    pub no_power: u128,
    pub total_power: u128,
    pub voter_count: u32,
}

#[event]
pub struct VetoRewardClaimed {
    pub launch: Pubkey,
    pub veto: Pubkey,
    pub voter: Pubkey,
    pub amount: u64,
}

#[event]
pub struct ContributionRefunded {
    pub launch: Pubkey,
    pub contributor: Pubkey,
    pub amount: u64,
}

#[event]
pub struct LiquidityWithdrawn {
    pub launch: Pubkey,
    pub lock_owner: Pubkey,
    pub amount: u64,
    pub withdrawn_at: i64,
}
