/**
 * Token Launch State
 *
 * Launch identity, lifecycle status, and the anti-pump configuration
 * that every trade gate reads from.
 */

use anchor_lang::prelude::*;

use crate::{
    LaunchGuardError, BPS_DENOMINATOR, MAX_WALLET_CAP_BPS, MIN_LIQUIDITY_BPS,
    MIN_LIQUIDITY_LOCK_DAYS, MIN_SELL_COOLDOWN_SECONDS, WALLET_CAP_PHASE_SECONDS,
};

/// Launch lifecycle status
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum LaunchStatus {
    /// Created but not yet open for contributions
    Pending = 0,
    /// Raising contributions, veto-able
    Active = 1,
    /// Completed successfully, trading enabled
    Successful = 2,
    /// Raise failed
    Failed = 3,
    /// Cancelled by the launch authority (terminal)
    Cancelled = 4,
    /// Cancelled by community veto (terminal)
    Vetoed = 5,
}

impl LaunchStatus {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Pending),
            1 => Some(Self::Active),
            2 => Some(Self::Successful),
            3 => Some(Self::Failed),
            4 => Some(Self::Cancelled),
            5 => Some(Self::Vetoed),
            _ => None,
        }
    }

    /// Terminal statuses admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Vetoed)
    }
}

/// Anti-pump and dump protection settings, fixed-point in basis points.
/// Set at launch creation; afterwards may only be tightened.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct AntiPumpConfig {
    /// Wallet cap during the first 24h after completion (bps of supply)
    pub max_wallet_bps_24h: u16,

    /// Wallet cap after the first 24h (bps of supply)
    pub max_wallet_bps_after: u16,

    /// Seconds after completion before trading opens
    pub trading_delay_seconds: i64,

    /// Minimum slots between two trades from one wallet (anti-bot)
    pub min_slots_between_tx: u64,

    /// Liquidity lock duration in days (365 minimum)
    pub liquidity_lock_days: u32,

    /// Share of the raise that must be locked as liquidity (bps, 8000 minimum)
    pub min_liquidity_bps: u16,

    /// Maximum trade size relative to liquidity (bps)
    pub max_price_impact_bps: u16,

    /// Maximum slippage tolerance (bps)
    pub max_slippage_bps: u16,

    /// Cooldown between sells from one wallet (seconds)
    pub sell_cooldown_seconds: i64,

    /// Vesting-based gradual release for original allocations
    pub gradual_release_enabled: bool,
}

impl AntiPumpConfig {
    pub const LEN: usize = 2 + 2 + 8 + 8 + 4 + 2 + 2 + 2 + 8 + 1;

    /// Validate parameters at launch/update time.
    /// Invalid configs are rejected and never persisted.
    pub fn validate(&self) -> Result<()> {
        require!(
            self.max_wallet_bps_24h > 0 && self.max_wallet_bps_24h <= MAX_WALLET_CAP_BPS,
            LaunchGuardError::InvalidWalletCap
        );
        require!(
            self.max_wallet_bps_after > 0 && self.max_wallet_bps_after <= MAX_WALLET_CAP_BPS,
            LaunchGuardError::InvalidWalletCap
        );
        require!(
            self.liquidity_lock_days >= MIN_LIQUIDITY_LOCK_DAYS,
            LaunchGuardError::InsufficientLiquidityLock
        );
        require!(
            self.min_liquidity_bps >= MIN_LIQUIDITY_BPS
                && self.min_liquidity_bps <= BPS_DENOMINATOR as u16,
            LaunchGuardError::InsufficientLiquidity
        );
        require!(
            self.max_price_impact_bps > 0
                && self.max_price_impact_bps <= BPS_DENOMINATOR as u16,
            LaunchGuardError::InvalidPriceImpact
        );
        require!(
            self.max_slippage_bps <= BPS_DENOMINATOR as u16,
            LaunchGuardError::InvalidPriceImpact
        );
        require!(self.trading_delay_seconds >= 0, LaunchGuardError::InvalidAmount);
        // The floor keeps sells spaced so the per-wallet sell history
        // always covers the full dump window
        require!(
            self.sell_cooldown_seconds >= MIN_SELL_COOLDOWN_SECONDS,
            LaunchGuardError::InvalidSellCooldown
        );
        Ok(())
    }

    /// Monotonic restriction invariant: every field of `new` must be at
    /// least as restrictive as in `self`.
    pub fn is_tightened_by(&self, new: &AntiPumpConfig) -> bool {
        new.max_wallet_bps_24h <= self.max_wallet_bps_24h
            && new.max_wallet_bps_after <= self.max_wallet_bps_after
            && new.trading_delay_seconds >= self.trading_delay_seconds
            && new.min_slots_between_tx >= self.min_slots_between_tx
            && new.liquidity_lock_days >= self.liquidity_lock_days
            && new.min_liquidity_bps >= self.min_liquidity_bps
            && new.max_price_impact_bps <= self.max_price_impact_bps
            && new.max_slippage_bps <= self.max_slippage_bps
            && new.sell_cooldown_seconds >= self.sell_cooldown_seconds
            && (new.gradual_release_enabled || !self.gradual_release_enabled)
    }
}

/// Token launch account
#[account]
pub struct TokenLaunch {
    /// Platform-assigned launch id
    pub launch_id: u64,

    /// Creator of the launch
    pub creator: Pubkey,

    /// Launchpad authority (sale layer) allowed to record contributions,
    /// complete or cancel the launch, and feed market data
    pub authority: Pubkey,

    /// Mint of the launched token
    pub mint: Pubkey,

    /// Platform governance mint used for veto stake and voting power
    pub governance_mint: Pubkey,

    /// Token name (max 32 bytes)
    pub name: String,

    /// Token symbol (max 12 bytes)
    pub symbol: String,

    /// Total token supply (raw units)
    pub total_supply: u64,

    /// Raise target in governance-mint units
    pub target_amount: u64,

    /// Raised so far
    pub raised_amount: u64,

    /// Escrow vault holding raised contributions (governance mint)
    pub escrow_vault: Pubkey,

    /// Vault funding veto rewards (governance mint)
    pub reward_vault: Pubkey,

    /// Vault collecting dump penalties (launch mint)
    pub penalty_vault: Pubkey,

    /// Creator's pincode, used for regional voting weight
    pub creator_pincode: [u8; 6],

    /// Current status (LaunchStatus)
    pub status: u8,

    /// Anti-pump protection settings
    pub config: AntiPumpConfig,

    /// Number of distinct contributors
    pub participant_count: u32,

    /// Timestamp of creation
    pub created_at: i64,

    /// Timestamp of successful completion (0 until completed)
    pub completed_at: i64,

    /// Timestamp the launch was vetoed (0 otherwise)
    pub vetoed_at: i64,

    /// Currently active veto proposal (default pubkey when none)
    pub active_veto: Pubkey,

    /// Number of veto proposals ever opened against this launch
    pub veto_round: u32,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 64],
}

impl TokenLaunch {
    pub const MAX_NAME_LEN: usize = 32;
    pub const MAX_SYMBOL_LEN: usize = 12;

    pub const LEN: usize = 8 + // discriminator
        8 +  // launch_id
        32 + // creator
        32 + // authority
        32 + // mint
        32 + // governance_mint
        4 + Self::MAX_NAME_LEN +   // name
        4 + Self::MAX_SYMBOL_LEN + // symbol
        8 +  // total_supply
        8 +  // target_amount
        8 +  // raised_amount
        32 + // escrow_vault
        32 + // reward_vault
        32 + // penalty_vault
        6 +  // creator_pincode
        1 +  // status
        AntiPumpConfig::LEN +
        4 +  // participant_count
        8 +  // created_at
        8 +  // completed_at
        8 +  // vetoed_at
        32 + // active_veto
        4 +  // veto_round
        1 +  // bump
        64;  // reserved

    pub fn status(&self) -> LaunchStatus {
        LaunchStatus::from_u8(self.status).unwrap_or(LaunchStatus::Failed)
    }

    /// Wallet cap in effect at `now`: the first-24h cap applies until the
    /// launch has been completed for a full day, the relaxed cap after.
    pub fn current_wallet_cap_bps(&self, now: i64) -> u16 {
        if self.completed_at == 0 {
            return self.config.max_wallet_bps_24h;
        }
        if now - self.completed_at < WALLET_CAP_PHASE_SECONDS {
            self.config.max_wallet_bps_24h
        } else {
            self.config.max_wallet_bps_after
        }
    }

    /// Maximum holding for one wallet at `now`, in raw token units
    pub fn max_wallet_amount(&self, now: i64) -> u64 {
        let cap = self.current_wallet_cap_bps(now) as u128;
        (self.total_supply as u128 * cap / BPS_DENOMINATOR as u128) as u64
    }

    /// Trading is open once the launch completed and the trading delay passed
    pub fn trading_open(&self, now: i64) -> bool {
        self.status() == LaunchStatus::Successful
            && self.completed_at > 0
            && now >= self.completed_at + self.config.trading_delay_seconds
    }

    /// Fraction of total supply, in raw units, for threshold checks
    pub fn supply_fraction_bps(&self, bps: u64) -> u64 {
        (self.total_supply as u128 * bps as u128 / BPS_DENOMINATOR as u128) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AntiPumpConfig {
        AntiPumpConfig {
            max_wallet_bps_24h: 500,
            max_wallet_bps_after: 1000,
            trading_delay_seconds: 0,
            min_slots_between_tx: 2,
            liquidity_lock_days: 365,
            min_liquidity_bps: 8000,
            max_price_impact_bps: 1000,
            max_slippage_bps: 500,
            sell_cooldown_seconds: 3600,
            gradual_release_enabled: true,
        }
    }

    fn launch_with(config: AntiPumpConfig, total_supply: u64, completed_at: i64) -> TokenLaunch {
        TokenLaunch {
            launch_id: 1,
            creator: Pubkey::default(),
            authority: Pubkey::default(),
            mint: Pubkey::default(),
            governance_mint: Pubkey::default(),
            name: "test".to_string(),
            symbol: "TST".to_string(),
            total_supply,
            target_amount: 1_000_000,
            raised_amount: 0,
            escrow_vault: Pubkey::default(),
            reward_vault: Pubkey::default(),
            penalty_vault: Pubkey::default(),
            creator_pincode: *b"110001",
            status: LaunchStatus::Successful as u8,
            config,
            participant_count: 0,
            created_at: 0,
            completed_at,
            vetoed_at: 0,
            active_veto: Pubkey::default(),
            veto_round: 0,
            bump: 255,
            reserved: [0; 64],
        }
    }

    #[test]
    fn config_rejects_cap_above_ten_percent() {
        let mut config = base_config();
        config.max_wallet_bps_24h = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_short_liquidity_lock() {
        let mut config = base_config();
        config.liquidity_lock_days = 364;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_low_liquidity_share() {
        let mut config = base_config();
        config.min_liquidity_bps = 7999;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_sub_floor_sell_cooldown() {
        let mut config = base_config();
        config.sell_cooldown_seconds = MIN_SELL_COOLDOWN_SECONDS - 1;
        assert!(config.validate().is_err());

        config.sell_cooldown_seconds = MIN_SELL_COOLDOWN_SECONDS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_accepts_defaults() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn tighten_only_allows_restrictive_moves() {
        let old = base_config();

        let mut tighter = old;
        tighter.max_wallet_bps_24h = 300;
        tighter.sell_cooldown_seconds = 7200;
        assert!(old.is_tightened_by(&tighter));

        let mut looser = old;
        looser.max_wallet_bps_after = 1001;
        assert!(!old.is_tightened_by(&looser));

        let mut disabled_vesting = old;
        disabled_vesting.gradual_release_enabled = false;
        assert!(!old.is_tightened_by(&disabled_vesting));
    }

    #[test]
    fn wallet_cap_phase_transition_at_24h() {
        let completed = 1_000_000;
        let launch = launch_with(base_config(), 1_000_000, completed);

        let just_before = completed + WALLET_CAP_PHASE_SECONDS - 1;
        let at_boundary = completed + WALLET_CAP_PHASE_SECONDS;

        assert_eq!(launch.current_wallet_cap_bps(just_before), 500);
        assert_eq!(launch.current_wallet_cap_bps(at_boundary), 1000);
        assert_eq!(launch.max_wallet_amount(just_before), 50_000);
        assert_eq!(launch.max_wallet_amount(at_boundary), 100_000);
    }

    #[test]
    fn uncompleted_launch_uses_first_day_cap() {
        let launch = launch_with(base_config(), 1_000_000, 0);
        assert_eq!(launch.current_wallet_cap_bps(i64::MAX), 500);
    }

    #[test]
    fn trading_waits_for_delay() {
        let mut config = base_config();
        config.trading_delay_seconds = 600;
        let launch = launch_with(config, 1_000_000, 5_000);

        assert!(!launch.trading_open(5_599));
        assert!(launch.trading_open(5_600));
    }
}
