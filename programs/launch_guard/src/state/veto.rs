/**
 * Community Veto State
 *
 * Stake-weighted veto proposal, per-voter vote records, and the pure
 * voting-power function (balance x regional x duration x participation
 * multipliers, bps fixed-point).
 */

use anchor_lang::prelude::*;

use crate::{BPS_DENOMINATOR, MIN_VOTING_POWER, SECONDS_PER_DAY};

/// Veto proposal status
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum VetoStatus {
    Active = 0,
    Passed = 1,
    Failed = 2,
}

impl VetoStatus {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Active),
            1 => Some(Self::Passed),
            2 => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Community veto proposal, one live proposal per launch at a time
#[account]
pub struct CommunityVeto {
    /// Launch being vetoed
    pub launch: Pubkey,

    /// Proposal initiator
    pub initiated_by: Pubkey,

    /// Stated reason (max 200 bytes)
    pub reason: String,

    /// Voting window start
    pub vote_start: i64,

    /// Voting window end
    pub vote_end: i64,

    /// Accumulated yes power
    pub yes_power: u128,

    /// Accumulated no power
    pub no_power: u128,

    /// Total accumulated power
    pub total_power: u128,

    /// Number of votes recorded
    pub voter_count: u32,

    /// Pass threshold in bps of total power
    pub threshold_bps: u16,

    /// Current status (VetoStatus)
    pub status: u8,

    /// When the proposal left the Active state (0 while active)
    pub finalized_at: i64,

    /// Veto round this proposal belongs to (part of the PDA seed)
    pub round: u32,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 32],
}

impl CommunityVeto {
    pub const MAX_REASON_LEN: usize = 200;

    pub const LEN: usize = 8 + // discriminator
        32 + // launch
        32 + // initiated_by
        4 + Self::MAX_REASON_LEN + // reason
        8 +  // vote_start
        8 +  // vote_end
        16 + // yes_power
        16 + // no_power
        16 + // total_power
        4 +  // voter_count
        2 +  // threshold_bps
        1 +  // status
        8 +  // finalized_at
        4 +  // round
        1 +  // bump
        32;  // reserved

    pub fn status(&self) -> VetoStatus {
        VetoStatus::from_u8(self.status).unwrap_or(VetoStatus::Failed)
    }

    /// Threshold predicate. Used identically by the early-termination
    /// path and the expiry finalization path, so both evaluate the same
    /// way for the same (yes, total) pair.
    pub fn threshold_reached(&self) -> bool {
        threshold_reached(self.yes_power, self.total_power, self.threshold_bps)
    }

    /// Fold a vote into the running totals
    pub fn record_vote(&mut self, support: bool, power: u128) {
        if support {
            self.yes_power += power;
        } else {
            self.no_power += power;
        }
        self.total_power += power;
        self.voter_count = self.voter_count.saturating_add(1);
    }

    /// A yes voter's proportional share of `reward_pool`
    pub fn reward_share(&self, reward_pool: u64, voter_power: u128) -> u64 {
        if self.yes_power == 0 {
            return 0;
        }
        ((reward_pool as u128) * voter_power / self.yes_power) as u64
    }
}

/// `yes / total >= threshold`, evaluated in integer arithmetic
pub fn threshold_reached(yes_power: u128, total_power: u128, threshold_bps: u16) -> bool {
    if total_power == 0 {
        return false;
    }
    yes_power * (BPS_DENOMINATOR as u128) >= total_power * (threshold_bps as u128)
}

/// One vote per (proposal, voter); the account's existence is the
/// double-vote proof
#[account]
pub struct VetoVoteRecord {
    /// Proposal voted on
    pub veto: Pubkey,

    /// Voter
    pub voter: Pubkey,

    /// Yes/no
    pub support: bool,

    /// Power carried by this vote
    pub power: u128,

    /// When the vote was cast (0 = slot unused)
    pub voted_at: i64,

    /// Reward already claimed (yes voters on passed proposals)
    pub reward_claimed: bool,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 8],
}

impl VetoVoteRecord {
    pub const LEN: usize = 8 + // discriminator
        32 + // veto
        32 + // voter
        1 +  // support
        16 + // power
        8 +  // voted_at
        1 +  // reward_claimed
        1 +  // bump
        8;   // reserved
}

/// Voter profile feeding the power multipliers
#[account]
pub struct VoterProfile {
    /// Wallet this profile belongs to
    pub voter: Pubkey,

    /// Registered pincode (all zero = unknown)
    pub pincode: [u8; 6],

    /// When the wallet first registered (holding-duration base)
    pub first_held_at: i64,

    /// Prior governance participation count
    pub governance_participation: u32,

    /// Bump seed for PDA
    pub bump: u8,

    /// Reserved for future use
    pub reserved: [u8; 16],
}

impl VoterProfile {
    pub const LEN: usize = 8 + // discriminator
        32 + // voter
        6 +  // pincode
        8 +  // first_held_at
        4 +  // governance_participation
        1 +  // bump
        16;  // reserved
}

const NO_PINCODE: [u8; 6] = [0; 6];

/// Regional multiplier in bps: 1.5x for the creator's pincode, 1.2x for
/// the same region (leading pincode digit), 1.0x otherwise
pub fn regional_multiplier_bps(voter_pincode: &[u8; 6], launch_pincode: &[u8; 6]) -> u64 {
    if *voter_pincode == NO_PINCODE || *launch_pincode == NO_PINCODE {
        return 10_000;
    }
    if voter_pincode == launch_pincode {
        15_000
    } else if voter_pincode[0] == launch_pincode[0] {
        12_000
    } else {
        10_000
    }
}

/// Holding-duration multiplier in bps, tiered up to 2.0x at one year
pub fn duration_multiplier_bps(holding_seconds: i64) -> u64 {
    let days = holding_seconds / SECONDS_PER_DAY;
    match days {
        d if d >= 365 => 20_000,
        d if d >= 180 => 15_000,
        d if d >= 90 => 12_000,
        d if d >= 30 => 11_000,
        _ => 10_000,
    }
}

/// Participation-history multiplier in bps, up to 1.3x
pub fn participation_multiplier_bps(participation_count: u32) -> u64 {
    match participation_count {
        c if c >= 10 => 13_000,
        c if c >= 5 => 12_000,
        c if c >= 1 => 11_000,
        _ => 10_000,
    }
}

/// Pure voting-power function. Returns zero (ineligible) below the
/// minimum-power floor.
pub fn voting_power(
    balance: u64,
    voter_pincode: &[u8; 6],
    launch_pincode: &[u8; 6],
    holding_seconds: i64,
    participation_count: u32,
) -> u128 {
    let regional = regional_multiplier_bps(voter_pincode, launch_pincode) as u128;
    let duration = duration_multiplier_bps(holding_seconds) as u128;
    let participation = participation_multiplier_bps(participation_count) as u128;

    let power = (balance as u128) * regional * duration * participation
        / (BPS_DENOMINATOR as u128).pow(3);

    if power < MIN_VOTING_POWER as u128 {
        0
    } else {
        power
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GOV_UNIT;

    fn veto_with(yes: u128, no: u128, threshold_bps: u16) -> CommunityVeto {
        CommunityVeto {
            launch: Pubkey::default(),
            initiated_by: Pubkey::default(),
            reason: String::new(),
            vote_start: 0,
            vote_end: 1_000,
            yes_power: yes,
            no_power: no,
            total_power: yes + no,
            voter_count: 2,
            threshold_bps,
            status: VetoStatus::Active as u8,
            finalized_at: 0,
            round: 1,
            bump: 255,
            reserved: [0; 32],
        }
    }

    #[test]
    fn threshold_is_deterministic_at_the_boundary() {
        // Scenario: total 100_000, threshold 70%: 71_000 yes passes
        assert!(threshold_reached(71_000, 100_000, 7_000));
        assert!(threshold_reached(70_000, 100_000, 7_000));
        assert!(!threshold_reached(69_999, 100_000, 7_000));
    }

    #[test]
    fn no_votes_never_pass() {
        assert!(!threshold_reached(0, 0, 7_000));
        assert!(!veto_with(0, 0, 7_000).threshold_reached());
    }

    #[test]
    fn early_and_expiry_paths_agree() {
        // same predicate object, same inputs, same answer
        let veto = veto_with(71_000, 29_000, 7_000);
        let early = veto.threshold_reached();
        let at_expiry = threshold_reached(veto.yes_power, veto.total_power, veto.threshold_bps);
        assert!(early);
        assert_eq!(early, at_expiry);
    }

    #[test]
    fn regional_multiplier_tiers() {
        let launch = *b"110001";
        assert_eq!(regional_multiplier_bps(b"110001", &launch), 15_000);
        assert_eq!(regional_multiplier_bps(b"110099", &launch), 12_000);
        assert_eq!(regional_multiplier_bps(b"400001", &launch), 10_000);
        assert_eq!(regional_multiplier_bps(&[0; 6], &launch), 10_000);
    }

    #[test]
    fn duration_multiplier_tiers() {
        assert_eq!(duration_multiplier_bps(0), 10_000);
        assert_eq!(duration_multiplier_bps(29 * SECONDS_PER_DAY), 10_000);
        assert_eq!(duration_multiplier_bps(30 * SECONDS_PER_DAY), 11_000);
        assert_eq!(duration_multiplier_bps(90 * SECONDS_PER_DAY), 12_000);
        assert_eq!(duration_multiplier_bps(180 * SECONDS_PER_DAY), 15_000);
        assert_eq!(duration_multiplier_bps(365 * SECONDS_PER_DAY), 20_000);
    }

    #[test]
    fn participation_multiplier_tiers() {
        assert_eq!(participation_multiplier_bps(0), 10_000);
        assert_eq!(participation_multiplier_bps(1), 11_000);
        assert_eq!(participation_multiplier_bps(5), 12_000);
        assert_eq!(participation_multiplier_bps(10), 13_000);
        assert_eq!(participation_multiplier_bps(100), 13_000);
    }

    #[test]
    fn power_multiplies_all_factors() {
        let launch = *b"110001";
        let balance = 10_000 * GOV_UNIT;

        // 1.5 * 2.0 * 1.3 = 3.9x
        let power = voting_power(balance, b"110001", &launch, 400 * SECONDS_PER_DAY, 12);
        assert_eq!(power, (balance as u128) * 39 / 10);

        // no bonuses at all
        let plain = voting_power(balance, b"400001", &launch, 0, 0);
        assert_eq!(plain, balance as u128);
    }

    #[test]
    fn power_floors_to_zero_below_minimum() {
        let launch = *b"110001";
        // 999 units < 1000-unit floor even though balance is nonzero
        let power = voting_power(999 * GOV_UNIT, b"400001", &launch, 0, 0);
        assert_eq!(power, 0);

        let at_floor = voting_power(1_000 * GOV_UNIT, b"400001", &launch, 0, 0);
        assert_eq!(at_floor, 1_000 * GOV_UNIT as u128);
    }

    #[test]
    fn reward_share_is_proportional_to_power() {
        let veto = veto_with(71_000, 29_000, 7_000);
        // 1% of a 1_000_000 target = 10_000 pool
        assert_eq!(veto.reward_share(10_000, 71_000), 10_000);
        assert_eq!(veto.reward_share(10_000, 35_500), 5_000);
        assert_eq!(veto_with(0, 100, 7_000).reward_share(10_000, 50), 0);
    }
}
