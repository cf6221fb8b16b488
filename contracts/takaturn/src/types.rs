use soroban_sdk::{contracttype, Address, Vec};

/// Seconds after the fund closes before the owner may sweep unclaimed pools.
pub const SWEEP_GRACE_PERIOD: u64 = 180 * 24 * 60 * 60;

/// Basis-point denominator used by the collateralization policies.
pub const BASIS_POINTS: i128 = 10_000;

/// Lifecycle of the contribution side of a fund.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FundState {
    InitializingFund,            // Collecting collateral, no cycle yet
    AcceptingContributions,      // Contribution window of the current cycle is open
    ChoosingBeneficiary,         // Period closed, settlement in progress
    CycleOngoing,                // Beneficiary credited, waiting for the next cycle
    FundClosedCyclesFinished,    // Every turn has been paid out
    FundClosedEveryoneDefaulted, // A cycle closed with zero payers
}

impl FundState {
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            FundState::FundClosedCyclesFinished | FundState::FundClosedEveryoneDefaulted
        )
    }
}

/// Lifecycle of the collateral side of a fund.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CollateralState {
    AcceptingCollateral,
    CycleOngoing,
    ReleasingCollateral,
    Closed,
}

/// Who may drive the cycle (`close_funding_period`, `start_new_cycle`).
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeeperPolicy {
    Owner,
    Members,
    Anyone,
}

/// How the under-collateralization limit is derived. Both carry a ratio in
/// basis points.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnderCollateralPolicy {
    /// Limit = remaining cycles × contribution × ratio.
    RemainingCycles(u32),
    /// Limit = required USD collateral × ratio.
    MinimumShare(u32),
}

/// Immutable fund parameters, fixed at creation.
///
/// USD-denominated amounts are expressed in the stablecoin's smallest unit.
/// `fixed_collateral` is in the collateral token's smallest unit.
#[contracttype]
#[derive(Clone, Debug)]
pub struct FundConfig {
    pub total_participants: u32,
    pub cycle_time: u64,
    pub contribution_period: u64,
    pub contribution_amount: i128,
    pub collateral_usd: i128,
    pub fixed_collateral: i128,
    pub expulsion_floor_usd: i128,
    pub under_collateral_policy: UnderCollateralPolicy,
    pub keeper: KeeperPolicy,
    pub stable_token: Address,
    pub collateral_token: Address,
    pub price_feed: Address,
}

/// Core fund state.
#[contracttype]
#[derive(Clone, Debug)]
pub struct Fund {
    pub id: u64,
    pub owner: Address,
    pub config: FundConfig,
    pub collateral_decimals: u32,
    pub stable_decimals: u32,
    /// Join order; never shrinks after initiation.
    pub participants: Vec<Address>,
    pub beneficiaries_order: Vec<Address>,
    pub state: FundState,
    pub collateral_state: CollateralState,
    pub current_cycle: u32,
    pub total_cycles: u32,
    pub active_participants: u32,
    pub fund_start: u64,
    pub fund_end: u64,
    pub last_beneficiary: Option<Address>,
    pub graceful_limit: bool,
    pub created_at: u64,
}

/// Per-participant ledger entry of a fund.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Member {
    pub is_collateral_member: bool,
    pub collateral: i128,
    /// Seized collateral credited to this member, claimable.
    pub payment_bank: i128,
    pub has_been_beneficiary: bool,
    /// Stablecoin payout waiting to be withdrawn.
    pub beneficiary_pool: i128,
    /// Last cycle this member paid for, 0 if never.
    pub paid_cycle: u32,
    pub auto_pay: bool,
    pub default_count: u32,
}

impl Member {
    pub fn new(collateral: i128) -> Self {
        Member {
            is_collateral_member: true,
            collateral,
            payment_bank: 0,
            has_been_beneficiary: false,
            beneficiary_pool: 0,
            paid_cycle: 0,
            auto_pay: false,
            default_count: 0,
        }
    }

    pub fn paid_in(&self, cycle: u32) -> bool {
        cycle != 0 && self.paid_cycle == cycle
    }
}

/// Settlement record of a single cycle.
#[contracttype]
#[derive(Clone, Debug)]
pub struct CycleInfo {
    pub cycle_number: u32,
    pub deadline: u64,
    pub pool: i128,
    pub payers: u32,
    pub beneficiary: Option<Address>,
    pub graced: bool,
    pub defaulters: Vec<Address>,
    pub expelled: Vec<Address>,
    pub seized: i128,
    pub reimbursed: i128,
}

/// Storage keys for all contract data.
#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    FundCounter,
    Fund(u64),
    Member(u64, Address),
    Cycle(u64, u32),
    MemberFunds(Address),
    Lock(u64),
}
