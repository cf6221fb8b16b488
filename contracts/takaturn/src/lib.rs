#![no_std]

use soroban_sdk::{contract, contractimpl, symbol_short, Address, Env, Vec};

mod admin;
mod collateral;
mod contribution;
mod cycle;
mod errors;
mod fund;
mod guard;
mod order;
mod payout;
mod rate;
mod storage;
mod types;

pub use errors::ContractError;
pub use rate::{PriceFeed, PriceFeedClient, PRICE_SCALE};
pub use types::*;

#[contract]
pub struct TakaturnContract;

#[contractimpl]
impl TakaturnContract {
    /// Initialize the protocol with a global admin.
    pub fn __constructor(env: Env, admin: Address) {
        if storage::has_admin(&env) {
            panic!("already initialized");
        }
        storage::set_admin(&env, &admin);
    }

    // ─── Fund Lifecycle ─────────────────────────────────────────────

    /// Create a new fund. The caller becomes its owner.
    pub fn create_fund(env: Env, owner: Address, config: FundConfig) -> Result<u64, ContractError> {
        fund::create_fund(&env, owner, config)
    }

    /// Leave a fund that is still collecting collateral.
    pub fn leave_fund(env: Env, participant: Address, fund_id: u64) -> Result<i128, ContractError> {
        fund::leave_fund(&env, participant, fund_id)
    }

    /// Start cycle 1. Owner only, once every seat is taken.
    pub fn initiate_fund(env: Env, owner: Address, fund_id: u64) -> Result<(), ContractError> {
        fund::initiate_fund(&env, owner, fund_id)
    }

    pub fn get_fund(env: Env, fund_id: u64) -> Result<Fund, ContractError> {
        fund::get_fund(&env, fund_id)
    }

    pub fn get_member(env: Env, fund_id: u64, participant: Address) -> Result<Member, ContractError> {
        storage::get_fund(&env, fund_id).ok_or(ContractError::FundNotFound)?;
        storage::get_member(&env, fund_id, &participant).ok_or(ContractError::NotAParticipant)
    }

    /// Get all fund IDs a participant has joined.
    pub fn get_member_funds(env: Env, member: Address) -> Vec<u64> {
        fund::get_member_funds(&env, member)
    }

    // ─── Collateral ─────────────────────────────────────────────────

    /// Join a fund by depositing collateral.
    pub fn deposit_collateral(
        env: Env,
        participant: Address,
        fund_id: u64,
        amount: i128,
    ) -> Result<(), ContractError> {
        collateral::deposit_collateral(&env, participant, fund_id, amount)
    }

    /// Reclaim remaining collateral after the fund has closed.
    pub fn withdraw_collateral(
        env: Env,
        participant: Address,
        fund_id: u64,
    ) -> Result<i128, ContractError> {
        collateral::withdraw_collateral(&env, participant, fund_id)
    }

    /// Claim collateral seized on the caller's behalf.
    pub fn withdraw_reimbursement(
        env: Env,
        participant: Address,
        fund_id: u64,
    ) -> Result<i128, ContractError> {
        collateral::withdraw_reimbursement(&env, participant, fund_id)
    }

    pub fn is_under_collateralized(
        env: Env,
        fund_id: u64,
        participant: Address,
    ) -> Result<bool, ContractError> {
        collateral::is_under_collateralized(&env, fund_id, participant)
    }

    /// Current collateral price as reported by the fund's feed.
    pub fn get_latest_price(env: Env, fund_id: u64) -> Result<i128, ContractError> {
        let fund = fund::get_fund(&env, fund_id)?;
        rate::get_rate(&env, &fund)
    }

    // ─── Contributions ──────────────────────────────────────────────

    /// Pay the current cycle's contribution.
    pub fn pay_contribution(env: Env, member: Address, fund_id: u64) -> Result<(), ContractError> {
        contribution::pay_contribution(&env, member, fund_id)
    }

    /// Pay the current cycle's contribution for another participant.
    pub fn pay_contribution_on_behalf_of(
        env: Env,
        payer: Address,
        fund_id: u64,
        participant: Address,
    ) -> Result<(), ContractError> {
        contribution::pay_contribution_on_behalf_of(&env, payer, fund_id, participant)
    }

    /// Flip autopay. Autopay pulls from an allowance granted to this contract.
    pub fn toggle_auto_pay(env: Env, member: Address, fund_id: u64) -> Result<bool, ContractError> {
        contribution::toggle_auto_pay(&env, member, fund_id)
    }

    /// Whether the participant has paid the current cycle.
    pub fn paid_this_cycle(
        env: Env,
        member: Address,
        fund_id: u64,
    ) -> Result<bool, ContractError> {
        contribution::has_contributed(&env, member, fund_id)
    }

    // ─── Cycles ─────────────────────────────────────────────────────

    /// Settle the current cycle after its contribution deadline.
    pub fn close_funding_period(
        env: Env,
        caller: Address,
        fund_id: u64,
    ) -> Result<(), ContractError> {
        cycle::close_funding_period(&env, caller, fund_id)
    }

    /// Open the next cycle once the current one has elapsed.
    pub fn start_new_cycle(env: Env, caller: Address, fund_id: u64) -> Result<u32, ContractError> {
        cycle::start_new_cycle(&env, caller, fund_id)
    }

    pub fn get_cycle(env: Env, fund_id: u64, cycle: u32) -> Result<CycleInfo, ContractError> {
        payout::get_cycle(&env, fund_id, cycle)
    }

    pub fn get_remaining_cycle_time(env: Env, fund_id: u64) -> Result<u64, ContractError> {
        cycle::get_remaining_cycle_time(&env, fund_id)
    }

    pub fn get_remaining_contribution_time(env: Env, fund_id: u64) -> Result<u64, ContractError> {
        cycle::get_remaining_contribution_time(&env, fund_id)
    }

    // ─── Payouts ────────────────────────────────────────────────────

    /// Withdraw the caller's pool and reimbursement. Returns
    /// `(stable, collateral)` amounts paid.
    pub fn withdraw_fund(
        env: Env,
        participant: Address,
        fund_id: u64,
    ) -> Result<(i128, i128), ContractError> {
        payout::withdraw_fund(&env, participant, fund_id)
    }

    /// Sweep unclaimed pools to the owner after the post-term grace window.
    pub fn empty_fund_after_end(
        env: Env,
        owner: Address,
        fund_id: u64,
    ) -> Result<i128, ContractError> {
        payout::empty_fund_after_end(&env, owner, fund_id)
    }

    pub fn get_beneficiaries_order(env: Env, fund_id: u64) -> Result<Vec<Address>, ContractError> {
        payout::get_beneficiaries_order(&env, fund_id)
    }

    pub fn is_beneficiary(
        env: Env,
        fund_id: u64,
        participant: Address,
    ) -> Result<bool, ContractError> {
        payout::is_beneficiary(&env, fund_id, participant)
    }

    // ─── Admin ──────────────────────────────────────────────────────

    /// Override the collateral state. Owner or protocol admin.
    pub fn set_state_owner(
        env: Env,
        owner: Address,
        fund_id: u64,
        state: CollateralState,
    ) -> Result<(), ContractError> {
        admin::set_state_owner(&env, owner, fund_id, state)
    }

    /// Switch between USD-floor and full-coverage expulsion rules.
    pub fn toggle_graceful_limit(
        env: Env,
        owner: Address,
        fund_id: u64,
    ) -> Result<bool, ContractError> {
        admin::toggle_graceful_limit(&env, owner, fund_id)
    }

    /// Transfer fund ownership.
    pub fn set_fund_owner(
        env: Env,
        current_owner: Address,
        fund_id: u64,
        new_owner: Address,
    ) -> Result<(), ContractError> {
        admin::set_fund_owner(&env, current_owner, fund_id, new_owner)
    }
}
