use soroban_sdk::{token, Address, Env, Vec};

use crate::admin;
use crate::errors::ContractError;
use crate::rate;
use crate::storage;
use crate::types::{CollateralState, CycleInfo, Fund, FundConfig, FundState};

pub fn create_fund(env: &Env, owner: Address, config: FundConfig) -> Result<u64, ContractError> {
    owner.require_auth();

    validate_config(&config)?;

    let collateral_decimals = token::Client::new(env, &config.collateral_token).decimals();
    let stable_decimals = token::Client::new(env, &config.stable_token).decimals();
    if collateral_decimals > rate::MAX_DECIMALS || stable_decimals > rate::MAX_DECIMALS {
        return Err(ContractError::InvalidConfig);
    }

    let fund_id = storage::get_fund_counter(env) + 1;
    storage::set_fund_counter(env, fund_id);

    let fund = Fund {
        id: fund_id,
        owner: owner.clone(),
        total_cycles: config.total_participants,
        config,
        collateral_decimals,
        stable_decimals,
        participants: Vec::new(env),
        beneficiaries_order: Vec::new(env),
        state: FundState::InitializingFund,
        collateral_state: CollateralState::AcceptingCollateral,
        current_cycle: 0,
        active_participants: 0,
        fund_start: 0,
        fund_end: 0,
        last_beneficiary: None,
        graceful_limit: true,
        created_at: env.ledger().timestamp(),
    };

    storage::set_fund(env, &fund);

    env.events()
        .publish((crate::symbol_short!("fund_new"),), (fund_id, owner));

    Ok(fund_id)
}

fn validate_config(config: &FundConfig) -> Result<(), ContractError> {
    if config.total_participants < 2 {
        return Err(ContractError::InvalidConfig);
    }
    if config.contribution_period == 0 || config.cycle_time <= config.contribution_period {
        return Err(ContractError::InvalidConfig);
    }
    // The whole term must be representable as a ledger timestamp offset
    if config
        .cycle_time
        .checked_mul(config.total_participants as u64)
        .is_none()
    {
        return Err(ContractError::InvalidConfig);
    }
    if config.contribution_amount <= 0 || config.collateral_usd <= 0 {
        return Err(ContractError::InvalidConfig);
    }
    if config.fixed_collateral < 0 || config.expulsion_floor_usd < 0 {
        return Err(ContractError::InvalidConfig);
    }
    if config.stable_token == config.collateral_token {
        return Err(ContractError::InvalidConfig);
    }
    Ok(())
}

/// Leave a fund while it is still collecting collateral; the deposit is
/// refunded in full.
pub fn leave_fund(env: &Env, participant: Address, fund_id: u64) -> Result<i128, ContractError> {
    participant.require_auth();

    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;

    if fund.collateral_state != CollateralState::AcceptingCollateral {
        return Err(ContractError::CollateralNotAccepting);
    }

    let member =
        storage::get_member(env, fund_id, &participant).ok_or(ContractError::NotAParticipant)?;

    let mut remaining = Vec::new(env);
    for p in fund.participants.iter() {
        if p != participant {
            remaining.push_back(p);
        }
    }

    fund.participants = remaining;
    fund.active_participants = fund.active_participants.saturating_sub(1);
    storage::set_fund(env, &fund);
    storage::remove_member(env, fund_id, &participant);
    storage::remove_member_fund(env, &participant, fund_id);

    if member.collateral > 0 {
        let collateral = token::Client::new(env, &fund.config.collateral_token);
        collateral.transfer(
            &env.current_contract_address(),
            &participant,
            &member.collateral,
        );
    }

    env.events()
        .publish((crate::symbol_short!("col_left"),), (fund_id, participant));

    Ok(member.collateral)
}

/// Start the fund once every seat is collateralized. One-shot.
pub fn initiate_fund(env: &Env, owner: Address, fund_id: u64) -> Result<(), ContractError> {
    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    admin::authorize_owner(env, &fund, &owner)?;

    if fund.state != FundState::InitializingFund
        || fund.collateral_state != CollateralState::AcceptingCollateral
    {
        return Err(ContractError::AlreadyInitiated);
    }

    if fund.participants.len() < fund.config.total_participants {
        return Err(ContractError::IncompleteGroup);
    }

    // Payout order follows join order
    fund.beneficiaries_order = fund.participants.clone();
    fund.total_cycles = fund.participants.len();
    fund.fund_start = env.ledger().timestamp();
    fund.current_cycle = 1;
    fund.state = FundState::AcceptingContributions;
    fund.collateral_state = CollateralState::CycleOngoing;

    storage::set_cycle(env, fund_id, &new_cycle(env, &fund)?);
    storage::set_fund(env, &fund);

    env.events()
        .publish((crate::symbol_short!("fund_init"),), fund_id);

    Ok(())
}

/// Empty settlement record for the fund's current cycle.
pub fn new_cycle(env: &Env, fund: &Fund) -> Result<CycleInfo, ContractError> {
    Ok(CycleInfo {
        cycle_number: fund.current_cycle,
        deadline: contribution_deadline(fund)?,
        pool: 0,
        payers: 0,
        beneficiary: None,
        graced: false,
        defaulters: Vec::new(env),
        expelled: Vec::new(env),
        seized: 0,
        reimbursed: 0,
    })
}

pub fn contribution_deadline(fund: &Fund) -> Result<u64, ContractError> {
    cycle_offset(fund, fund.current_cycle.saturating_sub(1))?
        .checked_add(fund.config.contribution_period)
        .ok_or(ContractError::ArithmeticOverflow)
}

pub fn cycle_end(fund: &Fund) -> Result<u64, ContractError> {
    cycle_offset(fund, fund.current_cycle)
}

/// Timestamp at which `cycles` full cycles have elapsed since the start.
fn cycle_offset(fund: &Fund, cycles: u32) -> Result<u64, ContractError> {
    fund.config
        .cycle_time
        .checked_mul(cycles as u64)
        .and_then(|t| t.checked_add(fund.fund_start))
        .ok_or(ContractError::ArithmeticOverflow)
}

pub fn get_fund(env: &Env, fund_id: u64) -> Result<Fund, ContractError> {
    storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)
}

pub fn get_member_funds(env: &Env, member: Address) -> Vec<u64> {
    storage::get_member_funds(env, &member)
}
