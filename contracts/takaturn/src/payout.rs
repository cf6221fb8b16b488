use soroban_sdk::{token, Address, Env, Vec};

use crate::admin;
use crate::errors::ContractError;
use crate::guard::ReentrancyGuard;
use crate::storage;
use crate::types::{CycleInfo, Fund, Member, SWEEP_GRACE_PERIOD};

/// Pay out the caller's beneficiary pool together with any collateral seized
/// on their behalf.
///
/// While the fund is running the beneficiary must be an active member who has
/// paid the current cycle; a graced defaulter therefore waits until they pay
/// the following cycle. Once the fund has closed anyone with a balance may
/// withdraw.
pub fn withdraw_fund(
    env: &Env,
    participant: Address,
    fund_id: u64,
) -> Result<(i128, i128), ContractError> {
    participant.require_auth();
    let _guard = ReentrancyGuard::acquire(env, fund_id)?;

    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    let mut member =
        storage::get_member(env, fund_id, &participant).ok_or(ContractError::NotAParticipant)?;

    if !member.has_been_beneficiary {
        return Err(ContractError::NotBeneficiary);
    }
    if member.beneficiary_pool <= 0 && member.payment_bank <= 0 {
        return Err(ContractError::AlreadyWithdrawn);
    }

    check_hold(&fund, &member)?;

    let pool = member.beneficiary_pool;
    let reimbursement = member.payment_bank;
    member.beneficiary_pool = 0;
    member.payment_bank = 0;
    storage::set_member(env, fund_id, &participant, &member);

    let contract = env.current_contract_address();
    if pool > 0 {
        token::Client::new(env, &fund.config.stable_token).transfer(&contract, &participant, &pool);
    }
    if reimbursement > 0 {
        token::Client::new(env, &fund.config.collateral_token).transfer(
            &contract,
            &participant,
            &reimbursement,
        );
    }

    env.events().publish(
        (crate::symbol_short!("fund_wdr"),),
        (fund_id, participant, pool, reimbursement),
    );

    Ok((pool, reimbursement))
}

/// A beneficiary's payouts stay escrowed while the fund runs unless they
/// are still an active member who paid the current cycle.
pub fn check_hold(fund: &Fund, member: &Member) -> Result<(), ContractError> {
    if fund.state.is_closed() || !member.has_been_beneficiary {
        return Ok(());
    }
    if !member.is_collateral_member {
        return Err(ContractError::MemberExpelled);
    }
    if !member.paid_in(fund.current_cycle) {
        return Err(ContractError::GracePeriodActive);
    }
    Ok(())
}

/// Sweep every unclaimed stablecoin pool to the owner. Only after the term has
/// ended and the grace window has passed.
pub fn empty_fund_after_end(env: &Env, owner: Address, fund_id: u64) -> Result<i128, ContractError> {
    let _guard = ReentrancyGuard::acquire(env, fund_id)?;

    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    admin::authorize_owner(env, &fund, &owner)?;

    if !fund.state.is_closed() {
        return Err(ContractError::TermNotEnded);
    }
    if env.ledger().timestamp() < fund.fund_end + SWEEP_GRACE_PERIOD {
        return Err(ContractError::TooEarly);
    }

    let mut swept: i128 = 0;
    for participant in fund.participants.iter() {
        if let Some(mut member) = storage::get_member(env, fund_id, &participant) {
            if member.beneficiary_pool > 0 {
                swept += member.beneficiary_pool;
                member.beneficiary_pool = 0;
                storage::set_member(env, fund_id, &participant, &member);
            }
        }
    }

    // Cycles settled without a beneficiary leave their pool unassigned
    for n in 1..=fund.current_cycle {
        if let Some(mut cycle_info) = storage::get_cycle(env, fund_id, n) {
            if cycle_info.beneficiary.is_none() && cycle_info.pool > 0 {
                swept += cycle_info.pool;
                cycle_info.pool = 0;
                storage::set_cycle(env, fund_id, &cycle_info);
            }
        }
    }

    if swept > 0 {
        token::Client::new(env, &fund.config.stable_token).transfer(
            &env.current_contract_address(),
            &owner,
            &swept,
        );
    }

    env.events()
        .publish((crate::symbol_short!("swept"),), (fund_id, owner, swept));

    Ok(swept)
}

pub fn get_beneficiaries_order(env: &Env, fund_id: u64) -> Result<Vec<Address>, ContractError> {
    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    Ok(fund.beneficiaries_order)
}

pub fn is_beneficiary(env: &Env, fund_id: u64, participant: Address) -> Result<bool, ContractError> {
    storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    Ok(storage::get_member(env, fund_id, &participant)
        .map(|m| m.has_been_beneficiary)
        .unwrap_or(false))
}

pub fn get_cycle(env: &Env, fund_id: u64, cycle: u32) -> Result<CycleInfo, ContractError> {
    storage::get_cycle(env, fund_id, cycle).ok_or(ContractError::FundNotFound)
}
