use soroban_sdk::{log, token, Address, Env};

use crate::errors::ContractError;
use crate::storage;
use crate::types::{CycleInfo, Fund, FundState};

pub fn pay_contribution(env: &Env, member: Address, fund_id: u64) -> Result<(), ContractError> {
    member.require_auth();
    pay(env, &member, &member, fund_id)
}

/// Pay `participant`'s contribution out of `payer`'s balance.
pub fn pay_contribution_on_behalf_of(
    env: &Env,
    payer: Address,
    fund_id: u64,
    participant: Address,
) -> Result<(), ContractError> {
    payer.require_auth();
    pay(env, &payer, &participant, fund_id)
}

fn pay(
    env: &Env,
    payer: &Address,
    participant: &Address,
    fund_id: u64,
) -> Result<(), ContractError> {
    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;

    if fund.state != FundState::AcceptingContributions {
        return Err(ContractError::NotAcceptingContributions);
    }

    let mut member = match storage::get_member(env, fund_id, participant) {
        Some(m) if m.is_collateral_member => m,
        _ => return Err(ContractError::NotAParticipant),
    };

    if member.paid_in(fund.current_cycle) {
        return Err(ContractError::AlreadyPaid);
    }

    let mut cycle_info = storage::get_cycle(env, fund_id, fund.current_cycle)
        .ok_or(ContractError::NotAcceptingContributions)?;

    member.paid_cycle = fund.current_cycle;
    cycle_info.pool += fund.config.contribution_amount;
    cycle_info.payers += 1;
    storage::set_member(env, fund_id, participant, &member);
    storage::set_cycle(env, fund_id, &cycle_info);

    let stable = token::Client::new(env, &fund.config.stable_token);
    stable.transfer(
        payer,
        &env.current_contract_address(),
        &fund.config.contribution_amount,
    );

    env.events().publish(
        (crate::symbol_short!("contrib"),),
        (fund_id, participant.clone(), fund.config.contribution_amount),
    );

    Ok(())
}

pub fn toggle_auto_pay(env: &Env, member: Address, fund_id: u64) -> Result<bool, ContractError> {
    member.require_auth();

    let mut record = match storage::get_member(env, fund_id, &member) {
        Some(m) if m.is_collateral_member => m,
        _ => return Err(ContractError::NotAParticipant),
    };

    record.auto_pay = !record.auto_pay;
    storage::set_member(env, fund_id, &member, &record);

    Ok(record.auto_pay)
}

/// Pull the contribution of every autopay member who has not paid yet.
/// A member whose allowance or balance falls short, or whose pull fails, is
/// left unpaid and will be treated as a defaulter.
pub fn collect_auto_payments(env: &Env, fund: &Fund, cycle_info: &mut CycleInfo) {
    let stable = token::Client::new(env, &fund.config.stable_token);
    let contract = env.current_contract_address();
    let amount = fund.config.contribution_amount;

    for participant in fund.participants.iter() {
        let mut member = match storage::get_member(env, fund.id, &participant) {
            Some(m) => m,
            None => continue,
        };
        if !member.is_collateral_member || !member.auto_pay || member.paid_in(fund.current_cycle) {
            continue;
        }

        if stable.allowance(&participant, &contract) < amount
            || stable.balance(&participant) < amount
        {
            log!(env, "autopay skipped: insufficient allowance or balance", participant);
            continue;
        }
        if !matches!(
            stable.try_transfer_from(&contract, &participant, &contract, &amount),
            Ok(Ok(()))
        ) {
            log!(env, "autopay pull failed", participant);
            continue;
        }

        member.paid_cycle = fund.current_cycle;
        cycle_info.pool += amount;
        cycle_info.payers += 1;
        storage::set_member(env, fund.id, &participant, &member);

        env.events().publish(
            (crate::symbol_short!("autopay"),),
            (fund.id, participant, amount),
        );
    }
}

pub fn has_contributed(env: &Env, member: Address, fund_id: u64) -> Result<bool, ContractError> {
    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    let record =
        storage::get_member(env, fund_id, &member).ok_or(ContractError::NotAParticipant)?;
    Ok(record.paid_in(fund.current_cycle))
}
