use soroban_sdk::{Address, Env, Vec};

use crate::admin;
use crate::collateral;
use crate::contribution;
use crate::errors::ContractError;
use crate::fund;
use crate::order;
use crate::rate;
use crate::storage;
use crate::types::{Fund, FundState};

/// Close the current contribution window and settle the cycle: run autopay,
/// pick the beneficiary, seize from defaulters and expel those who can no
/// longer cover their obligations.
pub fn close_funding_period(
    env: &Env,
    caller: Address,
    fund_id: u64,
) -> Result<(), ContractError> {
    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    admin::authorize_keeper(env, &fund, &caller)?;

    if fund.state != FundState::AcceptingContributions {
        return Err(ContractError::NotAcceptingContributions);
    }
    if env.ledger().timestamp() < fund::contribution_deadline(&fund)? {
        return Err(ContractError::TooEarly);
    }

    fund.state = FundState::ChoosingBeneficiary;

    let mut cycle_info = storage::get_cycle(env, fund_id, fund.current_cycle)
        .ok_or(ContractError::NotAcceptingContributions)?;

    contribution::collect_auto_payments(env, &fund, &mut cycle_info);

    let mut payers: u32 = 0;
    let mut defaulters = Vec::new(env);
    for participant in fund.participants.iter() {
        if let Some(member) = storage::get_member(env, fund_id, &participant) {
            if !member.is_collateral_member {
                continue;
            }
            if member.paid_in(fund.current_cycle) {
                payers += 1;
            } else {
                defaulters.push_back(participant);
            }
        }
    }
    cycle_info.defaulters = defaulters.clone();

    if payers == 0 {
        fund.state = FundState::FundClosedEveryoneDefaulted;
        close(env, &mut fund);
        storage::set_cycle(env, fund_id, &cycle_info);
        storage::set_fund(env, &fund);

        env.events()
            .publish((crate::symbol_short!("all_dflt"),), (fund_id, fund.current_cycle));
        return Ok(());
    }

    let current_cycle = fund.current_cycle;
    let selection = order::select_beneficiary(
        env,
        &fund.beneficiaries_order,
        |p: &Address| {
            storage::get_member(env, fund_id, p)
                .map(|m| m.is_collateral_member && !m.has_been_beneficiary)
                .unwrap_or(false)
        },
        |p: &Address| {
            storage::get_member(env, fund_id, p)
                .map(|m| m.paid_in(current_cycle))
                .unwrap_or(false)
        },
    );

    let selection = match selection {
        Some(s) => s,
        None => {
            // Every remaining seat has already been paid out
            fund.state = FundState::FundClosedCyclesFinished;
            close(env, &mut fund);
            storage::set_cycle(env, fund_id, &cycle_info);
            storage::set_fund(env, &fund);

            env.events()
                .publish((crate::symbol_short!("fund_cls"),), (fund_id, fund.current_cycle));
            return Ok(());
        }
    };

    fund.beneficiaries_order = selection.order;
    let beneficiary = selection.beneficiary;

    let mut ben_member = storage::get_member(env, fund_id, &beneficiary)
        .ok_or(ContractError::NotAParticipant)?;
    ben_member.has_been_beneficiary = true;
    ben_member.beneficiary_pool += cycle_info.pool;

    if !defaulters.is_empty() {
        let price = rate::get_rate(env, &fund)?;
        collateral::settle_defaulters(
            env,
            &mut fund,
            &mut cycle_info,
            &beneficiary,
            &mut ben_member,
            &defaulters,
            price,
        )?;
    }
    storage::set_member(env, fund_id, &beneficiary, &ben_member);

    cycle_info.beneficiary = Some(beneficiary.clone());
    cycle_info.graced = selection.graced;
    fund.last_beneficiary = Some(beneficiary.clone());

    env.events().publish(
        (crate::symbol_short!("ben_sel"),),
        (fund_id, fund.current_cycle, beneficiary, selection.graced),
    );

    if fund.current_cycle >= fund.total_cycles {
        fund.state = FundState::FundClosedCyclesFinished;
        close(env, &mut fund);
        env.events()
            .publish((crate::symbol_short!("fund_cls"),), (fund_id, fund.current_cycle));
    } else {
        fund.state = FundState::CycleOngoing;
    }

    storage::set_cycle(env, fund_id, &cycle_info);
    storage::set_fund(env, &fund);

    Ok(())
}

/// Open the next cycle's contribution window once the current cycle has run
/// its full length.
pub fn start_new_cycle(env: &Env, caller: Address, fund_id: u64) -> Result<u32, ContractError> {
    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    admin::authorize_keeper(env, &fund, &caller)?;

    match fund.state {
        FundState::CycleOngoing => {}
        FundState::AcceptingContributions | FundState::ChoosingBeneficiary => {
            return Err(ContractError::FundingStillOpen)
        }
        FundState::InitializingFund => return Err(ContractError::TooEarly),
        FundState::FundClosedCyclesFinished | FundState::FundClosedEveryoneDefaulted => {
            return Err(ContractError::FundClosed)
        }
    }

    if env.ledger().timestamp() < fund::cycle_end(&fund)? {
        return Err(ContractError::CycleNotElapsed);
    }

    fund.current_cycle += 1;
    fund.state = FundState::AcceptingContributions;

    storage::set_cycle(env, fund_id, &fund::new_cycle(env, &fund)?);
    storage::set_fund(env, &fund);

    env.events()
        .publish((crate::symbol_short!("cyc_new"),), (fund_id, fund.current_cycle));

    Ok(fund.current_cycle)
}

fn close(env: &Env, fund: &mut Fund) {
    fund.fund_end = env.ledger().timestamp();
    collateral::release(fund);
}

pub fn get_remaining_cycle_time(env: &Env, fund_id: u64) -> Result<u64, ContractError> {
    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    if fund.current_cycle == 0 {
        return Ok(0);
    }
    Ok(fund::cycle_end(&fund)?.saturating_sub(env.ledger().timestamp()))
}

pub fn get_remaining_contribution_time(env: &Env, fund_id: u64) -> Result<u64, ContractError> {
    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    if fund.current_cycle == 0 {
        return Ok(0);
    }
    Ok(fund::contribution_deadline(&fund)?.saturating_sub(env.ledger().timestamp()))
}
