use soroban_sdk::{token, Address, Env, Vec};

use crate::errors::ContractError;
use crate::guard::ReentrancyGuard;
use crate::payout;
use crate::rate;
use crate::storage;
use crate::types::{
    CollateralState, CycleInfo, Fund, Member, UnderCollateralPolicy, BASIS_POINTS,
};

/// Join a fund by posting collateral. The amount must meet both the native
/// floor and the USD-equivalent minimum at the current rate.
pub fn deposit_collateral(
    env: &Env,
    participant: Address,
    fund_id: u64,
    amount: i128,
) -> Result<(), ContractError> {
    participant.require_auth();

    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;

    if fund.collateral_state != CollateralState::AcceptingCollateral {
        return Err(ContractError::CollateralNotAccepting);
    }
    if storage::get_member(env, fund_id, &participant).is_some() {
        return Err(ContractError::AlreadyMember);
    }
    if fund.participants.len() >= fund.config.total_participants {
        return Err(ContractError::GroupFull);
    }
    if amount <= 0 || amount < fund.config.fixed_collateral {
        return Err(ContractError::InsufficientCollateral);
    }

    let price = rate::get_rate(env, &fund)?;
    if rate::to_usd(env, &fund, amount, price)? < fund.config.collateral_usd {
        return Err(ContractError::InsufficientCollateral);
    }

    storage::set_member(env, fund_id, &participant, &Member::new(amount));
    fund.participants.push_back(participant.clone());
    fund.active_participants += 1;
    storage::set_fund(env, &fund);
    storage::add_member_fund(env, &participant, fund_id);

    let collateral = token::Client::new(env, &fund.config.collateral_token);
    collateral.transfer(&participant, &env.current_contract_address(), &amount);

    env.events().publish(
        (crate::symbol_short!("col_dep"),),
        (fund_id, participant, amount),
    );

    if fund.participants.len() == fund.config.total_participants {
        env.events()
            .publish((crate::symbol_short!("grp_full"),), fund_id);
    }

    Ok(())
}

/// Reclaim the full collateral balance once the fund is releasing collateral.
/// The last withdrawal closes the collateral ledger.
pub fn withdraw_collateral(
    env: &Env,
    participant: Address,
    fund_id: u64,
) -> Result<i128, ContractError> {
    participant.require_auth();
    let _guard = ReentrancyGuard::acquire(env, fund_id)?;

    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;

    if fund.collateral_state != CollateralState::ReleasingCollateral {
        return Err(ContractError::NotReleasingPhase);
    }

    let mut member =
        storage::get_member(env, fund_id, &participant).ok_or(ContractError::NotAParticipant)?;
    let amount = member.collateral;
    if amount <= 0 {
        return Err(ContractError::NoBalance);
    }

    member.collateral = 0;
    storage::set_member(env, fund_id, &participant, &member);

    if all_collateral_released(env, &fund) {
        fund.collateral_state = CollateralState::Closed;
        storage::set_fund(env, &fund);
        env.events()
            .publish((crate::symbol_short!("col_cls"),), fund_id);
    }

    let collateral = token::Client::new(env, &fund.config.collateral_token);
    collateral.transfer(&env.current_contract_address(), &participant, &amount);

    env.events().publish(
        (crate::symbol_short!("col_wdr"),),
        (fund_id, participant, amount),
    );

    Ok(amount)
}

/// Pay out the member's payment bank. Seized collateral credited to a
/// beneficiary is held under the same rules as `withdraw_fund`.
pub fn withdraw_reimbursement(
    env: &Env,
    participant: Address,
    fund_id: u64,
) -> Result<i128, ContractError> {
    participant.require_auth();
    let _guard = ReentrancyGuard::acquire(env, fund_id)?;

    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    let mut member =
        storage::get_member(env, fund_id, &participant).ok_or(ContractError::NotAParticipant)?;

    let amount = member.payment_bank;
    if amount <= 0 {
        return Err(ContractError::NoBalance);
    }
    payout::check_hold(&fund, &member)?;

    member.payment_bank = 0;
    storage::set_member(env, fund_id, &participant, &member);

    let collateral = token::Client::new(env, &fund.config.collateral_token);
    collateral.transfer(&env.current_contract_address(), &participant, &amount);

    env.events().publish(
        (crate::symbol_short!("reimb_wdr"),),
        (fund_id, participant, amount),
    );

    Ok(amount)
}

pub fn is_under_collateralized(
    env: &Env,
    fund_id: u64,
    participant: Address,
) -> Result<bool, ContractError> {
    let fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    let member =
        storage::get_member(env, fund_id, &participant).ok_or(ContractError::NotAParticipant)?;
    let price = rate::get_rate(env, &fund)?;
    under_collateralized(env, &fund, &member, price)
}

fn under_collateralized(
    env: &Env,
    fund: &Fund,
    member: &Member,
    price: i128,
) -> Result<bool, ContractError> {
    let limit = match fund.config.under_collateral_policy {
        UnderCollateralPolicy::RemainingCycles(bps) => {
            let remaining = if fund.current_cycle == 0 {
                fund.total_cycles.max(fund.config.total_participants)
            } else {
                fund.total_cycles.saturating_sub(fund.current_cycle - 1)
            };
            fund.config
                .contribution_amount
                .checked_mul(remaining as i128)
                .and_then(|v| v.checked_mul(bps as i128))
                .ok_or(ContractError::ArithmeticOverflow)?
                / BASIS_POINTS
        }
        UnderCollateralPolicy::MinimumShare(bps) => {
            fund.config
                .collateral_usd
                .checked_mul(bps as i128)
                .ok_or(ContractError::ArithmeticOverflow)?
                / BASIS_POINTS
        }
    };
    Ok(rate::to_usd(env, fund, member.collateral, price)? < limit)
}

/// Seize the missed contribution from every defaulter into the beneficiary's
/// payment bank, then expel those left below the expulsion threshold.
///
/// Seizure is capped at the defaulter's balance; any shortfall is not carried
/// forward.
pub fn settle_defaulters(
    env: &Env,
    fund: &mut Fund,
    cycle: &mut CycleInfo,
    beneficiary: &Address,
    beneficiary_member: &mut Member,
    defaulters: &Vec<Address>,
    price: i128,
) -> Result<(), ContractError> {
    let owed = rate::to_native(env, fund, fund.config.contribution_amount, price)?;

    for defaulter in defaulters.iter() {
        if defaulter == *beneficiary {
            continue;
        }
        let mut member = match storage::get_member(env, fund.id, &defaulter) {
            Some(m) => m,
            None => continue,
        };

        let seized = owed.min(member.collateral).max(0);
        member.collateral -= seized;
        beneficiary_member.payment_bank += seized;
        member.default_count += 1;
        cycle.seized += seized;
        cycle.reimbursed += seized;

        if seized > 0 {
            env.events().publish(
                (crate::symbol_short!("seized"),),
                (fund.id, defaulter.clone(), beneficiary.clone(), seized),
            );
        }

        if should_expel(env, fund, &member, seized == owed, price)? {
            expel(env, fund, cycle, &defaulter, &mut member);
        }
        storage::set_member(env, fund.id, &defaulter, &member);
    }

    Ok(())
}

fn should_expel(
    env: &Env,
    fund: &Fund,
    member: &Member,
    covered_in_full: bool,
    price: i128,
) -> Result<bool, ContractError> {
    if fund.graceful_limit {
        Ok(rate::to_usd(env, fund, member.collateral, price)? < fund.config.expulsion_floor_usd)
    } else {
        Ok(!covered_in_full)
    }
}

/// Remove a member from the fund. Remaining collateral moves to the member's
/// own payment bank. A member who never received a payout also gives up
/// their turn, shortening the term by one cycle.
fn expel(
    env: &Env,
    fund: &mut Fund,
    cycle: &mut CycleInfo,
    participant: &Address,
    member: &mut Member,
) {
    member.is_collateral_member = false;
    member.payment_bank += member.collateral;
    member.collateral = 0;
    member.auto_pay = false;
    fund.active_participants = fund.active_participants.saturating_sub(1);

    if !member.has_been_beneficiary {
        if let Some(idx) = fund.beneficiaries_order.first_index_of(participant) {
            fund.beneficiaries_order.remove(idx);
        }
        fund.total_cycles = fund.total_cycles.saturating_sub(1);
    }

    cycle.expelled.push_back(participant.clone());

    env.events().publish(
        (crate::symbol_short!("expelled"),),
        (fund.id, participant.clone(), fund.total_cycles),
    );
}

/// Close the fund's collateral side for withdrawal.
pub fn release(fund: &mut Fund) {
    if fund.state.is_closed() && fund.collateral_state == CollateralState::CycleOngoing {
        fund.collateral_state = CollateralState::ReleasingCollateral;
    }
}

fn all_collateral_released(env: &Env, fund: &Fund) -> bool {
    fund.participants.iter().all(|p| {
        storage::get_member(env, fund.id, &p)
            .map(|m| m.collateral == 0)
            .unwrap_or(true)
    })
}

