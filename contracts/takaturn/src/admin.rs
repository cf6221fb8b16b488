use soroban_sdk::{Address, Env};

use crate::errors::ContractError;
use crate::storage;
use crate::types::{CollateralState, Fund, KeeperPolicy};

/// The fund owner or the protocol admin.
pub fn authorize_owner(env: &Env, fund: &Fund, caller: &Address) -> Result<(), ContractError> {
    caller.require_auth();

    if *caller == fund.owner {
        return Ok(());
    }
    match storage::get_admin(env) {
        Some(admin) if admin == *caller => Ok(()),
        _ => Err(ContractError::Unauthorized),
    }
}

/// Checks `caller` against the fund's keeper policy for cycle-driving calls.
pub fn authorize_keeper(env: &Env, fund: &Fund, caller: &Address) -> Result<(), ContractError> {
    match fund.config.keeper {
        KeeperPolicy::Owner => authorize_owner(env, fund, caller),
        KeeperPolicy::Members => {
            caller.require_auth();
            if *caller == fund.owner {
                return Ok(());
            }
            match storage::get_member(env, fund.id, caller) {
                Some(m) if m.is_collateral_member => Ok(()),
                _ => Err(ContractError::Unauthorized),
            }
        }
        KeeperPolicy::Anyone => {
            caller.require_auth();
            Ok(())
        }
    }
}

/// Force the collateral state. Test and emergency override.
pub fn set_state_owner(
    env: &Env,
    owner: Address,
    fund_id: u64,
    state: CollateralState,
) -> Result<(), ContractError> {
    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    authorize_owner(env, &fund, &owner)?;

    fund.collateral_state = state;
    storage::set_fund(env, &fund);

    env.events()
        .publish((crate::symbol_short!("state_set"),), (fund_id, state));

    Ok(())
}

pub fn toggle_graceful_limit(
    env: &Env,
    owner: Address,
    fund_id: u64,
) -> Result<bool, ContractError> {
    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;
    authorize_owner(env, &fund, &owner)?;

    fund.graceful_limit = !fund.graceful_limit;
    storage::set_fund(env, &fund);

    env.events().publish(
        (crate::symbol_short!("grace_tg"),),
        (fund_id, fund.graceful_limit),
    );

    Ok(fund.graceful_limit)
}

pub fn set_fund_owner(
    env: &Env,
    current_owner: Address,
    fund_id: u64,
    new_owner: Address,
) -> Result<(), ContractError> {
    current_owner.require_auth();

    let mut fund = storage::get_fund(env, fund_id).ok_or(ContractError::FundNotFound)?;

    if current_owner != fund.owner {
        return Err(ContractError::Unauthorized);
    }

    fund.owner = new_owner.clone();
    storage::set_fund(env, &fund);

    env.events()
        .publish((crate::symbol_short!("own_chng"),), (fund_id, new_owner));

    Ok(())
}
