use soroban_sdk::Env;

use crate::errors::ContractError;
use crate::storage;

/// Scoped lock over the payout operations of one fund. Held for the whole
/// operation and released on drop.
pub struct ReentrancyGuard<'a> {
    env: &'a Env,
    fund_id: u64,
}

impl<'a> ReentrancyGuard<'a> {
    pub fn acquire(env: &'a Env, fund_id: u64) -> Result<Self, ContractError> {
        if storage::is_locked(env, fund_id) {
            return Err(ContractError::Reentrancy);
        }
        storage::set_lock(env, fund_id);
        Ok(ReentrancyGuard { env, fund_id })
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        storage::clear_lock(self.env, self.fund_id);
    }
}
