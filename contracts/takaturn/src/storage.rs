use soroban_sdk::{Address, Env, Vec};

use crate::types::{CycleInfo, DataKey, Fund, Member};

const INSTANCE_TTL_THRESHOLD: u32 = 100;
const INSTANCE_TTL_EXTEND: u32 = 500;
const PERSISTENT_TTL_THRESHOLD: u32 = 100;
const PERSISTENT_TTL_EXTEND: u32 = 1000;

// --- Admin ---

pub fn get_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::Admin)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
    extend_instance_ttl(env);
}

pub fn has_admin(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Admin)
}

// --- Fund Counter ---

pub fn get_fund_counter(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::FundCounter)
        .unwrap_or(0)
}

pub fn set_fund_counter(env: &Env, counter: u64) {
    env.storage()
        .instance()
        .set(&DataKey::FundCounter, &counter);
    extend_instance_ttl(env);
}

// --- Fund ---

pub fn get_fund(env: &Env, fund_id: u64) -> Option<Fund> {
    let key = DataKey::Fund(fund_id);
    let result = env.storage().persistent().get(&key);
    if result.is_some() {
        extend_persistent_ttl(env, &key);
    }
    result
}

pub fn set_fund(env: &Env, fund: &Fund) {
    let key = DataKey::Fund(fund.id);
    env.storage().persistent().set(&key, fund);
    extend_persistent_ttl(env, &key);
}

// --- Member ---

pub fn get_member(env: &Env, fund_id: u64, participant: &Address) -> Option<Member> {
    let key = DataKey::Member(fund_id, participant.clone());
    let result = env.storage().persistent().get(&key);
    if result.is_some() {
        extend_persistent_ttl(env, &key);
    }
    result
}

pub fn set_member(env: &Env, fund_id: u64, participant: &Address, member: &Member) {
    let key = DataKey::Member(fund_id, participant.clone());
    env.storage().persistent().set(&key, member);
    extend_persistent_ttl(env, &key);
}

pub fn remove_member(env: &Env, fund_id: u64, participant: &Address) {
    let key = DataKey::Member(fund_id, participant.clone());
    env.storage().persistent().remove(&key);
}

// --- Cycle ---

pub fn get_cycle(env: &Env, fund_id: u64, cycle: u32) -> Option<CycleInfo> {
    let key = DataKey::Cycle(fund_id, cycle);
    let result = env.storage().persistent().get(&key);
    if result.is_some() {
        extend_persistent_ttl(env, &key);
    }
    result
}

pub fn set_cycle(env: &Env, fund_id: u64, cycle_info: &CycleInfo) {
    let key = DataKey::Cycle(fund_id, cycle_info.cycle_number);
    env.storage().persistent().set(&key, cycle_info);
    extend_persistent_ttl(env, &key);
}

// --- Member Funds ---

pub fn get_member_funds(env: &Env, member: &Address) -> Vec<u64> {
    let key = DataKey::MemberFunds(member.clone());
    env.storage()
        .persistent()
        .get(&key)
        .unwrap_or(Vec::new(env))
}

pub fn add_member_fund(env: &Env, member: &Address, fund_id: u64) {
    let key = DataKey::MemberFunds(member.clone());
    let mut funds = get_member_funds(env, member);
    funds.push_back(fund_id);
    env.storage().persistent().set(&key, &funds);
    extend_persistent_ttl(env, &key);
}

pub fn remove_member_fund(env: &Env, member: &Address, fund_id: u64) {
    let key = DataKey::MemberFunds(member.clone());
    let mut funds = get_member_funds(env, member);
    if let Some(idx) = funds.first_index_of(fund_id) {
        funds.remove(idx);
        env.storage().persistent().set(&key, &funds);
        extend_persistent_ttl(env, &key);
    }
}

// --- Reentrancy lock ---

pub fn is_locked(env: &Env, fund_id: u64) -> bool {
    env.storage().temporary().has(&DataKey::Lock(fund_id))
}

pub fn set_lock(env: &Env, fund_id: u64) {
    env.storage().temporary().set(&DataKey::Lock(fund_id), &true);
}

pub fn clear_lock(env: &Env, fund_id: u64) {
    env.storage().temporary().remove(&DataKey::Lock(fund_id));
}

// --- TTL Management ---

fn extend_instance_ttl(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND);
}

fn extend_persistent_ttl(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND);
}
