use soroban_sdk::{contractclient, Env, I256};

use crate::errors::ContractError;
use crate::types::Fund;

/// Fixed-point scale of the feed's price (18 decimals).
pub const PRICE_SCALE: i128 = 1_000_000_000_000_000_000;

/// Largest token precision the conversions accept.
pub const MAX_DECIMALS: u32 = 18;

/// Price oracle interface: USD value of one whole collateral token,
/// scaled by [`PRICE_SCALE`].
#[contractclient(name = "PriceFeedClient")]
pub trait PriceFeed {
    fn get_latest_price(env: Env) -> i128;
}

/// Current collateral price. A failing, zero or negative feed is fatal for
/// the calling operation.
pub fn get_rate(env: &Env, fund: &Fund) -> Result<i128, ContractError> {
    let feed = PriceFeedClient::new(env, &fund.config.price_feed);
    match feed.try_get_latest_price() {
        Ok(Ok(price)) if price > 0 => Ok(price),
        _ => Err(ContractError::StaleOrInvalidPrice),
    }
}

/// Collateral token units to stablecoin units, rounded down.
pub fn to_usd(env: &Env, fund: &Fund, amount: i128, rate: i128) -> Result<i128, ContractError> {
    collateral_to_usd(env, amount, rate, fund.collateral_decimals, fund.stable_decimals)
}

/// Stablecoin units to collateral token units, rounded down.
pub fn to_native(env: &Env, fund: &Fund, usd: i128, rate: i128) -> Result<i128, ContractError> {
    usd_to_collateral(env, usd, rate, fund.collateral_decimals, fund.stable_decimals)
}

/// `amount * rate * 10^stable / (PRICE_SCALE * 10^collateral)`, with the
/// intermediate product held in 256 bits.
pub fn collateral_to_usd(
    env: &Env,
    amount: i128,
    rate: i128,
    collateral_decimals: u32,
    stable_decimals: u32,
) -> Result<i128, ContractError> {
    let num = I256::from_i128(env, amount)
        .mul(&I256::from_i128(env, rate))
        .mul(&pow10(env, stable_decimals)?);
    let den = I256::from_i128(env, PRICE_SCALE).mul(&pow10(env, collateral_decimals)?);
    num.div(&den).to_i128().ok_or(ContractError::ArithmeticOverflow)
}

/// `usd * PRICE_SCALE * 10^collateral / (rate * 10^stable)`, with the
/// intermediate product held in 256 bits.
pub fn usd_to_collateral(
    env: &Env,
    usd: i128,
    rate: i128,
    collateral_decimals: u32,
    stable_decimals: u32,
) -> Result<i128, ContractError> {
    if rate <= 0 {
        return Err(ContractError::StaleOrInvalidPrice);
    }
    let num = I256::from_i128(env, usd)
        .mul(&I256::from_i128(env, PRICE_SCALE))
        .mul(&pow10(env, collateral_decimals)?);
    let den = I256::from_i128(env, rate).mul(&pow10(env, stable_decimals)?);
    num.div(&den).to_i128().ok_or(ContractError::ArithmeticOverflow)
}

fn pow10(env: &Env, decimals: u32) -> Result<I256, ContractError> {
    if decimals > MAX_DECIMALS {
        return Err(ContractError::ArithmeticOverflow);
    }
    Ok(I256::from_i32(env, 10).pow(decimals))
}
