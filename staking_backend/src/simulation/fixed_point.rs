// Fixed-point amount helpers.
//
// Token balances are u64 in e8s, USD values are e6, rates are basis points.
// Per-wallet math uses u128 intermediates; pool-wide sums use Nat so that
// aggregates over any number of wallets cannot overflow.
use candid::Nat;
use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::types::{BPS_DENOMINATOR, E8S_PER_TOKEN, E6_PER_USD};

pub fn nat_zero() -> Nat {
    Nat::from(0u64)
}

pub fn nat_add(n1: &Nat, n2: &Nat) -> Nat {
    Nat(n1.0.clone() + n2.0.clone())
}

pub fn nat_multiply(n1: &Nat, n2: &Nat) -> Nat {
    Nat(n1.0.clone() * n2.0.clone())
}

// Integer division - ALWAYS ROUNDS DOWN
pub fn nat_divide(numerator: &Nat, denominator: &Nat) -> Option<Nat> {
    if denominator.0 == BigUint::from(0u64) {
        return None;
    }
    Some(Nat(numerator.0.clone() / denominator.0.clone()))
}

// Convert Nat to u64 - returns None if too large
pub fn nat_to_u64(n: &Nat) -> Option<u64> {
    n.0.to_u64()
}

/// Lossy conversion for display values only.
pub fn nat_to_f64(n: &Nat) -> f64 {
    n.0.to_f64().unwrap_or(f64::MAX)
}

/// `amount * bps / 10_000`, rounded down.
pub fn apply_bps(amount: u64, bps: u64) -> u64 {
    let scaled = amount as u128 * bps as u128 / BPS_DENOMINATOR as u128;
    // bps is validated to be <= 10_000, so the result never exceeds `amount`
    scaled.min(u64::MAX as u128) as u64
}

/// Split `amount` into `(moved, remaining)` where `moved = amount * bps / 10_000`
/// rounded down. `moved + remaining == amount` always holds.
pub fn split_bps(amount: u64, bps: u64) -> (u64, u64) {
    let moved = apply_bps(amount, bps).min(amount);
    (moved, amount - moved)
}

pub fn tokens(whole: u64) -> u64 {
    whole.saturating_mul(E8S_PER_TOKEN)
}

/// Token amount as a decimal string with two places (truncated), e.g. `1070.00`.
pub fn format_tokens(amount_e8s: u64) -> String {
    let whole = amount_e8s / E8S_PER_TOKEN;
    let cents = (amount_e8s % E8S_PER_TOKEN) / (E8S_PER_TOKEN / 100);
    format!("{}.{:02}", whole, cents)
}

/// USD e6 value as `$1,234.56` (truncated to cents).
pub fn format_usd(value_e6: &Nat) -> String {
    let cents_unit = Nat::from(E6_PER_USD / 100);
    let cents_total = nat_divide(value_e6, &cents_unit).unwrap_or_else(nat_zero);
    let whole = Nat(cents_total.0.clone() / BigUint::from(100u64));
    let cents = (cents_total.0 % BigUint::from(100u64)).to_u64().unwrap_or(0);

    let digits = whole.0.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}.{:02}", grouped, cents)
}
