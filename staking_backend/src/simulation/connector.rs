//! Wallet connection capability.
//!
//! A connector only decides *which* seeded wallet a session binds to. The
//! randomness or identity it needs is gathered by the canister layer and
//! handed in, so selection itself stays deterministic and testable.

use candid::Principal;
use sha2::{Digest, Sha256};

use crate::types::{Wallet, WalletId};

pub trait WalletConnector {
    fn name(&self) -> &'static str;

    fn select(&self, wallets: &[Wallet]) -> Result<WalletId, String>;
}

/// Map a SHA-256 digest onto an index in `0..len`.
fn index_from_digest(digest: &[u8], len: usize) -> Result<usize, String> {
    if len == 0 {
        return Err("No wallets available to connect".to_string());
    }
    let head: [u8; 8] = digest
        .get(0..8)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| "Digest too short".to_string())?;
    Ok((u64::from_be_bytes(head) % len as u64) as usize)
}

fn pick(wallets: &[Wallet], digest: &[u8]) -> Result<WalletId, String> {
    let idx = index_from_digest(digest, wallets.len())?;
    Ok(wallets[idx].id.clone())
}

// =============================================================================
// DEMO CONNECTOR
// =============================================================================

/// Picks any seeded wallet from VRF bytes (`raw_rand`).
pub struct RandomDemoConnector {
    entropy: Vec<u8>,
}

impl RandomDemoConnector {
    pub fn new(entropy: Vec<u8>) -> Result<Self, String> {
        if entropy.is_empty() {
            return Err("Randomness unavailable".to_string());
        }
        Ok(Self { entropy })
    }

    fn digest(&self) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(&self.entropy);
        hasher.finalize().to_vec()
    }

    /// hex(sha256(entropy)), returned to the caller so the pick can be re-derived
    pub fn selection_proof(&self) -> String {
        hex::encode(self.digest())
    }
}

impl WalletConnector for RandomDemoConnector {
    fn name(&self) -> &'static str {
        "random-demo"
    }

    fn select(&self, wallets: &[Wallet]) -> Result<WalletId, String> {
        pick(wallets, &self.digest())
    }
}

// =============================================================================
// CALLER-BOUND CONNECTOR
// =============================================================================

/// Binds the authenticated caller to a stable wallet choice.
pub struct PrincipalConnector {
    principal: Principal,
}

impl PrincipalConnector {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }
}

impl WalletConnector for PrincipalConnector {
    fn name(&self) -> &'static str {
        "caller-bound"
    }

    fn select(&self, wallets: &[Wallet]) -> Result<WalletId, String> {
        let mut hasher = Sha256::new();
        hasher.update(b"staking-wallet-binding");
        hasher.update(self.principal.as_slice());
        pick(wallets, &hasher.finalize())
    }
}
