use candid::Principal;

use crate::runtime;
use crate::simulation::config::StakingConfig;
use crate::simulation::AuditEntry;
use crate::types::Wallet;

const REASONABLE_MAX_LIMIT: u64 = 1_000; // Safety net for paginated queries

fn require_admin() -> Result<Principal, String> {
    let caller = ic_cdk::api::msg_caller();
    if !ic_cdk::api::is_controller(&caller) {
        return Err("Unauthorized: admin only".to_string());
    }
    Ok(caller)
}

pub fn admin_get_all_wallets(offset: u64, limit: u64) -> Result<Vec<Wallet>, String> {
    require_admin()?;
    runtime::with_engine(|e| e.pool().page(offset, limit.min(REASONABLE_MAX_LIMIT)))
}

pub fn admin_get_audit_log(offset: u64, limit: u64) -> Result<Vec<AuditEntry>, String> {
    require_admin()?;
    let limit = limit.min(REASONABLE_MAX_LIMIT) as usize;
    runtime::with_engine(|e| e.audit().page(offset as usize, limit))
}

pub fn admin_check_invariants() -> Result<String, String> {
    require_admin()?;
    runtime::with_engine(|e| e.check_invariants())?
}

pub fn admin_pause_simulation() -> Result<bool, String> {
    let caller = require_admin()?;
    ic_cdk::println!("Staking: pause requested by {}", caller);
    Ok(runtime::pause())
}

pub fn admin_resume_simulation() -> Result<bool, String> {
    let caller = require_admin()?;
    ic_cdk::println!("Staking: resume requested by {}", caller);
    runtime::resume()
}

/// Discard all simulation state and reseed. `None` keeps the current config.
pub fn admin_reset_simulation(config: Option<StakingConfig>) -> Result<(), String> {
    let caller = require_admin()?;
    let config = match config {
        Some(config) => config,
        None => runtime::with_engine(|e| e.config().clone())?,
    };
    runtime::install(config)?;
    ic_cdk::println!("Staking: simulation reset by {}", caller);
    Ok(())
}
