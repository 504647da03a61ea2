//! BCRE Staking Pool Backend
//!
//! **Design Philosophy:**
//! A demo staking dashboard. One simulated day passes per tick; every wallet
//! earns a fixed daily rate on its stake and a fraction of earned yield vests
//! on a fixed cadence. The connected wallet can re-stake earnings or request a
//! time-locked withdrawal.
//!
//! **Simulation only:**
//! - No token transfers, no persistence: state is reseeded on install and upgrade
//! - Wallet "connection" picks a seeded wallet with IC VRF (raw_rand) or binds
//!   the caller's principal to one
//! - One session is shared by all callers

use ic_cdk::management_canister::raw_rand;
use ic_cdk::{init, post_upgrade, pre_upgrade, query, update};

// =============================================================================
// MODULE DECLARATIONS
// =============================================================================

pub mod simulation;
pub mod types;
mod admin_query;
mod runtime;

pub use simulation::{ApyInfo, AuditEntry, DaySnapshot, StakingConfig};
pub use types::*;

use simulation::connector::{PrincipalConnector, RandomDemoConnector, WalletConnector};
use simulation::{Command, Event};

const MAX_EVENTS_PER_QUERY: u32 = 100;

// =============================================================================
// LIFECYCLE HOOKS
// =============================================================================

fn install_or_trap(config: Option<StakingConfig>) {
    if let Err(e) = runtime::install(config.unwrap_or_default()) {
        ic_cdk::trap(&format!("Invalid staking config: {}", e));
    }
}

#[init]
fn init(config: Option<StakingConfig>) {
    install_or_trap(config);
    ic_cdk::println!("Staking Pool Backend Initialized");
}

#[pre_upgrade]
fn pre_upgrade() {
    runtime::teardown();
    ic_cdk::println!("Pre-upgrade: timers cleared, simulation state is discarded");
}

#[post_upgrade]
fn post_upgrade(config: Option<StakingConfig>) {
    install_or_trap(config);
    ic_cdk::println!("Post-upgrade: pool reseeded, timers restarted");
}

fn view<R>(f: impl FnOnce(&simulation::StakingEngine) -> R) -> R {
    runtime::with_engine(f).unwrap_or_else(|e| ic_cdk::trap(&e))
}

fn require_authenticated() -> Result<candid::Principal, String> {
    let caller = ic_cdk::api::msg_caller();
    if caller == candid::Principal::anonymous() {
        return Err("Authentication required to bind a wallet to your identity".to_string());
    }
    Ok(caller)
}

// =============================================================================
// WALLET CONNECTION
// =============================================================================

#[update]
async fn connect_wallet(method: Option<ConnectMethod>) -> Result<ConnectResult, String> {
    if let Some(wallet) = runtime::with_engine(|e| e.my_wallet())? {
        return Ok(ConnectResult {
            wallet,
            already_connected: true,
            selection_proof: None,
        });
    }

    let (connector, proof): (Box<dyn WalletConnector>, Option<String>) =
        match method.unwrap_or_default() {
            ConnectMethod::RandomDemo => {
                let entropy = raw_rand()
                    .await
                    .map_err(|e| format!("Randomness unavailable: {:?}", e))?;
                let connector = RandomDemoConnector::new(entropy)?;
                let proof = connector.selection_proof();
                (Box::new(connector), Some(proof))
            }
            ConnectMethod::CallerBound => {
                let caller = require_authenticated()?;
                (Box::new(PrincipalConnector::new(caller)), None)
            }
        };

    let wallet_id = runtime::with_engine(|e| connector.select(e.pool().wallets()))??;
    ic_cdk::println!("Staking: {} connector selected {}", connector.name(), wallet_id);

    let (wallet_id, already_connected) = match runtime::dispatch(Command::Connect { wallet_id })? {
        Event::Connected { wallet_id, already_connected } => (wallet_id, already_connected),
        other => return Err(format!("Unexpected event: {:?}", other)),
    };

    let wallet = runtime::with_engine(|e| e.wallet_view(&wallet_id))?
        .ok_or_else(|| format!("Unknown wallet: {}", wallet_id))?;

    Ok(ConnectResult {
        wallet,
        already_connected,
        selection_proof: if already_connected { None } else { proof },
    })
}

// =============================================================================
// RE-STAKE ENDPOINTS
// =============================================================================

#[update]
fn open_restake() -> Result<ReStakeOptions, String> {
    match runtime::dispatch(Command::OpenReStake)? {
        Event::ReStakeOpened { options } => Ok(options),
        other => Err(format!("Unexpected event: {:?}", other)),
    }
}

#[update]
fn toggle_restake(component: ReStakeComponent) -> Result<ReStakeSelection, String> {
    match runtime::dispatch(Command::ToggleReStake { component })? {
        Event::ReStakeToggled { selection } => Ok(selection),
        other => Err(format!("Unexpected event: {:?}", other)),
    }
}

#[update]
fn cancel_restake() -> Result<(), String> {
    runtime::dispatch(Command::CancelReStake).map(|_| ())
}

#[update]
fn confirm_restake() -> Result<WalletView, String> {
    runtime::dispatch(Command::ConfirmReStake)?;
    runtime::with_engine(|e| e.my_wallet())?.ok_or_else(|| "No wallet connected".to_string())
}

// =============================================================================
// WITHDRAWAL ENDPOINTS
// =============================================================================

#[update]
fn request_withdrawal() -> Result<WithdrawalReceipt, String> {
    let now_ms = runtime::now_ms();
    match runtime::dispatch(Command::RequestWithdrawal { now_ms })? {
        Event::WithdrawalRequested { receipt } => Ok(receipt),
        other => Err(format!("Unexpected event: {:?}", other)),
    }
}

#[query]
fn can_withdraw() -> bool {
    view(|e| e.can_withdraw())
}

#[query]
fn get_withdrawal_status() -> WithdrawalLock {
    view(|e| e.session().map(|s| s.withdrawal().clone()).unwrap_or_default())
}

// =============================================================================
// QUERY ENDPOINTS
// =============================================================================

#[query]
fn get_pool_stats() -> PoolStats {
    let is_running = runtime::is_running();
    view(|e| e.pool_stats(is_running))
}

#[query]
fn get_my_staking() -> Option<WalletView> {
    view(|e| e.my_wallet())
}

#[query]
fn get_config() -> StakingConfig {
    view(|e| e.config().clone())
}

#[query]
fn get_recent_events(limit: u32) -> Vec<AuditEntry> {
    view(|e| e.audit().recent(limit.min(MAX_EVENTS_PER_QUERY)))
}

// =============================================================================
// DAILY STATISTICS ENDPOINTS
// =============================================================================

#[query]
fn get_daily_stats(limit: u32) -> Vec<DaySnapshot> {
    view(|e| e.history().recent(limit))
}

#[query]
fn get_pool_apy(days: Option<u32>) -> ApyInfo {
    view(|e| e.apy_info(days))
}

// =============================================================================
// ADMIN ENDPOINTS
// =============================================================================

#[query]
fn admin_get_all_wallets(offset: u64, limit: u64) -> Result<Vec<Wallet>, String> {
    admin_query::admin_get_all_wallets(offset, limit)
}

#[query]
fn admin_get_audit_log(offset: u64, limit: u64) -> Result<Vec<AuditEntry>, String> {
    admin_query::admin_get_audit_log(offset, limit)
}

#[query]
fn admin_check_invariants() -> Result<String, String> {
    admin_query::admin_check_invariants()
}

#[update]
fn admin_pause_simulation() -> Result<bool, String> {
    admin_query::admin_pause_simulation()
}

#[update]
fn admin_resume_simulation() -> Result<bool, String> {
    admin_query::admin_resume_simulation()
}

#[update]
fn admin_reset_simulation(config: Option<StakingConfig>) -> Result<(), String> {
    admin_query::admin_reset_simulation(config)
}

#[query]
fn greet(name: String) -> String {
    format!("Welcome to the {} staking pool, {}!", TOKEN_SYMBOL, name)
}

ic_cdk::export_candid!();
