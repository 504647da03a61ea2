use candid::{CandidType, Deserialize, Nat};
use serde::Serialize;

// =============================================================================
// CONSTANTS
// =============================================================================

pub const E8S_PER_TOKEN: u64 = 100_000_000; // 1 BCRE = 100,000,000 e8s
pub const E6_PER_USD: u64 = 1_000_000; // $1 = 1,000,000 (6 decimals)
pub const BPS_DENOMINATOR: u64 = 10_000; // 10,000 bps = 100%
pub const TOKEN_SYMBOL: &str = "BCRE";

pub type WalletId = String;

// =============================================================================
// WALLET
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    pub id: WalletId,
    pub staked: u64,
    pub yield_earned: u64,
    pub vested: u64,
    pub pending_withdrawals: u64,
    // Tick at which the last vesting transfer was applied
    pub last_vesting_tick: Option<u64>,
}

impl Wallet {
    pub fn new(id: impl Into<WalletId>, staked: u64) -> Self {
        Self {
            id: id.into(),
            staked,
            yield_earned: 0,
            vested: 0,
            pending_withdrawals: 0,
            last_vesting_tick: None,
        }
    }

    /// Staked + yield + vested. Pending withdrawals are excluded.
    pub fn active_balance(&self) -> u64 {
        self.staked
            .saturating_add(self.yield_earned)
            .saturating_add(self.vested)
    }

    /// Everything the wallet still holds in the pool, pending included.
    pub fn total_holdings(&self) -> u128 {
        self.staked as u128
            + self.yield_earned as u128
            + self.vested as u128
            + self.pending_withdrawals as u128
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct WalletSeed {
    pub id: WalletId,
    pub staked: u64,
}

// =============================================================================
// RE-STAKING
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReStakeComponent {
    YieldEarned,
    Vested,
    PendingWithdrawals,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReStakeSelection {
    pub yield_earned: bool,
    pub vested: bool,
    pub pending_withdrawals: bool,
}

impl ReStakeSelection {
    pub fn toggle(&mut self, component: ReStakeComponent) {
        match component {
            ReStakeComponent::YieldEarned => self.yield_earned = !self.yield_earned,
            ReStakeComponent::Vested => self.vested = !self.vested,
            ReStakeComponent::PendingWithdrawals => {
                self.pending_withdrawals = !self.pending_withdrawals
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.yield_earned || self.vested || self.pending_withdrawals)
    }
}

/// What the re-stake dialog shows: the three movable balances and the current picks.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ReStakeOptions {
    pub yield_earned: u64,
    pub vested: u64,
    pub pending_withdrawals: u64,
    pub selection: ReStakeSelection,
    // Re-staking pending funds while locked cancels the withdrawal
    pub pending_locked: bool,
}

// =============================================================================
// WITHDRAWAL LOCK
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum WithdrawalLock {
    #[default]
    Unlocked,
    Locked {
        lock_id: u64,
        wallet_id: WalletId,
        amount: u64,
        requested_at_ms: u64,
        expires_at_ms: u64,
    },
}

impl WithdrawalLock {
    pub fn is_locked(&self) -> bool {
        matches!(self, WithdrawalLock::Locked { .. })
    }

    pub fn lock_id(&self) -> Option<u64> {
        match self {
            WithdrawalLock::Locked { lock_id, .. } => Some(*lock_id),
            WithdrawalLock::Unlocked => None,
        }
    }

    pub fn expires_at_ms(&self) -> Option<u64> {
        match self {
            WithdrawalLock::Locked { expires_at_ms, .. } => Some(*expires_at_ms),
            WithdrawalLock::Unlocked => None,
        }
    }
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct WithdrawalReceipt {
    pub wallet_id: WalletId,
    pub amount: u64,
    pub lock_id: u64,
    pub requested_at_ms: u64,
    pub expires_at_ms: u64,
}

// =============================================================================
// CONNECT
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectMethod {
    /// Pick any seeded wallet using IC VRF randomness
    #[default]
    RandomDemo,
    /// Bind the caller's principal to a wallet deterministically
    CallerBound,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug)]
pub struct ConnectResult {
    pub wallet: WalletView,
    pub already_connected: bool,
    // hex(sha256(entropy)) used for the selection, when a new session was opened
    pub selection_proof: Option<String>,
}

// =============================================================================
// QUERY VIEWS
// =============================================================================

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct WalletView {
    pub id: WalletId,
    pub staked: u64,
    pub yield_earned: u64,
    pub vested: u64,
    pub pending_withdrawals: u64,
    pub current_balance: u64,
    pub can_withdraw: bool,
    pub withdrawal_unlocks_at_ms: Option<u64>,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug)]
pub struct PoolStats {
    /// Total value locked (USD, 6 decimals)
    pub tvl_e6: Nat,
    /// Total tokens pooled (e8s)
    pub ttp: Nat,
    pub apy_percent: f64,
    pub daily_interest_rate_bps: u64,
    pub token_price_e6: u64,
    pub day: u32,
    pub days_to_maturity: u32,
    pub ticks: u64,
    pub wallet_count: u64,
    pub total_yield_minted: u64,
    pub total_released: u64,
    pub is_running: bool,
}
