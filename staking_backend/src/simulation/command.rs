use candid::{CandidType, Deserialize};
use serde::Serialize;

use super::fixed_point::format_tokens;
use crate::types::{ReStakeComponent, ReStakeOptions, ReStakeSelection, WalletId, WithdrawalReceipt, TOKEN_SYMBOL};

/// Every state change goes through one of these, in FIFO order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Tick,
    Connect { wallet_id: WalletId },
    OpenReStake,
    ToggleReStake { component: ReStakeComponent },
    CancelReStake,
    ConfirmReStake,
    RequestWithdrawal { now_ms: u64 },
    ReleaseWithdrawal { lock_id: u64, now_ms: u64 },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Tick => "tick",
            Command::Connect { .. } => "connect",
            Command::OpenReStake => "open_restake",
            Command::ToggleReStake { .. } => "toggle_restake",
            Command::CancelReStake => "cancel_restake",
            Command::ConfirmReStake => "confirm_restake",
            Command::RequestWithdrawal { .. } => "request_withdrawal",
            Command::ReleaseWithdrawal { .. } => "release_withdrawal",
        }
    }
}

/// Outcome of a successfully applied command.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    DayAdvanced {
        tick: u64,
        day: u32,
        yield_minted: u64,
        vested_total: u64,
        vesting_fired: bool,
    },
    Connected {
        wallet_id: WalletId,
        already_connected: bool,
    },
    ReStakeOpened {
        options: ReStakeOptions,
    },
    ReStakeToggled {
        selection: ReStakeSelection,
    },
    ReStakeCancelled,
    ReStaked {
        wallet_id: WalletId,
        amount: u64,
        selection: ReStakeSelection,
        cancelled_lock: Option<u64>,
    },
    WithdrawalRequested {
        receipt: WithdrawalReceipt,
    },
    WithdrawalReleased {
        wallet_id: WalletId,
        lock_id: u64,
        amount: u64,
    },
}

impl Event {
    /// Ordinary ticks are covered by the snapshot history; only vesting ticks
    /// and user-driven events go to the audit log.
    pub fn is_auditable(&self) -> bool {
        match self {
            Event::DayAdvanced { vesting_fired, .. } => *vesting_fired,
            _ => true,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Event::DayAdvanced { tick, day, yield_minted, vested_total, vesting_fired } => {
                if *vesting_fired {
                    format!(
                        "tick {} day {}: +{} {} yield, {} {} vested",
                        tick, day, format_tokens(*yield_minted), TOKEN_SYMBOL,
                        format_tokens(*vested_total), TOKEN_SYMBOL
                    )
                } else {
                    format!("tick {} day {}: +{} {} yield", tick, day, format_tokens(*yield_minted), TOKEN_SYMBOL)
                }
            }
            Event::Connected { wallet_id, already_connected: false } => {
                format!("wallet {} connected", wallet_id)
            }
            Event::Connected { wallet_id, already_connected: true } => {
                format!("wallet {} already connected", wallet_id)
            }
            Event::ReStakeOpened { .. } => "re-stake dialog opened".to_string(),
            Event::ReStakeToggled { selection } => format!(
                "re-stake selection yield={} vested={} pending={}",
                selection.yield_earned, selection.vested, selection.pending_withdrawals
            ),
            Event::ReStakeCancelled => "re-stake cancelled".to_string(),
            Event::ReStaked { wallet_id, amount, cancelled_lock, .. } => match cancelled_lock {
                Some(lock_id) => format!(
                    "wallet {} re-staked {} {} (withdrawal lock {} cancelled)",
                    wallet_id, format_tokens(*amount), TOKEN_SYMBOL, lock_id
                ),
                None => format!("wallet {} re-staked {} {}", wallet_id, format_tokens(*amount), TOKEN_SYMBOL),
            },
            Event::WithdrawalRequested { receipt } => format!(
                "wallet {} requested withdrawal of {} {} (lock {} until {} ms)",
                receipt.wallet_id, format_tokens(receipt.amount), TOKEN_SYMBOL,
                receipt.lock_id, receipt.expires_at_ms
            ),
            Event::WithdrawalReleased { wallet_id, lock_id, amount } => format!(
                "wallet {} released {} {} (lock {})",
                wallet_id, format_tokens(*amount), TOKEN_SYMBOL, lock_id
            ),
        }
    }
}
