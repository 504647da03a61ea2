use proptest::prelude::*;
use super::Operation;
use crate::types::ReStakeComponent;

pub fn component() -> impl Strategy<Value = ReStakeComponent> {
    prop_oneof![
        Just(ReStakeComponent::YieldEarned),
        Just(ReStakeComponent::Vested),
        Just(ReStakeComponent::PendingWithdrawals),
    ]
}

// Wall-clock jumps: sub-second, about a tick, past the lock
pub fn time_step() -> impl Strategy<Value = u64> {
    prop_oneof![
        3 => 1..1_000u64,
        2 => 1_000..5_000u64,
        1 => 60_000..100_000u64,
    ]
}

// Generate random operation (weighted distribution, ticks dominate)
pub fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        12 => Just(Operation::Tick),
        1 => (0..4usize).prop_map(|wallet| Operation::Connect { wallet }),
        2 => Just(Operation::OpenReStake),
        3 => component().prop_map(|component| Operation::Toggle { component }),
        1 => Just(Operation::CancelReStake),
        2 => Just(Operation::ConfirmReStake),
        2 => Just(Operation::Withdraw),
        3 => time_step().prop_map(|ms| Operation::AdvanceTime { ms }),
        2 => Just(Operation::FireRelease),
        1 => (0..10u64).prop_map(|lock_id| Operation::FireStaleRelease { lock_id }),
    ]
}

// Generate sequence of N operations
pub fn operation_sequence(len: usize) -> impl Strategy<Value = Vec<Operation>> {
    proptest::collection::vec(operation(), len)
}
