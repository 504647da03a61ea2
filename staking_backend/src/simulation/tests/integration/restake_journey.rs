//! Re-stake dialog journeys
//!
//! Open → toggle → confirm/cancel, interleaved with ticks, always writing
//! back into the single pool entry for the connected wallet.

use crate::simulation::command::{Command, Event};
use crate::simulation::config::StakingConfig;
use crate::simulation::engine::StakingEngine;
use crate::simulation::fixed_point::tokens;
use crate::types::{ReStakeComponent, ReStakeSelection, Wallet, WalletSeed};

fn engine_with(wallet: Wallet) -> StakingEngine {
    let config = StakingConfig {
        initial_wallets: vec![
            WalletSeed { id: wallet.id.clone(), staked: wallet.staked },
            WalletSeed { id: "W2".to_string(), staked: tokens(2000) },
        ],
        ..StakingConfig::default()
    };
    let mut engine = StakingEngine::new(config).unwrap();
    engine.execute(Command::Connect { wallet_id: wallet.id.clone() }).unwrap();
    engine
}

/// W1 connected after the first vesting day.
fn seeded_engine() -> StakingEngine {
    // 1000 BCRE at 0.1%/day: 29 ticks give 29 BCRE yield, then day 30 vests
    let mut engine = engine_with(Wallet::new("W1", tokens(1000)));
    for _ in 0..30 {
        engine.execute(Command::Tick).unwrap();
    }
    engine
}

fn restake(engine: &mut StakingEngine, components: &[ReStakeComponent]) -> Event {
    engine.execute(Command::OpenReStake).unwrap();
    for component in components {
        engine.execute(Command::ToggleReStake { component: *component }).unwrap();
    }
    engine.execute(Command::ConfirmReStake).unwrap()
}

#[test]
fn test_day_thirty_vesting_then_restake_everything() {
    let mut engine = seeded_engine();
    let w = engine.my_wallet().unwrap();
    assert_eq!(w.vested, tokens(3));
    assert_eq!(w.yield_earned, tokens(27));
    assert_eq!(w.current_balance, tokens(1030));

    let event = restake(&mut engine, &[ReStakeComponent::YieldEarned, ReStakeComponent::Vested]);
    assert!(matches!(event, Event::ReStaked { amount, .. } if amount == tokens(30)));

    let w = engine.my_wallet().unwrap();
    assert_eq!((w.staked, w.yield_earned, w.vested), (tokens(1030), 0, 0));
    // TTP unchanged: re-staking only moves tokens between buckets
    assert_eq!(engine.pool_stats(true).ttp, candid::Nat::from(tokens(1030 + 2060)));
    engine.check_invariants().unwrap();
}

#[test]
fn test_restake_increases_future_yield() {
    let mut engine = seeded_engine();
    restake(&mut engine, &[ReStakeComponent::YieldEarned, ReStakeComponent::Vested]);

    engine.execute(Command::Tick).unwrap();
    let w = engine.my_wallet().unwrap();
    // 0.1% of 1030
    assert_eq!(w.yield_earned, 103_000_000);
}

#[test]
fn test_restake_only_vested_leaves_yield() {
    let mut engine = seeded_engine();
    restake(&mut engine, &[ReStakeComponent::Vested]);
    let w = engine.my_wallet().unwrap();
    assert_eq!(w.staked, tokens(1003));
    assert_eq!(w.yield_earned, tokens(27));
    assert_eq!(w.vested, 0);
}

#[test]
fn test_empty_selection_confirms_as_noop() {
    let mut engine = seeded_engine();
    let before = engine.my_wallet().unwrap();
    let event = restake(&mut engine, &[]);
    assert!(matches!(event, Event::ReStaked { amount: 0, .. }));
    assert_eq!(engine.my_wallet().unwrap(), before);
}

#[test]
fn test_dialog_survives_ticks() {
    let mut engine = seeded_engine();
    engine.execute(Command::OpenReStake).unwrap();
    engine.execute(Command::ToggleReStake { component: ReStakeComponent::YieldEarned }).unwrap();

    // Yield keeps accruing while the dialog is open; confirm takes the live value
    engine.execute(Command::Tick).unwrap();
    let live_yield = engine.my_wallet().unwrap().yield_earned;
    assert_eq!(live_yield, tokens(28));

    let event = engine.execute(Command::ConfirmReStake).unwrap();
    assert!(matches!(event, Event::ReStaked { amount, .. } if amount == live_yield));
}

#[test]
fn test_cancel_then_reopen_starts_clean() {
    let mut engine = seeded_engine();
    engine.execute(Command::OpenReStake).unwrap();
    engine.execute(Command::ToggleReStake { component: ReStakeComponent::Vested }).unwrap();
    engine.execute(Command::CancelReStake).unwrap();

    let reopened = engine.execute(Command::OpenReStake).unwrap();
    let Event::ReStakeOpened { options } = reopened else {
        panic!("expected dialog options");
    };
    assert_eq!(options.selection, ReStakeSelection::default());
    assert_eq!(options.vested, tokens(3));
    assert!(!options.pending_locked);
}

#[test]
fn test_other_wallets_untouched_by_restake() {
    let mut engine = seeded_engine();
    let other_before = engine.pool().get("W2").unwrap().clone();
    restake(&mut engine, &[ReStakeComponent::YieldEarned]);
    assert_eq!(engine.pool().get("W2").unwrap(), &other_before);
}
