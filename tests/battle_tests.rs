//! Battle loop integration tests.
//!
//! These drive full battles through `Battle::step` and `Battle::run` and
//! check the round flow, input collection, ending conditions and the
//! notifications published along the way.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::Receiver;
use turn_combat::battle::{Battle, BattleOutcome, BattlePhase, Spoils};
use turn_combat::combat::EventId;
use turn_combat::core::{
    BattleConfig, BattleState, Combatant, CombatantId, ItemId, PlannedAction, Rewards,
};
use turn_combat::effects::{FixedFormula, Periodic};
use turn_combat::error::{CombatError, Result};
use turn_combat::input::{InputOrchestrator, InputRequest, ScriptedInput, Selection};
use turn_combat::presentation::{BattleNotice, CombatText, PresentationError, PresentationSink};
use turn_combat::stores::{FlagSet, FlagStore, Inventory, ItemDef, ItemEffect, Satchel};

const KNIGHT: CombatantId = CombatantId(1);
const MAGE: CombatantId = CombatantId(2);
const SLIME: CombatantId = CombatantId(10);
const BAT: CombatantId = CombatantId(11);
const POTION: ItemId = ItemId(1);

fn member(id: CombatantId, name: &str, hp: i64, dexterity: i64) -> Combatant {
    Combatant::new(id, name).with_hp(hp).with_dexterity(dexterity)
}

fn hp(battle: &Battle, id: CombatantId) -> i64 {
    battle.state().combatant(id).map_or(-1, Combatant::current_hp)
}

fn drain(rx: &mut Receiver<BattleNotice>) -> Vec<BattleNotice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

/// Step until one full round has executed (or the battle ends).
async fn play_round(battle: &mut Battle) -> BattlePhase {
    let mut executed = false;
    loop {
        let phase = battle.step().await.unwrap();
        executed |= phase == BattlePhase::Execute;
        if phase.is_terminal() || (executed && matches!(phase, BattlePhase::CollectInput { .. })) {
            return phase;
        }
    }
}

/// Records every request it receives and plays back a script.
struct RecordingInput {
    script: VecDeque<Selection>,
    seen: Arc<Mutex<Vec<InputRequest>>>,
}

#[async_trait]
impl InputOrchestrator for RecordingInput {
    async fn request_action(
        &mut self,
        request: &InputRequest,
        _state: &BattleState,
    ) -> Result<Selection> {
        self.seen.lock().unwrap().push(request.clone());
        self.script.pop_front().ok_or(CombatError::InputClosed)
    }
}

// =============================================================================
// Endings
// =============================================================================

/// One attack fells the only enemy; the battle is won in round one.
#[tokio::test]
async fn test_single_blow_wins() {
    let mut battle = Battle::builder(
        vec![member(KNIGHT, "Knight", 20, 5)],
        vec![member(SLIME, "Slime", 10, 2)],
    )
    .with_config(BattleConfig::instant())
    .with_formula(FixedFormula::new(-10))
    .build()
    .unwrap();
    let mut rx = battle.subscribe();

    let outcome = battle.run().await.unwrap();

    assert!(outcome.is_victory());
    assert_eq!(battle.phase(), BattlePhase::Won);
    assert_eq!(hp(&battle, SLIME), 0);
    assert!(!battle.state().is_active(SLIME));
    assert_eq!(hp(&battle, KNIGHT), 20);

    let blow = &battle.state().history()[0];
    assert_eq!(blow.target, SLIME);
    assert_eq!(blow.resulting_value, -10);
    assert!(blow.target_down);

    let notices = drain(&mut rx);
    let names: Vec<&str> = notices.iter().map(BattleNotice::name).collect();
    assert_eq!(names, vec!["round-started", "event-resolved", "battle-won"]);
    assert_eq!(notices[2], BattleNotice::BattleWon { round: 1 });
    assert!(battle.queue().is_empty());
}

/// Everything still queued when the last enemy falls is discarded, and
/// the victory is announced once.
#[tokio::test]
async fn test_queued_events_discarded_on_victory() {
    let mut battle = Battle::builder(
        vec![member(KNIGHT, "Knight", 30, 9), member(MAGE, "Mage", 30, 8)],
        vec![member(SLIME, "Slime", 5, 1)],
    )
    .with_config(BattleConfig::instant())
    .with_formula(FixedFormula::new(-10))
    .build()
    .unwrap();
    let mut rx = battle.subscribe();

    battle.run().await.unwrap();

    let stats = battle.stats();
    assert_eq!(stats.enqueued, 3);
    assert_eq!(stats.applied, 1);
    assert_eq!(stats.cleared, 2);
    assert_eq!(battle.state().history().len(), 1);
    assert_eq!(hp(&battle, KNIGHT), 30);
    assert_eq!(hp(&battle, MAGE), 30);

    let won = drain(&mut rx)
        .into_iter()
        .filter(|n| matches!(n, BattleNotice::BattleWon { .. }))
        .count();
    assert_eq!(won, 1);

    assert_eq!(battle.step().await, Err(CombatError::BattleOver));
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_party_defeat() {
    let party = vec![member(KNIGHT, "Knight", 5, 1)];
    let enemies = vec![member(SLIME, "Slime", 50, 9)];
    let mut battle = Battle::builder(party, enemies)
        .with_config(BattleConfig::instant())
        .with_formula(FixedFormula::new(-5))
        .build()
        .unwrap();
    let mut rx = battle.subscribe();

    assert_eq!(battle.run().await.unwrap(), BattleOutcome::Lost);
    assert_eq!(battle.phase(), BattlePhase::Lost);
    assert!(battle.state().is_defeated(turn_combat::core::Side::Party));
    // The slime is faster and acted first
    assert_eq!(hp(&battle, SLIME), 50);

    let notices = drain(&mut rx);
    assert_eq!(notices.last(), Some(&BattleNotice::BattleLost { round: 1 }));
}

#[tokio::test]
async fn test_flee_skips_the_round() {
    let mut battle = Battle::builder(
        vec![member(KNIGHT, "Knight", 30, 5), member(MAGE, "Mage", 30, 5)],
        vec![member(SLIME, "Slime", 30, 2)],
    )
    .with_config(BattleConfig::instant())
    .with_formula(FixedFormula::new(-3))
    .with_input(ScriptedInput::new([
        Selection::Choose(0),
        Selection::Direct(PlannedAction::Flee),
    ]))
    .build()
    .unwrap();
    let mut rx = battle.subscribe();

    assert_eq!(battle.run().await.unwrap(), BattleOutcome::Fled);
    assert_eq!(battle.phase(), BattlePhase::Ended);
    assert_eq!(hp(&battle, SLIME), 30);
    assert!(battle.state().history().is_empty());
    assert_eq!(battle.stats().cleared, 1);
    assert_eq!(
        drain(&mut rx).last(),
        Some(&BattleNotice::BattleEnded { round: 1 })
    );
}

// =============================================================================
// Input collection
// =============================================================================

/// Going back at the second member retracts the first member's action.
#[tokio::test]
async fn test_back_retracts_previous_action() {
    let mut battle = Battle::builder(
        vec![member(KNIGHT, "Knight", 30, 5), member(MAGE, "Mage", 30, 5)],
        vec![member(SLIME, "Slime", 50, 2)],
    )
    .with_config(BattleConfig::instant())
    .with_formula(FixedFormula::new(-1))
    .with_input(ScriptedInput::new([
        // Back at the first member does nothing
        Selection::Back,
        Selection::Choose(0),
        Selection::Back,
        Selection::Choose(1),
        Selection::Choose(0),
    ]))
    .build()
    .unwrap();

    assert_eq!(battle.step().await.unwrap(), BattlePhase::CollectInput { focus: 0 });
    assert!(battle.queue().is_empty());

    assert_eq!(battle.step().await.unwrap(), BattlePhase::CollectInput { focus: 1 });
    assert_eq!(battle.queue().len(), 1);

    assert_eq!(battle.step().await.unwrap(), BattlePhase::CollectInput { focus: 0 });
    assert!(battle.queue().is_empty());
    assert_eq!(battle.stats().enqueued, 0);

    // The knight defends this time
    assert_eq!(battle.step().await.unwrap(), BattlePhase::CollectInput { focus: 1 });
    let queued = &battle.queue().events()[0];
    assert_eq!(queued.executor(), KNIGHT);
    assert_eq!(queued.target(), None);

    assert_eq!(battle.step().await.unwrap(), BattlePhase::EnemyDecision);
    assert_eq!(battle.queue().len(), 2);
}

/// After a round executes, input collection restarts at the first member.
#[tokio::test]
async fn test_round_returns_to_first_member() {
    let mut battle = Battle::builder(
        vec![member(KNIGHT, "Knight", 30, 5), member(MAGE, "Mage", 30, 5)],
        vec![member(SLIME, "Slime", 50, 2)],
    )
    .with_config(BattleConfig::instant())
    .with_formula(FixedFormula::new(-1))
    .build()
    .unwrap();

    for round in 1..=3 {
        assert_eq!(play_round(&mut battle).await, BattlePhase::CollectInput { focus: 0 });
        assert_eq!(battle.round(), round);
        assert!(battle.queue().is_empty());
    }
    assert_eq!(hp(&battle, SLIME), 44);
}

/// A target outside the living rosters is refused and the member asked again.
#[tokio::test]
async fn test_invalid_target_is_requested_again() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let party = vec![member(KNIGHT, "Knight", 30, 5)];
    let enemies = vec![member(SLIME, "Slime", 50, 2)];
    let mut battle = Battle::builder(party, enemies)
        .with_config(BattleConfig::instant())
        .with_input(RecordingInput {
            script: VecDeque::from([
                Selection::Direct(PlannedAction::Attack {
                    target: CombatantId::new(99),
                }),
                Selection::Choose(0),
            ]),
            seen: Arc::clone(&seen),
        })
        .build()
        .unwrap();

    assert_eq!(battle.step().await.unwrap(), BattlePhase::CollectInput { focus: 0 });
    assert!(battle.queue().is_empty());
    assert_eq!(battle.step().await.unwrap(), BattlePhase::EnemyDecision);
    assert_eq!(battle.stats().enqueued, 1);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].rejected, None);
    assert_eq!(
        seen[1].rejected.as_deref(),
        Some("target Combatant(99) is not on either living roster")
    );
    assert_eq!(seen[1].options[0].label, "Attack > Slime");
}

/// Two members cannot plan to use the only potion.
#[tokio::test]
async fn test_item_reservation_across_members() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let potion = ItemDef::new(POTION, "Potion", ItemEffect::Restoration, 25);
    let mut battle = Battle::builder(
        vec![
            Combatant::new(KNIGHT, "Knight").with_hp(30).with_current_hp(10).with_dexterity(5),
            member(MAGE, "Mage", 30, 5),
        ],
        vec![member(SLIME, "Slime", 50, 1)],
    )
    .with_config(BattleConfig::instant())
    .with_formula(FixedFormula::new(-1))
    .with_inventory(Satchel::new().with_item(potion, 1))
    .with_input(RecordingInput {
        script: VecDeque::from([
            Selection::Direct(PlannedAction::UseItem {
                item: POTION,
                target: KNIGHT,
            }),
            Selection::Direct(PlannedAction::UseItem {
                item: POTION,
                target: MAGE,
            }),
            Selection::Direct(PlannedAction::Defend),
        ]),
        seen: Arc::clone(&seen),
    })
    .build()
    .unwrap();

    assert_eq!(play_round(&mut battle).await, BattlePhase::CollectInput { focus: 0 });

    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        // The knight saw the potion, the mage's retry did not
        assert!(seen[0].find("Potion x1 > Knight").is_some());
        assert_eq!(seen[2].member, MAGE);
        assert_eq!(seen[2].rejected.as_deref(), Some("Item(1) is not available"));
        assert!(seen[2].options.iter().all(|o| !o.label.starts_with("Potion")));
    }

    assert_eq!(battle.inventory().available(POTION), 0);
    // Healed to full, then hit by the slime
    assert_eq!(hp(&battle, KNIGHT), 29);
    let heal = battle
        .state()
        .history()
        .iter()
        .find(|r| r.target == KNIGHT && r.resulting_value > 0)
        .cloned()
        .unwrap();
    assert_eq!(heal.resulting_value, 25);
}

// =============================================================================
// Resolution discipline
// =============================================================================

/// Replaying a resolved event halts the battle without applying it again.
#[tokio::test]
async fn test_double_resolve_is_fatal() {
    let party = vec![member(KNIGHT, "Knight", 30, 5)];
    let enemies = vec![member(SLIME, "Slime", 50, 2)];
    let mut battle = Battle::builder(party, enemies)
        .with_config(BattleConfig::instant())
        .with_formula(FixedFormula::new(-4))
        .build()
        .unwrap();

    while battle.phase() != BattlePhase::Execute {
        battle.step().await.unwrap();
    }
    let next = battle.queue().peek_next().cloned().unwrap();
    assert_eq!(next.executor(), KNIGHT);

    assert_eq!(battle.step().await.unwrap(), BattlePhase::CheckEnd);
    assert_eq!(hp(&battle, SLIME), 46);

    assert_eq!(
        battle.resolve(&next).await,
        Err(CombatError::AlreadyResolvedEvent(next.id()))
    );
    assert_eq!(hp(&battle, SLIME), 46);
    assert_eq!(battle.phase(), BattlePhase::Halted);
    assert_eq!(battle.step().await, Err(CombatError::BattleOver));
}

/// A combatant downed by an end-of-round effect leaves the roster.
#[tokio::test]
async fn test_post_turn_effect_downs_combatant() {
    let mut battle = Battle::builder(
        vec![member(KNIGHT, "Knight", 30, 5)],
        vec![member(SLIME, "Slime", 3, 2), member(BAT, "Bat", 20, 2)],
    )
    .with_config(BattleConfig::instant())
    .with_formula(FixedFormula::new(-1))
    .with_input(ScriptedInput::new([Selection::Direct(PlannedAction::Defend)]))
    .with_enchantment(SLIME, Arc::new(Periodic::poison(5)))
    .build()
    .unwrap();

    assert_eq!(play_round(&mut battle).await, BattlePhase::CollectInput { focus: 0 });

    assert_eq!(hp(&battle, SLIME), 0);
    assert!(!battle.state().is_active(SLIME));
    assert!(battle.state().is_active(BAT));
    assert!(battle.enchantments().attachments_for(SLIME).is_empty());

    let poison = battle.state().history().last().cloned().unwrap();
    assert_eq!(poison.executor, None);
    assert_eq!(poison.target, SLIME);
    assert_eq!(poison.resulting_value, -5);
    assert!(poison.target_down);
    assert!(battle
        .state()
        .history()
        .iter()
        .all(|r| r.target != SLIME || r.executor.is_none()));

    // Guarding halves the one-point hits but never blocks them
    assert_eq!(hp(&battle, KNIGHT), 28);
}

/// Every enqueued event is applied, dropped, suppressed or discarded.
#[tokio::test]
async fn test_every_event_accounted_for() {
    let mut battle = turn_combat::games::skirmish::SkirmishBuilder::new()
        .poisoned_enemies(true)
        .build()
        .battle(BattleConfig::instant().with_seed(11))
        .build()
        .unwrap();

    battle.run().await.unwrap();
    let stats = battle.stats();
    assert!(stats.enqueued > 0);
    assert_eq!(
        stats.applied + stats.dropped + stats.suppressed + stats.cleared,
        stats.enqueued
    );
    assert!(battle.queue().is_empty());
}

// =============================================================================
// Spoils
// =============================================================================

#[tokio::test]
async fn test_victory_spoils_and_flags() {
    let goblin = member(SLIME, "Goblin", 5, 1).with_rewards(Rewards {
        experience: 9,
        gold: 12,
        loot_table: vec![POTION],
        flags_when_defeated: vec![7],
    });
    let potion = ItemDef::new(POTION, "Potion", ItemEffect::Restoration, 25);
    let mut battle = Battle::builder(vec![member(KNIGHT, "Knight", 30, 5)], vec![goblin])
        .with_config(BattleConfig::instant())
        .with_formula(FixedFormula::new(-10))
        .with_inventory(Satchel::new().with_item(potion, 0).with_gold(5))
        .with_flags(FlagSet::new())
        .build()
        .unwrap();

    let outcome = battle.run().await.unwrap();
    assert_eq!(
        outcome,
        BattleOutcome::Won(Spoils {
            experience: 9,
            gold: 12,
            items: vec![POTION],
            flags: vec![7],
        })
    );
    assert_eq!(battle.inventory().available(POTION), 1);
    assert_eq!(battle.inventory().gold(), 17);
    assert!(battle.flags().is_raised(7));
    assert!(!battle.flags().is_raised(8));
    assert_eq!(battle.outcome(), Some(&outcome));
}

#[tokio::test]
async fn test_event_ids_are_unique() {
    let mut battle = Battle::builder(
        vec![member(KNIGHT, "Knight", 30, 5), member(MAGE, "Mage", 30, 4)],
        vec![member(SLIME, "Slime", 40, 2)],
    )
    .with_config(BattleConfig::instant())
    .with_formula(FixedFormula::new(-2))
    .build()
    .unwrap();

    play_round(&mut battle).await;
    play_round(&mut battle).await;

    let mut ids: Vec<EventId> = battle.state().history().iter().map(|r| r.event).collect();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total);
    assert_eq!(total, 6);
}

// =============================================================================
// Presentation
// =============================================================================

/// A display that is never there.
#[derive(Default)]
struct UnpluggedSink {
    attempts: AtomicUsize,
}

#[async_trait]
impl PresentationSink for UnpluggedSink {
    async fn play_text(&self, _text: &CombatText) -> std::result::Result<(), PresentationError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PresentationError::Unavailable)
    }
}

/// Sink failures are logged and skipped; the paced battle still finishes.
#[tokio::test(start_paused = true)]
async fn test_failing_sink_does_not_stop_battle() {
    let sink = Arc::new(UnpluggedSink::default());
    let config = BattleConfig::default();
    let party = vec![member(KNIGHT, "Knight", 30, 5)];
    let enemies = vec![member(SLIME, "Slime", 8, 2)];
    let mut battle = Battle::builder(party, enemies)
        .with_config(config.clone())
        .with_formula(FixedFormula::new(-4))
        .with_sink(Arc::clone(&sink))
        .build()
        .unwrap();

    let started = tokio::time::Instant::now();
    let outcome = battle.run().await.unwrap();
    let elapsed = started.elapsed();

    assert!(outcome.is_victory());
    assert_eq!(battle.round(), 2);
    let stats = battle.stats();
    // Knight twice, Slime once; the Slime's second attack is discarded
    assert_eq!(stats.applied, 3);
    assert_eq!(stats.cleared, 1);
    assert_eq!(
        stats.applied + stats.dropped + stats.suppressed + stats.cleared,
        stats.enqueued
    );
    assert_eq!(sink.attempts.load(Ordering::SeqCst), 3);

    // Every applied event animated and every confirmed input paused
    let paced = config.animation_delay() * 3 + config.input_delay() * 2;
    assert!(elapsed >= paced, "elapsed {:?} < {:?}", elapsed, paced);
    assert!(elapsed < paced + Duration::from_secs(1));
}
