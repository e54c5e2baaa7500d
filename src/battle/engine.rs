//! The battle loop.
//!
//! A [`Battle`] owns every piece of one fight and drives it through a
//! small state machine:
//!
//! ```text
//! CollectInput(focus) -> EnemyDecision -> Schedule -> Execute <-> CheckEnd
//!        ^                                                          |
//!        +------------------- next round ---------------------------+
//!                                   |
//!                           Won / Lost / Ended
//! ```
//!
//! Each call to [`Battle::step`] performs exactly one transition. Events
//! are resolved strictly one at a time: the next event is not popped until
//! the previous one has finished animating and its combat text has played.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::outcome::{BattleOutcome, Spoils};
use crate::combat::{
    orientation_for, BasicAction, CombatEvent, DropReason, EventId, EventKind, EventResolver,
    Resolution, ResolverContext,
};
use crate::core::{
    BattleConfig, BattleState, BattleStreams, Combatant, CombatantId, PlannedAction, Side,
};
use crate::effects::{Enchantment, Formula, Grimoire, StandardFormula};
use crate::error::{CombatError, Result};
use crate::input::{
    build_menu, default_policy, AutoPilot, EnemyPolicy, InputCursor, InputOrchestrator,
    InputRequest, Selection,
};
use crate::presentation::{BattleNotice, NoticeBus, NullSink, PresentationSink};
use crate::stack::{scheduler_for, RoundQueue, TurnScheduler};
use crate::stores::{FlagSet, FlagStore, Inventory, Satchel};
use crate::triggers::{AttachmentId, EnchantmentRegistry, HookTiming};

/// Where the battle loop is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattlePhase {
    /// Waiting for the living party member at `focus` to decide.
    CollectInput { focus: usize },
    /// Every living enemy declares one action.
    EnemyDecision,
    /// Order the round and lay out enchantment hooks.
    Schedule,
    /// Resolve the next queued event.
    Execute,
    /// Remove the fallen and look for a winner.
    CheckEnd,
    Won,
    Lost,
    /// The party ran.
    Ended,
    /// Stopped by a fatal error.
    Halted,
}

impl BattlePhase {
    /// Is the battle over (for any reason)?
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BattlePhase::Won | BattlePhase::Lost | BattlePhase::Ended | BattlePhase::Halted
        )
    }
}

/// Event accounting for the whole battle.
///
/// Every enqueued event ends up in exactly one of the other counters:
/// `applied + dropped + suppressed + cleared == enqueued` once the queue
/// is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleStats {
    pub rounds: u32,
    /// Events placed in the queue, hooks included. Retracted inputs are not counted.
    pub enqueued: u64,
    /// Events whose effect was applied.
    pub applied: u64,
    /// Events skipped because a participant was down or the paired attack missed.
    pub dropped: u64,
    /// Events cancelled by a pre-attack enchantment.
    pub suppressed: u64,
    /// Events discarded unresolved when the battle ended.
    pub cleared: u64,
}

// =============================================================================
// Battle
// =============================================================================

/// One fight between the party and a group of enemies.
pub struct Battle {
    config: BattleConfig,
    state: BattleState,
    phase: BattlePhase,
    queue: RoundQueue,
    cursor: InputCursor,
    enchantments: EnchantmentRegistry,

    formula: Box<dyn Formula>,
    scheduler: Box<dyn TurnScheduler>,
    enemy_policy: Box<dyn EnemyPolicy>,
    input: Box<dyn InputOrchestrator>,
    sink: Arc<dyn PresentationSink>,
    notices: NoticeBus,
    inventory: Box<dyn Inventory>,
    flags: Box<dyn FlagStore>,
    grimoire: Grimoire,
    rolls: BattleStreams,

    next_event_id: u64,
    /// Signed values of attacks that landed this round.
    landed: FxHashMap<EventId, i64>,
    round_open: bool,
    /// Why the last answer for the focused member was refused.
    rejected: Option<String>,
    stats: BattleStats,
    outcome: Option<BattleOutcome>,
}

impl Battle {
    /// Start building a battle between two rosters.
    pub fn builder(
        party: impl IntoIterator<Item = Combatant>,
        enemies: impl IntoIterator<Item = Combatant>,
    ) -> BattleBuilder {
        BattleBuilder::new(party, enemies)
    }

    // === Accessors ===

    #[must_use]
    pub fn state(&self) -> &BattleState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    #[must_use]
    pub fn round(&self) -> u32 {
        self.state.round
    }

    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// The round queue, for inspection.
    #[must_use]
    pub fn queue(&self) -> &RoundQueue {
        &self.queue
    }

    #[must_use]
    pub fn stats(&self) -> BattleStats {
        self.stats
    }

    /// How the battle ended, once it has.
    #[must_use]
    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    #[must_use]
    pub fn inventory(&self) -> &dyn Inventory {
        self.inventory.as_ref()
    }

    #[must_use]
    pub fn flags(&self) -> &dyn FlagStore {
        self.flags.as_ref()
    }

    #[must_use]
    pub fn enchantments(&self) -> &EnchantmentRegistry {
        &self.enchantments
    }

    #[must_use]
    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    /// Subscribe to battle notices from now on.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<BattleNotice> {
        self.notices.subscribe()
    }

    /// Attach an enchantment to a combatant mid-battle.
    ///
    /// Hooks are laid out when a round is scheduled, so the enchantment
    /// first fires in the next scheduled round.
    pub fn enchant(
        &mut self,
        bearer: CombatantId,
        enchantment: Arc<dyn Enchantment>,
    ) -> Result<AttachmentId> {
        if self.state.combatant(bearer).is_none() {
            return Err(CombatError::InvalidTarget { target: bearer });
        }
        Ok(self.enchantments.attach(bearer, enchantment))
    }

    // === Driving ===

    /// Run until the battle is over.
    pub async fn run(&mut self) -> Result<BattleOutcome> {
        while !self.phase.is_terminal() {
            self.step().await?;
        }
        self.outcome.clone().ok_or(CombatError::BattleOver)
    }

    /// Perform one transition and return the new phase.
    ///
    /// Any error returned here has halted the battle. Rejected input is not
    /// an error; it is reported to the orchestrator on the next request.
    pub async fn step(&mut self) -> Result<BattlePhase> {
        let next = match self.phase {
            BattlePhase::CollectInput { focus } => self.collect_input(focus).await,
            BattlePhase::EnemyDecision => self.decide_enemies(),
            BattlePhase::Schedule => Ok(self.schedule()),
            BattlePhase::Execute => self.execute_next().await,
            BattlePhase::CheckEnd => self.check_end(),
            BattlePhase::Won | BattlePhase::Lost | BattlePhase::Ended | BattlePhase::Halted => {
                return Err(CombatError::BattleOver)
            }
        };

        match next {
            Ok(phase) => {
                self.phase = phase;
                Ok(phase)
            }
            Err(err) => {
                tracing::error!("Battle halted in round {}: {}", self.state.round, err);
                self.phase = BattlePhase::Halted;
                Err(err)
            }
        }
    }

    /// Resolve one event against the battle state.
    ///
    /// The battle loop calls this for every popped event. Resolving an event
    /// that already resolved is a broken queue discipline and halts the
    /// battle without touching any resource.
    pub async fn resolve(&mut self, event: &CombatEvent) -> Result<Resolution> {
        if self.queue.is_resolved(event.id()) {
            tracing::error!("{} resolved twice", event.id());
            self.phase = BattlePhase::Halted;
            return Err(CombatError::AlreadyResolvedEvent(event.id()));
        }

        let queue = &self.queue;
        let dropped = EventResolver::drop_reason(event, &self.state, &self.landed, |id| {
            queue.is_suppressed(id)
        });
        if let Some(reason) = dropped {
            self.release_reservation(event);
            self.queue.mark_resolved(event.id())?;
            match reason {
                DropReason::Suppressed => self.stats.suppressed += 1,
                _ => self.stats.dropped += 1,
            }
            tracing::debug!("Dropped {}: {}", event.id(), reason);
            return Ok(Resolution::Dropped(reason));
        }

        self.queue.mark_animating(event.id())?;
        let delay = self.config.animation_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let applied = {
            let mut ctx = ResolverContext {
                state: &mut self.state,
                formula: self.formula.as_ref(),
                rng: &mut self.rolls.damage,
                inventory: self.inventory.as_mut(),
                grimoire: &self.grimoire,
                enchantments: &mut self.enchantments,
                guard_divisor: self.config.guard_divisor,
                landed: &mut self.landed,
            };
            EventResolver::apply(event, &mut ctx)?
        };

        if let Some(cancelled) = applied.suppressed {
            self.queue.suppress(cancelled);
        }
        for text in &applied.texts {
            if let Err(err) = self.sink.play_text(text).await {
                tracing::warn!("Skipped combat text '{}': {}", text.text, err);
            }
        }

        self.queue.mark_resolved(event.id())?;
        self.stats.applied += 1;
        tracing::debug!(
            "Resolved {} ({}) from {}: {:?}",
            event.id(),
            event.action_kind(),
            event.executor(),
            applied.results.iter().map(|r| r.resulting_value).collect::<Vec<_>>()
        );
        self.notices.publish(BattleNotice::EventResolved {
            event: event.id(),
            results: applied.results.to_vec(),
        });
        Ok(Resolution::Applied(applied.results))
    }

    // === Input collection ===

    async fn collect_input(&mut self, focus: usize) -> Result<BattlePhase> {
        if !self.round_open {
            self.begin_round();
        }

        let living: Vec<CombatantId> = self.state.living(Side::Party).map(Combatant::id).collect();
        let Some(&member_id) = living.get(focus) else {
            return Ok(BattlePhase::EnemyDecision);
        };
        let member = self
            .state
            .combatant(member_id)
            .ok_or(CombatError::InvalidExecutor { executor: member_id })?;

        let request = InputRequest {
            member: member_id,
            name: member.name().to_string(),
            focus,
            options: build_menu(member, &self.state, self.inventory.as_ref(), &self.grimoire),
            rejected: self.rejected.take(),
        };
        let selection = self.input.request_action(&request, &self.state).await?;

        let action = match selection {
            Selection::Back => return Ok(self.go_back(&living)),
            Selection::Direct(action) => action,
            Selection::Choose(index) => match request.options.get(index) {
                Some(option) => option.action,
                None => {
                    return Ok(self.reject(
                        focus,
                        CombatError::InvalidSelection {
                            index,
                            available: request.options.len(),
                        },
                    ))
                }
            },
        };

        if action == PlannedAction::Flee {
            return Ok(self.flee());
        }

        match self.enqueue_planned(member_id, action) {
            Ok(_) => {}
            Err(err) if !err.is_fatal() => return Ok(self.reject(focus, err)),
            Err(err) => return Err(err),
        }

        let delay = self.config.input_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if self.cursor.advance() {
            Ok(BattlePhase::CollectInput {
                focus: self.cursor.focus(),
            })
        } else {
            Ok(BattlePhase::EnemyDecision)
        }
    }

    fn begin_round(&mut self) {
        self.state.round += 1;
        self.stats.rounds += 1;
        self.round_open = true;
        let living = self.state.living(Side::Party).count();
        self.cursor.reset(living);
        tracing::info!("Round {} begins", self.state.round);
        self.notices.publish(BattleNotice::RoundStarted {
            round: self.state.round,
        });
    }

    /// Return focus to the previous member and retract their queued action.
    fn go_back(&mut self, living: &[CombatantId]) -> BattlePhase {
        if !self.cursor.retreat() {
            tracing::debug!("Already at the first party member");
            return BattlePhase::CollectInput { focus: 0 };
        }

        let focus = self.cursor.focus();
        if let Some(previous) = living.get(focus) {
            if let Some(event) = self.queue.pop_for(*previous) {
                self.release_reservation(&event);
                self.stats.enqueued = self.stats.enqueued.saturating_sub(1);
                tracing::debug!("Retracted {} for {}", event.id(), previous);
            }
        }
        BattlePhase::CollectInput { focus }
    }

    fn reject(&mut self, focus: usize, err: CombatError) -> BattlePhase {
        tracing::warn!("Rejected input: {}", err);
        self.rejected = Some(err.to_string());
        BattlePhase::CollectInput { focus }
    }

    fn flee(&mut self) -> BattlePhase {
        self.discard_pending();
        tracing::info!("The party escaped in round {}", self.state.round);
        self.notices.publish(BattleNotice::BattleEnded {
            round: self.state.round,
        });
        self.outcome = Some(BattleOutcome::Fled);
        BattlePhase::Ended
    }

    // === Enqueueing ===

    /// Validate a declared action and queue it as a basic event.
    fn enqueue_planned(&mut self, executor: CombatantId, action: PlannedAction) -> Result<EventId> {
        let (side, knows) = match self.state.combatant(executor) {
            Some(actor) if self.state.is_active(executor) && !actor.is_down() => {
                let knows = match action {
                    PlannedAction::CastSpell { spell, .. } => actor.spells.contains(&spell),
                    _ => true,
                };
                (actor.side(), knows)
            }
            _ => return Err(CombatError::InvalidExecutor { executor }),
        };

        let (basic, target) = match action {
            PlannedAction::Attack { target } => {
                self.require_standing(target, None)?;
                (BasicAction::Attack, Some(target))
            }
            PlannedAction::Defend => (BasicAction::Defend, None),
            PlannedAction::UseItem { item, target } => {
                self.require_standing(target, Some(side))?;
                self.inventory.reserve(item)?;
                (BasicAction::UseItem(item), Some(target))
            }
            PlannedAction::CastSpell { spell, target } => {
                let Some(def) = self.grimoire.get(spell).filter(|_| knows) else {
                    return Err(CombatError::UnknownSpell {
                        caster: executor,
                        spell,
                    });
                };
                let target_side = if def.targets_allies() { side } else { side.opponent() };
                self.require_standing(target, Some(target_side))?;
                (BasicAction::CastSpell(spell), Some(target))
            }
            PlannedAction::Flee => {
                return Err(CombatError::InvariantViolation(format!(
                    "{} tried to queue a retreat",
                    executor
                )))
            }
        };

        let event = self.new_event(executor, target, EventKind::Basic(basic));
        let id = event.id();
        tracing::debug!("Queued {} for {}: {:?}", id, executor, action);
        self.queue.push(event);
        self.stats.enqueued += 1;
        Ok(id)
    }

    fn require_standing(&self, target: CombatantId, side: Option<Side>) -> Result<()> {
        let standing = self.state.is_active(target)
            && self.state.combatant(target).is_some_and(|c| !c.is_down());
        let on_side = side.map_or(true, |s| self.state.side_of(target) == Some(s));
        if standing && on_side {
            Ok(())
        } else {
            Err(CombatError::InvalidTarget { target })
        }
    }

    fn new_event(
        &mut self,
        executor: CombatantId,
        target: Option<CombatantId>,
        kind: EventKind,
    ) -> CombatEvent {
        let id = EventId::new(self.next_event_id);
        self.next_event_id += 1;
        let side = self.state.side_of(executor).unwrap_or(Side::Party);
        CombatEvent::new(id, executor, target, orientation_for(side), kind)
    }

    fn release_reservation(&mut self, event: &CombatEvent) {
        if let EventKind::Basic(BasicAction::UseItem(item)) = event.kind() {
            self.inventory.release(item);
        }
    }

    // === Enemy decisions ===

    fn decide_enemies(&mut self) -> Result<BattlePhase> {
        let enemies: Vec<Combatant> = self.state.living(Side::Enemies).cloned().collect();
        for enemy in &enemies {
            let decided = self.enemy_policy.decide(enemy, &self.state, &mut self.rolls.targeting);
            let Some(action) = decided else {
                tracing::debug!("{} has nothing to do", enemy.name());
                continue;
            };
            if action == PlannedAction::Flee {
                tracing::debug!("{} cannot flee", enemy.name());
                continue;
            }
            match self.enqueue_planned(enemy.id(), action) {
                Ok(_) => {}
                Err(err) if !err.is_fatal() => {
                    tracing::warn!("{} declared an invalid action: {}", enemy.name(), err)
                }
                Err(err) => return Err(err),
            }
        }
        Ok(BattlePhase::Schedule)
    }

    // === Scheduling ===

    /// Order the declared actions and materialize enchantment hooks.
    fn schedule(&mut self) -> BattlePhase {
        let declared = self.queue.drain();
        let ordered = self.scheduler.order(declared, &self.state);

        // Built in resolution order, reversed into the queue at the end
        let mut layout = Vec::with_capacity(ordered.len());
        for event in ordered.into_iter().rev() {
            let executor = event.executor();
            let paired = event.id();
            let target = event.target();

            // Pre-attack hooks carry the target of the action they guard
            for attachment in self.hook_ids(executor, HookTiming::PreAttack) {
                let hook = EventKind::PreAttack { attachment, paired };
                layout.push(self.new_event(executor, target, hook));
            }
            let follow_up = matches!(event.kind(), EventKind::Basic(BasicAction::Attack));
            layout.push(event);
            if follow_up {
                for attachment in self.hook_ids(executor, HookTiming::PostAttack) {
                    let hook = EventKind::PostAttack { attachment, paired };
                    layout.push(self.new_event(executor, target, hook));
                }
            }
        }

        let bearers: Vec<CombatantId> = Side::ALL
            .iter()
            .flat_map(|&side| self.state.living(side).map(Combatant::id))
            .collect();
        for bearer in bearers {
            for attachment in self.hook_ids(bearer, HookTiming::PostTurn) {
                layout.push(self.new_event(bearer, None, EventKind::PostTurn { attachment }));
            }
        }

        let hooks = layout.iter().filter(|e| !e.is_basic()).count();
        self.stats.enqueued += hooks as u64;
        tracing::debug!(
            "Round {}: scheduled {} events ({} hooks)",
            self.state.round,
            layout.len(),
            hooks
        );

        layout.reverse();
        self.queue.load(layout);
        BattlePhase::Execute
    }

    fn hook_ids(&self, bearer: CombatantId, timing: HookTiming) -> Vec<AttachmentId> {
        self.enchantments
            .hooks_for(bearer, timing)
            .into_iter()
            .map(|a| a.id)
            .collect()
    }

    // === Execution ===

    async fn execute_next(&mut self) -> Result<BattlePhase> {
        if let Some(event) = self.queue.pop_next() {
            self.resolve(&event).await?;
        }
        Ok(BattlePhase::CheckEnd)
    }

    fn check_end(&mut self) -> Result<BattlePhase> {
        for id in self.state.sweep_fallen() {
            self.enchantments.remove_for_bearer(id);
            let name = self.state.combatant(id).map_or("?", Combatant::name);
            tracing::info!("{} is down", name);
        }
        self.state.check_invariants()?;

        if self.state.is_defeated(Side::Enemies) {
            return Ok(self.win());
        }
        if self.state.is_defeated(Side::Party) {
            return Ok(self.lose());
        }
        if self.queue.is_empty() {
            self.end_round();
            return Ok(BattlePhase::CollectInput { focus: 0 });
        }
        Ok(BattlePhase::Execute)
    }

    fn end_round(&mut self) {
        self.state.clear_guards();
        self.queue.end_round();
        self.inventory.release_all();
        self.landed.clear();
        self.round_open = false;
        tracing::debug!("Round {} complete", self.state.round);
    }

    // === Endings ===

    fn win(&mut self) -> BattlePhase {
        self.discard_pending();
        let spoils = self.collect_spoils();
        tracing::info!(
            "Victory in round {}: {} exp, {} gold",
            self.state.round,
            spoils.experience,
            spoils.gold
        );
        self.notices.publish(BattleNotice::BattleWon {
            round: self.state.round,
        });
        self.outcome = Some(BattleOutcome::Won(spoils));
        BattlePhase::Won
    }

    fn lose(&mut self) -> BattlePhase {
        self.discard_pending();
        tracing::info!("The party fell in round {}", self.state.round);
        self.notices.publish(BattleNotice::BattleLost {
            round: self.state.round,
        });
        self.outcome = Some(BattleOutcome::Lost);
        BattlePhase::Lost
    }

    /// Drop every pending event and reservation.
    fn discard_pending(&mut self) {
        let discarded = self.queue.clear();
        if !discarded.is_empty() {
            tracing::debug!("Discarded {} pending events", discarded.len());
        }
        self.stats.cleared += discarded.len() as u64;
        self.inventory.release_all();
    }

    /// Sum rewards, draw loot and raise flags for every enemy.
    fn collect_spoils(&mut self) -> Spoils {
        let mut spoils = Spoils::default();
        for enemy in self.state.party(Side::Enemies).members() {
            let Some(rewards) = &enemy.rewards else {
                continue;
            };
            spoils.experience += rewards.experience;
            spoils.gold += rewards.gold;

            if let Some(&item) = self.rolls.loot.choose(&rewards.loot_table) {
                if self.inventory.add_item(item) {
                    spoils.items.push(item);
                } else {
                    tracing::warn!("No room for {} dropped by {}", item, enemy.name());
                }
            }
            for &flag in &rewards.flags_when_defeated {
                self.flags.raise(flag);
                spoils.flags.push(flag);
            }
        }
        self.inventory.add_gold(spoils.gold);
        spoils
    }
}

impl std::fmt::Debug for Battle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Battle")
            .field("round", &self.state.round)
            .field("phase", &self.phase)
            .field("pending", &self.queue.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`Battle`].
///
/// Every capability has a default, so only the rosters are required:
/// the standard formula, the configured scheduler, the first-living-target
/// enemy policy, the auto-pilot orchestrator, a silent sink, an empty
/// satchel and flag set.
pub struct BattleBuilder {
    party: Vec<Combatant>,
    enemies: Vec<Combatant>,
    config: BattleConfig,
    formula: Option<Box<dyn Formula>>,
    scheduler: Option<Box<dyn TurnScheduler>>,
    enemy_policy: Option<Box<dyn EnemyPolicy>>,
    input: Option<Box<dyn InputOrchestrator>>,
    sink: Option<Arc<dyn PresentationSink>>,
    notices: Option<NoticeBus>,
    inventory: Option<Box<dyn Inventory>>,
    flags: Option<Box<dyn FlagStore>>,
    grimoire: Grimoire,
    enchantments: Vec<(CombatantId, Arc<dyn Enchantment>, Option<u32>)>,
}

impl BattleBuilder {
    pub fn new(
        party: impl IntoIterator<Item = Combatant>,
        enemies: impl IntoIterator<Item = Combatant>,
    ) -> Self {
        Self {
            party: party.into_iter().collect(),
            enemies: enemies.into_iter().collect(),
            config: BattleConfig::default(),
            formula: None,
            scheduler: None,
            enemy_policy: None,
            input: None,
            sink: None,
            notices: None,
            inventory: None,
            flags: None,
            grimoire: Grimoire::new(),
            enchantments: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_formula(mut self, formula: impl Formula + 'static) -> Self {
        self.formula = Some(Box::new(formula));
        self
    }

    /// Override the scheduler chosen by the configuration.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: impl TurnScheduler + 'static) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    #[must_use]
    pub fn with_enemy_policy(mut self, policy: impl EnemyPolicy + 'static) -> Self {
        self.enemy_policy = Some(Box::new(policy));
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: impl InputOrchestrator + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl PresentationSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Publish notices on an existing bus instead of a fresh one.
    #[must_use]
    pub fn with_notices(mut self, notices: NoticeBus) -> Self {
        self.notices = Some(notices);
        self
    }

    #[must_use]
    pub fn with_inventory(mut self, inventory: impl Inventory + 'static) -> Self {
        self.inventory = Some(Box::new(inventory));
        self
    }

    #[must_use]
    pub fn with_flags(mut self, flags: impl FlagStore + 'static) -> Self {
        self.flags = Some(Box::new(flags));
        self
    }

    #[must_use]
    pub fn with_grimoire(mut self, grimoire: Grimoire) -> Self {
        self.grimoire = grimoire;
        self
    }

    /// Attach an enchantment that lasts until its bearer falls.
    #[must_use]
    pub fn with_enchantment(
        mut self,
        bearer: CombatantId,
        enchantment: Arc<dyn Enchantment>,
    ) -> Self {
        self.enchantments.push((bearer, enchantment, None));
        self
    }

    /// Attach an enchantment that fires at most `uses` times.
    #[must_use]
    pub fn with_enchantment_for(
        mut self,
        bearer: CombatantId,
        enchantment: Arc<dyn Enchantment>,
        uses: u32,
    ) -> Self {
        self.enchantments.push((bearer, enchantment, Some(uses)));
        self
    }

    /// Validate the rosters and assemble the battle.
    pub fn build(self) -> Result<Battle> {
        let state = BattleState::new(self.party, self.enemies)?;

        let mut enchantments = EnchantmentRegistry::new();
        for (bearer, enchantment, uses) in self.enchantments {
            if state.combatant(bearer).is_none() {
                return Err(CombatError::InvalidTarget { target: bearer });
            }
            match uses {
                Some(uses) => enchantments.attach_for(bearer, enchantment, uses),
                None => enchantments.attach(bearer, enchantment),
            };
        }

        let config = self.config;
        let scheduler = self.scheduler.unwrap_or_else(|| scheduler_for(config.scheduler));
        let notices = self
            .notices
            .unwrap_or_else(|| NoticeBus::with_capacity(config.notice_capacity));

        Ok(Battle {
            state,
            phase: BattlePhase::CollectInput { focus: 0 },
            queue: RoundQueue::new(),
            cursor: InputCursor::default(),
            enchantments,
            formula: self.formula.unwrap_or_else(|| Box::new(StandardFormula::default())),
            scheduler,
            enemy_policy: self.enemy_policy.unwrap_or_else(default_policy),
            input: self.input.unwrap_or_else(|| Box::new(AutoPilot)),
            sink: self.sink.unwrap_or_else(|| Arc::new(NullSink)),
            notices,
            inventory: self.inventory.unwrap_or_else(|| Box::new(Satchel::new())),
            flags: self.flags.unwrap_or_else(|| Box::new(FlagSet::new())),
            grimoire: self.grimoire,
            rolls: BattleStreams::new(config.seed),
            next_event_id: 1,
            landed: FxHashMap::default(),
            round_open: false,
            rejected: None,
            stats: BattleStats::default(),
            outcome: None,
            config,
        })
    }
}
