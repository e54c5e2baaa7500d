//! Event resolution - applying one combat event to the battle state.
//!
//! `EventResolver` dispatches on `EventKind` and is the only code that
//! changes a combatant's resources. It is synchronous; pacing and
//! presentation happen around it in the battle loop.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use super::event::{BasicAction, CombatEvent, EventId, EventKind};
use super::result::{CombatResult, CombatResults};
use crate::core::{
    ActionKind, BattleRng, BattleState, Combatant, CombatantId, ItemId, Orientation, Resource,
    Side, SpellId,
};
use crate::effects::{
    Enchantment, EnchantmentContext, EnchantmentError, EnchantmentOutcome, Formula, Grimoire,
    SpellKind,
};
use crate::error::{CombatError, Result};
use crate::presentation::{CombatText, TextColor};
use crate::stores::Inventory;
use crate::triggers::{AttachmentId, EnchantmentRegistry};

/// Why an event was skipped instead of resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// The acting combatant is no longer standing.
    ExecutorDown,
    /// The target fell before the event came up.
    TargetDown,
    /// A pre-attack enchantment cancelled the action.
    Suppressed,
    /// The attack a post-attack hook follows never landed.
    PairedSkipped,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DropReason::ExecutorDown => "executor is down",
            DropReason::TargetDown => "target is down",
            DropReason::Suppressed => "action suppressed",
            DropReason::PairedSkipped => "paired attack did not land",
        };
        write!(f, "{}", reason)
    }
}

/// The outcome of one `resolve` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Applied(CombatResults),
    Dropped(DropReason),
}

impl Resolution {
    /// Results of an applied event. Empty for dropped events.
    #[must_use]
    pub fn results(&self) -> &[CombatResult] {
        match self {
            Resolution::Applied(results) => results,
            Resolution::Dropped(_) => &[],
        }
    }

    #[must_use]
    pub fn is_dropped(&self) -> bool {
        matches!(self, Resolution::Dropped(_))
    }
}

/// What applying an event produced.
#[derive(Clone, Debug, Default)]
pub struct Applied {
    pub results: CombatResults,
    /// Combat text to play, in order.
    pub texts: Vec<CombatText>,
    /// A main action cancelled by this event.
    pub suppressed: Option<EventId>,
}

/// Everything resolution may read or change.
pub struct ResolverContext<'a> {
    pub state: &'a mut BattleState,
    pub formula: &'a dyn Formula,
    pub rng: &'a mut BattleRng,
    pub inventory: &'a mut dyn Inventory,
    pub grimoire: &'a Grimoire,
    pub enchantments: &'a mut EnchantmentRegistry,
    /// Incoming damage divisor for guarded combatants.
    pub guard_divisor: i64,
    /// Signed values of this round's landed attacks, by event.
    pub landed: &'a mut FxHashMap<EventId, i64>,
}

/// Resolves combat events on battle state.
pub struct EventResolver;

impl EventResolver {
    /// Decide whether an event should be skipped.
    ///
    /// `suppressed` tells whether a main action was cancelled this round.
    pub fn drop_reason(
        event: &CombatEvent,
        state: &BattleState,
        landed: &FxHashMap<EventId, i64>,
        suppressed: impl Fn(EventId) -> bool,
    ) -> Option<DropReason> {
        let standing = |id: CombatantId| {
            state.is_active(id) && state.combatant(id).is_some_and(|c| !c.is_down())
        };

        if !standing(event.executor()) {
            return Some(DropReason::ExecutorDown);
        }
        match event.kind() {
            EventKind::Basic(_) => {
                if suppressed(event.id()) {
                    Some(DropReason::Suppressed)
                } else if event.target().is_some_and(|t| !standing(t)) {
                    Some(DropReason::TargetDown)
                } else {
                    None
                }
            }
            EventKind::PreAttack { paired, .. } => {
                if suppressed(paired) {
                    // Already cancelled by an earlier hook
                    Some(DropReason::Suppressed)
                } else if event.target().is_some_and(|t| !standing(t)) {
                    // The guarded action is going nowhere
                    Some(DropReason::TargetDown)
                } else {
                    None
                }
            }
            EventKind::PostAttack { paired, .. } => {
                if suppressed(paired) {
                    Some(DropReason::Suppressed)
                } else if !landed.contains_key(&paired) {
                    Some(DropReason::PairedSkipped)
                } else {
                    None
                }
            }
            EventKind::PostTurn { .. } => None,
        }
    }

    /// Apply an event. Callers must have checked [`Self::drop_reason`].
    pub fn apply(event: &CombatEvent, ctx: &mut ResolverContext<'_>) -> Result<Applied> {
        match event.kind() {
            EventKind::Basic(BasicAction::Attack) => Self::attack(event, ctx),
            EventKind::Basic(BasicAction::Defend) => Ok(Self::defend(event, ctx)),
            EventKind::Basic(BasicAction::UseItem(item)) => Self::use_item(event, item, ctx),
            EventKind::Basic(BasicAction::CastSpell(spell)) => Self::cast_spell(event, spell, ctx),
            EventKind::PreAttack { attachment, paired } => {
                let mut applied = Self::enchant(event, attachment, ctx)?;
                if applied.suppressed.take().is_some() {
                    applied.suppressed = Some(paired);
                }
                Ok(applied)
            }
            EventKind::PostAttack { attachment, .. } | EventKind::PostTurn { attachment } => {
                // Only pre-attack hooks can cancel an action
                let mut applied = Self::enchant(event, attachment, ctx)?;
                applied.suppressed = None;
                Ok(applied)
            }
        }
    }

    // === Basic actions ===

    fn attack(event: &CombatEvent, ctx: &mut ResolverContext<'_>) -> Result<Applied> {
        let target_id = Self::require_target(event)?;
        let value = {
            let attacker = Self::combatant(ctx.state, event.executor())?;
            let target = Self::combatant(ctx.state, target_id)?;
            ctx.formula.attack(attacker, target, ctx.rng)
        };
        let value = Self::guarded(ctx, target_id, value);
        ctx.landed.insert(event.id(), value);

        let executor = Some(event.executor());
        let result = Self::apply_value(ctx, event, executor, target_id, Resource::Hp, value)?;
        let text = Self::value_text(event, target_id, Resource::Hp, value, None);
        Ok(Applied {
            results: smallvec![result],
            texts: vec![text],
            suppressed: None,
        })
    }

    fn defend(event: &CombatEvent, ctx: &mut ResolverContext<'_>) -> Applied {
        let executor = event.executor();
        ctx.state.guard(executor);
        Applied {
            results: smallvec![CombatResult::no_effect(
                event.id(),
                ActionKind::Defend,
                Some(executor),
                executor,
                false
            )],
            texts: vec![CombatText::new("Guard", executor, event.orientation())],
            suppressed: None,
        }
    }

    fn use_item(
        event: &CombatEvent,
        item: ItemId,
        ctx: &mut ResolverContext<'_>,
    ) -> Result<Applied> {
        let target_id = Self::require_target(event)?;
        let Some(def) = ctx.inventory.definition(item) else {
            tracing::warn!("{} used unknown {}", event.executor(), item);
            return Ok(Self::no_effect(event, target_id, "No effect"));
        };
        if !ctx.inventory.consume(item) {
            tracing::warn!("{} had no reserved {} to use", event.executor(), item);
            return Ok(Self::no_effect(event, target_id, "No effect"));
        }

        let resource = def.effect.resource();
        let executor = Some(event.executor());
        let result = Self::apply_value(ctx, event, executor, target_id, resource, def.potency)?;
        let text = Self::value_text(event, target_id, resource, def.potency, None);
        Ok(Applied {
            results: smallvec![result],
            texts: vec![text],
            suppressed: None,
        })
    }

    fn cast_spell(
        event: &CombatEvent,
        spell_id: SpellId,
        ctx: &mut ResolverContext<'_>,
    ) -> Result<Applied> {
        let target_id = Self::require_target(event)?;
        let Some(spell) = ctx.grimoire.get(spell_id) else {
            return Err(CombatError::UnknownSpell {
                caster: event.executor(),
                spell: spell_id,
            });
        };

        let caster_mp = Self::combatant(ctx.state, event.executor())?.current_mp();
        if caster_mp < spell.mp_cost {
            return Ok(Self::no_effect(event, event.executor(), "Not enough MP"));
        }
        ctx.state.apply(event.executor(), Resource::Mp, -spell.mp_cost);

        let value = {
            let caster = Self::combatant(ctx.state, event.executor())?;
            let target = Self::combatant(ctx.state, target_id)?;
            ctx.formula.spell(caster, target, spell, ctx.rng)
        };
        let value = match spell.kind {
            SpellKind::Harm => Self::guarded(ctx, target_id, value),
            SpellKind::Mend => value,
        };

        let executor = Some(event.executor());
        let result = Self::apply_value(ctx, event, executor, target_id, Resource::Hp, value)?;
        let text = Self::value_text(event, target_id, Resource::Hp, value, None);
        Ok(Applied {
            results: smallvec![result],
            texts: vec![text],
            suppressed: None,
        })
    }

    // === Enchantment hooks ===

    fn enchant(
        event: &CombatEvent,
        attachment: AttachmentId,
        ctx: &mut ResolverContext<'_>,
    ) -> Result<Applied> {
        let bearer = event.executor();
        let attached = ctx.enchantments.get(attachment).map(|a| Arc::clone(&a.enchantment));
        let Some(enchantment) = attached else {
            tracing::debug!("{} was detached before {} resolved", attachment, event.id());
            return Ok(Self::no_effect(event, bearer, "No effect"));
        };

        let outcome = Self::enchantment_outcome(event, enchantment.as_ref(), ctx)?;
        ctx.enchantments.consume_use(attachment);

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("{} on {} failed: {}", enchantment.name(), bearer, err);
                return Ok(Self::no_effect(event, bearer, "No effect"));
            }
        };

        // Post-turn effects have no acting combatant
        let executor = match event.kind() {
            EventKind::PostTurn { .. } => None,
            _ => Some(bearer),
        };

        let mut applied = Applied::default();
        if outcome.suppress {
            tracing::info!("{} cannot act: {}", bearer, enchantment.name());
            applied.suppressed = Some(event.id());
        }

        let affected: Vec<CombatantId> = if outcome.affected.is_empty() {
            vec![bearer]
        } else {
            outcome.affected.iter().copied().collect()
        };
        for target in affected {
            match ctx.state.combatant(target) {
                None => {
                    tracing::warn!("{} named unknown {}", enchantment.name(), target);
                    continue;
                }
                // The fallen stay down
                Some(c) if c.is_down() || !ctx.state.is_active(target) => {
                    tracing::debug!("{} skipped fallen {}", enchantment.name(), target);
                    continue;
                }
                Some(_) => {}
            }
            let result =
                Self::apply_value(ctx, event, executor, target, outcome.resource, outcome.value)?;
            applied.results.push(result);
            applied.texts.push(Self::outcome_text(event, target, &outcome));
        }
        Ok(applied)
    }

    /// Build the hook context and run the enchantment.
    ///
    /// The outer `Result` carries engine errors, the inner one the
    /// enchantment's own failure, which is recovered.
    fn enchantment_outcome(
        event: &CombatEvent,
        enchantment: &dyn Enchantment,
        ctx: &ResolverContext<'_>,
    ) -> Result<std::result::Result<EnchantmentOutcome, EnchantmentError>> {
        let state: &BattleState = &*ctx.state;
        let bearer = Self::combatant(state, event.executor())?;
        let side = bearer.side();
        let hook_ctx = match event.kind() {
            EventKind::PreAttack { .. } => EnchantmentContext::solo(bearer),
            EventKind::PostAttack { paired, .. } => EnchantmentContext {
                enchanted: bearer,
                other: event.target().and_then(|t| state.combatant(t)),
                allies: Some(state.party(side)),
                opponents: Some(state.party(side.opponent())),
                main_result: ctx.landed.get(&paired).copied(),
            },
            EventKind::PostTurn { .. } => EnchantmentContext {
                allies: Some(state.party(side)),
                ..EnchantmentContext::solo(bearer)
            },
            EventKind::Basic(_) => {
                return Err(CombatError::InvariantViolation(format!(
                    "{} is not an enchantment hook",
                    event.id()
                )))
            }
        };
        Ok(enchantment.apply(&hook_ctx))
    }

    // === Helpers ===

    fn require_target(event: &CombatEvent) -> Result<CombatantId> {
        event
            .target()
            .ok_or_else(|| CombatError::InvariantViolation(format!("{} has no target", event.id())))
    }

    fn combatant(state: &BattleState, id: CombatantId) -> Result<&Combatant> {
        state.combatant(id).ok_or(CombatError::InvalidTarget { target: id })
    }

    /// Reduce incoming damage on a guarded combatant, never below 1.
    fn guarded(ctx: &ResolverContext<'_>, target: CombatantId, value: i64) -> i64 {
        if value >= 0 || !ctx.state.is_guarded(target) {
            return value;
        }
        let reduced = value / ctx.guard_divisor.max(1);
        if reduced == 0 {
            -1
        } else {
            reduced
        }
    }

    fn apply_value(
        ctx: &mut ResolverContext<'_>,
        event: &CombatEvent,
        executor: Option<CombatantId>,
        target: CombatantId,
        resource: Resource,
        value: i64,
    ) -> Result<CombatResult> {
        ctx.state
            .apply(target, resource, value)
            .ok_or(CombatError::InvalidTarget { target })?;
        let down = ctx.state.combatant(target).is_some_and(|c| c.is_down());
        let kind = event.action_kind();
        let result =
            CombatResult::new(event.id(), kind, executor, target, value, down).on(resource);
        ctx.state.record(result.clone());
        Ok(result)
    }

    fn no_effect(event: &CombatEvent, target: CombatantId, label: &str) -> Applied {
        let executor = match event.kind() {
            EventKind::PostTurn { .. } => None,
            _ => Some(event.executor()),
        };
        Applied {
            results: smallvec![CombatResult::no_effect(
                event.id(),
                event.action_kind(),
                executor,
                target,
                false
            )],
            texts: vec![CombatText::new(label, target, event.orientation())],
            suppressed: None,
        }
    }

    fn value_text(
        event: &CombatEvent,
        anchor: CombatantId,
        resource: Resource,
        value: i64,
        color: Option<TextColor>,
    ) -> CombatText {
        let text = match value {
            0 => "Miss".to_string(),
            v if v < 0 => (-v).to_string(),
            v => format!("+{}", v),
        };
        let color = color.unwrap_or(match resource {
            Resource::Mp if value > 0 => TextColor::Blue,
            _ => TextColor::for_value(value),
        });
        CombatText::new(text, anchor, event.orientation()).with_color(color)
    }

    fn outcome_text(
        event: &CombatEvent,
        anchor: CombatantId,
        outcome: &EnchantmentOutcome,
    ) -> CombatText {
        let color = Some(outcome.color);
        match &outcome.label {
            Some(label) => CombatText::new(label.clone(), anchor, event.orientation())
                .with_color(outcome.color),
            None => Self::value_text(event, anchor, outcome.resource, outcome.value, color),
        }
    }
}

/// Presentation facing for a side.
#[must_use]
pub fn orientation_for(side: Side) -> Orientation {
    match side {
        Side::Party => Orientation::Left,
        Side::Enemies => Orientation::Right,
    }
}
