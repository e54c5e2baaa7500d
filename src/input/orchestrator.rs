//! Party input collection.
//!
//! The battle asks an [`InputOrchestrator`] for one selection per living
//! party member per round, in roster order. The orchestrator can pick a menu
//! option, submit an action directly, or go back to the previous member.

use std::collections::VecDeque;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{BattleState, Combatant, CombatantId, PlannedAction, Side};
use crate::effects::Grimoire;
use crate::error::{CombatError, Result};
use crate::stores::Inventory;

/// One labeled choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuOption {
    pub label: String,
    pub action: PlannedAction,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, action: PlannedAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// What the battle hands the orchestrator when it needs a decision.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRequest {
    /// The party member deciding.
    pub member: CombatantId,
    pub name: String,
    /// Position of the member among the living party this round.
    pub focus: usize,
    pub options: Vec<MenuOption>,
    /// Why the previous answer for this member was refused, if it was.
    pub rejected: Option<String>,
}

impl InputRequest {
    /// Can this member go back to the previous one?
    #[must_use]
    pub fn can_retreat(&self) -> bool {
        self.focus > 0
    }

    /// Index of the first option with this label.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<usize> {
        self.options.iter().position(|o| o.label == label)
    }
}

/// The orchestrator's answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Pick the menu option at this index.
    Choose(usize),
    /// Submit an action without going through the menu.
    Direct(PlannedAction),
    /// Escape: return to the previous member.
    Back,
}

/// Source of party decisions (UI, scripts, AI).
#[async_trait]
pub trait InputOrchestrator: Send {
    /// Ask for one member's decision.
    ///
    /// Returning `CombatError::InputClosed` ends the battle with an error.
    async fn request_action(
        &mut self,
        request: &InputRequest,
        state: &BattleState,
    ) -> Result<Selection>;
}

/// Focus position within one round's input collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCursor {
    focus: usize,
    len: usize,
}

impl InputCursor {
    /// A cursor over `len` members, focused on the first.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { focus: 0, len }
    }

    #[must_use]
    pub fn focus(&self) -> usize {
        self.focus
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every member has confirmed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.focus >= self.len
    }

    /// Move to the next member. Returns `true` if one remains.
    pub fn advance(&mut self) -> bool {
        if self.focus < self.len {
            self.focus += 1;
        }
        !self.is_complete()
    }

    /// Move back one member. Returns `false` (and stays put) at the first.
    pub fn retreat(&mut self) -> bool {
        if self.focus == 0 {
            return false;
        }
        self.focus -= 1;
        true
    }

    /// Start over for a new round.
    pub fn reset(&mut self, len: usize) {
        self.focus = 0;
        self.len = len;
    }
}

/// Build the flattened choice menu for one member.
///
/// Order: attacks, defend, spells, items, run.
pub fn build_menu(
    member: &Combatant,
    state: &BattleState,
    inventory: &dyn Inventory,
    grimoire: &Grimoire,
) -> Vec<MenuOption> {
    let mut options = Vec::new();

    for enemy in state.living(Side::Enemies) {
        options.push(MenuOption::new(
            format!("Attack > {}", enemy.name()),
            PlannedAction::Attack { target: enemy.id() },
        ));
    }

    options.push(MenuOption::new("Defend", PlannedAction::Defend));

    for spell in member.spells.iter().filter_map(|&id| grimoire.get(id)) {
        let side = if spell.targets_allies() { Side::Party } else { Side::Enemies };
        for target in state.living(side) {
            options.push(MenuOption::new(
                format!("{} ({} MP) > {}", spell.name, spell.mp_cost, target.name()),
                PlannedAction::CastSpell {
                    spell: spell.id,
                    target: target.id(),
                },
            ));
        }
    }

    for (item, available) in inventory.consumables() {
        for target in state.living(Side::Party) {
            options.push(MenuOption::new(
                format!("{} x{} > {}", item.name, available, target.name()),
                PlannedAction::UseItem {
                    item: item.id,
                    target: target.id(),
                },
            ));
        }
    }

    options.push(MenuOption::new("Run", PlannedAction::Flee));
    options
}

// =============================================================================
// Orchestrators
// =============================================================================

/// Plays back a fixed list of selections. Fails with `InputClosed` when empty.
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    selections: VecDeque<Selection>,
}

impl ScriptedInput {
    pub fn new(selections: impl IntoIterator<Item = Selection>) -> Self {
        Self {
            selections: selections.into_iter().collect(),
        }
    }

    /// Selections not yet played.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.selections.len()
    }
}

#[async_trait]
impl InputOrchestrator for ScriptedInput {
    async fn request_action(
        &mut self,
        request: &InputRequest,
        _state: &BattleState,
    ) -> Result<Selection> {
        let selection = self.selections.pop_front().ok_or(CombatError::InputClosed)?;
        tracing::debug!("Scripted input for {}: {:?}", request.member, selection);
        Ok(selection)
    }
}

/// Always attacks the first living enemy. For headless simulation.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoPilot;

#[async_trait]
impl InputOrchestrator for AutoPilot {
    async fn request_action(
        &mut self,
        request: &InputRequest,
        state: &BattleState,
    ) -> Result<Selection> {
        match state.living(Side::Enemies).next() {
            Some(enemy) => Ok(Selection::Direct(PlannedAction::Attack { target: enemy.id() })),
            None => request
                .find("Defend")
                .map(Selection::Choose)
                .ok_or(CombatError::InputClosed),
        }
    }
}
