//! Floating combat text handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::core::{CombatantId, Orientation};

/// Named colors for combat text. The presentation layer maps them to pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextColor {
    #[default]
    White,
    /// Damage.
    Red,
    /// Healing.
    Green,
    /// Mana.
    Blue,
    /// Status effects.
    Yellow,
    /// Poison and drain.
    Purple,
}

impl TextColor {
    /// Conventional color for a signed HP change.
    #[must_use]
    pub fn for_value(value: i64) -> Self {
        match value {
            v if v < 0 => TextColor::Red,
            v if v > 0 => TextColor::Green,
            _ => TextColor::White,
        }
    }
}

/// One line of combat text anchored on a combatant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatText {
    pub text: String,
    pub color: TextColor,
    /// The combatant the text floats above.
    pub anchor: CombatantId,
    /// Facing of the acting sprite, for offsetting animations.
    pub orientation: Orientation,
}

impl CombatText {
    pub fn new(text: impl Into<String>, anchor: CombatantId, orientation: Orientation) -> Self {
        Self {
            text: text.into(),
            color: TextColor::White,
            anchor,
            orientation,
        }
    }

    /// Set the color (builder pattern).
    #[must_use]
    pub fn with_color(mut self, color: TextColor) -> Self {
        self.color = color;
        self
    }
}

impl std::fmt::Display for CombatText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_for_value() {
        assert_eq!(TextColor::for_value(-3), TextColor::Red);
        assert_eq!(TextColor::for_value(3), TextColor::Green);
        assert_eq!(TextColor::for_value(0), TextColor::White);
    }

    #[test]
    fn test_builder_and_display() {
        let text = CombatText::new("12", CombatantId::new(1), Orientation::Left)
            .with_color(TextColor::Blue);
        assert_eq!(text.color, TextColor::Blue);
        assert_eq!(text.to_string(), "12");
    }
}
