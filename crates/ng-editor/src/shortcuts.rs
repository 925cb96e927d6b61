//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Bindings differ
//! depending on whether a note's text input has focus or the canvas does.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Focused note ──
    /// Enter: commit non-empty content.
    Commit,
    /// Escape: leave edit mode, discarding an empty note.
    Cancel,

    // ── Canvas ──
    /// Delete / Backspace: remove selected connections.
    DeleteSelection,
    /// Escape: deselect all connections.
    Deselect,
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"Enter"`, `"Delete"`).
    /// `in_note` is set when a note's text input has focus; there Delete and
    /// Backspace edit text and Shift+Enter inserts a newline.
    pub fn resolve(key: &str, modifiers: Modifiers, in_note: bool) -> Option<ShortcutAction> {
        if in_note {
            return match key {
                "Enter" if !modifiers.shift => Some(ShortcutAction::Commit),
                "Escape" => Some(ShortcutAction::Cancel),
                _ => None,
            };
        }

        if modifiers.ctrl || modifiers.meta || modifiers.alt {
            return None;
        }

        match key {
            "Delete" | "Backspace" => Some(ShortcutAction::DeleteSelection),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_note_keys() {
        assert_eq!(
            ShortcutMap::resolve("Enter", Modifiers::NONE, true),
            Some(ShortcutAction::Commit)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE, true),
            Some(ShortcutAction::Cancel)
        );
    }

    #[test]
    fn shift_enter_is_a_newline() {
        assert_eq!(ShortcutMap::resolve("Enter", Modifiers::shift(), true), None);
    }

    #[test]
    fn delete_edits_text_inside_note() {
        assert_eq!(ShortcutMap::resolve("Backspace", Modifiers::NONE, true), None);
        assert_eq!(ShortcutMap::resolve("Delete", Modifiers::NONE, true), None);
    }

    #[test]
    fn resolve_canvas_keys() {
        assert_eq!(
            ShortcutMap::resolve("Delete", Modifiers::NONE, false),
            Some(ShortcutAction::DeleteSelection)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", Modifiers::NONE, false),
            Some(ShortcutAction::DeleteSelection)
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", Modifiers::NONE, false),
            Some(ShortcutAction::Deselect)
        );
        assert_eq!(ShortcutMap::resolve("Enter", Modifiers::NONE, false), None);
    }

    #[test]
    fn cmd_combos_are_unbound() {
        let cmd = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(ShortcutMap::resolve("Backspace", cmd, false), None);
    }
}
