//! Key bindings: arrows, WASD and vim keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};

/// Action from a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Swap,
    /// Held: the stack rises at full speed.
    FastRise,
    Pause,
    Restart,
    Quit,
    None,
}

impl Action {
    /// Cursor step (dx, dy) for move actions, row 0 at the top.
    pub fn direction(self) -> Option<(i32, i32)> {
        match self {
            Self::MoveLeft => Some((-1, 0)),
            Self::MoveRight => Some((1, 0)),
            Self::MoveUp => Some((0, -1)),
            Self::MoveDown => Some((0, 1)),
            _ => None,
        }
    }
}

/// Map a key event to an action. Ctrl-C always quits.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers.contains(KeyModifiers::CONTROL) {
        return if code == KeyCode::Char('c') {
            Action::Quit
        } else {
            Action::None
        };
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Left | KeyCode::Char('a' | 'h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('d' | 'l') => Action::MoveRight,
        KeyCode::Up | KeyCode::Char('w' | 'k') => Action::MoveUp,
        KeyCode::Down | KeyCode::Char('s' | 'j') => Action::MoveDown,
        KeyCode::Char(' ' | 'x') | KeyCode::Enter => Action::Swap,
        KeyCode::Char('f' | 'F')
        | KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => {
            Action::FastRise
        }
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_movement_keys() {
        assert_eq!(key_to_action(key(KeyCode::Left)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('d'))), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Char('k'))), Action::MoveUp);
        assert_eq!(key_to_action(key(KeyCode::Down)), Action::MoveDown);
        assert_eq!(Action::MoveUp.direction(), Some((0, -1)));
        assert_eq!(Action::Swap.direction(), None);
    }

    #[test]
    fn test_swap_and_fast_rise() {
        assert_eq!(key_to_action(key(KeyCode::Char(' '))), Action::Swap);
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Swap);
        assert_eq!(key_to_action(key(KeyCode::Char('f'))), Action::FastRise);
        assert_eq!(
            key_to_action(key(KeyCode::Modifier(ModifierKeyCode::LeftShift))),
            Action::FastRise
        );
    }

    #[test]
    fn test_control_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_c), Action::Quit);
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(key_to_action(ctrl_d), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
    }
}
