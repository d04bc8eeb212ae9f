//! Key and mouse mapping from terminal events to game input.

use crate::types::{BlockAction, GameAction, PointerButton};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    match key.code {
        // Flips
        KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('H') => {
            Some(GameAction::Block(BlockAction::FlipHorizontal))
        }
        KeyCode::Up | KeyCode::Down | KeyCode::Char('v') | KeyCode::Char('V') => {
            Some(GameAction::Block(BlockAction::FlipVertical))
        }

        // Rotation
        KeyCode::Char('e') | KeyCode::Char('E') | KeyCode::Char('.') => {
            Some(GameAction::Block(BlockAction::RotateCw))
        }
        KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Char(',') => {
            Some(GameAction::Block(BlockAction::RotateCcw))
        }

        // Block and game control
        KeyCode::Char('x') | KeyCode::Char('X') | KeyCode::Backspace => {
            Some(GameAction::Block(BlockAction::Reset))
        }
        KeyCode::Tab => Some(GameAction::SelectNext),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(GameAction::Pause),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Reset),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Pointer input in terminal cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Down {
        button: PointerButton,
        column: u16,
        row: u16,
    },
    /// Primary button held while moving
    Drag { column: u16, row: u16 },
    /// Primary button released
    Up { column: u16, row: u16 },
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => None,
    }
}

/// Map a crossterm mouse event. Scrolling, plain moves, and middle button
/// events are ignored.
pub fn map_mouse_event(event: MouseEvent) -> Option<PointerEvent> {
    let (column, row) = (event.column, event.row);
    match event.kind {
        MouseEventKind::Down(button) => Some(PointerEvent::Down {
            button: pointer_button(button)?,
            column,
            row,
        }),
        MouseEventKind::Drag(MouseButton::Left) => Some(PointerEvent::Drag { column, row }),
        MouseEventKind::Up(MouseButton::Left) => Some(PointerEvent::Up { column, row }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_flip_keys() {
        for code in [KeyCode::Left, KeyCode::Right, KeyCode::Char('h'), KeyCode::Char('H')] {
            assert_eq!(
                handle_key_event(KeyEvent::from(code)),
                Some(GameAction::Block(BlockAction::FlipHorizontal))
            );
        }
        for code in [KeyCode::Up, KeyCode::Down, KeyCode::Char('v')] {
            assert_eq!(
                handle_key_event(KeyEvent::from(code)),
                Some(GameAction::Block(BlockAction::FlipVertical))
            );
        }
    }

    #[test]
    fn test_rotation_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('e'))),
            Some(GameAction::Block(BlockAction::RotateCw))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('.'))),
            Some(GameAction::Block(BlockAction::RotateCw))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('W'))),
            Some(GameAction::Block(BlockAction::RotateCcw))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char(','))),
            Some(GameAction::Block(BlockAction::RotateCcw))
        );
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Backspace)),
            Some(GameAction::Block(BlockAction::Reset))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Tab)),
            Some(GameAction::SelectNext)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('p'))),
            Some(GameAction::Pause)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('r'))),
            Some(GameAction::Reset)
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('x'))));
    }

    #[test]
    fn test_mouse_mapping() {
        assert_eq!(
            map_mouse_event(mouse(MouseEventKind::Down(MouseButton::Right), 4, 9)),
            Some(PointerEvent::Down {
                button: PointerButton::Secondary,
                column: 4,
                row: 9
            })
        );
        assert_eq!(
            map_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 5, 6)),
            Some(PointerEvent::Drag { column: 5, row: 6 })
        );
        assert_eq!(
            map_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 5, 6)),
            Some(PointerEvent::Up { column: 5, row: 6 })
        );
        assert_eq!(map_mouse_event(mouse(MouseEventKind::Down(MouseButton::Middle), 0, 0)), None);
        assert_eq!(map_mouse_event(mouse(MouseEventKind::Moved, 1, 1)), None);
        assert_eq!(map_mouse_event(mouse(MouseEventKind::ScrollUp, 1, 1)), None);
    }
}
