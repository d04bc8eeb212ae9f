//! Routing of pointer input and the click timer into a [`Game`].
//!
//! Both entry points do nothing while the game is paused: the click clock
//! stands still, so a pending right click fires after resuming instead of
//! being dropped.

use crate::core::Game;
use crate::input::{InputHandler, PointerEvent};
use crate::term::{GameView, Layout};
use crate::types::PointerButton;

/// Advance the click clock and apply a due right click.
pub fn advance_input(game: &mut Game, input: &mut InputHandler, elapsed_ms: u32) {
    if game.paused() {
        return;
    }
    if let Some(cmd) = input.update(elapsed_ms) {
        game.apply_block_action(cmd.block, cmd.action);
    }
}

/// Apply a terminal pointer event laid out by `view`.
pub fn handle_pointer(
    game: &mut Game,
    input: &mut InputHandler,
    view: &GameView,
    layout: &Layout,
    pointer: PointerEvent,
) {
    if game.paused() {
        return;
    }
    match pointer {
        PointerEvent::Down {
            button,
            column,
            row,
        } => {
            let Some(point) = view.screen_to_world(layout, column, row) else {
                return;
            };
            let Some(id) = game.block_at(point) else {
                if button == PointerButton::Primary {
                    game.clear_selection();
                }
                return;
            };
            let command = input.pointer_down(id, button);
            if button == PointerButton::Primary && command.is_none() {
                game.begin_drag(point);
            } else {
                game.select_block(id);
            }
            if let Some(cmd) = command {
                game.apply_block_action(cmd.block, cmd.action);
            }
        }
        PointerEvent::Drag { column, row } => {
            if let Some(point) = view.screen_to_world(layout, column, row) {
                game.drag_to(point);
            }
        }
        PointerEvent::Up { .. } => {
            game.end_drag();
        }
    }
}
