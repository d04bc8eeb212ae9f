use brainbox::core::{normalize_angle, Game, GameEvent, ShapeDef, Vec2};
use brainbox::input::{BlockCommand, InputHandler, PointerEvent};
use brainbox::play::{advance_input, handle_pointer};
use brainbox::term::{GameView, Layout, Viewport};
use brainbox::types::{BlockAction, GameConfig, PointerButton, Rgb, RIGHT_CLICK_MS, TICK_MS};

/// One diamond of four grid cells and a single square block that fills it
fn tiny_game() -> Game {
    let mut config = GameConfig::default();
    config.grid.rows = 3;
    config.grid.cols = 3;
    let square = ShapeDef::new(
        [[1, 1, 0], [1, 1, 0], [0, 0, 0], [0, 0, 0]],
        Rgb::new(0x19, 0x33, 0x76),
    );
    Game::from_parts(config, vec![square], 0)
}

#[test]
fn drag_through_terminal_coordinates_completes_puzzle() {
    let mut game = tiny_game();
    game.start();
    game.tick(TICK_MS);

    let view = GameView::default();
    let layout = view.layout(Vec2::new(900.0, 700.0), Viewport::new(100, 30));

    let grab = game.block(0).unwrap().reference_point().unwrap();
    assert_eq!(game.begin_drag(grab), Some(0));

    // Drop with the reference cell on the top cell of the diamond
    let (col, row) = view.world_to_screen(&layout, Vec2::new(225.0, 320.0)).unwrap();
    let target = view.screen_to_world(&layout, col, row).unwrap();
    game.drag_to(target);
    assert_eq!(game.end_drag(), Some(true));

    assert!(game.is_completed());
    assert_eq!(game.grid().occupied_count(), 4);
    assert_eq!(
        game.take_events(),
        vec![
            GameEvent::Snapped { block: 0 },
            GameEvent::Completed {
                elapsed_ms: u64::from(TICK_MS)
            }
        ]
    );
}

#[test]
fn double_click_rotates_counter_clockwise() {
    let mut game = tiny_game();
    game.start();
    let mut input = InputHandler::new();

    assert_eq!(input.pointer_down(0, PointerButton::Primary), None);
    input.update(120);
    let cmd = input.pointer_down(0, PointerButton::Primary).unwrap();
    assert_eq!(cmd, BlockCommand::new(0, BlockAction::RotateCcw));

    let before = game.block(0).unwrap().rotation();
    assert!(game.apply_block_action(cmd.block, cmd.action));
    assert_eq!(game.block(0).unwrap().rotation(), normalize_angle(before - 90.0));
}

#[test]
fn slow_second_click_is_not_a_double_click() {
    let mut input = InputHandler::new();
    assert_eq!(input.pointer_down(0, PointerButton::Primary), None);
    input.update(300);
    assert_eq!(input.pointer_down(0, PointerButton::Primary), None);
}

#[test]
fn single_right_click_flips_after_delay() {
    let mut game = tiny_game();
    game.start();
    let mut input = InputHandler::new();

    assert_eq!(input.pointer_down(0, PointerButton::Secondary), None);
    assert_eq!(input.update(RIGHT_CLICK_MS - 1), None);
    let cmd = input.update(1).unwrap();
    assert_eq!(cmd, BlockCommand::new(0, BlockAction::FlipHorizontal));

    game.apply_block_action(cmd.block, cmd.action);
    assert!(game.block(0).unwrap().physics().flipped_x);
}

#[test]
fn double_right_click_rotates_clockwise_without_flipping() {
    let mut game = tiny_game();
    game.start();
    let mut input = InputHandler::new();

    input.pointer_down(0, PointerButton::Secondary);
    input.update(100);
    let cmd = input.pointer_down(0, PointerButton::Secondary).unwrap();
    assert_eq!(cmd.action, BlockAction::RotateCw);
    assert_eq!(input.update(RIGHT_CLICK_MS), None);

    let before = game.block(0).unwrap().rotation();
    game.apply_block_action(cmd.block, cmd.action);
    let block = game.block(0).unwrap();
    assert_eq!(block.rotation(), normalize_angle(before + 90.0));
    assert!(!block.physics().flipped_x);
}

/// Screen cell over block 0's reference cell
fn block_cell(game: &Game, view: &GameView, layout: &Layout) -> (u16, u16) {
    let point = game.block(0).unwrap().reference_point().unwrap();
    let (column, row) = view.world_to_screen(layout, point).unwrap();
    let back = view.screen_to_world(layout, column, row).unwrap();
    assert_eq!(game.block_at(back), Some(0));
    (column, row)
}

#[test]
fn right_click_waits_out_a_pause() {
    let mut game = tiny_game();
    game.start();
    let mut input = InputHandler::new();
    let view = GameView::default();
    let layout = view.layout(Vec2::new(900.0, 700.0), Viewport::new(200, 60));
    let (column, row) = block_cell(&game, &view, &layout);

    let press = PointerEvent::Down {
        button: PointerButton::Secondary,
        column,
        row,
    };
    handle_pointer(&mut game, &mut input, &view, &layout, press);
    assert_eq!(game.selected(), Some(0));
    assert_eq!(input.pending_flip(), Some(0));

    game.pause();
    advance_input(&mut game, &mut input, RIGHT_CLICK_MS * 4);
    assert_eq!(input.pending_flip(), Some(0));
    assert!(!game.block(0).unwrap().physics().flipped_x);

    game.resume();
    advance_input(&mut game, &mut input, RIGHT_CLICK_MS);
    assert_eq!(input.pending_flip(), None);
    assert!(game.block(0).unwrap().physics().flipped_x);
}

#[test]
fn pointer_is_ignored_while_paused() {
    let mut game = tiny_game();
    game.start();
    let mut input = InputHandler::new();
    let view = GameView::default();
    let layout = view.layout(Vec2::new(900.0, 700.0), Viewport::new(200, 60));
    let (column, row) = block_cell(&game, &view, &layout);

    game.pause();
    for button in [PointerButton::Primary, PointerButton::Secondary] {
        let press = PointerEvent::Down {
            button,
            column,
            row,
        };
        handle_pointer(&mut game, &mut input, &view, &layout, press);
    }
    assert_eq!(game.selected(), None);
    assert_eq!(game.dragging(), None);
    assert_eq!(input.pending_flip(), None);

    game.resume();
    let press = PointerEvent::Down {
        button: PointerButton::Primary,
        column,
        row,
    };
    handle_pointer(&mut game, &mut input, &view, &layout, press);
    assert_eq!(game.dragging(), Some(0));
    handle_pointer(&mut game, &mut input, &view, &layout, PointerEvent::Up { column, row });
    assert_eq!(game.dragging(), None);
}

#[test]
fn completion_survives_later_actions_and_reset_clears_it() {
    let mut game = tiny_game();
    game.start();
    let grab = game.block(0).unwrap().reference_point().unwrap();
    game.begin_drag(grab);
    game.drag_to(Vec2::new(225.0, 320.0));
    game.end_drag();
    assert!(game.is_completed());

    game.apply_block_action(0, BlockAction::FlipVertical);
    assert!(game.is_completed());

    game.reset();
    assert!(!game.is_completed());
    assert_eq!(game.grid().occupied_count(), 0);
    game.tick(TICK_MS);
    assert_eq!(game.elapsed_ms(), u64::from(TICK_MS));
}

#[test]
fn default_game_deals_base_and_extra_shapes() {
    let game = Game::new(42);
    assert_eq!(game.grid().len(), 50);
    assert_eq!(game.blocks().len(), 14);
    // every block starts inside the canvas
    for block in game.blocks() {
        let (min, max) = block.world_bounds().unwrap();
        assert!(min.x >= -1e-3 && min.y >= -1e-3, "{min:?}");
        assert!(max.x <= 900.001 && max.y <= 700.001, "{max:?}");
    }
}
