//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.
//!
//! World coordinates are scaled onto terminal cells: by default one column
//! spans 15 world units and one row 30, so the 30-unit lattice spacing of
//! the grid lands on whole rows and every second column. Each block or
//! grid cell is drawn two columns wide, ending at the column of its center.

use crate::core::{GameSnapshot, Vec2};
use crate::fb::{blend, CellStyle, FrameBuffer, Rgb};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorY {
    Center,
    Top,
}

/// Placement of the play area inside the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// First column and row inside the frame
    pub origin_x: u16,
    pub origin_y: u16,
    /// Play area size in terminal cells
    pub cols: u16,
    pub rows: u16,
    /// World point drawn at the top-left play cell; aligns the grid lattice
    /// with whole cells
    pub world_offset: Vec2,
}

impl Layout {
    pub fn frame_x(&self) -> u16 {
        self.origin_x.saturating_sub(1)
    }

    pub fn frame_y(&self) -> u16 {
        self.origin_y.saturating_sub(1)
    }

    pub fn frame_w(&self) -> u16 {
        self.cols + 2
    }

    pub fn frame_h(&self) -> u16 {
        self.rows + 2
    }
}

const PLAY_BG: Rgb = Rgb::new(30, 30, 40);
const BANNER_FG: Rgb = Rgb::new(0xff, 0x6b, 0x6b);
const PANEL_MIN_WIDTH: u16 = 12;

const HELP: [(&str, &str); 8] = [
    ("drag", "move block"),
    ("L L", "rotate ccw"),
    ("R", "flip"),
    ("R R", "rotate cw"),
    ("h v", "flip h / v"),
    ("e w", "rotate cw / ccw"),
    ("x tab", "reset / next"),
    ("r p q", "new / pause / quit"),
];

/// A lightweight terminal renderer for the puzzle.
pub struct GameView {
    /// World units per terminal column.
    units_per_col: f32,
    /// World units per terminal row.
    units_per_row: f32,
    anchor_y: AnchorY,
}

impl Default for GameView {
    fn default() -> Self {
        // 2:1 compensates for typical terminal glyph aspect ratio.
        Self::new(15.0, 30.0)
    }
}

impl GameView {
    pub fn new(units_per_col: f32, units_per_row: f32) -> Self {
        Self {
            units_per_col,
            units_per_row,
            anchor_y: AnchorY::Center,
        }
    }

    pub fn with_anchor_y(mut self, anchor_y: AnchorY) -> Self {
        self.anchor_y = anchor_y;
        self
    }

    /// Where the play area for a `canvas` sized world goes in `viewport`
    pub fn layout(&self, canvas: Vec2, viewport: Viewport) -> Layout {
        // The grid is centered on (width / 4, height / 2)
        let world_offset = Vec2::new(
            (canvas.x / 4.0) % self.units_per_col,
            (canvas.y / 2.0) % self.units_per_row,
        );
        let cols = ((canvas.x - world_offset.x) / self.units_per_col).floor() as u16 + 1;
        let rows = ((canvas.y - world_offset.y) / self.units_per_row).floor() as u16 + 1;
        let panel = PANEL_MIN_WIDTH + 12;
        let total_w = cols + 2 + panel;
        let frame_x = viewport.width.saturating_sub(total_w) / 2;
        let frame_y = match self.anchor_y {
            AnchorY::Center => viewport.height.saturating_sub(rows + 2) / 2,
            AnchorY::Top => 0,
        };
        Layout {
            origin_x: frame_x + 1,
            origin_y: frame_y + 1,
            cols,
            rows,
            world_offset,
        }
    }

    /// Terminal cell of a world point, or None outside the play area
    pub fn world_to_screen(&self, layout: &Layout, point: Vec2) -> Option<(u16, u16)> {
        let local = point - layout.world_offset;
        let col = (local.x / self.units_per_col).round();
        let row = (local.y / self.units_per_row).round();
        if col < 0.0 || row < 0.0 || col >= layout.cols as f32 || row >= layout.rows as f32 {
            return None;
        }
        Some((layout.origin_x + col as u16, layout.origin_y + row as u16))
    }

    /// World point under a terminal cell, or None outside the play area.
    ///
    /// The point is the middle of the cell horizontally, so either half of
    /// a two-column block cell maps inside that cell.
    pub fn screen_to_world(&self, layout: &Layout, col: u16, row: u16) -> Option<Vec2> {
        let lc = col.checked_sub(layout.origin_x)?;
        let lr = row.checked_sub(layout.origin_y)?;
        if lc >= layout.cols || lr >= layout.rows {
            return None;
        }
        Some(
            layout.world_offset
                + Vec2::new(
                    lc as f32 * self.units_per_col + self.units_per_col / 2.0,
                    lr as f32 * self.units_per_row,
                ),
        )
    }

    /// Render the snapshot into an existing framebuffer.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when
    /// the terminal size changes.
    pub fn render_into(&self, snap: &GameSnapshot, viewport: Viewport, fb: &mut FrameBuffer) {
        self.render_into_with_status(snap, None, viewport, fb);
    }

    /// Like [`GameView::render_into`] with a status line under the help text
    pub fn render_into_with_status(
        &self,
        snap: &GameSnapshot,
        status: Option<&str>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let layout = self.layout(snap.canvas, viewport);
        let border = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));

        fb.fill_rect(
            layout.origin_x,
            layout.origin_y,
            layout.cols,
            layout.rows,
            ' ',
            CellStyle::new(Rgb::new(80, 80, 90), PLAY_BG),
        );
        draw_border(fb, &layout, border);

        let empty = CellStyle::new(Rgb::new(90, 90, 100), PLAY_BG).dim();
        for cell in snap.grid.iter().filter(|c| c.owner.is_none()) {
            self.draw_world_cell(fb, &layout, cell.center, '·', empty);
        }

        for block in &snap.blocks {
            let fg = blend(block.color.fill, PLAY_BG, block.opacity);
            let mut style = CellStyle::new(fg, PLAY_BG);
            let ch = if block.selected {
                style = style.bold();
                '▓'
            } else {
                '█'
            };
            for cell in &block.cells {
                self.draw_world_cell(fb, &layout, cell.center, ch, style);
            }
        }

        self.draw_side_panel(fb, snap, status, viewport, &layout);

        if snap.paused {
            draw_overlay_text(fb, &layout, "PAUSED", CellStyle::default().bold());
        } else if snap.banner.visible {
            let fg = blend(BANNER_FG, Rgb::new(0, 0, 0), snap.banner.opacity);
            let style = CellStyle::new(fg, Rgb::new(255, 255, 255)).bold();
            draw_overlay_text(fb, &layout, " PUZZLE COMPLETE! ", style);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, viewport, &mut fb);
        fb
    }

    fn draw_world_cell(
        &self,
        fb: &mut FrameBuffer,
        layout: &Layout,
        center: Vec2,
        ch: char,
        style: CellStyle,
    ) {
        let Some((x, y)) = self.world_to_screen(layout, center) else {
            return;
        };
        if x > layout.origin_x {
            fb.put_char(x - 1, y, ch, style);
        }
        fb.put_char(x, y, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        status: Option<&str>,
        viewport: Viewport,
        layout: &Layout,
    ) {
        let panel_x = layout.frame_x() + layout.frame_w() + 2;
        if panel_x >= viewport.width || viewport.width - panel_x < PANEL_MIN_WIDTH {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), Rgb::new(0, 0, 0));
        let dim = value.dim();

        let mut y = layout.frame_y();
        fb.put_str(panel_x, y, "BRAIN BOX", label);
        y += 2;

        fb.put_str(panel_x, y, "TIME", label);
        fb.put_str(panel_x, y + 1, &format_elapsed(snap.elapsed_ms), value);
        y += 3;

        fb.put_str(panel_x, y, "PLACED", label);
        fb.put_str(
            panel_x,
            y + 1,
            &format!("{}/{}", snap.placed_cells, snap.total_cells),
            value,
        );
        y += 3;

        fb.put_str(panel_x, y, "SELECTED", label);
        match snap.selected {
            Some(id) => {
                fb.put_char(panel_x, y + 1, '#', value);
                fb.put_u32(panel_x + 1, y + 1, id as u32, value);
            }
            None => fb.put_str(panel_x, y + 1, "-", value),
        }
        y += 3;

        fb.put_str(panel_x, y, "SEED", label);
        fb.put_u32(panel_x, y + 1, snap.seed, value);
        y += 3;

        for (keys, what) in HELP {
            if y >= viewport.height {
                break;
            }
            fb.put_str(panel_x, y, keys, value);
            fb.put_str(panel_x + 6, y, what, dim);
            y += 1;
        }

        if let Some(status) = status {
            let y = (y + 1).min(viewport.height.saturating_sub(1));
            fb.put_str(panel_x, y, status, value);
        }
    }
}

/// `mm:ss.cc` for an elapsed time in milliseconds
pub fn format_elapsed(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1000) % 60;
    let centis = (ms % 1000) / 10;
    format!("{minutes:02}:{seconds:02}.{centis:02}")
}

fn draw_border(fb: &mut FrameBuffer, layout: &Layout, style: CellStyle) {
    let (x, y, w, h) = (
        layout.frame_x(),
        layout.frame_y(),
        layout.frame_w(),
        layout.frame_h(),
    );

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);
    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, layout: &Layout, text: &str, style: CellStyle) {
    let text_w = text.chars().count() as u16;
    let x = layout.origin_x + layout.cols.saturating_sub(text_w) / 2;
    let y = layout.origin_y + layout.rows / 2;
    fb.put_str(x, y, text, style);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        GameView::default().layout(Vec2::new(900.0, 700.0), Viewport::new(100, 30))
    }

    #[test]
    fn layout_fits_default_canvas() {
        let l = layout();
        assert_eq!(l.cols, 61);
        assert_eq!(l.rows, 23);
        assert_eq!(l.world_offset, Vec2::new(0.0, 20.0));
        assert_eq!(l.origin_y, 3);
    }

    #[test]
    fn world_and_screen_agree() {
        let view = GameView::default();
        let l = layout();
        let (x, y) = view.world_to_screen(&l, Vec2::new(225.0, 350.0)).unwrap();
        assert_eq!((x - l.origin_x, y - l.origin_y), (15, 11));
        let back = view.screen_to_world(&l, x, y).unwrap();
        assert_eq!(back, Vec2::new(232.5, 350.0));
        let left = view.screen_to_world(&l, x - 1, y).unwrap();
        assert_eq!(left, Vec2::new(217.5, 350.0));
    }

    #[test]
    fn outside_play_area_is_none() {
        let view = GameView::default();
        let l = layout();
        assert_eq!(view.screen_to_world(&l, 0, 0), None);
        assert_eq!(view.screen_to_world(&l, l.origin_x + l.cols, l.origin_y), None);
        assert_eq!(view.world_to_screen(&l, Vec2::new(-20.0, 10.0)), None);
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "00:00.00");
        assert_eq!(format_elapsed(83_456), "01:23.45");
    }
}
