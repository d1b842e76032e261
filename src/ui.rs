//! Frame drawing: background, grid, score board, and catch/miss flashes.

use crate::game::{Session, TickOutcome};
use crate::grid::Grid;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// How long a catch/miss flash takes to fade back to the cell's own colour.
const FLASH_MS: u32 = 350;

/// Score board line, e.g. `Score: 3  Lives: 5  Speed: 5`.
pub fn board_text(session: &Session) -> String {
    format!(
        "Score: {}  Lives: {}  Speed: {}",
        session.score, session.lives, session.speed
    )
}

/// Where the score board goes: one row above the grid, indented by the cell spacing.
pub fn board_rect(grid: &Grid, area: Rect) -> Rect {
    let x = grid.rect.x + grid.layout.x_interspace;
    Rect {
        x,
        y: grid.rect.y.saturating_sub(1),
        width: area.right().saturating_sub(x),
        height: 1,
    }
    .intersection(area)
}

/// Running flash effect, if any. Lives outside the session: purely cosmetic.
#[derive(Default)]
pub struct Flash {
    effect: Option<Effect>,
    area: Rect,
    last_ms: Option<u64>,
}

impl Flash {
    /// Start a flash for a catch or miss; plain advances leave the current one running.
    pub fn trigger(&mut self, outcome: TickOutcome, grid: &Grid, theme: &Theme) {
        let (area, color) = match outcome {
            TickOutcome::Caught { column, row } => (grid.cell_rect(column, row), theme.title),
            TickOutcome::Missed { column, .. } => {
                (grid.cell_rect(column, grid.rows() - 1), theme.falling)
            }
            TickOutcome::Advanced { .. } => return,
        };
        let effect = fx::fade_from(color, color, (FLASH_MS, Interpolation::Linear)).with_area(area);
        self.effect = Some(effect);
        self.area = area;
        self.last_ms = None;
    }

    fn render(&mut self, frame: &mut Frame, now_ms: u64) {
        let delta_ms = self
            .last_ms
            .map_or(0, |last| now_ms.saturating_sub(last))
            .min(u64::from(u32::MAX)) as u32;
        self.last_ms = Some(now_ms);
        let area = self.area.intersection(frame.area());
        if let Some(effect) = &mut self.effect {
            frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
            if effect.done() {
                self.effect = None;
            }
        }
    }
}

/// Draw one frame: clear to background, grid, score board, then any flash on top.
pub fn draw(
    frame: &mut Frame,
    grid: &Grid,
    session: &Session,
    theme: &Theme,
    flash: &mut Flash,
    now_ms: u64,
) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), area);
    frame.render_widget(grid, area);

    let board = Paragraph::new(Line::from(board_text(session)))
        .style(Style::default().fg(theme.main_fg).bg(theme.bg));
    frame.render_widget(board, board_rect(grid, area));

    flash.render(frame, now_ms);
}
