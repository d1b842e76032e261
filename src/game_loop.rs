//! The session loop: drain input, tick when due, render, pace.

use crate::GameConfig;
use crate::game::{Direction, FallingBrick, FloatingBrick, Session, TickOutcome};
use crate::grid::{Grid, GridError, GridLayout};
use crate::input::{Action, key_to_action};
use crate::platform::{Clock, EventSource, FramePacer, GameEvent, RandomRange};
use crate::theme::Theme;
use crate::ui::{self, Flash};
use ratatui::Terminal;
use ratatui::backend::Backend;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("grid failed to initialize: {0}")]
    Init(#[from] GridError),
    #[error("platform error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to draw frame: {0}")]
    Render(String),
}

/// Final numbers of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: i32,
    pub lives: u32,
    pub speed: u32,
    pub catches: u32,
    pub misses: u32,
    pub frames: u64,
    /// Brick positions when the loop exited.
    pub falling: FallingBrick,
    pub floating: FloatingBrick,
}

impl SessionSummary {
    fn from_session(session: &Session, frames: u64) -> Self {
        Self {
            score: session.score,
            lives: session.lives,
            speed: session.speed,
            catches: session.catches,
            misses: session.misses,
            frames,
            falling: session.falling,
            floating: session.floating,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Platform services the loop is generic over, so tests can drive it without a terminal or wall clock.
pub struct Platform<C, R, E, P> {
    pub clock: C,
    pub rng: R,
    pub events: E,
    pub pacer: P,
}

pub struct GameLoop<C, R, E, P> {
    config: GameConfig,
    theme: Theme,
    platform: Platform<C, R, E, P>,
    flash: Flash,
}

impl<C, R, E, P> GameLoop<C, R, E, P>
where
    C: Clock,
    R: RandomRange,
    E: EventSource,
    P: FramePacer,
{
    pub fn new(config: GameConfig, theme: Theme, platform: Platform<C, R, E, P>) -> Self {
        Self {
            config,
            theme,
            platform,
            flash: Flash::default(),
        }
    }

    /// Run one full session against `terminal`, sized `width`x`height` cells, until quit.
    pub fn start<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        width: u16,
        height: u16,
    ) -> Result<SessionSummary, GameError> {
        let layout = GridLayout {
            columns: self.config.columns,
            rows: self.config.rows,
            x_interspace: self.config.x_interspace,
            y_interspace: self.config.y_interspace,
        };
        let mut grid = Grid::new(
            layout,
            width,
            height,
            self.config.padding,
            self.theme.bg,
            self.theme.div_line,
        )
        .inspect_err(|err| log::error!("grid fail to initialize: {err}"))?;

        let mut session = Session::new(&self.config, &mut self.platform.rng);
        log::info!(
            "session start: {}x{} grid at {:?}, lives {}, speed {}",
            grid.columns(),
            grid.rows(),
            grid.rect,
            session.lives,
            session.speed
        );

        let mut last_tick = self.platform.clock.now_ms();
        let mut frames = 0u64;
        let result = loop {
            if self.drain_input(&mut session)? == Flow::Quit {
                break Ok(());
            }

            let now = self.platform.clock.now_ms();
            if session.is_tick_due(now.saturating_sub(last_tick)) {
                let outcome = session.tick(&mut self.platform.rng);
                self.record(outcome, &session, &grid);
                last_tick = now;
            }

            paint(&mut grid, &session, &self.theme);
            let flash = &mut self.flash;
            let theme = &self.theme;
            if let Err(err) = terminal.draw(|f| ui::draw(f, &grid, &session, theme, flash, now)) {
                break Err(GameError::Render(err.to_string()));
            }
            frames += 1;

            self.platform.pacer.delay();
        };

        let summary = SessionSummary::from_session(&session, frames);
        log::info!(
            "session end: score {}, lives {}, speed {}, {} caught, {} missed, {} frames, falling {:?}, paddle column {}",
            summary.score,
            summary.lives,
            summary.speed,
            summary.catches,
            summary.misses,
            summary.frames,
            summary.falling.cell(),
            summary.floating.column
        );
        result.map(|()| summary)
    }

    /// Apply every pending event. Stops at the first quit so nothing after it mutates state.
    fn drain_input(&mut self, session: &mut Session) -> Result<Flow, GameError> {
        while let Some(event) = self.platform.events.poll_event()? {
            let action = match event {
                GameEvent::Quit => Action::Quit,
                GameEvent::KeyDown(key) => key_to_action(key),
            };
            match action {
                Action::Quit => return Ok(Flow::Quit),
                Action::MoveLeft => {
                    session.move_floating(Direction::Left);
                }
                Action::MoveRight => {
                    session.move_floating(Direction::Right);
                }
                Action::None => {}
            }
        }
        Ok(Flow::Continue)
    }

    fn record(&mut self, outcome: TickOutcome, session: &Session, grid: &Grid) {
        match outcome {
            TickOutcome::Advanced { column, row } => {
                log::trace!("brick at ({column}, {row})");
                return;
            }
            TickOutcome::Caught { column, row } => {
                log::debug!(
                    "caught at ({column}, {row}): score {}, speed {}",
                    session.score,
                    session.speed
                );
            }
            TickOutcome::Missed { column, penalty } => {
                log::debug!("missed in column {column}: lives {}", session.lives);
                if penalty {
                    log::debug!("out of lives: refilled, score down to {}", session.score);
                }
            }
        }
        if self.config.animation {
            self.flash.trigger(outcome, grid, &self.theme);
        }
    }
}

/// Recolour the grid from session state: background everywhere, then the two markers.
fn paint(grid: &mut Grid, session: &Session, theme: &Theme) {
    grid.clear_cells();
    if let Some((column, row)) = session.falling.cell() {
        grid.set_color(column, row, theme.falling);
    }
    grid.set_color(session.floating.column, session.floating.row, theme.floating);
}
