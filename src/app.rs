//! App: terminal init/restore and wiring the real platform into the game loop.

use crate::GameConfig;
use crate::game_loop::{GameError, GameLoop, Platform, SessionSummary};
use crate::platform::{FixedRatePacer, MonotonicClock, SeededRandom, TerminalEvents};
use crate::theme::Theme;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

pub struct App {
    config: GameConfig,
    theme: Theme,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        Self { config, theme }
    }

    /// Take over the terminal, play one session, and always hand the terminal back.
    pub fn run(&mut self) -> Result<SessionSummary, GameError> {
        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let result = size()
            .map_err(GameError::from)
            .and_then(|(width, height)| self.play(&mut terminal, width, height));

        // Restore
        restore_step("show cursor", terminal.show_cursor());
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn play(
        &self,
        terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
        width: u16,
        height: u16,
    ) -> Result<SessionSummary, GameError> {
        let seed = self.config.seed.unwrap_or_else(rand::random);
        log::info!("spawn seed {seed}");
        let platform = Platform {
            clock: MonotonicClock::new(),
            rng: SeededRandom::new(seed),
            events: TerminalEvents,
            pacer: FixedRatePacer::new(self.config.fps),
        };
        let mut game = GameLoop::new(self.config.clone(), self.theme.clone(), platform);
        game.start(terminal, width, height)
    }
}

/// Restore failures must not mask the session result, so they are only logged.
fn restore_step<E: std::fmt::Display>(step: &str, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            log::warn!("failed to {step}: {err}");
            false
        }
    }
}
