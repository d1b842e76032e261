//! Session state: falling brick, floating brick, score, lives, speed.
//!
//! All transitions are plain methods on [`Session`]; nothing here touches the terminal.

use crate::GameConfig;
use crate::platform::RandomRange;

/// Row of a falling brick that has spawned but is not on the board yet.
pub const SPAWN_ROW: i16 = -1;

/// The descending marker the player has to catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallingBrick {
    pub column: u16,
    /// `SPAWN_ROW` until the first advance.
    pub row: i16,
}

impl FallingBrick {
    /// New brick at a random column, above the board.
    pub fn spawn(columns: u16, rng: &mut impl RandomRange) -> Self {
        Self {
            column: rng.range_inclusive(0, columns.saturating_sub(1)),
            row: SPAWN_ROW,
        }
    }

    /// Board cell `(column, row)`, or `None` while waiting to enter.
    pub fn cell(&self) -> Option<(u16, u16)> {
        u16::try_from(self.row).ok().map(|row| (self.column, row))
    }
}

/// Player-controlled paddle. The row never changes during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatingBrick {
    pub column: u16,
    pub row: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// What one tick did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Brick moved down into `(column, row)`.
    Advanced { column: u16, row: u16 },
    /// Brick landed on the paddle at `(column, row)` and respawned.
    Caught { column: u16, row: u16 },
    /// Brick left the bottom row at `column` and respawned. `penalty` is set when the last
    /// life was lost: lives refilled and one point taken off the score.
    Missed { column: u16, penalty: bool },
}

/// All mutable play state for one session.
#[derive(Debug, Clone)]
pub struct Session {
    pub columns: u16,
    pub rows: u16,
    pub max_lives: u32,
    pub falling: FallingBrick,
    pub floating: FloatingBrick,
    /// Signed: the all-lives-lost penalty can push it below zero.
    pub score: i32,
    pub lives: u32,
    /// Row advances per second.
    pub speed: u32,
    pub catches: u32,
    pub misses: u32,
}

impl Session {
    pub fn new(config: &GameConfig, rng: &mut impl RandomRange) -> Self {
        let columns = config.columns.max(1);
        let rows = config.rows.max(2);
        Self {
            columns,
            rows,
            max_lives: config.max_lives.max(1),
            falling: FallingBrick::spawn(columns, rng),
            floating: FloatingBrick {
                column: columns / 2,
                row: rows - 2,
            },
            score: 0,
            lives: config.max_lives.max(1),
            speed: config.initial_speed.max(1),
            catches: 0,
            misses: 0,
        }
    }

    /// Milliseconds between two ticks at the current speed (integer division, as in 1000 / speed).
    pub fn tick_interval_ms(&self) -> u64 {
        1000 / u64::from(self.speed.max(1))
    }

    pub fn is_tick_due(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.tick_interval_ms()
    }

    /// True when the falling brick sits directly beside the paddle on `direction`'s side.
    fn falling_beside(&self, direction: Direction) -> bool {
        let same_row = self.falling.row == i16::try_from(self.floating.row).unwrap_or(i16::MAX);
        let beside = match direction {
            Direction::Right => self.floating.column + 1 == self.falling.column,
            Direction::Left => self.falling.column + 1 == self.floating.column,
        };
        same_row && beside
    }

    /// Shift the paddle one column. Returns false when blocked by the wall or the falling brick.
    pub fn move_floating(&mut self, direction: Direction) -> bool {
        let at_wall = match direction {
            Direction::Right => self.floating.column + 1 >= self.columns,
            Direction::Left => self.floating.column == 0,
        };
        if at_wall || self.falling_beside(direction) {
            return false;
        }
        match direction {
            Direction::Right => self.floating.column += 1,
            Direction::Left => self.floating.column -= 1,
        }
        true
    }

    /// Advance the falling brick one row and settle catch/miss bookkeeping.
    pub fn tick(&mut self, rng: &mut impl RandomRange) -> TickOutcome {
        let bottom = i16::try_from(self.rows - 1).unwrap_or(i16::MAX);
        if self.falling.row < bottom {
            self.falling.row += 1;
            let column = self.falling.column;
            let row = self.falling.row.unsigned_abs();
            if column == self.floating.column && row == self.floating.row {
                self.score += 1;
                self.speed = self.speed.saturating_add(1);
                self.catches += 1;
                self.respawn_falling(rng);
                return TickOutcome::Caught { column, row };
            }
            return TickOutcome::Advanced { column, row };
        }

        let column = self.falling.column;
        self.misses += 1;
        self.lives = self.lives.saturating_sub(1);
        let penalty = self.lives == 0;
        if penalty {
            self.lives = self.max_lives;
            self.score -= 1;
        }
        self.respawn_falling(rng);
        TickOutcome::Missed { column, penalty }
    }

    pub fn respawn_falling(&mut self, rng: &mut impl RandomRange) {
        self.falling = FallingBrick::spawn(self.columns, rng);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Hands out scripted columns, then repeats the last one.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedColumns {
        columns: VecDeque<u16>,
        last: u16,
    }

    impl ScriptedColumns {
        pub(crate) fn new(columns: &[u16]) -> Self {
            Self {
                columns: columns.iter().copied().collect(),
                last: 0,
            }
        }
    }

    impl RandomRange for ScriptedColumns {
        fn range_inclusive(&mut self, lo: u16, hi: u16) -> u16 {
            if let Some(c) = self.columns.pop_front() {
                self.last = c;
            }
            self.last.clamp(lo, hi)
        }
    }

    fn session_with(columns: &[u16]) -> (Session, ScriptedColumns) {
        let mut rng = ScriptedColumns::new(columns);
        let session = Session::new(&GameConfig::default(), &mut rng);
        (session, rng)
    }

    #[test]
    fn test_initial_state() {
        let (s, _) = session_with(&[3]);
        assert_eq!(s.score, 0);
        assert_eq!(s.lives, 5);
        assert_eq!(s.speed, 2);
        assert_eq!(s.falling, FallingBrick { column: 3, row: SPAWN_ROW });
        assert_eq!(s.floating, FloatingBrick { column: 5, row: 8 });
        assert_eq!(s.falling.cell(), None);
        assert_eq!(s.tick_interval_ms(), 500);
    }

    #[test]
    fn test_right_move_clamps_at_wall() {
        let (mut s, _) = session_with(&[0]);
        for c in 0..s.columns {
            s.floating.column = c;
            let moved = s.move_floating(Direction::Right);
            assert_eq!(s.floating.column, (c + 1).min(s.columns - 1));
            assert_eq!(moved, c + 1 < s.columns);
        }
    }

    #[test]
    fn test_left_move_clamps_at_wall() {
        let (mut s, _) = session_with(&[9]);
        for c in 0..s.columns {
            s.floating.column = c;
            s.move_floating(Direction::Left);
            assert_eq!(s.floating.column, c.saturating_sub(1));
        }
    }

    #[test]
    fn test_right_move_blocked_by_adjacent_falling_brick() {
        let (mut s, _) = session_with(&[6]);
        s.falling.row = 8;
        assert!(!s.move_floating(Direction::Right));
        assert_eq!(s.floating.column, 5);
        // Left is still free.
        assert!(s.move_floating(Direction::Left));
        assert_eq!(s.floating.column, 4);
    }

    #[test]
    fn test_left_move_blocked_by_adjacent_falling_brick() {
        let (mut s, _) = session_with(&[4]);
        s.falling.row = 8;
        assert!(!s.move_floating(Direction::Left));
        assert_eq!(s.floating.column, 5);
    }

    #[test]
    fn test_adjacent_brick_on_other_row_does_not_block() {
        let (mut s, _) = session_with(&[6]);
        s.falling.row = 7;
        assert!(s.move_floating(Direction::Right));
        assert_eq!(s.floating.column, 6);
    }

    #[test]
    fn test_advance_without_catch() {
        let (mut s, mut rng) = session_with(&[2]);
        assert_eq!(s.tick(&mut rng), TickOutcome::Advanced { column: 2, row: 0 });
        assert_eq!(s.falling.cell(), Some((2, 0)));
        assert_eq!(s.score, 0);
    }

    #[test]
    fn test_catch_scores_and_speeds_up() {
        let (mut s, mut rng) = session_with(&[5, 1]);
        for row in 0..8 {
            assert_eq!(s.tick(&mut rng), TickOutcome::Advanced { column: 5, row });
        }
        assert_eq!(s.tick(&mut rng), TickOutcome::Caught { column: 5, row: 8 });
        assert_eq!(s.score, 1);
        assert_eq!(s.speed, 3);
        assert_eq!(s.lives, 5);
        assert_eq!(s.falling, FallingBrick { column: 1, row: SPAWN_ROW });
        assert_eq!(s.tick_interval_ms(), 333);
    }

    #[test]
    fn test_miss_costs_a_life() {
        let (mut s, mut rng) = session_with(&[0, 7]);
        for _ in 0..10 {
            assert!(matches!(s.tick(&mut rng), TickOutcome::Advanced { .. }));
        }
        assert_eq!(s.falling.row, 9);
        assert_eq!(
            s.tick(&mut rng),
            TickOutcome::Missed {
                column: 0,
                penalty: false
            }
        );
        assert_eq!(s.lives, 4);
        assert_eq!(s.score, 0);
        assert_eq!(s.falling, FallingBrick { column: 7, row: SPAWN_ROW });
    }

    #[test]
    fn test_losing_last_life_refills_and_penalises() {
        let (mut s, mut rng) = session_with(&[0]);
        s.lives = 1;
        s.falling.row = 9;
        assert_eq!(
            s.tick(&mut rng),
            TickOutcome::Missed {
                column: 0,
                penalty: true
            }
        );
        assert_eq!(s.lives, 5);
        assert_eq!(s.score, -1);
    }

    #[test]
    fn test_tick_gating() {
        let (mut s, _) = session_with(&[0]);
        assert!(!s.is_tick_due(499));
        assert!(s.is_tick_due(500));
        s.speed = 3;
        assert!(!s.is_tick_due(332));
        assert!(s.is_tick_due(333));
    }

    #[test]
    fn test_falling_brick_passes_beside_paddle() {
        let (mut s, mut rng) = session_with(&[6]);
        s.falling.row = 7;
        assert_eq!(s.tick(&mut rng), TickOutcome::Advanced { column: 6, row: 8 });
        assert_eq!(s.score, 0);
    }
}
