//! Grid: fixed cell layout inside a bordered square, per-cell colours, and rendering.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Widget};
use thiserror::Error;

/// Terminal cells are about twice as tall as wide; horizontal sizes are scaled by this.
pub const CELL_ASPECT: u16 = 2;

/// Border thickness on each side.
const BORDER: u16 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("viewport {width}x{height} is too small for a {columns}x{rows} grid")]
    TooSmall {
        width: u16,
        height: u16,
        columns: u16,
        rows: u16,
    },
    #[error("grid needs at least one column and one row")]
    Empty,
}

/// Cell counts and spacing; everything else is derived from the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub columns: u16,
    pub rows: u16,
    pub x_interspace: u16,
    pub y_interspace: u16,
}

#[derive(Debug, Clone)]
pub struct Grid {
    pub layout: GridLayout,
    /// Outer rect including the border.
    pub rect: Rect,
    pub cell_width: u16,
    pub cell_height: u16,
    pub background_color: Color,
    pub border_color: Color,
    /// Row-major, `columns * rows`.
    cells: Vec<Color>,
}

impl Grid {
    /// Fit a square grid into `width`x`height` leaving `padding` rows (and twice that in
    /// columns) on every side, snap it to whole cells and centre it.
    pub fn new(
        layout: GridLayout,
        width: u16,
        height: u16,
        padding: u16,
        background_color: Color,
        border_color: Color,
    ) -> Result<Self, GridError> {
        if layout.columns == 0 || layout.rows == 0 {
            return Err(GridError::Empty);
        }
        let side = (width.saturating_sub(2 * padding * CELL_ASPECT) / CELL_ASPECT)
            .min(height.saturating_sub(2 * padding));
        let mut grid = Self {
            layout,
            rect: Rect::new(0, 0, side * CELL_ASPECT, side),
            cell_width: 0,
            cell_height: 0,
            background_color,
            border_color,
            cells: vec![background_color; usize::from(layout.columns) * usize::from(layout.rows)],
        };
        grid.adjust_size().ok_or(GridError::TooSmall {
            width,
            height,
            columns: layout.columns,
            rows: layout.rows,
        })?;
        grid.align_center(width, height);
        Ok(grid)
    }

    /// Derive cell size from the current rect, then shrink the rect to fit the cells exactly.
    /// `None` when a cell would be zero-sized.
    fn adjust_size(&mut self) -> Option<()> {
        let GridLayout {
            columns,
            rows,
            x_interspace,
            y_interspace,
        } = self.layout;
        let fit = |outer: u16, n: u16, gap: u16| {
            let free = outer
                .checked_sub(2 * BORDER)?
                .checked_sub((n + 1) * gap)?;
            Some(free / n).filter(|&size| size > 0)
        };
        self.cell_width = fit(self.rect.width, columns, x_interspace)?;
        self.cell_height = fit(self.rect.height, rows, y_interspace)?;
        self.rect.width = columns * self.cell_width + (columns + 1) * x_interspace + 2 * BORDER;
        self.rect.height = rows * self.cell_height + (rows + 1) * y_interspace + 2 * BORDER;
        Some(())
    }

    fn align_center(&mut self, width: u16, height: u16) {
        self.rect.x = width.saturating_sub(self.rect.width) / 2;
        self.rect.y = height.saturating_sub(self.rect.height) / 2;
    }

    pub fn columns(&self) -> u16 {
        self.layout.columns
    }

    pub fn rows(&self) -> u16 {
        self.layout.rows
    }

    fn index(&self, column: u16, row: u16) -> Option<usize> {
        (column < self.layout.columns && row < self.layout.rows)
            .then(|| usize::from(row) * usize::from(self.layout.columns) + usize::from(column))
    }

    /// Screen rect of a cell.
    pub fn cell_rect(&self, column: u16, row: u16) -> Rect {
        let GridLayout {
            x_interspace,
            y_interspace,
            ..
        } = self.layout;
        Rect {
            x: self.rect.x + BORDER + x_interspace + column * (self.cell_width + x_interspace),
            y: self.rect.y + BORDER + y_interspace + row * (self.cell_height + y_interspace),
            width: self.cell_width,
            height: self.cell_height,
        }
    }

    pub fn color(&self, column: u16, row: u16) -> Option<Color> {
        self.index(column, row).map(|i| self.cells[i])
    }

    /// Out-of-range cells are ignored.
    pub fn set_color(&mut self, column: u16, row: u16, color: Color) {
        if let Some(i) = self.index(column, row) {
            self.cells[i] = color;
        }
    }

    /// Every cell back to the background colour.
    pub fn clear_cells(&mut self) {
        self.cells.fill(self.background_color);
    }
}

impl Widget for &Grid {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rect = self.rect.intersection(area);
        if rect.is_empty() {
            return;
        }
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_color).bg(self.background_color))
            .style(Style::default().bg(self.background_color))
            .render(rect, buf);

        for row in 0..self.layout.rows {
            for column in 0..self.layout.columns {
                let cell = self.cell_rect(column, row).intersection(area);
                if cell.is_empty() {
                    continue;
                }
                let color = self.color(column, row).unwrap_or(self.background_color);
                buf.set_style(cell, Style::default().bg(color));
                if color == self.background_color {
                    let mid_x = cell.x + cell.width / 2;
                    let mid_y = cell.y + cell.height / 2;
                    buf[(mid_x, mid_y)]
                        .set_symbol("·")
                        .set_fg(self.border_color);
                }
            }
        }
    }
}
