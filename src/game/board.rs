use crate::models::Cell;

/// Pieces in a line needed to win
pub const WIN_LENGTH: usize = 4;

/// Horizontal, vertical and both diagonals, as (row step, column step).
/// Each line is walked in both signs of its vector.
const DIRECTIONS: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// A `rows x columns` grid filled by gravity. Row 0 is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<Cell>>,
}

impl Board {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![vec![Cell::Empty; columns]; rows],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// A column is full once its top cell is taken. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        col >= self.columns || self.cells[0][col] != Cell::Empty
    }

    pub fn is_full(&self) -> bool {
        (0..self.columns).all(|col| self.is_column_full(col))
    }

    /// Drop a piece into `col` (0-indexed), returning the row it landed on
    pub fn drop_piece(&mut self, col: usize, piece: Cell) -> Option<usize> {
        if col >= self.columns {
            return None;
        }

        let row = (0..self.rows)
            .rev()
            .find(|&row| self.cells[row][col] == Cell::Empty)?;
        self.cells[row][col] = piece;
        Some(row)
    }

    /// Whether the piece at (row, col) sits on a line of at least [`WIN_LENGTH`]
    pub fn is_winning_cell(&self, row: usize, col: usize) -> bool {
        self.winning_direction(row, col).is_some()
    }

    /// First direction through (row, col) that forms a winning line
    pub fn winning_direction(&self, row: usize, col: usize) -> Option<(isize, isize)> {
        let piece = self.get(row, col);
        if piece == Cell::Empty {
            return None;
        }

        DIRECTIONS.into_iter().find(|&(dr, dc)| {
            let length = 1
                + self.count_from(row, col, dr, dc, piece)
                + self.count_from(row, col, -dr, -dc, piece);
            length >= WIN_LENGTH
        })
    }

    /// Contiguous `piece` cells stepping away from (row, col), excluding the start
    fn count_from(&self, row: usize, col: usize, dr: isize, dc: isize, piece: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = col as isize + dc;

        while r >= 0
            && c >= 0
            && (r as usize) < self.rows
            && (c as usize) < self.columns
            && self.cells[r as usize][c as usize] == piece
        {
            count += 1;
            r += dr;
            c += dc;
        }

        count
    }
}
