use std::fmt;

use rand::Rng;

use crate::error::BoardError;

use super::rules::{self, DEFAULT_BOARD_SIZE};
use super::shift::{self, MoveOutcome};
use super::spawn;
use super::Direction;

/// A `(row, col)` cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self { Position { row, col } }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "({}, {})", self.row, self.col) }
}

/// Immutable `size x size` board plus accumulated score.
///
/// Cells are stored row-major; `0` is empty, anything else is a power of two.
/// Every operation that changes the board returns a new `Board`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Box<[u32]>,
    score: u64,
}

impl Board {
    /// An all-empty board with a zero score.
    ///
    /// ```
    /// use ai_2048_core::engine::Board;
    /// let b = Board::new(5).unwrap();
    /// assert_eq!(b.count_empty(), 25);
    /// assert!(Board::new(9).is_err());
    /// ```
    pub fn new(size: usize) -> Result<Self, BoardError> {
        if !rules::is_valid_board_size(size) {
            return Err(BoardError::InvalidSize { size });
        }
        Ok(Board { size, cells: vec![0; size * size].into_boxed_slice(), score: 0 })
    }

    /// Ingest an externally observed grid.
    ///
    /// The snapshot is validated first; every violation found is reported and
    /// no board is produced unless the list is empty.
    ///
    /// ```
    /// use ai_2048_core::engine::Board;
    /// use ai_2048_core::error::BoardError;
    /// let err = Board::from_grid(&[vec![3, 0, 0], vec![0; 3], vec![0; 3]], -1).unwrap_err();
    /// match err {
    ///     BoardError::Invalid(violations) => assert_eq!(violations.len(), 2),
    ///     other => panic!("unexpected {other}"),
    /// }
    /// ```
    pub fn from_grid(grid: &[Vec<i64>], score: i64) -> Result<Self, BoardError> {
        let violations = rules::validate_grid(grid, score);
        if !violations.is_empty() {
            log::warn!("rejected board snapshot with {} violation(s)", violations.len());
            return Err(BoardError::Invalid(violations));
        }
        let size = grid.len();
        let cells: Vec<u32> = grid.iter().flat_map(|row| row.iter().map(|&v| v as u32)).collect();
        Ok(Board { size, cells: cells.into_boxed_slice(), score: score as u64 })
    }

    /// Build a board from parts that are already known to be well formed.
    pub(crate) fn from_parts(size: usize, cells: Box<[u32]>, score: u64) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Board { size, cells, score }
    }

    /// Return a copy with `value` placed at the empty cell `pos`.
    pub fn with_tile(&self, pos: Position, value: u32) -> Result<Self, BoardError> {
        if pos.row >= self.size || pos.col >= self.size {
            return Err(BoardError::OutOfBounds { row: pos.row, col: pos.col, size: self.size });
        }
        if !rules::is_valid_tile_value(i64::from(value)) || value == 0 {
            return Err(BoardError::InvalidTile { value });
        }
        let idx = self.index(pos);
        if self.cells[idx] != 0 {
            return Err(BoardError::Occupied { row: pos.row, col: pos.col });
        }
        Ok(self.place(idx, value))
    }

    /// Unchecked variant of [`Board::with_tile`] over a flat index.
    #[inline]
    pub(crate) fn place(&self, idx: usize, value: u32) -> Self {
        let mut cells = self.cells.clone();
        cells[idx] = value;
        Board { size: self.size, cells, score: self.score }
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a random empty slot.
    ///
    /// A full board is returned unchanged.
    ///
    /// ```
    /// use ai_2048_core::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::default().with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        spawn::spawn_tile(self, rng).unwrap_or_else(|| self.clone())
    }

    /// Slide/merge in `dir` and report what happened. See [`shift::apply`].
    #[inline]
    pub fn apply(&self, dir: Direction) -> MoveOutcome { shift::apply(self, dir) }

    /// Board after sliding in `dir`, without a random insert.
    #[inline]
    pub fn shift(&self, dir: Direction) -> Self { shift::apply(self, dir).next }

    #[inline]
    pub fn can_move(&self, dir: Direction) -> bool { rules::can_move(self, dir) }

    #[inline]
    pub fn is_game_over(&self) -> bool { rules::is_game_over(self) }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    #[inline]
    pub fn score(&self) -> u64 { self.score }

    /// Row-major cell values.
    #[inline]
    pub fn cells(&self) -> &[u32] { &self.cells }

    /// Value at `pos`, or `None` when out of bounds.
    pub fn cell(&self, pos: Position) -> Option<u32> {
        if pos.row < self.size && pos.col < self.size {
            Some(self.cells[self.index(pos)])
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> + '_ { self.cells.chunks(self.size) }

    pub fn to_grid(&self) -> Vec<Vec<u32>> { self.rows().map(<[u32]>::to_vec).collect() }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(idx, _)| self.position(idx))
            .collect()
    }

    pub(crate) fn empty_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().enumerate().filter(|(_, &v)| v == 0).map(|(idx, _)| idx)
    }

    #[inline]
    pub fn count_empty(&self) -> usize { self.cells.iter().filter(|&&v| v == 0).count() }

    #[inline]
    pub fn is_full(&self) -> bool { self.cells.iter().all(|&v| v != 0) }

    /// Highest tile value, `0` for an empty board.
    #[inline]
    pub fn max_tile(&self) -> u32 { self.cells.iter().copied().max().unwrap_or(0) }

    #[inline]
    pub(crate) fn index(&self, pos: Position) -> usize { pos.row * self.size + pos.col }

    #[inline]
    pub(crate) fn position(&self, idx: usize) -> Position { Position::new(idx / self.size, idx % self.size) }
}

impl Default for Board {
    fn default() -> Self {
        Board {
            size: DEFAULT_BOARD_SIZE,
            cells: vec![0; DEFAULT_BOARD_SIZE * DEFAULT_BOARD_SIZE].into_boxed_slice(),
            score: 0,
        }
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("size", &self.size)
            .field("score", &self.score)
            .field("rows", &self.to_grid())
            .finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_tile().max(1).to_string().len().max(4);
        let divider = vec!["-".repeat(width + 2); self.size].join("+");
        writeln!(f, "score: {}", self.score)?;
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f, "{}", divider)?;
            }
            let line: Vec<String> = row
                .iter()
                .map(|&v| if v == 0 { " ".repeat(width + 2) } else { format!(" {:>width$} ", v, width = width) })
                .collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}
