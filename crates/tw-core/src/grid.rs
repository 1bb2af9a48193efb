use crate::cell::Cell;

/// Fixed-size 2D array of values stored in row-major order.
///
/// Out-of-range access never panics: lookups return `None` and writes are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid where every cell holds a clone of `fill`.
    pub fn new(width: u32, height: u32, fill: T) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![fill; len],
        }
    }
}

impl<T> Grid<T> {
    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when `cell` addresses a slot of this grid.
    pub fn contains(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    /// Borrow the value at `cell`.
    pub fn get(&self, cell: Cell) -> Option<&T> {
        self.index(cell).map(|i| &self.cells[i])
    }

    /// Mutably borrow the value at `cell`.
    pub fn get_mut(&mut self, cell: Cell) -> Option<&mut T> {
        self.index(cell).map(|i| &mut self.cells[i])
    }

    /// Store `value` at `cell`, returning the previous value.
    ///
    /// Returns `None` without storing anything when `cell` is out of range.
    pub fn set(&mut self, cell: Cell, value: T) -> Option<T> {
        let i = self.index(cell)?;
        Some(std::mem::replace(&mut self.cells[i], value))
    }

    /// Iterate all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, &T)> {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(i, value)| {
            let x = (i % width) as i32;
            let y = (i / width) as i32;
            (Cell::new(x, y), value)
        })
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        let x = u32::try_from(cell.x).ok()?;
        let y = u32::try_from(cell.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_and_set_in_bounds() {
        let mut grid = Grid::new(3, 2, 0u8);
        assert_eq!(grid.set(Cell::new(2, 1), 7), Some(0));
        assert_eq!(grid.get(Cell::new(2, 1)), Some(&7));
        assert_eq!(grid.get(Cell::new(0, 0)), Some(&0));
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut grid = Grid::new(3, 2, 0u8);
        assert_eq!(grid.set(Cell::new(3, 0), 9), None);
        assert_eq!(grid.set(Cell::new(-1, 0), 9), None);
        assert!(grid.get(Cell::new(0, 2)).is_none());
        assert!(grid.iter().all(|(_, v)| *v == 0));
    }

    #[test]
    fn iter_is_row_major() {
        let grid = Grid::new(2, 2, ());
        let cells: Vec<Cell> = grid.iter().map(|(c, _)| c).collect();
        assert_eq!(
            cells,
            vec![
                Cell::new(0, 0),
                Cell::new(1, 0),
                Cell::new(0, 1),
                Cell::new(1, 1)
            ]
        );
    }
}
