/// A dense row-major 2D array addressed by `(row, column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    data: Box<[T]>,
    rows: usize,
    columns: usize,
}

impl<T: Clone> Grid<T> {
    pub fn new(rows: usize, columns: usize, value: T) -> Self {
        let data = vec![value; rows * columns].into_boxed_slice();
        Grid {
            data,
            rows,
            columns,
        }
    }

    /// Overwrite every entry with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.iter_mut().for_each(|entry| *entry = value.clone());
    }
}

impl<T> Grid<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn is_in_bounds(&self, coord: (usize, usize)) -> bool {
        coord.0 < self.rows && coord.1 < self.columns
    }

    fn ravel_index(&self, row: usize, column: usize) -> usize {
        // A column past the end would silently alias the next row
        if row >= self.rows || column >= self.columns {
            panic!(
                "Grid index ({}, {}) is out of bounds for a {}x{} grid",
                row, column, self.rows, self.columns
            );
        }
        row * self.columns + column
    }

    /// Iterate over all entries together with their `(row, column)` coordinate.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), &T)> {
        let columns = self.columns;
        self.data
            .iter()
            .enumerate()
            .map(move |(idx, value)| ((idx / columns, idx % columns), value))
    }

    /// Iterate over the entries of a single row.
    pub fn row(&self, row: usize) -> &[T] {
        let start = self.ravel_index(row, 0);
        &self.data[start..start + self.columns]
    }
}

impl<T> std::ops::Index<(usize, usize)> for Grid<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.data[self.ravel_index(index.0, index.1)]
    }
}

impl<T> std::ops::IndexMut<(usize, usize)> for Grid<T> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        let idx = self.ravel_index(index.0, index.1);
        &mut self.data[idx]
    }
}
