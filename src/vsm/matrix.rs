// Matrix value types shared by the vector-space and reduction stages.
//
// Two representations: a CSR sparse matrix for the term-document weights
// (most cells are zero) and a flat row-major dense matrix for the small
// factor matrices. Both are plain index arithmetic over one backing store;
// no views, no aliasing.

/// Sparse row-major (CSR) matrix with non-negative f64 weights.
#[derive(Debug, Clone)]
pub struct SparseRowMajorMatrix {
    rows: usize,
    cols: usize,
    row_ptr: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseRowMajorMatrix {
    /// Build from per-row (column, value) pairs. Each row must be sorted by
    /// column; zero values are dropped.
    pub fn from_rows(rows: Vec<Vec<(usize, f64)>>, cols: usize) -> Self {
        let mut row_ptr = Vec::with_capacity(rows.len() + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);
        for row in &rows {
            debug_assert!(row.windows(2).all(|w| w[0].0 < w[1].0));
            for &(col, value) in row {
                debug_assert!(col < cols);
                if value != 0.0 {
                    col_indices.push(col);
                    values.push(value);
                }
            }
            row_ptr.push(col_indices.len());
        }
        Self {
            rows: rows.len(),
            cols,
            row_ptr,
            col_indices,
            values,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.is_empty()
    }

    /// The non-zero entries of one row: parallel (columns, values) slices.
    pub fn row(&self, r: usize) -> (&[usize], &[f64]) {
        let span = self.row_ptr[r]..self.row_ptr[r + 1];
        (&self.col_indices[span.clone()], &self.values[span])
    }

    /// Rows with at least one non-zero entry.
    pub fn non_zero_rows(&self) -> usize {
        (0..self.rows)
            .filter(|&r| self.row_ptr[r + 1] > self.row_ptr[r])
            .count()
    }

    /// Columns with at least one non-zero entry.
    pub fn non_zero_cols(&self) -> usize {
        let mut seen = vec![false; self.cols];
        for &c in &self.col_indices {
            seen[c] = true;
        }
        seen.into_iter().filter(|&s| s).count()
    }

    /// L2 norm of every column.
    pub fn column_l2_norms(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for (&c, &v) in self.col_indices.iter().zip(&self.values) {
            sums[c] += v * v;
        }
        sums.into_iter().map(f64::sqrt).collect()
    }

    /// Multiply every entry by `factors[column]`.
    pub fn scale_columns(&mut self, factors: &[f64]) {
        debug_assert_eq!(factors.len(), self.cols);
        for (&c, v) in self.col_indices.iter().zip(self.values.iter_mut()) {
            *v *= factors[c];
        }
    }
}

/// Flat row-major dense matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn at(&self, r: usize, c: usize) -> f64 {
        self.data[r * self.cols + c]
    }

    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        self.data[r * self.cols + c] = value;
    }

    pub fn row(&self, r: usize) -> &[f64] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        &mut self.data[r * self.cols..(r + 1) * self.cols]
    }

    /// Copy of one column (columns are strided; callers want them small and
    /// contiguous).
    pub fn column(&self, c: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.at(r, c)).collect()
    }

    /// Mutable access to the whole backing store, row-major.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}
