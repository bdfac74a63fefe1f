use rand::Rng;

/// Dense row-major matrix. A batch of samples is stored one sample per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Samples every entry from U(-bound, bound).
    pub fn uniform<R: Rng + ?Sized>(rows: usize, cols: usize, bound: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = rng.gen_range(-bound..=bound);
            }
        }
        res
    }

    /// Builds a matrix from row vectors. All rows must share one width;
    /// an empty `data` yields a 0×0 matrix.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let cols = data.first().map_or(0, |row| row.len());
        assert!(
            data.iter().all(|row| row.len() == cols),
            "Matrix rows must all have {} columns",
            cols
        );
        Matrix {
            rows: data.len(),
            cols,
            data,
        }
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Matrix product without consuming either operand.
    pub fn dot(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, rhs.rows,
            "Matrices are of incorrect sizes: {}x{} * {}x{}",
            self.rows, self.cols, rhs.rows, rhs.cols
        );

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                if a == 0.0 {
                    continue;
                }
                for j in 0..res.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        res
    }

    /// Adds the single-row `row` to every row of `self`.
    pub fn add_row(&self, row: &Matrix) -> Matrix {
        assert_eq!(row.rows, 1, "broadcast operand must be a single row");
        assert_eq!(self.cols, row.cols, "broadcast operand has wrong width");
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|r| r.iter().zip(&row.data[0]).map(|(a, b)| a + b).collect())
                .collect(),
        }
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.rows, rhs.rows);
        assert_eq!(self.cols, rhs.cols);
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| a.iter().zip(b).map(|(x, y)| x * y).collect())
                .collect(),
        }
    }

    /// Sums over rows, producing a 1×cols matrix.
    pub fn sum_rows(&self) -> Matrix {
        let mut res = Matrix::zeros(1, self.cols);
        for row in &self.data {
            for (acc, x) in res.data[0].iter_mut().zip(row) {
                *acc += x;
            }
        }
        res
    }

    /// Per-column mean. Empty matrices yield zeros.
    pub fn column_means(&self) -> Vec<f64> {
        if self.rows == 0 {
            return vec![0.0; self.cols];
        }
        let n = self.rows as f64;
        self.sum_rows().data[0].iter().map(|s| s / n).collect()
    }

    /// Per-column population standard deviation (ddof = 0).
    pub fn column_stds(&self) -> Vec<f64> {
        if self.rows == 0 {
            return vec![0.0; self.cols];
        }
        let means = self.column_means();
        let n = self.rows as f64;
        (0..self.cols)
            .map(|j| {
                let var = self
                    .data
                    .iter()
                    .map(|row| (row[j] - means[j]).powi(2))
                    .sum::<f64>()
                    / n;
                var.sqrt()
            })
            .collect()
    }

    /// New matrix made of the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Matrix {
        Matrix {
            rows: indices.len(),
            cols: self.cols,
            data: indices.iter().map(|&i| self.data[i].clone()).collect(),
        }
    }

    /// Mean and population standard deviation of every entry.
    pub fn overall_mean_std(&self) -> (f64, f64) {
        let n = (self.rows * self.cols) as f64;
        if n == 0.0 {
            return (0.0, 0.0);
        }
        let mean = self.data.iter().flatten().sum::<f64>() / n;
        let var = self
            .data
            .iter()
            .flatten()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>()
            / n;
        (mean, var.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn dot_matches_hand_computation() {
        let a = Matrix::from_data(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = Matrix::from_data(vec![vec![5.0], vec![6.0]]);
        assert_eq!(a.dot(&b).data, vec![vec![17.0], vec![39.0]]);
    }

    #[test]
    fn add_row_broadcasts_over_every_row() {
        let a = Matrix::from_data(vec![vec![1.0, 1.0], vec![2.0, 2.0]]);
        let b = Matrix::from_data(vec![vec![10.0, 20.0]]);
        assert_eq!(a.add_row(&b).data, vec![vec![11.0, 21.0], vec![12.0, 22.0]]);
    }

    #[test]
    fn column_statistics_use_population_std() {
        let m = Matrix::from_data(vec![vec![1.0, 5.0], vec![3.0, 5.0]]);
        assert_eq!(m.column_means(), vec![2.0, 5.0]);
        assert_eq!(m.column_stds(), vec![1.0, 0.0]);
    }

    #[test]
    fn uniform_respects_bound_and_seed() {
        let a = Matrix::uniform(3, 4, 0.5, &mut StdRng::seed_from_u64(7));
        let b = Matrix::uniform(3, 4, 0.5, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.data.iter().flatten().all(|x| x.abs() <= 0.5));
    }

    #[test]
    fn select_rows_keeps_requested_order() {
        let m = Matrix::from_data(vec![vec![0.0], vec![1.0], vec![2.0]]);
        assert_eq!(m.select_rows(&[2, 0]).data, vec![vec![2.0], vec![0.0]]);
    }
}
