use crate::error::{AppError, AppResult};

/// Tolerance for symmetry and diagonal checks on f32 scores
const SCORE_EPSILON: f32 = 1e-5;

/// The precomputed pairwise similarity matrix
///
/// Row and column order is the catalog row order. Validated on construction
/// so the serve path can assume a well-formed matrix: square, all scores
/// finite, symmetric, and with every diagonal entry the maximum of its row.
#[derive(Debug)]
pub struct SimilarityMatrix {
    rows: Vec<Vec<f32>>,
}

impl SimilarityMatrix {
    /// Validates and wraps a raw score matrix
    pub fn new(rows: Vec<Vec<f32>>) -> AppResult<Self> {
        if rows.is_empty() {
            return Err(AppError::DataIntegrity(
                "similarity matrix is empty".to_string(),
            ));
        }

        let n = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(AppError::DataIntegrity(format!(
                    "similarity matrix is not square: row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            for (j, score) in row.iter().enumerate() {
                if !score.is_finite() {
                    return Err(AppError::DataIntegrity(format!(
                        "similarity score ({}, {}) is not finite",
                        i, j
                    )));
                }
            }
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if (rows[i][j] - rows[j][i]).abs() > SCORE_EPSILON {
                    return Err(AppError::DataIntegrity(format!(
                        "similarity matrix is asymmetric at ({}, {}): {} != {}",
                        i, j, rows[i][j], rows[j][i]
                    )));
                }
            }
        }

        for (i, row) in rows.iter().enumerate() {
            let row_max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            if rows[i][i] + SCORE_EPSILON < row_max {
                return Err(AppError::DataIntegrity(format!(
                    "diagonal entry {} ({}) is below its row maximum ({})",
                    i, rows[i][i], row_max
                )));
            }
        }

        Ok(Self { rows })
    }

    /// Number of movies the matrix covers
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Similarity score between two catalog rows
    ///
    /// Indices must be below `len()`.
    pub fn score(&self, i: usize, j: usize) -> f32 {
        self.rows[i][j]
    }

    /// Ranks all other rows by descending similarity to `index`
    ///
    /// The queried row itself is excluded by position, so a duplicate movie
    /// with an identical score row stays eligible. Ties keep ascending row
    /// order: the sort is stable over a list built in catalog order. At most
    /// `limit` entries are returned.
    pub fn neighbors(&self, index: usize, limit: usize) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self.rows[index]
            .iter()
            .copied()
            .enumerate()
            .filter(|(j, _)| *j != index)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);
        scored
    }
}
