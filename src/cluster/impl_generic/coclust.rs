//! Co-clustering counts over bootstrap runs.
//!
//! A bootstrap run clusters a resample of the rows. For every pair of rows the
//! matrix counts how often both were drawn into the same resample (trials) and
//! how often they then landed in the same cluster. Resamples may repeat a row;
//! repeats are counted with their multiplicity.

use rayon::prelude::*;

use crate::cluster::error::{ClusterError, ClusterResult};

/// Pairwise trial and co-membership counts for `n` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoclustMatrix {
    n: usize,
    trials: Vec<u32>,
    together: Vec<u32>,
}

impl CoclustMatrix {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            trials: vec![0; n * n],
            together: vec![0; n * n],
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n
    }

    /// Record that the rows of `sample_rows` were drawn together.
    pub fn add_trial(&mut self, sample_rows: &[usize]) -> ClusterResult<()> {
        self.check_rows(sample_rows)?;
        for &i in sample_rows {
            let row = &mut self.trials[i * self.n..(i + 1) * self.n];
            for &j in sample_rows {
                row[j] += 1;
            }
        }
        Ok(())
    }

    /// Record the clustering of one resample.
    ///
    /// `labels[t]` is the cluster of `sample_rows[t]`.
    pub fn add_run(&mut self, sample_rows: &[usize], labels: &[usize]) -> ClusterResult<()> {
        if sample_rows.len() != labels.len() {
            return Err(ClusterError::Configuration {
                arg: "labels",
                reason: format!(
                    "{} labels for {} sampled rows",
                    labels.len(),
                    sample_rows.len()
                ),
            });
        }
        self.check_rows(sample_rows)?;
        for (&i, &li) in sample_rows.iter().zip(labels) {
            let row = &mut self.together[i * self.n..(i + 1) * self.n];
            for (&j, &lj) in sample_rows.iter().zip(labels) {
                if li == lj {
                    row[j] += 1;
                }
            }
        }
        Ok(())
    }

    /// Times rows `i` and `j` were sampled together.
    pub fn trials(&self, i: usize, j: usize) -> u32 {
        self.trials[i * self.n + j]
    }

    /// Times rows `i` and `j` were clustered together.
    pub fn together(&self, i: usize, j: usize) -> u32 {
        self.together[i * self.n + j]
    }

    /// Share of joint trials in which `i` and `j` shared a cluster.
    ///
    /// `None` if the pair was never sampled together.
    pub fn fraction(&self, i: usize, j: usize) -> Option<f64> {
        match self.trials(i, j) {
            0 => None,
            t => Some(self.together(i, j) as f64 / t as f64),
        }
    }

    /// Add the counts of another matrix over the same rows.
    pub fn merge(&mut self, other: &Self) -> ClusterResult<()> {
        if other.n != self.n {
            return Err(ClusterError::Configuration {
                arg: "other",
                reason: format!("cannot merge {} rows into {} rows", other.n, self.n),
            });
        }
        self.trials
            .par_iter_mut()
            .zip(other.trials.par_iter())
            .for_each(|(a, b)| *a += b);
        self.together
            .par_iter_mut()
            .zip(other.together.par_iter())
            .for_each(|(a, b)| *a += b);
        Ok(())
    }

    fn check_rows(&self, rows: &[usize]) -> ClusterResult<()> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.n) {
            return Err(ClusterError::Configuration {
                arg: "sample_rows",
                reason: format!("row {bad} out of range for {} rows", self.n),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_fraction() {
        let mut cc = CoclustMatrix::new(4);
        cc.add_trial(&[0, 1, 2]).unwrap();
        cc.add_run(&[0, 1, 2], &[0, 0, 1]).unwrap();
        cc.add_trial(&[0, 1, 3]).unwrap();
        cc.add_run(&[0, 1, 3], &[1, 0, 1]).unwrap();

        assert_eq!(cc.trials(0, 1), 2);
        assert_eq!(cc.together(0, 1), 1);
        assert_eq!(cc.fraction(0, 1), Some(0.5));
        assert_eq!(cc.fraction(0, 3), Some(1.0));
        assert_eq!(cc.fraction(2, 3), None);
        assert_eq!(cc.trials(1, 0), cc.trials(0, 1));
        assert_eq!(cc.fraction(2, 2), Some(1.0));
    }

    #[test]
    fn test_repeated_rows_count_with_multiplicity() {
        let mut cc = CoclustMatrix::new(2);
        cc.add_trial(&[0, 0, 1]).unwrap();
        assert_eq!(cc.trials(0, 0), 4);
        assert_eq!(cc.trials(0, 1), 2);
    }

    #[test]
    fn test_merge() {
        let mut a = CoclustMatrix::new(3);
        a.add_trial(&[0, 1]).unwrap();
        a.add_run(&[0, 1], &[2, 2]).unwrap();
        let mut b = CoclustMatrix::new(3);
        b.add_trial(&[0, 1, 2]).unwrap();
        b.add_run(&[0, 1, 2], &[0, 1, 1]).unwrap();

        a.merge(&b).unwrap();
        assert_eq!(a.trials(0, 1), 2);
        assert_eq!(a.together(0, 1), 1);
        assert_eq!(a.together(1, 2), 1);
        assert!(a.merge(&CoclustMatrix::new(2)).is_err());
    }

    #[test]
    fn test_invalid_input() {
        let mut cc = CoclustMatrix::new(2);
        assert!(cc.add_trial(&[0, 2]).is_err());
        assert!(cc.add_run(&[0, 1], &[0]).is_err());
        assert_eq!(cc, CoclustMatrix::new(2));
    }
}
