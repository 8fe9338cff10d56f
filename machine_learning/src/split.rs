use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::error::{MlErr, Result};

/// Row indices of a train/validation partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Randomly partitions `n` rows into a training and a validation set.
///
/// The validation set holds `ceil(test_fraction * n)` rows. The same `seed` always
/// yields the same partition.
///
/// # Arguments
/// * `n` - The amount of rows.
/// * `test_fraction` - The share of rows withheld for validation, in `(0, 1)`.
/// * `seed` - The seed of the permutation.
///
/// # Errors
/// Fails if `test_fraction` is out of range or either side would end up empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<Split> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(MlErr::InvalidParameter {
            name: "test_fraction",
            reason: "must be in the open interval (0, 1)",
        });
    }

    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(MlErr::NotEnoughSamples { got: n, expected: 2 });
    }

    let mut rows: Vec<usize> = (0..n).collect();
    rows.shuffle(&mut StdRng::seed_from_u64(seed));

    let train = rows.split_off(n_test);
    Ok(Split {
        train,
        validation: rows,
    })
}

/// Partitions `n` rows into `k` contiguous folds, without shuffling.
///
/// The first `n % k` folds hold one extra row.
///
/// # Returns
/// One `Split` per fold, whose validation side is the fold itself.
///
/// # Errors
/// Fails if `k < 2` or there are less rows than folds.
pub fn k_fold(n: usize, k: usize) -> Result<Vec<Split>> {
    if k < 2 {
        return Err(MlErr::InvalidParameter {
            name: "k",
            reason: "at least two folds are required",
        });
    }

    if n < k {
        return Err(MlErr::NotEnoughSamples { got: n, expected: k });
    }

    let (base, extra) = (n / k, n % k);
    let mut start = 0;

    let folds = (0..k)
        .map(|fold| {
            let size = base + usize::from(fold < extra);
            let end = start + size;
            let split = Split {
                train: (0..start).chain(end..n).collect(),
                validation: (start..end).collect(),
            };
            start = end;
            split
        })
        .collect();

    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes_round_validation_up() {
        let split = train_test_split(11, 0.2, 7).unwrap();
        assert_eq!(split.validation.len(), 3);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_split_is_a_partition() {
        let split = train_test_split(50, 0.2, 7).unwrap();

        let mut all: Vec<usize> = split.train.iter().chain(&split.validation).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = train_test_split(100, 0.2, 7).unwrap();
        let b = train_test_split(100, 0.2, 7).unwrap();
        assert_eq!(a, b);

        let c = train_test_split(100, 0.2, 8).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_split_rejects_tiny_inputs() {
        assert!(matches!(
            train_test_split(1, 0.2, 7),
            Err(MlErr::NotEnoughSamples { got: 1, .. })
        ));
        assert!(train_test_split(2, 0.2, 7).is_ok());
    }

    #[test]
    fn test_split_rejects_bad_fraction() {
        assert!(train_test_split(10, 0.0, 7).is_err());
        assert!(train_test_split(10, 1.0, 7).is_err());
        assert!(train_test_split(10, f64::NAN, 7).is_err());
    }

    #[test]
    fn test_k_fold_ragged_sizes() {
        let folds = k_fold(12, 5).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.validation.len()).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);

        assert_eq!(folds[1].validation, vec![3, 4, 5]);
        assert_eq!(folds[1].train, vec![0, 1, 2, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_k_fold_rejects_bad_arguments() {
        assert!(k_fold(10, 1).is_err());
        assert!(k_fold(3, 5).is_err());
    }
}
