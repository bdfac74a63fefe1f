use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::{debug, info};

use crate::data::dataset::Samples;
use crate::error::{PipelineError, Result};

/// Disjoint train/test partition of a `Samples` set.
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Samples,
    pub test: Samples,
    /// Row indices into the input that went to each side.
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Stratified train/test split.
///
/// The test side gets `ceil(test_fraction * n)` rows. Each class contributes
/// to it in proportion to its frequency; leftover rows after flooring go to
/// the classes with the largest fractional share. Rows are picked per class
/// from a shuffle seeded with `seed`, so equal inputs and seeds always give
/// the same partition.
pub fn stratified_split(
    samples: &Samples,
    num_classes: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<Split> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "test_fraction must be in (0, 1), got {}",
            test_fraction
        )));
    }
    let n = samples.len();
    let n_test = (test_fraction * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::EmptyData(format!(
            "cannot split {} rows with test_fraction {}",
            n, test_fraction
        )));
    }

    let counts = samples.class_counts(num_classes);
    let test_counts = allocate(&counts, n_test);
    debug!("Per-class test allocation: {:?}", test_counts);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train_indices = Vec::with_capacity(n - n_test);
    let mut test_indices = Vec::with_capacity(n_test);

    for (class, &k) in test_counts.iter().enumerate() {
        let mut members: Vec<usize> = (0..n).filter(|&i| samples.y[i] == class).collect();
        members.shuffle(&mut rng);
        test_indices.extend_from_slice(&members[..k]);
        train_indices.extend_from_slice(&members[k..]);
    }

    // Interleave classes so neither side is grouped by label.
    train_indices.shuffle(&mut rng);
    test_indices.shuffle(&mut rng);

    info!("Training set: {} samples", train_indices.len());
    info!("Testing set: {} samples", test_indices.len());

    Ok(Split {
        train: samples.select(&train_indices),
        test: samples.select(&test_indices),
        train_indices,
        test_indices,
    })
}

/// Splits `total` across classes proportionally to `counts` using
/// largest-remainder rounding. Ties go to the lower class index and no class
/// receives more than it has.
fn allocate(counts: &[usize], total: usize) -> Vec<usize> {
    let n: usize = counts.iter().sum();
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| total as f64 * c as f64 / n as f64)
        .collect();
    let mut alloc: Vec<usize> = exact
        .iter()
        .zip(counts)
        .map(|(&e, &c)| (e.floor() as usize).min(c))
        .collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.partial_cmp(&fa).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });

    let mut remaining = total - alloc.iter().sum::<usize>();
    while remaining > 0 {
        let before = remaining;
        for &class in &order {
            if remaining == 0 {
                break;
            }
            if alloc[class] < counts[class] {
                alloc[class] += 1;
                remaining -= 1;
            }
        }
        if remaining == before {
            break;
        }
    }
    alloc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{cleaner::clean, loader::load_iris};
    use crate::math::matrix::Matrix;
    use proptest::prelude::*;

    fn iris() -> Samples {
        clean(&load_iris().unwrap()).0
    }

    fn synthetic(labels: Vec<usize>) -> Samples {
        let x = Matrix::from_data(labels.iter().enumerate().map(|(i, _)| vec![i as f64; 4]).collect());
        Samples::new(x, labels)
    }

    #[test]
    fn iris_split_has_thirty_test_rows_ten_per_class() {
        let split = stratified_split(&iris(), 3, 0.2, 42).unwrap();
        assert_eq!(split.test.len(), 30);
        assert_eq!(split.train.len(), 119);
        assert_eq!(split.test.class_counts(3), vec![10, 10, 10]);
    }

    #[test]
    fn same_seed_gives_same_partition() {
        let data = iris();
        let a = stratified_split(&data, 3, 0.2, 42).unwrap();
        let b = stratified_split(&data, 3, 0.2, 42).unwrap();
        assert_eq!(a.test_indices, b.test_indices);
        assert_eq!(a.train_indices, b.train_indices);
        let c = stratified_split(&data, 3, 0.2, 7).unwrap();
        assert_ne!(a.test_indices, c.test_indices);
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        assert!(matches!(
            stratified_split(&iris(), 3, 1.0, 0),
            Err(PipelineError::InvalidParameter(_))
        ));
        assert!(matches!(
            stratified_split(&iris(), 3, 0.0, 0),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn allocation_uses_largest_remainder() {
        assert_eq!(allocate(&[50, 50, 49], 30), vec![10, 10, 10]);
        assert_eq!(allocate(&[5, 3, 2], 5), vec![3, 1, 1]);
        assert_eq!(allocate(&[1, 9], 3), vec![0, 3]);
    }

    proptest! {
        #[test]
        fn partition_is_disjoint_complete_and_stratified(
            labels in prop::collection::vec(0usize..3, 40..200),
            fraction in 0.1f64..0.5,
            seed in any::<u64>(),
        ) {
            let data = synthetic(labels);
            let split = stratified_split(&data, 3, fraction, seed).unwrap();
            let n = data.len();

            prop_assert_eq!(split.train.len() + split.test.len(), n);
            prop_assert_eq!(split.test.len(), (fraction * n as f64).ceil() as usize);

            let mut all: Vec<usize> = split.train_indices.iter().chain(&split.test_indices).cloned().collect();
            all.sort_unstable();
            prop_assert_eq!(all, (0..n).collect::<Vec<_>>());

            let counts = data.class_counts(3);
            let test_counts = split.test.class_counts(3);
            for c in 0..3 {
                let expected = fraction_of(counts[c], n) * split.test.len() as f64;
                prop_assert!((test_counts[c] as f64 - expected).abs() <= 1.0);
            }
        }
    }

    fn fraction_of(count: usize, n: usize) -> f64 {
        count as f64 / n as f64
    }
}
