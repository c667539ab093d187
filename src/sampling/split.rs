//! Stratified train/test splitting
//!
//! Class proportions are kept on both sides: each class contributes to
//! the training set in proportion to its frequency, the rounding remainder
//! going to the classes with the largest fractional share. The test set is
//! then drawn the same way from the members left over.

use std::collections::BTreeMap;

use log::{debug, info};
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::{Rng, SeedableRng};

use super::errors::SplitError;

pub const DEFAULT_TEST_FRACTION: f64 = 0.1;
pub const DEFAULT_SEED: u64 = 42;

/// Train and test partitions of a labeled sample set
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub train_features: Array2<f64>,
    pub test_features: Array2<f64>,
    pub train_labels: Array1<i16>,
    pub test_labels: Array1<i16>,
    /// Source row of each training sample
    pub train_indices: Vec<usize>,
    /// Source row of each test sample
    pub test_indices: Vec<usize>,
}

impl TrainTestSplit {
    pub fn train_len(&self) -> usize {
        self.train_labels.len()
    }

    pub fn test_len(&self) -> usize {
        self.test_labels.len()
    }
}

/// Seeded stratified shuffle splitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StratifiedSplitter {
    test_fraction: f64,
    seed: u64,
}

impl Default for StratifiedSplitter {
    fn default() -> Self {
        StratifiedSplitter::new(DEFAULT_TEST_FRACTION, DEFAULT_SEED)
    }
}

impl StratifiedSplitter {
    pub fn new(test_fraction: f64, seed: u64) -> Self {
        StratifiedSplitter { test_fraction, seed }
    }

    /// Training and test set sizes for `n` samples
    pub fn partition_sizes(&self, n: usize) -> Result<(usize, usize), SplitError> {
        if n == 0 {
            return Err(SplitError::Empty);
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(SplitError::InvalidFraction(self.test_fraction));
        }

        let n_test = (self.test_fraction * n as f64).ceil() as usize;
        let n_train = n - n_test.min(n);
        if n_train == 0 {
            return Err(SplitError::EmptyTrainSet {
                fraction: self.test_fraction,
                samples: n,
            });
        }
        Ok((n_train, n_test))
    }

    /// Splits feature rows and labels into stratified partitions
    pub fn split(&self, features: &Array2<f64>, labels: &Array1<i16>) -> Result<TrainTestSplit, SplitError> {
        if features.nrows() != labels.len() {
            return Err(SplitError::LengthMismatch {
                features: features.nrows(),
                labels: labels.len(),
            });
        }

        let labels_vec = labels.to_vec();
        let (train_indices, test_indices) = self.split_indices(&labels_vec)?;

        let take = |indices: &[usize]| -> Array1<i16> { indices.iter().map(|i| labels_vec[*i]).collect() };
        Ok(TrainTestSplit {
            train_features: features.select(Axis(0), &train_indices),
            test_features: features.select(Axis(0), &test_indices),
            train_labels: take(&train_indices),
            test_labels: take(&test_indices),
            train_indices,
            test_indices,
        })
    }

    /// Source row indices of the training and test partitions
    pub fn split_indices(&self, labels: &[i16]) -> Result<(Vec<usize>, Vec<usize>), SplitError> {
        let (n_train, n_test) = self.partition_sizes(labels.len())?;

        // members of each class in input order, classes ascending
        let mut members: BTreeMap<i16, Vec<usize>> = BTreeMap::new();
        for (index, class) in labels.iter().enumerate() {
            members.entry(*class).or_default().push(index);
        }
        let classes: Vec<(i16, Vec<usize>)> = members.into_iter().collect();
        let counts: Vec<usize> = classes.iter().map(|(_, m)| m.len()).collect();

        if let Some((class, m)) = classes.iter().min_by_key(|(_, m)| m.len()).filter(|(_, m)| m.len() < 2) {
            return Err(SplitError::ClassTooSmall { class: *class, count: m.len() });
        }
        for (partition, size) in [("Training set", n_train), ("Test set", n_test)] {
            if size < classes.len() {
                return Err(SplitError::PartitionTooSmall {
                    partition,
                    size,
                    classes: classes.len(),
                });
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let train_counts = approximate_mode(&counts, n_train, &mut rng);
        let remaining: Vec<usize> = counts.iter().zip(&train_counts).map(|(c, t)| c - t).collect();
        let test_counts = approximate_mode(&remaining, n_test, &mut rng);
        debug!("Per-class train counts {:?}, test counts {:?}", train_counts, test_counts);

        let mut train = Vec::with_capacity(n_train);
        let mut test = Vec::with_capacity(n_test);
        for (i, (_, class_members)) in classes.iter().enumerate() {
            let mut shuffled = class_members.clone();
            shuffled.shuffle(&mut rng);
            train.extend_from_slice(&shuffled[..train_counts[i]]);
            test.extend_from_slice(&shuffled[train_counts[i]..train_counts[i] + test_counts[i]]);
        }
        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        info!("Stratified split over {} classes: {} train, {} test", classes.len(), train.len(), test.len());
        Ok((train, test))
    }
}

/// Distributes `draws` over classes in proportion to `counts`
///
/// Each class first gets the floor of its proportional share; the leftover
/// draws go to the classes with the largest remainders, ties broken at
/// random.
pub(crate) fn approximate_mode<R: Rng>(counts: &[usize], draws: usize, rng: &mut R) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    // exact integer shares avoid float ties going astray
    let mut allocation: Vec<usize> = counts.iter().map(|c| c * draws / total).collect();
    let remainders: Vec<usize> = counts.iter().map(|c| c * draws % total).collect();
    let mut need = draws - allocation.iter().sum::<usize>();

    let mut levels: Vec<usize> = remainders.iter().copied().filter(|r| *r > 0).collect();
    levels.sort_unstable_by(|a, b| b.cmp(a));
    levels.dedup();

    for level in levels {
        if need == 0 {
            break;
        }
        let tied: Vec<usize> = (0..counts.len()).filter(|i| remainders[*i] == level).collect();
        let take = tied.len().min(need);
        for pick in index::sample(rng, tied.len(), take) {
            allocation[tied[pick]] += 1;
        }
        need -= take;
    }

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels(groups: &[(i16, usize)]) -> Vec<i16> {
        groups.iter().flat_map(|(class, n)| std::iter::repeat(*class).take(*n)).collect()
    }

    fn counts_of(indices: &[usize], labels: &[i16]) -> BTreeMap<i16, usize> {
        let mut counts = BTreeMap::new();
        for i in indices {
            *counts.entry(labels[*i]).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn keeps_class_proportions() {
        let y = labels(&[(1, 70), (2, 30)]);
        let (train, test) = StratifiedSplitter::default().split_indices(&y).unwrap();

        assert_eq!((train.len(), test.len()), (90, 10));
        assert_eq!(counts_of(&train, &y), BTreeMap::from([(1, 63), (2, 27)]));
        assert_eq!(counts_of(&test, &y), BTreeMap::from([(1, 7), (2, 3)]));
    }

    #[test]
    fn partitions_are_disjoint_and_complete() {
        let y = labels(&[(3, 11), (5, 7), (9, 4)]);
        let (train, test) = StratifiedSplitter::new(0.25, 7).split_indices(&y).unwrap();

        let train_set: HashSet<usize> = train.iter().copied().collect();
        let test_set: HashSet<usize> = test.iter().copied().collect();
        assert!(train_set.is_disjoint(&test_set));
        assert_eq!(train_set.len() + test_set.len(), y.len());
        assert_eq!(test.len(), 6);
        for class in [3, 5, 9] {
            assert!(counts_of(&test, &y).contains_key(&class));
            assert!(counts_of(&train, &y).contains_key(&class));
        }
    }

    #[test]
    fn same_seed_gives_same_split() {
        let y = labels(&[(1, 20), (2, 15), (3, 9)]);
        let splitter = StratifiedSplitter::new(0.2, 42);
        assert_eq!(splitter.split_indices(&y).unwrap(), splitter.split_indices(&y).unwrap());
    }

    #[test]
    fn singleton_class_fails() {
        let y = vec![1, 1, 2];
        let result = StratifiedSplitter::new(1.0 / 3.0, 42).split_indices(&y);
        assert_eq!(result, Err(SplitError::ClassTooSmall { class: 2, count: 1 }));
    }

    #[test]
    fn degenerate_inputs_fail() {
        assert_eq!(StratifiedSplitter::default().split_indices(&[]), Err(SplitError::Empty));
        assert_eq!(StratifiedSplitter::new(0.0, 1).split_indices(&[1, 1]), Err(SplitError::InvalidFraction(0.0)));
        assert_eq!(StratifiedSplitter::new(1.0, 1).split_indices(&[1, 1]), Err(SplitError::InvalidFraction(1.0)));
        assert!(matches!(
            StratifiedSplitter::new(0.95, 1).split_indices(&labels(&[(1, 5), (2, 5)])),
            Err(SplitError::EmptyTrainSet { .. })
        ));
    }

    #[test]
    fn test_set_smaller_than_class_count_fails() {
        let y = labels(&[(1, 5), (2, 5), (3, 5)]);
        let result = StratifiedSplitter::new(0.1, 42).split_indices(&y);
        assert_eq!(result, Err(SplitError::PartitionTooSmall { partition: "Test set", size: 2, classes: 3 }));
    }

    #[test]
    fn splits_feature_rows_with_labels() {
        let features = Array2::from_shape_fn((20, 2), |(r, c)| (r * 10 + c) as f64);
        let y: Array1<i16> = (0..20).map(|i| if i % 2 == 0 { 1 } else { 2 }).collect();

        let split = StratifiedSplitter::new(0.5, 3).split(&features, &y).unwrap();

        assert_eq!(split.train_len() + split.test_len(), 20);
        for (row, source) in split.test_indices.iter().enumerate() {
            assert_eq!(split.test_features[[row, 0]], (*source * 10) as f64);
            assert_eq!(split.test_labels[row], y[*source]);
        }
    }

    #[test]
    fn mismatched_lengths_fail() {
        let features = Array2::<f64>::zeros((3, 2));
        let y: Array1<i16> = Array1::from(vec![1, 1]);
        assert!(matches!(StratifiedSplitter::default().split(&features, &y), Err(SplitError::LengthMismatch { .. })));
    }

    #[test]
    fn approximate_mode_gives_remainder_to_largest_share() {
        let mut rng = StdRng::seed_from_u64(0);
        // shares 3.5, 2.25, 1.25 of 7 draws
        assert_eq!(approximate_mode(&[14, 9, 5], 7, &mut rng), vec![4, 2, 1]);
        let tied = approximate_mode(&[1, 1, 1], 2, &mut rng);
        assert_eq!(tied.iter().sum::<usize>(), 2);
        assert!(tied.iter().all(|c| *c <= 1));
    }
}
