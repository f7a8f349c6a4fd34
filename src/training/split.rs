//! Seeded, label-stratified train/test split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices on each side of a split, sorted ascending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split row indices so each class keeps its proportion in the test set.
///
/// Every class keeps at least one row on the training side; a class with
/// a single row never reaches the test set.
pub fn stratified_split(labels: &[u8], test_fraction: f64, seed: u64) -> Split {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut indices: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == class)
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            continue;
        }

        indices.shuffle(&mut rng);
        let n_test = ((indices.len() as f64 * test_fraction).round() as usize)
            .min(indices.len() - 1);

        test.extend_from_slice(&indices[..n_test]);
        train.extend_from_slice(&indices[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Split { train, test }
}

/// Copy the selected rows out of a matrix and its labels
pub fn select(features: &[Vec<f64>], labels: &[u8], indices: &[usize]) -> (Vec<Vec<f64>>, Vec<u8>) {
    indices
        .iter()
        .map(|&i| (features[i].clone(), labels[i]))
        .unzip()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_class_proportions() {
        let labels: Vec<u8> = (0..100).map(|i| u8::from(i < 30)).collect();

        let split = stratified_split(&labels, 0.2, 42);

        assert_eq!(split.train.len(), 80);
        assert_eq!(split.test.len(), 20);
        let test_passes = split.test.iter().filter(|&&i| labels[i] == 1).count();
        assert_eq!(test_passes, 6);
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let labels: Vec<u8> = (0..37).map(|i| (i % 3 == 0) as u8).collect();
        let split = stratified_split(&labels, 0.2, 42);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..37).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let labels: Vec<u8> = (0..50).map(|i| (i % 2) as u8).collect();

        assert_eq!(stratified_split(&labels, 0.2, 42), stratified_split(&labels, 0.2, 42));
        assert_ne!(stratified_split(&labels, 0.2, 42), stratified_split(&labels, 0.2, 7));
    }

    #[test]
    fn test_single_class_still_splits() {
        let labels = vec![0u8; 10];
        let split = stratified_split(&labels, 0.2, 42);

        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);
    }

    #[test]
    fn test_singleton_class_stays_in_train() {
        let labels = vec![0, 0, 0, 0, 1];
        let split = stratified_split(&labels, 0.5, 1);

        assert!(split.train.contains(&4));
    }

    #[test]
    fn test_select_rows() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let labels = vec![0, 1, 0];

        let (x, y) = select(&features, &labels, &[0, 2]);

        assert_eq!(x, vec![vec![1.0], vec![3.0]]);
        assert_eq!(y, vec![0, 0]);
    }
}
