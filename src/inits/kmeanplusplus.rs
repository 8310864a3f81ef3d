use crate::dataset::Dataset;
use crate::distances::Distance;
use crate::primitives::Primitive;
use crate::{KMeans, KMeansConfig, KMeansState};
use num::Zero;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::ops::DerefMut;

#[inline(always)]
pub fn calculate<T, M, D>(kmean: &KMeans<T, M, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>)
where
    T: Primitive,
    M: Dataset<T>,
    D: Distance<T>,
{
    let sample_cnt = kmean.data.sample_cnt();
    {
        // Randomly select first centroid
        let first_idx = config.rnd.borrow_mut().gen_range(0..sample_cnt);
        state.set_centroid_from(0, &kmean.data.point(first_idx));
    }
    for k in 1..state.k {
        // For each following centroid...
        // Calculate the squared distances to the nearest already-chosen centroid
        kmean.update_cluster_assignments(state, Some(k));
        let distsum: T = state.centroid_distances.iter().cloned().sum();

        // Normalize the distances into each sample's probability of becoming
        // the next centroid, then draw while respecting those probabilities.
        let sampled_centroid_id = if distsum.is_zero() {
            // every sample coincides with an already-chosen centroid
            config.rnd.borrow_mut().gen_range(0..sample_cnt)
        } else {
            let centroid_probabilities: Vec<T> =
                state.centroid_distances.iter().cloned().map(|d| d / distsum).collect();
            match WeightedIndex::new(centroid_probabilities) {
                Ok(centroid_index) => centroid_index.sample(config.rnd.borrow_mut().deref_mut()),
                Err(_) => config.rnd.borrow_mut().gen_range(0..sample_cnt),
            }
        };
        state.set_centroid_from(k, &kmean.data.point(sampled_centroid_id));
    }
}

#[cfg(test)]
mod tests {
    use crate::dataset::DenseMatrix;
    use crate::distances::EuclideanDistance;
    use crate::{KMeans, KMeansConfig, KMeansState};
    use rand::prelude::*;

    fn init_with_seed(samples: Vec<f64>, cnt: usize, dims: usize, k: usize, seed: u64) -> Vec<f64> {
        let kmean: KMeans<f64, _, _> =
            KMeans::new(DenseMatrix::new(samples, cnt, dims).unwrap(), EuclideanDistance);
        let mut state = KMeansState::new(cnt, dims, k);
        let conf = KMeansConfig::build()
            .random_generator(StdRng::seed_from_u64(seed))
            .build();
        KMeans::init_kmeanplusplus(&kmean, &mut state, &conf);
        state.centroids
    }

    #[test]
    fn same_seed_reproduces_the_same_centroids() {
        let samples = vec![0.0, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0, 5.0, 5.0, 6.0, 5.0];
        let a = init_with_seed(samples.clone(), 6, 2, 3, 42);
        let b = init_with_seed(samples, 6, 2, 3, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn chosen_centroids_are_members_of_the_dataset() {
        let samples = vec![0.0, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0, 5.0, 5.0, 6.0, 5.0];
        let centroids = init_with_seed(samples.clone(), 6, 2, 3, 7);
        for c in centroids.chunks_exact(2) {
            assert!(samples.chunks_exact(2).any(|s| s == c));
        }
    }

    #[test]
    fn degenerate_dataset_of_identical_points_still_initializes() {
        // all distances are zero, so the weighted draw has no valid
        // distribution and falls back to a uniform one
        let samples = vec![3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0, 3.0];
        let centroids = init_with_seed(samples, 4, 2, 2, 1);
        assert_eq!(centroids, vec![3.0, 3.0, 3.0, 3.0]);
    }
}
