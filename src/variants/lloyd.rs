use crate::dataset::Dataset;
use crate::distances::Distance;
use crate::errors::{ClusterError, Result};
use crate::primitives::Primitive;
use crate::{EmptyClusterPolicy, KMeans, KMeansConfig, KMeansState, Termination};
use rand::prelude::*;

pub(crate) struct Lloyd<T, M, D>
where
    T: Primitive,
    M: Dataset<T>,
    D: Distance<T>,
{
    _p: std::marker::PhantomData<(T, M, D)>,
}

impl<T, M, D> Lloyd<T, M, D>
where
    T: Primitive,
    M: Dataset<T>,
    D: Distance<T>,
{
    /// Update step: recompute each centroid as the coordinate-wise mean of
    /// its assigned samples. Clusters without members are resolved by the
    /// configured [`EmptyClusterPolicy`].
    fn update_centroids(data: &KMeans<T, M, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        let dims = data.data.sample_dims();
        let sample_cnt = data.data.sample_cnt();
        let k = state.k;

        data.update_cluster_frequencies(&state.assignments, &mut state.centroid_frequency);

        // Sum all samples of a cluster together; division happens per cluster
        // below, once the frequency is known.
        let mut sums = vec![T::zero(); dims * k];
        for idx in 0..sample_cnt {
            let centroid_id = state.assignments[idx];
            data.data.point(idx).add_to(&mut sums[dims * centroid_id..dims * (centroid_id + 1)]);
        }

        for ci in 0..k {
            let freq = state.centroid_frequency[ci];
            if freq == 0 {
                match config.empty_cluster_policy {
                    EmptyClusterPolicy::RetainCentroid => {
                        log::debug!("cluster {} has no members, retaining previous centroid", ci);
                    }
                    EmptyClusterPolicy::Reseed => {
                        let idx = config.rnd.borrow_mut().gen_range(0..sample_cnt);
                        state.set_centroid_from(ci, &data.data.point(idx));
                        log::debug!("cluster {} has no members, reseeded from sample {}", ci, idx);
                    }
                    EmptyClusterPolicy::Fail => return Err(ClusterError::EmptyCluster { cluster: ci }),
                }
                continue;
            }
            let freq = T::from(freq).unwrap();
            state
                .centroid_mut(ci)
                .iter_mut()
                .zip(sums[dims * ci..dims * (ci + 1)].iter())
                .for_each(|(c, &s)| *c = s / freq);
        }
        Ok(())
    }

    pub(crate) fn calculate<'a, F>(
        data: &KMeans<T, M, D>, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>,
    ) -> Result<KMeansState<T>>
    where
        for<'c> F: FnOnce(&KMeans<T, M, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
    {
        let sample_cnt = data.data.sample_cnt();
        if k == 0 || k > sample_cnt {
            return Err(ClusterError::InvalidArgument(format!(
                "k must be within 1..={} (sample count), got {}",
                sample_cnt, k
            )));
        }
        if max_iter == 0 {
            return Err(ClusterError::InvalidArgument("max_iter must be greater than zero".into()));
        }

        let mut state = KMeansState::new(sample_cnt, data.data.sample_dims(), k);

        // Initialize clusters and notify subscriber
        init(data, &mut state, config);
        (config.init_done)(&state);

        let mut prev_assignments: Option<Vec<usize>> = None;
        for iteration in 1..=max_iter {
            data.update_cluster_assignments(&mut state, None);
            Self::update_centroids(data, &mut state, config)?;

            // Assignment stability is the sole termination test; centroid
            // movement is not consulted.
            if let Some(prev) = &prev_assignments {
                let changed = prev.iter().zip(state.assignments.iter()).filter(|(p, c)| p != c).count();
                log::debug!("iteration {}: {} samples changed their cluster assignment", iteration, changed);
                if changed == 0 {
                    state.termination = Termination::Converged { iterations: iteration };
                    break;
                }
            }

            let new_heterogeneity = data.heterogeneity(&state.centroids, &state.assignments);
            if config.record_heterogeneity && iteration > 1 {
                state.heterogeneity_history.push(new_heterogeneity);
            }

            // Notify subscriber about finished iteration
            (config.iteration_done)(&state, iteration, new_heterogeneity);
            state.heterogeneity = new_heterogeneity;
            prev_assignments = Some(state.assignments.clone());
        }
        if state.termination == Termination::Running {
            state.termination = Termination::MaxIterReached { iterations: max_iter };
        }

        data.update_centroid_distances(&mut state);
        state.heterogeneity = state.centroid_distances.iter().cloned().sum();
        Ok(state)
    }
}
