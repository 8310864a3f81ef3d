use crate::dataset::Dataset;
use crate::distances::Distance;
use crate::errors::{ClusterError, Result};
use crate::primitives::Primitive;
use crate::{KMeans, KMeansConfig, KMeansState};
use rand::prelude::*;

/// Where the per-run seeds of a multi-run search come from.
#[derive(Clone, Debug)]
pub enum SeedSource {
    /// Caller-supplied seeds. The search evaluates exactly these, one per
    /// run; the list must hold at least `num_runs` entries.
    Provided(Vec<u64>),
    /// Unseeded mode: one seed per run is drawn from the configured random
    /// generator. Deterministic whenever the configuration carries a seeded
    /// generator, which is what automated tests should do.
    Generated,
}

/// Run retained by the multi-run search: the seed it started from and the
/// final state it reached.
#[derive(Clone, Debug)]
pub struct BestRun<T: Primitive> {
    pub seed: u64,
    pub state: KMeansState<T>,
}

pub(crate) fn calculate<T, M, D, F>(
    kmean: &KMeans<T, M, D>, k: usize, max_iter: usize, num_runs: usize, seeds: &SeedSource, init: F,
    config: &KMeansConfig<'_, T>,
) -> Result<BestRun<T>>
where
    T: Primitive,
    M: Dataset<T>,
    D: Distance<T>,
    F: for<'c> Fn(&KMeans<T, M, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
{
    if num_runs == 0 {
        return Err(ClusterError::InvalidArgument("num_runs must be greater than zero".into()));
    }
    if let SeedSource::Provided(list) = seeds {
        if list.len() < num_runs {
            return Err(ClusterError::InvalidArgument(format!(
                "{} runs requested but only {} seeds provided",
                num_runs,
                list.len()
            )));
        }
    }

    let mut best: Option<BestRun<T>> = None;
    let mut last_err: Option<ClusterError> = None;
    for run in 0..num_runs {
        let seed = match seeds {
            SeedSource::Provided(list) => list[run],
            SeedSource::Generated => config.rnd.borrow_mut().next_u64(),
        };
        // Every run owns its own seed-derived generator, so runs stay
        // reproducible and independent of each other.
        let run_config = config.reseeded(StdRng::seed_from_u64(seed));
        match crate::variants::Lloyd::calculate(kmean, k, max_iter, &init, &run_config) {
            Ok(state) => {
                log::info!(
                    "run {}/{} (seed {}): heterogeneity {}",
                    run + 1,
                    num_runs,
                    seed,
                    state.heterogeneity
                );
                // strict comparison: on equal scores the first-seen run wins
                if best.as_ref().map_or(true, |b| state.heterogeneity < b.state.heterogeneity) {
                    best = Some(BestRun { seed, state });
                }
            }
            Err(err) => {
                log::warn!("run {}/{} (seed {}) failed: {}", run + 1, num_runs, seed, err);
                last_err = Some(err);
            }
        }
    }
    match best {
        Some(best) => Ok(best),
        None => Err(last_err
            .unwrap_or_else(|| ClusterError::InvalidArgument("no run was executed".into()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DenseMatrix;
    use crate::distances::EuclideanDistance;
    use crate::EmptyClusterPolicy;
    use std::cell::Cell;

    fn blob_engine() -> KMeans<f64, DenseMatrix<f64>, EuclideanDistance> {
        #[rustfmt::skip]
        let samples = vec![
            0.0, 0.0,   0.1, 0.2,   0.2, 0.1,   0.3, 0.3,
            10.0, 10.0, 10.1, 10.2, 10.2, 10.1, 10.3, 10.3,
            20.0, 0.0,  20.1, 0.2,  20.2, 0.1,  20.3, 0.3,
        ];
        KMeans::new(DenseMatrix::new(samples, 12, 2).unwrap(), EuclideanDistance)
    }

    #[test]
    fn provided_seeds_select_the_minimum_heterogeneity_run() {
        let kmean = blob_engine();
        let seeds = vec![1u64, 2, 3];
        let best = kmean
            .kmeans_best_of(3, 100, 3, &SeedSource::Provided(seeds.clone()), &KMeansConfig::default())
            .unwrap();

        // Replay each seed by hand; the driver must have returned the best
        // of exactly these runs.
        let mut manual: Vec<(u64, f64)> = Vec::new();
        for &seed in &seeds {
            let conf = KMeansConfig::build()
                .random_generator(StdRng::seed_from_u64(seed))
                .build();
            let state = kmean.kmeans_lloyd(3, 100, KMeans::init_kmeanplusplus, &conf).unwrap();
            manual.push((seed, state.heterogeneity));
        }
        let (expected_seed, expected_het) = manual
            .iter()
            .cloned()
            .reduce(|a, b| if b.1 < a.1 { b } else { a })
            .unwrap();

        assert!(seeds.contains(&best.seed));
        assert_eq!(best.seed, expected_seed);
        assert_eq!(best.state.heterogeneity, expected_het);
    }

    #[test]
    fn every_provided_seed_is_evaluated_exactly_once() {
        let runs = Cell::new(0usize);
        let count_inits = |_state: &KMeansState<f64>| runs.set(runs.get() + 1);

        let kmean = blob_engine();
        let conf = KMeansConfig::build().init_done(&count_inits).build();
        kmean
            .kmeans_best_of(3, 100, 3, &SeedSource::Provided(vec![1, 2, 3]), &conf)
            .unwrap();
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn generated_seeds_are_reproducible_with_a_seeded_generator() {
        let kmean = blob_engine();
        let run = |seed: u64| {
            let conf = KMeansConfig::build()
                .random_generator(StdRng::seed_from_u64(seed))
                .build();
            kmean.kmeans_best_of(3, 100, 4, &SeedSource::Generated, &conf).unwrap()
        };
        let a = run(99);
        let b = run(99);
        assert_eq!(a.seed, b.seed);
        assert_eq!(a.state.heterogeneity, b.state.heterogeneity);
        assert_eq!(a.state.assignments, b.state.assignments);
    }

    #[test]
    fn zero_runs_are_rejected() {
        let kmean = blob_engine();
        let res = kmean.kmeans_best_of(3, 100, 0, &SeedSource::Generated, &KMeansConfig::default());
        assert!(matches!(res, Err(ClusterError::InvalidArgument(_))));
    }

    #[test]
    fn short_seed_list_is_rejected() {
        let kmean = blob_engine();
        let res = kmean.kmeans_best_of(3, 100, 3, &SeedSource::Provided(vec![1, 2]), &KMeansConfig::default());
        assert!(matches!(res, Err(ClusterError::InvalidArgument(_))));
    }

    #[test]
    fn search_fails_only_when_every_run_failed() {
        let kmean = KMeans::new(
            DenseMatrix::new(vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0], 3, 2).unwrap(),
            EuclideanDistance,
        );
        let conf = KMeansConfig::build()
            .empty_cluster_policy(EmptyClusterPolicy::Fail)
            .build();
        // Identical samples mean every k = 2 run produces an empty cluster.
        let res = kmean.kmeans_best_of(2, 10, 3, &SeedSource::Provided(vec![1, 2, 3]), &conf);
        assert!(matches!(res, Err(ClusterError::EmptyCluster { .. })));
    }
}
