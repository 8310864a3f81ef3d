use crate::dataset::Dataset;
use crate::distances::Distance;
use crate::driver::{BestRun, SeedSource};
use crate::errors::Result;
use crate::primitives::Primitive;
use rand::prelude::*;
use rayon::prelude::*;
use std::cell::RefCell;
use std::marker::PhantomData;

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, T);

/// Policy applied when a cluster ends up with zero members during the
/// update step.
///
/// The naive mean of an empty cluster is undefined, so the engine has to
/// pick a deterministic resolution instead of propagating NaN centroids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Keep the centroid from the previous iteration. Deterministic and
    /// side-effect free; the cluster may pick up members again later.
    #[default]
    RetainCentroid,
    /// Re-seed the centroid with a randomly drawn sample (drawn from the
    /// configured random generator).
    Reseed,
    /// Abort the run with [`ClusterError::EmptyCluster`](crate::ClusterError::EmptyCluster).
    Fail,
}

/// Configuration for a k-means calculation: the random number generator to
/// use, status callbacks, the empty-cluster policy and whether the
/// per-iteration heterogeneity trail should be recorded.
///
/// For details on the individual options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called when the initialization phase finished.
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration with the current state,
    /// the iteration number, and the iteration's heterogeneity.
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use. Caller-owned; never a process global.
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// What to do when a cluster loses all of its members.
    pub(crate) empty_cluster_policy: EmptyClusterPolicy,
    /// Whether to append the heterogeneity of every iteration (except the
    /// first) to [`KMeansState::heterogeneity_history`].
    pub(crate) record_heterogeneity: bool,
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_, _, _| {},
            rnd: Box::new(RefCell::new(rand::thread_rng())),
            empty_cluster_policy: EmptyClusterPolicy::default(),
            record_heterogeneity: false,
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }

    /// Clone of this configuration with a fresh random generator. Used by
    /// the multi-run driver to give every run its own seed-derived state.
    pub(crate) fn reseeded<R: RngCore + 'static>(&self, rnd: R) -> KMeansConfig<'a, T> {
        KMeansConfig {
            init_done: self.init_done,
            iteration_done: self.iteration_done,
            rnd: Box::new(RefCell::new(rnd)),
            empty_cluster_policy: self.empty_cluster_policy,
            record_heterogeneity: self.record_heterogeneity,
        }
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { Ok(()) }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>,
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after the centroid initialization,
    /// before the iteration starts.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration during a
    /// running k-means calculation.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used in the k-means calculation.
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Set the policy applied when a cluster loses all of its members.
    /// ## Default
    /// [`EmptyClusterPolicy::RetainCentroid`]
    pub fn empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.config.empty_cluster_policy = policy; self
    }
    /// Record the heterogeneity of every iteration (except the first) into
    /// [`KMeansState::heterogeneity_history`], e.g. for plotting the
    /// convergence trend. Off by default.
    pub fn record_heterogeneity(mut self, record: bool) -> Self {
        self.config.record_heterogeneity = record; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}

/// Terminal (or current) state of the convergence loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The loop has not terminated yet (only observable from callbacks).
    Running,
    /// Assignments were identical across two consecutive iterations.
    Converged { iterations: usize },
    /// The iteration cap was reached without assignment stability.
    MaxIterReached { iterations: usize },
}

/// State of a k-means calculation, which is also the final result as
/// returned by the API.
///
/// All mutations happen in this structure, keeping [`KMeans`] immutable and
/// shareable across parallel runs without duplicating the input data.
///
/// ## Fields
/// - **k**: The amount of clusters that were requested for this calculation
/// - **heterogeneity**: Total sum of squared distances from all samples to their respective centroids
/// - **centroids**: Calculated cluster centers \[row-major\] = \[&lt;centroid0&gt;,&lt;centroid1&gt;,...\]
/// - **centroid_frequency**: Amount of samples in each cluster
/// - **assignments**: Vector mapping each sample to its nearest cluster
/// - **centroid_distances**: Each sample's squared distance to its centroid
/// - **heterogeneity_history**: Per-iteration heterogeneity trail (only filled
///   when requested through [`KMeansConfigBuilder::record_heterogeneity`])
/// - **termination**: Which terminal state the convergence loop reached
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub heterogeneity: T,
    pub centroids: Vec<T>,
    pub centroid_frequency: Vec<usize>,
    pub assignments: Vec<usize>,
    pub centroid_distances: Vec<T>,
    pub heterogeneity_history: Vec<T>,
    pub termination: Termination,

    pub(crate) sample_dims: usize,
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            heterogeneity: T::infinity(),
            centroids: vec![T::zero(); sample_dims * k],
            centroid_frequency: vec![0usize; k],
            assignments: vec![0usize; sample_cnt],
            centroid_distances: vec![T::infinity(); sample_cnt],
            heterogeneity_history: Vec::new(),
            termination: Termination::Running,
            sample_dims,
        }
    }

    /// Borrow centroid `idx` as a dense slice.
    pub fn centroid(&self, idx: usize) -> &[T] {
        &self.centroids[self.sample_dims * idx..self.sample_dims * (idx + 1)]
    }

    pub(crate) fn centroid_mut(&mut self, idx: usize) -> &mut [T] {
        &mut self.centroids[self.sample_dims * idx..self.sample_dims * (idx + 1)]
    }

    pub(crate) fn set_centroid_from(&mut self, idx: usize, point: &crate::dataset::PointRef<'_, T>) {
        point.write_dense(self.centroid_mut(idx));
    }
}

/// Entrypoint of this crate's API-surface.
///
/// Create an instance of this struct, giving the dataset to operate on and
/// the distance implementation to measure with. Calculations do not mutate
/// the engine, so multiple runs can share it.
///
/// ## Supported operations
/// - Lloyd's k-means [`KMeans::kmeans_lloyd`]
/// - Multi-run best-of search [`KMeans::kmeans_best_of`]
///
/// ## Supported initialization methods
/// - K-Means++ / weighted [`KMeans::init_kmeanplusplus`]
/// - Random-Sample [`KMeans::init_random_sample`]
/// - Precomputed [`KMeans::init_precomputed`]
pub struct KMeans<T, M, D>
where
    T: Primitive,
    M: Dataset<T>,
    D: Distance<T>,
{
    pub(crate) data: M,
    pub(crate) distance: D,
    _p: PhantomData<T>,
}

impl<T, M, D> KMeans<T, M, D>
where
    T: Primitive,
    M: Dataset<T>,
    D: Distance<T>,
{
    pub fn new(data: M, distance: D) -> Self {
        Self { data, distance, _p: PhantomData }
    }

    pub fn sample_cnt(&self) -> usize { self.data.sample_cnt() }
    pub fn sample_dims(&self) -> usize { self.data.sample_dims() }

    /// Assignment step: map every sample to its nearest centroid, recording
    /// the squared distance alongside. Ties break towards the lowest
    /// centroid index. With `limit_k`, only the first `limit_k` centroids
    /// take part (used during k-means++ initialization).
    pub(crate) fn update_cluster_assignments(&self, state: &mut KMeansState<T>, limit_k: Option<usize>) {
        let k = limit_k.unwrap_or(state.k);
        let dims = self.data.sample_dims();
        let (centroids, assignments, centroid_distances) =
            (&state.centroids, &mut state.assignments, &mut state.centroid_distances);

        // rayon does not do static scheduling, so hand it a work-packet size
        let work_packet_size = (self.data.sample_cnt() / rayon::current_num_threads()).max(1);
        assignments
            .par_iter_mut()
            .zip(centroid_distances.par_iter_mut())
            .enumerate()
            .with_min_len(work_packet_size)
            .for_each(|(idx, (assignment, centroid_dist))| {
                let point = self.data.point(idx);
                let mut best_idx = 0usize;
                let mut best_dist = T::infinity();
                for (ci, c) in centroids.chunks_exact(dims).take(k).enumerate() {
                    let dist = self.distance.sq_distance(&point, c);
                    // strict comparison keeps the first minimum on ties
                    if dist < best_dist {
                        best_idx = ci;
                        best_dist = dist;
                    }
                }
                *assignment = best_idx;
                *centroid_dist = best_dist;
            });
    }

    /// Refresh each sample's squared distance to its currently assigned
    /// centroid, without changing the assignment.
    pub(crate) fn update_centroid_distances(&self, state: &mut KMeansState<T>) {
        let dims = self.data.sample_dims();
        let (centroids, assignments, centroid_distances) =
            (&state.centroids, &state.assignments, &mut state.centroid_distances);

        let work_packet_size = (self.data.sample_cnt() / rayon::current_num_threads()).max(1);
        centroid_distances
            .par_iter_mut()
            .enumerate()
            .with_min_len(work_packet_size)
            .for_each(|(idx, centroid_dist)| {
                let assignment = assignments[idx];
                let centroid = &centroids[dims * assignment..dims * (assignment + 1)];
                *centroid_dist = self.distance.sq_distance(&self.data.point(idx), centroid);
            });
    }

    pub(crate) fn update_cluster_frequencies(&self, assignments: &[usize], centroid_frequency: &mut [usize]) -> usize {
        centroid_frequency.iter_mut().for_each(|v| *v = 0);
        let mut used_centroids_cnt = 0;
        assignments.iter().cloned().for_each(|centroid_id| {
            if centroid_frequency[centroid_id] == 0 {
                used_centroids_cnt += 1;
            }
            centroid_frequency[centroid_id] += 1;
        });
        used_centroids_cnt
    }

    /// Heterogeneity of a clustering: the sum of squared distances from
    /// every sample to its assigned centroid. Pure; used both as the
    /// convergence diagnostic and as the model-selection score.
    ///
    /// Summation is sequential on purpose. Float addition is not
    /// associative, and a fixed summation order is what makes seeded runs
    /// replayable bit for bit.
    pub fn heterogeneity(&self, centroids: &[T], assignments: &[usize]) -> T {
        let dims = self.data.sample_dims();
        (0..self.data.sample_cnt())
            .map(|idx| {
                let assignment = assignments[idx];
                let centroid = &centroids[dims * assignment..dims * (assignment + 1)];
                self.distance.sq_distance(&self.data.point(idx), centroid)
            })
            .sum()
    }

    /// Lloyd's algorithm: alternate nearest-centroid assignment and
    /// mean-update until the assignments stabilize or `max_iter` is reached.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **max_iter**: Cap on the amount of iterations
    /// - **init**: Initialization method to use for the **k** centroids
    /// - **config**: [`KMeansConfig`] instance with the run's options
    ///
    /// ## Returns
    /// The final [`KMeansState`], regardless of whether the run converged or
    /// hit the iteration cap (see [`KMeansState::termination`]).
    ///
    /// ## Example
    /// ```rust
    /// use hardcluster::*;
    ///
    /// let (sample_cnt, sample_dims, k, max_iter) = (3000, 8, 4, 100);
    ///
    /// // Generate some random data
    /// let mut samples = vec![0.0f64; sample_cnt * sample_dims];
    /// samples.iter_mut().for_each(|v| *v = rand::random());
    ///
    /// let data = DenseMatrix::new(samples, sample_cnt, sample_dims)?;
    /// let kmean = KMeans::new(data, EuclideanDistance);
    /// let result = kmean.kmeans_lloyd(k, max_iter, KMeans::init_kmeanplusplus, &KMeansConfig::default())?;
    ///
    /// println!("Centroids: {:?}", result.centroids);
    /// println!("Cluster-Assignments: {:?}", result.assignments);
    /// println!("Heterogeneity: {}", result.heterogeneity);
    /// # Ok::<(), hardcluster::ClusterError>(())
    /// ```
    pub fn kmeans_lloyd<'a, F>(&self, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
    where
        for<'c> F: FnOnce(&KMeans<T, M, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>),
    {
        crate::variants::Lloyd::calculate(self, k, max_iter, init, config)
    }

    /// Multi-run search: run [`KMeans::kmeans_lloyd`] once per seed with the
    /// weighted (k-means++) initialization and keep the run with the lowest
    /// final heterogeneity. On equal scores the first-seen run wins.
    ///
    /// Runs that fail (e.g. under [`EmptyClusterPolicy::Fail`]) are skipped
    /// with a warning; the search itself only fails when every run failed.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **max_iter**: Cap on the amount of iterations per run
    /// - **num_runs**: Amount of independent runs
    /// - **seeds**: Where the per-run seeds come from, see [`SeedSource`]
    /// - **config**: [`KMeansConfig`] shared by all runs; its random
    ///   generator only draws seeds in [`SeedSource::Generated`] mode, each
    ///   run itself uses a fresh generator derived from its seed
    pub fn kmeans_best_of<'a>(
        &self, k: usize, max_iter: usize, num_runs: usize, seeds: &SeedSource, config: &KMeansConfig<'a, T>,
    ) -> Result<BestRun<T>> {
        crate::driver::calculate(self, k, max_iter, num_runs, seeds, Self::init_kmeanplusplus, config)
    }

    /// K-Means++ initialization method (weighted farthest-point seeding).
    ///
    /// ## Description
    /// Selects the first centroid uniformly at random. Every following
    /// centroid is drawn from the samples with probability proportional to
    /// the squared distance to the nearest already-chosen centroid, biasing
    /// selection towards points far away from existing centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to
    /// it to an instance-method of [`KMeans`].
    pub fn init_kmeanplusplus<'c>(kmean: &KMeans<T, M, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'c, T>) {
        crate::inits::kmeanplusplus::calculate(kmean, state, config);
    }

    /// Random sample initialization method (a.k.a. Forgy).
    ///
    /// ## Description
    /// Draws k samples uniformly **with replacement** and uses them as the
    /// initial centroids. Duplicate draws are permitted, matching simple
    /// random initialization.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to
    /// it to an instance-method of [`KMeans`].
    pub fn init_random_sample<'c>(kmean: &KMeans<T, M, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'c, T>) {
        crate::inits::randomsample::calculate(kmean, state, config);
    }

    /// Precomputed initialization: use the passed centroids (row-major,
    /// `k * sample_dims` values) as the initial centroid set.
    pub fn init_precomputed(
        computed: Vec<T>,
    ) -> impl for<'c> FnOnce(&KMeans<T, M, D>, &mut KMeansState<T>, &KMeansConfig<'c, T>) {
        move |kmean, state, _config| crate::inits::precomputed::calculate(kmean, state, computed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DenseMatrix;
    use crate::distances::EuclideanDistance;
    use crate::errors::ClusterError;

    fn engine(samples: Vec<f64>, cnt: usize, dims: usize) -> KMeans<f64, DenseMatrix<f64>, EuclideanDistance> {
        KMeans::new(DenseMatrix::new(samples, cnt, dims).unwrap(), EuclideanDistance)
    }

    #[test]
    fn assignment_is_idempotent_for_fixed_centroids() {
        let kmean = engine(vec![0.0, 0.0, 0.0, 1.0, 10.0, 0.0, 10.0, 1.0], 4, 2);
        let mut state = KMeansState::new(4, 2, 2);
        state.centroids = vec![0.0, 0.5, 10.0, 0.5];

        kmean.update_cluster_assignments(&mut state, None);
        let first = state.assignments.clone();
        kmean.update_cluster_assignments(&mut state, None);
        assert_eq!(state.assignments, first);
        assert_eq!(first, vec![0, 0, 1, 1]);
    }

    #[test]
    fn ties_break_towards_the_lowest_centroid_index() {
        let kmean = engine(vec![0.0, 0.0], 1, 2);
        let mut state = KMeansState::new(1, 2, 2);
        state.centroids = vec![-1.0, 0.0, 1.0, 0.0];

        kmean.update_cluster_assignments(&mut state, None);
        assert_eq!(state.assignments, vec![0]);
        assert_eq!(state.centroid_distances, vec![1.0]);
    }

    #[test]
    fn heterogeneity_is_zero_only_for_coinciding_points() {
        let kmean = engine(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let coinciding = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(kmean.heterogeneity(&coinciding, &[0, 1]), 0.0);

        let displaced = vec![1.0, 2.0, 3.0, 5.0];
        assert!(kmean.heterogeneity(&displaced, &[0, 1]) > 0.0);
    }

    #[test]
    fn k_out_of_range_is_rejected() {
        let kmean = engine(vec![0.0, 0.0, 1.0, 1.0], 2, 2);
        let conf = KMeansConfig::default();
        assert!(matches!(
            kmean.kmeans_lloyd(0, 10, KMeans::init_random_sample, &conf),
            Err(ClusterError::InvalidArgument(_))
        ));
        assert!(matches!(
            kmean.kmeans_lloyd(3, 10, KMeans::init_random_sample, &conf),
            Err(ClusterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_iteration_cap_is_rejected() {
        let kmean = engine(vec![0.0, 0.0, 1.0, 1.0], 2, 2);
        let conf = KMeansConfig::default();
        assert!(matches!(
            kmean.kmeans_lloyd(1, 0, KMeans::init_random_sample, &conf),
            Err(ClusterError::InvalidArgument(_))
        ));
    }
}
