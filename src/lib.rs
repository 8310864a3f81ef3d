//! # hardcluster - API documentation
//!
//! hardcluster is a small rust library for partitional (hard-assignment)
//! clustering with Lloyd's k-means algorithm.
//!
//! ## Design target
//! The crate implements the classic alternation of nearest-centroid
//! assignment and mean-update, together with the pieces a usable k-means
//! needs around it: pluggable centroid initialization, an explicit policy
//! for clusters that lose all members, a recordable heterogeneity trail for
//! convergence diagnostics, and a multi-run driver that keeps the best
//! local optimum out of several seeded trials.
//!
//! Samples are handed over either as a raw row-major vector
//! ([`DenseMatrix`]) or in CSR layout ([`CsrMatrix`]); centroid arithmetic
//! is always dense, so sparse inputs (e.g. TF-IDF matrices) cluster against
//! dense centroids without conversion of the whole dataset.
//!
//! ## Reproducibility
//! There is no hidden global random state. Every calculation draws from the
//! caller-owned generator inside [`KMeansConfig`], and the multi-run driver
//! derives one private generator per run from an explicit seed, so any run
//! can be replayed bit for bit.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use hardcluster::*;
//!
//! let (sample_cnt, sample_dims, k, max_iter) = (3000, 8, 4, 100);
//!
//! // Generate some random data
//! let mut samples = vec![0.0f64; sample_cnt * sample_dims];
//! samples.iter_mut().for_each(|v| *v = rand::random());
//!
//! // Calculate kmeans, using kmean++ as initialization-method
//! let data = DenseMatrix::new(samples, sample_cnt, sample_dims)?;
//! let kmean = KMeans::new(data, EuclideanDistance);
//! let result = kmean.kmeans_lloyd(k, max_iter, KMeans::init_kmeanplusplus, &KMeansConfig::default())?;
//!
//! println!("Centroids: {:?}", result.centroids);
//! println!("Cluster-Assignments: {:?}", result.assignments);
//! println!("Heterogeneity: {}", result.heterogeneity);
//! # Ok::<(), hardcluster::ClusterError>(())
//! ```
//!
//! ## Example (multi-run search with status callbacks)
//! ```rust
//! use hardcluster::*;
//! use rand::prelude::*;
//!
//! let (sample_cnt, sample_dims, k, max_iter) = (3000, 8, 4, 100);
//!
//! let mut samples = vec![0.0f64; sample_cnt * sample_dims];
//! samples.iter_mut().for_each(|v| *v = rand::random());
//!
//! let conf = KMeansConfig::build()
//!     .init_done(&|_| println!("Initialization completed."))
//!     .iteration_done(&|s, nr, new_het|
//!         println!("Iteration {} - Heterogeneity: {:.2} -> {:.2}", nr, s.heterogeneity, new_het))
//!     .random_generator(StdRng::seed_from_u64(1337))
//!     .build();
//!
//! let data = DenseMatrix::new(samples, sample_cnt, sample_dims)?;
//! let kmean = KMeans::new(data, EuclideanDistance);
//! let best = kmean.kmeans_best_of(k, max_iter, 3, &SeedSource::Provided(vec![1, 2, 3]), &conf)?;
//!
//! println!("Best seed: {}", best.seed);
//! println!("Heterogeneity: {}", best.state.heterogeneity);
//! # Ok::<(), hardcluster::ClusterError>(())
//! ```
//!
//! ## Short API-Overview / Description
//! Entry-point of the library is the [`KMeans`] struct. It is generic over
//! the float primitive, the dataset representation ([`Dataset`]) and the
//! distance implementation ([`Distance`]). An instance is created with the
//! dataset and distance, and is never mutated by a calculation; the state
//! of a run lives in a [`KMeansState`], which is also the returned result.
//!
//! The centroid initialization methods are static methods of [`KMeans`]
//! that are passed by reference into the instance-methods (e.g.
//! [`KMeans::kmeans_lloyd`]).

#[macro_use]
mod helpers;
mod api;
mod dataset;
mod distances;
mod driver;
mod errors;
mod inits;
mod primitives;
mod variants;

pub use api::{
    EmptyClusterPolicy, InitDoneCallbackFn, IterationDoneCallbackFn, KMeans, KMeansConfig,
    KMeansConfigBuilder, KMeansState, Termination,
};
pub use dataset::{CsrMatrix, Dataset, DenseMatrix, PointRef};
pub use distances::{Distance, EuclideanDistance};
pub use driver::{BestRun, SeedSource};
pub use errors::{ClusterError, Result};
pub use primitives::Primitive;
