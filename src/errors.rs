use thiserror::Error;

/// Errors produced by the clustering engine.
///
/// All errors are fatal to the run that produced them. The multi-run driver
/// skips failed runs and only fails once every run failed.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// A caller-supplied parameter was out of range (`k`, `max_iter`,
    /// `num_runs`, seed-list length, sample buffer shape, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A cluster lost all of its members during the update step while the
    /// configured [`EmptyClusterPolicy`](crate::EmptyClusterPolicy) was
    /// [`Fail`](crate::EmptyClusterPolicy::Fail).
    #[error("cluster {cluster} lost all members during the update step")]
    EmptyCluster { cluster: usize },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
