use crate::dataset::Dataset;
use crate::distances::Distance;
use crate::primitives::Primitive;
use crate::{KMeans, KMeansState};

#[inline(always)]
pub fn calculate<T, M, D>(kmean: &KMeans<T, M, D>, state: &mut KMeansState<T>, computed: Vec<T>)
where
    T: Primitive,
    M: Dataset<T>,
    D: Distance<T>,
{
    let dims = kmean.data.sample_dims();
    assert!(
        computed.len() == state.k * dims,
        "initialized with {} centroid values, but k = {} and sample_dims = {} require {}",
        computed.len(),
        state.k,
        dims,
        state.k * dims
    );
    computed.chunks_exact(dims).enumerate().for_each(|(ci, c)| {
        state.centroid_mut(ci).copy_from_slice(c);
    });
}
