use crate::dataset::Dataset;
use crate::distances::Distance;
use crate::primitives::Primitive;
use crate::{KMeans, KMeansConfig, KMeansState};
use rand::prelude::*;

#[inline(always)]
pub fn calculate<T, M, D>(kmean: &KMeans<T, M, D>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>)
where
    T: Primitive,
    M: Dataset<T>,
    D: Distance<T>,
{
    let sample_cnt = kmean.data.sample_cnt();
    for ci in 0..state.k {
        // Sampling with replacement: a sample may be drawn more than once.
        let idx = config.rnd.borrow_mut().gen_range(0..sample_cnt);
        state.set_centroid_from(ci, &kmean.data.point(idx));
    }
}
