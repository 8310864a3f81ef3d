use crate::dataset::PointRef;
use crate::primitives::Primitive;

/// Squared-distance seam between samples and dense centroids.
///
/// Initialization, assignment and heterogeneity scoring all go through the
/// same implementation, so a run is internally consistent about what
/// "nearest" means.
pub trait Distance<T: Primitive>: Sync {
    fn sq_distance(&self, point: &PointRef<'_, T>, dense: &[T]) -> T;
}

/// Squared Euclidean distance.
pub struct EuclideanDistance;

impl<T: Primitive> Distance<T> for EuclideanDistance {
    #[inline(always)]
    fn sq_distance(&self, point: &PointRef<'_, T>, dense: &[T]) -> T {
        match *point {
            PointRef::Dense(row) => row
                .iter()
                .zip(dense.iter())
                .map(|(&sv, &cv)| sv - cv)
                .map(|v| v * v)
                .sum(),
            PointRef::Sparse { indices, values } => {
                // ||x - c||^2 = ||c||^2 + sum over nonzeros of (x_j - c_j)^2 - c_j^2
                let mut total = dense.iter().map(|&cv| cv * cv).sum::<T>();
                for (&j, &v) in indices.iter().zip(values.iter()) {
                    let cv = dense[j];
                    total = total - cv * cv + (v - cv) * (v - cv);
                }
                total
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squared_euclidean_on_dense_points() {
        let d = EuclideanDistance;
        let point = PointRef::Dense(&[0.0f64, 1.0, 2.0]);
        assert_eq!(d.sq_distance(&point, &[0.0, 0.0, 0.0]), 5.0);
        assert_eq!(d.sq_distance(&point, &[0.0, 1.0, 2.0]), 0.0);
    }

    #[test]
    fn sparse_and_dense_representations_agree() {
        let d = EuclideanDistance;
        let centroid = [0.5f64, -1.0, 2.0, 0.0];
        let dense = PointRef::Dense(&[1.0, 0.0, 0.0, 4.0]);
        let indices = [0usize, 3];
        let values = [1.0, 4.0];
        let sparse = PointRef::Sparse { indices: &indices, values: &values };
        assert_approx_eq!(d.sq_distance(&dense, &centroid), d.sq_distance(&sparse, &centroid), 1e-12);
    }
}
