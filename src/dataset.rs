use crate::errors::{ClusterError, Result};
use crate::primitives::Primitive;

/// Borrowed view of a single sample, either dense or sparse.
///
/// Centroid arithmetic is always dense; this view is what bridges sparse
/// input rows into the dense centroid buffers (conversion and accumulation),
/// so the engine never has to care which representation the dataset uses.
#[derive(Clone, Copy, Debug)]
pub enum PointRef<'a, T: Primitive> {
    Dense(&'a [T]),
    Sparse { indices: &'a [usize], values: &'a [T] },
}

impl<'a, T: Primitive> PointRef<'a, T> {
    /// Write this point into a dense buffer of `sample_dims` length.
    pub fn write_dense(&self, out: &mut [T]) {
        match *self {
            PointRef::Dense(row) => out.copy_from_slice(row),
            PointRef::Sparse { indices, values } => {
                out.iter_mut().for_each(|v| *v = T::zero());
                for (&j, &v) in indices.iter().zip(values.iter()) {
                    out[j] = v;
                }
            }
        }
    }

    /// Accumulate this point into a dense buffer of `sample_dims` length.
    pub fn add_to(&self, acc: &mut [T]) {
        match *self {
            PointRef::Dense(row) => acc.iter_mut().zip(row.iter()).for_each(|(a, &v)| *a += v),
            PointRef::Sparse { indices, values } => {
                for (&j, &v) in indices.iter().zip(values.iter()) {
                    acc[j] += v;
                }
            }
        }
    }
}

/// An ordered, immutable collection of N points in a D-dimensional space.
///
/// Loaded once by the caller and passed by reference into every operation;
/// the engine never mutates it, so it can be shared across parallel work.
pub trait Dataset<T: Primitive>: Sync {
    fn sample_cnt(&self) -> usize;
    fn sample_dims(&self) -> usize;
    fn point(&self, idx: usize) -> PointRef<'_, T>;
}

/// Dense, row-major sample storage: `[<sample0>,<sample1>,...]`.
pub struct DenseMatrix<T: Primitive> {
    samples: Vec<T>,
    sample_cnt: usize,
    sample_dims: usize,
}

impl<T: Primitive> DenseMatrix<T> {
    /// ## Arguments
    /// - **samples**: Vector of samples \[row-major\] = \[&lt;sample0&gt;,&lt;sample1&gt;,...\]
    /// - **sample_cnt**: Amount of samples contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample has
    pub fn new(samples: Vec<T>, sample_cnt: usize, sample_dims: usize) -> Result<Self> {
        if samples.len() != sample_cnt * sample_dims {
            return Err(ClusterError::InvalidArgument(format!(
                "sample buffer holds {} values, expected {} ({} samples x {} dims)",
                samples.len(),
                sample_cnt * sample_dims,
                sample_cnt,
                sample_dims
            )));
        }
        Ok(Self { samples, sample_cnt, sample_dims })
    }
}

impl<T: Primitive> Dataset<T> for DenseMatrix<T> {
    fn sample_cnt(&self) -> usize { self.sample_cnt }
    fn sample_dims(&self) -> usize { self.sample_dims }
    fn point(&self, idx: usize) -> PointRef<'_, T> {
        let offset = idx * self.sample_dims;
        PointRef::Dense(&self.samples[offset..offset + self.sample_dims])
    }
}

/// Sparse sample storage in CSR layout.
///
/// Row `i` holds the nonzero entries `values[indptr[i]..indptr[i+1]]` at
/// column positions `indices[indptr[i]..indptr[i+1]]`.
pub struct CsrMatrix<T: Primitive> {
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<T>,
    sample_dims: usize,
}

impl<T: Primitive> CsrMatrix<T> {
    pub fn new(indptr: Vec<usize>, indices: Vec<usize>, values: Vec<T>, sample_dims: usize) -> Result<Self> {
        if indptr.is_empty() || *indptr.last().unwrap() != indices.len() || indices.len() != values.len() {
            return Err(ClusterError::InvalidArgument(
                "CSR buffers are inconsistent: indptr must start a row for every sample and close at indices.len()".into(),
            ));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(ClusterError::InvalidArgument("CSR indptr must be non-decreasing".into()));
        }
        if indices.iter().any(|&j| j >= sample_dims) {
            return Err(ClusterError::InvalidArgument(format!(
                "CSR column index out of range for {} dims",
                sample_dims
            )));
        }
        Ok(Self { indptr, indices, values, sample_dims })
    }
}

impl<T: Primitive> Dataset<T> for CsrMatrix<T> {
    fn sample_cnt(&self) -> usize { self.indptr.len() - 1 }
    fn sample_dims(&self) -> usize { self.sample_dims }
    fn point(&self, idx: usize) -> PointRef<'_, T> {
        let (start, end) = (self.indptr[idx], self.indptr[idx + 1]);
        PointRef::Sparse {
            indices: &self.indices[start..end],
            values: &self.values[start..end],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse_fixture() -> CsrMatrix<f64> {
        // Rows: [1,0,2], [0,0,0], [0,3,0]
        CsrMatrix::new(vec![0, 2, 2, 3], vec![0, 2, 1], vec![1.0, 2.0, 3.0], 3).unwrap()
    }

    #[test]
    fn sparse_rows_densify_like_their_dense_counterparts() {
        let sparse = sparse_fixture();
        let dense = DenseMatrix::new(vec![1.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 3.0, 0.0], 3, 3).unwrap();

        let mut from_sparse = vec![0.0; 3];
        let mut from_dense = vec![0.0; 3];
        for idx in 0..3 {
            sparse.point(idx).write_dense(&mut from_sparse);
            dense.point(idx).write_dense(&mut from_dense);
            assert_eq!(from_sparse, from_dense);
        }
    }

    #[test]
    fn add_to_accumulates_without_clearing() {
        let sparse = sparse_fixture();
        let mut acc = vec![10.0, 10.0, 10.0];
        sparse.point(0).add_to(&mut acc);
        sparse.point(2).add_to(&mut acc);
        assert_eq!(acc, vec![11.0, 13.0, 12.0]);
    }

    #[test]
    fn dense_matrix_rejects_mismatched_buffer() {
        let res = DenseMatrix::new(vec![0.0f64; 5], 2, 3);
        assert!(matches!(res, Err(ClusterError::InvalidArgument(_))));
    }

    #[test]
    fn csr_matrix_rejects_out_of_range_columns() {
        let res = CsrMatrix::new(vec![0, 1], vec![7], vec![1.0f64], 3);
        assert!(matches!(res, Err(ClusterError::InvalidArgument(_))));
    }
}
