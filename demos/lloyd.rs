use hardcluster::*;
use rand::prelude::*;

fn main() -> Result<()> {
    let (sample_cnt, sample_dims, k, max_iter) = (20000, 16, 10, 100);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(8675309);
    let mut samples = vec![0.0f64; sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rnd.gen_range(0.0..1.0));

    let conf = KMeansConfig::build()
        .init_done(&|_| println!("Initialization completed."))
        .iteration_done(&|s, nr, new_het| {
            println!("Iteration {} - Heterogeneity: {:.2} -> {:.2}", nr, s.heterogeneity, new_het)
        })
        .random_generator(rnd)
        .record_heterogeneity(true)
        .build();

    let data = DenseMatrix::new(samples, sample_cnt, sample_dims)?;
    let kmean = KMeans::new(data, EuclideanDistance);
    let result = kmean.kmeans_lloyd(k, max_iter, KMeans::init_kmeanplusplus, &conf)?;

    println!("Termination: {:?}", result.termination);
    println!("Cluster sizes: {:?}", result.centroid_frequency);
    println!("Heterogeneity: {}", result.heterogeneity);
    println!("Recorded trail: {:?}", result.heterogeneity_history);
    Ok(())
}
