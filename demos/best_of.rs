use hardcluster::*;
use rand::prelude::*;

fn main() -> Result<()> {
    let (sample_cnt, sample_dims, k, max_iter, num_runs) = (20000, 16, 10, 100, 8);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(31337);
    let mut samples = vec![0.0f64; sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rnd.gen_range(0.0..1.0));

    // Seeds for the individual runs are drawn from the configured generator,
    // so the whole search replays deterministically from this one seed.
    let conf = KMeansConfig::build().random_generator(rnd).build();

    let data = DenseMatrix::new(samples, sample_cnt, sample_dims)?;
    let kmean = KMeans::new(data, EuclideanDistance);
    let best = kmean.kmeans_best_of(k, max_iter, num_runs, &SeedSource::Generated, &conf)?;

    println!("Best seed: {}", best.seed);
    println!("Termination: {:?}", best.state.termination);
    println!("Cluster sizes: {:?}", best.state.centroid_frequency);
    println!("Heterogeneity: {}", best.state.heterogeneity);
    Ok(())
}
