use cvm_estimator::{CvmEstimator, TracingSink};

fn main() {
    let mut exact = CvmEstimator::<usize>::with_seed(100, 1);
    for i in 0..1_000 {
        exact.process(i % 50);
    }
    println!("exact estimate = {}", exact.estimate());

    let mut sampled = CvmEstimator::<usize>::with_seed(100, 1);
    sampled.extend((0..100_000).map(|i| i % 5_000));
    println!("sampled estimate = {}", sampled.estimate());
    println!("sampled state = {:?}", sampled.snapshot());

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();
    let mut traced = CvmEstimator::<&str>::with_seed(2, 7).with_sink(TracingSink);
    for word in "to be or not to be".split_whitespace() {
        traced.process(word);
    }
    println!("traced estimate = {}", traced.estimate());
}
