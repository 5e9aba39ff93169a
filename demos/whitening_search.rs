//! Cross-validate the covariance whitening coefficient of a Gaussian
//! detector.
//!
//! Run with: cargo run --example whitening_search

use anofox_anomaly::experiment::{train_test_with_gaussian, DetectorConfig, WhiteningSearchConfig};
use anofox_anomaly::split::split_dataset;
use anofox_anomaly::synthetic::SyntheticConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "anofox_anomaly=info".into()),
        )
        .init();

    let mut rng = StdRng::seed_from_u64(9001);
    let data = SyntheticConfig::new(10_000, 16).generate(&mut rng).unwrap();
    let (train, test) = split_dataset(&data, 0.8, 1000, &mut rng).unwrap();

    let search_config = WhiteningSearchConfig::new(10).with_folds(3);
    let (outcome, search) = train_test_with_gaussian(
        &train,
        &test,
        Some(&search_config),
        &DetectorConfig::default(),
    )
    .unwrap();

    println!("=== Whitening search ===\n");
    println!("{:>6} {:>8} {:>8} {:>12} {:>10}", "lambda", "F1", "F1 sd", "R-Precision", "Prec@K");
    if let Some(search) = &search {
        for c in &search.candidates {
            println!(
                "{:>6.2} {:>8.3} {:>8.3} {:>12.3} {:>10.3}",
                c.lam, c.f1, c.f1_std_dev, c.r_precision, c.precision_at_k
            );
        }
        println!("\nbest lambda: {:.2}", search.best_lam);
    }

    println!("\nTesting:\n{}", outcome.testing);
}
