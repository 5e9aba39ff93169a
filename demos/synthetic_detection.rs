//! Detect low-activity rows in a synthetic binary dataset with PCA.
//!
//! Run with: cargo run --example synthetic_detection
//! Set RUST_LOG=anofox_anomaly=debug to follow the threshold sweep.

use anofox_anomaly::experiment::{
    detection_with_pca_gaussian, detection_with_pca_reconstruction_error, DetectorConfig,
};
use anofox_anomaly::reduction::variance_curve;
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

    println!("=== Synthetic binary anomaly detection ===\n");

    // 1. Generate data: anomaly when fewer than 4 of 16 bits are set
    let mut rng = StdRng::seed_from_u64(9001);
    let data = SyntheticConfig::new(20_000, 16).generate(&mut rng).unwrap();
    println!(
        "{} samples, {:.1}% anomalies",
        data.len(),
        data.anomaly_fraction() * 100.0
    );

    // 2. Split with anomalies on both sides
    let (train, test) = split_dataset(&data, 0.8, 1000, &mut rng).unwrap();
    println!("train: {} samples, test: {} samples", train.len(), test.len());

    // 3. How much variance do the principal components keep?
    println!("\n--- Variance retained by PCA ---");
    for (n_components, retained) in variance_curve(train.features(), 50).unwrap() {
        println!("  {:>2} components: {:.1}%", n_components, retained * 100.0);
    }

    let config = DetectorConfig::default();

    // 4. Reconstruction error
    println!("\n--- PCA reconstruction error (8 components) ---");
    let outcome = detection_with_pca_reconstruction_error(&train, &test, 8, &config).unwrap();
    println!("threshold: {:.4}", outcome.threshold.epsilon);
    println!("Training:\n{}", outcome.training());
    println!("Testing:\n{}", outcome.testing);
    println!("{}", outcome.testing.rates());

    // 5. Gaussian density on the encoded features
    println!("\n--- PCA + Gaussian density (8 components) ---");
    let outcome = detection_with_pca_gaussian(&train, &test, 8, &config).unwrap();
    println!("threshold: {:.3e}", outcome.threshold.epsilon);
    println!("Testing:\n{}", outcome.testing);
}
