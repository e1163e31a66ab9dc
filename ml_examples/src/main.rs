// ml_examples/src/main.rs
use anyhow::Result;
use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use scratch_ml::{
    accuracy, descent_summary, gradient_descent, linear_data, model_summary, one_hot,
    summary_table, two_class_blobs, DescentConfig, DescentMethod, FeedForwardNetwork,
    TrainingConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut rng = StdRng::seed_from_u64(2024);

    println!("=== Linear Regression: y = 4 + 3*x1 - 2*x2 ===");
    let (x, y) = linear_data(100, &array![3.0, -2.0], 4.0, &mut rng);
    for method in [
        DescentMethod::FullBatch,
        DescentMethod::Stochastic,
        DescentMethod::MiniBatch,
    ] {
        let config = DescentConfig::for_method(method)
            .with_learning_rate(0.5)
            .with_iterations(200);
        let run = gradient_descent::run(&config, &x, &y, &mut rng)?;
        println!("{}", descent_summary(&run, &format!("{:?}", method)));
    }

    println!("=== Feed-forward network: sign of the first feature ===");
    let (x_train, labels_train) = two_class_blobs(200, 2, &mut rng)?;
    let (x_test, labels_test) = two_class_blobs(100, 2, &mut rng)?;
    let y_train = one_hot(&labels_train, 2)?;

    let mut network = FeedForwardNetwork::new(&[2, 4, 2], &mut rng)?;
    println!("{}", model_summary(&network));
    let config = TrainingConfig {
        epochs: 300,
        learning_rate: 0.05,
    };
    let losses = network.train_with_config(&x_train, &y_train, &config, &mut rng)?;
    println!("{}", summary_table(&losses, "Training Loss"));

    let correct = network.evaluate(&x_test, &labels_test)?;
    info!(correct, total = labels_test.len(), "evaluated test set");
    println!(
        "Test Accuracy: {:.2}%",
        accuracy(correct, labels_test.len()) * 100.0
    );

    Ok(())
}
