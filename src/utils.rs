//! Text summaries of fitted models and their histories.
use crate::gradient_descent::DescentRun;
use crate::network::FeedForwardNetwork;
use std::fmt::Write;

/// Layer-by-layer description of a network.
pub fn model_summary(network: &FeedForwardNetwork) -> String {
    let mut out = format!("Model Summary:\n{}\n", network);
    let mut total = 0;
    for (i, layer) in network.layers().iter().enumerate() {
        let params = layer.weights.len() + layer.bias.len();
        total += params;
        let _ = writeln!(
            out,
            "  layer {}: {} -> {} ({} parameters)",
            i + 1,
            layer.input_size(),
            layer.output_size(),
            params
        );
    }
    let _ = writeln!(out, "  total parameters: {}", total);
    out
}

/// Simple table of first, last, and average value of a history.
pub fn summary_table(values: &[f64], title: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} Summary Table:", title);
    let _ = writeln!(out, "+----------------+--------------+");
    let _ = writeln!(out, "| Range          |        Value |");
    let _ = writeln!(out, "+----------------+--------------+");
    if let (Some(first), Some(last)) = (values.first(), values.last()) {
        let avg = values.iter().sum::<f64>() / values.len() as f64;
        let _ = writeln!(out, "| First          | {:>12.6} |", first);
        let _ = writeln!(out, "| Last           | {:>12.6} |", last);
        let _ = writeln!(out, "| Average        | {:>12.6} |", avg);
    }
    let _ = writeln!(out, "+----------------+--------------+");
    out
}

/// Fitted parameters and cost table for a descent run.
pub fn descent_summary(run: &DescentRun, title: &str) -> String {
    let theta: Vec<String> = run.theta.iter().map(|t| format!("{:.4}", t)).collect();
    let mut out = format!("{}: theta = [{}]\n", title, theta.join(", "));
    out.push_str(&summary_table(
        run.cost_history.as_slice().unwrap_or(&[]),
        "Cost",
    ));
    out
}
