//! Demo: training windows and harmonic fits
//!
//! Shows how the first detection date of a pixel depends on its cloud cover,
//! and how well the fitted seasonal model matches the simulated signal.

use fordead_core::basis::{evaluate, harmonic_design_matrix};
use fordead_core::fit::fit_training_windows;
use fordead_core::simulation::{simulate_stack, SimulationParams};
use fordead_core::training::{select_first_detection_dates, TrainingWindow, UNTRAINED};
use fordead_core::DetectionConfig;
use tracing_subscriber::EnvFilter;

fn main() -> fordead_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Demo: Training Windows ===\n");

    let params = DetectionConfig::default().validate()?;
    let stack_params = SimulationParams {
        rows: 1,
        cols: 1,
        noise_sd: 0.01,
        ..Default::default()
    };

    println!("--- First detection date vs cloud cover ---");
    for cloud_probability in [0.0, 0.5, 0.8, 0.9, 0.95] {
        let sim = simulate_stack(
            &SimulationParams {
                rows: 4,
                cols: 4,
                cloud_probability,
                ..stack_params.clone()
            },
            Some(7),
        )?;
        let stack = &sim.stack;
        let window = TrainingWindow::from_dates(
            stack.dates(),
            params.min_last_date_training,
            params.max_last_date_training,
        );
        let d0 = select_first_detection_dates(
            stack.vi(),
            stack.mask(),
            stack.in_scope(),
            &window,
            params.nb_min_date,
        );
        let untrained = d0.iter().filter(|&&d| d == UNTRAINED).count();
        let latest = d0.iter().max().copied().unwrap_or(UNTRAINED);
        println!(
            "  clouds {:>4.0}%: window ends in [{:?}, {:?}], latest D0 = {}, untrained = {}/16",
            cloud_probability * 100.0,
            window.min_end,
            window.max_end,
            latest,
            untrained
        );
    }

    println!("\n--- Fitted vs simulated model ---");
    let sim = simulate_stack(&stack_params, Some(3))?;
    let stack = &sim.stack;
    let window = TrainingWindow::from_dates(
        stack.dates(),
        params.min_last_date_training,
        params.max_last_date_training,
    );
    let d0 = select_first_detection_dates(
        stack.vi(),
        stack.mask(),
        stack.in_scope(),
        &window,
        params.nb_min_date,
    );
    let days = stack.dates().day_numbers(params.epoch);
    let design = harmonic_design_matrix(&days);
    let fits = fit_training_windows(
        &design,
        stack.vi(),
        stack.mask(),
        &d0,
        &[true],
        params.fit_options(),
    );
    match fits[0] {
        Some(coefs) => {
            println!("  true:   {:?}", sim.models[0]);
            println!("  fitted: {:.4?}", coefs);
            let max_err = days
                .iter()
                .map(|&d| (evaluate(&coefs, d) - evaluate(&sim.models[0], d)).abs())
                .fold(0.0, f64::max);
            println!("  max |fitted - true| over the stack: {max_err:.4}");
        }
        None => println!("  no model could be fitted"),
    }

    println!("\n=== Done ===");
    Ok(())
}
