//! Demo: incremental dieback detection
//!
//! Simulates a two-year stack where part of the raster dies back, then runs
//! detection in three increments, persisting the state to disk between runs
//! as a scheduled processing chain would. The final state is compared with a
//! single run over the whole history.
//!
//! Run with `RUST_LOG=fordead_core=debug` to see the library logs.

use fordead_core::results::StatusCounts;
use fordead_core::simulation::{simulate_stack, DiebackScenario, SimulationParams};
use fordead_core::{DetectionConfig, DetectionResults, DetectionState, DiebackDetector};
use tracing_subscriber::EnvFilter;

fn print_counts(label: &str, counts: &StatusCounts) {
    println!(
        "  {label}: healthy={}, dieback={}, no_model={}, excluded={}",
        counts.healthy, counts.dieback, counts.no_model, counts.excluded
    );
}

fn main() -> fordead_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Demo: Incremental Dieback Detection ===\n");

    let sim = simulate_stack(
        &SimulationParams {
            rows: 20,
            cols: 20,
            n_dates: 140,
            dieback: Some(DiebackScenario {
                fraction: 0.25,
                start_index: 110,
                shift: 0.25,
            }),
            ..Default::default()
        },
        Some(42),
    )?;
    let stack = &sim.stack;
    let affected = sim.affected.iter().filter(|&&a| a).count();
    println!(
        "Simulated {} x {} pixels, {} dates, {} pixels with dieback from date 110\n",
        stack.shape().0,
        stack.shape().1,
        stack.n_dates(),
        affected
    );

    let config = DetectionConfig {
        stress_index_mode: "weighted_mean".to_string(),
        ..Default::default()
    };
    let detector = DiebackDetector::from_config(&config)?;

    let dir = std::env::temp_dir().join("fordead_demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("state.json");

    println!("--- Incremental runs ---");
    let mut previous = None;
    for end in [80, 115, stack.n_dates()] {
        let (state, summary) = detector.run(&stack.truncated(end), previous.take())?;
        println!(
            "  up to date {:>3}: {} new dates, {} onsets, {} unhealthy, training final = {}",
            end - 1,
            summary.new_dates,
            summary.onsets,
            summary.pixels_unhealthy,
            summary.training_final
        );
        state.save(&path)?;
        previous = Some(DetectionState::load(&path)?);
    }

    let incremental = DetectionResults::from_state(previous.as_ref().ok_or_else(|| {
        fordead_core::Error::config("no state produced")
    })?)?;
    let (full_state, _) = detector.run(stack, None)?;
    let full = DetectionResults::from_state(&full_state)?;

    println!("\n--- Results ---");
    print_counts("incremental", &incremental.counts());
    print_counts("single run ", &full.counts());
    println!("  identical: {}", incremental == full);

    let hits = incremental
        .dieback_mask()
        .iter()
        .zip(&sim.affected)
        .filter(|&(&d, &a)| d && a)
        .count();
    println!("  detected {hits} of {affected} simulated dieback pixels");

    println!("\n=== Done ===");
    Ok(())
}
