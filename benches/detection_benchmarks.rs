//! Benchmarks for the detection chain
//!
//! Compares performance of:
//! - Training (window selection + censored fit) with and without outlier removal
//! - A full detection run from scratch
//! - Resuming a run for a handful of new dates

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fordead_core::basis::harmonic_design_matrix;
use fordead_core::fit::{fit_training_windows, FitOptions};
use fordead_core::simulation::{simulate_stack, DiebackScenario, SimulationParams};
use fordead_core::training::{select_first_detection_dates, TrainingWindow};
use fordead_core::{DetectionConfig, DiebackDetector, TimeSeries};

fn stack(side: usize) -> TimeSeries {
    let params = SimulationParams {
        rows: side,
        cols: side,
        n_dates: 150,
        dieback: Some(DiebackScenario {
            fraction: 0.2,
            start_index: 110,
            shift: 0.3,
        }),
        ..Default::default()
    };
    simulate_stack(&params, Some(42))
        .expect("valid simulation parameters")
        .stack
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    let params = DetectionConfig::default().validate().expect("default config");

    for side in [32, 64] {
        let stack = stack(side);
        let window = TrainingWindow::from_dates(
            stack.dates(),
            params.min_last_date_training,
            params.max_last_date_training,
        );
        let design = harmonic_design_matrix(&stack.dates().day_numbers(params.epoch));
        let selected = vec![true; stack.n_pixels()];

        for (label, options) in [
            ("plain", FitOptions::default()),
            (
                "outliers",
                FitOptions {
                    outlier_threshold: Some(0.16),
                },
            ),
        ] {
            group.bench_with_input(
                BenchmarkId::new(label, side * side),
                &stack,
                |b, stack| {
                    b.iter(|| {
                        let d0 = select_first_detection_dates(
                            stack.vi(),
                            stack.mask(),
                            stack.in_scope(),
                            &window,
                            params.nb_min_date,
                        );
                        fit_training_windows(
                            &design,
                            black_box(stack.vi()),
                            stack.mask(),
                            &d0,
                            &selected,
                            options,
                        )
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");
    let config = DetectionConfig {
        stress_index_mode: "weighted_mean".to_string(),
        ..Default::default()
    };
    let detector = DiebackDetector::from_config(&config).expect("valid config");

    for side in [32, 64] {
        let stack = stack(side);
        group.bench_with_input(
            BenchmarkId::new("from_scratch", side * side),
            &stack,
            |b, stack| b.iter(|| detector.run(black_box(stack), None)),
        );

        let (state, _) = detector
            .run(&stack.truncated(stack.n_dates() - 5), None)
            .expect("detection run");
        group.bench_with_input(
            BenchmarkId::new("resume_5_dates", side * side),
            &stack,
            |b, stack| b.iter(|| detector.run(black_box(stack), Some(state.clone()))),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_detection);
criterion_main!(benches);
