//! Incremental runs must reproduce a from-scratch run over the same history.

use fordead_core::simulation::{simulate_stack, DiebackScenario, SimulationParams};
use fordead_core::{DetectionConfig, DetectionResults, DetectionState, DiebackDetector, TimeSeries};

fn simulated() -> TimeSeries {
    let params = SimulationParams {
        rows: 6,
        cols: 7,
        n_dates: 130,
        cloud_probability: 0.35,
        dieback: Some(DiebackScenario {
            fraction: 0.4,
            start_index: 95,
            shift: 0.3,
        }),
        ..Default::default()
    };
    simulate_stack(&params, Some(2024)).unwrap().stack
}

fn detector(stress_mode: &str, remove_outliers: bool) -> DiebackDetector {
    let config = DetectionConfig {
        stress_index_mode: stress_mode.to_string(),
        remove_outliers,
        max_nb_stress_periods: 2,
        ..Default::default()
    };
    DiebackDetector::from_config(&config).unwrap()
}

#[test]
fn split_runs_match_full_run() {
    let stack = simulated();
    for (mode, outliers) in [("none", false), ("weighted_mean", true), ("mean", false)] {
        let detector = detector(mode, outliers);
        let (expected, _) = detector.run(&stack, None).unwrap();
        assert!(expected.training_final);

        // 2018-01-01 is date 73; date 103 is the last one before 2018-06-01
        for split in [1, 20, 73, 74, 90, 96, 103, 104, 129] {
            let (partial, _) = detector.run(&stack.truncated(split), None).unwrap();
            assert_eq!(partial.next_date_index(), split);
            let (resumed, summary) = detector.run(&stack, Some(partial)).unwrap();
            assert_eq!(summary.new_dates, 130 - split);
            assert_eq!(resumed, expected, "mode {} split {}", mode, split);
        }
    }
}

#[test]
fn chained_runs_through_saved_state_match_full_run() {
    let stack = simulated();
    let detector = detector("weighted_mean", false);
    let (expected, _) = detector.run(&stack, None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let mut previous: Option<DetectionState> = None;
    for end in [30, 75, 80, 100, 101, 120, 130, 130] {
        let (state, _) = detector.run(&stack.truncated(end), previous.take()).unwrap();
        state.save(&path).unwrap();
        previous = Some(DetectionState::load(&path).unwrap());
    }
    let last = previous.unwrap();
    assert_eq!(last, expected);
    assert_eq!(
        DetectionResults::from_state(&last).unwrap(),
        DetectionResults::from_state(&expected).unwrap()
    );
}

#[test]
fn simulated_dieback_is_detected() {
    let sim = simulate_stack(
        &SimulationParams {
            rows: 5,
            cols: 5,
            n_dates: 130,
            noise_sd: 0.01,
            cloud_probability: 0.2,
            dieback: Some(DiebackScenario {
                fraction: 0.5,
                start_index: 100,
                shift: 0.4,
            }),
            ..Default::default()
        },
        Some(11),
    )
    .unwrap();
    let (state, _) = detector("mean", false).run(&sim.stack, None).unwrap();
    let results = DetectionResults::from_state(&state).unwrap();
    let detected = results.dieback_mask();
    for p in 0..25 {
        if state.first_detection[p] != 0 {
            assert_eq!(detected[p], sim.affected[p], "pixel {}", p);
        }
    }
}
