use slowdecay_core::common::config::ProfileParameters;
use slowdecay_core::domain::{AlignmentResult, Location, ProfileErrorCategory};
use slowdecay_core::modules::correlation::pair_count;
use slowdecay_core::modules::{
    CorrectionKind, OutputMode, load_alignment_results, load_profile_batch, run_profile_pipeline,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn four_station_run() -> AlignmentResult {
    let mut results = load_alignment_results(fixture_path("pdiff_four_stations.json"))
        .expect("fixture should load");
    assert_eq!(results.len(), 1);
    results.remove(0)
}

fn parameters(output_dir: &Path) -> ProfileParameters {
    ProfileParameters {
        output_dir: output_dir.to_path_buf(),
        ..ProfileParameters::default()
    }
}

fn artifacts_in(directory: &Path) -> Vec<PathBuf> {
    let mut artifacts: Vec<PathBuf> = fs::read_dir(directory)
        .expect("output directory should be readable")
        .map(|entry| entry.expect("entry").path())
        .collect();
    artifacts.sort();
    artifacts
}

#[test]
fn four_station_cluster_yields_one_profile() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output_dir = temp.path().join("profiles");
    let profiles = run_profile_pipeline(
        &[four_station_run()],
        &parameters(&output_dir),
        OutputMode::Return,
    )
    .expect("pipeline should succeed");

    assert_eq!(profiles.len(), 1);
    let profile = &profiles[0];
    assert_eq!(profile.cluster_id, 1);
    assert_eq!(profile.member_stations.len(), 4);
    assert_eq!(profile.distance_span, 30.0);
    assert_eq!(profile.azimuth_span, 30.0);
    assert_eq!(profile.run_name, "tonga_2018_pdiff");
    assert_eq!(profile.earth_model, "prem_a");
    assert_eq!(profile.event_location.depth, 563.0);
    assert!((profile.slowness - 4.6).abs() < 0.05);
    assert!(profile.slowness_error.is_some());
    assert!(profile.decay_rate < 0.0);
    assert_eq!(
        profile.correlation_coefficients,
        vec![0.93, 0.88, 0.81, 0.91, 0.86, 0.9]
    );
}

#[test]
fn member_subsets_stay_consistently_indexed() {
    let temp = TempDir::new().expect("tempdir should be created");
    let mut run = four_station_run();
    run.clusters.cluster_ids = vec![1, 2, 1, 1];
    run.clusters.good_clusters = [1].into_iter().collect();

    let profiles = run_profile_pipeline(&[run], &parameters(temp.path()), OutputMode::Return)
        .expect("pipeline should succeed");
    let profile = &profiles[0];
    let count = profile.station_count();

    assert_eq!(profile.station_indices, vec![0, 2, 3]);
    assert_eq!(profile.member_stations[1].identity.station, "HRV");
    assert_eq!(profile.correlation_coefficients, vec![0.88, 0.81, 0.9]);
    assert_eq!(profile.correlation_coefficients.len(), pair_count(count));
    for (path, values) in profile.corrections.leaves() {
        assert_eq!(values.len(), count, "correction '{path}' should cover the members");
    }
    assert_eq!(
        profile
            .corrections
            .correction(CorrectionKind::Crustal)
            .expect("crustal correction"),
        &[0.35, 0.08, 0.51]
    );
    assert_eq!(profile.distance_span, 30.0);
    assert_eq!(profile.azimuth_span, 30.0);
}

#[test]
fn distance_window_narrows_the_profile() {
    let temp = TempDir::new().expect("tempdir should be created");
    let parameters = ProfileParameters {
        distance_range: vec![95.0, 180.0],
        ..parameters(temp.path())
    };
    let profiles = run_profile_pipeline(&[four_station_run()], &parameters, OutputMode::Return)
        .expect("pipeline should succeed");
    assert_eq!(profiles[0].station_indices, vec![1, 2, 3]);
    assert_eq!(profiles[0].distance_span, 20.0);
}

#[test]
fn single_qualifying_station_produces_no_profile_and_no_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let mut run = four_station_run();
    run.clusters.cluster_ids = vec![1, 1, 2, 2];
    run.clusters.good_clusters = [1, 2].into_iter().collect();
    run.outliers = vec![false, true, false, false];

    let profiles = run_profile_pipeline(&[run], &parameters(temp.path()), OutputMode::Return)
        .expect("sparse clusters are not errors");
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].cluster_id, 2);
}

#[test]
fn inconsistent_events_fail_before_any_artifact_is_written() {
    let temp = TempDir::new().expect("tempdir should be created");
    let valid = four_station_run();
    let mut inconsistent = four_station_run();
    inconsistent.run_name = "second".to_string();
    inconsistent.events[3] = Location {
        depth: 35.0,
        ..inconsistent.events[3]
    };

    let error = run_profile_pipeline(
        &[valid, inconsistent],
        &parameters(temp.path()),
        OutputMode::Return,
    )
    .expect_err("two event locations");
    assert_eq!(error.category(), ProfileErrorCategory::InputValidationError);
    assert_eq!(error.code(), "INPUT.INCONSISTENT_EVENT");
    assert_eq!(error.exit_code(), 2);
    assert!(artifacts_in(temp.path()).is_empty());
}

#[test]
fn non_positive_amplitudes_fail() {
    let temp = TempDir::new().expect("tempdir should be created");
    let mut run = four_station_run();
    if let Some(solution) = run.solution.as_mut() {
        solution.amplitudes[2] = 0.0;
    }

    let error = run_profile_pipeline(&[run], &parameters(temp.path()), OutputMode::Return)
        .expect_err("zero amplitude");
    assert_eq!(error.code(), "INPUT.NON_POSITIVE_AMPLITUDE");
    assert!(error.message().contains("IU.HRV.00.BHZ"));
}

#[test]
fn zero_profiles_with_output_requested_is_insufficient_data() {
    let temp = TempDir::new().expect("tempdir should be created");
    let mut run = four_station_run();
    run.outliers = vec![true; 4];

    let error = run_profile_pipeline(
        std::slice::from_ref(&run),
        &parameters(temp.path()),
        OutputMode::Return,
    )
    .expect_err("nothing qualifies");
    assert_eq!(error.category(), ProfileErrorCategory::InsufficientData);
    assert_eq!(error.exit_code(), 3);

    let profiles = run_profile_pipeline(&[run], &parameters(temp.path()), OutputMode::PersistOnly)
        .expect("persist-only does not require output");
    assert!(profiles.is_empty());
    assert!(artifacts_in(temp.path()).is_empty());
}

#[test]
fn malformed_ranges_fail_before_the_output_directory_is_created() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output_dir = temp.path().join("never");
    let parameters = ProfileParameters {
        azimuth_range: vec![0.0, 90.0, 180.0],
        ..parameters(&output_dir)
    };

    let error = run_profile_pipeline(&[four_station_run()], &parameters, OutputMode::Return)
        .expect_err("three azimuth values");
    assert_eq!(error.code(), "INPUT.AZIMUTH_RANGE");
    assert!(!output_dir.exists());
}

#[test]
fn persisted_artifact_round_trips_every_field() {
    let temp = TempDir::new().expect("tempdir should be created");
    let mut synthetic = four_station_run();
    synthetic.run_name = "tonga 2018/synthetic".to_string();
    synthetic.is_synthetic = true;

    let profiles = run_profile_pipeline(
        &[four_station_run(), synthetic],
        &parameters(temp.path()),
        OutputMode::Return,
    )
    .expect("pipeline should succeed");
    assert_eq!(profiles.len(), 2);

    let artifacts = artifacts_in(temp.path());
    assert_eq!(artifacts.len(), 2);
    let names: Vec<String> = artifacts
        .iter()
        .filter_map(|path| path.file_name().and_then(|name| name.to_str()).map(str::to_string))
        .collect();
    assert!(names.iter().any(|name| name.ends_with("_tonga_2018_pdiff_profiles.json")));
    assert!(names.iter().any(|name| name.ends_with("_tonga_2018_synthetic_profiles.json")));

    for artifact in &artifacts {
        let batch = load_profile_batch(artifact).expect("artifact should load");
        assert_eq!(batch.profiles.len(), 1);
        let original = profiles
            .iter()
            .find(|profile| profile.run_name == batch.run_name)
            .expect("artifact matches a returned profile");
        assert_eq!(&batch.profiles[0], original);
    }

    // Synthetic corrections are added, data corrections subtracted.
    let data = &profiles[0];
    let synthetic = &profiles[1];
    assert!(synthetic.corrected_slowness > synthetic.slowness);
    assert!(data.corrected_slowness < data.slowness);
    assert_eq!(data.slowness, synthetic.slowness);
}

#[test]
fn every_persisted_profile_reloads_bit_for_bit() {
    let temp = TempDir::new().expect("tempdir should be created");
    let base = four_station_run();
    let runs: Vec<AlignmentResult> = (0..120usize)
        .map(|index| {
            let mut run = base.clone();
            run.run_name = format!("perturbed_{index:03}");
            run.is_synthetic = index % 2 == 1;
            if let Some(solution) = run.solution.as_mut() {
                for (station, time) in solution.arrival_times.iter_mut().enumerate() {
                    *time += ((index * 7 + station * 13) as f64 * 0.37).sin() * 0.05;
                }
                for (station, amplitude) in solution.amplitudes.iter_mut().enumerate() {
                    *amplitude *= 1.0 + ((index + 3 * station) as f64).cos() * 0.01;
                }
            }
            run
        })
        .collect();

    let profiles = run_profile_pipeline(&runs, &parameters(temp.path()), OutputMode::Return)
        .expect("pipeline should succeed");
    assert_eq!(profiles.len(), runs.len());
    let artifacts = artifacts_in(temp.path());
    assert_eq!(artifacts.len(), runs.len());

    let mut mismatched = Vec::new();
    for artifact in &artifacts {
        let batch = load_profile_batch(artifact).expect("artifact should load");
        let returned: Vec<_> = profiles
            .iter()
            .filter(|profile| profile.run_name == batch.run_name)
            .cloned()
            .collect();
        if batch.profiles != returned {
            mismatched.push(batch.run_name);
        }
    }
    assert!(mismatched.is_empty(), "reloaded profiles differ for {mismatched:?}");
}
