mod common;
use common::{impulse_trials, noisy_trials};
use erp300::{
    analyze, Detector, DetectorConfig, ErpError, LatencyClass, ThresholdSource, ThresholdSpec,
    TrialTensor, Warning,
};
use ndarray::Array3;

#[test]
fn impulse_at_300ms_is_detected() {
    let trials = impulse_trials(1, 240, 72, 5.0);
    let r = analyze(&trials, &ThresholdSpec::Explicit(2.0)).unwrap();

    assert_eq!(r.peak.amplitude, 5.0);
    assert_eq!(r.peak.offset, 10);
    assert_eq!(r.peak.sample_index, 72);
    approx::assert_abs_diff_eq!(r.reaction_time_ms, 300.0, epsilon = 1e-9);
    assert!(r.detected());
    assert_eq!(r.verdict.latency, LatencyClass::Typical);
    assert_eq!(r.threshold.source, ThresholdSource::Explicit);
}

#[test]
fn flat_recording_is_not_detected() {
    let trials = TrialTensor::new(Array3::zeros((10, 240, 1))).unwrap();
    for t in [0.1, 1.0, 50.0] {
        let r = analyze(&trials, &ThresholdSpec::Explicit(t)).unwrap();
        assert_eq!(r.peak.amplitude, 0.0);
        assert!(!r.detected(), "threshold {t}");
    }
}

#[test]
fn flat_recording_with_auto_threshold_is_not_detected() {
    // 0 > 0.5 × 0 is false.
    let trials = TrialTensor::new(Array3::zeros((3, 100, 1))).unwrap();
    let r = analyze(&trials, &ThresholdSpec::Auto).unwrap();
    assert_eq!(r.threshold.value, 0.0);
    assert!(!r.detected());
}

#[test]
fn opposite_trials_average_at_peak_sample() {
    // Trial values 1 and 3 at sample 72 average to 2.
    let data = Array3::from_shape_fn((2, 100, 1), |(e, t, _)| match (e, t) {
        (0, 72) => 1.0,
        (1, 72) => 3.0,
        _ => 0.0,
    });
    let trials = TrialTensor::new(data).unwrap();
    let r = analyze(&trials, &ThresholdSpec::Auto).unwrap();
    approx::assert_abs_diff_eq!(r.waveform.samples()[72], 2.0, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(r.peak.amplitude, 2.0, epsilon = 1e-12);
}

#[test]
fn recording_shorter_than_window_is_bounds_error() {
    let trials = TrialTensor::new(Array3::zeros((5, 81, 1))).unwrap();
    let err = analyze(&trials, &ThresholdSpec::Auto).unwrap_err();
    assert!(matches!(err, ErpError::Bounds { .. }), "{err:?}");

    let trials = TrialTensor::new(Array3::zeros((5, 82, 1))).unwrap();
    assert!(analyze(&trials, &ThresholdSpec::Auto).is_ok());
}

#[test]
fn peak_equal_to_threshold_is_negative() {
    let trials = impulse_trials(4, 120, 70, 3.0);
    assert!(!analyze(&trials, &ThresholdSpec::Explicit(3.0)).unwrap().detected());
    assert!(analyze(&trials, &ThresholdSpec::Explicit(3.0 - 1e-9)).unwrap().detected());
}

#[test]
fn auto_threshold_uses_whole_waveform() {
    // Large artefact outside the window dominates the auto threshold.
    let data = Array3::from_shape_fn((1, 200, 1), |(_, t, _)| match t {
        10 => -12.0,
        72 => 5.0,
        _ => 0.0,
    });
    let trials = TrialTensor::new(data).unwrap();
    let r = analyze(&trials, &ThresholdSpec::Auto).unwrap();
    assert_eq!(r.threshold.value, 6.0);
    assert_eq!(r.threshold.source, ThresholdSource::Auto);
    assert_eq!(r.peak.amplitude, 5.0);
    assert!(!r.detected());
}

#[test]
fn rerun_is_identical() {
    let trials = noisy_trials(12, 240, 3);
    let d = Detector::default();
    let a = d.analyze(&trials, &ThresholdSpec::Auto).unwrap();
    let b = d.analyze(&trials, &ThresholdSpec::Auto).unwrap();
    assert_eq!(a, b);
}

#[test]
fn window_invariants_hold_for_every_channel() {
    let trials = noisy_trials(9, 180, 4);
    for channel in 0..4 {
        let d = Detector::new(DetectorConfig { channel, ..DetectorConfig::default() }).unwrap();
        let r = d.analyze(&trials, &ThresholdSpec::Auto).unwrap();
        assert_eq!(r.waveform.channel, channel);
        assert_eq!(r.waveform.len(), 180);
        assert!(r.peak.amplitude >= 0.0);
        assert!(r.peak.offset < r.window.width());
        assert_eq!(r.window.width(), 20);
        assert!((62..82).contains(&r.peak.sample_index));
    }
}

#[test]
fn waveform_is_trial_mean_of_selected_channel() {
    let trials = noisy_trials(7, 100, 2);
    let d = Detector::new(DetectorConfig { channel: 1, ..DetectorConfig::default() }).unwrap();
    let r = d.analyze(&trials, &ThresholdSpec::Auto).unwrap();
    let raw = trials.view();
    for t in 0..100 {
        let mean = (0..7).map(|e| raw[[e, t, 1]]).sum::<f64>() / 7.0;
        approx::assert_abs_diff_eq!(r.waveform.samples()[t], mean, epsilon = 1e-12);
    }
}

#[test]
fn channel_out_of_range_is_invalid_input() {
    let trials = noisy_trials(2, 100, 2);
    let d = Detector::new(DetectorConfig { channel: 5, ..DetectorConfig::default() }).unwrap();
    assert!(matches!(
        d.analyze(&trials, &ThresholdSpec::Auto),
        Err(ErpError::InvalidInput(_))
    ));
}

#[test]
fn invalid_sample_rate_rejected_by_detector() {
    let cfg = DetectorConfig { sample_rate_hz: 0.0, ..DetectorConfig::default() };
    assert!(matches!(Detector::new(cfg), Err(ErpError::InvalidInput(_))));
}

#[test]
fn early_peak_is_flagged() {
    // Sample 62 = 258.3 ms; move the window earlier to reach < 250 ms.
    let cfg = DetectorConfig { p300_latency_s: 0.25, ..DetectorConfig::default() };
    let trials = impulse_trials(3, 240, 50, 4.0);
    let r = Detector::new(cfg).unwrap().analyze(&trials, &ThresholdSpec::Auto).unwrap();
    approx::assert_abs_diff_eq!(r.reaction_time_ms, 50.0 / 240.0 * 1000.0, epsilon = 1e-9);
    assert_eq!(r.verdict.latency, LatencyClass::Early);
}

#[test]
fn prompted_garbage_falls_back_with_warning() {
    let trials = impulse_trials(2, 240, 72, 5.0);
    let r = Detector::default().analyze_prompted(&trials, "two point oh").unwrap();
    assert_eq!(r.threshold.source, ThresholdSource::Auto);
    assert_eq!(r.threshold.value, 2.5);
    assert_eq!(
        r.warnings,
        vec![Warning::MalformedThreshold { input: "two point oh".into() }]
    );
    assert!(r.detected());
}

#[test]
fn prompted_blank_is_auto_without_warning() {
    let trials = impulse_trials(2, 240, 72, 5.0);
    let r = Detector::default().analyze_prompted(&trials, "\n").unwrap();
    assert_eq!(r.threshold.source, ThresholdSource::Auto);
    assert!(r.warnings.is_empty());
}

#[test]
fn prompted_number_is_explicit() {
    let trials = impulse_trials(2, 240, 72, 5.0);
    let r = Detector::default().analyze_prompted(&trials, "6\n").unwrap();
    assert_eq!(r.threshold.source, ThresholdSource::Explicit);
    assert!(!r.detected());
}

#[test]
fn text_report_contains_rounded_values() {
    let trials = impulse_trials(1, 240, 72, 5.0);
    let text = analyze(&trials, &ThresholdSpec::Explicit(2.0)).unwrap().to_string();
    assert!(text.contains("P300 peak:      5.00"), "{text}");
    assert!(text.contains("Reaction time:  300.00 ms"), "{text}");
    assert!(text.contains("Threshold:      2.00 (explicit)"), "{text}");
    assert!(text.contains("recognition detected"), "{text}");
    assert!(text.contains("typical"), "{text}");
}

#[test]
fn plot_series_matches_waveform() {
    let trials = impulse_trials(1, 240, 72, 5.0);
    let r = analyze(&trials, &ThresholdSpec::Auto).unwrap();
    let p = r.plot_series();
    assert_eq!(p.times_ms.len(), 240);
    assert_eq!(p.amplitudes.len(), 240);
    assert_eq!(p.marker_ms, 300.0);
    approx::assert_abs_diff_eq!(p.times_ms[72], 300.0, epsilon = 1e-9);
    assert_eq!(p.amplitudes[72], 5.0);
}

#[test]
fn report_serialises_to_json() {
    let trials = impulse_trials(1, 100, 72, 5.0);
    let r = analyze(&trials, &ThresholdSpec::Explicit(2.0)).unwrap();
    let v: serde_json::Value = serde_json::to_value(&r).unwrap();
    assert_eq!(v["verdict"]["detected"], true);
    assert_eq!(v["verdict"]["latency"], "typical");
    assert_eq!(v["threshold"]["source"], "explicit");
    assert_eq!(v["waveform"]["samples"].as_array().unwrap().len(), 100);
}
