//! End-to-end run against the synthetic board: acquire, label, condition,
//! extract vitals, resolve groups and render, the way the binary wires it.

use bciscope::filters::{FilterFamily, FilterKind, FilterPlan, FilterSpec, MainsFrequency};
use bciscope::groups::{resolve_groups, ChartGroupSpec};
use bciscope::plot::{render_group_png, RenderStyle};
use bciscope::session::{DeviceSession, SyntheticSession};
use bciscope::vitals::{Reliability, VitalsExtractor};
use bciscope::{build_labels, report, BoardDescriptor, LiveWindow, NameTable};

#[test]
fn synthetic_session_end_to_end() {
    let board = BoardDescriptor::synthetic();
    let labels = build_labels(&board, &NameTable::default()).unwrap();
    assert_eq!(labels.len(), board.num_rows);
    assert_eq!(labels[board.package_num_channel.unwrap()], "Package");

    let sample_count = 2048;
    let mut session = SyntheticSession::new(board.clone(), 99).with_vitals(66.0, 96.0);
    let mut matrix = session.acquire(sample_count).unwrap();
    assert_eq!(matrix.num_rows(), board.num_rows);
    assert_eq!(matrix.sample_count(), sample_count);

    let window = LiveWindow::new(board.num_rows, sample_count);
    window.push(&matrix).unwrap();

    let notch = FilterSpec::new(
        FilterKind::Notch {
            mains: MainsFrequency::Fifty,
        },
        FilterFamily::Butterworth,
        4,
    );
    let band = FilterSpec::new(
        FilterKind::BandPass {
            low_hz: 1.0,
            high_hz: 45.0,
        },
        FilterFamily::Butterworth,
        4,
    );
    let assignments = board
        .eeg_channels
        .iter()
        .flat_map(|&channel| [(channel, notch), (channel, band)])
        .collect();
    let failures = FilterPlan::new(assignments).apply_to(&mut matrix, board.sampling_rate_hz);
    assert!(failures.is_empty(), "failures: {failures:?}");

    // Conditioning mutated the matrix; the earlier snapshot must not move.
    let snapshot = window.snapshot();
    let eeg_row = board.eeg_channels[0];
    assert_ne!(snapshot[eeg_row], matrix.row(eeg_row).to_vec());

    let (red_row, ir_row) = board.ppg_pair().unwrap();
    let mut extractor = VitalsExtractor::new();
    let outcome = extractor
        .extract(
            matrix.row(ir_row),
            matrix.row(red_row),
            board.sampling_rate_hz,
            sample_count.next_power_of_two(),
        )
        .unwrap();
    assert_eq!(outcome.reliability, Reliability::Reliable);
    assert!(
        (outcome.vitals.heart_rate_bpm - 66.0).abs() < 10.0,
        "heart rate {}",
        outcome.vitals.heart_rate_bpm
    );
    assert!(
        (outcome.vitals.oxygen_percent - 96.0).abs() < 8.0,
        "SpO2 {}",
        outcome.vitals.oxygen_percent
    );

    let groups = ChartGroupSpec::defaults();
    let resolved = resolve_groups(&labels, &groups).unwrap();
    // The synthetic montage has frontal electrodes and a three-axis gyro.
    assert!(!resolved["Frontal"].is_empty());
    assert_eq!(resolved["Gyro"].len(), 3);

    let mut csv = Vec::new();
    report::write_csv(&mut csv, &labels, &matrix).unwrap();
    let text = String::from_utf8(csv).unwrap();
    assert_eq!(text.lines().count(), sample_count + 1);
    assert!(text.lines().next().unwrap().contains("Fz"));

    let style = RenderStyle {
        width: 320,
        height: 200,
        ..RenderStyle::default()
    };
    for spec in &groups {
        let indices = &resolved[&spec.name];
        if indices.is_empty() {
            continue;
        }
        let png = render_group_png(&matrix, &labels, indices, spec, &style).unwrap();
        assert_eq!(&png[1..4], b"PNG", "group {}", spec.name);
    }
}
