use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use log::{info, warn};

use bciscope::filters::{FilterFamily, FilterKind, FilterPlan, FilterSpec, MainsFrequency};
use bciscope::groups::{resolve_groups, ChartGroupSpec};
use bciscope::plot::{render_group_png, RenderStyle};
use bciscope::session::{DeviceSession, SyntheticSession};
use bciscope::vitals::{Reliability, VitalsExtractor};
use bciscope::{build_labels, report, BoardDescriptor, NameTable};

struct Options {
    seconds: f64,
    seed: u64,
    out_dir: PathBuf,
    board: Option<PathBuf>,
}

fn parse_options() -> anyhow::Result<Options> {
    let mut options = Options {
        seconds: 8.0,
        seed: 1,
        out_dir: PathBuf::from("out"),
        board: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .with_context(|| format!("{name} requires a value"))
        };
        match arg.as_str() {
            "--seconds" => options.seconds = value("--seconds")?.parse()?,
            "--seed" => options.seed = value("--seed")?.parse()?,
            "--out" => options.out_dir = PathBuf::from(value("--out")?),
            "--board" => options.board = Some(PathBuf::from(value("--board")?)),
            other => anyhow::bail!("unknown argument {other:?}"),
        }
    }
    Ok(options)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let options = parse_options()?;

    let board = match &options.board {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading board descriptor {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing board descriptor {}", path.display()))?
        }
        None => BoardDescriptor::synthetic(),
    };
    info!("board:\n{}", board.describe());
    let names = NameTable::default();
    let labels = build_labels(&board, &names)?;

    let mut session = SyntheticSession::new(board.clone(), options.seed);
    let sample_count = (options.seconds * board.sampling_rate_hz).ceil() as usize;
    let mut matrix = session.acquire(sample_count)?;
    info!("acquired {} samples on {} rows", sample_count, board.num_rows);

    // Condition the EEG rows in place: kill mains hum, keep 1-45 Hz.
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
    let plan = FilterPlan::new(assignments);
    for (channel, err) in plan.apply_to(&mut matrix, board.sampling_rate_hz) {
        warn!("channel {channel}: conditioning skipped: {err}");
    }

    if let Some((red_row, ir_row)) = board.ppg_pair() {
        let fft_size = sample_count.next_power_of_two().max(2);
        let mut extractor = VitalsExtractor::new();
        match extractor.extract(
            matrix.row(ir_row),
            matrix.row(red_row),
            board.sampling_rate_hz,
            fft_size,
        ) {
            Ok(outcome) => {
                if outcome.reliability == Reliability::Degraded {
                    warn!("PPG window shorter than recommended; vitals accuracy degraded");
                }
                info!(
                    "vitals: SpO2 {:.1}%, heart rate {:.1} BPM",
                    outcome.vitals.oxygen_percent, outcome.vitals.heart_rate_bpm
                );
            }
            Err(err) => warn!("vitals unavailable: {err}"),
        }
    }

    fs::create_dir_all(&options.out_dir)?;
    let csv_path = options.out_dir.join("session.csv");
    report::write_csv_file(&csv_path, &labels, &matrix)?;
    info!("wrote {}", csv_path.display());

    let groups = ChartGroupSpec::defaults();
    let resolved = resolve_groups(&labels, &groups)?;
    let style = RenderStyle::default();
    for spec in &groups {
        let indices = &resolved[&spec.name];
        if indices.is_empty() {
            warn!("group {:?} matched no channels, skipping chart", spec.name);
            continue;
        }
        let png = render_group_png(&matrix, &labels, indices, spec, &style)?;
        let path = options
            .out_dir
            .join(format!("{}.png", spec.name.to_lowercase()));
        fs::write(&path, png)?;
        info!("wrote {}", path.display());
    }

    Ok(())
}
