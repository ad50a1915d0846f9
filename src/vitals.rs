use rustfft::{num_complex::Complex64, FftPlanner};

use crate::error::BciError;
use crate::filters::{FilterFamily, FilterKind, FilterSpec};

/// Buffers shorter than this still compute, but the outcome is flagged as
/// degraded; oxygen and heart-rate estimates get unreliable below it.
pub const RELIABLE_BUFFER_LEN: usize = 1024;

/// Physiological heart-rate band in Hz (30..240 BPM).
const HR_BAND_HZ: (f64, f64) = (0.5, 4.0);

/// Pulsatile band used to isolate the AC component of a PPG trace.
const PULSE_BAND_HZ: (f64, f64) = (0.5, 5.0);

/// Oxygen saturation and heart rate derived from one extraction pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VitalsResult {
    /// Blood oxygen saturation percentage in [0, 100]. 0.0 until the first
    /// successful extraction.
    pub oxygen_percent: f64,
    /// Heart rate in beats per minute. 0.0 until the first successful
    /// extraction.
    pub heart_rate_bpm: f64,
}

impl VitalsResult {
    const SENTINEL: VitalsResult = VitalsResult {
        oxygen_percent: 0.0,
        heart_rate_bpm: 0.0,
    };
}

/// Whether the configured buffer length was long enough for a numerically
/// reliable estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reliability {
    Reliable,
    /// Buffer shorter than [`RELIABLE_BUFFER_LEN`]; the numbers are computed
    /// but their accuracy is degraded.
    Degraded,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VitalsOutcome {
    pub vitals: VitalsResult,
    pub reliability: Reliability,
}

/// Derives oxygen saturation and heart rate from an aligned red/infrared
/// PPG channel pair.
///
/// Oxygen uses the ratio of pulsatile (AC) to baseline (DC) components of
/// both traces; heart rate comes from the peak of the averaged magnitude
/// spectrum inside the physiological band. The extractor keeps the last
/// good result: a failed pass leaves it stale rather than clearing it.
#[derive(Debug, Default)]
pub struct VitalsExtractor {
    last: Option<VitalsResult>,
}

impl VitalsExtractor {
    pub fn new() -> Self {
        VitalsExtractor::default()
    }

    /// Most recent successful result, or the zero sentinel before one exists.
    pub fn last(&self) -> VitalsResult {
        self.last.unwrap_or(VitalsResult::SENTINEL)
    }

    /// Run one extraction pass over the aligned infrared/red buffers.
    ///
    /// `fft_size` must be a power of two no smaller than the buffer length.
    /// A degenerate (near-flat) trace yields [`BciError::VitalsUnavailable`]
    /// and leaves the previous result in place.
    pub fn extract(
        &mut self,
        ppg_ir: &[f64],
        ppg_red: &[f64],
        sampling_rate_hz: f64,
        fft_size: usize,
    ) -> Result<VitalsOutcome, BciError> {
        if ppg_ir.len() != ppg_red.len() {
            return Err(BciError::BufferMismatch {
                expected: ppg_ir.len(),
                actual: ppg_red.len(),
            });
        }
        if ppg_ir.is_empty() {
            return Err(BciError::VitalsUnavailable("empty PPG buffers".to_string()));
        }
        if sampling_rate_hz <= 0.0 {
            return Err(BciError::InvalidFilterParameters(format!(
                "sampling rate must be positive, got {sampling_rate_hz} Hz"
            )));
        }
        if !fft_size.is_power_of_two() || fft_size < ppg_ir.len() {
            return Err(BciError::InvalidFilterParameters(format!(
                "fft size {fft_size} must be a power of two >= buffer length {}",
                ppg_ir.len()
            )));
        }
        if variance(ppg_ir) < 1e-12 || variance(ppg_red) < 1e-12 {
            return Err(BciError::VitalsUnavailable(
                "flat PPG trace, no pulsatile component".to_string(),
            ));
        }

        let (ir_ac, ir_dc) = ac_dc(ppg_ir, sampling_rate_hz)?;
        let (red_ac, red_dc) = ac_dc(ppg_red, sampling_rate_hz)?;
        if ir_dc.abs() < 1e-12 || red_dc.abs() < 1e-12 || ir_ac < 1e-12 {
            return Err(BciError::VitalsUnavailable(
                "PPG baseline or pulsatile component vanished".to_string(),
            ));
        }
        let r_ratio = (red_ac / red_dc) / (ir_ac / ir_dc);
        // Linearized empirical calibration of the Beer-Lambert curve.
        let oxygen_percent = (110.0 - 25.0 * r_ratio).clamp(0.0, 100.0);

        let heart_rate_bpm = heart_rate_fft(ppg_ir, ppg_red, sampling_rate_hz, fft_size)?;

        let vitals = VitalsResult {
            oxygen_percent,
            heart_rate_bpm,
        };
        self.last = Some(vitals);
        let reliability = if ppg_ir.len() < RELIABLE_BUFFER_LEN {
            Reliability::Degraded
        } else {
            Reliability::Reliable
        };
        Ok(VitalsOutcome {
            vitals,
            reliability,
        })
    }
}

/// DC is the trace mean; AC is the RMS of the pulsatile band, measured after
/// the filter transient has settled.
fn ac_dc(trace: &[f64], sampling_rate_hz: f64) -> Result<(f64, f64), BciError> {
    let dc = trace.iter().sum::<f64>() / trace.len() as f64;
    let mut pulsatile: Vec<f64> = trace.iter().map(|x| x - dc).collect();
    FilterSpec::new(
        FilterKind::BandPass {
            low_hz: PULSE_BAND_HZ.0,
            high_hz: PULSE_BAND_HZ.1,
        },
        FilterFamily::Butterworth,
        2,
    )
    .apply(&mut pulsatile, sampling_rate_hz)?;
    let skip = ((2.0 * sampling_rate_hz) as usize).min(pulsatile.len() / 10);
    let steady = &pulsatile[skip..];
    let ac = if steady.is_empty() {
        0.0
    } else {
        (steady.iter().map(|x| x * x).sum::<f64>() / steady.len() as f64).sqrt()
    };
    Ok((ac, dc))
}

/// Peak of the averaged red/infrared magnitude spectrum inside the
/// physiological band, from a zero-padded FFT of the mean-removed traces.
fn heart_rate_fft(
    ppg_ir: &[f64],
    ppg_red: &[f64],
    sampling_rate_hz: f64,
    fft_size: usize,
) -> Result<f64, BciError> {
    let bin_hz = sampling_rate_hz / fft_size as f64;
    let k_min = (HR_BAND_HZ.0 / bin_hz).ceil() as usize;
    let k_max = ((HR_BAND_HZ.1 / bin_hz).floor() as usize).min(fft_size / 2);
    if k_min > k_max {
        return Err(BciError::InvalidFilterParameters(format!(
            "fft size {fft_size} cannot resolve the {:.1}-{:.1} Hz band at {sampling_rate_hz} Hz",
            HR_BAND_HZ.0, HR_BAND_HZ.1
        )));
    }

    let ir_mag = magnitude_spectrum(ppg_ir, fft_size);
    let red_mag = magnitude_spectrum(ppg_red, fft_size);

    let mut best_bin = k_min;
    let mut best_mag = f64::NEG_INFINITY;
    for k in k_min..=k_max {
        let mag = (ir_mag[k] + red_mag[k]) / 2.0;
        if mag > best_mag {
            best_mag = mag;
            best_bin = k;
        }
    }
    if best_mag <= 0.0 {
        return Err(BciError::VitalsUnavailable(
            "no spectral peak in the physiological band".to_string(),
        ));
    }
    Ok(best_bin as f64 * bin_hz * 60.0)
}

fn magnitude_spectrum(trace: &[f64], fft_size: usize) -> Vec<f64> {
    let mean = trace.iter().sum::<f64>() / trace.len() as f64;
    let mut buffer: Vec<Complex64> = trace
        .iter()
        .map(|&x| Complex64::new(x - mean, 0.0))
        .collect();
    buffer.resize(fft_size, Complex64::new(0.0, 0.0));
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(fft_size);
    fft.process(&mut buffer);
    buffer
        .iter()
        .take(fft_size / 2 + 1)
        .map(|c| c.norm() / fft_size as f64)
        .collect()
}

fn variance(trace: &[f64]) -> f64 {
    if trace.is_empty() {
        return 0.0;
    }
    let mean = trace.iter().sum::<f64>() / trace.len() as f64;
    trace.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / trace.len() as f64
}

/// Synthesize an aligned (red, infrared) PPG pair with the given target
/// heart rate and oxygen saturation. The red/infrared modulation depths are
/// chosen so the ratio-of-ratios inverts back to `spo2_percent`.
pub fn synthesize_ppg_pair(
    heart_rate_bpm: f64,
    spo2_percent: f64,
    sampling_rate_hz: f64,
    sample_count: usize,
) -> (Vec<f64>, Vec<f64>) {
    use std::f64::consts::PI;

    let r_target = (110.0 - spo2_percent.clamp(0.0, 100.0)) / 25.0;
    let ir_modulation = 0.02; // typical infrared perfusion depth
    let red_modulation = r_target * ir_modulation;
    let red_baseline = 1000.0;
    let ir_baseline = 2000.0;

    let mut red = Vec::with_capacity(sample_count);
    let mut ir = Vec::with_capacity(sample_count);
    for i in 0..sample_count {
        let phase = 2.0 * PI * (heart_rate_bpm / 60.0) * i as f64 / sampling_rate_hz;
        // Fundamental plus two harmonics approximates the dicrotic notch.
        let pulse =
            -0.6 * phase.sin() - 0.3 * (2.0 * phase).sin() - 0.1 * (3.0 * phase).sin();
        red.push(red_baseline * (1.0 + red_modulation * pulse));
        ir.push(ir_baseline * (1.0 + ir_modulation * pulse));
    }
    (red, ir)
}
