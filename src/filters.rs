use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::BciError;
use crate::matrix::SampleMatrix;

/// Nominal mains grid frequency for environmental noise removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MainsFrequency {
    Fifty,
    Sixty,
}

impl MainsFrequency {
    pub fn hz(self) -> f64 {
        match self {
            MainsFrequency::Fifty => 50.0,
            MainsFrequency::Sixty => 60.0,
        }
    }
}

/// Analog prototype family a filter cascade is derived from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FilterFamily {
    Butterworth,
    Bessel,
    /// Ripple is the passband ripple in dB; must be positive.
    ChebyshevI { ripple_db: f64 },
}

/// Closed set of supported filter operations with their frequency payloads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum FilterKind {
    LowPass { cutoff_hz: f64 },
    HighPass { cutoff_hz: f64 },
    BandPass { low_hz: f64, high_hz: f64 },
    BandStop { low_hz: f64, high_hz: f64 },
    /// Fixed-frequency mains-hum notch; family and ripple do not apply.
    Notch { mains: MainsFrequency },
}

/// One fully parameterized, stateless filter invocation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub family: FilterFamily,
    pub order: usize,
}

impl FilterSpec {
    pub fn new(kind: FilterKind, family: FilterFamily, order: usize) -> Self {
        FilterSpec { kind, family, order }
    }

    /// Apply the filter in place. Parameters are validated and the full
    /// biquad cascade designed before the first sample is touched, so the
    /// buffer stays unmodified when this returns an error.
    pub fn apply(&self, samples: &mut [f64], sampling_rate_hz: f64) -> Result<(), BciError> {
        let mut cascade = design_cascade(self, sampling_rate_hz)?;
        for section in &mut cascade {
            section.run(samples);
        }
        Ok(())
    }
}

/// Reduction operator used when downsampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggOperation {
    Mean,
    Median,
    First,
}

/// Aggregate consecutive samples over a fixed period into a shorter buffer.
///
/// Non-destructive: returns a derived buffer of length `ceil(n / period)`;
/// the trailing partial window is aggregated like a full one.
pub fn downsample(
    samples: &[f64],
    period: usize,
    operation: AggOperation,
) -> Result<Vec<f64>, BciError> {
    if period == 0 {
        return Err(BciError::InvalidFilterParameters(
            "downsampling period must be positive".to_string(),
        ));
    }
    let out = samples
        .chunks(period)
        .map(|window| match operation {
            AggOperation::Mean => window.iter().sum::<f64>() / window.len() as f64,
            AggOperation::Median => median(window),
            AggOperation::First => window[0],
        })
        .collect();
    Ok(out)
}

fn median(window: &[f64]) -> f64 {
    let mut sorted = window.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Per-deployment mapping of filter specs to matrix rows.
///
/// Each assignment is an independent, stateless invocation; a failing
/// channel is reported without aborting the siblings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterPlan {
    assignments: Vec<(usize, FilterSpec)>,
}

impl FilterPlan {
    pub fn new(assignments: Vec<(usize, FilterSpec)>) -> Self {
        FilterPlan { assignments }
    }

    /// Assign specs to channels round-robin: the Nth channel gets the
    /// (N mod specs.len())th spec.
    pub fn round_robin(specs: &[FilterSpec], channels: &[usize]) -> Self {
        let assignments = channels
            .iter()
            .enumerate()
            .filter_map(|(i, &channel)| {
                specs
                    .get(i % specs.len().max(1))
                    .map(|spec| (channel, *spec))
            })
            .collect();
        FilterPlan { assignments }
    }

    pub fn assignments(&self) -> &[(usize, FilterSpec)] {
        &self.assignments
    }

    /// Run every assignment against the matrix, in place. Returns the
    /// per-channel failures; rows named by failed assignments are left
    /// untouched.
    pub fn apply_to(
        &self,
        matrix: &mut SampleMatrix,
        sampling_rate_hz: f64,
    ) -> Vec<(usize, BciError)> {
        let mut failures = Vec::new();
        for (channel, spec) in &self.assignments {
            if *channel >= matrix.num_rows() {
                failures.push((
                    *channel,
                    BciError::InvalidFilterParameters(format!(
                        "channel {channel} outside matrix with {} rows",
                        matrix.num_rows()
                    )),
                ));
                continue;
            }
            if let Err(err) = spec.apply(matrix.row_mut(*channel), sampling_rate_hz) {
                failures.push((*channel, err));
            }
        }
        failures
    }
}

// --- biquad cascade design -------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Direct Form II Transposed biquad section.
#[derive(Debug)]
struct Biquad {
    coeffs: Coefficients,
    z1: f64,
    z2: f64,
}

impl Biquad {
    fn new(coeffs: Coefficients) -> Self {
        Biquad {
            coeffs,
            z1: 0.0,
            z2: 0.0,
        }
    }

    fn process(&mut self, x: f64) -> f64 {
        let y = self.coeffs.b0 * x + self.z1;
        self.z1 = self.coeffs.b1 * x - self.coeffs.a1 * y + self.z2;
        self.z2 = self.coeffs.b2 * x - self.coeffs.a2 * y;
        y
    }

    fn run(&mut self, samples: &mut [f64]) {
        for sample in samples {
            *sample = self.process(*sample);
        }
    }
}

/// Second-order section of the normalized analog prototype: a frequency
/// scaling factor applied to the corner frequency, and the section Q.
#[derive(Clone, Copy, Debug)]
struct PrototypeSection {
    fsf: f64,
    q: f64,
}

#[derive(Clone, Copy, Debug)]
struct Prototype {
    sections: [Option<PrototypeSection>; 4],
    /// Frequency scaling of the single real pole for odd orders.
    real_pole_fsf: Option<f64>,
}

impl Prototype {
    fn sections(&self) -> impl Iterator<Item = PrototypeSection> + '_ {
        self.sections.iter().filter_map(|s| *s)
    }
}

/// Bessel prototype stages normalized to the -3 dB point, orders 1..=8.
/// Classic (fsf, q) stage tables; the real pole entry is the stage fsf.
const BESSEL_PAIRS: [&[(f64, f64)]; 8] = [
    &[],
    &[(1.2736, 0.5773)],
    &[(1.4524, 0.6910)],
    &[(1.4192, 0.5219), (1.5912, 0.8055)],
    &[(1.5611, 0.5635), (1.7607, 0.9165)],
    &[(1.6060, 0.5103), (1.6913, 0.6112), (1.9071, 1.0234)],
    &[(1.7174, 0.5324), (1.8235, 0.6608), (2.0507, 1.1262)],
    &[
        (1.7837, 0.5060),
        (1.8376, 0.5596),
        (1.9591, 0.7109),
        (2.1953, 1.2258),
    ],
];
const BESSEL_REAL_POLE: [f64; 8] = [1.0, 0.0, 1.3270, 0.0, 1.5023, 0.0, 1.6843, 0.0];

fn prototype(family: FilterFamily, order: usize) -> Result<Prototype, BciError> {
    if order == 0 || order > 8 {
        return Err(BciError::InvalidFilterParameters(format!(
            "filter order must be in 1..=8, got {order}"
        )));
    }
    let mut sections = [None; 4];
    let pair_count = order / 2;
    let mut real_pole_fsf = None;

    match family {
        FilterFamily::Butterworth => {
            for k in 0..pair_count {
                let phi = PI * (2 * k + 1) as f64 / (2 * order) as f64;
                sections[k] = Some(PrototypeSection {
                    fsf: 1.0,
                    q: 1.0 / (2.0 * phi.cos()),
                });
            }
            if order % 2 == 1 {
                real_pole_fsf = Some(1.0);
            }
        }
        FilterFamily::Bessel => {
            for (k, &(fsf, q)) in BESSEL_PAIRS[order - 1].iter().enumerate() {
                sections[k] = Some(PrototypeSection { fsf, q });
            }
            if order % 2 == 1 {
                real_pole_fsf = Some(BESSEL_REAL_POLE[order - 1]);
            }
        }
        FilterFamily::ChebyshevI { ripple_db } => {
            if ripple_db <= 0.0 {
                return Err(BciError::InvalidFilterParameters(format!(
                    "Chebyshev ripple must be positive, got {ripple_db} dB"
                )));
            }
            let eps = (10f64.powf(ripple_db / 10.0) - 1.0).sqrt();
            let mu = (1.0 / eps).asinh() / order as f64;
            for k in 0..pair_count {
                let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
                let re = -mu.sinh() * theta.sin();
                let im = mu.cosh() * theta.cos();
                let w0 = re.hypot(im);
                sections[k] = Some(PrototypeSection {
                    fsf: w0,
                    q: w0 / (2.0 * re.abs()),
                });
            }
            if order % 2 == 1 {
                real_pole_fsf = Some(mu.sinh());
            }
        }
    }
    Ok(Prototype {
        sections,
        real_pole_fsf,
    })
}

fn check_frequency(label: &str, hz: f64, sampling_rate_hz: f64) -> Result<(), BciError> {
    if sampling_rate_hz <= 0.0 {
        return Err(BciError::InvalidFilterParameters(format!(
            "sampling rate must be positive, got {sampling_rate_hz} Hz"
        )));
    }
    if hz <= 0.0 || hz >= sampling_rate_hz / 2.0 {
        return Err(BciError::InvalidFilterParameters(format!(
            "{label} {hz} Hz outside (0, {}) Hz",
            sampling_rate_hz / 2.0
        )));
    }
    Ok(())
}

fn design_cascade(spec: &FilterSpec, fs: f64) -> Result<Vec<Biquad>, BciError> {
    match spec.kind {
        FilterKind::LowPass { cutoff_hz } => {
            check_frequency("cutoff", cutoff_hz, fs)?;
            design_pass(spec.family, spec.order, cutoff_hz, fs, Pass::Low)
        }
        FilterKind::HighPass { cutoff_hz } => {
            check_frequency("cutoff", cutoff_hz, fs)?;
            design_pass(spec.family, spec.order, cutoff_hz, fs, Pass::High)
        }
        FilterKind::BandPass { low_hz, high_hz } => {
            check_band(low_hz, high_hz, fs)?;
            // High-pass at the low edge cascaded with low-pass at the high edge.
            let mut cascade = design_pass(spec.family, spec.order, low_hz, fs, Pass::High)?;
            cascade.extend(design_pass(spec.family, spec.order, high_hz, fs, Pass::Low)?);
            Ok(cascade)
        }
        FilterKind::BandStop { low_hz, high_hz } => {
            check_band(low_hz, high_hz, fs)?;
            design_notch(spec.order, low_hz, high_hz, fs)
        }
        FilterKind::Notch { mains } => {
            // Fixed 4 Hz-wide stop band centered on the grid frequency.
            let center = mains.hz();
            check_band(center - 2.0, center + 2.0, fs)?;
            design_notch(spec.order, center - 2.0, center + 2.0, fs)
        }
    }
}

fn check_band(low_hz: f64, high_hz: f64, fs: f64) -> Result<(), BciError> {
    check_frequency("band edge", low_hz, fs)?;
    check_frequency("band edge", high_hz, fs)?;
    if low_hz >= high_hz {
        return Err(BciError::InvalidFilterParameters(format!(
            "band edges inverted: {low_hz} Hz >= {high_hz} Hz"
        )));
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq)]
enum Pass {
    Low,
    High,
}

fn design_pass(
    family: FilterFamily,
    order: usize,
    cutoff_hz: f64,
    fs: f64,
    pass: Pass,
) -> Result<Vec<Biquad>, BciError> {
    let proto = prototype(family, order)?;
    let mut cascade = Vec::with_capacity(order / 2 + 1);
    for section in proto.sections() {
        // Low-pass corners scale up by the stage factor, high-pass corners
        // scale down (prototype transformation s -> 1/s).
        let f0 = match pass {
            Pass::Low => cutoff_hz * section.fsf,
            Pass::High => cutoff_hz / section.fsf,
        };
        let f0 = clamp_corner(f0, fs);
        cascade.push(Biquad::new(second_order(pass, f0, section.q, fs)));
    }
    if let Some(fsf) = proto.real_pole_fsf {
        let f0 = match pass {
            Pass::Low => cutoff_hz * fsf,
            Pass::High => cutoff_hz / fsf,
        };
        let f0 = clamp_corner(f0, fs);
        cascade.push(Biquad::new(first_order(pass, f0, fs)));
    }
    Ok(cascade)
}

/// Scaled stage corners can brush against Nyquist for aggressive cutoffs;
/// pin them just below it so the bilinear transform stays finite.
fn clamp_corner(f0: f64, fs: f64) -> f64 {
    f0.min(0.499 * fs)
}

fn design_notch(order: usize, low_hz: f64, high_hz: f64, fs: f64) -> Result<Vec<Biquad>, BciError> {
    if order == 0 || order > 8 {
        return Err(BciError::InvalidFilterParameters(format!(
            "filter order must be in 1..=8, got {order}"
        )));
    }
    let center = (low_hz * high_hz).sqrt();
    let q = center / (high_hz - low_hz);
    let stages = order.div_ceil(2);
    let mut cascade = Vec::with_capacity(stages);
    for _ in 0..stages {
        cascade.push(Biquad::new(notch(center, q, fs)));
    }
    Ok(cascade)
}

// RBJ cookbook sections, normalized by a0.

fn second_order(pass: Pass, f0: f64, q: f64, fs: f64) -> Coefficients {
    let omega = 2.0 * PI * f0 / fs;
    let alpha = omega.sin() / (2.0 * q);
    let cos_omega = omega.cos();
    let a0 = 1.0 + alpha;
    let (b0, b1, b2) = match pass {
        Pass::Low => {
            let b1 = 1.0 - cos_omega;
            (b1 / 2.0, b1, b1 / 2.0)
        }
        Pass::High => {
            let b1 = -(1.0 + cos_omega);
            (-b1 / 2.0, b1, -b1 / 2.0)
        }
    };
    Coefficients {
        b0: b0 / a0,
        b1: b1 / a0,
        b2: b2 / a0,
        a1: -2.0 * cos_omega / a0,
        a2: (1.0 - alpha) / a0,
    }
}

fn first_order(pass: Pass, f0: f64, fs: f64) -> Coefficients {
    let k = (PI * f0 / fs).tan();
    let a1 = (k - 1.0) / (k + 1.0);
    match pass {
        Pass::Low => Coefficients {
            b0: k / (k + 1.0),
            b1: k / (k + 1.0),
            b2: 0.0,
            a1,
            a2: 0.0,
        },
        Pass::High => Coefficients {
            b0: 1.0 / (k + 1.0),
            b1: -1.0 / (k + 1.0),
            b2: 0.0,
            a1,
            a2: 0.0,
        },
    }
}

fn notch(f0: f64, q: f64, fs: f64) -> Coefficients {
    let omega = 2.0 * PI * f0 / fs;
    let alpha = omega.sin() / (2.0 * q);
    let cos_omega = omega.cos();
    let a0 = 1.0 + alpha;
    Coefficients {
        b0: 1.0 / a0,
        b1: -2.0 * cos_omega / a0,
        b2: 1.0 / a0,
        a1: -2.0 * cos_omega / a0,
        a2: (1.0 - alpha) / a0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FS: f64 = 250.0;

    fn sine(freq: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / FS).sin())
            .collect()
    }

    fn rms(samples: &[f64]) -> f64 {
        (samples.iter().map(|x| x * x).sum::<f64>() / samples.len() as f64).sqrt()
    }

    #[test]
    fn lowpass_attenuates_high_frequency() {
        let mut buf = sine(100.0, 2000);
        let spec = FilterSpec::new(
            FilterKind::LowPass { cutoff_hz: 10.0 },
            FilterFamily::Butterworth,
            4,
        );
        spec.apply(&mut buf, FS).unwrap();
        assert!(rms(&buf[1000..]) < 0.05, "got rms {}", rms(&buf[1000..]));
    }

    #[test]
    fn lowpass_passes_low_frequency() {
        let mut buf = sine(2.0, 2000);
        let spec = FilterSpec::new(
            FilterKind::LowPass { cutoff_hz: 30.0 },
            FilterFamily::Butterworth,
            4,
        );
        spec.apply(&mut buf, FS).unwrap();
        let reference = rms(&sine(2.0, 2000)[1000..]);
        assert!((rms(&buf[1000..]) - reference).abs() < 0.1 * reference);
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut buf = vec![5.0; 2000];
        let spec = FilterSpec::new(
            FilterKind::HighPass { cutoff_hz: 1.0 },
            FilterFamily::Butterworth,
            2,
        );
        spec.apply(&mut buf, FS).unwrap();
        assert!(buf[1999].abs() < 0.05, "got {}", buf[1999]);
    }

    #[test]
    fn bandpass_keeps_in_band_rejects_out_of_band() {
        let spec = FilterSpec::new(
            FilterKind::BandPass {
                low_hz: 8.0,
                high_hz: 13.0,
            },
            FilterFamily::Butterworth,
            4,
        );
        let mut in_band = sine(10.0, 4000);
        spec.apply(&mut in_band, FS).unwrap();
        let mut out_of_band = sine(60.0, 4000);
        spec.apply(&mut out_of_band, FS).unwrap();
        assert!(rms(&in_band[2000..]) > 3.0 * rms(&out_of_band[2000..]));
    }

    #[test]
    fn bandstop_notches_center_frequency() {
        let spec = FilterSpec::new(
            FilterKind::BandStop {
                low_hz: 48.0,
                high_hz: 52.0,
            },
            FilterFamily::Butterworth,
            4,
        );
        let mut hum = sine(50.0, 4000);
        spec.apply(&mut hum, FS).unwrap();
        assert!(rms(&hum[2000..]) < 0.1, "got rms {}", rms(&hum[2000..]));
    }

    #[test]
    fn mains_notch_removes_hum_but_passes_alpha() {
        let spec = FilterSpec::new(
            FilterKind::Notch {
                mains: MainsFrequency::Fifty,
            },
            FilterFamily::Butterworth,
            4,
        );
        let mut hum = sine(50.0, 4000);
        spec.apply(&mut hum, FS).unwrap();
        assert!(rms(&hum[2000..]) < 0.1);

        let mut alpha = sine(10.0, 4000);
        spec.apply(&mut alpha, FS).unwrap();
        let reference = rms(&sine(10.0, 4000)[2000..]);
        assert!((rms(&alpha[2000..]) - reference).abs() < 0.1 * reference);
    }

    #[test]
    fn chebyshev_and_bessel_stay_finite_at_order_eight() {
        for family in [
            FilterFamily::Bessel,
            FilterFamily::ChebyshevI { ripple_db: 0.5 },
        ] {
            let mut buf = sine(30.0, 4000);
            let spec = FilterSpec::new(FilterKind::LowPass { cutoff_hz: 40.0 }, family, 8);
            spec.apply(&mut buf, FS).unwrap();
            assert!(buf.iter().all(|x| x.is_finite()), "{family:?} diverged");
        }
    }

    #[test]
    fn odd_orders_are_supported() {
        for family in [
            FilterFamily::Butterworth,
            FilterFamily::Bessel,
            FilterFamily::ChebyshevI { ripple_db: 1.0 },
        ] {
            for order in [1, 3, 5, 7] {
                let mut buf = sine(100.0, 2000);
                let spec = FilterSpec::new(FilterKind::LowPass { cutoff_hz: 10.0 }, family, order);
                spec.apply(&mut buf, FS).unwrap();
                assert!(rms(&buf[1000..]) < 0.5, "{family:?} order {order}");
            }
        }
    }

    #[test]
    fn identical_parameters_give_bit_identical_output() {
        let spec = FilterSpec::new(
            FilterKind::BandPass {
                low_hz: 1.0,
                high_hz: 45.0,
            },
            FilterFamily::ChebyshevI { ripple_db: 0.5 },
            6,
        );
        let mut a = sine(12.0, 1000);
        let mut b = a.clone();
        spec.apply(&mut a, FS).unwrap();
        spec.apply(&mut b, FS).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_parameters_leave_buffer_untouched() {
        let original = sine(10.0, 100);
        let cases = [
            FilterSpec::new(FilterKind::LowPass { cutoff_hz: 200.0 }, FilterFamily::Butterworth, 4),
            FilterSpec::new(FilterKind::LowPass { cutoff_hz: -1.0 }, FilterFamily::Butterworth, 4),
            FilterSpec::new(FilterKind::LowPass { cutoff_hz: 10.0 }, FilterFamily::Butterworth, 0),
            FilterSpec::new(FilterKind::LowPass { cutoff_hz: 10.0 }, FilterFamily::Butterworth, 9),
            FilterSpec::new(
                FilterKind::BandPass { low_hz: 30.0, high_hz: 8.0 },
                FilterFamily::Butterworth,
                4,
            ),
            FilterSpec::new(
                FilterKind::LowPass { cutoff_hz: 10.0 },
                FilterFamily::ChebyshevI { ripple_db: 0.0 },
                4,
            ),
        ];
        for spec in cases {
            let mut buf = original.clone();
            let err = spec.apply(&mut buf, FS).unwrap_err();
            assert!(matches!(err, BciError::InvalidFilterParameters(_)), "{spec:?}");
            assert_eq!(buf, original, "buffer mutated by failing {spec:?}");
        }
    }

    #[test]
    fn downsample_lengths_use_ceiling_policy() {
        let samples: Vec<f64> = (0..10).map(|i| i as f64).collect();
        for op in [AggOperation::Mean, AggOperation::Median, AggOperation::First] {
            assert_eq!(downsample(&samples, 3, op).unwrap().len(), 4, "{op:?}");
            assert_eq!(downsample(&samples, 5, op).unwrap().len(), 2, "{op:?}");
            assert_eq!(downsample(&samples, 1, op).unwrap().len(), 10, "{op:?}");
        }
    }

    #[test]
    fn downsample_operators_aggregate_each_window() {
        let samples = vec![1.0, 2.0, 9.0, 4.0, 5.0];
        assert_eq!(
            downsample(&samples, 3, AggOperation::Mean).unwrap(),
            vec![4.0, 4.5]
        );
        assert_eq!(
            downsample(&samples, 3, AggOperation::Median).unwrap(),
            vec![2.0, 4.5]
        );
        assert_eq!(
            downsample(&samples, 3, AggOperation::First).unwrap(),
            vec![1.0, 4.0]
        );
    }

    #[test]
    fn downsample_rejects_zero_period() {
        assert!(matches!(
            downsample(&[1.0], 0, AggOperation::Mean),
            Err(BciError::InvalidFilterParameters(_))
        ));
    }

    #[test]
    fn round_robin_cycles_specs_across_channels() {
        let specs = [
            FilterSpec::new(FilterKind::LowPass { cutoff_hz: 40.0 }, FilterFamily::Butterworth, 4),
            FilterSpec::new(FilterKind::HighPass { cutoff_hz: 1.0 }, FilterFamily::Butterworth, 2),
        ];
        let plan = FilterPlan::round_robin(&specs, &[3, 4, 5]);
        let assigned = plan.assignments();
        assert_eq!(assigned.len(), 3);
        assert_eq!(assigned[0], (3, specs[0]));
        assert_eq!(assigned[1], (4, specs[1]));
        assert_eq!(assigned[2], (5, specs[0]));
    }

    #[test]
    fn plan_failures_do_not_abort_siblings() {
        let mut matrix = SampleMatrix::from_rows(vec![sine(100.0, 2000), sine(100.0, 2000)]).unwrap();
        let good = FilterSpec::new(FilterKind::LowPass { cutoff_hz: 10.0 }, FilterFamily::Butterworth, 4);
        let bad = FilterSpec::new(FilterKind::LowPass { cutoff_hz: 500.0 }, FilterFamily::Butterworth, 4);
        let plan = FilterPlan::new(vec![(0, bad), (1, good), (7, good)]);
        let failures = plan.apply_to(&mut matrix, FS);
        assert_eq!(failures.len(), 2);
        // Channel 0 failed validation and is untouched.
        assert_eq!(matrix.row(0), &sine(100.0, 2000)[..]);
        // Channel 1 was filtered despite its failing siblings.
        assert!(rms(&matrix.row(1)[1000..]) < 0.05);
    }
}
