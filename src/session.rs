use std::collections::VecDeque;
use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::BoardDescriptor;
use crate::error::BciError;
use crate::matrix::SampleMatrix;
use crate::vitals::synthesize_ppg_pair;

/// Something that can describe a board and hand over a filled sample matrix
/// for a bounded acquisition window.
pub trait DeviceSession {
    fn descriptor(&self) -> &BoardDescriptor;
    fn acquire(&mut self, sample_count: usize) -> Result<SampleMatrix, BciError>;
}

/// In-memory session feeding prebuilt matrices, for tests and playback.
pub struct ManualSession {
    board: BoardDescriptor,
    queue: VecDeque<SampleMatrix>,
}

impl ManualSession {
    pub fn new(board: BoardDescriptor, matrices: impl IntoIterator<Item = SampleMatrix>) -> Self {
        ManualSession {
            board,
            queue: matrices.into_iter().collect(),
        }
    }
}

impl DeviceSession for ManualSession {
    fn descriptor(&self) -> &BoardDescriptor {
        &self.board
    }

    fn acquire(&mut self, _sample_count: usize) -> Result<SampleMatrix, BciError> {
        self.queue
            .pop_front()
            .ok_or_else(|| BciError::Session("manual session exhausted".to_string()))
    }
}

/// Deterministic software board: plausible EEG, motion, physio and
/// housekeeping rows with no hardware attached. Same seed, same matrix.
pub struct SyntheticSession {
    board: BoardDescriptor,
    rng: StdRng,
    heart_rate_bpm: f64,
    oxygen_percent: f64,
}

impl SyntheticSession {
    pub fn new(board: BoardDescriptor, seed: u64) -> Self {
        SyntheticSession {
            board,
            rng: StdRng::seed_from_u64(seed),
            heart_rate_bpm: 72.0,
            oxygen_percent: 97.0,
        }
    }

    pub fn with_vitals(mut self, heart_rate_bpm: f64, oxygen_percent: f64) -> Self {
        self.heart_rate_bpm = heart_rate_bpm;
        self.oxygen_percent = oxygen_percent;
        self
    }
}

impl DeviceSession for SyntheticSession {
    fn descriptor(&self) -> &BoardDescriptor {
        &self.board
    }

    fn acquire(&mut self, sample_count: usize) -> Result<SampleMatrix, BciError> {
        let board = &self.board;
        let fs = board.sampling_rate_hz;
        if fs <= 0.0 {
            return Err(BciError::InvalidBoardDescriptor(format!(
                "sampling rate {fs} Hz"
            )));
        }
        let mut matrix = SampleMatrix::zeros(board.num_rows, sample_count);

        // EEG: one alpha-band tone per electrode plus wideband noise, in uV.
        for (position, &row) in board.eeg_channels.iter().enumerate() {
            let tone_hz = 8.0 + position as f64 * 0.5;
            let amplitude = 20.0 + position as f64;
            let out = matrix.row_mut(row);
            for (i, sample) in out.iter_mut().enumerate() {
                let t = i as f64 / fs;
                *sample = amplitude * (2.0 * PI * tone_hz * t).sin()
                    + self.rng.gen_range(-5.0..5.0);
            }
        }

        // Slow sinusoidal motion on accelerometer and gyro rows.
        for (group, scale, period_s) in [
            (&board.accel_channels, 0.1, 2.0),
            (&board.gyro_channels, 3.0, 1.5),
            (&board.rotation_channels, 0.5, 4.0),
        ] {
            for (axis, &row) in group.iter().enumerate() {
                let out = matrix.row_mut(row);
                for (i, sample) in out.iter_mut().enumerate() {
                    let t = i as f64 / fs;
                    *sample = scale * (2.0 * PI * t / period_s + axis as f64).sin();
                }
            }
        }

        if let Some((red_row, ir_row)) = board.ppg_pair() {
            let (red, ir) =
                synthesize_ppg_pair(self.heart_rate_bpm, self.oxygen_percent, fs, sample_count);
            matrix.row_mut(red_row).copy_from_slice(&red);
            matrix.row_mut(ir_row).copy_from_slice(&ir);
        }

        for &row in &board.eda_channels {
            let out = matrix.row_mut(row);
            for sample in out.iter_mut() {
                *sample = 0.4 + self.rng.gen_range(-0.01..0.01);
            }
        }
        for &row in &board.temperature_channels {
            matrix.row_mut(row).fill(36.6);
        }
        for &row in &board.resistance_channels {
            let out = matrix.row_mut(row);
            for sample in out.iter_mut() {
                *sample = 5_000.0 + self.rng.gen_range(-100.0..100.0);
            }
        }

        if let Some(row) = board.package_num_channel {
            let out = matrix.row_mut(row);
            for (i, sample) in out.iter_mut().enumerate() {
                *sample = i as f64;
            }
        }
        if let Some(row) = board.timestamp_channel {
            let out = matrix.row_mut(row);
            for (i, sample) in out.iter_mut().enumerate() {
                *sample = i as f64 / fs;
            }
        }
        if let Some(row) = board.battery_channel {
            matrix.row_mut(row).fill(95.0);
        }
        // Marker row stays zero: no events in a synthetic run.

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_matrix_has_board_shape() {
        let board = BoardDescriptor::synthetic();
        let mut session = SyntheticSession::new(board, 7);
        let matrix = session.acquire(500).unwrap();
        assert_eq!(matrix.num_rows(), 32);
        assert_eq!(matrix.sample_count(), 500);
    }

    #[test]
    fn same_seed_same_samples() {
        let board = BoardDescriptor::synthetic();
        let a = SyntheticSession::new(board.clone(), 42).acquire(256).unwrap();
        let b = SyntheticSession::new(board, 42).acquire(256).unwrap();
        for row in 0..a.num_rows() {
            assert_eq!(a.row(row), b.row(row), "row {row}");
        }
    }

    #[test]
    fn housekeeping_rows_are_filled() {
        let board = BoardDescriptor::synthetic();
        let matrix = SyntheticSession::new(board.clone(), 1).acquire(10).unwrap();
        let package = board.package_num_channel.unwrap();
        assert_eq!(matrix.row(package)[3], 3.0);
        let battery = board.battery_channel.unwrap();
        assert!(matrix.row(battery).iter().all(|&v| v == 95.0));
    }

    #[test]
    fn manual_session_drains_its_queue() {
        let board = BoardDescriptor::synthetic();
        let m = SampleMatrix::zeros(32, 8);
        let mut session = ManualSession::new(board, [m]);
        assert!(session.acquire(8).is_ok());
        assert!(session.acquire(8).is_err());
    }
}
