use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::BciError;
use crate::matrix::SampleMatrix;

/// Mutex-guarded rolling window over recent samples, one ring per channel.
///
/// This is the only sanctioned path from the acquisition thread to a live
/// view: readers take a full copy under the lock and render from the copy,
/// so no reader ever aliases a buffer the conditioning pass mutates.
pub struct LiveWindow {
    inner: Mutex<Window>,
}

struct Window {
    per_channel: Vec<VecDeque<f64>>,
    capacity: usize,
}

impl LiveWindow {
    pub fn new(num_channels: usize, capacity: usize) -> Self {
        LiveWindow {
            inner: Mutex::new(Window {
                per_channel: (0..num_channels)
                    .map(|_| VecDeque::with_capacity(capacity))
                    .collect(),
                capacity,
            }),
        }
    }

    /// Appends every row of the matrix, evicting the oldest samples once a
    /// channel ring is full.
    pub fn push(&self, matrix: &SampleMatrix) -> Result<(), BciError> {
        let mut window = self.lock();
        if matrix.num_rows() != window.per_channel.len() {
            return Err(BciError::BufferMismatch {
                expected: window.per_channel.len(),
                actual: matrix.num_rows(),
            });
        }
        let capacity = window.capacity;
        for (channel, ring) in window.per_channel.iter_mut().enumerate() {
            for &sample in matrix.row(channel) {
                if ring.len() == capacity {
                    ring.pop_front();
                }
                ring.push_back(sample);
            }
        }
        Ok(())
    }

    /// Copies the current window out, oldest sample first per channel.
    pub fn snapshot(&self) -> Vec<Vec<f64>> {
        let window = self.lock();
        window
            .per_channel
            .iter()
            .map(|ring| ring.iter().copied().collect())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().per_channel.first().map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Window> {
        // A poisoned lock only means a panicking writer; the window data is
        // still a consistent ring, so keep serving it.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
