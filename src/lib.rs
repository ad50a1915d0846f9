//! Channel semantics and signal conditioning for BrainFlow-style biosignal
//! boards: label every matrix row, run IIR conditioning in place, extract
//! pulse vitals from the PPG pair and resolve labels into chart groups.
//!
//! The core stays presentation-free: it returns [`error::BciError`] values
//! and leaves logging and rendering decisions to the binary.

pub mod board;
pub mod error;
pub mod filters;
pub mod groups;
pub mod labels;
pub mod matrix;
pub mod plot;
pub mod report;
pub mod ring;
pub mod session;
pub mod vitals;

pub use board::{BoardDescriptor, ChannelGroup, NameTable};
pub use error::BciError;
pub use filters::{AggOperation, FilterFamily, FilterKind, FilterPlan, FilterSpec, MainsFrequency};
pub use groups::{resolve_groups, ChartGroupSpec, MarkerStyle};
pub use labels::build_labels;
pub use matrix::SampleMatrix;
pub use ring::LiveWindow;
pub use session::{DeviceSession, ManualSession, SyntheticSession};
pub use vitals::{Reliability, VitalsExtractor, VitalsOutcome, VitalsResult};
