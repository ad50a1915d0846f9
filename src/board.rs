use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Named channel groups a board row can belong to, in label precedence order.
///
/// The order of `ChannelGroup::PRECEDENCE` decides which group claims a row
/// that appears in more than one index list (first writer wins).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelGroup {
    Accel,
    Rotation,
    Temperature,
    Gyro,
    Resistance,
    Ppg,
    Exg,
    Eda,
    Other,
    Eog,
    Emg,
}

impl ChannelGroup {
    pub const PRECEDENCE: [ChannelGroup; 11] = [
        ChannelGroup::Accel,
        ChannelGroup::Rotation,
        ChannelGroup::Temperature,
        ChannelGroup::Gyro,
        ChannelGroup::Resistance,
        ChannelGroup::Ppg,
        ChannelGroup::Exg,
        ChannelGroup::Eda,
        ChannelGroup::Other,
        ChannelGroup::Eog,
        ChannelGroup::Emg,
    ];

    /// Label prefix for rows claimed by this group.
    pub fn prefix(self) -> &'static str {
        match self {
            ChannelGroup::Accel => "Accel",
            ChannelGroup::Rotation => "Rotation",
            ChannelGroup::Temperature => "Temperature",
            ChannelGroup::Gyro => "Gyro",
            ChannelGroup::Resistance => "Resistance",
            ChannelGroup::Ppg => "PPG",
            ChannelGroup::Exg => "EXG",
            ChannelGroup::Eda => "EDA",
            ChannelGroup::Other => "Other",
            ChannelGroup::Eog => "EOG",
            ChannelGroup::Emg => "EMG",
        }
    }
}

impl fmt::Display for ChannelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Static metadata for one device type: total row count, sampling rate,
/// EEG electrode placement and the index lists of every channel group.
///
/// Mirrors the board descriptor JSON a BrainFlow-style device session hands
/// out, so a descriptor can also be deserialized straight from such a dump.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardDescriptor {
    pub name: String,
    pub num_rows: usize,
    pub sampling_rate_hz: f64,
    /// Row indices carrying EEG data, in board-declared order.
    pub eeg_channels: Vec<usize>,
    /// Electrode names, positionally matched 1:1 to `eeg_channels`.
    pub eeg_names: Vec<String>,
    pub accel_channels: Vec<usize>,
    pub rotation_channels: Vec<usize>,
    pub temperature_channels: Vec<usize>,
    pub gyro_channels: Vec<usize>,
    pub resistance_channels: Vec<usize>,
    pub ppg_channels: Vec<usize>,
    pub exg_channels: Vec<usize>,
    pub eda_channels: Vec<usize>,
    pub other_channels: Vec<usize>,
    pub eog_channels: Vec<usize>,
    pub emg_channels: Vec<usize>,
    pub package_num_channel: Option<usize>,
    pub timestamp_channel: Option<usize>,
    pub marker_channel: Option<usize>,
    pub battery_channel: Option<usize>,
}

impl BoardDescriptor {
    /// Index list of the given group.
    pub fn group_indices(&self, group: ChannelGroup) -> &[usize] {
        match group {
            ChannelGroup::Accel => &self.accel_channels,
            ChannelGroup::Rotation => &self.rotation_channels,
            ChannelGroup::Temperature => &self.temperature_channels,
            ChannelGroup::Gyro => &self.gyro_channels,
            ChannelGroup::Resistance => &self.resistance_channels,
            ChannelGroup::Ppg => &self.ppg_channels,
            ChannelGroup::Exg => &self.exg_channels,
            ChannelGroup::Eda => &self.eda_channels,
            ChannelGroup::Other => &self.other_channels,
            ChannelGroup::Eog => &self.eog_channels,
            ChannelGroup::Emg => &self.emg_channels,
        }
    }

    /// The red/infrared PPG row pair, if the board exposes one.
    ///
    /// Convention inherited from the device API: the first PPG index is the
    /// red trace, the second the infrared trace.
    pub fn ppg_pair(&self) -> Option<(usize, usize)> {
        match self.ppg_channels.as_slice() {
            [red, ir, ..] => Some((*red, *ir)),
            _ => None,
        }
    }

    /// Multi-line description of the descriptor, suitable for logging.
    pub fn describe(&self) -> String {
        fn dump(channels: &[usize]) -> String {
            if channels.is_empty() {
                "None".to_string()
            } else {
                format!("{channels:?}")
            }
        }
        let mut out = String::new();
        out.push_str(&format!("Name: {}\n", self.name));
        out.push_str(&format!("Sampling rate: {} Hz\n", self.sampling_rate_hz));
        out.push_str(&format!("Num rows: {}\n", self.num_rows));
        out.push_str(&format!("EEG names: {}\n", self.eeg_names.join(",")));
        out.push_str(&format!("EEG channels: {}\n", dump(&self.eeg_channels)));
        for group in ChannelGroup::PRECEDENCE {
            out.push_str(&format!(
                "{} channels: {}\n",
                group,
                dump(self.group_indices(group))
            ));
        }
        out.push_str(&format!("Package channel: {:?}\n", self.package_num_channel));
        out.push_str(&format!("Timestamp channel: {:?}\n", self.timestamp_channel));
        out.push_str(&format!("Marker channel: {:?}\n", self.marker_channel));
        out.push_str(&format!("Battery channel: {:?}", self.battery_channel));
        out
    }

    /// Descriptor matching the BrainFlow synthetic board: 32 rows at 250 Hz,
    /// sixteen EEG electrodes that double as EOG/EMG, motion and physio
    /// groups, plus the four housekeeping rows.
    pub fn synthetic() -> Self {
        let eeg: Vec<usize> = (1..=16).collect();
        BoardDescriptor {
            name: "Synthetic".to_string(),
            num_rows: 32,
            sampling_rate_hz: 250.0,
            eeg_names: [
                "Fz", "C3", "Cz", "C4", "Pz", "PO7", "Oz", "PO8", "F1", "F2", "F3", "F4", "F5",
                "F6", "F7", "F8",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            eeg_channels: eeg.clone(),
            eog_channels: eeg.clone(),
            emg_channels: eeg,
            accel_channels: vec![17, 18, 19],
            gyro_channels: vec![20, 21, 22],
            eda_channels: vec![23],
            ppg_channels: vec![24, 25],
            temperature_channels: vec![26],
            resistance_channels: vec![27, 28],
            rotation_channels: Vec::new(),
            exg_channels: Vec::new(),
            other_channels: Vec::new(),
            package_num_channel: Some(0),
            battery_channel: Some(29),
            timestamp_channel: Some(30),
            marker_channel: Some(31),
        }
    }
}

static DEFAULT_DESCRIPTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Fz", "Frontal midline"),
        ("C3", "Central left side"),
        ("Cz", "Central midline"),
        ("C4", "Central right side"),
        ("Pz", "Parietal midline"),
        ("PO7", "Parieto-Occipital left side"),
        ("Oz", "Occipital midline"),
        ("PO8", "Parieto-Occipital right side"),
        ("F1", "Frontal coronal outer left midline"),
        ("F2", "Frontal coronal left midline"),
        ("F3", "Frontal coronal right midline"),
        ("F4", "Frontal coronal outer right midline"),
        ("F5", "Frontal lateral level 3"),
        ("F6", "Frontal lateral level 3"),
        ("F7", "Frontal left near temple"),
        ("F8", "Frontal right near temple"),
    ])
});

/// Swappable lookup from raw electrode code (e.g. "Fz") to a human-readable
/// description. Codes without an entry fall back to the raw code verbatim.
#[derive(Clone, Debug)]
pub struct NameTable {
    entries: HashMap<String, String>,
}

impl NameTable {
    /// Empty table: every electrode keeps its raw code.
    pub fn empty() -> Self {
        NameTable {
            entries: HashMap::new(),
        }
    }

    /// Parse `key=value` lines, the format montage description files ship
    /// in. Blank lines and `#` comments are skipped.
    pub fn from_properties(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                entries.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
        NameTable { entries }
    }

    pub fn describe(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for NameTable {
    /// Built-in 10-20 placement descriptions for the synthetic montage.
    fn default() -> Self {
        NameTable {
            entries: DEFAULT_DESCRIPTIONS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}
