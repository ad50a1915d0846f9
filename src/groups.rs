use std::collections::BTreeMap;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

use crate::error::BciError;

/// Marker drawn on a rendered series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerStyle {
    None,
    Dot,
    Circle,
    Square,
}

/// One named visualization group: an ordered pattern list plus the display
/// metadata the presentation layer needs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChartGroupSpec {
    pub name: String,
    /// Case-insensitive patterns matched against the full label text, in
    /// list order.
    pub patterns: Vec<String>,
    pub three_dimensional: bool,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub marker: MarkerStyle,
}

impl ChartGroupSpec {
    pub fn new(name: &str, patterns: &[&str]) -> Self {
        ChartGroupSpec {
            name: name.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
            three_dimensional: false,
            x_axis_title: "Sample".to_string(),
            y_axis_title: "Value".to_string(),
            marker: MarkerStyle::Dot,
        }
    }

    /// The group set the stock deployment charts: frontal, central and
    /// occipital electrode clusters plus the gyro rows.
    pub fn defaults() -> Vec<ChartGroupSpec> {
        vec![
            ChartGroupSpec::new("Frontal", &["(?i)^F.*$"]),
            ChartGroupSpec::new("Central", &["(?i)^C.*$"]),
            ChartGroupSpec::new("Occipital", &["(?i)^O.*$", "(?i)^PO.*$", "(?i)^Pz.*$"]),
            {
                let mut gyro = ChartGroupSpec::new("Gyro", &["(?i)^Gyro.*$"]);
                gyro.three_dimensional = true;
                gyro.x_axis_title = "X".to_string();
                gyro.y_axis_title = "Y".to_string();
                gyro
            },
        ]
    }
}

/// Resolve which label indices belong to each named group.
///
/// Per group, patterns are evaluated in list order; each pattern collects
/// every matching index in ascending order. A column matching several
/// patterns of one group is collected once per pattern (duplicates are
/// deliberate — overlapping prefix lists union this way; callers wanting
/// uniqueness post-filter). Matching is case-insensitive and anchored to the
/// whole label, never substring containment.
///
/// The first unparsable pattern aborts the whole resolution with
/// [`BciError::InvalidPattern`], and a repeated group name aborts with
/// [`BciError::DuplicateGroup`]; a malformed spec is a configuration bug,
/// so no partial results are produced.
pub fn resolve_groups(
    labels: &[String],
    groups: &[ChartGroupSpec],
) -> Result<BTreeMap<String, Vec<usize>>, BciError> {
    let mut resolved = BTreeMap::new();
    for group in groups {
        if resolved.contains_key(&group.name) {
            return Err(BciError::DuplicateGroup(group.name.clone()));
        }
        let mut columns = Vec::new();
        for pattern in &group.patterns {
            // Wrap in \A(?:..)\z so the engine itself decides whether any
            // alternative spans the whole label; checking the span of the
            // leftmost-first match instead drops labels whose full match is
            // a later alternation branch.
            let regex = RegexBuilder::new(&format!(r"\A(?:{pattern})\z"))
                .case_insensitive(true)
                .build()
                .map_err(|source| BciError::InvalidPattern {
                    group: group.name.clone(),
                    pattern: pattern.clone(),
                    source,
                })?;
            for (index, label) in labels.iter().enumerate() {
                if regex.is_match(label) {
                    columns.push(index);
                }
            }
        }
        resolved.insert(group.name.clone(), columns);
    }
    Ok(resolved)
}
