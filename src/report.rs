use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::BciError;
use crate::matrix::SampleMatrix;

/// Writes the acquired matrix as CSV: one column per channel, headed by its
/// resolved label, with the sample index in the first column.
pub fn write_csv<W: Write>(
    mut out: W,
    labels: &[String],
    matrix: &SampleMatrix,
) -> Result<(), BciError> {
    if labels.len() != matrix.num_rows() {
        return Err(BciError::BufferMismatch {
            expected: matrix.num_rows(),
            actual: labels.len(),
        });
    }
    write!(out, "sample")?;
    for label in labels {
        write!(out, ",{}", escape(label))?;
    }
    writeln!(out)?;
    for i in 0..matrix.sample_count() {
        write!(out, "{i}")?;
        for row in 0..matrix.num_rows() {
            write!(out, ",{:.6}", matrix.row(row)[i])?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_csv_file(
    path: impl AsRef<Path>,
    labels: &[String],
    matrix: &SampleMatrix,
) -> Result<(), BciError> {
    let file = File::create(path)?;
    write_csv(BufWriter::new(file), labels, matrix)
}

// Labels contain spaces and slashes but may also carry commas from a
// user-supplied name table, so quote per RFC 4180 when needed.
fn escape(label: &str) -> String {
    if label.contains(',') || label.contains('"') || label.contains('\n') {
        format!("\"{}\"", label.replace('"', "\"\""))
    } else {
        label.to_string()
    }
}
