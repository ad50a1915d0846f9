use crate::board::{BoardDescriptor, ChannelGroup, NameTable};
use crate::error::BciError;

/// Builds the dense label array for a board: one label per raw data row.
///
/// Pass order, and therefore precedence, is fixed:
/// 1. EEG rows get `"<name>[ - <description>] eeg[/eog][/emg]"`.
/// 2. Each group in [`ChannelGroup::PRECEDENCE`] claims its still-unlabeled
///    rows as `"<Prefix> <n>"`, n counted 1-based within the group list.
///    First writer wins, so a row shared between two groups keeps the label
///    of the earlier group.
/// 3. The four housekeeping singletons overwrite unconditionally.
///
/// Fails with [`BciError::InvalidBoardDescriptor`] when the EEG name list and
/// channel list differ in length, when the EEG channel list repeats a row,
/// or when a row ends up with no label at all.
pub fn build_labels(board: &BoardDescriptor, names: &NameTable) -> Result<Vec<String>, BciError> {
    if board.eeg_channels.len() != board.eeg_names.len() {
        return Err(BciError::InvalidBoardDescriptor(format!(
            "{} EEG channels but {} EEG names",
            board.eeg_channels.len(),
            board.eeg_names.len()
        )));
    }

    let mut labels: Vec<Option<String>> = vec![None; board.num_rows];

    for (&row, raw_name) in board.eeg_channels.iter().zip(&board.eeg_names) {
        check_row(board, row)?;
        // The EEG pass runs first, so a claimed row here can only mean the
        // index list names the same row twice.
        if labels[row].is_some() {
            return Err(BciError::InvalidBoardDescriptor(format!(
                "EEG channel list repeats row {row}"
            )));
        }
        let full_name = match names.describe(raw_name) {
            Some(description) => format!("{raw_name} - {description}"),
            None => raw_name.clone(),
        };
        let mut label = format!("{full_name} eeg");
        if board.eog_channels.contains(&row) {
            label.push_str("/eog");
        }
        if board.emg_channels.contains(&row) {
            label.push_str("/emg");
        }
        labels[row] = Some(label);
    }

    for group in ChannelGroup::PRECEDENCE {
        for (position, &row) in board.group_indices(group).iter().enumerate() {
            check_row(board, row)?;
            if labels[row].is_none() {
                labels[row] = Some(format!("{} {}", group.prefix(), position + 1));
            }
        }
    }

    // Housekeeping rows always win, even over a previously labeled row.
    let singletons = [
        (board.package_num_channel, "Package"),
        (board.timestamp_channel, "Timestamp"),
        (board.marker_channel, "Marker"),
        (board.battery_channel, "Battery"),
    ];
    for (index, label) in singletons {
        if let Some(row) = index {
            check_row(board, row)?;
            labels[row] = Some(label.to_string());
        }
    }

    labels
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            label.ok_or_else(|| {
                BciError::InvalidBoardDescriptor(format!("row {row} is not covered by any channel group"))
            })
        })
        .collect()
}

fn check_row(board: &BoardDescriptor, row: usize) -> Result<(), BciError> {
    if row >= board.num_rows {
        return Err(BciError::InvalidBoardDescriptor(format!(
            "channel index {row} outside 0..{}",
            board.num_rows
        )));
    }
    Ok(())
}
