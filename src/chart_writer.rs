use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    error::{ChartId, ScrapeError},
    game::Selection,
    record::Record,
};

/// `<root>/<game>/<mode>`
pub fn selection_dir(output_root: &Path, selection: Selection) -> PathBuf {
    output_root
        .join(selection.game.name())
        .join(selection.mode.name())
}

/// Creates `dir` if needed. Safe to call from several charts at once.
pub fn ensure_directory(dir: &Path) -> std::io::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    Ok(true)
}

/// Truncates `path` and writes the header followed by every record, in order.
/// Returns the number of records written.
pub fn write_chart(
    chart_id: ChartId,
    path: &Path,
    header: &[&str],
    records: &[Record],
) -> Result<usize, ScrapeError> {
    let io_error = |source| ScrapeError::Io {
        chart_id,
        path: path.to_path_buf(),
        source,
    };
    let csv_error = |source| ScrapeError::Csv {
        chart_id,
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        && ensure_directory(parent).map_err(io_error)?
    {
        info!("{} created", parent.display());
    }

    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(header).map_err(csv_error)?;
    for record in records {
        writer.write_record(record.fields()).map_err(csv_error)?;
    }
    writer.flush().map_err(io_error)?;
    Ok(records.len())
}
