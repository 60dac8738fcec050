use csv::{Terminator, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::error::ExportError;
use crate::types::ExportRow;

pub const CSV_HEADER: [&str; 3] = ["Draw date", "Lotto numbers", "Plus numbers"];

/// Writes the header and every row, in the order given, to `writer`.
pub fn write_rows<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), ExportError> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    // Written by hand so an empty run still gets a header line
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Replaces the file at `path` with the given rows.
pub fn export_rows(rows: &[ExportRow], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;

    write_rows(rows, file)?;
    info!("Saved {} draws to {}", rows.len(), path.display());
    Ok(())
}
