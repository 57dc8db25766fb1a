use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use super::WriteError;

pub fn write_json<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), WriteError> {
    let path = path.as_ref();
    let io_error = |source| WriteError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(io_error)?;

    log::info!("Wrote {}", path.display());
    Ok(())
}
