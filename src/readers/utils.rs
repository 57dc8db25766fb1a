use std::path::{Path, PathBuf};

use super::types::{FileType, ReadError};

pub fn reader_from_filetype(path: &Path) -> Result<FileType, ReadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("tif") | Some("tiff") => Ok(FileType::GeoTiff),
        Some("jp2") => Ok(FileType::Jpeg2000),
        _ => Err(ReadError::UnknownFileType(path.display().to_string())),
    }
}

/// A literal path, or the first match (in sorted order) of a glob pattern.
pub fn resolve_path(pattern: &str) -> Result<PathBuf, ReadError> {
    let literal = Path::new(pattern);
    if literal.exists() {
        return Ok(literal.to_path_buf());
    }

    let paths = glob::glob(pattern).map_err(|e| ReadError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut matches: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
    matches.sort();

    if matches.len() > 1 {
        log::warn!(
            "{} files match {}, using {}",
            matches.len(),
            pattern,
            matches[0].display()
        );
    }

    matches
        .into_iter()
        .next()
        .ok_or_else(|| ReadError::NoMatch(pattern.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_file_types() {
        assert_eq!(
            reader_from_filetype(Path::new("T17TNH_B03_10m.TIF")).unwrap(),
            FileType::GeoTiff
        );
        assert_eq!(
            reader_from_filetype(Path::new("T17TNH_B04_10m.jp2")).unwrap(),
            FileType::Jpeg2000
        );
        assert!(matches!(
            reader_from_filetype(Path::new("scene.nc")),
            Err(ReadError::UnknownFileType(_))
        ));
    }

    #[test]
    fn test_resolve_glob_pattern() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("T17TNH_20240610_B03_10m.tif")).unwrap();
        File::create(dir.path().join("T17TNH_20240610_B04_10m.tif")).unwrap();

        let pattern = format!("{}/*_B04_10m.tif", dir.path().display());
        let path = resolve_path(&pattern).unwrap();
        assert!(path.ends_with("T17TNH_20240610_B04_10m.tif"));

        let literal = dir.path().join("T17TNH_20240610_B03_10m.tif");
        assert_eq!(resolve_path(literal.to_str().unwrap()).unwrap(), literal);

        let missing = format!("{}/*_B02_10m.tif", dir.path().display());
        assert!(matches!(resolve_path(&missing), Err(ReadError::NoMatch(_))));
    }
}
