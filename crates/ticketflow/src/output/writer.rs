//! Atomic CSV output and read-back of stage tables.

use std::fs;
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{PipelineError, Result};
use crate::input::{DataTable, Parser, ParserConfig};

/// Write a table as CSV, replacing `path` only once the whole file is written.
///
/// The data goes to a temporary file in the destination directory which is
/// then renamed over the target. On error the temporary file is removed and
/// any previous file at `path` is left untouched.
pub fn write_table(path: impl AsRef<Path>, table: &DataTable) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PipelineError::io(parent, e))?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file_mut());
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(|e| PipelineError::io(path, e))?;
    }
    tmp.as_file_mut()
        .sync_all()
        .map_err(|e| PipelineError::io(path, e))?;

    tmp.persist(path)
        .map_err(|e| PipelineError::io(path, e.error))?;
    Ok(())
}

/// Write raw bytes atomically, the same way as [`write_table`].
pub fn write_bytes(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PipelineError::io(parent, e))?;
    tmp.write_all(bytes).map_err(|e| PipelineError::io(path, e))?;
    tmp.persist(path)
        .map_err(|e| PipelineError::io(path, e.error))?;
    Ok(())
}

/// Read a table previously written by [`write_table`].
pub fn read_table(path: impl AsRef<Path>) -> Result<DataTable> {
    let path = path.as_ref();
    let parser = Parser::with_config(ParserConfig {
        delimiter: Some(','),
        ..ParserConfig::default()
    });
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (table, _) = parser.parse_file(path, &stem)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataTable {
        DataTable::new(
            vec!["id".into(), "note".into()],
            vec![
                vec!["1".into(), "plain".into()],
                vec!["2".into(), "has, comma".into()],
                vec!["3".into(), String::new()],
            ],
        )
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");

        write_table(&path, &sample()).unwrap();
        let back = read_table(&path).unwrap();

        assert_eq!(back, sample());
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale,content\nx,y\nz,w\n").unwrap();

        let table = DataTable::with_headers(["only"]);
        write_table(&path, &table).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "only\n");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        write_table(dir.path().join("a.csv"), &sample()).unwrap();
        write_bytes(dir.path().join("b.svg"), b"<svg/>").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 2);
    }
}
