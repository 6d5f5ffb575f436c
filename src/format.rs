//! Reading and writing meter CSV files.
//!
//! A meter CSV file starts with two header rows:
//!
//! ```text
//! ,power
//! ,apparent
//! ```
//!
//! followed by `timestamp,value` data rows.

use crate::{RawRow, Value};
use std::{
    fmt::Display,
    fs::File,
    io::{Read, Write},
    path::Path,
};

/// Header rows of a meter CSV file
pub const HEADER: [[&str; 2]; 2] = [["", "power"], ["", "apparent"]];

/// Number of header rows in a meter CSV file
pub const HEADER_ROWS: usize = HEADER.len();

/// Stands in for a blank line, so it is read as a row with two empty fields
const BLANK_RECORD: &[u8] = b",";

fn is_blank(line: &[u8]) -> bool {
    line.is_empty() || line == b"\r"
}

/// Replaces blank lines with [`BLANK_RECORD`], dropping trailing blank lines.
///
/// The CSV reader silently skips empty lines, which would shift every later
/// row of a trace against the other traces.
fn fill_blank_lines(input: &[u8]) -> Vec<u8> {
    let mut lines = input.split(|&b| b == b'\n').collect::<Vec<_>>();

    while lines.last().is_some_and(|line| is_blank(line)) {
        lines.pop();
    }

    let mut filled = Vec::with_capacity(input.len() + lines.len());

    for line in lines {
        if is_blank(line) {
            filled.extend_from_slice(BLANK_RECORD);
        } else {
            filled.extend_from_slice(line);
        }
        filled.push(b'\n');
    }

    filled
}

/// Reads all rows after the first `skip` records.
///
/// Records may have any number of fields; missing fields are read as empty text.
/// Blank lines between records are kept as rows with empty fields, so row
/// positions match line positions. Trailing blank lines are ignored.
///
/// # Errors
///
/// Returns error if the input is not valid CSV or an I/O error occurred.
pub fn read_rows<R: Read>(mut reader: R, skip: usize) -> crate::Result<Vec<RawRow>> {
    let mut input = vec![];
    reader.read_to_end(&mut input)?;
    let input = fill_blank_lines(&input);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_slice());

    let mut rows = vec![];

    for record in reader.records().skip(skip) {
        let record = record?;

        rows.push(RawRow::new(
            record.get(0).unwrap_or_default(),
            record.get(1).unwrap_or_default(),
        ));
    }

    Ok(rows)
}

/// Reads the data rows of a meter CSV file.
///
/// # Errors
///
/// Returns error if the file cannot be opened, or is not valid CSV.
pub fn read_meter_file<P: AsRef<Path>>(path: P) -> crate::Result<Vec<RawRow>> {
    let path = path.as_ref();
    log::trace!("reading meter file {path:?}");

    let rows = read_rows(File::open(path)?, HEADER_ROWS)?;
    log::debug!("read {} data rows from {path:?}", rows.len());

    Ok(rows)
}

/// Writes the header rows followed by one row per `(timestamp, value)` pair.
///
/// # Errors
///
/// Returns error if an I/O error occurred.
pub fn write_rows<W, T, I>(writer: W, rows: I) -> crate::Result<()>
where
    W: Write,
    T: Display,
    I: IntoIterator<Item = (T, Value)>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for header in HEADER {
        writer.write_record(header)?;
    }

    for (ts, value) in rows {
        writer.write_record([ts.to_string(), value.to_string()])?;
    }

    writer.flush()?;

    Ok(())
}

/// Writes a meter CSV file, creating missing parent directories.
///
/// # Errors
///
/// Returns error if an I/O error occurred.
pub fn write_meter_file<P, T, I>(path: P, rows: I) -> crate::Result<()>
where
    P: AsRef<Path>,
    T: Display,
    I: IntoIterator<Item = (T, Value)>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    log::trace!("writing meter file {path:?}");
    write_rows(File::create(path)?, rows)
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test_log::test]
    fn write_meter_csv() -> crate::Result<()> {
        let mut buf = vec![];
        write_rows(&mut buf, [(1_640_995_200, 1.5), (1_640_995_201, 0.0)])?;

        assert_eq!(
            ",power\n,apparent\n1640995200,1.5\n1640995201,0\n",
            String::from_utf8_lossy(&buf),
        );

        Ok(())
    }

    #[test_log::test]
    fn read_skips_header_rows() -> crate::Result<()> {
        let input = ",power\n,apparent\n0,1.5\n1,abc\n2\n";
        let rows = read_rows(input.as_bytes(), HEADER_ROWS)?;

        assert_eq!(3, rows.len());
        assert_eq!(RawRow::new("0", "1.5"), rows[0]);
        assert_eq!(RawRow::new("1", "abc"), rows[1]);
        assert_eq!(RawRow::new("2", ""), rows[2]);

        Ok(())
    }

    #[test_log::test]
    fn read_keeps_blank_lines() -> crate::Result<()> {
        let input = ",power\n,apparent\n0,10\n\n2,30\r\n\r\n4,50\n\n\n";
        let rows = read_rows(input.as_bytes(), HEADER_ROWS)?;

        assert_eq!(
            vec![
                RawRow::new("0", "10"),
                RawRow::default(),
                RawRow::new("2", "30"),
                RawRow::default(),
                RawRow::new("4", "50"),
            ],
            rows
        );

        Ok(())
    }

    #[test_log::test]
    fn meter_file_round_trip() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("building1").join("elec").join("meter2.csv");

        write_meter_file(&path, [("10", 3.0), ("11", 4.5)])?;
        let rows = read_meter_file(&path)?;

        assert_eq!(
            vec![RawRow::new("10", "3"), RawRow::new("11", "4.5")],
            rows
        );

        Ok(())
    }
}
