//! Conversion of data-logger exports.
//!
//! The logger writes one header row (`timestamp,active`) followed by
//! `unix seconds,kilowatts` rows. Disaggregation expects watts, so values are
//! multiplied by 1000 and written as a meter CSV file.

use crate::{format, PowerSample, Value};
use std::{fs::File, io::Read, path::Path};

/// Kilowatts to watts
pub const KILO: Value = 1_000.0;

/// Number of header rows in a logger export
const EXPORT_HEADER_ROWS: usize = 1;

/// Parses a logger export, returning samples in watts.
///
/// # Errors
///
/// Returns [`crate::Error::MalformedInput`] if a timestamp is not an integer or a
/// value is not a number.
pub fn parse_export<R: Read>(reader: R) -> crate::Result<Vec<PowerSample>> {
    format::read_rows(reader, EXPORT_HEADER_ROWS)?
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            Ok(PowerSample::new(
                row.parse_timestamp(idx)?,
                row.parse_value(idx)? * KILO,
            ))
        })
        .collect()
}

/// Converts a logger export into a meter CSV file.
///
/// Returns the number of samples written.
///
/// # Errors
///
/// Returns error if an I/O error occurred, or the export is malformed.
pub fn convert_export<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> crate::Result<usize> {
    let input = input.as_ref();

    let samples = parse_export(File::open(input)?)?;
    log::debug!("parsed {} samples from {input:?}", samples.len());

    format::write_meter_file(output, samples.iter().map(|s| (s.timestamp, s.value)))?;

    Ok(samples.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn parse_export_converts_to_watts() -> crate::Result<()> {
        let export = "timestamp,active\n1640995200,0.5\n1640995201,1.25\n";

        assert_eq!(
            vec![
                PowerSample::new(1_640_995_200, 500.0),
                PowerSample::new(1_640_995_201, 1_250.0),
            ],
            parse_export(export.as_bytes())?,
        );

        Ok(())
    }

    #[test_log::test]
    fn parse_export_malformed() {
        let export = "timestamp,active\n1640995200,0.5\nnoon,1.25\n";

        assert!(matches!(
            parse_export(export.as_bytes()),
            Err(crate::Error::MalformedInput { row: 1, .. })
        ));
    }

    #[test_log::test]
    fn convert_export_file() -> crate::Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("export.csv");
        let output = dir.path().join("meter3.csv");

        std::fs::write(&input, "timestamp,active\n10,0.25\n11,0\n")?;

        assert_eq!(2, convert_export(&input, &output)?);
        assert_eq!(
            ",power\n,apparent\n10,250\n11,0\n",
            std::fs::read_to_string(&output)?
        );

        Ok(())
    }
}
