use crate::{format, Error, RawRow, Value};
use std::path::Path;

/// A row of a synthesized mains trace
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateRow {
    /// Timestamp text, copied from the first trace
    pub timestamp: String,

    /// Sum of all traces at this row
    pub value: Value,
}

/// Result of an aggregation
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Aggregated {
    /// One row per data row of the first trace
    pub rows: Vec<AggregateRow>,

    /// Number of cells that were not a number, and counted as zero
    pub malformed_cells: usize,
}

/// Sums several meter traces, row by row, into a synthetic mains trace.
///
/// Traces are aligned by row position only: the N-th data row of every trace is
/// assumed to be the same instant. The first trace is the reference; its length
/// determines the output length and its timestamps are copied verbatim.
///
/// Values that are not numbers count as zero. They are logged and counted, see
/// [`Aggregated::malformed_cells`].
#[derive(Clone, Debug, Default)]
pub struct Aggregator;

impl Aggregator {
    /// Creates an aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Sums the data rows of all traces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if no trace is given, and
    /// [`Error::TraceLengthMismatch`] if any trace is shorter than the first one.
    pub fn aggregate<T: AsRef<[RawRow]>>(&self, traces: &[T]) -> crate::Result<Aggregated> {
        let Some(reference) = traces.first() else {
            return Err(Error::InvalidConfiguration(
                "at least one trace is required for aggregation".into(),
            ));
        };
        let reference = reference.as_ref();
        let expected = reference.len();

        for (idx, trace) in traces.iter().enumerate() {
            let actual = trace.as_ref().len();

            if actual < expected {
                return Err(Error::TraceLengthMismatch {
                    trace: idx,
                    expected,
                    actual,
                });
            }

            if actual > expected {
                log::debug!("trace {idx} has {actual} rows, ignoring rows after {expected}");
            }
        }

        let mut sums: Vec<Value> = vec![0.0; expected];
        let mut malformed_cells = 0;

        for (trace_idx, trace) in traces.iter().enumerate() {
            for (row_idx, (sum, row)) in sums.iter_mut().zip(trace.as_ref()).enumerate() {
                if let Some(value) = row.try_value() {
                    *sum += value;
                } else {
                    log::debug!(
                        "trace {trace_idx}, row {row_idx}: {:?} is not a number, counting as 0",
                        row.value
                    );
                    malformed_cells += 1;
                }
            }
        }

        if malformed_cells > 0 {
            log::warn!("{malformed_cells} non-numeric cells were counted as 0");
        }

        let rows = reference
            .iter()
            .zip(sums)
            .map(|(row, value)| AggregateRow {
                timestamp: row.index.clone(),
                value,
            })
            .collect();

        Ok(Aggregated {
            rows,
            malformed_cells,
        })
    }

    /// Sums meter CSV files into a new meter CSV file.
    ///
    /// All inputs are read and checked before the output file is created.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred, or see [`Aggregator::aggregate`].
    pub fn aggregate_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        inputs: &[P],
        output: Q,
    ) -> crate::Result<Aggregated> {
        let traces = inputs
            .iter()
            .map(format::read_meter_file)
            .collect::<crate::Result<Vec<_>>>()?;

        let aggregated = self.aggregate(&traces)?;

        format::write_meter_file(
            output,
            aggregated
                .rows
                .iter()
                .map(|row| (row.timestamp.as_str(), row.value)),
        )?;

        Ok(aggregated)
    }
}
