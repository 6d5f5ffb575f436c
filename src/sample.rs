use crate::{Error, Timestamp, Value};

/// A single power reading
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PowerSample {
    /// Unix timestamp in seconds
    pub timestamp: Timestamp,

    /// Power in watts
    pub value: Value,
}

impl PowerSample {
    /// Creates a power sample.
    #[must_use]
    pub fn new(timestamp: Timestamp, value: Value) -> Self {
        Self { timestamp, value }
    }
}

/// A data row of a meter CSV file, as text.
///
/// The first field is either a timestamp or a plain row index, depending on the source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRow {
    /// Index or timestamp field
    pub index: String,

    /// Power field
    pub value: String,
}

impl RawRow {
    /// Creates a raw row.
    pub fn new<I: Into<String>, V: Into<String>>(index: I, value: V) -> Self {
        Self {
            index: index.into(),
            value: value.into(),
        }
    }

    /// Parses the power field.
    ///
    /// `row` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the field is not a number.
    pub fn parse_value(&self, row: usize) -> crate::Result<Value> {
        self.try_value().ok_or_else(|| Error::MalformedInput {
            row,
            value: self.value.clone(),
        })
    }

    /// Parses the index field as a timestamp.
    ///
    /// `row` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] if the field is not an integer.
    pub fn parse_timestamp(&self, row: usize) -> crate::Result<Timestamp> {
        self.index
            .trim()
            .parse()
            .map_err(|_| Error::MalformedInput {
                row,
                value: self.index.clone(),
            })
    }

    /// Parses the power field, returning `None` if it is not a number.
    #[must_use]
    pub fn try_value(&self) -> Option<Value> {
        self.value.trim().parse().ok()
    }
}
