mod bucket;
mod builder;

use crate::{format, PowerSample, RawRow, Timestamp, Value};
use bucket::Buckets;
use std::path::Path;

pub use builder::Builder as ResamplerBuilder;

/// How a resampled trace is padded with zero samples.
///
/// Padding samples continue counting raw rows past the end of the input: with
/// `L` raw rows, the padding samples are stamped `start + L`, `start + L + 1`, ...
/// so they always come after the last bucket.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Padding {
    /// Pad until the output has as many samples as the raw input had rows.
    ///
    /// This is what downstream converters of existing datasets expect,
    /// even though it makes the tail of the trace much longer than the data.
    #[default]
    RawLength,

    /// Pad until the output has `ceil(rows / scale)` samples,
    /// i.e. one sample for the discarded partial bucket.
    BucketCount,

    /// Never pad.
    None,
}

/// Downsamples a raw power trace by averaging fixed-size, non-overlapping buckets.
///
/// With `L` raw rows and a scale of `s`, the first `L - (L mod s)` rows are
/// split into `floor(L / s)` buckets of exactly `s` rows. Each bucket becomes one
/// sample holding the arithmetic mean of its rows (times the unit factor), stamped
/// `start + (index of the bucket's last row - s)`. The remaining rows are discarded.
#[derive(Clone, Debug)]
pub struct Resampler {
    pub(crate) scale: usize,
    pub(crate) start: Timestamp,
    pub(crate) unit_factor: Value,
    pub(crate) padding: Padding,
}

impl Resampler {
    /// Returns a builder to configure a resampler.
    #[must_use]
    pub fn builder() -> ResamplerBuilder {
        ResamplerBuilder::new()
    }

    /// Number of raw samples per output sample
    #[must_use]
    pub fn scale(&self) -> usize {
        self.scale
    }

    fn padded_len(&self, raw_len: usize) -> usize {
        match self.padding {
            Padding::RawLength => raw_len,
            Padding::BucketCount => raw_len.div_ceil(self.scale),
            Padding::None => 0,
        }
    }

    /// Resamples the data rows of one meter.
    ///
    /// The index field of the rows is ignored; the row position implies the timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedInput`] if a power value inside a complete
    /// bucket is not a number.
    #[allow(clippy::cast_possible_wrap)]
    pub fn resample(&self, rows: &[RawRow]) -> crate::Result<Vec<PowerSample>> {
        let mut samples = Buckets::new(rows, self.scale, self.start, self.unit_factor)
            .collect::<crate::Result<Vec<_>>>()?;

        let bucket_count = samples.len();
        let target_len = self.padded_len(rows.len());

        let mut ts = self.start + rows.len() as Timestamp;

        while samples.len() < target_len {
            samples.push(PowerSample::new(ts, 0.0));
            ts += 1;
        }

        log::debug!(
            "resampled {} rows into {bucket_count} buckets of {} (+{} padding)",
            rows.len(),
            self.scale,
            samples.len() - bucket_count,
        );

        Ok(samples)
    }

    /// Resamples a meter CSV file into another meter CSV file.
    ///
    /// The output file is only created once the whole input has been resampled.
    ///
    /// Returns the number of samples written.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred, or the input is malformed.
    pub fn resample_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output: Q,
    ) -> crate::Result<usize> {
        let rows = format::read_meter_file(input)?;
        let samples = self.resample(&rows)?;

        format::write_meter_file(
            output,
            samples.iter().map(|sample| (sample.timestamp, sample.value)),
        )?;

        Ok(samples.len())
    }
}
