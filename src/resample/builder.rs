use super::{Padding, Resampler};
use crate::{Error, Timestamp, Value, DEFAULT_START};

/// Builder for [`Resampler`].
#[derive(Clone, Debug)]
pub struct Builder {
    scale: i64,
    start: Timestamp,
    unit_factor: Value,
    padding: Padding,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self {
            scale: 1,
            start: DEFAULT_START,
            unit_factor: 1.0,
            padding: Padding::default(),
        }
    }

    /// Sets the number of raw samples averaged into one output sample.
    ///
    /// Must be at least 1.
    ///
    /// Default = 1
    #[must_use]
    pub fn scale(mut self, scale: i64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the timestamp (Unix seconds) of the first raw row.
    ///
    /// Default = 2022-01-01T00:00:00Z
    #[must_use]
    pub fn start(mut self, ts: Timestamp) -> Self {
        self.start = ts;
        self
    }

    /// Sets a factor every averaged value is multiplied with.
    ///
    /// Use `1000.0` to convert kilowatt sources to watts.
    ///
    /// Default = 1.0
    #[must_use]
    pub fn unit_factor(mut self, factor: Value) -> Self {
        self.unit_factor = factor;
        self
    }

    /// Sets how the output is padded with zero samples.
    ///
    /// Default = [`Padding::RawLength`]
    #[must_use]
    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the scale is not positive,
    /// or the unit factor is not finite.
    pub fn build(self) -> crate::Result<Resampler> {
        let scale = usize::try_from(self.scale)
            .ok()
            .filter(|&s| s > 0)
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "bucket scale must be positive, got {}",
                    self.scale
                ))
            })?;

        if !self.unit_factor.is_finite() {
            return Err(Error::InvalidConfiguration(format!(
                "unit factor must be finite, got {}",
                self.unit_factor
            )));
        }

        Ok(Resampler {
            scale,
            start: self.start,
            unit_factor: self.unit_factor,
            padding: self.padding,
        })
    }
}
