//! Power trace preparation for non-intrusive load monitoring (NILM).
//!
//! Disaggregation engines are trained on a household's aggregate ("mains") power signal
//! together with per-appliance submeter traces. This crate prepares those traces:
//!
//! - [`Resampler`] downsamples a raw trace by averaging fixed-size, non-overlapping buckets
//! - [`Aggregator`] sums several submeter traces, row by row, into a synthetic mains trace
//! - [`recorder`] converts kilowatt data-logger exports into meter CSV files (in watts)
//! - [`Store`] is an embedded on-disk time series store for meter traces, using
//!   <https://github.com/fjall-rs/fjall> as its storage engine
//! - [`Pipeline`] runs the above over a whole dataset directory
//!
//! Meter CSV files have two header rows (`,power` and `,apparent`) followed by
//! `timestamp,value` data rows.
//!
//! Data points are f32s by default, but can be switched to f64 using the `high_precision` feature flag.
//!
//! ```
//! use nilm_prep::{Aggregator, RawRow, Resampler};
//!
//! let raw = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(idx, v)| RawRow::new(idx.to_string(), v.to_string()))
//!     .collect::<Vec<_>>();
//!
//! let resampler = Resampler::builder()
//!     .scale(3)
//!     .start(1_640_995_200)
//!     .padding(nilm_prep::Padding::None)
//!     .build()?;
//!
//! let samples = resampler.resample(&raw)?;
//! assert_eq!(2, samples.len());
//! assert_eq!(4.0, samples[0].value);
//! assert_eq!(10.0, samples[1].value);
//!
//! let mains = Aggregator::new().aggregate(&[raw.clone(), raw])?;
//! assert_eq!(24.0, mains.rows[5].value);
//! assert_eq!(0, mains.malformed_cells);
//!
//! # Ok::<(), nilm_prep::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod aggregate;
mod error;
pub mod format;
mod meter;
mod pipeline;
pub mod recorder;
mod resample;
mod sample;
mod store;
mod time;

type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

pub use aggregate::{AggregateRow, Aggregated, Aggregator};
pub use error::{Error, Result};
pub use meter::MeterKey;
pub use pipeline::{Pipeline, PipelineBuilder, Report, WrittenMeter};
pub use resample::{Padding, Resampler, ResamplerBuilder};
pub use sample::{PowerSample, RawRow};
pub use store::{Builder as StoreBuilder, MeterInfo, Store};
pub use time::{timestamp, DEFAULT_START};

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// Power value (in watts, unless stated otherwise)
#[cfg(feature = "high_precision")]
pub type Value = f64;

/// Power value (in watts, unless stated otherwise)
#[cfg(not(feature = "high_precision"))]
pub type Value = f32;
