mod builder;
mod meters;

use crate::{format, timestamp, MeterKey, PowerSample, Timestamp, Value};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use fjall::{CompressionType, PartitionCreateOptions, PersistMode, TxKeyspace, TxPartition};
use meters::Meters;
use rustc_hash::FxHashSet;
use std::path::Path;

pub use builder::Builder;
pub use meters::MeterInfo;

const SAMPLES_PARTITION_NAME: &str = "_nilm#v1#samples";

/// Flips the sign bit so that big-endian keys sort like signed timestamps
const SIGN_BIT: u64 = 1 << 63;

/// Embedded time series store for meter traces
///
/// Samples are keyed by meter and timestamp, so a meter's trace is read back in
/// time order. Each meter also carries a label (e.g. `fridge`).
///
/// ```
/// # let dir = tempfile::tempdir()?;
/// use nilm_prep::{MeterKey, PowerSample, Store};
///
/// let store = Store::builder().open(dir.path())?;
/// let meter = MeterKey::try_from("/building1/elec/meter2")?;
///
/// store.write_trace(
///     meter,
///     "kettle",
///     &[PowerSample::new(1_640_995_200, 2_000.0)],
/// )?;
///
/// assert_eq!(1, store.read_trace(meter)?.len());
/// #
/// # Ok::<(), nilm_prep::Error>(())
/// ```
pub struct Store {
    keyspace: TxKeyspace,
    samples: TxPartition,
    meters: Meters,
}

impl Store {
    /// Returns a builder to configure and open a meter store.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub(crate) fn from_keyspace(keyspace: TxKeyspace) -> crate::Result<Self> {
        let opts = PartitionCreateOptions::default()
            .block_size(64_000)
            .compression(CompressionType::Lz4);

        let samples = keyspace.open_partition(SAMPLES_PARTITION_NAME, opts)?;
        let meters = Meters::new(&keyspace)?;

        Ok(Self {
            keyspace,
            samples,
            meters,
        })
    }

    fn prefix(meter: MeterKey) -> String {
        format!("{meter}#")
    }

    #[allow(clippy::cast_sign_loss)]
    fn sample_key(prefix: &str, ts: Timestamp) -> crate::Result<Vec<u8>> {
        let mut key = Vec::with_capacity(prefix.len() + std::mem::size_of::<u64>());
        key.extend_from_slice(prefix.as_bytes());
        key.write_u64::<BigEndian>((ts as u64) ^ SIGN_BIT)?;
        Ok(key)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn decode_sample(prefix: &str, key: &[u8], mut value: &[u8]) -> crate::Result<PowerSample> {
        let mut ts_bytes = key.get(prefix.len()..).unwrap_or_default();
        let ts = (ts_bytes.read_u64::<BigEndian>()? ^ SIGN_BIT) as Timestamp;

        #[cfg(feature = "high_precision")]
        let value: Value = value.read_f64::<BigEndian>()?;

        #[cfg(not(feature = "high_precision"))]
        let value: Value = value.read_f32::<BigEndian>()?;

        Ok(PowerSample::new(ts, value))
    }

    /// Stores the trace of a meter, replacing any previously stored samples.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred, or [`crate::Error::MalformedInput`]
    /// if two samples share a timestamp. Nothing is written in that case.
    pub fn write_trace(
        &self,
        meter: MeterKey,
        label: &str,
        samples: &[PowerSample],
    ) -> crate::Result<()> {
        let mut seen = FxHashSet::default();
        seen.reserve(samples.len());

        for (idx, sample) in samples.iter().enumerate() {
            if !seen.insert(sample.timestamp) {
                log::warn!(
                    "{meter}: sample {idx} repeats timestamp {}, refusing to store trace",
                    sample.timestamp
                );
                return Err(crate::Error::MalformedInput {
                    row: idx,
                    value: sample.timestamp.to_string(),
                });
            }
        }

        let prefix = Self::prefix(meter);
        let mut tx = self.keyspace.write_tx();

        let stale = tx
            .prefix(&self.samples, &prefix)
            .map(|kv| kv.map(|(k, _)| k))
            .collect::<fjall::Result<Vec<_>>>()?;

        if !stale.is_empty() {
            log::debug!("replacing {} stored samples of {meter}", stale.len());
        }

        for key in stale {
            tx.remove(&self.samples, key);
        }

        for sample in samples {
            tx.insert(
                &self.samples,
                Self::sample_key(&prefix, sample.timestamp)?,
                sample.value.to_be_bytes(),
            );
        }

        let info = MeterInfo {
            label: label.to_owned(),
            imported_at: timestamp(),
            len: samples.len() as u64,
        };
        self.meters.insert(&mut tx, meter, &info)?;

        tx.commit()?;

        log::debug!("stored {} samples for {meter} ({label})", samples.len());

        Ok(())
    }

    /// Reads the trace of a meter, ordered by timestamp.
    ///
    /// Returns an empty trace if the meter is unknown.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn read_trace(&self, meter: MeterKey) -> crate::Result<Vec<PowerSample>> {
        let prefix = Self::prefix(meter);
        let read_tx = self.keyspace.read_tx();

        read_tx
            .prefix(&self.samples, &prefix)
            .map(|kv| {
                let (k, v) = kv?;
                Self::decode_sample(&prefix, &k, &v)
            })
            .collect()
    }

    /// Returns the metadata of a meter.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn meter(&self, meter: MeterKey) -> crate::Result<Option<MeterInfo>> {
        self.meters.get(meter)
    }

    /// Lists all stored meters.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn meters(&self) -> crate::Result<crate::HashMap<MeterKey, MeterInfo>> {
        self.meters.list_all(&self.keyspace)
    }

    /// Reads a meter CSV file and stores it.
    ///
    /// The first field of each data row must be a Unix timestamp in seconds.
    ///
    /// Returns the number of samples stored.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred, or the file is malformed.
    pub fn import_csv<P: AsRef<Path>>(
        &self,
        meter: MeterKey,
        label: &str,
        path: P,
    ) -> crate::Result<usize> {
        let samples = format::read_meter_file(path)?
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                Ok(PowerSample::new(
                    row.parse_timestamp(idx)?,
                    row.parse_value(idx)?,
                ))
            })
            .collect::<crate::Result<Vec<_>>>()?;

        self.write_trace(meter, label, &samples)?;

        Ok(samples.len())
    }

    /// Flushes all writes to disk.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn persist(&self) -> crate::Result<()> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}
