use crate::{MeterKey, Timestamp};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use fjall::{CompressionType, PartitionCreateOptions, TxKeyspace, TxPartition, WriteTransaction};

const PARTITION_NAME: &str = "_nilm#v1#meters";

/// Metadata of a stored meter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeterInfo {
    /// Appliance label (`mains` for meter 1)
    pub label: String,

    /// When the trace was written (Unix seconds)
    pub imported_at: Timestamp,

    /// Number of stored samples
    pub len: u64,
}

impl MeterInfo {
    fn serialize(&self) -> crate::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(8 + 8 + self.label.len());
        bytes.write_i64::<BigEndian>(self.imported_at)?;
        bytes.write_u64::<BigEndian>(self.len)?;
        bytes.extend_from_slice(self.label.as_bytes());
        Ok(bytes)
    }

    fn deserialize(mut reader: &[u8]) -> crate::Result<Self> {
        let imported_at = reader.read_i64::<BigEndian>()?;
        let len = reader.read_u64::<BigEndian>()?;
        let label = String::from_utf8_lossy(reader).into_owned();

        Ok(Self {
            label,
            imported_at,
            len,
        })
    }
}

/// Maps meter keys to their metadata
pub struct Meters {
    partition: TxPartition,
}

impl Meters {
    pub fn new(keyspace: &TxKeyspace) -> crate::Result<Self> {
        let opts = PartitionCreateOptions::default()
            .block_size(4_096)
            .compression(CompressionType::Lz4)
            .max_memtable_size(4_000_000);

        let partition = keyspace.open_partition(PARTITION_NAME, opts)?;

        Ok(Self { partition })
    }

    pub fn insert(
        &self,
        tx: &mut WriteTransaction,
        meter: MeterKey,
        info: &MeterInfo,
    ) -> crate::Result<()> {
        log::trace!("storing meter info {meter} => {info:?}");
        tx.insert(&self.partition, meter.to_string(), info.serialize()?);
        Ok(())
    }

    pub fn get(&self, meter: MeterKey) -> crate::Result<Option<MeterInfo>> {
        self.partition
            .get(meter.to_string())?
            .map(|bytes| MeterInfo::deserialize(&bytes))
            .transpose()
    }

    pub fn list_all(
        &self,
        keyspace: &TxKeyspace,
    ) -> crate::Result<crate::HashMap<MeterKey, MeterInfo>> {
        let read_tx = keyspace.read_tx();
        let mut map = crate::HashMap::default();

        for kv in read_tx.iter(&self.partition) {
            let (k, v) = kv?;

            let key = std::str::from_utf8(&k).map_err(|_| crate::Error::MalformedInput {
                row: map.len(),
                value: String::from_utf8_lossy(&k).into_owned(),
            })?;

            map.insert(MeterKey::try_from(key)?, MeterInfo::deserialize(&v)?);
        }

        Ok(map)
    }
}
