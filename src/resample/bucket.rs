use crate::{PowerSample, RawRow, Timestamp, Value};

#[derive(Default)]
struct Bucket {
    sum: Value,
    len: usize,
}

/// A streaming bucket averager
///
/// Takes in raw rows, and emits one averaged sample per `scale` rows.
/// Rows that do not fill a complete bucket are never read.
pub struct Buckets<'a> {
    rows: std::iter::Enumerate<std::iter::Take<std::slice::Iter<'a, RawRow>>>,
    bucket: Bucket,
    scale: usize,
    start: Timestamp,
    unit_factor: Value,
}

impl<'a> Buckets<'a> {
    pub fn new(rows: &'a [RawRow], scale: usize, start: Timestamp, unit_factor: Value) -> Self {
        let time_steps = rows.len() - (rows.len() % scale);

        Self {
            rows: rows.iter().take(time_steps).enumerate(),
            bucket: Bucket::default(),
            scale,
            start,
            unit_factor,
        }
    }
}

impl<'a> Iterator for Buckets<'a> {
    type Item = crate::Result<PowerSample>;

    #[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
    fn next(&mut self) -> Option<Self::Item> {
        for (idx, row) in self.rows.by_ref() {
            let value = match row.parse_value(idx) {
                Ok(v) => v,
                Err(e) => return Some(Err(e)),
            };

            self.bucket.len += 1;
            self.bucket.sum += value;

            if self.bucket.len == self.scale {
                // NOTE: Offset is taken from the last row of the bucket, minus the bucket size
                let bucket = std::mem::take(&mut self.bucket);
                let ts = self.start + (idx as Timestamp - self.scale as Timestamp);
                let mean = bucket.sum / self.scale as Value;

                return Some(Ok(PowerSample::new(ts, mean * self.unit_factor)));
            }
        }

        None
    }
}
