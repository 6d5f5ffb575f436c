use regex::Regex;
use std::sync::OnceLock;

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();

    #[allow(clippy::expect_used)]
    PATTERN.get_or_init(|| {
        Regex::new(r"^/building([1-9][0-9]*)/elec/meter([1-9][0-9]*)$").expect("pattern is valid")
    })
}

/// Identifies a meter, e.g. `/building1/elec/meter3`.
///
/// Meter 1 of a building is its mains meter by convention.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash, Debug)]
pub struct MeterKey {
    building: u32,
    meter: u32,
}

impl MeterKey {
    /// Creates a meter key, returning `None` if either number is zero.
    #[must_use]
    pub fn new(building: u32, meter: u32) -> Option<Self> {
        if building == 0 || meter == 0 {
            None
        } else {
            Some(Self { building, meter })
        }
    }

    /// Building number
    #[must_use]
    pub fn building(&self) -> u32 {
        self.building
    }

    /// Meter number inside the building
    #[must_use]
    pub fn meter(&self) -> u32 {
        self.meter
    }

    /// Returns `true` if this is the mains meter (meter 1).
    #[must_use]
    pub fn is_mains(&self) -> bool {
        self.meter == 1
    }

    /// Path of the meter CSV file relative to a dataset root.
    #[must_use]
    pub fn relative_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&format!("building{}", self.building))
            .join("elec")
            .join(format!("meter{}.csv", self.meter))
    }
}

impl std::fmt::Display for MeterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/building{}/elec/meter{}", self.building, self.meter)
    }
}

impl TryFrom<&str> for MeterKey {
    type Error = crate::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let invalid = || crate::Error::InvalidConfiguration(format!("invalid meter key {value:?}"));

        let captures = key_pattern().captures(value).ok_or_else(invalid)?;

        let building = captures
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(invalid)?;
        let meter = captures
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .ok_or_else(invalid)?;

        Ok(Self { building, meter })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test_log::test]
    fn meter_key_parse() {
        let key = MeterKey::try_from("/building1/elec/meter12").unwrap();
        assert_eq!(1, key.building());
        assert_eq!(12, key.meter());
        assert!(!key.is_mains());
        assert_eq!("/building1/elec/meter12", key.to_string());
    }

    #[test_log::test]
    fn meter_key_invalid() {
        for s in [
            "",
            "building1/elec/meter1",
            "/building0/elec/meter1",
            "/building1/elec/meter",
            "/building1/gas/meter1",
            "/building1/elec/meter1/",
        ] {
            assert!(
                matches!(
                    MeterKey::try_from(s),
                    Err(crate::Error::InvalidConfiguration(_))
                ),
                "{s:?} should be rejected"
            );
        }
    }

    #[test_log::test]
    fn meter_key_relative_path() {
        let key = MeterKey::new(2, 1).unwrap();
        assert!(key.is_mains());
        assert_eq!(
            std::path::Path::new("building2/elec/meter1.csv"),
            key.relative_path()
        );
    }

    #[test_log::test]
    fn meter_key_rejects_zero() {
        assert!(MeterKey::new(0, 1).is_none());
        assert!(MeterKey::new(1, 0).is_none());
    }
}
