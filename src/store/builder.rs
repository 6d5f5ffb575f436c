use super::Store;
use std::path::Path;

/// Builder for [`Store`].
pub struct Builder {
    cache_size_mib: u64,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self { cache_size_mib: 16 }
    }

    /// Sets the cache size in MiB.
    ///
    /// Default = 16 MiB
    #[must_use]
    pub fn cache_size_mib(mut self, mib: u64) -> Self {
        self.cache_size_mib = mib;
        self
    }

    /// Opens or recovers a meter store.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn open<P: AsRef<Path>>(self, path: P) -> crate::Result<Store> {
        log::debug!("opening meter store at {:?}", path.as_ref());

        let keyspace = fjall::Config::new(path)
            .cache_size(self.cache_size_mib * 1_024 * 1_024)
            .open_transactional()?;

        Store::from_keyspace(keyspace)
    }
}
