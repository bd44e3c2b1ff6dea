use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::error::Result;

/// Exclusive advisory lock over the store document, held for the duration of
/// one read-modify-write session and released on drop.
///
/// Acquisition blocks until the current holder releases; contending callers
/// wait rather than fail. The lock file lives beside the document and is
/// never deleted, only locked.
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
