use crate::domain::{ProfileBatch, ProfileResult};
use std::path::PathBuf;

/// Destination for the profiles built from one alignment run.
pub trait ProfileStore {
    /// Persists `batch` as one artifact and returns where it was written.
    fn persist(&self, batch: &ProfileBatch) -> ProfileResult<PathBuf>;
}

impl<T> ProfileStore for &T
where
    T: ProfileStore + ?Sized,
{
    fn persist(&self, batch: &ProfileBatch) -> ProfileResult<PathBuf> {
        (**self).persist(batch)
    }
}
