use super::prelude::*;

impl<K, V> UnrolledList<K, V>
where
    K: IndexKey,
    V: IndexValue,
{
    /// Walks the whole chain and checks links and key order.
    /// Occupancy is checked by every segment read.
    pub(crate) fn validate(&self) -> Result<IndexStats> {
        let header = self.header();
        let mut stats = self.empty_stats();
        header.validate(stats.file_size)?;
        let mut prev_handle = Handle::NULL;
        let mut prev_key: Option<K> = None;
        for item in self.segments() {
            let (handle, segment) = item?;
            if segment.prev != prev_handle {
                let cause = format!(
                    "segment {} points back to {}, expected {}",
                    handle, segment.prev, prev_handle
                );
                return Err(Self::error(ValidationErrorKind::BrokenChain, cause));
            }
            let slab = self.read_entries(segment.slab, 0, segment.len())?;
            let keys = std::iter::once(&segment.key).chain(slab.iter().map(|e| &e.key));
            for key in keys {
                if let Some(prev) = &prev_key {
                    if prev >= key {
                        let cause = format!("{:?} follows {:?} in segment {}", key, prev, handle);
                        return Err(Self::error(ValidationErrorKind::Ordering, cause));
                    }
                }
                prev_key = Some(key.clone());
            }
            stats.segments += 1;
            stats.entries += 1 + slab.len();
            prev_handle = handle;
        }
        if prev_handle != header.last {
            let cause = format!(
                "chain ends at {}, header names {} as last",
                prev_handle, header.last
            );
            return Err(Self::error(ValidationErrorKind::BrokenChain, cause));
        }
        debug!(
            "index {:?} valid: {} segments, {} entries",
            self.path(),
            stats.segments,
            stats.entries
        );
        Ok(stats)
    }

    fn error(kind: ValidationErrorKind, cause: String) -> anyhow::Error {
        Error::validation(kind, cause).into()
    }
}
