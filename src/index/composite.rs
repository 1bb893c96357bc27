use super::prelude::*;

/// Sorted map from `(K1, K2)` to `V` kept entirely in one file.
///
/// Pairs are ordered by `K1` first, so all entries sharing a `K1` form one
/// contiguous run, which [`CompositeIndex::traverse_group`] returns.
#[derive(Debug)]
pub struct CompositeIndex<K1, K2, V>
where
    K1: IndexKey,
    K2: IndexKey,
    V: IndexValue,
{
    list: UnrolledList<(K1, K2), V>,
}

impl<K1, K2, V> CompositeIndex<K1, K2, V>
where
    K1: IndexKey,
    K2: IndexKey,
    V: IndexValue,
{
    /// Opens the index at `path` with [`IndexConfig::default`], creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_config(path.as_ref(), &IndexConfig::default())
    }

    pub(crate) fn from_config(path: &Path, config: &IndexConfig) -> Result<Self> {
        let list = open_list(path, config)?;
        Ok(Self { list })
    }

    /// Inserts an entry, the pair must not be present yet.
    pub fn insert(&mut self, key1: K1, key2: K2, value: V) -> Result<()> {
        self.list.insert((key1, key2), value)
    }

    /// Removes the pair. Returns `false` and changes nothing if it is absent.
    pub fn erase(&mut self, key1: &K1, key2: &K2) -> Result<bool> {
        self.list.erase(&Self::pair(key1, key2))
    }

    /// Replaces the value of the pair. Returns `false` if it is absent.
    pub fn modify(&mut self, key1: &K1, key2: &K2, value: V) -> Result<bool> {
        self.list.modify(&Self::pair(key1, key2), value)
    }

    /// Returns a copy of the value stored for the pair.
    pub fn get(&self, key1: &K1, key2: &K2) -> Result<Option<V>> {
        self.list.get(&Self::pair(key1, key2))
    }

    /// All values ordered by `(K1, K2)`.
    pub fn traverse(&self) -> Result<Vec<V>> {
        self.list.values()
    }

    /// Values of every pair with the given `key1`, ascending by `K2`.
    /// Empty if no pair has it.
    pub fn traverse_group(&self, key1: &K1) -> Result<Vec<V>> {
        let values = self.list.scan_group(|(k1, _)| k1.cmp(key1))?;
        trace!("group {:?}: {} values", key1, values.len());
        Ok(values)
    }

    /// All entries ordered by `(K1, K2)`.
    pub fn entries(&self) -> Result<Vec<(K1, K2, V)>> {
        let entries = self.list.entries()?;
        Ok(entries
            .into_iter()
            .map(|((k1, k2), value)| (k1, k2, value))
            .collect())
    }

    /// Number of entries, walks the whole chain.
    pub fn len(&self) -> Result<usize> {
        Ok(self.list.stats()?.entries)
    }

    /// `true` if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Detaches every entry. File space is not reclaimed.
    pub fn clear(&mut self) -> Result<()> {
        self.list.clear()
    }

    /// Shape of the segment chain.
    pub fn stats(&self) -> Result<IndexStats> {
        self.list.stats()
    }

    /// Checks links, key order and segment occupancy of the whole file.
    pub fn verify(&self) -> Result<IndexStats> {
        self.list.validate()
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        self.list.path()
    }

    /// Makes every write so far durable.
    pub fn flush(&mut self) -> Result<()> {
        self.list.flush()
    }

    /// Flushes and closes the index.
    pub fn close(mut self) -> Result<()> {
        self.list.flush()?;
        info!("index {:?} closed", self.path());
        Ok(())
    }

    fn pair(key1: &K1, key2: &K2) -> (K1, K2) {
        (key1.clone(), key2.clone())
    }
}
