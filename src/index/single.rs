use super::prelude::*;

/// Sorted map from `K` to `V` kept entirely in one file.
///
/// Every call goes to disk, nothing but the 16-byte header is cached. Keys and
/// values must serialize to a fixed size, see [`IndexKey`].
///
/// # Examples
/// ```no_run
/// use folio::OrderedIndex;
///
/// # fn main() -> anyhow::Result<()> {
/// let mut index = OrderedIndex::<u64, u32>::open("/tmp/folio/numbers.idx")?;
/// index.insert(42, 7)?;
/// assert_eq!(index.get(&42)?, Some(7));
/// assert!(index.erase(&42)?);
/// index.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct OrderedIndex<K, V>
where
    K: IndexKey,
    V: IndexValue,
{
    list: UnrolledList<K, V>,
}

impl<K, V> OrderedIndex<K, V>
where
    K: IndexKey,
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

    /// Inserts an entry. The key must not be present yet, check with
    /// [`OrderedIndex::get`] first: a duplicate breaks the ordering and is only
    /// detected by [`OrderedIndex::verify`].
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        self.list.insert(key, value)
    }

    /// Removes `key`. Returns `false` and changes nothing if it is absent.
    pub fn erase(&mut self, key: &K) -> Result<bool> {
        self.list.erase(key)
    }

    /// Replaces the value of `key`. Returns `false` and changes nothing if it is absent.
    pub fn modify(&mut self, key: &K, value: V) -> Result<bool> {
        self.list.modify(key, value)
    }

    /// Returns a copy of the value stored for `key`.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        self.list.get(key)
    }

    /// `true` if `key` is present.
    pub fn contains(&self, key: &K) -> Result<bool> {
        self.list.get(key).map(|value| value.is_some())
    }

    /// All values in ascending key order.
    pub fn traverse(&self) -> Result<Vec<V>> {
        self.list.values()
    }

    /// All entries in ascending key order.
    pub fn entries(&self) -> Result<Vec<(K, V)>> {
        self.list.entries()
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
    /// # Errors
    /// [`ErrorKind::Validation`] naming the first inconsistency found.
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn index(dir: &TempDir, node_size: u32) -> OrderedIndex<u64, u64> {
        let mut config = IndexConfig::default();
        config.set_node_size(node_size);
        OrderedIndex::from_config(&dir.path().join("single.idx"), &config).unwrap()
    }

    #[test]
    fn get_after_insert() {
        let dir = TempDir::new().unwrap();
        let mut index = index(&dir, 2);
        for key in [9, 3, 7, 1, 5] {
            index.insert(key, key * key).unwrap();
        }
        for key in [1, 3, 5, 7, 9] {
            assert_eq!(index.get(&key).unwrap(), Some(key * key));
        }
        assert!(!index.contains(&4).unwrap());
        assert_eq!(index.len().unwrap(), 5);
        assert_eq!(index.traverse().unwrap(), vec![1, 9, 25, 49, 81]);
    }

    #[test]
    fn modify_then_get() {
        let dir = TempDir::new().unwrap();
        let mut index = index(&dir, 4);
        index.insert(10, 1).unwrap();
        assert!(index.modify(&10, 2).unwrap());
        assert_eq!(index.get(&10).unwrap(), Some(2));
        assert!(!index.modify(&11, 3).unwrap());
        assert_eq!(index.entries().unwrap(), vec![(10, 2)]);
    }

    #[test]
    fn erase_absent_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let mut index = index(&dir, 2);
        for key in 0..10 {
            index.insert(key, key).unwrap();
        }
        let before = index.traverse().unwrap();
        assert!(!index.erase(&100).unwrap());
        assert_eq!(index.traverse().unwrap(), before);
        assert!(index.erase(&5).unwrap());
        assert_eq!(index.get(&5).unwrap(), None);
    }

    #[test]
    fn close_then_reopen() {
        let dir = TempDir::new().unwrap();
        let mut index = index(&dir, 3);
        for key in (0..40).rev() {
            index.insert(key, key + 1000).unwrap();
        }
        let expected = index.traverse().unwrap();
        index.close().unwrap();
        let index = OrderedIndex::<u64, u64>::open(dir.path().join("single.idx")).unwrap();
        assert_eq!(index.traverse().unwrap(), expected);
        assert_eq!(index.verify().unwrap().entries, 40);
    }
}
