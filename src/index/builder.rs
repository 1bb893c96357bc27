use super::prelude::*;

/// `Builder` used for opening an [`OrderedIndex`] or a [`CompositeIndex`].
///
/// # Examples
/// ```no_run
/// use folio::Builder;
///
/// # fn main() -> anyhow::Result<()> {
/// let index = Builder::new()
///     .path("/tmp/folio/books.idx")
///     .node_size(128)
///     .verify_on_open(true)
///     .build::<u64, u32>()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug)]
pub struct Builder {
    path: Option<PathBuf>,
    config: IndexConfig,
}

impl Builder {
    /// Initializes the `Builder` with defaults
    pub fn new() -> Self {
        Default::default()
    }

    /// Opens a single-key index with the given configuration
    /// # Errors
    /// Fails with [`ErrorKind::WrongConfig`] if no path was set, otherwise
    /// with whatever opening the file reports.
    pub fn build<K, V>(self) -> Result<OrderedIndex<K, V>>
    where
        K: IndexKey,
        V: IndexValue,
    {
        let path = self.checked_path()?;
        OrderedIndex::from_config(path, &self.config)
    }

    /// Opens a composite index with the given configuration
    /// # Errors
    /// Same as [`Builder::build`].
    pub fn build_composite<K1, K2, V>(self) -> Result<CompositeIndex<K1, K2, V>>
    where
        K1: IndexKey,
        K2: IndexKey,
        V: IndexValue,
    {
        let path = self.checked_path()?;
        CompositeIndex::from_config(path, &self.config)
    }

    /// # Description
    /// Sets the index file path.
    /// Missing directories are created on build unless
    /// [`Builder::create_if_missing`] is turned off.
    pub fn path<S: Into<PathBuf>>(mut self, path: S) -> Self {
        let path: PathBuf = path.into();
        info!("index file set to: {}", path.display());
        self.path = Some(path);
        self
    }

    /// # Description
    /// Sets the number of entries a segment keeps after a split.
    /// Must be greater than zero, ignored for existing files.
    pub fn node_size(mut self, node_size: u32) -> Self {
        if node_size > 0 {
            self.config.set_node_size(node_size);
            info!("node size set to: {}", node_size);
        } else {
            error!("zero node size is useless, not set");
        }
        self
    }

    /// # Description
    /// Create the file when it does not exist, default `true`.
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.config.set_create_if_missing(create);
        debug!("create if missing set to: {}", create);
        self
    }

    /// # Description
    /// Check the whole chain right after opening, default `false`.
    pub fn verify_on_open(mut self, verify: bool) -> Self {
        self.config.set_verify_on_open(verify);
        debug!("verify on open set to: {}", verify);
        self
    }

    fn checked_path(&self) -> Result<&Path> {
        self.path
            .as_deref()
            .ok_or_else(|| Error::wrong_config("index path is not set").into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn path_is_required() {
        let err = Builder::new().build::<u32, u32>().unwrap_err();
        let kind = err.downcast_ref::<Error>().map(Error::kind);
        assert!(matches!(kind, Some(ErrorKind::WrongConfig(_))));
    }

    #[test]
    fn zero_node_size_keeps_default() {
        let dir = TempDir::new().unwrap();
        let index = Builder::new()
            .path(dir.path().join("zero.idx"))
            .node_size(0)
            .build::<u32, u32>()
            .unwrap();
        assert_eq!(index.stats().unwrap().node_size, 316);
    }

    #[test]
    fn creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("deeper").join("a.idx");
        let index = Builder::new()
            .path(&path)
            .build_composite::<u32, u32, u32>()
            .unwrap();
        assert!(index.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn missing_file_without_create() {
        let dir = TempDir::new().unwrap();
        let result = Builder::new()
            .path(dir.path().join("absent.idx"))
            .create_if_missing(false)
            .build::<u32, u32>();
        assert!(result.is_err());
    }
}
