use super::prelude::*;

/// Settings applied when an index file is opened.
///
/// Capacities only matter for new files: an existing file keeps the node size it
/// was created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    node_size: u32,
    create_if_missing: bool,
    verify_on_open: bool,
}

// Getters
impl IndexConfig {
    /// Entries a segment keeps after a split; splits happen at twice this.
    #[inline]
    pub const fn node_size(&self) -> u32 {
        self.node_size
    }

    /// Slab occupancy that triggers a split.
    #[inline]
    pub const fn max_node_size(&self) -> Option<u32> {
        self.node_size.checked_mul(2)
    }

    /// Create the file and its directory when they do not exist.
    #[inline]
    pub const fn create_if_missing(&self) -> bool {
        self.create_if_missing
    }

    /// Walk and check the whole chain right after opening.
    #[inline]
    pub const fn verify_on_open(&self) -> bool {
        self.verify_on_open
    }
}

// Setters
impl IndexConfig {
    /// Sets node size, see [`IndexConfig::node_size`].
    pub fn set_node_size(&mut self, node_size: u32) {
        self.node_size = node_size;
    }

    /// Sets [`IndexConfig::create_if_missing`].
    pub fn set_create_if_missing(&mut self, create: bool) {
        self.create_if_missing = create;
    }

    /// Sets [`IndexConfig::verify_on_open`].
    pub fn set_verify_on_open(&mut self, verify: bool) {
        self.verify_on_open = verify;
    }
}

impl IndexConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.node_size == 0 {
            return Err(Error::wrong_config("node size must be greater than zero").into());
        }
        if self.max_node_size().is_none() {
            let cause = format!("node size {} overflows the split size", self.node_size);
            return Err(Error::wrong_config(cause).into());
        }
        Ok(())
    }
}

// Impl Traits
impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            node_size: 316,
            create_if_missing: true,
            verify_on_open: false,
        }
    }
}
