use super::prelude::*;

/// Record at offset zero of every index file:
/// `first segment - last segment - node size - max node size`, four little-endian `u32`s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IndexHeader {
    pub(crate) first: Handle,
    pub(crate) last: Handle,
    pub(crate) node_size: u32,
    pub(crate) max_node_size: u32,
}

impl IndexHeader {
    pub(crate) fn new(node_size: u32) -> Self {
        Self {
            first: Handle::NULL,
            last: Handle::NULL,
            node_size,
            max_node_size: node_size * 2,
        }
    }

    pub(crate) fn serialized_size_default() -> bincode::Result<u64> {
        let header = Self::default();
        header.serialized_size()
    }

    #[inline]
    pub(crate) fn serialized_size(&self) -> bincode::Result<u64> {
        serialized_size(&self)
    }

    #[inline]
    pub(crate) fn from_raw(buf: &[u8]) -> bincode::Result<Self> {
        deserialize(buf)
    }

    #[inline]
    pub(crate) fn to_raw(&self) -> bincode::Result<Vec<u8>> {
        serialize(&self)
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.first.is_null()
    }

    pub(crate) fn validate(&self, file_size: u64) -> Result<()> {
        if self.node_size == 0 {
            return Err(Self::error("node size is zero"));
        }
        if Some(self.max_node_size) != self.node_size.checked_mul(2) {
            let cause = format!(
                "max node size {} is not twice node size {}",
                self.max_node_size, self.node_size
            );
            return Err(Self::error(cause));
        }
        if self.first.is_null() != self.last.is_null() {
            let cause = format!("first {} and last {} disagree", self.first, self.last);
            return Err(Self::error(cause));
        }
        let header_size = Self::serialized_size_default().map_err(Error::from)?;
        for handle in [self.first, self.last] {
            if handle.is_null() {
                continue;
            }
            if handle.offset() < header_size {
                let cause = format!("{} points into the header", handle);
                return Err(Self::error(cause));
            }
            if handle.offset() >= file_size {
                let cause = format!("{} points past end of file ({} bytes)", handle, file_size);
                return Err(Self::error(cause));
            }
        }
        Ok(())
    }

    fn error(cause: impl Into<String>) -> anyhow::Error {
        Error::validation(ValidationErrorKind::IndexHeader, cause).into()
    }
}
