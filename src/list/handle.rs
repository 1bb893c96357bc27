use super::prelude::*;

/// Byte offset of a segment or slab inside an index file.
///
/// Offset zero is occupied by the index header, so it doubles as the null handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle(u32);

static_assertions::assert_eq_size!(Handle, u32);

impl Handle {
    /// The null handle, never allocated to a node.
    pub const NULL: Handle = Handle(0);

    pub(crate) fn from_offset(offset: u64) -> Result<Self> {
        let raw = u32::try_from(offset).map_err(Error::from)?;
        Ok(Self(raw))
    }

    /// Returns `true` for the null handle.
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Byte offset in the index file.
    #[inline]
    pub const fn offset(self) -> u64 {
        self.0 as u64
    }

    /// `None` for the null handle.
    #[inline]
    pub fn get(self) -> Option<Self> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }

    /// Offset of the `index`-th slot of `size` bytes counted from this handle.
    #[inline]
    pub(crate) fn slot(self, index: usize, size: u64) -> u64 {
        self.offset() + index as u64 * size
    }
}

impl Display for Handle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_null() {
            f.write_str("null")
        } else {
            write!(f, "@{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_past_u32_are_rejected() {
        assert!(Handle::from_offset(u64::from(u32::MAX) + 1).is_err());
        assert_eq!(Handle::from_offset(42).unwrap().offset(), 42);
    }

    #[test]
    fn null_handle() {
        assert!(Handle::NULL.is_null());
        assert_eq!(Handle::NULL.get(), None);
        assert_eq!(Handle::default(), Handle::NULL);
        assert_eq!(Handle::NULL.to_string(), "null");
    }

    #[test]
    fn serialized_as_four_bytes() {
        let handle = Handle::from_offset(16).unwrap();
        assert_eq!(serialize(&handle).unwrap(), vec![16, 0, 0, 0]);
    }
}
