use super::prelude::*;

/// Segment record: the anchor entry of a run plus its links.
///
/// On disk: `key - value - slab - count - next - prev`. `count` is the number of
/// occupied slab slots, the anchor is not counted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Segment<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) slab: Handle,
    pub(crate) count: u32,
    pub(crate) next: Handle,
    pub(crate) prev: Handle,
}

impl<K, V> Segment<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            slab: Handle::NULL,
            count: 0,
            next: Handle::NULL,
            prev: Handle::NULL,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.count as usize
    }
}

/// One slab slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

/// Fixed record sizes of one `(K, V)` instantiation.
#[derive(Debug)]
pub(crate) struct Layout<K, V> {
    pub(crate) segment_size: u64,
    pub(crate) entry_size: u64,
    pub(crate) slab_capacity: u32,
    marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Layout<K, V>
where
    K: IndexKey,
    V: IndexValue,
{
    pub(crate) fn new(slab_capacity: u32) -> Result<Self> {
        let segment_size = serialized_size(&Segment::<K, V>::default())?;
        let entry_size = serialized_size(&Entry::<K, V>::default())?;
        trace!(
            "layout: segment {}b, entry {}b, slab {} slots",
            segment_size,
            entry_size,
            slab_capacity
        );
        Ok(Self {
            segment_size,
            entry_size,
            slab_capacity,
            marker: PhantomData,
        })
    }

    /// Bytes reserved for one slab, whether used or not.
    #[inline]
    pub(crate) fn slab_size(&self) -> u64 {
        self.entry_size * u64::from(self.slab_capacity)
    }

    pub(crate) fn encode_segment(&self, segment: &Segment<K, V>) -> Result<Vec<u8>> {
        Self::encode(segment, self.segment_size)
    }

    pub(crate) fn decode_segment(&self, buf: &[u8]) -> Result<Segment<K, V>> {
        deserialize(buf).context("failed to decode segment")
    }

    pub(crate) fn encode_entry(&self, entry: &Entry<K, V>) -> Result<Vec<u8>> {
        Self::encode(entry, self.entry_size)
    }

    pub(crate) fn decode_entries(&self, buf: &[u8]) -> Result<Vec<Entry<K, V>>> {
        buf.chunks(self.entry_size as usize)
            .map(|chunk| deserialize(chunk).context("failed to decode slab entry"))
            .collect()
    }

    // keys and values must serialize to the size measured on their defaults,
    // otherwise neighbouring slots would be overwritten
    fn encode<T: Serialize>(record: &T, expected: u64) -> Result<Vec<u8>> {
        let buf = serialize(record)?;
        let actual = buf.len() as u64;
        if actual != expected {
            return Err(Error::size_mismatch(expected, actual).into());
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_of_integer_records() {
        let layout = Layout::<u64, u32>::new(8).unwrap();
        // key + value + slab + count + next + prev
        assert_eq!(layout.segment_size, 8 + 4 + 4 * 4);
        assert_eq!(layout.entry_size, 8 + 4);
        assert_eq!(layout.slab_size(), 8 * 12);
    }

    #[test]
    fn composite_keys_are_laid_out_in_order() {
        let layout = Layout::<(u16, u32), u8>::new(2).unwrap();
        let entry = Entry {
            key: (1u16, 2u32),
            value: 3u8,
        };
        let buf = layout.encode_entry(&entry).unwrap();
        assert_eq!(buf, vec![1, 0, 2, 0, 0, 0, 3]);
    }

    #[test]
    fn variable_sized_keys_are_rejected() {
        let layout = Layout::<String, u32>::new(2).unwrap();
        let entry = Entry {
            key: "not empty".to_string(),
            value: 1,
        };
        let err = layout.encode_entry(&entry).unwrap_err();
        let kind = err.downcast_ref::<Error>().map(Error::kind);
        assert!(matches!(kind, Some(ErrorKind::SizeMismatch { .. })));
    }

    #[test]
    fn segment_survives_encoding() {
        let layout = Layout::<u32, u32>::new(4).unwrap();
        let mut segment = Segment::new(10u32, 100u32);
        segment.slab = Handle::from_offset(44).unwrap();
        segment.count = 3;
        let buf = layout.encode_segment(&segment).unwrap();
        assert_eq!(layout.decode_segment(&buf).unwrap(), segment);
    }

    #[test]
    fn entries_decode_in_slot_order() {
        let layout = Layout::<u32, u32>::new(4).unwrap();
        let buf = (0..3u32)
            .flat_map(|i| layout.encode_entry(&Entry { key: i, value: i * 10 }).unwrap())
            .collect::<Vec<_>>();
        let entries = layout.decode_entries(&buf).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[2], Entry { key: 2, value: 20 });
    }
}
