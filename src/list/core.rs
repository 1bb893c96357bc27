use super::prelude::*;

/// Position of an entry inside its segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    /// The entry stored inline in the segment record.
    Anchor,
    /// Index into the segment's slab.
    Slab(usize),
}

impl Slot {
    /// Slab index right after this position.
    #[inline]
    fn after(self) -> usize {
        match self {
            Slot::Anchor => 0,
            Slot::Slab(i) => i + 1,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Cursor<K, V> {
    pub(crate) handle: Handle,
    pub(crate) segment: Segment<K, V>,
    pub(crate) slot: Slot,
}

/// Shape of an index at the moment it was walked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Segments reachable from the header.
    pub segments: usize,
    /// Stored entries, anchors included.
    pub entries: usize,
    /// Entries a segment keeps after a split.
    pub node_size: u32,
    /// Slab occupancy that triggers a split.
    pub max_node_size: u32,
    /// Bytes in the backing file, unreachable ones included.
    pub file_size: u64,
}

/// Unrolled linked list on disk.
///
/// File structure from the beginning:
/// 1. [`IndexHeader`], 16 bytes
/// 2. Segments, each immediately followed by its slab of `max_node_size` slots
///
/// Segments form a doubly linked chain ascending by key. The anchor of a segment
/// is the smallest key of its run, all slab entries are strictly greater and
/// strictly less than the next segment's anchor.
#[derive(Debug)]
pub(crate) struct UnrolledList<K, V>
where
    K: IndexKey,
    V: IndexValue,
{
    file: File,
    header: IndexHeader,
    layout: Layout<K, V>,
    dirty: bool,
}

impl<K, V> UnrolledList<K, V>
where
    K: IndexKey,
    V: IndexValue,
{
    /// Opens an index file, writing a fresh header if the file is empty.
    pub(crate) fn from_file(file: File, node_size: u32) -> Result<Self> {
        if file.size() == 0 {
            return Self::init_file(file, node_size);
        }
        let list = Self::load(file)?;
        if list.header.node_size != node_size {
            warn!(
                "{:?} was created with node size {}, configured {} is ignored",
                list.path(),
                list.header.node_size,
                node_size
            );
        }
        Ok(list)
    }

    fn init_file(mut file: File, node_size: u32) -> Result<Self> {
        let header = IndexHeader::new(node_size);
        file.write_all_at(0, &header.to_raw()?)?;
        info!(
            "new index {:?}, node size {}, max node size {}",
            file.path(),
            header.node_size,
            header.max_node_size
        );
        let layout = Layout::new(header.max_node_size)?;
        Ok(Self {
            file,
            header,
            layout,
            dirty: true,
        })
    }

    /// Loads an existing index with the capacities stored in its header.
    pub(crate) fn load(file: File) -> Result<Self> {
        let header_size = IndexHeader::serialized_size_default()?;
        if file.size() < header_size {
            let cause = format!("file has {} bytes, header needs {}", file.size(), header_size);
            return Err(Error::validation(ValidationErrorKind::IndexHeader, cause).into());
        }
        let buf = file.read_exact_at_allocate(header_size as usize, 0)?;
        let header = IndexHeader::from_raw(&buf)?;
        header
            .validate(file.size())
            .with_context(|| format!("index header of {:?} is corrupt", file.path()))?;
        debug!("index {:?} loaded: {:?}", file.path(), header);
        let layout = Layout::new(header.max_node_size)?;
        Ok(Self {
            file,
            header,
            layout,
            dirty: false,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.header.is_empty()
    }

    /// Inserts a key that is not yet present.
    ///
    /// Inserting a present key breaks the ordering invariant, callers check with
    /// [`UnrolledList::get`] first.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<()> {
        let Cursor {
            handle,
            mut segment,
            slot,
        } = match self.locate(&key)? {
            Some(cursor) => cursor,
            None => return self.push_first_segment(Segment::new(key, value)),
        };
        let slab = segment.slab;
        let count = segment.len();
        if segment.prev.is_null() && key < segment.key {
            // new minimum: the old anchor moves into the slab so the anchor stays smallest
            self.move_entries(slab, 0, 1, count)?;
            let old = Entry {
                key: std::mem::replace(&mut segment.key, key),
                value: std::mem::replace(&mut segment.value, value),
            };
            self.write_entry(slab, 0, &old)?;
        } else {
            let index = slot.after();
            self.move_entries(slab, index, index + 1, count - index)?;
            self.write_entry(slab, index, &Entry { key, value })?;
        }
        segment.count += 1;
        if segment.count >= self.header.max_node_size {
            self.split(handle, segment)
        } else {
            self.write_segment(handle, &segment)
        }
    }

    /// Removes `key`, returns `false` if it was absent.
    pub(crate) fn erase(&mut self, key: &K) -> Result<bool> {
        let Cursor {
            handle,
            mut segment,
            slot,
        } = match self.find_exact(key)? {
            Some((cursor, _)) => cursor,
            None => return Ok(false),
        };
        let slab = segment.slab;
        let count = segment.len();
        match slot {
            Slot::Anchor if count == 0 => {
                self.unlink(handle, &segment)?;
                return Ok(true);
            }
            Slot::Anchor => {
                let promoted = self.read_entry(slab, 0)?;
                segment.key = promoted.key;
                segment.value = promoted.value;
                self.move_entries(slab, 1, 0, count - 1)?;
            }
            Slot::Slab(index) => {
                self.move_entries(slab, index + 1, index, count - index - 1)?;
            }
        }
        segment.count -= 1;
        self.write_segment(handle, &segment)?;
        Ok(true)
    }

    /// Overwrites the value of `key` in place, returns `false` if it was absent.
    pub(crate) fn modify(&mut self, key: &K, value: V) -> Result<bool> {
        let Cursor {
            handle,
            mut segment,
            slot,
        } = match self.find_exact(key)? {
            Some((cursor, _)) => cursor,
            None => return Ok(false),
        };
        match slot {
            Slot::Anchor => {
                segment.value = value;
                self.write_segment(handle, &segment)?;
            }
            Slot::Slab(index) => {
                let entry = Entry {
                    key: key.clone(),
                    value,
                };
                self.write_entry(segment.slab, index, &entry)?;
            }
        }
        Ok(true)
    }

    pub(crate) fn get(&self, key: &K) -> Result<Option<V>> {
        Ok(self.find_exact(key)?.map(|(_, value)| value))
    }

    /// All entries in ascending key order.
    pub(crate) fn entries(&self) -> Result<Vec<(K, V)>> {
        let mut entries = Vec::new();
        for item in self.segments() {
            let (_, segment) = item?;
            let slab = self.read_entries(segment.slab, 0, segment.len())?;
            entries.push((segment.key, segment.value));
            entries.extend(slab.into_iter().map(|e| (e.key, e.value)));
        }
        Ok(entries)
    }

    /// All values in ascending key order.
    pub(crate) fn values(&self) -> Result<Vec<V>> {
        let mut values = Vec::new();
        for item in self.segments() {
            let (_, segment) = item?;
            let slab = self.read_entries(segment.slab, 0, segment.len())?;
            values.push(segment.value);
            values.extend(slab.into_iter().map(|e| e.value));
        }
        Ok(values)
    }

    /// Values of the contiguous run of keys for which `probe` returns `Equal`.
    ///
    /// `probe` places a key relative to the group: `Less` before it, `Greater` after.
    /// The run may start inside the slab of a segment whose anchor precedes it and
    /// may cover any number of following segments.
    pub(crate) fn scan_group<F>(&self, probe: F) -> Result<Vec<V>>
    where
        F: Fn(&K) -> CmpOrdering,
    {
        let mut values = Vec::new();
        let mut segment = match self.group_start(&probe)? {
            Some(segment) => segment,
            None => return Ok(values),
        };
        let mut start = match probe(&segment.key) {
            CmpOrdering::Less => self.lower_bound(&segment, &probe)?,
            CmpOrdering::Equal => {
                values.push(segment.value.clone());
                0
            }
            CmpOrdering::Greater => return Ok(values),
        };
        loop {
            for entry in self.read_entries(segment.slab, start, segment.len())? {
                match probe(&entry.key) {
                    CmpOrdering::Less => continue,
                    CmpOrdering::Equal => values.push(entry.value),
                    CmpOrdering::Greater => return Ok(values),
                }
            }
            let next = match segment.next.get() {
                Some(next) => next,
                None => return Ok(values),
            };
            segment = self.read_segment(next)?;
            if probe(&segment.key) != CmpOrdering::Equal {
                return Ok(values);
            }
            values.push(segment.value.clone());
            start = 0;
        }
    }

    /// Detaches the whole chain. Segment bytes stay in the file unreachable.
    pub(crate) fn clear(&mut self) -> Result<()> {
        self.header.first = Handle::NULL;
        self.header.last = Handle::NULL;
        self.write_header()?;
        debug!("index {:?} cleared", self.path());
        Ok(())
    }

    pub(crate) fn stats(&self) -> Result<IndexStats> {
        let mut stats = self.empty_stats();
        for item in self.segments() {
            let (_, segment) = item?;
            stats.segments += 1;
            stats.entries += 1 + segment.len();
        }
        Ok(stats)
    }

    pub(crate) fn empty_stats(&self) -> IndexStats {
        IndexStats {
            node_size: self.header.node_size,
            max_node_size: self.header.max_node_size,
            file_size: self.file.size(),
            ..IndexStats::default()
        }
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.file.fsyncdata()?;
        self.dirty = false;
        trace!("index {:?} flushed", self.path());
        Ok(())
    }

    /// Segments from first to last.
    pub(crate) fn segments(&self) -> Segments<'_, K, V> {
        Segments {
            list: self,
            next: self.header.first,
            visited: 0,
        }
    }

    pub(crate) fn header(&self) -> &IndexHeader {
        &self.header
    }

    /// Segment whose run should contain `key` and the slot `key` sits at or after.
    ///
    /// Walks back from the last segment to the rightmost anchor not greater than
    /// `key`. A key smaller than every stored key yields the first segment's anchor.
    /// `None` only for an empty list.
    pub(crate) fn locate(&self, key: &K) -> Result<Option<Cursor<K, V>>> {
        if self.header.is_empty() {
            return Ok(None);
        }
        let mut handle = self.header.last;
        let mut segment = self.read_segment(handle)?;
        while key < &segment.key && !segment.prev.is_null() {
            handle = segment.prev;
            segment = self.read_segment(handle)?;
        }
        let slot = self.slot_in(&segment, key)?;
        trace!("{:?} located at {} {:?}", key, handle, slot);
        Ok(Some(Cursor {
            handle,
            segment,
            slot,
        }))
    }

    pub(crate) fn find_exact(&self, key: &K) -> Result<Option<(Cursor<K, V>, V)>> {
        let cursor = match self.locate(key)? {
            Some(cursor) => cursor,
            None => return Ok(None),
        };
        let found = match cursor.slot {
            Slot::Anchor if &cursor.segment.key == key => Some(cursor.segment.value.clone()),
            Slot::Anchor => None,
            Slot::Slab(index) => {
                let entry = self.read_entry(cursor.segment.slab, index)?;
                if &entry.key == key {
                    Some(entry.value)
                } else {
                    None
                }
            }
        };
        Ok(found.map(|value| (cursor, value)))
    }

    // binary search over the slab, the first and last slots are checked
    // up front since inserts cluster at both ends
    fn slot_in(&self, segment: &Segment<K, V>, key: &K) -> Result<Slot> {
        if key <= &segment.key || segment.count == 0 {
            return Ok(Slot::Anchor);
        }
        let last = segment.len() - 1;
        if key < &self.read_entry(segment.slab, 0)?.key {
            return Ok(Slot::Anchor);
        }
        if &self.read_entry(segment.slab, last)?.key <= key {
            return Ok(Slot::Slab(last));
        }
        let (mut left, mut right) = (0, last);
        while right - left > 1 {
            let mid = (left + right) / 2;
            if key < &self.read_entry(segment.slab, mid)?.key {
                right = mid;
            } else {
                left = mid;
            }
        }
        Ok(Slot::Slab(left))
    }

    // last segment whose anchor precedes the group, or the first segment
    fn group_start<F>(&self, probe: &F) -> Result<Option<Segment<K, V>>>
    where
        F: Fn(&K) -> CmpOrdering,
    {
        if self.header.is_empty() {
            return Ok(None);
        }
        let mut segment = self.read_segment(self.header.last)?;
        while probe(&segment.key) != CmpOrdering::Less {
            match segment.prev.get() {
                Some(prev) => segment = self.read_segment(prev)?,
                None => break,
            }
        }
        Ok(Some(segment))
    }

    // first slab index not before the group
    fn lower_bound<F>(&self, segment: &Segment<K, V>, probe: &F) -> Result<usize>
    where
        F: Fn(&K) -> CmpOrdering,
    {
        let count = segment.len();
        if count == 0 || probe(&self.read_entry(segment.slab, 0)?.key) != CmpOrdering::Less {
            return Ok(0);
        }
        if probe(&self.read_entry(segment.slab, count - 1)?.key) == CmpOrdering::Less {
            return Ok(count);
        }
        let (mut left, mut right) = (0, count - 1);
        while right - left > 1 {
            let mid = (left + right) / 2;
            if probe(&self.read_entry(segment.slab, mid)?.key) == CmpOrdering::Less {
                left = mid;
            } else {
                right = mid;
            }
        }
        Ok(right)
    }

    /// Moves the back half of an overflowing segment into a new segment linked after it.
    fn split(&mut self, handle: Handle, mut segment: Segment<K, V>) -> Result<()> {
        let node_size = self.header.node_size as usize;
        let mut moved = self
            .read_entries(segment.slab, node_size, segment.len())?
            .into_iter();
        let anchor = moved
            .next()
            .ok_or_else(|| anyhow!("split of segment {} without overflow", handle))?;
        let rest = moved.collect::<Vec<_>>();
        let mut new_segment = Segment::new(anchor.key, anchor.value);
        new_segment.count = u32::try_from(rest.len()).map_err(Error::from)?;
        segment.count = self.header.node_size;
        let new_handle = self.link_after(handle, &mut segment, &mut new_segment)?;
        self.write_entries(new_segment.slab, 0, &rest)?;
        debug!(
            "segment {} split, {} entries moved to {}",
            handle,
            rest.len() + 1,
            new_handle
        );
        Ok(())
    }

    fn push_first_segment(&mut self, mut segment: Segment<K, V>) -> Result<()> {
        let handle = self.allocate(&mut segment)?;
        self.header.first = handle;
        self.header.last = handle;
        self.write_header()?;
        debug!("first segment of {:?} allocated at {}", self.path(), handle);
        Ok(())
    }

    fn link_after(
        &mut self,
        handle: Handle,
        segment: &mut Segment<K, V>,
        new_segment: &mut Segment<K, V>,
    ) -> Result<Handle> {
        new_segment.prev = handle;
        new_segment.next = segment.next;
        let new_handle = self.allocate(new_segment)?;
        match segment.next.get() {
            Some(next_handle) => {
                let mut next = self.read_segment(next_handle)?;
                next.prev = new_handle;
                self.write_segment(next_handle, &next)?;
            }
            None => {
                self.header.last = new_handle;
                self.write_header()?;
            }
        }
        segment.next = new_handle;
        self.write_segment(handle, segment)?;
        Ok(new_handle)
    }

    fn unlink(&mut self, handle: Handle, segment: &Segment<K, V>) -> Result<()> {
        let mut header_changed = false;
        match segment.prev.get() {
            Some(prev_handle) => {
                let mut prev = self.read_segment(prev_handle)?;
                prev.next = segment.next;
                self.write_segment(prev_handle, &prev)?;
            }
            None => {
                self.header.first = segment.next;
                header_changed = true;
            }
        }
        match segment.next.get() {
            Some(next_handle) => {
                let mut next = self.read_segment(next_handle)?;
                next.prev = segment.prev;
                self.write_segment(next_handle, &next)?;
            }
            None => {
                self.header.last = segment.prev;
                header_changed = true;
            }
        }
        if header_changed {
            self.write_header()?;
        }
        debug!(
            "segment {} unlinked, {} bytes left unreachable",
            handle,
            self.layout.segment_size + self.layout.slab_size()
        );
        Ok(())
    }

    /// Appends a segment record followed by its reserved slab.
    fn allocate(&mut self, segment: &mut Segment<K, V>) -> Result<Handle> {
        let offset = self.file.size();
        let slab_offset = offset + self.layout.segment_size;
        // the end of the slab must be addressable too
        Handle::from_offset(slab_offset + self.layout.slab_size())?;
        let handle = Handle::from_offset(offset)?;
        segment.slab = Handle::from_offset(slab_offset)?;
        let mut buf = self.layout.encode_segment(segment)?;
        buf.resize(buf.len() + self.layout.slab_size() as usize, 0);
        let written_at = self.file.write_append_all(&buf)?;
        debug_assert_eq!(written_at, offset);
        self.dirty = true;
        Ok(handle)
    }

    pub(crate) fn read_segment(&self, handle: Handle) -> Result<Segment<K, V>> {
        if handle.is_null() {
            let cause = "null handle dereferenced";
            return Err(Error::validation(ValidationErrorKind::DanglingHandle, cause).into());
        }
        let buf = self
            .file
            .read_exact_at_allocate(self.layout.segment_size as usize, handle.offset())?;
        let segment = self
            .layout
            .decode_segment(&buf)
            .with_context(|| format!("segment at {}", handle))?;
        if segment.count >= self.header.max_node_size {
            let cause = format!(
                "segment {} holds {} slab entries, capacity is {}",
                handle, segment.count, self.header.max_node_size
            );
            return Err(Error::validation(ValidationErrorKind::Occupancy, cause).into());
        }
        Ok(segment)
    }

    fn write_segment(&mut self, handle: Handle, segment: &Segment<K, V>) -> Result<()> {
        let buf = self.layout.encode_segment(segment)?;
        self.file.write_all_at(handle.offset(), &buf)?;
        self.dirty = true;
        Ok(())
    }

    fn read_entry(&self, slab: Handle, index: usize) -> Result<Entry<K, V>> {
        let mut entries = self.read_entries(slab, index, index + 1)?;
        entries
            .pop()
            .ok_or_else(|| anyhow!("slot {} of slab {} is empty", index, slab))
    }

    /// Entries of slots `from..to`.
    pub(crate) fn read_entries(
        &self,
        slab: Handle,
        from: usize,
        to: usize,
    ) -> Result<Vec<Entry<K, V>>> {
        if from >= to {
            return Ok(Vec::new());
        }
        let size = self.layout.entry_size;
        let buf = self
            .file
            .read_exact_at_allocate((to - from) * size as usize, slab.slot(from, size))?;
        self.layout.decode_entries(&buf)
    }

    fn write_entry(&mut self, slab: Handle, index: usize, entry: &Entry<K, V>) -> Result<()> {
        self.write_entries(slab, index, std::slice::from_ref(entry))
    }

    fn write_entries(&mut self, slab: Handle, from: usize, entries: &[Entry<K, V>]) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut buf = Vec::with_capacity(entries.len() * self.layout.entry_size as usize);
        for entry in entries {
            buf.extend_from_slice(&self.layout.encode_entry(entry)?);
        }
        let offset = slab.slot(from, self.layout.entry_size);
        self.file.write_all_at(offset, &buf)?;
        self.dirty = true;
        Ok(())
    }

    /// Copies `len` raw slots starting at `from` so they start at `to`.
    fn move_entries(&mut self, slab: Handle, from: usize, to: usize, len: usize) -> Result<()> {
        if len == 0 {
            return Ok(());
        }
        let size = self.layout.entry_size;
        let buf = self
            .file
            .read_exact_at_allocate(len * size as usize, slab.slot(from, size))?;
        self.file.write_all_at(slab.slot(to, size), &buf)?;
        self.dirty = true;
        Ok(())
    }

    fn write_header(&mut self) -> Result<()> {
        let buf = self.header.to_raw()?;
        self.file.write_all_at(0, &buf)?;
        self.dirty = true;
        Ok(())
    }
}

impl<K, V> Drop for UnrolledList<K, V>
where
    K: IndexKey,
    V: IndexValue,
{
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.flush() {
                error!("failed to flush index {:?} on drop: {:#}", self.path(), e);
            }
        }
    }
}

/// Iterator over the segment chain, stops at the first read error.
#[derive(Debug)]
pub(crate) struct Segments<'a, K, V>
where
    K: IndexKey,
    V: IndexValue,
{
    list: &'a UnrolledList<K, V>,
    next: Handle,
    visited: u64,
}

impl<'a, K, V> Iterator for Segments<'a, K, V>
where
    K: IndexKey,
    V: IndexValue,
{
    type Item = Result<(Handle, Segment<K, V>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.next.get()?;
        // a chain longer than the file can hold segments loops back on itself
        let limit = self.list.file.size() / self.list.layout.segment_size;
        self.visited += 1;
        if self.visited > limit {
            self.next = Handle::NULL;
            let cause = format!("chain revisits segments, stopped at {}", handle);
            let err = Error::validation(ValidationErrorKind::BrokenChain, cause);
            return Some(Err(err.into()));
        }
        match self.list.read_segment(handle) {
            Ok(segment) => {
                self.next = segment.next;
                Some(Ok((handle, segment)))
            }
            Err(e) => {
                self.next = Handle::NULL;
                Some(Err(e))
            }
        }
    }
}
