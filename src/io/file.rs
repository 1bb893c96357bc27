use crate::prelude::*;
use bytes::BytesMut;

/// Random-access store of fixed-size records backing one index.
///
/// Writes land in the file as soon as the call returns; they are only durable
/// after [`File::fsyncdata`].
#[derive(Debug)]
pub(crate) struct File {
    fd: StdFile,
    size: u64,
    path: PathBuf,
}

impl File {
    pub(crate) fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(path, |f| f.create(false).read(true).write(true))
    }

    pub(crate) fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(path, |f| f.create(true).read(true).write(true))
    }

    pub(crate) fn size(&self) -> u64 {
        self.size
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<()> {
        self.check_read_bounds(buf.len(), offset)?;
        let mut fd = &self.fd;
        fd.seek(SeekFrom::Start(offset))?;
        fd.read_exact(buf)
            .with_context(|| format!("read {} bytes at {} failed", buf.len(), offset))?;
        Ok(())
    }

    pub(crate) fn read_exact_at_allocate(&self, size: usize, offset: u64) -> Result<BytesMut> {
        self.check_read_bounds(size, offset)?;
        let mut buf = BytesMut::zeroed(size);
        self.read_exact_at(&mut buf, offset)?;
        Ok(buf)
    }

    fn check_read_bounds(&self, len: usize, offset: u64) -> Result<()> {
        let end = u64::try_from(len)
            .ok()
            .and_then(|len| offset.checked_add(len));
        match end {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(Error::validation(
                ValidationErrorKind::DanglingHandle,
                format!(
                    "read of {} bytes at {} past end of file {:?} ({} bytes)",
                    len, offset, self.path, self.size
                ),
            )
            .into()),
        }
    }

    pub(crate) fn write_all_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.fd.seek(SeekFrom::Start(offset))?;
        self.fd
            .write_all(buf)
            .with_context(|| format!("write {} bytes at {} failed", buf.len(), offset))?;
        self.size = self.size.max(offset + buf.len() as u64);
        Ok(())
    }

    /// Writes `buf` at the end of the file and returns the offset it starts at.
    pub(crate) fn write_append_all(&mut self, buf: &[u8]) -> Result<u64> {
        let offset = self.size;
        self.write_all_at(offset, buf)?;
        Ok(offset)
    }

    pub(crate) fn fsyncdata(&self) -> Result<()> {
        self.fd
            .sync_data()
            .with_context(|| format!("fsync of {:?} failed", self.path))
    }

    fn from_file(
        path: impl AsRef<Path>,
        setup: impl Fn(&mut OpenOptions) -> &mut OpenOptions,
    ) -> Result<Self> {
        let path = path.as_ref();
        let fd = setup(&mut OpenOptions::new())
            .open(path)
            .with_context(|| format!("failed to open index file: {:?}", path))?;
        let size = fd.metadata()?.len();
        trace!("opened {:?}, {} bytes", path, size);
        Ok(Self {
            fd,
            size,
            path: path.to_owned(),
        })
    }
}
