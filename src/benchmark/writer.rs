use crate::statistics::Report;

use folio::{Builder, OrderedIndex, Result};
use std::{path::Path, time::Instant};

const FILE_NAME: &str = "folio_benchmark.idx";

pub struct Writer {
    index: OrderedIndex<u64, u64>,
}

impl Writer {
    pub fn new(dir: &Path, node_size: u32) -> Result<Self> {
        let path = dir.join(FILE_NAME);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        let index = Builder::new().path(path).node_size(node_size).build()?;
        Ok(Self { index })
    }

    pub fn insert(&mut self, key: u64, value: u64) -> Result<Report> {
        let now = Instant::now();
        self.index.insert(key, value)?;
        Ok(Report::new(now))
    }

    pub fn get(&self, key: u64) -> Result<Report> {
        let now = Instant::now();
        if self.index.get(&key)?.is_none() {
            warn!("key {} lost", key);
        }
        Ok(Report::new(now))
    }

    pub fn erase(&mut self, key: u64) -> Result<Report> {
        let now = Instant::now();
        self.index.erase(&key)?;
        Ok(Report::new(now))
    }

    pub fn close(self) -> Result<()> {
        let stats = self.index.verify()?;
        info!(
            "{} segments, {} entries, {} bytes on disk",
            stats.segments, stats.entries, stats.file_size
        );
        let path = self.index.path().to_owned();
        self.index.close()?;
        std::fs::remove_file(path)?;
        Ok(())
    }
}
