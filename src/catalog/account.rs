use super::prelude::*;

const INDEX_FILE: &str = "accounts.idx";

/// Locates account records by user id.
#[derive(Debug)]
pub struct AccountDirectory {
    index: OrderedIndex<UserId, RecordOffset>,
}

impl AccountDirectory {
    /// Opens `accounts.idx` in `dir`, creating both if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let index = open_in(dir.as_ref(), INDEX_FILE)?;
        Ok(Self::from_index(index))
    }

    /// Wraps an already opened index.
    pub fn from_index(index: OrderedIndex<UserId, RecordOffset>) -> Self {
        Self { index }
    }

    /// Adds an account. Returns `false` if the id is taken.
    pub fn register(&mut self, id: UserId, offset: RecordOffset) -> Result<bool> {
        if self.index.contains(&id)? {
            debug!("account {} already registered", id);
            return Ok(false);
        }
        self.index.insert(id, offset)?;
        Ok(true)
    }

    /// Record offset of the account, if registered.
    pub fn lookup(&self, id: &UserId) -> Result<Option<RecordOffset>> {
        self.index.get(id)
    }

    /// Forgets the account. Returns `false` if it was not registered.
    pub fn remove(&mut self, id: &UserId) -> Result<bool> {
        self.index.erase(id)
    }

    /// Points the account at a new record. Returns `false` if it was not registered.
    pub fn relocate(&mut self, id: &UserId, offset: RecordOffset) -> Result<bool> {
        self.index.modify(id, offset)
    }

    /// Every account ordered by id.
    pub fn all(&self) -> Result<Vec<(UserId, RecordOffset)>> {
        self.index.entries()
    }

    /// Makes every change so far durable.
    pub fn flush(&mut self) -> Result<()> {
        self.index.flush()
    }
}
