pub(crate) use crate::prelude::*;
pub(crate) use crate::{Builder, CompositeIndex, FixedStr, OrderedIndex};

mod account;
mod book;

pub use account::AccountDirectory;
pub use book::{parse_keywords, BookCatalog, BookKeys};

mod prelude {
    pub(crate) use super::*;
}

/// Offset of a payload record in a collaborator's own record file.
pub type RecordOffset = u32;
/// Account login name.
pub type UserId = FixedStr<30>;
/// Primary key of a book.
pub type Isbn = FixedStr<20>;
/// Book title.
pub type BookName = FixedStr<60>;
/// Book author.
pub type Author = FixedStr<60>;
/// One keyword of a book.
pub type Keyword = FixedStr<60>;

fn open_in<K, V>(dir: &Path, file_name: &str) -> Result<OrderedIndex<K, V>>
where
    K: crate::IndexKey,
    V: crate::IndexValue,
{
    Builder::new().path(dir.join(file_name)).build()
}

fn open_composite_in<K1, K2, V>(dir: &Path, file_name: &str) -> Result<CompositeIndex<K1, K2, V>>
where
    K1: crate::IndexKey,
    K2: crate::IndexKey,
    V: crate::IndexValue,
{
    Builder::new().path(dir.join(file_name)).build_composite()
}
