#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(test, deny(warnings))]

//! # folio
//!
//! The `folio` crate provides ordered key-value indexes that live entirely on disk.
//! Every index is an unrolled linked list: a doubly linked chain of segments, each
//! holding its smallest entry inline and the rest in a fixed-capacity slab, linked
//! through byte offsets of a single file.
//!
//! Two flavours are exposed:
//! * [`OrderedIndex`] keyed by one ordered key;
//! * [`CompositeIndex`] keyed by a `(key1, key2)` pair, with a group scan over
//!   every entry sharing `key1`.
//!
//! # Examples
//!
//! ```no_run
//! use folio::{Builder, FixedStr};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut index = Builder::new()
//!     .path("/tmp/folio/accounts.idx")
//!     .node_size(64)
//!     .build::<FixedStr<30>, u32>()?;
//! index.insert(FixedStr::new("root")?, 0)?;
//! assert_eq!(index.get(&FixedStr::new("root")?)?, Some(0));
//! index.close()?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

/// Formatted build information.
pub mod build_info;
/// Index collaborators of the bookstore: account directory and book catalog.
pub mod catalog;
/// Offline helpers for index files.
pub mod tools;

mod error;
mod index;
mod io;
mod key;
mod list;

pub use anyhow::Result;
pub use error::{Error, ErrorKind, ValidationErrorKind};
pub use index::{Builder, CompositeIndex, IndexConfig, OrderedIndex};
pub use key::FixedStr;
pub use list::{Handle, IndexKey, IndexStats, IndexValue};

mod prelude {
    pub(crate) use crate::{Error, ErrorKind, ValidationErrorKind};
    pub(crate) use anyhow::{anyhow, Context, Result};
    pub(crate) use bincode::{deserialize, serialize, serialized_size};
    pub(crate) use serde::{de::DeserializeOwned, Serialize};
    pub(crate) use std::{
        cmp::Ordering as CmpOrdering,
        error,
        fmt::{Debug, Display, Formatter, Result as FmtResult},
        fs::{File as StdFile, OpenOptions},
        io::{Error as IOError, Read, Seek, SeekFrom, Write},
        marker::PhantomData,
        num::TryFromIntError,
        path::{Path, PathBuf},
    };
    pub(crate) use thiserror::Error;
}
