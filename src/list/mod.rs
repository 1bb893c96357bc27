pub(crate) use crate::prelude::*;

mod core;
mod handle;
mod header;
mod node;
mod validation;


pub(crate) use self::core::UnrolledList;
pub(crate) use header::IndexHeader;
pub use self::core::IndexStats;
pub use handle::Handle;

mod prelude {
    pub(crate) use super::*;
    pub(crate) use crate::io::File;
    pub(crate) use node::{Entry, Layout, Segment};
}

/// Key stored in an index.
///
/// Every value of the type must serialize to the same number of bytes as its
/// `Default`, slabs are arrays of fixed-size slots.
pub trait IndexKey: Ord + Clone + Debug + Default + Serialize + DeserializeOwned {}

impl<T> IndexKey for T where T: Ord + Clone + Debug + Default + Serialize + DeserializeOwned {}

/// Value stored in an index, under the same fixed-size rule as [`IndexKey`].
pub trait IndexValue: Clone + Debug + Default + Serialize + DeserializeOwned {}

impl<T> IndexValue for T where T: Clone + Debug + Default + Serialize + DeserializeOwned {}
