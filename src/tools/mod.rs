pub(crate) mod validation;

pub use validation::*;

pub(crate) mod prelude {
    pub(crate) use crate::list::{IndexKey, IndexValue, UnrolledList};
    pub(crate) use crate::prelude::*;
    pub(crate) use crate::IndexStats;
}
