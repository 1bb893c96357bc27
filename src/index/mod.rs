pub(crate) use crate::prelude::*;
pub(crate) use crate::io::File;
pub(crate) use crate::list::{IndexKey, IndexStats, IndexValue, UnrolledList};

mod builder;
mod composite;
mod config;
mod single;

pub use builder::Builder;
pub use composite::CompositeIndex;
pub use config::IndexConfig;
pub use single::OrderedIndex;

mod prelude {
    pub(crate) use super::*;
}

/// Opens or creates the file at `path` and loads the list stored in it.
pub(crate) fn open_list<K, V>(path: &Path, config: &IndexConfig) -> Result<UnrolledList<K, V>>
where
    K: IndexKey,
    V: IndexValue,
{
    config.validate()?;
    let file = if config.create_if_missing() {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create directory {:?}", dir))?;
        }
        File::create(path)?
    } else {
        File::open(path)?
    };
    let list = UnrolledList::from_file(file, config.node_size())?;
    if config.verify_on_open() {
        let stats = list.validate()?;
        debug!("{:?} verified on open: {:?}", path, stats);
    }
    Ok(list)
}
