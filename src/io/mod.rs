mod file;

pub(crate) use file::File;
