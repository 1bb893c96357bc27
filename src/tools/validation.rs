use super::prelude::*;
use crate::io::File;

/// Checks the header and the whole segment chain of the index file at `path`.
///
/// The file is opened read-write but never modified.
/// # Errors
/// [`ErrorKind::Validation`] naming the first inconsistency found.
pub fn validate_index<K, V>(path: impl AsRef<Path>) -> Result<IndexStats>
where
    K: IndexKey,
    V: IndexValue,
{
    let path = path.as_ref();
    let file = File::open(path)?;
    let list = UnrolledList::<K, V>::load(file)?;
    list.validate()
        .with_context(|| format!("index {:?} failed validation", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OrderedIndex;
    use tempfile::TempDir;

    #[test]
    fn valid_index_reports_stats() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("valid.idx");
        let mut index = crate::Builder::new()
            .path(&path)
            .node_size(2)
            .build::<u32, u32>()
            .unwrap();
        for key in 0..17 {
            index.insert(key, key).unwrap();
        }
        index.close().unwrap();
        let stats = validate_index::<u32, u32>(&path).unwrap();
        assert_eq!(stats.entries, 17);
        assert_eq!(stats.node_size, 2);
    }

    #[test]
    fn empty_file_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.idx");
        std::fs::write(&path, []).unwrap();
        let err = validate_index::<u32, u32>(&path).unwrap_err();
        let kind = err.downcast_ref::<Error>().map(Error::kind);
        assert!(matches!(
            kind,
            Some(ErrorKind::Validation {
                kind: ValidationErrorKind::IndexHeader,
                ..
            })
        ));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn wrong_key_width_is_detected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.idx");
        let mut index = OrderedIndex::<u64, u64>::open(&path).unwrap();
        for key in [5, 1, 9] {
            index.insert(key, key).unwrap();
        }
        index.close().unwrap();
        assert!(validate_index::<u64, u64>(&path).is_ok());
        assert!(validate_index::<u8, u8>(&path).is_err());
    }
}
