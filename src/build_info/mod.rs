use crate::list::{Handle, IndexHeader};

include!(concat!(env!("OUT_DIR"), "/build_time.rs"));

/// Formatted build info, printed by the benchmark banner.
/// To get specific info use helpers `build_time`, `version`, `commit` and `disk_format`.
pub fn build_info() -> String {
    format!(
        "folio {} (commit: {}, built on: {}, format: {})",
        version(),
        commit(),
        build_time(),
        disk_format()
    )
}

/// Returns package version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Returns current commit hash.
pub fn commit() -> &'static str {
    option_env!("FOLIO_COMMIT_HASH").unwrap_or("hash-undefined")
}

/// Returns build time.
pub fn build_time() -> &'static str {
    BUILD_TIME
}

/// Layout of the index files this build reads and writes.
/// Files written with a different header size or handle width can't be opened.
pub fn disk_format() -> String {
    let handle_bits = std::mem::size_of::<Handle>() * 8;
    match IndexHeader::serialized_size_default() {
        Ok(header) => format!("{}-byte header, {}-bit handles", header, handle_bits),
        Err(e) => format!("unknown header size ({}), {}-bit handles", e, handle_bits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_info_names_the_crate() {
        let info = build_info();
        assert!(info.starts_with("folio "));
        assert!(info.contains(version()));
    }

    #[test]
    fn disk_format_matches_file_layout() {
        assert_eq!(disk_format(), "16-byte header, 32-bit handles");
        assert!(build_info().ends_with("format: 16-byte header, 32-bit handles)"));
    }
}
