//! Mapping between a local checkout and index paths
//!
//! The index names files relative to the `src` directory that roots the
//! checkout (`src/net/http/http_stream_parser.cc`). A local path may contain
//! several `src` components, so the outermost one holding a `.git` directory
//! is taken as the root.

use std::path::{Component, Path, PathBuf};

/// Directory name that roots a checkout in the index
const SOURCE_ROOT: &str = "src";

/// Marker identifying the real checkout root among several `src` directories
const ROOT_MARKER: &str = ".git";

/// A local file expressed relative to the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPath {
    /// Local directory containing the `src` root
    pub checkout: PathBuf,
    /// Index-relative path, forward slashes, starting with `src/`
    pub file: String,
}

impl IndexPath {
    /// Map a local file into the index namespace
    pub fn from_local(path: &Path) -> Option<Self> {
        let components: Vec<Component<'_>> = path.components().collect();
        let src_positions: Vec<usize> = components
            .iter()
            .enumerate()
            .filter(|(_, c)| c.as_os_str() == SOURCE_ROOT)
            .map(|(i, _)| i)
            .collect();

        let root = match src_positions.as_slice() {
            [] => return None,
            [only] => *only,
            several => several.iter().copied().find(|&i| {
                let dir: PathBuf = components[..=i].iter().collect();
                dir.join(ROOT_MARKER).is_dir()
            })?,
        };

        let checkout: PathBuf = components[..root].iter().collect();
        let file = components[root..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        Some(Self { checkout, file })
    }

    /// Map an index file back into this checkout
    pub fn to_local(&self, index_file: &str) -> PathBuf {
        index_file
            .split('/')
            .fold(self.checkout.clone(), |path, part| path.join(part))
    }
}
