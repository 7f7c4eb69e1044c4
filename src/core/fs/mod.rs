// ─── Filesystem collaborator ───
// Everything the asset layer needs from the disk, behind one trait so tests
// can swap in an in-memory tree.

pub mod local;
#[cfg(test)]
pub mod memory;

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

pub use local::LocalResourceFs;
#[cfg(test)]
pub use memory::MemoryResourceFs;

#[async_trait]
pub trait ResourceFs: Send + Sync {
    /// Directory that logical resource paths are resolved against.
    fn root(&self) -> &Path;

    /// Map a logical path such as `assets/1.0-stable` to its on-disk location.
    fn resolve(&self, logical: &Path) -> PathBuf {
        self.root().join(logical)
    }

    async fn exists(&self, path: &Path) -> bool;

    async fn read_text_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Names of the immediate subdirectories of `path`.
    async fn list_dirs(&self, path: &Path) -> io::Result<Vec<String>>;

    /// Location the webview can load `path` from.
    fn servable_location(&self, path: &Path) -> String;
}
