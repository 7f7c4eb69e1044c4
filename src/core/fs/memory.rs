use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::ResourceFs;

/// In-memory tree for tests. `exists` calls can be held open on a oneshot so
/// tests decide the order in which racing checks settle.
#[derive(Default)]
pub struct MemoryResourceFs {
    root: PathBuf,
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
    holds: Mutex<HashMap<PathBuf, oneshot::Receiver<()>>>,
}

impl MemoryResourceFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    /// Create `logical` (relative to the root) and all its parents.
    pub fn add_dir(&self, logical: impl AsRef<Path>) {
        let full = self.root.join(logical);
        let mut dirs = self.dirs.lock().unwrap();
        for ancestor in full.ancestors() {
            if ancestor == self.root || ancestor.as_os_str().is_empty() {
                break;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    pub fn add_file(&self, logical: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let logical = logical.as_ref();
        if let Some(parent) = logical.parent() {
            self.add_dir(parent);
        }
        self.files
            .lock()
            .unwrap()
            .insert(self.root.join(logical), contents.into());
    }

    /// The next `exists` call for `logical` waits until the returned sender fires.
    pub fn hold_exists(&self, logical: impl AsRef<Path>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds
            .lock()
            .unwrap()
            .insert(self.root.join(logical), rx);
        tx
    }
}

#[async_trait]
impl ResourceFs for MemoryResourceFs {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn exists(&self, path: &Path) -> bool {
        let hold = self.holds.lock().unwrap().remove(path);
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        self.dirs.lock().unwrap().contains(path) || self.files.lock().unwrap().contains_key(path)
    }

    async fn read_text_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path:?}")))
    }

    async fn list_dirs(&self, path: &Path) -> io::Result<Vec<String>> {
        let dirs = self.dirs.lock().unwrap();
        if !dirs.contains(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("{path:?}")));
        }
        Ok(dirs
            .iter()
            .filter(|dir| dir.parent() == Some(path))
            .filter_map(|dir| dir.file_name())
            .map(|name| name.to_string_lossy().to_string())
            .collect())
    }

    fn servable_location(&self, path: &Path) -> String {
        format!("memory://{}", path.to_string_lossy())
    }
}
