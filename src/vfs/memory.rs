use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use super::{DirEntry, FileInfo, ReadSeek, TempFile, TempWrite, Vfs};
use crate::error::{Error, Result};

#[derive(Clone)]
struct MemFile {
    data: Vec<u8>,
    modified: SystemTime,
}

#[derive(Default)]
struct State {
    files: BTreeMap<PathBuf, MemFile>,
    dirs: BTreeSet<PathBuf>,
}

/// in-memory [`Vfs`] for tests
///
/// enforces the same contracts as [`super::LocalVfs`]: parents must exist
/// before writes, removing a missing path is an error, renames replace.
#[derive(Clone, Default)]
pub struct MemoryVfs {
    state: Arc<Mutex<State>>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    fn not_found(path: &Path) -> Error {
        Error::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
        }
    }

    fn io_err(path: &Path, kind: io::ErrorKind, msg: &str) -> Error {
        Error::Io {
            path: path.to_path_buf(),
            source: io::Error::new(kind, msg.to_string()),
        }
    }
}

fn parent_exists(state: &State, path: &Path) -> bool {
    match path.parent() {
        None => true,
        Some(p) if p.as_os_str().is_empty() => true,
        Some(p) => state.dirs.contains(p),
    }
}

impl Vfs for MemoryVfs {
    fn open(&self, path: &Path) -> Result<Box<dyn ReadSeek>> {
        let state = self.state.lock().unwrap();
        let file = state.files.get(path).ok_or_else(|| Self::not_found(path))?;
        Ok(Box::new(Cursor::new(file.data.clone())))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let state = self.state.lock().unwrap();
        let file = state.files.get(path).ok_or_else(|| Self::not_found(path))?;
        Ok(file.data.clone())
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !parent_exists(&state, path) {
            return Err(Self::not_found(path));
        }
        state.files.insert(
            path.to_path_buf(),
            MemFile {
                data: data.to_vec(),
                modified: SystemTime::now(),
            },
        );
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            state.dirs.insert(current.clone());
        }
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.files.remove(path).is_some() {
            return Ok(());
        }
        if state.dirs.contains(path) {
            let has_children = state.files.keys().any(|p| p.parent() == Some(path))
                || state.dirs.iter().any(|p| p.parent() == Some(path));
            if has_children {
                return Err(Self::io_err(
                    path,
                    io::ErrorKind::Other,
                    "directory not empty",
                ));
            }
            state.dirs.remove(path);
            return Ok(());
        }
        Err(Self::not_found(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !parent_exists(&state, to) {
            return Err(Self::not_found(to));
        }
        if let Some(file) = state.files.remove(from) {
            state.files.insert(to.to_path_buf(), file);
            return Ok(());
        }
        if state.dirs.contains(from) {
            // move the directory and everything under it
            let moved_files: Vec<(PathBuf, MemFile)> = state
                .files
                .iter()
                .filter_map(|(p, f)| {
                    let rel = p.strip_prefix(from).ok()?;
                    Some((to.join(rel), f.clone()))
                })
                .collect();
            let moved_dirs: Vec<PathBuf> = state
                .dirs
                .iter()
                .filter_map(|p| p.strip_prefix(from).ok().map(|rel| to.join(rel)))
                .collect();
            state.files.retain(|p, _| !p.starts_with(from));
            state.dirs.retain(|p| !p.starts_with(from));
            state.files.extend(moved_files);
            state.dirs.extend(moved_dirs);
            return Ok(());
        }
        Err(Self::not_found(from))
    }

    fn metadata(&self, path: &Path) -> Result<FileInfo> {
        let state = self.state.lock().unwrap();
        if let Some(file) = state.files.get(path) {
            return Ok(FileInfo {
                size: file.data.len() as u64,
                is_dir: false,
                modified: file.modified,
            });
        }
        if state.dirs.contains(path) {
            return Ok(FileInfo {
                size: 0,
                is_dir: true,
                modified: SystemTime::UNIX_EPOCH,
            });
        }
        Err(Self::not_found(path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let state = self.state.lock().unwrap();
        if !state.dirs.contains(path) {
            return Err(Self::not_found(path));
        }
        let name_of = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let mut entries = Vec::new();
        for p in state.files.keys() {
            if p.parent() == Some(path) {
                entries.push(DirEntry {
                    path: p.clone(),
                    file_name: name_of(p),
                    is_dir: false,
                });
            }
        }
        for p in state.dirs.iter() {
            if p.parent() == Some(path) {
                entries.push(DirEntry {
                    path: p.clone(),
                    file_name: name_of(p),
                    is_dir: true,
                });
            }
        }
        Ok(entries)
    }

    fn create_temp(&self, dir: &Path, prefix: &str) -> Result<TempFile> {
        let path = dir.join(format!("{}{}", prefix, uuid::Uuid::new_v4()));
        {
            let mut state = self.state.lock().unwrap();
            if !state.dirs.contains(dir) {
                return Err(Self::not_found(dir));
            }
            state.files.insert(
                path.clone(),
                MemFile {
                    data: Vec::new(),
                    modified: SystemTime::now(),
                },
            );
        }
        Ok(TempFile {
            path: path.clone(),
            writer: Box::new(MemWriter {
                state: Arc::clone(&self.state),
                path,
            }),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state.lock().unwrap().dirs.contains(path)
    }
}

/// appends into the backing map; the entry is created by `create_temp`
struct MemWriter {
    state: Arc<Mutex<State>>,
    path: PathBuf,
}

impl Write for MemWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.state.lock().unwrap();
        let file = state
            .files
            .get_mut(&self.path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "temp file removed"))?;
        file.data.extend_from_slice(buf);
        file.modified = SystemTime::now();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl TempWrite for MemWriter {
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}
