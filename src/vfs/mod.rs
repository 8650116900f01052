//! filesystem abstraction the whole core routes through
//!
//! exactly one injection seam: [`Vfs`]. the real implementation is
//! [`LocalVfs`]; [`MemoryVfs`] backs the unit tests so every layer above can
//! run without touching the disk.

mod local;
mod memory;

use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use local::LocalVfs;
pub use memory::MemoryVfs;

use crate::error::Result;

/// readable + seekable handle returned by [`Vfs::open`]
pub trait ReadSeek: Read + Seek + Send {}
impl<T: Read + Seek + Send> ReadSeek for T {}

/// file metadata as reported by [`Vfs::metadata`]
#[derive(Clone, Copy, Debug)]
pub struct FileInfo {
    pub size: u64,
    pub is_dir: bool,
    pub modified: SystemTime,
}

/// one directory entry from [`Vfs::read_dir`]; order is unspecified
#[derive(Clone, Debug)]
pub struct DirEntry {
    pub path: PathBuf,
    pub file_name: String,
    pub is_dir: bool,
}

/// writer half of a [`TempFile`]
pub trait TempWrite: Write + Send {
    /// push buffered bytes to stable storage before the rename; backends
    /// without an os cache make this a no-op
    fn sync(&mut self) -> std::io::Result<()>;
}

/// a uniquely named temp file; the caller renames it into place or removes it
pub struct TempFile {
    pub path: PathBuf,
    pub writer: Box<dyn TempWrite>,
}

/// uniform capability set over the underlying filesystem
pub trait Vfs: Send + Sync {
    /// open a file for reading; NotFound if absent
    fn open(&self, path: &Path) -> Result<Box<dyn ReadSeek>>;

    /// load a whole file
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// replace a file; the parent directory must exist
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// create a directory and all missing ancestors; idempotent
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// remove a file or empty directory; a missing target is an error
    fn remove(&self, path: &Path) -> Result<()>;

    /// atomically rename; the parent of `to` must exist
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// size, kind and mtime
    fn metadata(&self, path: &Path) -> Result<FileInfo>;

    /// directory entries, order unspecified
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;

    /// create a uniquely named file in `dir` whose name starts with `prefix`
    fn create_temp(&self, dir: &Path, prefix: &str) -> Result<TempFile>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // both implementations must satisfy the same contracts
    fn impls() -> Vec<(Box<dyn Vfs>, PathBuf, Option<tempfile::TempDir>)> {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        vec![
            (Box::new(LocalVfs::new()) as Box<dyn Vfs>, root, Some(dir)),
            (Box::new(MemoryVfs::new()), PathBuf::from("/mem"), None),
        ]
    }

    #[test]
    fn test_write_requires_parent() {
        for (fs, root, _guard) in impls() {
            fs.create_dir_all(&root).unwrap();
            let missing = root.join("no/such/parent/file.txt");
            assert!(fs.write(&missing, b"x").is_err());
        }
    }

    #[test]
    fn test_roundtrip_and_stat() {
        for (fs, root, _guard) in impls() {
            fs.create_dir_all(&root).unwrap();
            let p = root.join("a.txt");
            fs.write(&p, b"hello").unwrap();
            assert_eq!(fs.read(&p).unwrap(), b"hello");
            let info = fs.metadata(&p).unwrap();
            assert_eq!(info.size, 5);
            assert!(!info.is_dir);
            assert!(fs.exists(&p));
            assert!(!fs.is_dir(&p));
            assert!(fs.is_dir(&root));
        }
    }

    #[test]
    fn test_remove_missing_is_error() {
        for (fs, root, _guard) in impls() {
            fs.create_dir_all(&root).unwrap();
            let err = fs.remove(&root.join("ghost")).unwrap_err();
            assert!(err.is_not_found());
        }
    }

    #[test]
    fn test_rename_replaces() {
        for (fs, root, _guard) in impls() {
            fs.create_dir_all(&root).unwrap();
            let a = root.join("a");
            let b = root.join("b");
            fs.write(&a, b"one").unwrap();
            fs.write(&b, b"two").unwrap();
            fs.rename(&a, &b).unwrap();
            assert!(!fs.exists(&a));
            assert_eq!(fs.read(&b).unwrap(), b"one");
        }
    }

    #[test]
    fn test_read_dir_lists_children() {
        for (fs, root, _guard) in impls() {
            fs.create_dir_all(&root.join("sub")).unwrap();
            fs.write(&root.join("f1"), b"1").unwrap();
            fs.write(&root.join("sub/f2"), b"2").unwrap();
            let mut names: Vec<String> = fs
                .read_dir(&root)
                .unwrap()
                .into_iter()
                .map(|e| e.file_name)
                .collect();
            names.sort();
            assert_eq!(names, vec!["f1", "sub"]);
        }
    }

    #[test]
    fn test_temp_file_then_rename() {
        for (fs, root, _guard) in impls() {
            fs.create_dir_all(&root).unwrap();
            let mut tmp = fs.create_temp(&root, ".tmp-").unwrap();
            tmp.writer.write_all(b"payload").unwrap();
            tmp.writer.flush().unwrap();
            tmp.writer.sync().unwrap();
            drop(tmp.writer);
            assert!(tmp
                .path
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(".tmp-"));
            let dest = root.join("final");
            fs.rename(&tmp.path, &dest).unwrap();
            assert_eq!(fs.read(&dest).unwrap(), b"payload");
        }
    }

    #[test]
    fn test_open_seek_read() {
        use std::io::SeekFrom;
        for (fs, root, _guard) in impls() {
            fs.create_dir_all(&root).unwrap();
            let p = root.join("seekable");
            fs.write(&p, b"0123456789").unwrap();
            let mut h = fs.open(&p).unwrap();
            h.seek(SeekFrom::Start(4)).unwrap();
            let mut buf = [0u8; 3];
            h.read_exact(&mut buf).unwrap();
            assert_eq!(&buf, b"456");
        }
    }

    #[test]
    fn test_open_missing() {
        for (fs, root, _guard) in impls() {
            fs.create_dir_all(&root).unwrap();
            let err = fs.open(&root.join("nope")).err().unwrap();
            assert!(err.is_not_found());
        }
    }
}
