use std::fs::{self, File};
use std::path::Path;

use super::{DirEntry, FileInfo, ReadSeek, TempFile, TempWrite, Vfs};
use crate::error::{Error, IoResultExt, Result};

impl TempWrite for File {
    fn sync(&mut self) -> std::io::Result<()> {
        self.sync_all()
    }
}

/// [`Vfs`] backed by the real filesystem
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalVfs;

impl LocalVfs {
    pub fn new() -> Self {
        Self
    }
}

impl Vfs for LocalVfs {
    fn open(&self, path: &Path) -> Result<Box<dyn ReadSeek>> {
        let file = File::open(path).with_path(path)?;
        Ok(Box::new(file))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).with_path(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        fs::write(path, data).with_path(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_path(path)
    }

    fn remove(&self, path: &Path) -> Result<()> {
        let meta = fs::symlink_metadata(path).with_path(path)?;
        if meta.is_dir() {
            fs::remove_dir(path).with_path(path)
        } else {
            fs::remove_file(path).with_path(path)
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).with_path(from)
    }

    fn metadata(&self, path: &Path) -> Result<FileInfo> {
        let meta = fs::metadata(path).with_path(path)?;
        Ok(FileInfo {
            size: meta.len(),
            is_dir: meta.is_dir(),
            modified: meta.modified().with_path(path)?,
        })
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path).with_path(path)? {
            let entry = entry.with_path(path)?;
            let file_type = entry.file_type().with_path(entry.path())?;
            entries.push(DirEntry {
                path: entry.path(),
                file_name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: file_type.is_dir(),
            });
        }
        Ok(entries)
    }

    fn create_temp(&self, dir: &Path, prefix: &str) -> Result<TempFile> {
        if !dir.is_dir() {
            return Err(Error::Io {
                path: dir.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "temp file directory does not exist",
                ),
            });
        }
        let path = dir.join(format!("{}{}", prefix, uuid::Uuid::new_v4()));
        let file = File::create(&path).with_path(&path)?;
        Ok(TempFile {
            path,
            writer: Box::new(file),
        })
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
