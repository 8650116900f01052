use std::io::Write;
use std::path::{Component, Path};

use serde::Serialize;

use crate::error::Result;
use crate::vfs::{TempWrite, Vfs};

/// normalize a path to the stored form: forward-slash, cleaned, relative
///
/// `.` components are dropped and `..` is resolved lexically. applied at
/// every boundary so two encodings of the same path never coexist in a
/// record.
pub fn clean_path(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    parts.join("/")
}

/// marshal a record as JSON and write it atomically: temp file in the target
/// directory, synced, then renamed. the temp file is removed on any earlier
/// failure.
pub fn write_json_atomic<T: Serialize>(fs: &dyn Vfs, path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)?;
    let dir = path.parent().unwrap_or_else(|| Path::new(""));

    let mut tmp = fs.create_temp(dir, ".tmp-")?;
    let written = tmp
        .writer
        .write_all(&data)
        .and_then(|_| tmp.writer.flush())
        .and_then(|_| tmp.writer.sync());
    drop(tmp.writer);

    if let Err(source) = written {
        let _ = fs.remove(&tmp.path);
        return Err(crate::Error::Io {
            path: tmp.path,
            source,
        });
    }

    if let Err(e) = fs.rename(&tmp.path, path) {
        let _ = fs.remove(&tmp.path);
        return Err(e);
    }
    Ok(())
}
