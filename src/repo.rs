use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::vfs::{LocalVfs, Vfs};

/// a bvc repository: a working tree plus the repo directory inside it
///
/// the repo directory defaults to `<worktree>/.bvc`; a `.bvc-pointer` file
/// in the working tree redirects it elsewhere (its content is the real
/// repository path).
pub struct Repo {
    worktree: PathBuf,
    repo_path: PathBuf,
    config: Config,
    fs: Arc<dyn Vfs>,
}

impl Repo {
    /// initialize (or re-open) a repository under `worktree` on the real
    /// filesystem
    pub fn init(worktree: &Path) -> Result<Self> {
        Self::init_with(worktree, Arc::new(LocalVfs::new()), Config::new())
    }

    /// open an existing repository under `worktree` on the real filesystem
    pub fn open(worktree: &Path) -> Result<Self> {
        Self::open_with(worktree, Arc::new(LocalVfs::new()), Config::new())
    }

    /// initialize with an injected filesystem and configuration
    ///
    /// idempotent: when HEAD already exists this is a re-init and touches
    /// nothing.
    pub fn init_with(worktree: &Path, fs: Arc<dyn Vfs>, config: Config) -> Result<Self> {
        let repo_path = resolve_repo_path(worktree, fs.as_ref(), &config)?;
        let head = repo_path.join("HEAD");

        if fs.exists(&head) {
            debug!(repo = %repo_path.display(), "re-init of existing repository");
            return Ok(Self {
                worktree: worktree.to_path_buf(),
                repo_path,
                config,
                fs,
            });
        }

        for dir in ["commits", "filesets", "branches", "objects"] {
            fs.create_dir_all(&repo_path.join(dir))?;
        }

        // unborn default branch: the file exists, its content is empty
        fs.write(
            &repo_path.join("branches").join(&config.default_branch),
            b"",
        )?;
        fs.write(
            &head,
            format!("ref: branches/{}", config.default_branch).as_bytes(),
        )?;
        debug!(repo = %repo_path.display(), branch = %config.default_branch, "initialized repository");

        Ok(Self {
            worktree: worktree.to_path_buf(),
            repo_path,
            config,
            fs,
        })
    }

    /// open with an injected filesystem and configuration; fails with
    /// [`Error::NoRepo`] when HEAD is absent
    pub fn open_with(worktree: &Path, fs: Arc<dyn Vfs>, config: Config) -> Result<Self> {
        let repo_path = resolve_repo_path(worktree, fs.as_ref(), &config)?;
        if !fs.exists(&repo_path.join("HEAD")) {
            return Err(Error::NoRepo(repo_path));
        }
        Ok(Self {
            worktree: worktree.to_path_buf(),
            repo_path,
            config,
            fs,
        })
    }

    /// working tree root
    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    /// repository directory
    pub fn path(&self) -> &Path {
        &self.repo_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fs(&self) -> &dyn Vfs {
        self.fs.as_ref()
    }

    pub fn head_path(&self) -> PathBuf {
        self.repo_path.join("HEAD")
    }

    pub fn branches_path(&self) -> PathBuf {
        self.repo_path.join("branches")
    }

    pub fn branch_path(&self, name: &str) -> PathBuf {
        self.branches_path().join(name)
    }

    pub fn commits_path(&self) -> PathBuf {
        self.repo_path.join("commits")
    }

    pub fn filesets_path(&self) -> PathBuf {
        self.repo_path.join("filesets")
    }

    pub fn objects_path(&self) -> PathBuf {
        self.repo_path.join("objects")
    }

    pub fn index_path(&self) -> PathBuf {
        self.repo_path.join("index.json")
    }

    /// ignore file in the working tree
    pub fn ignore_path(&self) -> PathBuf {
        self.worktree.join(&self.config.ignore_file)
    }

    /// absolute path of a repo-relative file
    pub fn worktree_file(&self, rel: &str) -> PathBuf {
        self.worktree.join(rel)
    }
}

/// follow the pointer file if present, else use the configured repo dir
fn resolve_repo_path(worktree: &Path, fs: &dyn Vfs, config: &Config) -> Result<PathBuf> {
    let pointer = worktree.join(&config.pointer_file);
    if fs.exists(&pointer) {
        let content = fs.read(&pointer)?;
        let target = String::from_utf8_lossy(&content).trim().to_string();
        if !target.is_empty() {
            return Ok(PathBuf::from(target));
        }
    }
    Ok(worktree.join(&config.repo_dir))
}
