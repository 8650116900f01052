use std::thread;

/// runtime configuration threaded through [`crate::Repo`]
///
/// nothing here is persisted; the on-disk repository layout is fixed.
#[derive(Clone, Debug)]
pub struct Config {
    /// name of the repository directory inside the working tree
    pub repo_dir: String,
    /// name of the optional pointer file redirecting the repository elsewhere
    pub pointer_file: String,
    /// name of the ignore file read at scan time
    pub ignore_file: String,
    /// branch created by `init` and pointed at by the initial HEAD
    pub default_branch: String,
    /// worker count for parallel block operations
    pub workers: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            repo_dir: ".bvc".to_string(),
            pointer_file: ".bvc-pointer".to_string(),
            ignore_file: ".bvc-ignore".to_string(),
            default_branch: "main".to_string(),
            workers: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        }
    }

    /// override the default branch name
    pub fn with_default_branch(mut self, name: impl Into<String>) -> Self {
        self.default_branch = name.into();
        self
    }

    /// override the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = Config::new();
        assert_eq!(c.repo_dir, ".bvc");
        assert_eq!(c.pointer_file, ".bvc-pointer");
        assert_eq!(c.default_branch, "main");
        assert!(c.workers >= 1);
    }

    #[test]
    fn test_builders() {
        let c = Config::new().with_default_branch("trunk").with_workers(0);
        assert_eq!(c.default_branch, "trunk");
        assert_eq!(c.workers, 1);
    }
}
