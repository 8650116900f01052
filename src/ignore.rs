//! ignore rules for working-tree scans
//!
//! read once per scan from `<worktree>/.bvc-ignore`; one glob per line,
//! `#` comments and blank lines skipped. static defaults always cover the
//! repository directory and the pointer file; the ignore file itself stays
//! trackable. matching runs against the
//! repo-relative forward-slash path with literal separators, so `*` stays
//! inside one segment and `**` spans whole segments.

use glob::{MatchOptions, Pattern};

use crate::error::{Error, Result};
use crate::repo::Repo;

pub struct IgnoreRules {
    patterns: Vec<Pattern>,
}

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

impl IgnoreRules {
    /// static defaults plus the patterns from the ignore file, if present
    pub fn load(repo: &Repo) -> Result<Self> {
        let mut lines = vec![
            repo.config().repo_dir.clone(),
            format!("{}/**", repo.config().repo_dir),
            repo.config().pointer_file.clone(),
        ];

        let path = repo.ignore_path();
        if repo.fs().exists(&path) {
            let content = repo.fs().read(&path)?;
            for line in String::from_utf8_lossy(&content).lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                lines.push(line.to_string());
            }
        }

        let mut patterns = Vec::with_capacity(lines.len());
        for line in lines {
            let pattern = Pattern::new(&line).map_err(|e| Error::IgnorePattern {
                pattern: line.clone(),
                message: e.to_string(),
            })?;
            patterns.push(pattern);
        }
        Ok(Self { patterns })
    }

    /// does any rule match this repo-relative path
    pub fn matches(&self, rel_path: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_with(rel_path, MATCH_OPTIONS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::vfs::{MemoryVfs, Vfs};
    use std::path::Path;
    use std::sync::Arc;

    fn repo_with_ignore(content: &str) -> Repo {
        let fs = MemoryVfs::new();
        fs.create_dir_all(Path::new("/work")).unwrap();
        let repo =
            Repo::init_with(Path::new("/work"), Arc::new(fs), Config::new()).unwrap();
        repo.fs()
            .write(Path::new("/work/.bvc-ignore"), content.as_bytes())
            .unwrap();
        repo
    }

    #[test]
    fn test_defaults_cover_repo_dir_and_pointer() {
        let repo = repo_with_ignore("");
        let rules = IgnoreRules::load(&repo).unwrap();
        assert!(rules.matches(".bvc"));
        assert!(rules.matches(".bvc/objects/abc.bin"));
        assert!(rules.matches(".bvc-pointer"));
        assert!(!rules.matches(".bvc-ignore"));
        assert!(!rules.matches("src/main.rs"));
    }

    #[test]
    fn test_star_stays_in_segment() {
        let repo = repo_with_ignore("*.log\n");
        let rules = IgnoreRules::load(&repo).unwrap();
        assert!(rules.matches("debug.log"));
        assert!(!rules.matches("logs/debug.log"));
    }

    #[test]
    fn test_double_star_spans_segments() {
        let repo = repo_with_ignore("build/**\n");
        let rules = IgnoreRules::load(&repo).unwrap();
        assert!(rules.matches("build/a"));
        assert!(rules.matches("build/deep/nested/file"));
        assert!(!rules.matches("src/build.rs"));
    }

    #[test]
    fn test_question_mark() {
        let repo = repo_with_ignore("file?.txt\n");
        let rules = IgnoreRules::load(&repo).unwrap();
        assert!(rules.matches("file1.txt"));
        assert!(!rules.matches("file10.txt"));
    }

    #[test]
    fn test_comments_and_blanks_skipped() {
        let repo = repo_with_ignore("# comment\n\n*.tmp\n");
        let rules = IgnoreRules::load(&repo).unwrap();
        assert!(rules.matches("x.tmp"));
        assert!(!rules.matches("# comment"));
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        let repo = repo_with_ignore("[unclosed\n");
        assert!(matches!(
            IgnoreRules::load(&repo),
            Err(Error::IgnorePattern { .. })
        ));
    }
}
