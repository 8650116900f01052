//! commit DAG traversal
//!
//! every walk carries a visited set: the graph is supposed to be a DAG, but
//! a damaged repository may contain cycles and traversal must still
//! terminate.

use std::collections::{HashSet, VecDeque};

use tracing::warn;

use crate::error::Result;
use crate::object::read_commit;
use crate::refs::read_tip;
use crate::repo::Repo;
use crate::types::Commit;

/// commit ids of a branch, newest first, following `parents[0]` only
///
/// an unreadable record ends the walk instead of failing it, so a
/// partially damaged history stays explorable.
pub fn first_parent_ids(repo: &Repo, branch: &str) -> Result<Vec<String>> {
    let tip = read_tip(repo, branch)?;
    let mut ids = Vec::new();
    let mut visited = HashSet::new();
    let mut current = tip;

    while !current.is_empty() && visited.insert(current.clone()) {
        ids.push(current.clone());
        match read_commit(repo, &current) {
            Ok(commit) => {
                current = commit.parents.first().cloned().unwrap_or_default();
            }
            Err(e) => {
                warn!(id = %current, error = %e, "history walk stopped at unreadable commit");
                break;
            }
        }
    }
    Ok(ids)
}

/// loaded commit records of a branch, newest first
pub fn commits_for_branch(repo: &Repo, branch: &str) -> Result<Vec<Commit>> {
    let mut commits = Vec::new();
    for id in first_parent_ids(repo, branch)? {
        match read_commit(repo, &id) {
            Ok(commit) => commits.push(commit),
            Err(e) => warn!(id = %id, error = %e, "skipping unreadable commit"),
        }
    }
    Ok(commits)
}

/// all ancestor ids of a commit, itself included, across every parent edge
pub fn ancestors(repo: &Repo, id: &str) -> Result<HashSet<String>> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    if !id.is_empty() {
        queue.push_back(id.to_string());
    }

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        match read_commit(repo, &current) {
            Ok(commit) => {
                for parent in commit.parents {
                    if !seen.contains(&parent) {
                        queue.push_back(parent);
                    }
                }
            }
            Err(e) => warn!(id = %current, error = %e, "skipping unreadable commit in ancestry"),
        }
    }
    Ok(seen)
}

/// merge base of two commits: BFS from `them` through ancestors of `us`
///
/// either side being empty yields `None` without error.
pub fn merge_base(repo: &Repo, us: &str, them: &str) -> Result<Option<String>> {
    if us.is_empty() || them.is_empty() {
        return Ok(None);
    }

    let ours = ancestors(repo, us)?;

    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(them.to_string());

    while let Some(current) = queue.pop_front() {
        if !seen.insert(current.clone()) {
            continue;
        }
        if ours.contains(&current) {
            return Ok(Some(current));
        }
        match read_commit(repo, &current) {
            Ok(commit) => {
                for parent in commit.parents {
                    if !seen.contains(&parent) {
                        queue.push_back(parent);
                    }
                }
            }
            Err(e) => warn!(id = %current, error = %e, "skipping unreadable commit in merge base search"),
        }
    }
    Ok(None)
}
