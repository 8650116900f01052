//! bvc command line interface

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bvc::ops::{
    add, branch_create, branch_list, checkout, cherry_pick, commit, log, merge, repair, reset,
    shared_blocks, status, verify_stream, ResetMode,
};
use bvc::types::BlockStatus;
use bvc::vfs::{LocalVfs, Vfs};
use bvc::Repo;

#[derive(Parser)]
#[command(name = "bvc")]
#[command(about = "block version control - git-like tracking over a content-addressed block store")]
#[command(version)]
struct Cli {
    /// working tree path
    #[arg(short = 'C', long = "worktree", default_value = ".")]
    worktree: PathBuf,

    /// worker threads for block operations (defaults to the cpu count)
    #[arg(long, env = "BVC_WORKERS")]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// initialize a new repository
    Init,

    /// stage files (all non-ignored files when none are given)
    Add {
        /// paths to stage
        paths: Vec<String>,
    },

    /// commit the staging index
    Commit {
        /// commit message
        #[arg(short, long)]
        message: String,

        /// allow a commit with nothing staged
        #[arg(long)]
        allow_empty: bool,
    },

    /// show first-parent history of the current branch
    Log,

    /// show tracked, staged and ignored files
    Status,

    /// list branches, or create one at the current tip
    Branch {
        /// branch name to create
        name: Option<String>,
    },

    /// switch to a branch, or rewind the current branch to a commit
    Checkout {
        /// branch name or commit id
        target: String,
    },

    /// apply one commit's tree as a new commit on the current branch
    CherryPick {
        /// commit id to pick
        commit: String,
    },

    /// merge a branch into the current one
    Merge {
        /// branch to merge from
        branch: String,
    },

    /// move the current branch tip
    Reset {
        /// target commit id (defaults to the current tip)
        commit: Option<String>,

        /// tip only
        #[arg(long, conflicts_with = "hard")]
        soft: bool,

        /// tip, index and working tree
        #[arg(long)]
        hard: bool,
    },

    /// block store maintenance
    #[command(subcommand)]
    Block(BlockCommands),
}

#[derive(Subcommand)]
enum BlockCommands {
    /// list referenced blocks with their referencing files and branches
    List {
        /// only blocks referenced by branch tips
        #[arg(long)]
        latest: bool,
    },

    /// show blocks shared across files or branches
    Reuse {
        /// only blocks referenced by branch tips
        #[arg(long)]
        latest: bool,
    },

    /// verify every referenced block against its stored bytes
    Scan {
        /// only blocks referenced by branch tips
        #[arg(long)]
        latest: bool,
    },

    /// rebuild damaged or missing blocks from the working tree
    Repair,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> bvc::Result<()> {
    let mut config = bvc::Config::new();
    if let Some(workers) = cli.workers {
        config = config.with_workers(workers);
    }
    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build_global()
    {
        tracing::warn!(error = %e, "could not size the worker pool");
    }
    let fs: Arc<dyn Vfs> = Arc::new(LocalVfs::new());

    if let Commands::Init = cli.command {
        let repo = Repo::init_with(&cli.worktree, fs, config)?;
        println!("initialized bvc repository at {}", repo.path().display());
        return Ok(());
    }

    let repo = Repo::open_with(&cli.worktree, fs, config)?;
    match cli.command {
        // handled above, before the repository is opened
        Commands::Init => {}

        Commands::Add { paths } => {
            let staged = add(&repo, &paths)?;
            for path in &staged {
                println!("staged {}", path);
            }
            println!("{} file(s) staged", staged.len());
        }

        Commands::Commit {
            message,
            allow_empty,
        } => {
            let commit = commit(&repo, &message, allow_empty)?;
            println!("[{} {}] {}", commit.branch, commit.short_id(), commit.message);
        }

        Commands::Log => {
            for commit in log(&repo)? {
                println!("commit {}", commit.id);
                if commit.is_merge() {
                    println!(
                        "merge: {}",
                        commit
                            .parents
                            .iter()
                            .map(|p| &p[..p.len().min(12)])
                            .collect::<Vec<_>>()
                            .join(" ")
                    );
                }
                println!("date:   {}", commit.timestamp);
                println!();
                println!("    {}", commit.message);
                println!();
            }
        }

        Commands::Status => {
            let st = status(&repo)?;
            println!("on branch {}", st.branch);
            if !st.staged.is_empty() {
                println!("\nstaged:");
                for path in &st.staged {
                    println!("  {}", path);
                }
            }
            if !st.tracked.is_empty() {
                println!("\ntracked:");
                for path in &st.tracked {
                    println!("  {}", path);
                }
            }
            if !st.ignored.is_empty() {
                println!("\nignored:");
                for path in &st.ignored {
                    println!("  {}", path);
                }
            }
        }

        Commands::Branch { name } => match name {
            Some(name) => {
                branch_create(&repo, &name)?;
                println!("created branch {}", name);
            }
            None => {
                for (name, current) in branch_list(&repo)? {
                    println!("{} {}", if current { "*" } else { " " }, name);
                }
            }
        },

        Commands::Checkout { target } => {
            checkout(&repo, &target)?;
            println!("checked out {}", target);
        }

        Commands::CherryPick { commit } => {
            let new = cherry_pick(&repo, &commit)?;
            println!("[{} {}] {}", new.branch, new.short_id(), new.message);
        }

        Commands::Merge { branch } => {
            let outcome = merge(&repo, &branch)?;
            println!(
                "[{} {}] {}",
                outcome.commit.branch,
                outcome.commit.short_id(),
                outcome.commit.message
            );
            if !outcome.conflicts.is_empty() {
                println!("conflicts (ours kept, theirs saved as .MERGE_THEIRS):");
                for path in &outcome.conflicts {
                    println!("  {}", path);
                }
            }
        }

        Commands::Reset { commit, soft, hard } => {
            let mode = if soft {
                ResetMode::Soft
            } else if hard {
                ResetMode::Hard
            } else {
                ResetMode::Mixed
            };
            let target = reset(&repo, mode, commit.as_deref())?;
            println!("reset to {}", target.short_id());
        }

        Commands::Block(block) => match block {
            BlockCommands::List { latest } => {
                verify_stream(&repo, latest, |check| {
                    println!(
                        "{} files=[{}] branches=[{}]",
                        check.hash,
                        check.files.iter().cloned().collect::<Vec<_>>().join(", "),
                        check.branches.iter().cloned().collect::<Vec<_>>().join(", "),
                    );
                    true
                })?;
            }

            BlockCommands::Reuse { latest } => {
                let (total, shared) = shared_blocks(&repo, latest)?;
                for check in &shared {
                    println!(
                        "{} files=[{}] branches=[{}]",
                        check.hash,
                        check.files.iter().cloned().collect::<Vec<_>>().join(", "),
                        check.branches.iter().cloned().collect::<Vec<_>>().join(", "),
                    );
                }
                println!("{} of {} block(s) shared", shared.len(), total);
            }

            BlockCommands::Scan { latest } => {
                let mut bad = 0usize;
                let mut total = 0usize;
                verify_stream(&repo, latest, |check| {
                    total += 1;
                    if check.status != BlockStatus::Ok {
                        bad += 1;
                        println!("{} {}", check.hash, check.status);
                    }
                    true
                })?;
                println!("{} block(s) checked, {} bad", total, bad);
                if bad > 0 {
                    return Err(bvc::Error::IntegrityFailed(bad));
                }
            }

            BlockCommands::Repair => {
                let outcome = repair(&repo)?;
                for check in &outcome.recovered {
                    println!("rebuilt {}", check.hash);
                }
                for check in &outcome.lost {
                    println!("lost {}", check.hash);
                }
                println!(
                    "{} block(s) checked, {} rebuilt, {} lost",
                    outcome.checked,
                    outcome.recovered.len(),
                    outcome.lost.len()
                );
                if let Some(first) = outcome.lost.first() {
                    return Err(bvc::Error::BlockLost { hash: first.hash });
                }
            }
        },
    }

    Ok(())
}
