//! VCS backend that provisions repositories on disk with the `git` and `hg`
//! command-line tools.
//!
//! Repositories are laid out as `<root>/<alias>/<project-id>`. Existence
//! checks and directory creation go through a capability handle on the root
//! directory; only the VCS commands receive absolute paths.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use tokio::process::Command;
use tracing::{debug, info};

use crate::project::domain::ProjectId;
use crate::vcs::{
    domain::{RepositoryRef, VcsAlias},
    ports::{VcsBackend, VcsError, VcsResult},
};

/// Command-line VCS backend rooted at a directory.
#[derive(Debug, Clone)]
pub struct CommandVcsBackend {
    root: Utf8PathBuf,
    git_program: String,
    hg_program: String,
}

impl CommandVcsBackend {
    /// Creates a backend storing repositories under `root`.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            git_program: "git".to_owned(),
            hg_program: "hg".to_owned(),
        }
    }

    /// Overrides the executables used for each backend.
    #[must_use]
    pub fn with_programs(mut self, git: impl Into<String>, hg: impl Into<String>) -> Self {
        self.git_program = git.into();
        self.hg_program = hg.into();
        self
    }

    /// Returns the absolute path a project's repository would occupy.
    #[must_use]
    pub fn repository_path(&self, project: ProjectId, alias: VcsAlias) -> Utf8PathBuf {
        self.root.join(relative_path(project, alias))
    }

    async fn reserve(&self, project: ProjectId, alias: VcsAlias) -> VcsResult<Utf8PathBuf> {
        let root = self.root.clone();
        let relative = relative_path(project, alias);
        let absolute = self.repository_path(project, alias);
        tokio::task::spawn_blocking(move || reserve_blocking(&root, &relative, alias))
            .await
            .map_err(VcsError::backend)??;
        Ok(absolute)
    }

    async fn run(&self, program: &str, args: &[&str]) -> VcsResult<()> {
        let command_line = format!("{program} {}", args.join(" "));
        debug!(command = %command_line, "running vcs command");
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(VcsError::backend)?;
        if output.status.success() {
            return Ok(());
        }
        Err(VcsError::CommandFailed {
            command: command_line,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}

fn relative_path(project: ProjectId, alias: VcsAlias) -> Utf8PathBuf {
    Utf8Path::new(alias.as_str()).join(project.to_string())
}

fn reserve_blocking(root: &Utf8Path, relative: &Utf8Path, alias: VcsAlias) -> VcsResult<()> {
    Dir::create_ambient_dir_all(root, ambient_authority()).map_err(VcsError::backend)?;
    let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(VcsError::backend)?;
    if dir.exists(relative) {
        return Err(VcsError::AlreadyExists(root.join(relative).to_string()));
    }
    dir.create_dir_all(alias.as_str())
        .map_err(VcsError::backend)?;
    Ok(())
}

#[async_trait]
impl VcsBackend for CommandVcsBackend {
    async fn create_repository(
        &self,
        project: ProjectId,
        alias: VcsAlias,
    ) -> VcsResult<RepositoryRef> {
        let path = self.reserve(project, alias).await?;
        match alias {
            VcsAlias::Git => {
                self.run(&self.git_program, &["init", "--bare", "--quiet", path.as_str()])
                    .await?;
            }
            VcsAlias::Mercurial => {
                self.run(&self.hg_program, &["init", path.as_str()]).await?;
            }
        }
        info!(%project, %alias, path = %path, "created repository");
        Ok(RepositoryRef::new(alias, path.as_str()))
    }

    async fn fork_repository(
        &self,
        source: &RepositoryRef,
        project: ProjectId,
    ) -> VcsResult<RepositoryRef> {
        let source_path = Utf8PathBuf::from(source.location());
        if !source_path.exists() {
            return Err(VcsError::SourceMissing(source.clone()));
        }
        let alias = source.alias();
        let path = self.reserve(project, alias).await?;
        match alias {
            VcsAlias::Git => {
                self.run(
                    &self.git_program,
                    &[
                        "clone",
                        "--bare",
                        "--quiet",
                        source_path.as_str(),
                        path.as_str(),
                    ],
                )
                .await?;
            }
            VcsAlias::Mercurial => {
                self.run(
                    &self.hg_program,
                    &["clone", "--noupdate", source_path.as_str(), path.as_str()],
                )
                .await?;
            }
        }
        info!(%project, source = %source, path = %path, "forked repository");
        Ok(RepositoryRef::new(alias, path.as_str()))
    }
}
