//! `PostgreSQL` repository for projects, memberships, teams and configuration.

use super::{
    models::{MembershipRow, ProjectConfigRow, ProjectRow, TeamRow},
    schema::{project_configs, project_memberships, project_teams, projects},
};
use crate::accounts::{GroupId, UserId};
use crate::persistence::PgPool;
use crate::project::{
    domain::{
        Membership, PersistedProjectData, Project, ProjectConfig, ProjectId, ProjectName,
        ProjectSlug, ProjectState, Team, Visibility,
    },
    ports::{ProjectRepository, ProjectRepositoryError, ProjectRepositoryResult},
};
use crate::vcs::{RepositoryRef, VcsAlias};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

const AUTHOR_NAME_INDEX: &str = "idx_projects_author_name";

/// `PostgreSQL`-backed project repository.
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ProjectRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ProjectRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ProjectRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(ProjectRepositoryError::persistence)?
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    async fn store(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let row = project_to_row(project);
        let id = project.id();
        let author = project.author();
        let name = project.name().clone();
        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if is_author_name_violation(info.as_ref()) =>
                    {
                        ProjectRepositoryError::DuplicateName { author, name }
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ProjectRepositoryError::DuplicateProject(id)
                    }
                    _ => ProjectRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, project: &Project) -> ProjectRepositoryResult<()> {
        let row = project_to_row(project);
        let id = project.id();
        self.run_blocking(move |connection| {
            let updated = diesel::update(projects::table.filter(projects::id.eq(id.into_inner())))
                .set(&row)
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            if updated == 0 {
                return Err(ProjectRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ProjectId) -> ProjectRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::id.eq(id.into_inner()))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn find_by_author_and_slug(
        &self,
        author: UserId,
        slug: &ProjectSlug,
    ) -> ProjectRepositoryResult<Option<Project>> {
        let needle = slug.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = projects::table
                .filter(projects::author_id.eq(author.into_inner()))
                .filter(projects::slug.eq(needle))
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn list_tree(&self, root: ProjectId) -> ProjectRepositoryResult<Vec<Project>> {
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::root_id.eq(root.into_inner()))
                .order(projects::created_at.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn list_latest_public(&self, limit: usize) -> ProjectRepositoryResult<Vec<Project>> {
        let row_limit = i64::try_from(limit).map_err(ProjectRepositoryError::persistence)?;
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::visibility.eq(Visibility::Public.as_str()))
                .order(projects::created_at.desc())
                .limit(row_limit)
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn add_membership(&self, membership: &Membership) -> ProjectRepositoryResult<bool> {
        let row = MembershipRow {
            project_id: membership.project_id.into_inner(),
            user_id: membership.user_id.into_inner(),
            joined_at: membership.joined_at,
        };
        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(project_memberships::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn remove_membership(
        &self,
        project: ProjectId,
        user: UserId,
    ) -> ProjectRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                project_memberships::table
                    .filter(project_memberships::project_id.eq(project.into_inner()))
                    .filter(project_memberships::user_id.eq(user.into_inner())),
            )
            .execute(connection)
            .map_err(ProjectRepositoryError::persistence)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_memberships(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Vec<Membership>> {
        self.run_blocking(move |connection| {
            let rows = project_memberships::table
                .filter(project_memberships::project_id.eq(project.into_inner()))
                .order(project_memberships::joined_at.asc())
                .select(MembershipRow::as_select())
                .load::<MembershipRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(rows
                .into_iter()
                .map(|row| Membership {
                    project_id: ProjectId::from_uuid(row.project_id),
                    user_id: UserId::from_uuid(row.user_id),
                    joined_at: row.joined_at,
                })
                .collect())
        })
        .await
    }

    async fn add_team(&self, team: &Team) -> ProjectRepositoryResult<bool> {
        let row = TeamRow {
            project_id: team.project_id.into_inner(),
            group_id: team.group_id.into_inner(),
            created_at: team.created_at,
        };
        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(project_teams::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn remove_team(
        &self,
        project: ProjectId,
        group: GroupId,
    ) -> ProjectRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                project_teams::table
                    .filter(project_teams::project_id.eq(project.into_inner()))
                    .filter(project_teams::group_id.eq(group.into_inner())),
            )
            .execute(connection)
            .map_err(ProjectRepositoryError::persistence)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn list_teams(&self, project: ProjectId) -> ProjectRepositoryResult<Vec<Team>> {
        self.run_blocking(move |connection| {
            let rows = project_teams::table
                .filter(project_teams::project_id.eq(project.into_inner()))
                .order(project_teams::created_at.asc())
                .select(TeamRow::as_select())
                .load::<TeamRow>(connection)
                .map_err(ProjectRepositoryError::persistence)?;
            Ok(rows
                .into_iter()
                .map(|row| Team {
                    project_id: ProjectId::from_uuid(row.project_id),
                    group_id: GroupId::from_uuid(row.group_id),
                    created_at: row.created_at,
                })
                .collect())
        })
        .await
    }

    async fn store_config(&self, config: &ProjectConfig) -> ProjectRepositoryResult<()> {
        let project = config.project_id;
        let row = ProjectConfigRow {
            project_id: project.into_inner(),
            changesets_paginate_by: i32::try_from(config.changesets_paginate_by)
                .map_err(ProjectRepositoryError::persistence)?,
            milestone_deadline_delta_days: i32::try_from(config.milestone_deadline_delta_days)
                .map_err(ProjectRepositoryError::persistence)?,
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(project_configs::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ProjectRepositoryError::ConfigAlreadyExists(project)
                    }
                    _ => ProjectRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_config(
        &self,
        project: ProjectId,
    ) -> ProjectRepositoryResult<Option<ProjectConfig>> {
        self.run_blocking(move |connection| {
            let row = project_configs::table
                .filter(project_configs::project_id.eq(project.into_inner()))
                .select(ProjectConfigRow::as_select())
                .first::<ProjectConfigRow>(connection)
                .optional()
                .map_err(ProjectRepositoryError::persistence)?;
            row.map(row_to_config).transpose()
        })
        .await
    }
}

fn is_author_name_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == AUTHOR_NAME_INDEX)
}

fn project_to_row(project: &Project) -> ProjectRow {
    ProjectRow {
        id: project.id().into_inner(),
        name: project.name().as_str().to_owned(),
        slug: project.slug().as_str().to_owned(),
        description: project.description().to_owned(),
        category: project.category().map(str::to_owned),
        visibility: project.visibility().as_str().to_owned(),
        author_id: project.author().into_inner(),
        parent_id: project.parent().map(ProjectId::into_inner),
        root_id: project.root().into_inner(),
        fork_url: project.fork_url().map(str::to_owned),
        repository_alias: project
            .repository()
            .map(|repository| repository.alias().as_str().to_owned()),
        repository_location: project
            .repository()
            .map(|repository| repository.location().to_owned()),
        state: project.state().code(),
        error_text: project.error_text().map(str::to_owned),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

fn row_to_project(row: ProjectRow) -> ProjectRepositoryResult<Project> {
    let name = ProjectName::new(row.name).map_err(ProjectRepositoryError::persistence)?;
    let visibility = Visibility::try_from(row.visibility.as_str())
        .map_err(ProjectRepositoryError::persistence)?;
    let state = ProjectState::try_from(row.state).map_err(ProjectRepositoryError::persistence)?;
    let repository = match (row.repository_alias, row.repository_location) {
        (Some(code), Some(location)) => {
            let alias =
                VcsAlias::try_from(code.as_str()).map_err(ProjectRepositoryError::persistence)?;
            Some(RepositoryRef::new(alias, location))
        }
        _ => None,
    };
    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        name,
        description: row.description,
        category: row.category,
        visibility,
        author: UserId::from_uuid(row.author_id),
        parent: row.parent_id.map(ProjectId::from_uuid),
        root: ProjectId::from_uuid(row.root_id),
        fork_url: row.fork_url,
        repository,
        state,
        error_text: row.error_text,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn row_to_config(row: ProjectConfigRow) -> ProjectRepositoryResult<ProjectConfig> {
    Ok(ProjectConfig::new(
        ProjectId::from_uuid(row.project_id),
        u32::try_from(row.changesets_paginate_by).map_err(ProjectRepositoryError::persistence)?,
        u32::try_from(row.milestone_deadline_delta_days)
            .map_err(ProjectRepositoryError::persistence)?,
    ))
}
