//! `PostgreSQL` repository for workflow entities.

use super::{
    models::{ComponentRow, LabelRow, MilestoneRow, StatusRow, TransitionRow},
    schema::{components, labels, milestones, statuses, transitions},
};
use crate::persistence::{PgPool, lower};
use crate::project::domain::ProjectId;
use crate::tracker::{
    domain::{
        Component, ComponentId, Label, LabelId, LabelKind, Milestone, MilestoneId, Status,
        StatusId, Transition,
    },
    ports::{WorkflowRepository, WorkflowRepositoryError, WorkflowRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed workflow repository.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowRepository {
    pool: PgPool,
}

impl PostgresWorkflowRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> WorkflowRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> WorkflowRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(WorkflowRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(WorkflowRepositoryError::persistence)?
    }
}

fn insert_error(
    entity: &'static str,
    project: ProjectId,
    name: String,
) -> impl FnOnce(DieselError) -> WorkflowRepositoryError {
    move |err| match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            WorkflowRepositoryError::DuplicateName {
                entity,
                project,
                name,
            }
        }
        _ => WorkflowRepositoryError::persistence(err),
    }
}

#[async_trait]
impl WorkflowRepository for PostgresWorkflowRepository {
    async fn insert_status(&self, status: &Status) -> WorkflowRepositoryResult<()> {
        let row = status_to_row(status);
        let on_error = insert_error("status", status.project_id, status.name.clone());
        self.run_blocking(move |connection| {
            diesel::insert_into(statuses::table)
                .values(&row)
                .execute(connection)
                .map_err(on_error)?;
            Ok(())
        })
        .await
    }

    async fn find_status(&self, id: StatusId) -> WorkflowRepositoryResult<Option<Status>> {
        self.run_blocking(move |connection| {
            let row = statuses::table
                .filter(statuses::id.eq(id.into_inner()))
                .select(StatusRow::as_select())
                .first::<StatusRow>(connection)
                .optional()
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(row.map(row_to_status))
        })
        .await
    }

    async fn find_status_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Status>> {
        let needle = name.trim().to_lowercase();
        self.run_blocking(move |connection| {
            let row = statuses::table
                .filter(statuses::project_id.eq(project.into_inner()))
                .filter(lower(statuses::name).eq(needle))
                .select(StatusRow::as_select())
                .first::<StatusRow>(connection)
                .optional()
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(row.map(row_to_status))
        })
        .await
    }

    async fn list_statuses(&self, project: ProjectId) -> WorkflowRepositoryResult<Vec<Status>> {
        self.run_blocking(move |connection| {
            let rows = statuses::table
                .filter(statuses::project_id.eq(project.into_inner()))
                .order((statuses::position.asc(), statuses::name.asc()))
                .select(StatusRow::as_select())
                .load::<StatusRow>(connection)
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_status).collect())
        })
        .await
    }

    async fn delete_status(&self, id: StatusId) -> WorkflowRepositoryResult<bool> {
        let status_id = id.into_inner();
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    diesel::delete(
                        transitions::table.filter(
                            transitions::source_id
                                .eq(status_id)
                                .or(transitions::destination_id.eq(status_id)),
                        ),
                    )
                    .execute(tx)?;
                    let removed = diesel::delete(statuses::table.filter(statuses::id.eq(status_id)))
                        .execute(tx)?;
                    Ok(removed > 0)
                })
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        WorkflowRepositoryError::StatusInUse(id)
                    }
                    _ => WorkflowRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn insert_transition(&self, transition: Transition) -> WorkflowRepositoryResult<bool> {
        let row = transition_to_row(transition);
        self.run_blocking(move |connection| {
            let inserted = diesel::insert_into(transitions::table)
                .values(&row)
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(inserted > 0)
        })
        .await
    }

    async fn delete_transition(&self, transition: Transition) -> WorkflowRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                transitions::table
                    .filter(transitions::source_id.eq(transition.source.into_inner()))
                    .filter(transitions::destination_id.eq(transition.destination.into_inner())),
            )
            .execute(connection)
            .map_err(WorkflowRepositoryError::persistence)?;
            Ok(removed > 0)
        })
        .await
    }

    async fn transition_exists(&self, transition: Transition) -> WorkflowRepositoryResult<bool> {
        self.run_blocking(move |connection| {
            let found = transitions::table
                .filter(transitions::source_id.eq(transition.source.into_inner()))
                .filter(transitions::destination_id.eq(transition.destination.into_inner()))
                .select(TransitionRow::as_select())
                .first::<TransitionRow>(connection)
                .optional()
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(found.is_some())
        })
        .await
    }

    async fn list_transitions(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Transition>> {
        self.run_blocking(move |connection| {
            let project_statuses = statuses::table
                .filter(statuses::project_id.eq(project.into_inner()))
                .select(statuses::id);
            let rows = transitions::table
                .filter(transitions::source_id.eq_any(project_statuses))
                .select(TransitionRow::as_select())
                .load::<TransitionRow>(connection)
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(rows
                .into_iter()
                .map(|row| {
                    Transition::new(
                        StatusId::from_uuid(row.source_id),
                        StatusId::from_uuid(row.destination_id),
                    )
                })
                .collect())
        })
        .await
    }

    async fn insert_component(&self, component: &Component) -> WorkflowRepositoryResult<()> {
        let row = ComponentRow {
            id: component.id.into_inner(),
            project_id: component.project_id.into_inner(),
            name: component.name.clone(),
            description: component.description.clone(),
        };
        let on_error = insert_error("component", component.project_id, component.name.clone());
        self.run_blocking(move |connection| {
            diesel::insert_into(components::table)
                .values(&row)
                .execute(connection)
                .map_err(on_error)?;
            Ok(())
        })
        .await
    }

    async fn find_component_by_name(
        &self,
        project: ProjectId,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Component>> {
        let needle = name.trim().to_lowercase();
        self.run_blocking(move |connection| {
            let row = components::table
                .filter(components::project_id.eq(project.into_inner()))
                .filter(lower(components::name).eq(needle))
                .select(ComponentRow::as_select())
                .first::<ComponentRow>(connection)
                .optional()
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(row.map(row_to_component))
        })
        .await
    }

    async fn list_components(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Component>> {
        self.run_blocking(move |connection| {
            let rows = components::table
                .filter(components::project_id.eq(project.into_inner()))
                .order(components::name.asc())
                .select(ComponentRow::as_select())
                .load::<ComponentRow>(connection)
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_component).collect())
        })
        .await
    }

    async fn insert_label(&self, label: &Label) -> WorkflowRepositoryResult<()> {
        let row = LabelRow {
            id: label.id.into_inner(),
            project_id: label.project_id.into_inner(),
            kind: label.kind.as_str().to_owned(),
            name: label.name.clone(),
            position: label.order,
        };
        let entity = match label.kind {
            LabelKind::TaskType => "task type",
            LabelKind::Priority => "priority",
        };
        let on_error = insert_error(entity, label.project_id, label.name.clone());
        self.run_blocking(move |connection| {
            diesel::insert_into(labels::table)
                .values(&row)
                .execute(connection)
                .map_err(on_error)?;
            Ok(())
        })
        .await
    }

    async fn find_label_by_name(
        &self,
        project: ProjectId,
        kind: LabelKind,
        name: &str,
    ) -> WorkflowRepositoryResult<Option<Label>> {
        let needle = name.trim().to_lowercase();
        self.run_blocking(move |connection| {
            let row = labels::table
                .filter(labels::project_id.eq(project.into_inner()))
                .filter(labels::kind.eq(kind.as_str()))
                .filter(lower(labels::name).eq(needle))
                .select(LabelRow::as_select())
                .first::<LabelRow>(connection)
                .optional()
                .map_err(WorkflowRepositoryError::persistence)?;
            row.map(row_to_label).transpose()
        })
        .await
    }

    async fn list_labels(
        &self,
        project: ProjectId,
        kind: LabelKind,
    ) -> WorkflowRepositoryResult<Vec<Label>> {
        self.run_blocking(move |connection| {
            let rows = labels::table
                .filter(labels::project_id.eq(project.into_inner()))
                .filter(labels::kind.eq(kind.as_str()))
                .order((labels::position.asc(), labels::name.asc()))
                .select(LabelRow::as_select())
                .load::<LabelRow>(connection)
                .map_err(WorkflowRepositoryError::persistence)?;
            rows.into_iter().map(row_to_label).collect()
        })
        .await
    }

    async fn insert_milestone(&self, milestone: &Milestone) -> WorkflowRepositoryResult<()> {
        let row = milestone_to_row(milestone);
        let on_error = insert_error("milestone", milestone.project_id, milestone.name.clone());
        self.run_blocking(move |connection| {
            diesel::insert_into(milestones::table)
                .values(&row)
                .execute(connection)
                .map_err(on_error)?;
            Ok(())
        })
        .await
    }

    async fn update_milestone(&self, milestone: &Milestone) -> WorkflowRepositoryResult<()> {
        let row = milestone_to_row(milestone);
        let milestone_id = milestone.id;
        self.run_blocking(move |connection| {
            let updated = diesel::update(milestones::table.filter(milestones::id.eq(row.id)))
                .set(&row)
                .execute(connection)
                .map_err(WorkflowRepositoryError::persistence)?;
            if updated == 0 {
                return Err(WorkflowRepositoryError::MilestoneNotFound(milestone_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_milestone(
        &self,
        id: MilestoneId,
    ) -> WorkflowRepositoryResult<Option<Milestone>> {
        self.run_blocking(move |connection| {
            let row = milestones::table
                .filter(milestones::id.eq(id.into_inner()))
                .select(MilestoneRow::as_select())
                .first::<MilestoneRow>(connection)
                .optional()
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(row.map(row_to_milestone))
        })
        .await
    }

    async fn list_milestones(
        &self,
        project: ProjectId,
    ) -> WorkflowRepositoryResult<Vec<Milestone>> {
        self.run_blocking(move |connection| {
            let rows = milestones::table
                .filter(milestones::project_id.eq(project.into_inner()))
                .order((milestones::deadline.asc(), milestones::name.asc()))
                .select(MilestoneRow::as_select())
                .load::<MilestoneRow>(connection)
                .map_err(WorkflowRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_milestone).collect())
        })
        .await
    }
}

fn status_to_row(status: &Status) -> StatusRow {
    StatusRow {
        id: status.id.into_inner(),
        project_id: status.project_id.into_inner(),
        name: status.name.clone(),
        position: status.order,
        is_resolved: status.is_resolved,
        is_initial: status.is_initial,
    }
}

fn row_to_status(row: StatusRow) -> Status {
    Status {
        id: StatusId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        name: row.name,
        order: row.position,
        is_resolved: row.is_resolved,
        is_initial: row.is_initial,
    }
}

const fn transition_to_row(transition: Transition) -> TransitionRow {
    TransitionRow {
        source_id: transition.source.into_inner(),
        destination_id: transition.destination.into_inner(),
    }
}

fn row_to_component(row: ComponentRow) -> Component {
    Component {
        id: ComponentId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        name: row.name,
        description: row.description,
    }
}

fn row_to_label(row: LabelRow) -> WorkflowRepositoryResult<Label> {
    let kind =
        LabelKind::try_from(row.kind.as_str()).map_err(WorkflowRepositoryError::persistence)?;
    Ok(Label {
        id: LabelId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        kind,
        name: row.name,
        order: row.position,
    })
}

fn milestone_to_row(milestone: &Milestone) -> MilestoneRow {
    MilestoneRow {
        id: milestone.id.into_inner(),
        project_id: milestone.project_id.into_inner(),
        name: milestone.name.clone(),
        description: milestone.description.clone(),
        deadline: milestone.deadline,
        completed_on: milestone.completed_on,
        created_at: milestone.created_at,
    }
}

fn row_to_milestone(row: MilestoneRow) -> Milestone {
    Milestone {
        id: MilestoneId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        name: row.name,
        description: row.description,
        deadline: row.deadline,
        completed_on: row.completed_on,
        created_at: row.created_at,
    }
}
