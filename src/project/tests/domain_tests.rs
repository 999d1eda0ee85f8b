//! Domain tests for project names, checkpoints, forks and states.

use mockable::DefaultClock;
use rstest::{fixture, rstest};

use crate::accounts::{Principal, User};
use crate::project::domain::{
    ForkError, NewProject, Project, ProjectDomainError, ProjectName, ProjectState, Visibility,
    ensure_can_fork,
};
use crate::vcs::{RepositoryRef, VcsAlias};

#[fixture]
fn joe() -> User {
    User::new("joe")
}

fn project(author: &User, visibility: Visibility) -> Project {
    Project::new(
        NewProject {
            name: ProjectName::new("foobar").expect("valid name"),
            description: "Sample project".to_owned(),
            category: Some("tools".to_owned()),
            visibility,
            author: author.id(),
        },
        &DefaultClock,
    )
}

#[rstest]
#[case("Foo Bar", "foo-bar")]
#[case("  spaced_out.name  ", "spaced-out-name")]
#[case("a--b", "a-b")]
#[case("Ünïcode 42!", "ncode-42")]
fn name_slugs(#[case] raw: &str, #[case] expected: &str) {
    let name = ProjectName::new(raw).expect("valid name");
    assert_eq!(name.slug().as_str(), expected);
}

#[rstest]
#[case("", ProjectDomainError::EmptyProjectName)]
#[case("   ", ProjectDomainError::EmptyProjectName)]
#[case("!!!", ProjectDomainError::InvalidProjectName("!!!".to_owned()))]
fn invalid_names_are_rejected(#[case] raw: &str, #[case] expected: ProjectDomainError) {
    assert_eq!(ProjectName::new(raw), Err(expected));
}

#[rstest]
fn overlong_names_are_rejected() {
    let raw = "x".repeat(65);
    assert!(matches!(
        ProjectName::new(raw),
        Err(ProjectDomainError::ProjectNameTooLong(_))
    ));
    assert!(ProjectName::new("x".repeat(64)).is_ok());
}

#[rstest]
fn banned_names_compare_by_slug() {
    let banned = ["admin", "new"];
    let name = ProjectName::new("Admin").expect("valid name");

    assert!(matches!(
        name.ensure_allowed(&banned),
        Err(ProjectDomainError::BannedProjectName(_))
    ));
    assert!(
        ProjectName::new("administration")
            .expect("valid name")
            .ensure_allowed(&banned)
            .is_ok()
    );
}

#[rstest]
fn new_projects_are_pending_roots(joe: User) {
    let created = project(&joe, Visibility::Public);

    assert_eq!(created.state(), ProjectState::Pending);
    assert_eq!(created.root(), created.id());
    assert!(!created.is_fork());
    assert!(created.repository().is_none());
    assert_eq!(created.slug().as_str(), "foobar");
}

#[rstest]
fn checkpoints_never_lower_the_state(joe: User) {
    let mut created = project(&joe, Visibility::Public);

    created
        .checkpoint(ProjectState::WorkflowCreated, &DefaultClock)
        .expect("forward checkpoint");
    created
        .checkpoint(ProjectState::Created, &DefaultClock)
        .expect("earlier checkpoint is accepted");

    assert_eq!(created.state(), ProjectState::WorkflowCreated);
}

#[rstest]
fn failed_projects_reject_checkpoints_until_reset(joe: User) {
    let mut created = project(&joe, Visibility::Public);
    created.fail("disk full", &DefaultClock);

    assert_eq!(created.state(), ProjectState::Error);
    assert_eq!(created.error_text(), Some("disk full"));
    assert_eq!(
        created.checkpoint(ProjectState::Created, &DefaultClock),
        Err(ProjectDomainError::InvalidStateTransition {
            from: ProjectState::Error,
            to: ProjectState::Created,
        })
    );

    created.reset_for_retry(&DefaultClock);
    assert_eq!(created.state(), ProjectState::Pending);
    assert!(created.error_text().is_none());
}

#[rstest]
fn error_is_not_a_checkpoint(joe: User) {
    let mut created = project(&joe, Visibility::Public);

    assert!(
        created
            .checkpoint(ProjectState::Error, &DefaultClock)
            .is_err()
    );
    assert_eq!(created.state(), ProjectState::Pending);
}

#[rstest]
fn repository_attaches_once(joe: User) {
    let mut created = project(&joe, Visibility::Public);
    let repository = RepositoryRef::new(VcsAlias::Git, "memory://git/foobar");

    created
        .attach_repository(repository.clone(), &DefaultClock)
        .expect("first attachment");

    assert_eq!(
        created.attach_repository(repository, &DefaultClock),
        Err(ProjectDomainError::RepositoryAlreadyExists(created.id()))
    );
}

#[rstest]
fn forks_share_the_root_and_record_the_source(joe: User) {
    let jack = User::new("jack");
    let mut original = project(&joe, Visibility::Public);
    original
        .attach_repository(
            RepositoryRef::new(VcsAlias::Mercurial, "memory://hg/foobar"),
            &DefaultClock,
        )
        .expect("attach repository");

    let fork = Project::fork_of(&original, jack.id(), false, &DefaultClock);
    let nested = Project::fork_of(&fork, joe.id(), false, &DefaultClock);

    assert_eq!(fork.parent(), Some(original.id()));
    assert_eq!(fork.root(), original.id());
    assert_eq!(nested.root(), original.id());
    assert_eq!(fork.fork_url(), Some("memory://hg/foobar"));
    assert_eq!(fork.name(), original.name());
    assert_eq!(fork.category(), Some("tools"));
    assert_eq!(fork.state(), ProjectState::Pending);
    assert!(fork.repository().is_none());
}

#[rstest]
#[case(Visibility::Public, false, Visibility::Public)]
#[case(Visibility::Public, true, Visibility::Private)]
#[case(Visibility::Private, false, Visibility::Private)]
fn fork_visibility(
    joe: User,
    #[case] parent: Visibility,
    #[case] force_private: bool,
    #[case] expected: Visibility,
) {
    let original = project(&joe, parent);
    let fork = Project::fork_of(&original, User::new("jack").id(), force_private, &DefaultClock);

    assert_eq!(fork.visibility(), expected);
}

#[rstest]
fn fork_rules(joe: User) {
    let jack = User::new("jack");
    let original = project(&joe, Visibility::Public);
    let tree = vec![original.clone()];

    assert_eq!(
        ensure_can_fork(&original, &Principal::Anonymous, &tree),
        Err(ForkError::Anonymous)
    );
    assert_eq!(
        ensure_can_fork(&original, &Principal::from(joe.clone()), &tree),
        Err(ForkError::OwnProject(joe.username().clone()))
    );
    assert_eq!(
        ensure_can_fork(&original, &Principal::from(jack.clone().deactivated()), &tree),
        Err(ForkError::InactiveUser(jack.username().clone()))
    );

    let jack_principal = Principal::from(jack.clone());
    let user = ensure_can_fork(&original, &jack_principal, &tree).expect("jack may fork");
    assert_eq!(user.id(), jack.id());

    let fork = Project::fork_of(&original, jack.id(), false, &DefaultClock);
    let grown = vec![original.clone(), fork];
    assert_eq!(
        ensure_can_fork(&original, &jack_principal, &grown),
        Err(ForkError::AlreadyForked {
            user: jack.username().clone(),
            root: original.id(),
        })
    );
}

#[rstest]
fn state_codes_round_trip() {
    for state in ProjectState::ALL {
        assert_eq!(ProjectState::try_from(state.code()), Ok(state));
    }
    assert!(ProjectState::try_from(55).is_err());
    assert!(ProjectState::Pending < ProjectState::Created);
    assert!(ProjectState::RepositoryCreated < ProjectState::Ready);
}
