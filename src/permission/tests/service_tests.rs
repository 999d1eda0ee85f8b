//! Authorization tests covering grants, groups, superusers and public
//! projects.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::accounts::{GroupId, Principal, User, adapters::memory::InMemoryUserDirectory};
use crate::permission::{
    Authorizer, Grantee, PermissionError, PermissionService, ProjectPermission,
    adapters::memory::InMemoryPermissionRepository,
};
use crate::project::domain::{NewProject, Project, ProjectName, Visibility};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = PermissionService<InMemoryPermissionRepository, InMemoryUserDirectory>;

struct Context {
    service: TestService,
    directory: Arc<InMemoryUserDirectory>,
}

#[fixture]
fn context() -> Context {
    let directory = Arc::new(InMemoryUserDirectory::new());
    Context {
        service: PermissionService::new(
            Arc::new(InMemoryPermissionRepository::new()),
            Arc::clone(&directory),
        ),
        directory,
    }
}

fn project(visibility: Visibility, author: &User) -> Project {
    Project::new(
        NewProject {
            name: ProjectName::new("foobar").expect("valid name"),
            description: String::new(),
            category: None,
            visibility,
            author: author.id(),
        },
        &DefaultClock,
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn author_holds_every_permission(context: Context) {
    let author = User::new("joe");
    let foobar = project(Visibility::Private, &author);
    context
        .service
        .grant_author(foobar.id(), author.id())
        .await
        .expect("grant should succeed");

    let held = context
        .service
        .permissions_of(&Principal::User(author), &foobar)
        .await
        .expect("lookup should succeed");

    assert_eq!(held.len(), ProjectPermission::ALL.len());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn anonymous_sees_public_project_read_only(context: Context) {
    let foobar = project(Visibility::Public, &User::new("joe"));

    let held = context
        .service
        .permissions_of(&Principal::Anonymous, &foobar)
        .await
        .expect("lookup should succeed");

    assert_eq!(held, BTreeSet::from(ProjectPermission::PUBLIC));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn anonymous_sees_nothing_on_private_project(context: Context) {
    let foobar = project(Visibility::Private, &User::new("joe"));

    let result = context
        .service
        .ensure_permission(&Principal::Anonymous, &foobar, ProjectPermission::ViewProject)
        .await;

    assert!(matches!(
        result,
        Err(PermissionError::PermissionDenied {
            permission: ProjectPermission::ViewProject,
            ..
        })
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn active_superuser_bypasses_grants(context: Context) {
    let foobar = project(Visibility::Private, &User::new("joe"));
    let admin = Principal::User(User::new("root").as_superuser());
    let retired = Principal::User(User::new("old-root").as_superuser().deactivated());

    assert!(context
        .service
        .has_permission(&admin, &foobar, ProjectPermission::AdminProject)
        .await
        .expect("lookup should succeed"));
    assert!(!context
        .service
        .has_permission(&retired, &foobar, ProjectPermission::ViewProject)
        .await
        .expect("lookup should succeed"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn team_grant_reaches_group_members(context: Context) {
    let foobar = project(Visibility::Private, &User::new("joe"));
    let member = User::new("jack");
    let group = GroupId::new();
    context
        .directory
        .add_to_group(group, member.id())
        .expect("group insert should succeed");
    context
        .service
        .grant_team(foobar.id(), group)
        .await
        .expect("grant should succeed");

    let principal = Principal::User(member);
    let can_push = context
        .service
        .has_permission(&principal, &foobar, ProjectPermission::WriteRepository)
        .await
        .expect("lookup should succeed");
    let can_admin = context
        .service
        .has_permission(&principal, &foobar, ProjectPermission::AdminProject)
        .await
        .expect("lookup should succeed");

    assert!(can_push);
    assert!(!can_admin);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inactive_member_loses_grants(context: Context) {
    let foobar = project(Visibility::Private, &User::new("joe"));
    let member = User::new("jack").deactivated();
    context
        .service
        .grant_member(foobar.id(), member.id())
        .await
        .expect("grant should succeed");

    let held = context
        .service
        .permissions_of(&Principal::User(member), &foobar)
        .await
        .expect("lookup should succeed");

    assert!(held.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn revoke_all_removes_member_access(context: Context) {
    let foobar = project(Visibility::Private, &User::new("joe"));
    let member = User::new("jack");
    context
        .service
        .grant_member(foobar.id(), member.id())
        .await
        .expect("grant should succeed");

    let removed = context
        .service
        .revoke_all(foobar.id(), Grantee::User(member.id()))
        .await
        .expect("revoke should succeed");
    let still_allowed = context
        .service
        .has_permission(
            &Principal::User(member),
            &foobar,
            ProjectPermission::ViewProject,
        )
        .await
        .expect("lookup should succeed");

    assert_eq!(removed, ProjectPermission::MEMBER_DEFAULTS.len());
    assert!(!still_allowed);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn granting_twice_counts_only_new_permissions(context: Context) {
    let foobar = project(Visibility::Private, &User::new("joe"));
    let grantee = Grantee::User(User::new("jack").id());
    let permissions = [ProjectPermission::ViewProject, ProjectPermission::AddTask];

    let first = context
        .service
        .grant(foobar.id(), grantee, &permissions)
        .await
        .expect("grant should succeed");
    let second = context
        .service
        .grant(foobar.id(), grantee, &permissions)
        .await
        .expect("grant should succeed");
    let revoked = context
        .service
        .revoke(foobar.id(), grantee, &[ProjectPermission::AddTask])
        .await
        .expect("revoke should succeed");

    assert_eq!((first, second, revoked), (2, 0, 1));
}
