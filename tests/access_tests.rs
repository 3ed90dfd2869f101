//! Access control integration tests
//!
//! Users and grants go through the directory manager and the in-memory
//! metadata store; checks run against the converged directory snapshot.

mod test_utils;

use roodb_access::sql::{
    AnalyzedRelation, AnalyzedStatement, GrantPrivilege, PrivilegeClass, PrivilegeState, PrivilegeTarget,
    PrivilegeType, PrivilegesStatement, RevokePrivilege, SqlError, TableIdent,
};
use roodb_access::user::{MemMetadataStore, MetadataStore, UsersMetadata, UsersPrivilegesMetadata};
use roodb_access::{AccessError, DirectoryManager, SessionContext};
use test_utils::auth::{cluster_grant, schema_privilege, table_privilege, wait_for_directory, TestDirectory};

fn select_sys_cluster() -> AnalyzedStatement {
    AnalyzedStatement::Select {
        relation: AnalyzedRelation::table(TableIdent::new("sys", "cluster")),
    }
}

/// User with only cluster DML selecting from sys.cluster is denied DQL
#[tokio::test]
async fn test_select_denied_without_dql() {
    let dir = TestDirectory::start(&[("dmlUser", vec![cluster_grant(PrivilegeType::Dml)])]).await;
    let session = dir.session("dmlUser");

    let err = dir
        .manager
        .ensure_authorized(&select_sys_cluster(), &session)
        .unwrap_err();
    assert_eq!(err, AccessError::permission_denied("dmlUser", PrivilegeType::Dql));
    assert_eq!(err.to_string(), "Missing 'DQL' Privilege for user 'dmlUser'");
}

/// The nested relation check reaches the innermost table
#[tokio::test]
async fn test_nested_select_denied_without_dql() {
    let dir = TestDirectory::start(&[("dmlUser", vec![cluster_grant(PrivilegeType::Dml)])]).await;
    let statement = AnalyzedStatement::Select {
        relation: AnalyzedRelation::queried(
            Some("t1"),
            AnalyzedRelation::table(TableIdent::new("sys", "cluster")),
        ),
    };

    assert_eq!(
        dir.manager.ensure_authorized(&statement, &dir.session("dmlUser")),
        Err(AccessError::permission_denied("dmlUser", PrivilegeType::Dql))
    );
}

/// A cluster DDL grant does not cover `alter table users add column x string`
#[tokio::test]
async fn test_cluster_ddl_does_not_cover_table() {
    let dir = TestDirectory::start(&[("ddlUser", vec![cluster_grant(PrivilegeType::Ddl)])]).await;
    let statement = AnalyzedStatement::AddColumn {
        table: TableIdent::doc("users"),
    };

    assert_eq!(
        dir.manager.ensure_authorized(&statement, &dir.session("ddlUser")),
        Err(AccessError::permission_denied("ddlUser", PrivilegeType::Ddl))
    );
}

/// `copy users from '/path'` with cluster DQL is denied DML
#[tokio::test]
async fn test_copy_from_denied_without_dml() {
    let dir = TestDirectory::start(&[("dqlUser", vec![cluster_grant(PrivilegeType::Dql)])]).await;
    let statement = AnalyzedStatement::CopyFrom {
        table: TableIdent::doc("users"),
    };

    assert_eq!(
        dir.manager.ensure_authorized(&statement, &dir.session("dqlUser")),
        Err(AccessError::permission_denied("dqlUser", PrivilegeType::Dml))
    );
}

/// `drop repository "unknown_repo"` by a user without grants does not
/// reveal that the repository is missing
///
/// Resolving the repository fails during analysis, before any statement
/// exists to validate, so the client only ever sees the remapped analysis
/// error: an untyped privilege denial. The typed DDL denial applies only to
/// repositories that do exist.
#[tokio::test]
async fn test_unknown_repository_hidden() {
    let dir = TestDirectory::start(&[("ford", vec![])]).await;
    let session = dir.session("ford");

    let analyzed: Result<AnalyzedStatement, SqlError> = Err(SqlError::RepositoryUnknown("unknown_repo".to_string()));
    let outcome = analyzed
        .map_err(|e| dir.manager.validate_exception(e, &session))
        .and_then(|statement| {
            dir.manager
                .ensure_authorized(&statement, &session)
                .map_err(SqlError::from)
        });
    let err = outcome.unwrap_err();
    assert_eq!(err, SqlError::Access(AccessError::missing_any_privilege("ford")));
    assert_eq!(err.to_string(), "Missing Privilege for user 'ford'");

    // Remapping again changes nothing
    assert_eq!(dir.manager.validate_exception(err.clone(), &session), err);

    // An existing repository reaches the validator and gets the typed denial
    let existing = AnalyzedStatement::DropRepository {
        name: "backups".to_string(),
    };
    assert_eq!(
        dir.manager.ensure_authorized(&existing, &session),
        Err(AccessError::permission_denied("ford", PrivilegeType::Ddl))
    );
}

/// `kill all` without grants is superuser-only
#[tokio::test]
async fn test_kill_all_unauthorized() {
    let dir = TestDirectory::start(&[("ford", vec![])]).await;

    let err = dir
        .manager
        .ensure_authorized(&AnalyzedStatement::Kill { job_id: None }, &dir.session("ford"))
        .unwrap_err();
    assert_eq!(err.to_string(), "User \"ford\" is not authorized to execute statement");
}

/// DCL grants never authorize access control statements
#[tokio::test]
async fn test_dcl_grant_does_not_authorize() {
    let dir = TestDirectory::start(&[("ford", vec![cluster_grant(PrivilegeType::Dcl)])]).await;
    let session = dir.session("ford");

    let grant = GrantPrivilege::all(vec!["ford".to_string()]);
    let statement = AnalyzedStatement::Privileges(PrivilegesStatement::from_grant(&grant, "ford", "doc"));
    assert_eq!(
        dir.manager.ensure_authorized(&statement, &session),
        Err(AccessError::unauthorized("ford"))
    );
    assert_eq!(
        dir.manager.ensure_authorized(
            &AnalyzedStatement::CreateUser {
                user_name: "arthur".to_string()
            },
            &session
        ),
        Err(AccessError::unauthorized("ford"))
    );
}

/// Superuser and sessions without a user are never checked
#[tokio::test]
async fn test_superuser_and_anonymous_pass() {
    let dir = TestDirectory::start(&[]).await;
    let statement = AnalyzedStatement::Kill { job_id: None };

    assert_eq!(dir.manager.ensure_authorized(&statement, &dir.session("crate")), Ok(()));
    assert_eq!(
        dir.manager.ensure_authorized(&statement, &SessionContext::anonymous()),
        Ok(())
    );
}

/// GRANT ALL followed by REVOKE ALL leaves the user without privileges
#[tokio::test]
async fn test_grant_and_revoke_through_statements() {
    let dir = TestDirectory::start(&[("ford", vec![])]).await;
    let users = vec!["ford".to_string()];

    let grant = PrivilegesStatement::from_grant(&GrantPrivilege::all(users.clone()), "crate", "doc");
    let affected = dir
        .manager
        .apply_privileges(&grant.user_names, &grant.privileges)
        .await
        .unwrap();
    assert_eq!(affected, 3);
    wait_for_directory(&dir.manager, |d| d.get("ford").is_some_and(|u| u.privileges().len() == 3)).await;
    assert_eq!(
        dir.manager.ensure_authorized(&AnalyzedStatement::Begin, &dir.session("ford")),
        Ok(())
    );

    let revoke = PrivilegesStatement::from_revoke(&RevokePrivilege::all(users), "crate", "doc");
    let affected = dir
        .manager
        .apply_privileges(&revoke.user_names, &revoke.privileges)
        .await
        .unwrap();
    assert_eq!(affected, 3);
    wait_for_directory(&dir.manager, |d| d.get("ford").is_some_and(|u| u.privileges().is_empty())).await;
}

/// Table scoped grants authorize reads of that table only
#[tokio::test]
async fn test_table_scoped_grant() {
    let dir = TestDirectory::start(&[("ford", vec![])]).await;
    let grant = GrantPrivilege::new([PrivilegeType::Dql], vec!["ford".to_string()])
        .on(PrivilegeTarget::tables(["sys.cluster"]));
    let statement = PrivilegesStatement::from_grant(&grant, "crate", "doc");
    dir.manager
        .apply_privileges(&statement.user_names, &statement.privileges)
        .await
        .unwrap();
    wait_for_directory(&dir.manager, |d| d.get("ford").is_some_and(|u| !u.privileges().is_empty())).await;

    let session = dir.session("ford");
    assert_eq!(dir.manager.ensure_authorized(&select_sys_cluster(), &session), Ok(()));
    let other = AnalyzedStatement::Select {
        relation: AnalyzedRelation::doc_table(TableIdent::doc("users")),
    };
    assert_eq!(
        dir.manager.ensure_authorized(&other, &session),
        Err(AccessError::permission_denied("ford", PrivilegeType::Dql))
    );
}

/// A narrower DENY hides a table that a schema GRANT would reveal
#[tokio::test]
async fn test_deny_hides_table_from_remap() {
    let dir = TestDirectory::start(&[(
        "ford",
        vec![
            schema_privilege(PrivilegeState::Grant, PrivilegeType::Dql, "doc"),
            table_privilege(PrivilegeState::Deny, PrivilegeType::Dql, "doc.secret"),
        ],
    )])
    .await;
    let session = dir.session("ford");
    let column_unknown = |table: &str| SqlError::ColumnUnknown {
        table: TableIdent::doc(table),
        column: "x".to_string(),
    };

    assert_eq!(
        dir.manager.validate_exception(column_unknown("users"), &session),
        column_unknown("users")
    );
    assert_eq!(
        dir.manager.validate_exception(column_unknown("secret"), &session),
        SqlError::Access(AccessError::missing_any_privilege("ford"))
    );
}

/// User management errors and affected row counts
#[tokio::test]
async fn test_user_management() {
    let dir = TestDirectory::start(&[("ford", vec![cluster_grant(PrivilegeType::Dql)])]).await;

    assert_eq!(
        dir.manager.create_user("ford").await,
        Err(AccessError::UserAlreadyExists("ford".to_string()))
    );
    assert_eq!(
        dir.manager.create_user("crate").await,
        Err(AccessError::UserAlreadyExists("crate".to_string()))
    );
    assert!(matches!(
        dir.manager.drop_user("crate", false).await,
        Err(AccessError::UnsupportedOperation(_))
    ));
    assert_eq!(
        dir.manager
            .apply_privileges(&["arthur".to_string()], &[cluster_grant(PrivilegeType::Dql)])
            .await,
        Err(AccessError::user_unknown("arthur"))
    );

    assert_eq!(dir.manager.drop_user("ford", false).await, Ok(1));
    assert!(dir.store.privileges().user_privileges("ford").is_none());
    wait_for_directory(&dir.manager, |d| !d.contains("ford")).await;

    assert_eq!(dir.manager.drop_user("ford", true).await, Ok(0));
    assert_eq!(
        dir.manager.drop_user("ford", false).await,
        Err(AccessError::user_unknown("ford"))
    );
}

/// A session keeps the user it was opened with while the directory changes
#[tokio::test]
async fn test_session_keeps_snapshot_user() {
    let dir = TestDirectory::start(&[("ford", vec![])]).await;
    let session = dir.session("ford");

    dir.manager
        .apply_privileges(&["ford".to_string()], &[cluster_grant(PrivilegeType::Dql)])
        .await
        .unwrap();
    wait_for_directory(&dir.manager, |d| d.get("ford").is_some_and(|u| !u.privileges().is_empty())).await;

    assert!(session.user().is_some_and(|u| u.privileges().is_empty()));
    assert!(dir
        .user("ford")
        .has_privilege(PrivilegeType::Dql, PrivilegeClass::Cluster, None));
}

/// Rebuilding from identical metadata yields an equal directory
#[tokio::test]
async fn test_rebuild_is_deterministic() {
    let mut privileges = UsersPrivilegesMetadata::new();
    privileges.apply("ford", &cluster_grant(PrivilegeType::Dml));
    let store = std::sync::Arc::new(MemMetadataStore::with_metadata(
        UsersMetadata::from_names(["ford", "arthur"]),
        privileges,
    ));

    let first = DirectoryManager::new(store.clone());
    let second = DirectoryManager::new(store.clone());
    assert_eq!(*first.users(), *second.users());
    assert_eq!(first.users().len(), 3);
    assert_eq!(store.subscribe().borrow().version, 1);
}

/// The listener stops once the manager and the store are gone
#[tokio::test]
async fn test_listener_stops_with_store() {
    let store = std::sync::Arc::new(MemMetadataStore::new());
    let (manager, listener) = DirectoryManager::start(store.clone());
    manager.create_user("ford").await.unwrap();
    wait_for_directory(&manager, |d| d.contains("ford")).await;

    drop(manager);
    drop(store);
    tokio::time::timeout(std::time::Duration::from_secs(5), listener)
        .await
        .expect("listener did not stop")
        .expect("listener panicked");
}
