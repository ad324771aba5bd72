//! Startup sequence against a temporary configuration directory.

use std::path::Path;

use orm::sea_orm::{ConnectionTrait, Statement};
use orm::{ColumnKind, FieldDescriptor, ModelDescriptor, OrmError};
use server::{bootstrap, BootstrapError, StartupArgs};

#[ctor::ctor]
fn init_logging() {
    test_support::logging::init();
}

const BASE_YAML: &str = "\
log:
  level: warn
server:
  address: 127.0.0.1:8080
database:
  in_memory: true
";

fn widget() -> ModelDescriptor {
    ModelDescriptor::new("Widget")
        .field(
            FieldDescriptor::new("ID", ColumnKind::Integer)
                .primary_key()
                .auto_increment(),
        )
        .field(FieldDescriptor::new("Label", ColumnKind::Text))
}

fn args(dir: &Path, env: &str, migrate: bool) -> StartupArgs {
    StartupArgs {
        config: vec![dir.to_path_buf()],
        app_name: test_support::unique_str("svc"),
        env: env.to_string(),
        migrate,
    }
}

#[tokio::test]
async fn bootstrap_migrates_and_shuts_down() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("default.yaml"), BASE_YAML)?;

    let services = bootstrap(&args(dir.path(), "", true), &[widget()]).await?;
    assert!(services.orm.is_initialized());
    assert_eq!(services.server.address, "127.0.0.1:8080");
    assert_eq!(services.log.level(), logging::Severity::Warn);

    let conn = services.orm.get_db().connection();
    let table = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'widgets'",
        ))
        .await?;
    assert!(table.is_some());

    services.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn bootstrap_without_migrate_leaves_schema_alone() -> Result<(), Box<dyn std::error::Error>>
{
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("staging.yaml"), BASE_YAML)?;

    let services = bootstrap(&args(dir.path(), "staging", false), &[widget()]).await?;
    let conn = services.orm.get_db().connection();
    let table = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'widgets'",
        ))
        .await?;
    assert!(table.is_none());

    services.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn missing_configuration_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    let err = bootstrap(&args(dir.path(), "prod", false), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, BootstrapError::Config(_)), "{err}");
}

#[tokio::test]
async fn invalid_server_section_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("default.yaml"),
        "server:\n  address: ''\ndatabase:\n  in_memory: true\n",
    )
    .unwrap();

    let err = bootstrap(&args(dir.path(), "", false), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, BootstrapError::Server { .. }), "{err}");
}

#[tokio::test]
async fn database_open_failure_aborts_startup() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("default.yaml"),
        "\
server:
  address: 127.0.0.1:8080
database:
  host: 127.0.0.1
  port: 1
  db_name: nowhere
  connect_attempts: 1
  connect_timeout_secs: 1
",
    )
    .unwrap();

    let err = bootstrap(&args(dir.path(), "", false), &[])
        .await
        .unwrap_err();
    assert!(
        matches!(err, BootstrapError::Orm(OrmError::Open { .. })),
        "{err}"
    );
}
