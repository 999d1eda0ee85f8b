//! Embedded `PostgreSQL` cluster shared by the adapter integration tests.
//!
//! The cluster starts once per test binary. Unprivileged runs start it
//! in-process; root runs hand setup and start to the `pg_worker` helper so
//! the server never runs as root.

use crate::test_helpers::EnvVarGuard;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use diesel::prelude::*;
use pg_embedded_setup_unpriv::worker_process_test_api::{
    WorkerOperation, WorkerRequest, WorkerRequestArgs, run as run_worker,
};
use pg_embedded_setup_unpriv::{
    ExecutionPrivileges, TestBootstrapSettings, bootstrap_for_tests, detect_execution_privileges,
};
use postgresql_embedded::{PostgreSQL, Settings, Status};
use rstest::fixture;
use std::ffi::OsString;
use std::net::TcpListener;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Duration;
use tokio::runtime::Runtime;

/// Boxed error used throughout the harness.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared cluster handle.
pub type PostgresCluster = &'static ManagedCluster;

static SHARED_CLUSTER: OnceLock<Result<ManagedCluster, String>> = OnceLock::new();
static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Running embedded server plus what is needed to stop it.
pub struct ManagedCluster {
    bootstrap: TestBootstrapSettings,
    env_vars: Vec<(String, Option<String>)>,
    runtime: Option<Runtime>,
    postgres: Option<PostgreSQL>,
}

impl ManagedCluster {
    fn start() -> Result<Self, BoxError> {
        let overrides = bootstrap_env()?;
        let guard = EnvVarGuard::set_many(&overrides);
        let mut bootstrap = bootstrap_for_tests().map_err(boxed)?;
        drop(guard);
        read_password_file(&mut bootstrap.settings)?;
        let env_vars = bootstrap.environment.to_env();
        let mut cluster = Self {
            bootstrap,
            env_vars,
            runtime: None,
            postgres: None,
        };
        match cluster.bootstrap.privileges {
            ExecutionPrivileges::Root => cluster.start_via_worker()?,
            ExecutionPrivileges::Unprivileged => cluster.start_in_process()?,
        }
        Ok(cluster)
    }

    /// Returns the connection URL for `database`.
    #[must_use]
    pub fn database_url(&self, database: &str) -> String {
        self.bootstrap.settings.url(database)
    }

    /// Creates `template` and runs `migrate` against it unless it already exists.
    ///
    /// A template whose migration fails is dropped again.
    pub fn ensure_template<F>(&self, template: &str, migrate: F) -> Result<(), BoxError>
    where
        F: FnOnce(&str) -> Result<(), BoxError>,
    {
        let _lock = template_lock();
        if self.database_exists(template)? {
            return Ok(());
        }
        self.admin_sql(&format!("CREATE DATABASE {}", quote_identifier(template)))?;
        if let Err(err) = migrate(&self.database_url(template)) {
            self.drop_database(template)?;
            return Err(err);
        }
        Ok(())
    }

    /// Clones `template` into a fresh database called `name`.
    ///
    /// Cloning is serialized because `PostgreSQL` refuses to copy a template
    /// another session is using.
    pub fn create_database_from_template(&self, name: &str, template: &str) -> Result<(), BoxError> {
        let _lock = template_lock();
        self.admin_sql(&format!(
            "CREATE DATABASE {} TEMPLATE {}",
            quote_identifier(name),
            quote_identifier(template),
        ))
    }

    /// Drops the database called `name`, closing any open connections.
    pub fn drop_database(&self, name: &str) -> Result<(), BoxError> {
        self.admin_sql(&format!(
            "DROP DATABASE IF EXISTS {} WITH (FORCE)",
            quote_identifier(name)
        ))
    }

    fn start_in_process(&mut self) -> Result<(), BoxError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(boxed)?;
        let os_vars: Vec<(OsString, Option<OsString>)> = self
            .env_vars
            .iter()
            .map(|(key, value)| (OsString::from(key), value.as_ref().map(OsString::from)))
            .collect();
        let guard = EnvVarGuard::set_many(&os_vars);
        let mut postgres = PostgreSQL::new(self.bootstrap.settings.clone());
        runtime.block_on(async {
            postgres.setup().await.map_err(boxed)?;
            if !matches!(postgres.status(), Status::Started) {
                postgres.start().await.map_err(boxed)?;
            }
            Ok::<(), BoxError>(())
        })?;
        drop(guard);
        self.bootstrap.settings = postgres.settings().clone();
        read_port_from_pid(&mut self.bootstrap.settings)?;
        self.runtime = Some(runtime);
        self.postgres = Some(postgres);
        Ok(())
    }

    fn start_via_worker(&mut self) -> Result<(), BoxError> {
        self.worker(WorkerOperation::Setup, self.bootstrap.setup_timeout)?;
        self.worker(WorkerOperation::Start, self.bootstrap.start_timeout)?;
        read_port_from_pid(&mut self.bootstrap.settings)
    }

    fn stop(&mut self) -> Result<(), BoxError> {
        let Some(postgres) = self.postgres.take() else {
            if matches!(self.bootstrap.privileges, ExecutionPrivileges::Root) {
                self.worker(WorkerOperation::Stop, self.bootstrap.shutdown_timeout)?;
            }
            return Ok(());
        };
        let Some(runtime) = &self.runtime else {
            return Ok(());
        };
        runtime.block_on(async { postgres.stop().await.map_err(boxed) })
    }

    fn worker(&self, operation: WorkerOperation, timeout: Duration) -> Result<(), BoxError> {
        let worker = self.bootstrap.worker_binary.as_ref().ok_or_else(|| {
            boxed(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "PG_EMBEDDED_WORKER must name a pg_worker binary when running as root",
            ))
        })?;
        let args = WorkerRequestArgs {
            worker: worker.as_path(),
            settings: &self.bootstrap.settings,
            env_vars: &self.env_vars,
            operation,
            timeout,
        };
        run_worker(&WorkerRequest::new(args)).map_err(boxed)
    }

    fn admin_sql(&self, sql: &str) -> Result<(), BoxError> {
        let mut connection =
            PgConnection::establish(&self.database_url("postgres")).map_err(boxed)?;
        diesel::sql_query(sql)
            .execute(&mut connection)
            .map_err(boxed)?;
        Ok(())
    }

    fn database_exists(&self, name: &str) -> Result<bool, BoxError> {
        #[derive(diesel::QueryableByName)]
        struct ExistsRow {
            #[diesel(sql_type = diesel::sql_types::Bool)]
            exists: bool,
        }

        let mut connection =
            PgConnection::establish(&self.database_url("postgres")).map_err(boxed)?;
        let row = diesel::sql_query(
            "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1) AS exists",
        )
        .bind::<diesel::sql_types::Text, _>(name)
        .get_result::<ExistsRow>(&mut connection)
        .map_err(boxed)?;
        Ok(row.exists)
    }
}

impl Drop for ManagedCluster {
    fn drop(&mut self) {
        drop(self.stop());
    }
}

/// Starts the shared cluster on first use.
///
/// Returns an error instead of panicking so hosts without an embedded
/// server can skip the database tests.
#[fixture]
pub fn postgres_cluster() -> Result<PostgresCluster, BoxError> {
    SHARED_CLUSTER
        .get_or_init(|| ManagedCluster::start().map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|message| BoxError::from(message.clone()))
}

/// Boxes any error into [`BoxError`].
pub fn boxed(err: impl std::error::Error + Send + Sync + 'static) -> BoxError {
    Box::new(err)
}

fn template_lock() -> MutexGuard<'static, ()> {
    TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bootstrap_env() -> Result<Vec<(OsString, Option<OsString>)>, BoxError> {
    let mut changes = Vec::new();
    if std::env::var_os("PG_PORT").is_none() {
        let listener = TcpListener::bind(("127.0.0.1", 0)).map_err(boxed)?;
        let port = listener.local_addr().map_err(boxed)?.port();
        drop(listener);
        changes.push((OsString::from("PG_PORT"), Some(OsString::from(port.to_string()))));
    }
    if matches!(detect_execution_privileges(), ExecutionPrivileges::Root)
        && std::env::var_os("PG_EMBEDDED_WORKER").is_none()
    {
        if let Some(worker) = locate_worker() {
            changes.push((OsString::from("PG_EMBEDDED_WORKER"), Some(worker)));
        }
    }
    Ok(changes)
}

fn locate_worker() -> Option<OsString> {
    std::env::var_os("CARGO_BIN_EXE_pg_worker").or_else(|| {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join("pg_worker"))
            .find(|candidate| candidate.is_file())
            .map(std::path::PathBuf::into_os_string)
    })
}

fn open_dir(path: &Path) -> Result<Dir, BoxError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(boxed)
}

fn read_password_file(settings: &mut Settings) -> Result<(), BoxError> {
    let Some(file_name) = settings.password_file.file_name() else {
        return Ok(());
    };
    let parent = settings
        .password_file
        .parent()
        .unwrap_or_else(|| Path::new("."));
    let contents = match open_dir(parent)?.read_to_string(file_name) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(boxed(err)),
    };
    let password = contents.trim_end();
    if !password.is_empty() {
        password.clone_into(&mut settings.password);
    }
    Ok(())
}

fn read_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let contents = match open_dir(&settings.data_dir)?.read_to_string("postmaster.pid") {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(boxed(err)),
    };
    // The fourth line of postmaster.pid holds the listening port.
    if let Some(port) = contents
        .lines()
        .nth(3)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}
