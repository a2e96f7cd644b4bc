use std::sync::Arc;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use structopt::StructOpt;

pub mod db;
pub mod models;
pub mod pagination;
pub mod services;
pub mod telemetry;
pub mod web;

use services::{MediaService, PgMediaService};

/// Schema migrations embedded from `migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

#[derive(Clone, Debug)]
pub struct State {
    pub service: Arc<dyn MediaService>,
}

impl State {
    pub fn new<S: MediaService + 'static>(service: S) -> Self {
        State {
            service: Arc::new(service),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    TelemetryInitError(anyhow::Error),
    DatabaseConnectError(sqlx::Error),
    MigrationError(sqlx::migrate::MigrateError),
    ListenError(std::io::Error),
}

impl From<Error> for u8 {
    fn from(error: Error) -> u8 {
        match error {
            Error::TelemetryInitError(_) => 2,
            Error::DatabaseConnectError(_) => 3,
            Error::MigrationError(_) => 4,
            Error::ListenError(_) => 5,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TelemetryInitError(err) => {
                write!(f, "Failed to init telemetry: {}", err)
            },
            Error::DatabaseConnectError(err) => {
                write!(
                    f,
                    "Failed to connect to database after {} tries: {}",
                    db::MAX_CONNECT_ATTEMPTS,
                    err
                )
            },
            Error::MigrationError(err) => {
                write!(f, "Failed to migrate database: {}", err)
            },
            Error::ListenError(err) => {
                write!(f, "Failed to start server: {}", err)
            },
        }
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "mediams", about = "HTTP service for albums and media items")]
pub struct Args {
    /// Host address to bind to.
    #[structopt(long, default_value = "0.0.0.0", env = "MEDIAMS_BIND_ADDRESS")]
    address: String,
    /// Port to bind to.
    #[structopt(long, default_value = "8080", env = "PORT")]
    port: u16,

    /// PostgreSQL host.
    #[structopt(long, default_value = "0.0.0.0", env = "PG_HOST")]
    pg_host: String,
    /// PostgreSQL port.
    #[structopt(long, default_value = "5432", env = "PG_PORT")]
    pg_port: u16,
    /// PostgreSQL user.
    #[structopt(long, default_value = "postgres", env = "PG_USER")]
    pg_user: String,
    /// PostgreSQL database name.
    #[structopt(long, default_value = "postgres", env = "PG_DB")]
    pg_db: String,
    /// PostgreSQL password.
    #[structopt(
        long,
        default_value = "mysecretpassword",
        env = "PG_PASSWORD",
        hide_env_values = true,
        hide_default_value = true
    )]
    pg_password: String,
    /// PostgreSQL SSL mode (disable, allow, prefer, require, verify-ca, verify-full).
    #[structopt(long, default_value = "disable", env = "PG_SSL_MODE")]
    pg_ssl_mode: PgSslMode,
}

impl Args {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.pg_host)
            .port(self.pg_port)
            .username(&self.pg_user)
            .database(&self.pg_db)
            .password(&self.pg_password)
            .ssl_mode(self.pg_ssl_mode)
    }
}

/// Builds the HTTP server around the given state.
pub fn app(state: State) -> tide::Server<State> {
    let mut app = tide::with_state(state);

    #[cfg(feature = "otlp")]
    {
        use opentelemetry_tide::TideExt;
        app.with_default_tracing_middleware();
    }

    web::mount(&mut app);
    app
}

pub async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    let args = Args::from_args();

    telemetry::init().map_err(Error::TelemetryInitError)?;

    let pool = db::connect_with_retry(args.connect_options())
        .await
        .map_err(Error::DatabaseConnectError)?;
    db::migrate(&pool).await.map_err(Error::MigrationError)?;

    let app = app(State::new(PgMediaService::new(pool)));

    let address: &str = args.address.as_ref();
    tracing::info!(address, port = args.port, "Starting server");
    app.listen((address, args.port))
        .await
        .map_err(Error::ListenError)?;

    Ok(())
}
