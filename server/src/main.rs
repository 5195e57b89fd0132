use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use platform_authz::{PermissionSet, Role};
use platform_db::{DatabaseSettings, DbPool, NewUser, connect};
use platform_obs::{ObsConfig, init_tracing};
use rh_server::{
    config::AppConfig,
    http::{self, AppState, ServeConfig},
};
use tracing::{info, warn};

const SEED_DEPARTMENT: &str = "Administração";

#[derive(Parser, Debug)]
#[command(name = "rh-server", version, about = "RH Manager")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve(ServeCommand),
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Create the first department and admin account.
    Seed(SeedCommand),
    /// Print synthetic contact records as JSON.
    #[command(name = "fake-data")]
    FakeData,
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    #[arg(long, help = "Allow starting even when migrations are pending")]
    allow_dirty: bool,
}

impl From<&ServeCommand> for ServeConfig {
    fn from(value: &ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[derive(Args, Debug)]
struct SeedCommand {
    #[arg(long, env = "SEED_ADMIN_EMAIL", default_value = "admin@rh.local")]
    admin_email: String,
    #[arg(long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing(ObsConfig::from_env())?;
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(cmd) => run_server(cmd).await,
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
        Command::Seed(cmd) => run_seed(cmd).await,
        Command::FakeData => print_fake_data(),
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env();
    connect(&settings).await.map_err(Into::into)
}

async fn run_server(cmd: ServeCommand) -> Result<()> {
    let config = AppConfig::load()?;
    let pool = setup_pool().await?;
    ensure_migrations(&pool, cmd.allow_dirty).await?;
    let purged = platform_db::purge_expired_sessions(&pool)
        .await
        .context("failed to purge expired sessions")?;
    if purged > 0 {
        info!(purged, "expired sessions removed");
    }
    let state = AppState::new(pool, config);
    http::serve(ServeConfig::from(&cmd), state).await
}

async fn ensure_migrations(pool: &DbPool, allow_dirty: bool) -> Result<()> {
    let pending = Migrator::get_pending_migrations(pool).await?;
    if !pending.is_empty() && !allow_dirty {
        anyhow::bail!(
            "pending migrations detected; run `rh-server migrate up` or pass --allow-dirty"
        );
    }
    Ok(())
}

async fn migrate_up() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::up(&pool, None).await?;
    info!("database migrations applied");
    Ok(())
}

async fn migrate_down() -> Result<()> {
    let pool = setup_pool().await?;
    Migrator::down(&pool, Some(1)).await?;
    info!("most recent migration rolled back");
    Ok(())
}

async fn run_seed(cmd: SeedCommand) -> Result<()> {
    let pool = setup_pool().await?;
    let email = platform_authn::normalize_email(&cmd.admin_email)?;
    if platform_db::find_user_by_email(&pool, &email).await?.is_some() {
        warn!(%email, "admin account already exists; nothing to seed");
        return Ok(());
    }
    platform_authn::validate_password(&cmd.admin_password)?;

    let departments = platform_db::list_departments(&pool).await?;
    let department = match departments.into_iter().find(|d| d.name == SEED_DEPARTMENT) {
        Some(department) => department,
        None => platform_db::create_department(&pool, SEED_DEPARTMENT).await?,
    };
    let password_hash = platform_authn::hash_password(&cmd.admin_password)?;
    let admin = platform_db::create_user(
        &pool,
        NewUser {
            department_id: department.id,
            name: "Administrador".to_string(),
            email,
            password_hash,
            role: Role::Admin,
            permissions: PermissionSet::from_permissions([Role::Admin.default_permission()]),
            salary_cents: 0,
            admission_date: Utc::now().date_naive(),
            address: None,
            zip_code: None,
            city: None,
            phone: None,
        },
    )
    .await?;
    info!(user_id = admin.id, department_id = department.id, "admin account seeded");
    Ok(())
}

fn print_fake_data() -> Result<()> {
    let json = products_hr::fake_contacts_json().context("failed to serialize contacts")?;
    println!("{json}");
    Ok(())
}
