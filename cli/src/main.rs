mod config;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use entity::users;
use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool, connect};
use platform_obs::{ObsConfig, init_tracing};
use products_crm::{AccountParams, AccountResolver, Opportunity, OpportunityParams};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "crm", version, about = "CRM opportunities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run database migrations.
    #[command(subcommand)]
    Migrate(MigrateCommand),
    /// Insert demo users, an account and a few opportunities.
    Seed,
    /// List the opportunities a user can see.
    Opportunities(ListCommand),
    /// Soft-delete an opportunity.
    Delete {
        #[arg(value_name = "ID")]
        id: i32,
    },
}

#[derive(Subcommand, Debug)]
enum MigrateCommand {
    /// Apply pending migrations.
    Up,
    /// Rollback the most recent migration.
    Down,
}

#[derive(Args, Debug)]
struct ListCommand {
    #[arg(long, help = "User id; defaults to CRM_DEFAULT_USER")]
    user: Option<i32>,
    #[arg(long, help = "Print JSON instead of a table")]
    json: bool,
}

#[derive(Serialize)]
struct OpportunityRow<'a> {
    id: Option<i32>,
    uuid: String,
    name: &'a str,
    access: &'static str,
    stage: Option<&'a str>,
    amount: Option<f64>,
    probability: Option<i32>,
    weighted_amount: f64,
    account_id: Option<i32>,
    shared_with: Vec<i32>,
}

impl<'a> From<&'a Opportunity> for OpportunityRow<'a> {
    fn from(opportunity: &'a Opportunity) -> Self {
        Self {
            id: opportunity.id,
            uuid: opportunity.uuid.to_string(),
            name: &opportunity.name,
            access: opportunity.access.as_str(),
            stage: opportunity.stage.as_deref(),
            amount: opportunity.amount(),
            probability: opportunity.probability,
            weighted_amount: opportunity.weighted_amount(),
            account_id: opportunity.account_id(),
            shared_with: opportunity.permissions().iter().map(|g| g.user_id).collect(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::from_env("crm"))?;
    let cli = Cli::parse();
    let app_config = AppConfig::load()?;
    match cli.command {
        Command::Migrate(action) => match action {
            MigrateCommand::Up => migrate_up().await,
            MigrateCommand::Down => migrate_down().await,
        },
        Command::Seed => run_seed().await,
        Command::Opportunities(cmd) => list_opportunities(cmd, &app_config).await,
        Command::Delete { id } => delete_opportunity(id).await,
    }
}

async fn setup_pool() -> Result<DbPool> {
    let settings = DatabaseSettings::from_env()?;
    connect(&settings)
        .await
        .context("unable to open the CRM database")
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

async fn run_seed() -> Result<()> {
    let pool = setup_pool().await?;
    let alice = ensure_user(&pool, "alice").await?;
    let bob = ensure_user(&pool, "bob").await?;
    let carol = ensure_user(&pool, "carol").await?;

    let mut rollout = Opportunity::new(OpportunityParams {
        user_id: Some(alice),
        access: Some("Shared".into()),
        stage: Some("prospecting".into()),
        amount: Some("12000".into()),
        probability: Some("40".into()),
        ..OpportunityParams::named("Acme rollout")
    });
    let saved = rollout
        .save_with_account_and_permissions(
            &pool,
            &AccountResolver,
            &AccountParams::new_named("Acme"),
            &[bob, carol],
        )
        .await?;
    report_seed(&rollout, saved);

    let mut support = Opportunity::new(OpportunityParams {
        user_id: Some(bob),
        assigned_to: Some(alice),
        stage: Some("negotiation".into()),
        amount: Some("2500".into()),
        probability: Some("75".into()),
        ..OpportunityParams::named("Support renewal")
    });
    let saved = support.save(&pool).await?;
    report_seed(&support, saved);

    info!("seed data loaded");
    Ok(())
}

fn report_seed(opportunity: &Opportunity, saved: bool) {
    if saved {
        info!(opportunity_id = ?opportunity.id, name = %opportunity.name, "seeded opportunity");
    } else {
        warn!(name = %opportunity.name, errors = %opportunity.errors(), "opportunity skipped");
    }
}

async fn ensure_user(pool: &DbPool, username: &str) -> Result<i32> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(pool)
        .await?
    {
        return Ok(existing.id);
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let created = users::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{username}@example.com")),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(pool)
    .await?;
    Ok(created.id)
}

async fn list_opportunities(cmd: ListCommand, config: &AppConfig) -> Result<()> {
    let user_id = cmd
        .user
        .or(config.default_user)
        .ok_or_else(|| anyhow!("pass --user or set CRM_DEFAULT_USER"))?;
    let pool = setup_pool().await?;
    let opportunities = Opportunity::my_opportunities(&pool, user_id).await?;
    let rows: Vec<OpportunityRow<'_>> = opportunities.iter().map(OpportunityRow::from).collect();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for row in &rows {
        println!(
            "{:>6}  {:<32}  {:<8}  {:<12}  {:>12.2}",
            row.id.unwrap_or_default(),
            row.name,
            row.access,
            row.stage.unwrap_or("-"),
            row.weighted_amount,
        );
    }
    info!(user_id, count = rows.len(), "opportunities listed");
    Ok(())
}

async fn delete_opportunity(id: i32) -> Result<()> {
    let pool = setup_pool().await?;
    let Some(mut opportunity) = Opportunity::find(&pool, id).await? else {
        bail!("opportunity {id} not found");
    };
    opportunity.destroy(&pool).await?;
    info!(opportunity_id = id, "opportunity deleted");
    Ok(())
}
