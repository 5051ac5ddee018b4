//! Rewards Application CLI

use std::process;

use clap::{Args, Parser, Subcommand};
use jiff::Timestamp;
use rewards_app::{
    database::Db,
    domain::promotions::{
        PgPromotionsService, PromotionsService, data::NewPromotion, records::PromotionUuid,
    },
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "rewards-app", about = "Rewards grant service CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Promotion(PromotionCommand),
}

#[derive(Debug, Args)]
struct PromotionCommand {
    #[command(subcommand)]
    command: PromotionSubcommand,
}

#[derive(Debug, Subcommand)]
enum PromotionSubcommand {
    /// Create an inactive promotion.
    Create(CreatePromotionArgs),

    /// Activate a promotion so wallets can claim it.
    Activate(ActivatePromotionArgs),
}

#[derive(Debug, Args)]
struct CreatePromotionArgs {
    /// Promotion type, e.g. `ugp` or `ads`
    #[arg(long, default_value = "ugp")]
    promotion_type: String,

    /// Number of suggestions one grant funds
    #[arg(long)]
    suggestions_per_grant: i32,

    /// Total grant value in BAT
    #[arg(long)]
    value: Decimal,

    /// Optional expiry; defaults to three months from creation
    #[arg(long)]
    expires_at: Option<Timestamp>,

    /// Optional promotion UUID; generated when omitted
    #[arg(long)]
    promotion_uuid: Option<Uuid>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[derive(Debug, Args)]
struct ActivatePromotionArgs {
    /// UUID of the promotion to activate
    #[arg(long)]
    promotion_uuid: Uuid,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Promotion(PromotionCommand {
            command: PromotionSubcommand::Create(args),
        }) => create_promotion(args).await,
        Commands::Promotion(PromotionCommand {
            command: PromotionSubcommand::Activate(args),
        }) => activate_promotion(args).await,
    }
}

async fn promotions_service(database_url: &str) -> Result<PgPromotionsService, String> {
    let pool = rewards_app::database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(PgPromotionsService::new(Db::new(pool)))
}

async fn create_promotion(args: CreatePromotionArgs) -> Result<(), String> {
    let service = promotions_service(&args.database_url).await?;
    let uuid = PromotionUuid::from_uuid(args.promotion_uuid.unwrap_or_else(Uuid::now_v7));

    let promotion = service
        .create_promotion(NewPromotion {
            uuid,
            promotion_type: args.promotion_type,
            suggestions_per_grant: args.suggestions_per_grant,
            approximate_value: args.value,
            expires_at: args.expires_at,
        })
        .await
        .map_err(|error| format!("failed to create promotion: {error}"))?;

    println!("promotion_uuid: {}", promotion.uuid);
    println!("promotion_type: {}", promotion.promotion_type);
    println!("approximate_value: {}", promotion.approximate_value);
    println!("expires_at: {}", promotion.expires_at);
    println!("activate it with `rewards-app promotion activate` to open claims");

    Ok(())
}

async fn activate_promotion(args: ActivatePromotionArgs) -> Result<(), String> {
    let service = promotions_service(&args.database_url).await?;
    let uuid = PromotionUuid::from_uuid(args.promotion_uuid);

    service
        .activate_promotion(uuid)
        .await
        .map_err(|error| format!("failed to activate promotion: {error}"))?;

    println!("promotion_uuid: {uuid}");
    println!("active: true");

    Ok(())
}
