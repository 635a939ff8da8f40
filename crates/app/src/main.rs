//! Orebi Application CLI

use std::{fs, io, path::PathBuf, process, sync::Arc};

use clap::{Args, Parser, Subcommand};
use jiff::{Timestamp, ToSpan, Zoned};
use orebi::{
    cart::Cart,
    customer::{SessionUser, UserProfile},
    items::{LineItem, normalize_all},
    orders::{OrderFilter, OrderId},
    pricing::PriceBreakdown,
    receipt::{self, Receipt},
    tracking::{Stage, StatusUpdate},
};
use orebi_app::{
    cart::SharedCart,
    config::AppConfig,
    context::AppContext,
    observability,
    session::{StaticSession, StoreUserProfiles},
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "orebi-app", about = "Orebi checkout CLI", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a cart without placing an order
    Quote(QuoteArgs),

    /// Place an order for a cart
    Checkout(CheckoutArgs),

    /// Place a sample order and walk it through every tracking stage
    Demo,
}

#[derive(Debug, Args)]
struct QuoteArgs {
    /// JSON file holding an array of cart line items
    #[arg(long)]
    cart: PathBuf,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// JSON file holding an array of cart line items
    #[arg(long)]
    cart: PathBuf,

    /// Signed-in user id
    #[arg(long)]
    user_id: String,

    /// Signed-in user email
    #[arg(long)]
    email: String,

    /// Display name from the identity provider
    #[arg(long)]
    name: Option<String>,
}

impl Cli {
    fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[tokio::main]
pub async fn main() {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(error) => error.exit(),
    };

    if let Err(error) = observability::init_subscriber(&cli.config.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let context = AppContext::in_memory(cli.config.orders.settings());

    match cli.command {
        Commands::Quote(args) => quote(&context, &args),
        Commands::Checkout(args) => checkout(&context, args).await,
        Commands::Demo => demo(&context).await,
    }
}

fn read_cart(path: &PathBuf) -> Result<Vec<LineItem>, String> {
    let contents = fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;

    serde_json::from_str(&contents)
        .map_err(|error| format!("failed to parse {}: {error}", path.display()))
}

fn quote(context: &AppContext, args: &QuoteArgs) -> Result<(), String> {
    let items = normalize_all(&read_cart(&args.cart)?);
    let pricing = PriceBreakdown::calculate(&items);
    let currency = receipt::currency(&context.settings.currency).map_err(|e| e.to_string())?;

    Receipt::new(&items, &pricing, currency)
        .write_to(io::stdout().lock())
        .map_err(|error| error.to_string())
}

async fn checkout(context: &AppContext, args: CheckoutArgs) -> Result<(), String> {
    let cart = Arc::new(SharedCart::new(Cart::with_items(read_cart(&args.cart)?)));
    let session = Arc::new(StaticSession::signed_in(SessionUser {
        id: args.user_id,
        email: args.email,
        display_name: args.name,
    }));

    let confirmation = context
        .checkout(session, cart)
        .place_order()
        .await
        .map_err(|error| error.to_string())?;

    Receipt::for_order(&confirmation.order)
        .and_then(|receipt| receipt.write_to(io::stdout().lock()))
        .map_err(|error| error.to_string())?;

    let json = serde_json::to_string_pretty(&confirmation.order)
        .map_err(|error| format!("failed to encode order: {error}"))?;

    println!("\nOrder {} ({})", confirmation.order_id, confirmation.document_id);
    println!("{json}");

    Ok(())
}

async fn demo(context: &AppContext) -> Result<(), String> {
    let user = SessionUser::new("demo-user", "demo@example.com");

    StoreUserProfiles::new(context.store.clone())
        .save_user_profile(
            &user.id,
            &UserProfile {
                name: Some("Asha Rao".to_string()),
                phone: Some("+91 98450 00000".to_string()),
                address: Some("12 MG Road".to_string()),
                city: Some("Bengaluru".to_string()),
                country: None,
                zip: Some("560001".to_string()),
            },
        )
        .await
        .map_err(|error| error.to_string())?;

    let cart = Arc::new(SharedCart::new(Cart::with_items([
        LineItem::new("tote-1", "Canvas Tote", 450.0, 1),
        LineItem::new("mug-1", "Stoneware Mug", "120", 2),
        LineItem {
            name: Some("Linen Scarf".to_string()),
            unit_price: Some(380.0_f64.into()),
            badge: Some("new".to_string()),
            ..LineItem::default()
        },
    ])));

    let now = Timestamp::now();
    let confirmation = context
        .checkout(Arc::new(StaticSession::signed_in(user)), cart)
        .place_order_at(now, OrderId::generate(now, &mut rand::thread_rng()))
        .await
        .map_err(|error| error.to_string())?;

    Receipt::for_order(&confirmation.order)
        .and_then(|receipt| receipt.write_to(io::stdout().lock()))
        .map_err(|error| error.to_string())?;

    let mut at = now;

    for stage in [Stage::Confirmed, Stage::Shipped, Stage::Delivered] {
        at += 24.hours();

        let stored = context
            .orders
            .update_status(&confirmation.document_id, StatusUpdate::Advance(stage), at)
            .await
            .map_err(|error| error.to_string())?;

        info!(order_id = %stored.order.order_id, status = %stored.order.status, "advanced order");
    }

    println!("\nHistory for {}:", confirmation.order_id);

    for entry in context
        .orders
        .order_history(&confirmation.document_id)
        .await
        .map_err(|error| error.to_string())?
    {
        println!("  {} {:<16} {}", entry.timestamp, entry.action.as_str(), entry.details);
    }

    let matching = context
        .orders
        .list_orders(OrderFilter::all().with_search("asha"))
        .await
        .map_err(|error| error.to_string())?;

    let stats = context
        .orders
        .order_stats(Zoned::now())
        .await
        .map_err(|error| error.to_string())?;

    println!(
        "\nOrders matching \"asha\": {}\nTotal orders: {}, revenue: {}, pending: {}",
        matching.len(),
        stats.total_orders,
        stats.total_revenue,
        stats.pending_orders
    );

    Ok(())
}
