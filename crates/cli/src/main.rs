//! Prasanna Farm CLI - Browse the catalog, manage the cart, place orders.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! farm products --category fruits --sort price-low
//! farm product fruit-mango
//! farm search mango
//!
//! # Cart (persisted in FARM_DATA_DIR between runs)
//! farm cart add fruit-mango -q 2
//! farm cart update fruit-mango 1
//! farm cart show
//!
//! # Checkout
//! farm checkout --name "Asha Rao" --email asha@example.in --phone 9876543210 \
//!     --address "12 Temple Road" --city Mysuru --pincode 570001 --payment upi
//! ```
//!
//! Set `FARM_API_URL` to use a remote cart/catalog service; without it the
//! built-in catalog and the local cart store are used.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use prasanna_farm_core::{CategoryId, PaymentMethod, ProductId};
use prasanna_farm_storefront::StorefrontSession;
use prasanna_farm_storefront::catalog::SortOrder;
use prasanna_farm_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "farm")]
#[command(author, version, about = "Prasanna Farm storefront")]
struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products {
        /// Category id, or "all"
        #[arg(short, long, default_value = CategoryId::ALL)]
        category: String,

        /// featured, price-low, price-high or rating
        #[arg(short, long, default_value = "featured")]
        sort: SortOrder,
    },
    /// Show one product and related products
    Product {
        /// Product id
        id: String,
    },
    /// List categories
    Categories,
    /// Search products by name, description or category
    Search {
        /// At least two characters
        query: String,
    },
    /// Top-rated products
    Featured {
        #[arg(short = 'n', long, default_value_t = 8)]
        count: usize,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add a product
    Add {
        /// Product id
        id: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set the quantity of a line (zero or less removes it)
    Update {
        /// Product id
        id: String,

        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove {
        /// Product id
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    pincode: String,
    /// upi, card, wallet, cod or paylater
    #[arg(long, default_value = "upi")]
    payment: PaymentMethod,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prasanna_farm_storefront=info,prasanna_farm_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry before the subscriber so the tracing layer has a client
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli, config).await {
        match e.downcast_ref::<prasanna_farm_storefront::Error>() {
            Some(err) => err.report(),
            None => tracing::error!("Command failed: {e}"),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> commands::CommandResult {
    let session = StorefrontSession::start(config).await?;
    let out = commands::Output::new(cli.json);

    match cli.command {
        Commands::Products { category, sort } => {
            commands::catalog::products(&session, out, &CategoryId::new(category), sort).await
        }
        Commands::Product { id } => {
            commands::catalog::product(&session, out, &ProductId::new(id)).await
        }
        Commands::Categories => commands::catalog::categories(&session, out).await,
        Commands::Search { query } => commands::catalog::search(&session, out, &query).await,
        Commands::Featured { count } => commands::catalog::featured(&session, out, count).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&session, out),
            CartAction::Add { id, quantity } => {
                commands::cart::add(&session, out, &ProductId::new(id), quantity).await
            }
            CartAction::Update { id, quantity } => {
                commands::cart::update(&session, out, &ProductId::new(id), quantity).await
            }
            CartAction::Remove { id } => {
                commands::cart::remove(&session, out, &ProductId::new(id)).await
            }
            CartAction::Clear => commands::cart::clear(&session, out).await,
        },
        Commands::Checkout(args) => {
            let form = prasanna_farm_storefront::checkout::CheckoutForm {
                full_name: args.name,
                email: args.email,
                phone: args.phone,
                address: args.address,
                city: args.city,
                pincode: args.pincode,
                payment_method: args.payment,
            };
            commands::checkout::place_order(&session, out, &form).await
        }
    }
}
