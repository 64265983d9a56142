//! Rakhshan CLI - storefront and admin console.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! rk products list --category traditional --sort price-asc
//! rk products show 65f0a1b2c3d4
//!
//! # Build a cart and check out
//! rk cart add 65f0a1b2c3d4 --size M --qty 2
//! rk cart update 1 -1
//! rk checkout --name "Aisha Khan" --phone 03001234567 --address "12 Mall Road, Lahore"
//!
//! # Admin console
//! RAKHSHAN_ADMIN_PASSWORD=... rk admin login -u admin
//! rk admin orders list
//! rk admin orders status 65f0a1b2c3d4 shipped
//! ```
//!
//! Cart line numbers are 1-based, as printed by `rk cart show`.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rakhshan_admin::AdminContext;
use rakhshan_admin::config::AdminConfig;
use rakhshan_storefront::StorefrontContext;
use rakhshan_storefront::catalog::SortOrder;
use rakhshan_storefront::config::StorefrontConfig;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "rk")]
#[command(author, version, about = "Rakhshan storefront and admin console")]
struct Cli {
    /// Write logs as JSON lines instead of text
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Shop(ShopCommand),
    /// Admin console
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Shopper commands, run against the storefront context.
#[derive(Subcommand)]
enum ShopCommand {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order for everything in the cart
    Checkout {
        /// Full name for delivery
        #[arg(long)]
        name: String,

        /// Contact phone number
        #[arg(long)]
        phone: String,

        /// Delivery address
        #[arg(long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Only show this category (`all` shows everything)
        #[arg(short, long)]
        category: Option<String>,

        /// Sort order (default, price-asc, price-desc, name)
        #[arg(short, long, default_value = "default")]
        sort: SortOrder,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// List categories
    Categories,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        product_id: String,

        /// Size (required when the product has sizes)
        #[arg(long)]
        size: Option<String>,

        /// Color (required when the product has colors)
        #[arg(long)]
        color: Option<String>,

        /// Number of units
        #[arg(long, default_value = "1")]
        qty: String,
    },
    /// Remove a line from the cart
    Remove {
        /// Line number as shown by `rk cart show`
        line: usize,
    },
    /// Change a line's quantity by a signed amount
    Update {
        /// Line number as shown by `rk cart show`
        line: usize,

        /// Amount to add (negative to subtract)
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AdminAction {
    /// Log in and save the session
    Login {
        /// Admin username
        #[arg(short, long)]
        username: String,

        /// Read the password from stdin instead of RAKHSHAN_ADMIN_PASSWORD
        #[arg(long)]
        password_stdin: bool,
    },
    /// Log out and delete the saved session
    Logout,
    /// Show product and order counts
    Dashboard,
    /// Manage products
    Products {
        #[command(subcommand)]
        action: AdminProductsAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: AdminOrdersAction,
    },
    /// Upload product images
    Upload {
        /// Image files (JPG, PNG or WEBP)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Append the uploaded URLs to this product's images
        #[arg(long)]
        product: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminProductsAction {
    /// List products
    List,
    /// Create a product
    Create(ProductArgs),
    /// Update a product; omitted fields keep their current values
    Update {
        /// Product ID
        id: String,

        #[command(flatten)]
        fields: ProductArgs,
    },
    /// Delete a product
    Delete {
        /// Product ID
        id: String,
    },
}

/// Product form fields. List fields are comma-separated.
#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Comma-separated image URLs
    #[arg(long)]
    images: Option<String>,
    /// Comma-separated sizes
    #[arg(long)]
    sizes: Option<String>,
    /// Comma-separated colors
    #[arg(long)]
    colors: Option<String>,
    /// Mark the product in or out of stock
    #[arg(long)]
    in_stock: Option<bool>,
}

#[derive(Subcommand)]
enum AdminOrdersAction {
    /// List orders
    List {
        /// Only show orders with this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one order
    Show {
        /// Order ID
        id: String,
    },
    /// Change an order's status
    Status {
        /// Order ID
        id: String,

        /// New status (pending, processing, shipped, delivered, cancelled)
        status: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(dsn: Option<&str>, environment: Option<&str>) -> Option<sentry::ClientInitGuard> {
    let dsn = dsn?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: environment.map(|e| std::borrow::Cow::Owned(e.to_string())),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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

/// Install the tracing subscriber (and Sentry, when configured).
fn init_telemetry(
    dsn: Option<&str>,
    environment: Option<&str>,
    log_json: bool,
) -> Option<sentry::ClientInitGuard> {
    // Must run before the subscriber is installed
    let guard = init_sentry(dsn, environment);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "rakhshan_storefront=info,rakhshan_admin=info,rakhshan_cli=info".into()
    });

    // Logs go to stderr so command output stays clean
    let json_layer = log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!log_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    if guard.is_some() {
        tracing::debug!("Sentry initialized");
    }
    guard
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let log_json = cli.log_json;
    match cli.command {
        Commands::Admin { action } => {
            let config = AdminConfig::from_env().map_err(CliError::config)?;
            let _sentry_guard = init_telemetry(
                config.sentry_dsn.as_deref(),
                config.sentry_environment.as_deref(),
                log_json,
            );
            let mut ctx = AdminContext::new(config).await;
            run_admin(&mut ctx, action).await.inspect_err(CliError::report)
        }
        Commands::Shop(command) => {
            let config = StorefrontConfig::from_env().map_err(CliError::config)?;
            let _sentry_guard = init_telemetry(
                config.sentry_dsn.as_deref(),
                config.sentry_environment.as_deref(),
                log_json,
            );
            let mut ctx = StorefrontContext::new(config);
            run_storefront(&mut ctx, command)
                .await
                .inspect_err(CliError::report)
        }
    }
}

async fn run_storefront(ctx: &mut StorefrontContext, command: ShopCommand) -> Result<(), CliError> {
    match command {
        ShopCommand::Products { action } => match action {
            ProductsAction::List { category, sort } => {
                commands::shop::list(ctx, category.as_deref(), sort).await
            }
            ProductsAction::Show { id } => commands::shop::show(ctx, &id).await,
            ProductsAction::Categories => commands::shop::categories(ctx).await,
        },
        ShopCommand::Cart { action } => match action {
            CartAction::Show => {
                commands::cart::show(ctx);
                Ok(())
            }
            CartAction::Add {
                product_id,
                size,
                color,
                qty,
            } => commands::cart::add(ctx, &product_id, size, color, &qty).await,
            CartAction::Remove { line } => commands::cart::remove(ctx, line),
            CartAction::Update { line, delta } => commands::cart::update(ctx, line, delta),
            CartAction::Clear => {
                commands::cart::clear(ctx);
                Ok(())
            }
        },
        ShopCommand::Checkout {
            name,
            phone,
            address,
        } => commands::checkout::run(ctx, name, phone, address).await,
    }
}

async fn run_admin(ctx: &mut AdminContext, action: AdminAction) -> Result<(), CliError> {
    match action {
        AdminAction::Login {
            username,
            password_stdin,
        } => commands::admin::login(ctx, &username, password_stdin).await,
        AdminAction::Logout => commands::admin::logout(ctx).await,
        AdminAction::Dashboard => commands::admin::dashboard(ctx).await,
        AdminAction::Products { action } => match action {
            AdminProductsAction::List => commands::admin::list_products(ctx).await,
            AdminProductsAction::Create(fields) => {
                commands::admin::create_product(ctx, fields.into_edit()).await
            }
            AdminProductsAction::Update { id, fields } => {
                commands::admin::update_product(ctx, &id, fields.into_edit()).await
            }
            AdminProductsAction::Delete { id } => commands::admin::delete_product(ctx, &id).await,
        },
        AdminAction::Orders { action } => match action {
            AdminOrdersAction::List { status } => {
                commands::admin::list_orders(ctx, status.as_deref()).await
            }
            AdminOrdersAction::Show { id } => commands::admin::show_order(ctx, &id).await,
            AdminOrdersAction::Status { id, status } => {
                commands::admin::set_order_status(ctx, &id, &status).await
            }
        },
        AdminAction::Upload { files, product } => {
            commands::admin::upload(ctx, &files, product.as_deref()).await
        }
    }
}

impl ProductArgs {
    fn into_edit(self) -> commands::admin::ProductEdit {
        commands::admin::ProductEdit {
            name: self.name,
            price: self.price,
            category: self.category,
            description: self.description,
            images: self.images,
            sizes: self.sizes,
            colors: self.colors,
            in_stock: self.in_stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_delta_parses() {
        let cli = Cli::try_parse_from(["rk", "cart", "update", "2", "-1"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Shop(ShopCommand::Cart {
                action: CartAction::Update { line: 2, delta: -1 }
            })
        ));
    }

    #[test]
    fn test_sort_parses() {
        let cli = Cli::try_parse_from(["rk", "products", "list", "--sort", "price-desc"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::Shop(ShopCommand::Products {
                action: ProductsAction::List {
                    sort: SortOrder::PriceDesc,
                    ..
                }
            })
        ));
    }

    #[test]
    fn test_top_level_commands_route_by_context() {
        let shop = Cli::try_parse_from(["rk", "checkout", "--name", "A", "--phone", "0300", "--address", "Lahore"])
            .expect("parse");
        assert!(matches!(shop.command, Commands::Shop(ShopCommand::Checkout { .. })));

        let admin = Cli::try_parse_from(["rk", "admin", "dashboard"]).expect("parse");
        assert!(matches!(
            admin.command,
            Commands::Admin {
                action: AdminAction::Dashboard
            }
        ));

        assert!(Cli::try_parse_from(["rk", "shop", "cart", "show"]).is_err());
    }
}
