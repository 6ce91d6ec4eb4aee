//! Storefront cart CLI
//!
//! A thin presentation layer over the cart store: each subcommand runs one
//! store operation against a file-backed slot and renders the returned
//! snapshot.

use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use aragon_cart::{
    cart::Cart,
    merchandise::{ProductSummary, SelectedOption, Variant},
    money::{Money, MoneyError},
    slot::FileSlot,
    store::{CartStore, LineAdjustment},
};

/// Local storefront cart.
#[derive(Debug, Parser)]
#[command(name = "cart", about = "Local storefront cart", long_about = None)]
struct CartCli {
    /// Directory holding the persisted cart state.
    #[arg(long, env = "CART_STATE_DIR", default_value = ".cart")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl CartCli {
    /// Load configuration from environment and CLI arguments.
    fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current cart.
    Show,

    /// Add a product variant to the cart.
    Add {
        /// Variant (merchandise) identifier.
        merchandise_id: String,

        /// Quantity to add.
        #[arg(long, default_value_t = 1)]
        quantity: u32,

        /// Parent product identifier.
        #[arg(long)]
        product_id: String,

        /// Parent product handle.
        #[arg(long)]
        handle: String,

        /// Parent product title.
        #[arg(long)]
        title: String,

        /// Variant title, e.g. "Medium".
        #[arg(long, default_value = "Default")]
        variant_title: String,

        /// Unit price, e.g. "19.99".
        #[arg(long)]
        price: String,

        /// ISO 4217 currency code.
        #[arg(long, default_value = "USD")]
        currency: String,

        /// Selected option as Name=Value; repeatable.
        #[arg(long = "option")]
        options: Vec<String>,
    },

    /// Set the quantity of an existing line (0 removes it).
    Update {
        /// Variant (merchandise) identifier.
        merchandise_id: String,

        /// New quantity.
        quantity: u32,
    },

    /// Step a line's quantity up by one.
    Plus {
        /// Variant (merchandise) identifier.
        merchandise_id: String,
    },

    /// Step a line's quantity down by one.
    Minus {
        /// Variant (merchandise) identifier.
        merchandise_id: String,
    },

    /// Remove a line.
    Remove {
        /// Variant (merchandise) identifier.
        merchandise_id: String,
    },

    /// Empty the cart.
    Clear,
}

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
enum CliError {
    /// A price argument was not a decimal amount.
    #[error(transparent)]
    Price(#[from] MoneyError),

    /// An --option argument was not of the form Name=Value.
    #[error("invalid option {0:?}, expected Name=Value")]
    InvalidOption(String),

    /// Writing the rendered cart to stdout failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn parse_option(raw: &str) -> Result<SelectedOption, CliError> {
    raw.split_once('=')
        .map(|(name, value)| SelectedOption::new(name, value))
        .ok_or_else(|| CliError::InvalidOption(raw.to_string()))
}

fn render(cart: &Cart) -> Result<(), CliError> {
    let mut out = io::stdout().lock();

    if cart.is_empty() {
        writeln!(out, "cart is empty")?;
        return Ok(());
    }

    for line in &cart.lines {
        writeln!(
            out,
            "{} x {} ({}) [{}]  {}",
            line.quantity,
            line.merchandise.product.title,
            line.merchandise.title,
            line.merchandise.id,
            line.cost.total_amount,
        )?;
    }

    writeln!(out, "--")?;
    writeln!(out, "items:    {}", cart.total_quantity)?;
    writeln!(out, "subtotal: {}", cart.cost.subtotal_amount)?;
    writeln!(out, "tax:      {}", cart.cost.total_tax_amount)?;
    writeln!(out, "total:    {}", cart.cost.total_amount)?;

    Ok(())
}

fn run(store: &CartStore<FileSlot>, command: Command) -> Result<Cart, CliError> {
    let cart = match command {
        Command::Show => store.load(),
        Command::Add {
            merchandise_id,
            quantity,
            product_id,
            handle,
            title,
            variant_title,
            price,
            currency,
            options,
        } => {
            let selected_options = options
                .iter()
                .map(|raw| parse_option(raw))
                .collect::<Result<Vec<_>, _>>()?;

            let product = ProductSummary {
                id: product_id,
                handle,
                title,
                featured_image: None,
            };

            let variant = Variant {
                id: merchandise_id.clone(),
                title: variant_title,
                selected_options,
                price: Money::parse(&price, currency)?,
            };

            store.add_line(&merchandise_id, quantity, product, variant)
        }
        Command::Update {
            merchandise_id,
            quantity,
        } => {
            // The line stores only its running total; reconstruct the unit
            // price the way the storefront UI does.
            let current = store.load();
            let unit_price = current
                .line(&merchandise_id)
                .map(|line| line.cost.total_amount.unit_price(line.quantity));

            match unit_price {
                Some(unit_price) => {
                    store.update_line_quantity(&merchandise_id, quantity, &unit_price)
                }
                None => current,
            }
        }
        Command::Plus { merchandise_id } => {
            store.adjust_line(&merchandise_id, LineAdjustment::Increment)
        }
        Command::Minus { merchandise_id } => {
            store.adjust_line(&merchandise_id, LineAdjustment::Decrement)
        }
        Command::Remove { merchandise_id } => store.remove_line(&merchandise_id),
        Command::Clear => store.clear(),
    };

    if store.take_write_error().is_some() {
        warn!("cart state was not persisted; changes are in-memory only");
    }

    Ok(cart)
}

fn main() -> Result<(), CliError> {
    // Load configuration from .env and CLI arguments
    let cli = CartCli::load().unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let store = CartStore::new(FileSlot::new(cli.state_dir));

    let cart = run(&store, cli.command)?;

    render(&cart)
}
