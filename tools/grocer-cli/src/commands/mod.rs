//! CLI command implementations.

pub mod cart;
pub mod config;
pub mod order;
pub mod product;
pub mod profile;

use clap::{Args, Subcommand, ValueEnum};

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    #[command(subcommand)]
    pub command: ProductCommand,
}

#[derive(Subcommand)]
pub enum ProductCommand {
    /// Add a product to the catalog.
    Add {
        /// Product name.
        #[arg(long)]
        name: String,

        /// Base price, e.g. 180 or 49.99.
        #[arg(long)]
        price: String,

        /// Image URL.
        #[arg(long)]
        image: String,

        /// Image alt text.
        #[arg(long)]
        image_alt: String,

        /// One-line description.
        #[arg(long)]
        short_description: String,

        /// Full description.
        #[arg(long)]
        full_description: String,

        /// Category tag.
        #[arg(long)]
        category: String,

        /// Keywords for image search.
        #[arg(long, default_value = "")]
        data_ai_hint: String,

        /// Variation as NAME=MODIFIER, e.g. "25kg Bag=-20". Repeatable.
        #[arg(long = "variation", required = true, allow_hyphen_values = true)]
        variations: Vec<String>,
    },
    /// List catalog products.
    List {
        /// Only show this category.
        #[arg(long)]
        category: Option<String>,
        /// Only show products whose name contains this text.
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a product and its variation prices.
    Show {
        /// Product ID.
        id: String,
    },
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Add a product variation to the cart.
    Add {
        /// Product ID.
        product: String,

        /// Variation name (default: the product's first variation).
        #[arg(long)]
        variation: Option<String>,

        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,
    },
    /// Remove a line from the cart.
    Remove {
        /// Product ID.
        product: String,

        /// Variation name.
        variation: String,
    },
    /// Set a line's quantity. Zero or less removes it.
    Set {
        /// Product ID.
        product: String,

        /// Variation name.
        variation: String,

        /// New quantity.
        #[arg(allow_hyphen_values = true)]
        quantity: i64,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the cart and its total.
    Show,
}

/// Arguments for the profile command.
#[derive(Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

/// Customer type chosen at registration.
#[derive(Clone, Copy, ValueEnum)]
pub enum UserTypeArg {
    Student,
    NonStudent,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Create or replace the signed-in customer's profile.
    Create {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        /// Student or non-student.
        #[arg(long, value_enum)]
        user_type: UserTypeArg,

        /// University (students).
        #[arg(long)]
        university: Option<String>,

        /// Hostel or boarding house (students).
        #[arg(long)]
        hostel: Option<String>,

        #[arg(long)]
        block: Option<String>,

        #[arg(long)]
        room: Option<String>,

        /// Street address (non-students).
        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        landmark: Option<String>,

        /// Township (non-students).
        #[arg(long)]
        township: Option<String>,

        /// City (non-students, default from config).
        #[arg(long)]
        city: Option<String>,

        /// Latitude of the delivery point.
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<f64>,

        /// Longitude of the delivery point.
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<f64>,
    },
    /// Show a profile (default: the signed-in customer's).
    Show {
        /// User ID.
        user: Option<String>,
    },
    /// List all profiles.
    List,
}

/// Arguments for the order command.
#[derive(Args)]
pub struct OrderArgs {
    #[command(subcommand)]
    pub command: OrderCommand,
}

/// Which orders to list.
#[derive(Clone, Copy, ValueEnum)]
pub enum OrderFilter {
    Pending,
    Completed,
}

#[derive(Subcommand)]
pub enum OrderCommand {
    /// Place an order for everything in the cart.
    Place {
        /// Delivery time, RFC 3339 or "YYYY-MM-DD HH:MM" (UTC). Default: now.
        #[arg(long)]
        at: Option<String>,

        /// Reuse a key from a failed attempt to avoid a duplicate order.
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Show an order.
    Show {
        /// Order ID.
        id: String,
    },
    /// List orders by status.
    List {
        #[arg(long, value_enum, default_value = "pending")]
        status: OrderFilter,
    },
    /// List the signed-in customer's orders.
    Mine,
    /// Mark an order as completed.
    Complete {
        /// Order ID.
        id: String,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}
