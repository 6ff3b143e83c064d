//! Clap derive structures for the `inventra` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// inventra -- manage inventory and assets from the command line
#[derive(Debug, Parser)]
#[command(
    name = "inventra",
    version,
    about = "Manage inventory and assets from the command line",
    long_about = "A client for the Inventra inventory system.\n\n\
        Works against a remote server when one is configured, and falls\n\
        back to the locally mirrored data when the server is unreachable\n\
        or no server is configured at all.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Server profile to use
    #[arg(long, short = 'p', env = "INVENTRA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, short = 's', env = "INVENTRA_SERVER", global = true)]
    pub server: Option<String>,

    /// Mirror/data directory (overrides profile)
    #[arg(long, env = "INVENTRA_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "INVENTRA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "INVENTRA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "INVENTRA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in to the configured server
    Login(LoginArgs),

    /// Sign out and clear the persisted session
    Logout,

    /// Show session and connectivity status
    Status,

    /// Manage products
    #[command(alias = "prod", alias = "p")]
    Products(ProductsArgs),

    /// Manage assets
    #[command(alias = "a")]
    Assets(AssetsArgs),

    /// Server-computed analytics (requires a server)
    Analytics(AnalyticsArgs),

    /// Stock movement history (requires a server)
    Movements,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "INVENTRA_PASSWORD", hide_env = true)]
    pub password: Option<String>,
}

// ── Products ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products
    #[command(alias = "ls")]
    List,

    /// Refresh from the server, bypassing any in-flight retry chain
    Refresh,

    /// Add a product
    Add {
        /// Product name
        name: String,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Units on hand
        #[arg(long, default_value_t = 0)]
        stock: u32,
        /// Low-stock threshold
        #[arg(long, default_value_t = 0)]
        min_stock: u32,
        /// Price per unit
        #[arg(long, default_value_t = 0.0)]
        price: f64,
    },

    /// Update a product
    Update {
        /// Product id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sku: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        stock: Option<u32>,
        #[arg(long)]
        min_stock: Option<u32>,
        #[arg(long)]
        price: Option<f64>,
    },

    /// Delete a product
    #[command(alias = "rm")]
    Delete {
        /// Product id
        id: String,
    },
}

// ── Assets ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AssetsArgs {
    #[command(subcommand)]
    pub command: AssetsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AssetsCommand {
    /// List assets
    #[command(alias = "ls")]
    List,

    /// Refresh from the server, bypassing any in-flight retry chain
    Refresh,

    /// Register an asset
    Add {
        /// Asset name
        name: String,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Update an asset
    Update {
        /// Asset id
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete an asset (blocked while borrowed)
    #[command(alias = "rm")]
    Delete {
        /// Asset id
        id: String,
    },

    /// Check an asset out to someone
    Borrow {
        /// Asset id
        id: String,
        /// Who takes it
        #[arg(long)]
        assignee: String,
    },

    /// Return a borrowed asset
    Return {
        /// Asset id
        id: String,
    },
}

// ── Analytics ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AnalyticsArgs {
    #[command(subcommand)]
    pub command: AnalyticsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AnalyticsCommand {
    /// Headline counters
    Overview,
    /// Stock in/out per period
    Trends,
    /// Per-category breakdown
    Categories,
    /// Stock velocity per product
    Velocity,
    /// Server-generated insights
    Insights,
    /// Active alerts
    Alerts,
}
