use clap::{Args, Parser, Subcommand};
use weft_app::context::{AppContext, ClientsConfig};
use weft_app::clients::{
    commerce::CommerceConfig, payments::PaymentsConfig, shipping::ShippingConfig,
};

mod coupon;
mod mapping;
mod mirror;
mod project;

#[derive(Debug, Parser)]
#[command(name = "weft-app", about = "Weft back-office CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Project(project::ProjectCommand),
    Coupon(coupon::CouponCommand),
    Mapping(mapping::MappingCommand),
    Mirror(mirror::MirrorCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Project(command) => project::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
            Commands::Mapping(command) => mapping::run(command).await,
            Commands::Mirror(command) => mirror::run(command).await,
        }
    }
}

/// Connection settings shared by the commands that need the full
/// application context (external clients included).
#[derive(Debug, Args)]
pub(crate) struct ContextArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Payment processor API base
    #[arg(long, env = "PAYMENTS_ADDR")]
    payments_addr: String,

    /// Payment processor API key
    #[arg(long, env = "PAYMENTS_API_KEY", hide_env_values = true)]
    payments_api_key: String,

    /// Commerce platform API base
    #[arg(long, env = "COMMERCE_ADDR")]
    commerce_addr: String,

    /// Commerce platform access token
    #[arg(long, env = "COMMERCE_ACCESS_TOKEN", hide_env_values = true)]
    commerce_access_token: String,

    /// Shipping rate API base
    #[arg(long, env = "SHIPPING_ADDR")]
    shipping_addr: String,

    /// Shipping rate API key
    #[arg(long, env = "SHIPPING_API_KEY", hide_env_values = true)]
    shipping_api_key: String,
}

pub(crate) async fn app_context(args: ContextArgs) -> Result<AppContext, String> {
    AppContext::from_database_url(
        &args.database_url,
        ClientsConfig {
            payments: PaymentsConfig {
                addr: args.payments_addr,
                api_key: args.payments_api_key,
            },
            commerce: CommerceConfig {
                addr: args.commerce_addr,
                access_token: args.commerce_access_token,
            },
            shipping: ShippingConfig {
                addr: args.shipping_addr,
                api_key: args.shipping_api_key,
            },
        },
    )
    .await
    .map_err(|error| format!("failed to initialise application context: {error}"))
}
