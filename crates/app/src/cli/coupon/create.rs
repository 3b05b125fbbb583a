use clap::Args;
use jiff::Timestamp;
use weft_app::{
    database::{self, Db},
    domain::coupons::{
        models::Discount,
        service::{CouponsService, PgCouponsService},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateCouponArgs {
    /// Coupon code (stored lowercase)
    #[arg(long)]
    code: String,

    /// Discount kind: fixed or percentage
    #[arg(long)]
    kind: String,

    /// Discount value: minor units for fixed, whole percent otherwise
    #[arg(long)]
    value: u64,

    /// Inclusive start of the validity window (RFC 3339)
    #[arg(long)]
    valid_from: Option<Timestamp>,

    /// Inclusive end of the validity window (RFC 3339)
    #[arg(long)]
    valid_until: Option<Timestamp>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: CreateCouponArgs) -> Result<(), String> {
    let discount = Discount::from_parts(&args.kind, args.value)
        .ok_or_else(|| format!("unknown discount kind '{}'", args.kind))?;

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::new(Db::new(pool));

    let coupon = service
        .create_coupon(args.code, discount, args.valid_from, args.valid_until)
        .await
        .map_err(|error| format!("failed to create coupon: {error}"))?;

    println!("coupon_uuid: {}", coupon.uuid);
    println!("code: {}", coupon.code);

    Ok(())
}
