use clap::Args;
use weft_app::{
    database::{self, Db},
    domain::coupons::service::{CouponsService, PgCouponsService},
};

#[derive(Debug, Args)]
pub(crate) struct DeactivateCouponArgs {
    /// Coupon code
    #[arg(long)]
    code: String,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: DeactivateCouponArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::new(Db::new(pool));

    let coupon = service
        .deactivate(args.code)
        .await
        .map_err(|error| format!("failed to deactivate coupon: {error}"))?;

    println!("code: {}", coupon.code);
    println!("active: {}", coupon.is_active);

    Ok(())
}
