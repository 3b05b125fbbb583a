use clap::Args;
use weft_app::{
    database::{self, Db},
    domain::coupons::{
        models::Discount,
        service::{CouponsService, PgCouponsService},
    },
};

#[derive(Debug, Args)]
pub(crate) struct ListCouponsArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListCouponsArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgCouponsService::new(Db::new(pool));

    let coupons = service
        .list_coupons()
        .await
        .map_err(|error| format!("failed to list coupons: {error}"))?;

    for coupon in coupons {
        let discount = match coupon.discount {
            Discount::Fixed(value) => format!("fixed {value}"),
            Discount::Percentage(value) => format!("{value}%"),
        };

        let state = if coupon.is_active { "active" } else { "inactive" };

        println!("{}  {}  {}  {}", coupon.code, discount, state, coupon.uuid);
    }

    Ok(())
}
