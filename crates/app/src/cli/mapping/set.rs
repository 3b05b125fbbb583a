use clap::Args;
use uuid::Uuid;
use weft_app::domain::catalog::models::ProductUuid;

use crate::cli::{ContextArgs, app_context};

#[derive(Debug, Args)]
pub(crate) struct SetMappingArgs {
    /// Catalog product UUID
    #[arg(long)]
    product: Uuid,

    /// Commerce platform variant id the product mirrors to
    #[arg(long)]
    variant: String,

    #[command(flatten)]
    context: ContextArgs,
}

pub(crate) async fn run(args: SetMappingArgs) -> Result<(), String> {
    let ctx = app_context(args.context).await?;

    let mapping = ctx
        .checkout
        .map_variant(ProductUuid::from_uuid(args.product), args.variant)
        .await
        .map_err(|error| format!("failed to set variant mapping: {error}"))?;

    println!("product_uuid: {}", mapping.product_uuid);
    println!("external_variant_id: {}", mapping.external_variant_id);

    Ok(())
}
