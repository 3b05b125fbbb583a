use clap::Args;

use crate::cli::{ContextArgs, app_context};

#[derive(Debug, Args)]
pub(crate) struct RunMirrorArgs {
    /// Maximum number of orders to process in this run
    #[arg(long, default_value_t = 50)]
    limit: u32,

    #[command(flatten)]
    context: ContextArgs,
}

pub(crate) async fn run(args: RunMirrorArgs) -> Result<(), String> {
    let ctx = app_context(args.context).await?;

    let report = ctx
        .checkout
        .retry_pending_mirrors(args.limit)
        .await
        .map_err(|error| format!("mirror run failed: {error}"))?;

    println!("scanned: {}", report.scanned);
    println!("mirrored: {}", report.mirrored);
    println!("failed: {}", report.failed);

    Ok(())
}
