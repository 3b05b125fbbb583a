use clap::Args;
use uuid::Uuid;
use weft_app::{
    database::{self, Db},
    domain::projects::{
        models::{PointsAdjustment, ProjectUuid},
        service::{PgProjectsService, ProjectsService},
    },
};

#[derive(Debug, Args)]
pub(crate) struct AdjustPointsArgs {
    /// Project UUID
    #[arg(long)]
    project: Uuid,

    /// Delta against the allocated total (may be negative)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    allocated: i64,

    /// Delta against the consumed total (may be negative)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    consumed: i64,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: AdjustPointsArgs) -> Result<(), String> {
    if args.allocated == 0 && args.consumed == 0 {
        return Err("nothing to adjust: pass --allocated and/or --consumed".to_string());
    }

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgProjectsService::new(Db::new(pool));

    let project = service
        .adjust_points(
            ProjectUuid::from_uuid(args.project),
            PointsAdjustment {
                allocated_delta: args.allocated,
                consumed_delta: args.consumed,
            },
        )
        .await
        .map_err(|error| format!("failed to adjust points: {error}"))?;

    println!("project_uuid: {}", project.uuid);
    println!("points: {}", project.points);
    println!("points_used: {}", project.points_used);
    println!("available: {}", project.available_points());

    Ok(())
}
