use clap::Args;
use uuid::Uuid;
use weft_app::{
    database::{self, Db},
    domain::projects::{
        models::{NewProject, PackType, ProjectUuid},
        service::{PgProjectsService, ProjectsService},
    },
};

#[derive(Debug, Args)]
pub(crate) struct CreateProjectArgs {
    /// Owner user UUID
    #[arg(long)]
    owner: Uuid,

    /// Project display name
    #[arg(long)]
    name: String,

    /// Subscription pack: start, pro, or ultra
    #[arg(long)]
    pack_type: String,

    /// Initial point allocation
    #[arg(long)]
    points: u64,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Optional project UUID; generated when omitted
    #[arg(long)]
    project_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateProjectArgs) -> Result<(), String> {
    let pack_type = PackType::parse(&args.pack_type)
        .ok_or_else(|| format!("unknown pack type '{}'", args.pack_type))?;

    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgProjectsService::new(Db::new(pool));

    let uuid = args
        .project_uuid
        .map_or_else(ProjectUuid::new, ProjectUuid::from_uuid);

    let project = service
        .create_project(NewProject {
            uuid,
            owner_uuid: args.owner,
            name: args.name,
            pack_type,
            points: args.points,
        })
        .await
        .map_err(|error| format!("failed to create project: {error}"))?;

    println!("project_uuid: {}", project.uuid);
    println!("points: {}", project.points);

    Ok(())
}
