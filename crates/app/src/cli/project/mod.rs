use clap::{Args, Subcommand};

mod adjust_points;
mod create;

#[derive(Debug, Args)]
pub(crate) struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Debug, Subcommand)]
enum ProjectSubcommand {
    Create(create::CreateProjectArgs),
    AdjustPoints(adjust_points::AdjustPointsArgs),
}

pub(crate) async fn run(command: ProjectCommand) -> Result<(), String> {
    match command.command {
        ProjectSubcommand::Create(args) => create::run(args).await,
        ProjectSubcommand::AdjustPoints(args) => adjust_points::run(args).await,
    }
}
