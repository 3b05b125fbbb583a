use clap::{Args, Subcommand};

mod set;

#[derive(Debug, Args)]
pub(crate) struct MappingCommand {
    #[command(subcommand)]
    command: MappingSubcommand,
}

#[derive(Debug, Subcommand)]
enum MappingSubcommand {
    Set(set::SetMappingArgs),
}

pub(crate) async fn run(command: MappingCommand) -> Result<(), String> {
    match command.command {
        MappingSubcommand::Set(args) => set::run(args).await,
    }
}
