use clap::{Args, Subcommand};

mod run_worker;

#[derive(Debug, Args)]
pub(crate) struct MirrorCommand {
    #[command(subcommand)]
    command: MirrorSubcommand,
}

#[derive(Debug, Subcommand)]
enum MirrorSubcommand {
    /// Re-attempt orders whose external mirror is still outstanding
    Run(run_worker::RunMirrorArgs),
}

pub(crate) async fn run(command: MirrorCommand) -> Result<(), String> {
    match command.command {
        MirrorSubcommand::Run(args) => run_worker::run(args).await,
    }
}
