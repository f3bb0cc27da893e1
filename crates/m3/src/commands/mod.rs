pub mod model;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Work with .m3 models and .m3a animation containers
    #[command(visible_alias = "m")]
    Model {
        #[command(subcommand)]
        command: model::ModelCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Model { command } => command.handle(),
        }
    }
}
