use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sui-garage")]
#[command(about = "Sui Garage: Move lessons and challenge review server")]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve` when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server (configured through the environment)
    Serve,
    /// Work through the Move chapters in this terminal
    Lesson,
}

impl Cli {
    pub fn resolved_command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}
