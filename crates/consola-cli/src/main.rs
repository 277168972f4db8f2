//! Consola CLI - command-line tooling for broadcast routing projects.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "consola")]
#[command(author, version, about = "Consola broadcast routing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a project directory with the default broadcast graph
    Init(commands::init::InitArgs),

    /// List a project's nodes, connections, and micro views
    Inspect(commands::inspect::InspectArgs),

    /// Show the computed visual layout of the macro graph
    Layout(commands::layout::LayoutArgs),

    /// Flatten the project into the composite topology the engine would run
    Compose(commands::compose::ComposeArgs),

    /// Check a project for dangling references and channel mismatches
    Validate(commands::validate::ValidateArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Layout(args) => commands::layout::run(args),
        Commands::Compose(args) => commands::compose::run(args),
        Commands::Validate(args) => commands::validate::run(args),
    }
}
