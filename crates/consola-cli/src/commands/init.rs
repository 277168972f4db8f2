//! Create a new project directory.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use consola_project::Project;

/// Create a project directory seeded with the default broadcast graph.
#[derive(Args)]
pub struct InitArgs {
    /// Directory to create the project in
    pub path: PathBuf,

    /// Project name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Start from an empty graph instead of the broadcast default
    #[arg(long)]
    pub empty: bool,
}

/// Run the init command.
pub fn run(args: InitArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        !args.path.join("graph.json").exists(),
        "a project already exists at {}",
        args.path.display()
    );

    let name = args.name.unwrap_or_else(|| {
        args.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let project = if args.empty {
        Project::empty(name)
    } else {
        Project::with_default_graph(name)
    };
    project
        .save(&args.path)
        .with_context(|| format!("could not write project to {}", args.path.display()))?;

    println!("Created project '{}' at {}", project.name, args.path.display());
    println!(
        "  {} nodes, {} connections",
        project.topology.node_count(),
        project.topology.connection_count()
    );
    Ok(())
}
