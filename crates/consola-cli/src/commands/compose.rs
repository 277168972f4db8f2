//! Flatten a project into its composite topology.

use std::path::PathBuf;

use clap::Args;
use consola_engine::EngineSettings;
use consola_session::{Session, SessionConfig};

use super::ensure_project_exists;

/// Print the flattened composite the audio backend would receive.
#[derive(Args)]
pub struct ComposeArgs {
    /// Project directory
    pub path: PathBuf,

    /// Also print every composite connection
    #[arg(long)]
    pub connections: bool,
}

/// Run the compose command.
pub fn run(args: ComposeArgs) -> anyhow::Result<()> {
    ensure_project_exists(&args.path)?;

    let mut session = Session::new(SessionConfig::default(), EngineSettings::default());
    session.load_project(&args.path)?;
    let composite = session.composite();

    println!(
        "Composite: {} nodes, {} connections (from {} macro nodes)",
        composite.node_count(),
        composite.connection_count(),
        session.topology().node_count()
    );
    println!();

    for node in composite.nodes() {
        let state = if node.enabled() { "" } else { "  [disabled]" };
        let kind = format!("{:?}", node.node_type());
        println!(
            "  {:<24} {:<16} {} in / {} out{}",
            node.id(),
            kind,
            node.input_channels(),
            node.output_channels(),
            state
        );
    }

    if args.connections {
        println!();
        for connection in composite.connections() {
            println!(
                "  {}[{}] -> {}[{}]",
                connection.from, connection.from_channel, connection.to, connection.to_channel
            );
        }
    }

    let aliases = session.meter_aliases();
    if !aliases.is_empty() {
        let mut pairs: Vec<(&String, &String)> = aliases.iter().collect();
        pairs.sort();
        println!();
        println!("Meter aliases:");
        for (macro_id, composite_id) in pairs {
            println!("  {} -> {}", macro_id, composite_id);
        }
    }

    Ok(())
}
