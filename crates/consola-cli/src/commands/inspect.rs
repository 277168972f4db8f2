//! List a project's nodes, connections, and micro views.

use std::path::PathBuf;

use clap::Args;
use consola_project::Project;

use super::ensure_project_exists;

/// Show the contents of a project's macro graph.
#[derive(Args)]
pub struct InspectArgs {
    /// Project directory
    pub path: PathBuf,

    /// Also list the interior graph of every micro view
    #[arg(long)]
    pub micro: bool,
}

/// Run the inspect command.
pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    ensure_project_exists(&args.path)?;
    let project = Project::load(&args.path)?;

    println!("Project: {}", project.name);
    println!();

    println!("Nodes ({}):", project.topology.node_count());
    for node in project.topology.nodes() {
        let state = if node.enabled() { "" } else { "  [disabled]" };
        let kind = format!("{:?}", node.node_type());
        println!(
            "  {:<24} {:<16} {} in / {} out  {}{}",
            node.id(),
            kind,
            node.input_channels(),
            node.output_channels(),
            node.display_label(),
            state
        );
    }

    println!();
    println!("Connections ({}):", project.topology.connection_count());
    for connection in project.topology.connections() {
        println!(
            "  {}[{}] -> {}[{}]",
            connection.from, connection.from_channel, connection.to, connection.to_channel
        );
    }

    let mut view_ids: Vec<&String> = project.micro_views.keys().collect();
    view_ids.sort();
    if !view_ids.is_empty() {
        println!();
        println!("Micro views ({}):", view_ids.len());
        for view_id in view_ids {
            let view = &project.micro_views[view_id];
            match &view.topology {
                Some(micro) => {
                    println!(
                        "  {} ({} nodes, {} connections)",
                        view_id,
                        micro.node_count(),
                        micro.connection_count()
                    );
                    if args.micro {
                        for node in micro.nodes() {
                            let kind = format!("{:?}", node.node_type());
                            println!(
                                "    {:<24} {:<16} {} in / {} out",
                                node.id(),
                                kind,
                                node.input_channels(),
                                node.output_channels()
                            );
                        }
                        for connection in micro.connections() {
                            println!(
                                "    {}[{}] -> {}[{}]",
                                connection.from,
                                connection.from_channel,
                                connection.to,
                                connection.to_channel
                            );
                        }
                    }
                }
                None => println!("  {} (no interior)", view_id),
            }
        }
    }

    if !project.position_presets.is_empty() {
        println!();
        println!("Position presets ({}):", project.position_presets.len());
        for preset in &project.position_presets {
            println!("  {} ({} / {})", preset.name, preset.person, preset.role);
        }
    }

    Ok(())
}
