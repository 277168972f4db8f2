//! Check a project for dangling references and channel mismatches.
//!
//! The in-memory topology prunes dangling edges as it mutates, but a
//! hand-edited or truncated `graph.json` can still smuggle them in:
//! `connect` does not verify that endpoints exist. This command runs the
//! full invariant sweep over the macro graph, every micro view, and the
//! flattened composite.

use std::path::PathBuf;

use clap::Args;
use consola_graph::{Topology, compose};
use consola_project::Project;

use super::ensure_project_exists;

/// Validate a project's graphs.
#[derive(Args)]
pub struct ValidateArgs {
    /// Project directory
    pub path: PathBuf,
}

/// Run the validate command.
pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    ensure_project_exists(&args.path)?;
    let project = Project::load(&args.path)?;

    let mut problems = Vec::new();
    check_topology(&project.topology, "macro graph", &mut problems);

    let mut view_ids: Vec<&String> = project.micro_views.keys().collect();
    view_ids.sort();
    for view_id in &view_ids {
        if let Some(micro) = &project.micro_views[*view_id].topology {
            check_topology(micro, &format!("micro view '{view_id}'"), &mut problems);
        }
    }

    let views = view_ids.iter().filter_map(|id| {
        project.micro_views[*id]
            .topology
            .as_ref()
            .map(|micro| (id.as_str(), micro))
    });
    let composite = compose(&project.topology, views);
    check_topology(&composite.topology, "composite", &mut problems);

    for (id, position) in &project.macro_layout {
        if !project.topology.contains(id) {
            problems.push(format!(
                "macro layout: stored position ({:.2}, {:.2}) for unknown node '{id}'",
                position.x, position.y
            ));
        }
    }

    if problems.is_empty() {
        println!(
            "OK: {} macro nodes, {} micro views, {} composite nodes",
            project.topology.node_count(),
            view_ids.len(),
            composite.topology.node_count()
        );
        return Ok(());
    }

    for problem in &problems {
        println!("  {problem}");
    }
    anyhow::bail!("{} problem(s) found", problems.len());
}

fn check_topology(topology: &Topology, context: &str, problems: &mut Vec<String>) {
    for connection in topology.connections() {
        match topology.node(&connection.from) {
            None => problems.push(format!(
                "{context}: connection from unknown node '{}'",
                connection.from
            )),
            Some(source) => {
                if connection.from_channel >= source.output_channels() {
                    problems.push(format!(
                        "{context}: {}[{}] exceeds source output count {}",
                        connection.from,
                        connection.from_channel,
                        source.output_channels()
                    ));
                }
            }
        }
        match topology.node(&connection.to) {
            None => problems.push(format!(
                "{context}: connection to unknown node '{}'",
                connection.to
            )),
            Some(destination) => {
                if connection.to_channel >= destination.input_channels() {
                    problems.push(format!(
                        "{context}: {}[{}] exceeds destination input count {}",
                        connection.to,
                        connection.to_channel,
                        destination.input_channels()
                    ));
                }
            }
        }
    }
}
