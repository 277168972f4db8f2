//! Show the computed visual layout of a project's macro graph.

use std::path::PathBuf;

use clap::Args;
use consola_graph::{GraphLayout, PositionOverride};
use consola_project::Project;

use super::ensure_project_exists;

/// Print the column/row layout the UI would render.
#[derive(Args)]
pub struct LayoutArgs {
    /// Project directory
    pub path: PathBuf,

    /// Ignore stored node positions and show only the computed layout
    #[arg(long)]
    pub computed: bool,
}

/// Run the layout command.
pub fn run(args: LayoutArgs) -> anyhow::Result<()> {
    ensure_project_exists(&args.path)?;
    let project = Project::load(&args.path)?;

    let mut layout = GraphLayout::new();
    if !args.computed {
        layout.set_overrides(
            project
                .macro_layout
                .iter()
                .map(|(id, p)| (id.clone(), PositionOverride { x: p.x, y: p.y }))
                .collect(),
        );
    }
    layout.rebuild(&project.topology);

    // Left-to-right, top-to-bottom, the order the canvas draws them in.
    let mut visuals: Vec<_> = layout.nodes().to_vec();
    visuals.sort_by(|lhs, rhs| {
        lhs.x
            .total_cmp(&rhs.x)
            .then_with(|| lhs.y.total_cmp(&rhs.y))
            .then_with(|| lhs.id.cmp(&rhs.id))
    });

    println!("Layout v{} ({} nodes):", layout.version(), visuals.len());
    for visual in &visuals {
        println!(
            "  ({:.2}, {:.2})  {:<24} {}",
            visual.x, visual.y, visual.id, visual.label
        );
    }

    println!();
    println!("Edges ({}):", layout.connections().len());
    for connection in layout.connections() {
        println!("  {} -> {}", connection.from, connection.to);
    }

    Ok(())
}
