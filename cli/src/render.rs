use dspw_cluster::{ClusterSnapshot, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

pub fn render(snapshot: &ClusterSnapshot, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(snapshot),
        OutputFormat::Json => serde_json::to_string_pretty(snapshot)?,
        OutputFormat::Yaml => serde_yaml::to_string(snapshot)?,
    })
}

/// Role table only, plus skipped role directories
pub fn render_roles(snapshot: &ClusterSnapshot) -> String {
    role_lines(snapshot)
        .into_iter()
        .map(|line| line + "\n")
        .collect()
}

fn role_lines(snapshot: &ClusterSnapshot) -> Vec<String> {
    let width = snapshot
        .roles
        .iter()
        .map(|r| r.role.token().len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<String> = snapshot
        .roles
        .iter()
        .map(|role| {
            format!(
                "{:<width$}  available: {}  assigned: {}",
                role.role.token(),
                join(&role.available),
                join(&role.assigned),
                width = width
            )
        })
        .collect();

    if !snapshot.unsupported_roles.is_empty() {
        lines.push(format!(
            "unsupported: {}",
            snapshot.unsupported_roles.join(", ")
        ));
    }

    lines
}

fn render_text(snapshot: &ClusterSnapshot) -> String {
    let mut lines = vec![
        format!("proposal:  {}", snapshot.proposal_dir.display()),
        format!("available: {}", join(&snapshot.available)),
        format!("assigned:  {}", join(&snapshot.assigned)),
        String::new(),
    ];
    lines.extend(role_lines(snapshot));

    lines.into_iter().map(|line| line + "\n").collect()
}

fn join(nodes: &[NodeId]) -> String {
    if nodes.is_empty() {
        return "-".to_string();
    }

    nodes
        .iter()
        .map(NodeId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
