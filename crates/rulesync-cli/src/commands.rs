//! Command line arguments and command execution

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Parser, Subcommand};
use serde::{Deserialize, Serialize};

use rulesync_redis::{FlowDocument, RedisRuleSettings, SyncMode, TopologyConfig, render_script_node};

/// Inspect Redis rule source settings and render script nodes
#[derive(Debug, Parser)]
#[command(name = "rulesync", version)]
pub struct Cli {
    /// Log at DEBUG level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate settings and print the resolved topologies as JSON
    Topology {
        #[arg(
            short,
            long,
            env = "RULESYNC_CONFIG",
            default_value = "conf/rulesync.yml"
        )]
        config: PathBuf,
    },
    /// Render the <node> element for a compact identifier
    #[command(group(
        ArgGroup::new("source")
            .required(true)
            .args(["content", "content_file"])
    ))]
    Render {
        /// nodeId:type[:name[:language]]
        #[arg(short, long)]
        identifier: String,
        /// Script body
        #[arg(long)]
        content: Option<String>,
        /// File holding the script body
        #[arg(long)]
        content_file: Option<PathBuf>,
    },
    /// Render a full flow document from a JSON file of scripts and chains
    Flow {
        /// `{"scripts": {"id:type": "body"}, "chains": {"name": "EL"}}`
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TopologyReport<'a> {
    mode: SyncMode,
    chain: &'a TopologyConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    script: Option<&'a TopologyConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct FlowInput {
    #[serde(default)]
    scripts: BTreeMap<String, String>,
    #[serde(default)]
    chains: BTreeMap<String, String>,
}

/// Execute a command, returning what should be printed on stdout
pub fn run(command: &Command) -> anyhow::Result<String> {
    match command {
        Command::Topology { config } => topology(config),
        Command::Render {
            identifier,
            content,
            content_file,
        } => {
            let content = match (content, content_file) {
                (Some(content), _) => content.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("either --content or --content-file is required"),
            };
            Ok(render_script_node(identifier, &content)?)
        }
        Command::Flow { input } => flow(input),
    }
}

fn topology(path: &Path) -> anyhow::Result<String> {
    let settings = RedisRuleSettings::load(path)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    let chain = settings.chain_topology();
    let script = settings.script_topology();
    tracing::info!(
        redis_mode = %settings.redis_mode,
        chain_database = chain.database(),
        has_script_data = script.is_some(),
        "Resolved redis topology"
    );

    let report = TopologyReport {
        mode: settings.mode,
        chain: &chain,
        script: script.as_ref(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

fn flow(path: &Path) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: FlowInput = serde_json::from_str(&content)
        .with_context(|| format!("Invalid flow input in {}", path.display()))?;

    let mut doc = FlowDocument::new();
    for (identifier, script) in input.scripts {
        doc.add_script(identifier, script);
    }
    for (name, el) in input.chains {
        doc.add_chain(name, el);
    }
    tracing::debug!(
        scripts = doc.script_count(),
        chains = doc.chain_count(),
        "Rendering flow document"
    );
    Ok(doc.render())
}
