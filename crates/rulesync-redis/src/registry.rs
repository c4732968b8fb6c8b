//! Script node registration
//!
//! The flow engine owns the live node set. This module only prepares the data
//! it needs ([`ScriptNode`]) and hands it to whatever [`ScriptNodeRegistry`]
//! the caller supplies.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use rulesync_common::{Result, RuleSyncError};

use crate::node::{NodeDescriptor, NodeType};

/// Everything a flow engine needs to (re)build a script node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptNode {
    pub id: String,
    pub node_type: NodeType,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub script: String,
}

impl ScriptNode {
    /// Build from a changed store entry: its compact identifier and new script
    pub fn from_change(identifier: &str, script: &str) -> Result<Self> {
        let descriptor = NodeDescriptor::try_parse(identifier)?;
        Self::from_descriptor(&descriptor, script)
    }

    pub fn from_descriptor(descriptor: &NodeDescriptor, script: &str) -> Result<Self> {
        let node_type = descriptor
            .resolve_type()
            .ok_or_else(|| RuleSyncError::UnknownNodeType(descriptor.node_type.clone()))?;
        Ok(Self {
            id: descriptor.node_id.clone(),
            node_type,
            name: descriptor.name.clone(),
            language: descriptor.language().map(str::to_string),
            script: script.to_string(),
        })
    }
}

/// Sink for script node updates, implemented by the flow engine integration
pub trait ScriptNodeRegistry: Send + Sync {
    /// Create or replace a script node
    fn register(&self, node: ScriptNode) -> Result<()>;

    /// Remove a node by ID, returning whether it existed
    fn remove(&self, id: &str) -> Result<bool>;
}

/// Apply a changed script entry to the registry.
///
/// Nothing is registered when the identifier is malformed or names an unknown
/// node type.
pub fn change_script_node(
    registry: &dyn ScriptNodeRegistry,
    identifier: &str,
    script: &str,
) -> Result<()> {
    let node = ScriptNode::from_change(identifier, script)?;
    tracing::info!(
        id = %node.id,
        node_type = %node.node_type,
        language = node.language.as_deref().unwrap_or_default(),
        "Updating script node"
    );
    registry.register(node)
}

/// Remove the node behind a deleted script entry
pub fn remove_script_node(registry: &dyn ScriptNodeRegistry, identifier: &str) -> Result<bool> {
    let descriptor = NodeDescriptor::try_parse(identifier)?;
    let removed = registry.remove(&descriptor.node_id)?;
    tracing::info!(id = %descriptor.node_id, removed, "Removing script node");
    Ok(removed)
}

/// In-memory registry, for embedding and tests
#[derive(Debug, Default)]
pub struct MemoryScriptNodeRegistry {
    nodes: DashMap<String, ScriptNode>,
}

impl MemoryScriptNodeRegistry {
    pub fn new() -> Self {
        Self {
            nodes: DashMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<ScriptNode> {
        self.nodes.get(id).map(|n| n.clone())
    }

    /// All nodes sorted by ID
    pub fn list(&self) -> Vec<ScriptNode> {
        let mut nodes: Vec<_> = self.nodes.iter().map(|n| n.clone()).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));
        nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl ScriptNodeRegistry for MemoryScriptNodeRegistry {
    fn register(&self, node: ScriptNode) -> Result<()> {
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.nodes.remove(id).is_some())
    }
}
