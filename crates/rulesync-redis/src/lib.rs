//! rulesync Redis - Redis rule source helpers
//!
//! This crate provides the pieces a Redis-backed rule listener needs:
//! - Topology builder: single-endpoint and sentinel connection descriptors
//! - Node codec: compact `nodeId:type[:name[:language]]` identifiers to
//!   structured descriptors and back to `<node>` fragments
//! - Flow document assembly from chain and script entries
//! - Script node registration against a caller-supplied registry
//! - Settings loading and validation

pub mod node;
pub mod registry;
pub mod settings;
pub mod topology;
pub mod xml;

pub use rulesync_common::{ErrorCode, Result, RuleSyncError};

pub use node::{NodeDescriptor, NodeType};
pub use registry::{
    MemoryScriptNodeRegistry, ScriptNode, ScriptNodeRegistry, change_script_node,
    remove_script_node,
};
pub use settings::{RedisRuleSettings, SyncMode};
pub use topology::{
    ConnectionParameters, Credentials, Topology, TopologyConfig, TopologyKind, build_sentinel,
    build_single,
};
pub use xml::{FlowDocument, render_chain, render_flow, render_node, render_nodes, render_script_node};
