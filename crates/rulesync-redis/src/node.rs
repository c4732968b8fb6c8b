//! Script node descriptors
//!
//! A changed script entry in the store is keyed by a compact identifier of the
//! form `nodeId:type[:name[:language]]`. This module turns that identifier into
//! a [`NodeDescriptor`] and knows the node-type codes a flow engine accepts.
//!
//! Colons cannot appear inside a segment; there is no escape syntax.

use serde::{Deserialize, Serialize};

use rulesync_common::{Result, RuleSyncError};

const SEGMENT_DELIMITER: char = ':';

/// Structured form of a compact node identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescriptor {
    pub node_id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl NodeDescriptor {
    /// Parse a compact identifier.
    ///
    /// Returns `None` when fewer than two segments can be read. Segments past
    /// the fourth are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use rulesync_redis::NodeDescriptor;
    ///
    /// let node = NodeDescriptor::parse("s1:script:Discount:groovy").unwrap();
    /// assert_eq!(node.node_id, "s1");
    /// assert_eq!(node.language.as_deref(), Some("groovy"));
    ///
    /// assert!(NodeDescriptor::parse("s1").is_none());
    /// ```
    pub fn parse(identifier: &str) -> Option<Self> {
        let mut segments = split_segments(identifier).into_iter();
        let (Some(node_id), Some(node_type)) = (segments.next(), segments.next()) else {
            return None;
        };
        Some(Self {
            node_id: node_id.to_string(),
            node_type: node_type.to_string(),
            name: segments.next().unwrap_or_default().to_string(),
            language: segments.next().map(str::to_string),
        })
    }

    /// Like [`NodeDescriptor::parse`], reporting a malformed identifier as an error
    pub fn try_parse(identifier: &str) -> Result<Self> {
        Self::parse(identifier)
            .ok_or_else(|| RuleSyncError::InvalidIdentifier(identifier.to_string()))
    }

    /// The language tag when it is present and not blank
    pub fn language(&self) -> Option<&str> {
        rulesync_common::non_blank(self.language.as_deref())
    }

    /// Resolve the type code against the known node types
    pub fn resolve_type(&self) -> Option<NodeType> {
        NodeType::from_code(&self.node_type)
    }
}

impl std::str::FromStr for NodeDescriptor {
    type Err = RuleSyncError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::try_parse(s)
    }
}

/// Split an identifier into its segments.
///
/// A non-empty run between colons counts as a segment only when it is joined
/// to a non-empty neighbour by a single colon. Runs isolated by doubled
/// colons or by the ends of the string are dropped, so `a::b` yields nothing
/// and `a:b::c` yields `a` and `b`.
fn split_segments(identifier: &str) -> Vec<&str> {
    let pieces: Vec<&str> = identifier.split(SEGMENT_DELIMITER).collect();
    pieces
        .iter()
        .enumerate()
        .filter(|&(i, piece)| {
            !piece.is_empty()
                && ((i > 0 && !pieces[i - 1].is_empty())
                    || pieces.get(i + 1).is_some_and(|next| !next.is_empty()))
        })
        .map(|(_, piece)| *piece)
        .collect()
}

/// Node types understood by the flow engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Common,
    Switch,
    Boolean,
    For,
    Iterator,
    Fallback,
    Script,
    SwitchScript,
    BooleanScript,
    ForScript,
}

impl NodeType {
    pub const ALL: [NodeType; 10] = [
        NodeType::Common,
        NodeType::Switch,
        NodeType::Boolean,
        NodeType::For,
        NodeType::Iterator,
        NodeType::Fallback,
        NodeType::Script,
        NodeType::SwitchScript,
        NodeType::BooleanScript,
        NodeType::ForScript,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            NodeType::Common => "common",
            NodeType::Switch => "switch",
            NodeType::Boolean => "boolean",
            NodeType::For => "for",
            NodeType::Iterator => "iterator",
            NodeType::Fallback => "fallback",
            NodeType::Script => "script",
            NodeType::SwitchScript => "switch_script",
            NodeType::BooleanScript => "boolean_script",
            NodeType::ForScript => "for_script",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    /// Whether nodes of this type carry a script body
    pub fn is_script(&self) -> bool {
        matches!(
            self,
            NodeType::Script
                | NodeType::SwitchScript
                | NodeType::BooleanScript
                | NodeType::ForScript
        )
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for NodeType {
    type Err = RuleSyncError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| RuleSyncError::UnknownNodeType(s.to_string()))
    }
}
