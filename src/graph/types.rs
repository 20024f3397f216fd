//! Core type definitions for the persona graph

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for a node within one graph instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Which of the three node variants a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    User,
    Tag,
    Entity,
}

/// Edge kind; entity-tag edges are the cross-domain links
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    #[serde(rename = "user-tag")]
    UserTag,
    #[serde(rename = "user-entity")]
    UserEntity,
    #[serde(rename = "entity-tag")]
    EntityTag,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::UserTag => "user-tag",
            EdgeKind::UserEntity => "user-entity",
            EdgeKind::EntityTag => "entity-tag",
        }
    }

    /// Cross-domain edges are drawn differently from the spokes out of the user
    pub fn is_cross_domain(&self) -> bool {
        matches!(self, EdgeKind::EntityTag)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new("tag-indie");
        assert_eq!(id.as_str(), "tag-indie");
        assert_eq!(format!("{}", id), "tag-indie");

        let id2: NodeId = "center".into();
        assert_eq!(id2.as_str(), "center");
    }

    #[test]
    fn test_edge_kind_serialization() {
        let json = serde_json::to_string(&EdgeKind::EntityTag).unwrap();
        assert_eq!(json, "\"entity-tag\"");
        assert_eq!(EdgeKind::UserTag.to_string(), "user-tag");
        assert!(EdgeKind::EntityTag.is_cross_domain());
        assert!(!EdgeKind::UserEntity.is_cross_domain());
    }
}
