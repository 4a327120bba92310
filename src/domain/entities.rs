//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque node/member identifier as handed out by the repository.
pub type NodeId = String;

/// Connector style drawn above a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    #[default]
    Solid,
    Dotted,
}

/// Rendering lane a node occupies under its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    /// Conventional top-down descent.
    #[default]
    Standard,
    /// Lateral staff box beside the parent.
    StaffRight,
}

impl LayoutType {
    pub fn is_staff(self) -> bool {
        matches!(self, LayoutType::StaffRight)
    }
}

/// Flat node row as stored by the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgNodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub parent_id: Option<NodeId>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(default)]
    pub line_type: LineType,
    #[serde(default)]
    pub layout_type: LayoutType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_position: Option<String>,
}

impl OrgNodeRecord {
    /// Minimal record with default line/layout and no content.
    pub fn new(id: impl Into<NodeId>, parent_id: Option<&str>, sort_order: i64) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            sort_order,
            line_type: LineType::default(),
            layout_type: LayoutType::default(),
            member_id: None,
            custom_title: None,
            custom_position: None,
        }
    }

    pub fn with_layout(mut self, layout_type: LayoutType) -> Self {
        self.layout_type = layout_type;
        self
    }

    pub fn with_line(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn with_member(mut self, member_id: impl Into<NodeId>) -> Self {
        self.member_id = Some(member_id.into());
        self
    }

    pub fn with_custom(mut self, title: impl Into<String>, position: Option<&str>) -> Self {
        self.custom_title = Some(title.into());
        self.custom_position = position.map(str::to_string);
        self
    }
}

/// Entry of the active-member directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Displayable content of a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeContent {
    /// Resolved member from the directory.
    Personnel(MemberRef),
    /// Free-text card.
    Custom {
        title: String,
        position: Option<String>,
    },
    /// Neither a resolvable member nor a custom title.
    Unlabeled,
}

impl NodeContent {
    /// Resolve content for a record.
    ///
    /// A resolvable member wins; an unresolvable member falls back to the
    /// custom title, if any.
    pub fn resolve<'m>(
        record: &OrgNodeRecord,
        lookup: impl Fn(&str) -> Option<&'m MemberRef>,
    ) -> Self {
        if let Some(member) = record.member_id.as_deref().and_then(lookup) {
            return NodeContent::Personnel(member.clone());
        }
        match record.custom_title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => NodeContent::Custom {
                title: title.to_string(),
                position: record
                    .custom_position
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
            },
            _ => NodeContent::Unlabeled,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            NodeContent::Personnel(member) => Some(member.name.as_str()),
            NodeContent::Custom { title, .. } => Some(title.as_str()),
            NodeContent::Unlabeled => None,
        }
    }

    pub fn position(&self) -> Option<&str> {
        match self {
            NodeContent::Personnel(member) if !member.position.is_empty() => {
                Some(member.position.as_str())
            }
            NodeContent::Custom { position, .. } => position.as_deref(),
            _ => None,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            NodeContent::Personnel(member) => member.image_url.as_deref(),
            _ => None,
        }
    }
}

/// Node of the derived forest. Children are owned and sorted by `sort_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgNode {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub sort_order: i64,
    pub line_type: LineType,
    pub layout_type: LayoutType,
    pub member_id: Option<NodeId>,
    pub content: NodeContent,
    pub children: Vec<OrgNode>,
}

impl OrgNode {
    pub fn from_record(record: &OrgNodeRecord, content: NodeContent) -> Self {
        Self {
            id: record.id.clone(),
            parent_id: record.parent_id.clone(),
            sort_order: record.sort_order,
            line_type: record.line_type,
            layout_type: record.layout_type,
            member_id: record.member_id.clone(),
            content,
            children: Vec::new(),
        }
    }

    pub fn member(&self) -> Option<&MemberRef> {
        match &self.content {
            NodeContent::Personnel(member) => Some(member),
            _ => None,
        }
    }

    /// Pre-order traversal of this node and its descendants.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Number of levels below and including this node.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(OrgNode::depth).max().unwrap_or(0)
    }
}

impl fmt::Display for OrgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.content.title(), self.content.position()) {
            (Some(title), Some(position)) => write!(f, "{} ({})", title, position),
            (Some(title), None) => write!(f, "{}", title),
            (None, _) => write!(f, "<unlabeled {}>", self.id),
        }
    }
}

pub struct Walk<'a> {
    stack: Vec<&'a OrgNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a OrgNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Pre-order traversal over a whole forest.
pub fn walk_forest(forest: &[OrgNode]) -> impl Iterator<Item = &OrgNode> {
    forest.iter().flat_map(OrgNode::walk)
}

/// Content source of a node about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSource {
    Member(NodeId),
    Custom {
        title: String,
        position: Option<String>,
    },
}

/// Insert payload: a record without id, content in tagged form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDraft {
    pub parent_id: Option<NodeId>,
    pub line_type: LineType,
    pub layout_type: LayoutType,
    pub source: NodeSource,
    /// Explicit sibling position; appended after the last sibling when `None`.
    pub sort_order: Option<i64>,
}

impl NodeDraft {
    pub fn new(parent_id: Option<&str>, source: NodeSource) -> Self {
        Self {
            parent_id: parent_id.map(str::to_string),
            line_type: LineType::default(),
            layout_type: LayoutType::default(),
            source,
            sort_order: None,
        }
    }

    /// Record payload for the repository; the id is assigned on insert.
    pub fn into_record(self, id: NodeId, sort_order: i64) -> OrgNodeRecord {
        let (member_id, custom_title, custom_position) = match self.source {
            NodeSource::Member(member_id) => (Some(member_id), None, None),
            NodeSource::Custom { title, position } => {
                (None, Some(title.trim().to_string()), position)
            }
        };
        OrgNodeRecord {
            id,
            parent_id: self.parent_id,
            sort_order,
            line_type: self.line_type,
            layout_type: self.layout_type,
            member_id,
            custom_title,
            custom_position,
        }
    }
}
