//! Lane classification and the renderer-facing layout tree.

use serde::Serialize;

use crate::domain::entities::{LayoutType, LineType, NodeContent, NodeId, OrgNode};
use crate::domain::geometry::{Geometry, StaffBoxOffset};

/// Children of one node split by rendering lane, each in `children` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanePartition<'a> {
    pub standard: Vec<&'a OrgNode>,
    pub staff: Vec<&'a OrgNode>,
}

impl LanePartition<'_> {
    pub fn has_staff(&self) -> bool {
        !self.staff.is_empty()
    }
}

/// Split `node.children` into the standard and staff lanes.
pub fn classify(node: &OrgNode) -> LanePartition<'_> {
    let (staff, standard) = node
        .children
        .iter()
        .partition(|child| child.layout_type.is_staff());
    LanePartition { standard, staff }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Personnel,
    Custom,
    Unlabeled,
}

/// What the renderer draws for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCard {
    pub id: NodeId,
    pub kind: CardKind,
    pub line_type: LineType,
    pub layout_type: LayoutType,
    pub title: Option<String>,
    pub position: Option<String>,
    pub image_url: Option<String>,
}

impl From<&OrgNode> for NodeCard {
    fn from(node: &OrgNode) -> Self {
        let kind = match node.content {
            NodeContent::Personnel(_) => CardKind::Personnel,
            NodeContent::Custom { .. } => CardKind::Custom,
            NodeContent::Unlabeled => CardKind::Unlabeled,
        };
        Self {
            id: node.id.clone(),
            kind,
            line_type: node.line_type,
            layout_type: node.layout_type,
            title: node.content.title().map(str::to_string),
            position: node.content.position().map(str::to_string),
            image_url: node.content.image_url().map(str::to_string),
        }
    }
}

/// Classified, geometry-annotated node.
///
/// Staff entries are cards only: the staff box is a flat list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutNode {
    pub card: NodeCard,
    pub standard: Vec<LayoutNode>,
    pub staff: Vec<NodeCard>,
    pub reservation: u32,
    pub staff_offset: StaffBoxOffset,
}

impl LayoutNode {
    fn from_node(node: &OrgNode, geometry: &Geometry) -> Self {
        let lanes = classify(node);
        Self {
            card: NodeCard::from(node),
            standard: lanes
                .standard
                .iter()
                .map(|child| LayoutNode::from_node(child, geometry))
                .collect(),
            staff: lanes.staff.iter().map(|child| NodeCard::from(*child)).collect(),
            reservation: geometry.staff_reservation(lanes.staff.len()),
            staff_offset: geometry.staff_box_offset(),
        }
    }
}

/// Classify and annotate a whole forest for rendering.
pub fn lay_out(forest: &[OrgNode], geometry: &Geometry) -> Vec<LayoutNode> {
    forest
        .iter()
        .map(|root| LayoutNode::from_node(root, geometry))
        .collect()
}
