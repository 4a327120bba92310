//! Text rendering of the laid-out structure

use itertools::Itertools;
use termtree::Tree;

use crate::domain::{LayoutNode, LineType, NodeCard};

/// One-line card label: `Title (Position) [id]` plus markers.
pub fn card_label(card: &NodeCard) -> String {
    let mut label = card.title.as_deref().unwrap_or("(unlabeled)").to_string();
    if let Some(position) = &card.position {
        label.push_str(&format!(" ({position})"));
    }
    label.push_str(&format!(" [{}]", card.id));

    let mut markers = Vec::new();
    if card.layout_type.is_staff() {
        markers.push("staff".to_string());
    }
    if card.line_type == LineType::Dotted {
        markers.push("dotted".to_string());
    }
    if !markers.is_empty() {
        label.push_str(&format!(" <{}>", markers.iter().join(", ")));
    }
    label
}

/// Standard lane as branches; staff entries as leaves after them.
pub fn to_tree(node: &LayoutNode) -> Tree<String> {
    let mut label = card_label(&node.card);
    if node.reservation > 0 {
        label.push_str(&format!(" reserve={}", node.reservation));
    }

    let mut tree = Tree::new(label).with_leaves(node.standard.iter().map(to_tree));
    for staff in &node.staff {
        tree.push(Tree::new(card_label(staff)));
    }
    tree
}

pub fn render_forest(forest: &[LayoutNode]) -> String {
    forest.iter().map(|root| to_tree(root).to_string()).join("")
}
