//! Display color and label visibility of graph nodes.
//!
//! Nodes live in a copy-on-write [`NodeMap`]. Highlighting never mutates a map that has
//! already been handed to the render surface; it derives a new one and returns it.

use std::collections::BTreeMap;
use std::rc::Rc;

use super::types::{ColorSpec, Node, NodeId};

/// Primary muted color for nodes outside the active highlight.
pub const DIM_COLOR: &str = "rgba(200,200,200,0.5)";
/// Muted color for second-degree neighbours and nodes off a shortest path.
pub const SECONDARY_DIM_COLOR: &str = "rgba(150,150,150,0.75)";

impl Node {
	/// Mutes the node and parks its label.
	pub fn dim(&mut self, color: &ColorSpec) {
		self.color = Some(color.clone());
		self.text.hide();
	}

	/// Back to the surface default color with a visible label.
	pub fn restore(&mut self) {
		self.color = None;
		self.text.show();
	}

	/// Visible label, muted color.
	pub fn reveal_muted(&mut self, color: &ColorSpec) {
		self.color = Some(color.clone());
		self.text.show();
	}

	pub fn is_default(&self) -> bool {
		self.color.is_none() && self.text.is_visible()
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeMap {
	nodes: Rc<BTreeMap<NodeId, Node>>,
}

impl NodeMap {
	pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
		Self {
			nodes: Rc::new(nodes.into_iter().map(|n| (n.id.clone(), n)).collect()),
		}
	}

	pub fn get(&self, id: &NodeId) -> Option<&Node> {
		self.nodes.get(id)
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Node> {
		self.nodes.values()
	}

	/// Node text regardless of whether it is currently shown.
	pub fn text_of(&self, id: &NodeId) -> Option<&str> {
		self.nodes.get(id).map(|n| n.text.text())
	}

	/// Derives a new map; `self` is left untouched.
	pub fn edit(&self, f: impl FnOnce(&mut BTreeMap<NodeId, Node>)) -> NodeMap {
		let mut next = self.clone();
		f(Rc::make_mut(&mut next.nodes));
		next
	}

	pub fn restored(&self) -> NodeMap {
		self.edit(|nodes| nodes.values_mut().for_each(Node::restore))
	}

	/// Mutes every node except `keep`, which are restored.
	pub fn dimmed_except(&self, keep: &[NodeId], color: &ColorSpec) -> NodeMap {
		self.edit(|nodes| {
			for node in nodes.values_mut() {
				if keep.contains(&node.id) {
					node.restore();
				} else {
					node.dim(color);
				}
			}
		})
	}

	/// True when any node deviates from its default appearance.
	pub fn has_highlight(&self) -> bool {
		self.nodes.values().any(|n| !n.is_default())
	}

	pub fn to_vec(&self) -> Vec<Node> {
		self.nodes.values().cloned().collect()
	}
}
