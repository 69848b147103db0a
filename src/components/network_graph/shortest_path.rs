use std::collections::HashSet;
use std::iter;

use super::color::{DIM_COLOR, NodeMap, SECONDARY_DIM_COLOR};
use super::types::{ColorSpec, HighlightState, MAX_PATH_SELECTION, NodeId, SelectionParams};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSelection {
	/// One node is buffered; waiting for the second.
	Pending,
	/// Two distinct nodes, in click order.
	Ready([NodeId; 2]),
	/// The click changed nothing.
	Ignored,
}

/// Everything needed to ask the server for a path and to recognise its answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathQuery {
	pub params: SelectionParams,
	pub nodes: [NodeId; 2],
	pub start: String,
	pub end: String,
}

impl PathQuery {
	/// `None` if either node is unknown or the params lack a column.
	pub fn new(params: &SelectionParams, nodes: &NodeMap, pair: &[NodeId; 2]) -> Option<Self> {
		if !params.is_complete() {
			return None;
		}
		let start = nodes.text_of(&pair[0])?.to_string();
		let end = nodes.text_of(&pair[1])?.to_string();
		Some(Self {
			params: params.clone(),
			nodes: pair.clone(),
			start,
			end,
		})
	}
}

#[derive(Clone, Debug)]
pub struct ShortestPathSelector {
	dim: ColorSpec,
	off_path: ColorSpec,
}

impl Default for ShortestPathSelector {
	fn default() -> Self {
		Self::new(ColorSpec::new(DIM_COLOR), ColorSpec::new(SECONDARY_DIM_COLOR))
	}
}

impl ShortestPathSelector {
	pub fn new(dim: ColorSpec, off_path: ColorSpec) -> Self {
		Self { dim, off_path }
	}

	/// Buffers a shift-clicked node.
	///
	/// The id is appended and the buffer cut back to its first two entries, so a click while
	/// two nodes are already buffered is dropped.
	pub fn select(&self, id: NodeId, state: &mut HighlightState) -> PathSelection {
		if state.shortest_path.contains(&id) {
			return PathSelection::Ignored;
		}
		let next: Vec<NodeId> = state
			.shortest_path
			.iter()
			.cloned()
			.chain(iter::once(id))
			.take(MAX_PATH_SELECTION)
			.collect();
		if next == state.shortest_path {
			return PathSelection::Ignored;
		}
		state.shortest_path = next;

		match state.shortest_path.as_slice() {
			[first, second] => {
				state.highlight_active = true;
				PathSelection::Ready([first.clone(), second.clone()])
			}
			_ => PathSelection::Pending,
		}
	}

	/// Mutes everything but the chosen pair while the path is fetched.
	pub fn dim_pair(&self, nodes: &NodeMap, pair: &[NodeId; 2]) -> NodeMap {
		nodes.dimmed_except(pair, &self.dim)
	}

	/// Restores nodes whose text is on `path` and mutes the rest.
	pub fn paint(&self, nodes: &NodeMap, path: &[String]) -> NodeMap {
		let on_path: HashSet<&str> = path.iter().map(String::as_str).collect();
		nodes.edit(|all| {
			for node in all.values_mut() {
				if on_path.contains(node.text.text()) {
					node.restore();
				} else {
					node.dim(&self.off_path);
				}
			}
		})
	}
}

pub fn describe(start: &str, end: &str, path: &[String]) -> String {
	format!(
		"Shortest path between nodes {start} & {end}: {}",
		path.join(" -> ")
	)
}
