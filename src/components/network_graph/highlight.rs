use std::iter;

use super::color::{DIM_COLOR, NodeMap, SECONDARY_DIM_COLOR};
use super::types::{ColorSpec, HighlightState, NodeId};

/// Neighbour lookup, as offered by the render surface.
pub trait Adjacency {
	fn connected_nodes(&self, id: &NodeId) -> Vec<NodeId>;
}

/// Two-hop neighbourhood highlighting.
///
/// The selected node and its direct neighbours keep their default look, second-degree
/// neighbours keep their label under a muted color, and everything else is muted with a hidden
/// label.
#[derive(Clone, Debug)]
pub struct NeighborhoodHighlighter {
	dim: ColorSpec,
	second_degree: ColorSpec,
}

impl Default for NeighborhoodHighlighter {
	fn default() -> Self {
		Self::new(ColorSpec::new(DIM_COLOR), ColorSpec::new(SECONDARY_DIM_COLOR))
	}
}

impl NeighborhoodHighlighter {
	pub fn new(dim: ColorSpec, second_degree: ColorSpec) -> Self {
		Self { dim, second_degree }
	}

	/// Returns the new node set, or `None` when nothing changes.
	///
	/// Clears any shortest-path selection in `state`.
	pub fn highlight<A: Adjacency + ?Sized>(
		&self,
		selected: Option<&NodeId>,
		adjacency: &A,
		nodes: &NodeMap,
		state: &mut HighlightState,
	) -> Option<NodeMap> {
		state.shortest_path.clear();

		let Some(selected) = selected else {
			if !state.highlight_active {
				return None;
			}
			state.highlight_active = false;
			return Some(nodes.restored());
		};

		let first_degree = adjacency.connected_nodes(selected);
		let second_degree: Vec<NodeId> = first_degree
			.iter()
			.flat_map(|id| adjacency.connected_nodes(id))
			.collect();

		let next = nodes.edit(|all| {
			for node in all.values_mut() {
				node.dim(&self.dim);
			}
			for id in &second_degree {
				if let Some(node) = all.get_mut(id) {
					node.reveal_muted(&self.second_degree);
				}
			}
			for id in first_degree.iter().chain(iter::once(selected)) {
				if let Some(node) = all.get_mut(id) {
					node.restore();
				}
			}
		});
		state.highlight_active = true;
		Some(next)
	}
}
