use super::highlight::Adjacency;
use super::types::{ColorSpec, Edge, Hierarchy, Node, NodeId};
use crate::error::ExplorerError;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfaceOptions {
	pub hierarchy: Option<Hierarchy>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusOptions {
	pub scale: f64,
}

impl Default for FocusOptions {
	fn default() -> Self {
		Self { scale: 1.5 }
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitOptions {
	/// Screen-space margin kept around the graph.
	pub padding: f64,
}

impl Default for FitOptions {
	fn default() -> Self {
		Self { padding: 40.0 }
	}
}

/// A drawn graph the controller can query and repaint.
pub trait RenderSurface: Adjacency {
	/// Replaces the display attributes of the given nodes.
	fn update_nodes(&mut self, nodes: Vec<Node>);
	fn focus(&mut self, id: &NodeId, options: FocusOptions);
	fn fit(&mut self, options: FitOptions);
	/// Color the surface assigns the node when no override is set.
	fn node_color(&self, id: &NodeId) -> Option<ColorSpec>;
	fn destroy(&mut self);
}

pub trait SurfaceFactory {
	type Surface: RenderSurface;

	fn create(
		&mut self,
		nodes: Vec<Node>,
		edges: &[Edge],
		options: SurfaceOptions,
	) -> Result<Self::Surface, ExplorerError>;
}
