use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::surface::{FitOptions, SurfaceOptions};
use super::types::{Edge, Hierarchy, Node, NodeId};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 12.0;
const LEVEL_GAP: f64 = 80.0;
const SIBLING_GAP: f64 = 40.0;
/// Drag distance, in pixels, past which a press no longer counts as a click.
const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: NodeId,
	pub label: Option<String>,
	pub color: String,
	pub base_color: String,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Simulation and view of one drawn network.
pub struct CanvasState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	moved: bool,
	suppress_click: bool,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
	edge_widths: HashMap<(DefaultNodeIdx, DefaultNodeIdx), f64>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	ids: HashMap<DefaultNodeIdx, NodeId>,
	base_colors: HashMap<NodeId, String>,
}

impl CanvasState {
	pub fn new(
		nodes: &[Node],
		edges: &[Edge],
		options: &SurfaceOptions,
		width: f64,
		height: f64,
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let mut groups: HashMap<&str, usize> = HashMap::new();
		let positions = match options.hierarchy {
			Some(direction) => layered_positions(nodes, edges, direction),
			None => circle_positions(nodes.len()),
		};

		let mut index = HashMap::new();
		let mut ids = HashMap::new();
		let mut base_colors = HashMap::new();
		for (node, (x, y)) in nodes.iter().zip(positions) {
			let next_group = groups.len();
			let group = node
				.group
				.as_deref()
				.map(|g| *groups.entry(g).or_insert(next_group))
				.unwrap_or(0);
			let base_color = COLORS[group % COLORS.len()].to_string();

			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: options.hierarchy.is_some(),
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label().map(String::from),
					color: node
						.color
						.as_ref()
						.map(|c| c.to_string())
						.unwrap_or_else(|| base_color.clone()),
					base_color: base_color.clone(),
				},
			});
			index.insert(node.id.clone(), idx);
			ids.insert(idx, node.id.clone());
			base_colors.insert(node.id.clone(), base_color);
		}

		let max_value = edges
			.iter()
			.filter_map(|e| e.value)
			.fold(0.0_f64, f64::max);
		let mut edge_list = Vec::new();
		let mut edge_widths = HashMap::new();
		for edge in edges {
			if let (Some(&src), Some(&tgt)) = (index.get(&edge.from), index.get(&edge.to)) {
				graph.add_edge(src, tgt, EdgeData::default());
				edge_list.push((src, tgt));
				let width = match edge.value {
					Some(value) if max_value > 0.0 => 1.0 + 3.0 * (value / max_value).max(0.0),
					_ => 1.0,
				};
				edge_widths.insert((src, tgt), width);
			}
		}

		Self {
			graph,
			edges: edge_list,
			edge_widths,
			index,
			ids,
			base_colors,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			animation_running: options.hierarchy.is_none(),
			flow_time: 0.0,
			moved: false,
			suppress_click: false,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_index_at(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			// HIT_RADIUS is in world-space, scales with zoom like nodes
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		self.node_index_at(sx, sy)
			.and_then(|idx| self.ids.get(&idx).cloned())
	}

	pub fn neighbors(&self, id: &NodeId) -> Vec<NodeId> {
		let Some(&idx) = self.index.get(id) else {
			return Vec::new();
		};
		self.edges
			.iter()
			.filter_map(|&(src, tgt)| {
				if src == idx {
					self.ids.get(&tgt).cloned()
				} else if tgt == idx {
					self.ids.get(&src).cloned()
				} else {
					None
				}
			})
			.collect()
	}

	pub fn edge_width(&self, src: DefaultNodeIdx, tgt: DefaultNodeIdx) -> f64 {
		self.edge_widths.get(&(src, tgt)).copied().unwrap_or(1.0)
	}

	pub fn base_color(&self, id: &NodeId) -> Option<&str> {
		self.base_colors.get(id).map(String::as_str)
	}

	/// Copies label visibility and color overrides onto the drawn nodes.
	pub fn update_nodes(&mut self, nodes: &[Node]) {
		let by_id: HashMap<&NodeId, &Node> = nodes.iter().map(|n| (&n.id, n)).collect();
		self.graph.visit_nodes_mut(|node| {
			let info = &mut node.data.user_data;
			if let Some(update) = by_id.get(&info.id) {
				info.label = update.label().map(String::from);
				info.color = update
					.color
					.as_ref()
					.map(|c| c.to_string())
					.unwrap_or_else(|| info.base_color.clone());
			}
		});
	}

	fn position(&self, id: &NodeId) -> Option<(f64, f64)> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn focus(&mut self, id: &NodeId, scale: f64) {
		let Some((x, y)) = self.position(id) else {
			return;
		};
		let k = scale.clamp(0.1, 10.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - x * k,
			y: self.height / 2.0 - y * k,
			k,
		};
	}

	pub fn fit(&mut self, options: FitOptions) {
		let mut bounds: Option<(f64, f64, f64, f64)> = None;
		self.graph.visit_nodes(|node| {
			let (x, y) = (node.x() as f64, node.y() as f64);
			bounds = Some(match bounds {
				None => (x, y, x, y),
				Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
			});
		});
		let Some((x0, y0, x1, y1)) = bounds else {
			return;
		};
		let (span_x, span_y) = ((x1 - x0).max(1.0), (y1 - y0).max(1.0));
		let (avail_x, avail_y) = (
			(self.width - 2.0 * options.padding).max(1.0),
			(self.height - 2.0 * options.padding).max(1.0),
		);
		let k = (avail_x / span_x).min(avail_y / span_y).clamp(0.1, 10.0);
		let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	/// Starts a press at screen position `(x, y)`: drags a node when one is hit, pans otherwise.
	pub fn press(&mut self, x: f64, y: f64) {
		self.moved = false;
		if let Some(idx) = self.node_index_at(x, y) {
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				..DragState::default()
			};
			let drag = &mut self.drag;
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					drag.node_start_x = node.x();
					drag.node_start_y = node.y();
				}
			});
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn drag_to(&mut self, x: f64, y: f64) {
		if self.drag.active {
			let Some(idx) = self.drag.node_idx else {
				return;
			};
			if (x - self.drag.start_x).hypot(y - self.drag.start_y) > CLICK_SLOP {
				self.moved = true;
			}
			let (dx, dy) = (
				(x - self.drag.start_x) / self.transform.k,
				(y - self.drag.start_y) / self.transform.k,
			);
			let (nx, ny) = (
				self.drag.node_start_x + dx as f32,
				self.drag.node_start_y + dy as f32,
			);
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = nx;
					node.data.y = ny;
					node.data.is_anchor = true;
				}
			});
		} else if self.pan.active {
			if (x - self.pan.start_x).hypot(y - self.pan.start_y) > CLICK_SLOP {
				self.moved = true;
			}
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	pub fn release(&mut self) {
		self.suppress_click = self.moved;
		self.moved = false;
		self.drag = DragState::default();
		self.pan.active = false;
	}

	/// True once for the click event that ends a drag or pan.
	pub fn take_suppressed_click(&mut self) -> bool {
		std::mem::take(&mut self.suppress_click)
	}

	pub fn zoom_at(&mut self, x: f64, y: f64, zoom_in: bool) {
		let factor = if zoom_in { 1.1 } else { 0.9 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	pub fn tick(&mut self, dt: f32) {
		if self.animation_running {
			self.graph.update(dt);
		}
		self.flow_time += dt as f64;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

fn circle_positions(count: usize) -> Vec<(f64, f64)> {
	(0..count)
		.map(|i| {
			let angle = (i as f64) * 2.0 * PI / count as f64;
			(100.0 * angle.cos(), 100.0 * angle.sin())
		})
		.collect()
}

/// Level by breadth-first distance from the nodes nothing points at, then lay levels out along
/// `direction`.
fn layered_positions(nodes: &[Node], edges: &[Edge], direction: Hierarchy) -> Vec<(f64, f64)> {
	let position: HashMap<&NodeId, usize> =
		nodes.iter().enumerate().map(|(i, n)| (&n.id, i)).collect();
	let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
	let mut has_parent = vec![false; nodes.len()];
	for edge in edges {
		if let (Some(&from), Some(&to)) = (position.get(&edge.from), position.get(&edge.to)) {
			children[from].push(to);
			has_parent[to] = true;
		}
	}

	let mut level: Vec<Option<usize>> = vec![None; nodes.len()];
	let mut queue = VecDeque::new();
	for start in (0..nodes.len()).filter(|&i| !has_parent[i]).chain(0..nodes.len()) {
		if level[start].is_some() {
			continue;
		}
		level[start] = Some(0);
		queue.push_back(start);
		while let Some(current) = queue.pop_front() {
			let next = level[current].unwrap_or(0) + 1;
			for &child in &children[current] {
				if level[child].is_none() {
					level[child] = Some(next);
					queue.push_back(child);
				}
			}
		}
	}

	let mut filled: HashMap<usize, usize> = HashMap::new();
	let mut sizes: HashMap<usize, usize> = HashMap::new();
	for l in level.iter().flatten() {
		*sizes.entry(*l).or_default() += 1;
	}
	level
		.iter()
		.map(|l| {
			let l = l.unwrap_or(0);
			let slot = filled.entry(l).or_default();
			let offset = (*slot as f64 - (sizes[&l] as f64 - 1.0) / 2.0) * SIBLING_GAP;
			*slot += 1;
			let depth = l as f64 * LEVEL_GAP;
			match direction {
				Hierarchy::UpDown => (offset, depth),
				Hierarchy::DownUp => (offset, -depth),
				Hierarchy::LeftRight => (depth, offset),
				Hierarchy::RightLeft => (-depth, offset),
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::types::ColorSpec;

	fn tree() -> (Vec<Node>, Vec<Edge>) {
		let nodes = vec![
			Node::new("root", "root").with_group("a"),
			Node::new("left", "left").with_group("b"),
			Node::new("right", "right").with_group("a"),
		];
		let edges = vec![Edge::new("root", "left"), Edge::new("root", "right")];
		(nodes, edges)
	}

	fn positions(state: &CanvasState) -> HashMap<NodeId, (f64, f64)> {
		let mut out = HashMap::new();
		state.graph.visit_nodes(|node| {
			out.insert(
				node.data.user_data.id.clone(),
				(node.x() as f64, node.y() as f64),
			);
		});
		out
	}

	#[test]
	fn neighbours_follow_edges_both_ways() {
		let (nodes, edges) = tree();
		let state = CanvasState::new(&nodes, &edges, &SurfaceOptions::default(), 800.0, 600.0);
		let mut around_root = state.neighbors(&"root".into());
		around_root.sort();
		assert_eq!(around_root, vec![NodeId::from("left"), NodeId::from("right")]);
		assert_eq!(state.neighbors(&"left".into()), vec![NodeId::from("root")]);
		assert!(state.neighbors(&"missing".into()).is_empty());
	}

	#[test]
	fn groups_share_palette_colors() {
		let (nodes, edges) = tree();
		let state = CanvasState::new(&nodes, &edges, &SurfaceOptions::default(), 800.0, 600.0);
		assert_eq!(state.base_color(&"root".into()), Some(COLORS[0]));
		assert_eq!(state.base_color(&"left".into()), Some(COLORS[1]));
		assert_eq!(state.base_color(&"right".into()), Some(COLORS[0]));
	}

	#[test]
	fn updates_override_and_restore_colors() {
		let (mut nodes, edges) = tree();
		let mut state = CanvasState::new(&nodes, &edges, &SurfaceOptions::default(), 800.0, 600.0);

		nodes[1].dim(&ColorSpec::new("grey"));
		state.update_nodes(&nodes);
		let mut seen = Vec::new();
		state.graph.visit_nodes(|node| {
			let info = &node.data.user_data;
			seen.push((info.id.clone(), info.label.clone(), info.color.clone()));
		});
		assert!(seen.contains(&(NodeId::from("left"), None, "grey".to_string())));

		nodes[1].restore();
		state.update_nodes(&nodes);
		let mut restored = None;
		state.graph.visit_nodes(|node| {
			if node.data.user_data.id == NodeId::from("left") {
				restored = Some(node.data.user_data.color.clone());
			}
		});
		assert_eq!(restored.as_deref(), Some(COLORS[1]));
	}

	#[test]
	fn hierarchy_places_children_below_parent() {
		let (nodes, edges) = tree();
		let options = SurfaceOptions {
			hierarchy: Some(Hierarchy::UpDown),
		};
		let state = CanvasState::new(&nodes, &edges, &options, 800.0, 600.0);
		let at = positions(&state);

		assert!(at[&NodeId::from("left")].1 > at[&NodeId::from("root")].1);
		assert_eq!(at[&NodeId::from("left")].1, at[&NodeId::from("right")].1);
		assert!(!state.animation_running);
	}

	#[test]
	fn right_left_grows_towards_negative_x() {
		let (nodes, edges) = tree();
		let options = SurfaceOptions {
			hierarchy: Some(Hierarchy::RightLeft),
		};
		let at = positions(&CanvasState::new(&nodes, &edges, &options, 800.0, 600.0));
		assert!(at[&NodeId::from("left")].0 < at[&NodeId::from("root")].0);
	}

	#[test]
	fn focus_centres_the_node() {
		let (nodes, edges) = tree();
		let options = SurfaceOptions {
			hierarchy: Some(Hierarchy::UpDown),
		};
		let mut state = CanvasState::new(&nodes, &edges, &options, 800.0, 600.0);
		let (x, y) = positions(&state)[&NodeId::from("left")];

		state.focus(&"left".into(), 2.0);
		assert_eq!(state.transform.k, 2.0);
		assert_eq!(state.transform.x + x * 2.0, 400.0);
		assert_eq!(state.transform.y + y * 2.0, 300.0);
	}

	#[test]
	fn fit_keeps_every_node_on_screen() {
		let (nodes, edges) = tree();
		let options = SurfaceOptions {
			hierarchy: Some(Hierarchy::LeftRight),
		};
		let mut state = CanvasState::new(&nodes, &edges, &options, 800.0, 600.0);
		state.fit(FitOptions::default());

		for (x, y) in positions(&state).into_values() {
			let sx = state.transform.x + x * state.transform.k;
			let sy = state.transform.y + y * state.transform.k;
			assert!((0.0..=800.0).contains(&sx) && (0.0..=600.0).contains(&sy));
		}
	}

	#[test]
	fn drag_past_slop_suppresses_the_next_click() {
		let (nodes, edges) = tree();
		let mut state = CanvasState::new(&nodes, &edges, &SurfaceOptions::default(), 800.0, 600.0);

		state.press(10.0, 10.0);
		state.drag_to(40.0, 10.0);
		state.release();
		assert!(state.take_suppressed_click());
		assert!(!state.take_suppressed_click());

		state.press(10.0, 10.0);
		state.drag_to(11.0, 10.0);
		state.release();
		assert!(!state.take_suppressed_click());
	}
}
