use log::{debug, error, info, warn};

use super::click::{ClickAction, ClickDisambiguator, ClickEvent, PendingClick};
use super::color::NodeMap;
use super::highlight::NeighborhoodHighlighter;
use super::shortest_path::{PathQuery, PathSelection, ShortestPathSelector, describe};
use super::surface::{FitOptions, FocusOptions, RenderSurface, SurfaceFactory, SurfaceOptions};
use super::types::{
	AnalysisStats, ColumnDef, Edge, GraphData, GroupsMapping, HighlightState, NodeId,
	SelectionParams,
};
use crate::config::ExplorerConfig;
use crate::error::{ApiError, ExplorerError};

/// Work the controller needs done outside itself. Each result goes back through the matching
/// `apply_*` method.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
	Dtypes,
	Graph(SelectionParams),
	ShortestPath(PathQuery),
	Analysis(SelectionParams),
}

#[derive(Clone, Debug, Default, PartialEq)]
enum DtypesState {
	#[default]
	Pending,
	Loaded(Vec<ColumnDef>),
	Failed,
}

#[derive(Clone, Debug)]
struct LoadedGraph {
	/// Params the data was fetched with.
	params: SelectionParams,
	nodes: NodeMap,
	edges: Vec<Edge>,
	groups: Vec<(String, NodeId)>,
}

pub struct GraphViewController<F: SurfaceFactory> {
	factory: F,
	surface: Option<F::Surface>,
	params: SelectionParams,
	dtypes: DtypesState,
	graph: Option<LoadedGraph>,
	groups: Option<GroupsMapping>,
	highlight: HighlightState,
	clicks: ClickDisambiguator,
	highlighter: NeighborhoodHighlighter,
	paths: ShortestPathSelector,
	focus: FocusOptions,
	pending_graph: Option<SelectionParams>,
	pending_path: Option<PathQuery>,
	path_description: Option<String>,
	analysis: Option<AnalysisStats>,
	error: Option<ExplorerError>,
}

impl<F: SurfaceFactory> GraphViewController<F> {
	pub fn new(factory: F, config: &ExplorerConfig) -> Self {
		Self {
			factory,
			surface: None,
			params: SelectionParams::default(),
			dtypes: DtypesState::Pending,
			graph: None,
			groups: None,
			highlight: HighlightState::default(),
			clicks: ClickDisambiguator::new(f64::from(config.double_click_threshold_ms)),
			highlighter: NeighborhoodHighlighter::new(
				config.dim_color.clone(),
				config.second_degree_color.clone(),
			),
			paths: ShortestPathSelector::new(
				config.dim_color.clone(),
				config.second_degree_color.clone(),
			),
			focus: FocusOptions {
				scale: config.focus_scale,
			},
			pending_graph: None,
			pending_path: None,
			path_description: None,
			analysis: None,
			error: None,
		}
	}

	/// Adopts the params found at mount time and kicks off the initial loads.
	pub fn start(&mut self, params: SelectionParams) -> Vec<Request> {
		let mut requests = vec![Request::Dtypes];
		requests.extend(self.set_params(params));
		requests
	}

	pub fn apply_dtypes(&mut self, result: Result<Vec<ColumnDef>, ApiError>) {
		match result {
			Ok(columns) => {
				debug!("loaded {} column types", columns.len());
				self.dtypes = DtypesState::Loaded(columns);
			}
			Err(err) => {
				error!("dtype load failed: {err}");
				self.dtypes = DtypesState::Failed;
				self.clear();
				self.error = Some(ExplorerError::Dtypes(err));
			}
		}
	}

	pub fn set_params(&mut self, params: SelectionParams) -> Vec<Request> {
		let params = params.normalized();
		if params == self.params && (self.pending_graph.is_some() || self.shows_query(&params)) {
			return Vec::new();
		}
		let previous = std::mem::replace(&mut self.params, params);

		if !self.params.is_complete() {
			self.clear();
			return Vec::new();
		}

		let query_changed = !previous.same_query(&self.params);
		if query_changed || self.pending_graph.is_some() || !self.shows_query(&self.params) {
			if query_changed {
				self.analysis = None;
			}
			return vec![self.request_graph()];
		}

		self.rebuild_surface();
		Vec::new()
	}

	/// Whether the drawn data was loaded for the same columns as `params`.
	fn shows_query(&self, params: &SelectionParams) -> bool {
		self.graph
			.as_ref()
			.is_some_and(|graph| graph.params.same_query(params))
	}

	fn request_graph(&mut self) -> Request {
		debug!("requesting network data for {:?}", self.params);
		self.pending_graph = Some(self.params.clone());
		Request::Graph(self.params.clone())
	}

	/// Returns `false` when the response was stale and dropped.
	pub fn apply_graph(
		&mut self,
		params: &SelectionParams,
		result: Result<GraphData, ApiError>,
	) -> bool {
		if *params != self.params {
			debug!("discarding stale network data for {params:?}");
			return false;
		}
		self.pending_graph = None;

		let data = match result {
			Ok(data) => data,
			Err(err) => {
				error!("network data load failed: {err}");
				self.error = Some(ExplorerError::GraphData(err));
				return true;
			}
		};
		if self.dtypes == DtypesState::Failed {
			warn!("not drawing network without column types");
			return false;
		}

		let nodes = NodeMap::from_nodes(data.nodes);
		let graph = LoadedGraph {
			params: params.clone(),
			nodes,
			edges: data.edges,
			groups: data.groups.into_iter().collect(),
		};
		self.install(graph);
		true
	}

	/// Builds a fresh surface for `graph`, replacing whatever was drawn before. If the surface
	/// cannot be created the previous one stays.
	fn install(&mut self, graph: LoadedGraph) {
		let options = SurfaceOptions {
			hierarchy: self.params.hierarchy,
		};
		let surface = match self.factory.create(graph.nodes.to_vec(), &graph.edges, options) {
			Ok(surface) => surface,
			Err(err) => {
				error!("{err}");
				self.error = Some(err);
				return;
			}
		};
		self.teardown_surface();
		info!(
			"drew network with {} nodes and {} edges",
			graph.nodes.len(),
			graph.edges.len()
		);

		self.groups = (graph.groups.len() > 1).then(|| {
			GroupsMapping(
				graph
					.groups
					.iter()
					.map(|(name, id)| (name.clone(), surface.node_color(id).unwrap_or_default()))
					.collect(),
			)
		});
		self.surface = Some(surface);
		self.graph = Some(graph);
		self.reset_highlight();
	}

	/// Layout engines of this kind cannot re-layout in place; redraw from scratch.
	fn rebuild_surface(&mut self) {
		let Some(mut graph) = self.graph.clone() else {
			return;
		};
		debug!("rebuilding network for hierarchy {:?}", self.params.hierarchy);
		graph.params = self.params.clone();
		graph.nodes = graph.nodes.restored();
		self.install(graph);
	}

	fn teardown_surface(&mut self) {
		if let Some(mut surface) = self.surface.take() {
			debug!("destroying network surface");
			surface.destroy();
		}
	}

	fn reset_highlight(&mut self) {
		self.highlight = HighlightState::default();
		self.pending_path = None;
		self.path_description = None;
	}

	fn clear(&mut self) {
		self.teardown_surface();
		self.graph = None;
		self.groups = None;
		self.pending_graph = None;
		self.analysis = None;
		self.reset_highlight();
	}

	pub fn on_click(&self, event: ClickEvent) -> PendingClick {
		self.clicks.on_click(event)
	}

	/// Acts on a click once its double-click window has passed.
	pub fn resolve_click(&mut self, pending: &PendingClick) -> Vec<Request> {
		let Some(action) = self.clicks.resolve(pending) else {
			return Vec::new();
		};
		let (Some(surface), Some(graph)) = (self.surface.as_mut(), self.graph.as_mut()) else {
			return Vec::new();
		};

		match action {
			ClickAction::Highlight(selected) => {
				self.pending_path = None;
				self.path_description = None;
				if let Some(nodes) = self.highlighter.highlight(
					selected.as_ref(),
					&*surface,
					&graph.nodes,
					&mut self.highlight,
				) {
					graph.nodes = nodes;
					surface.update_nodes(graph.nodes.to_vec());
				}
				Vec::new()
			}
			ClickAction::SelectPathNode(id) => match self.paths.select(id, &mut self.highlight) {
				PathSelection::Ready(pair) => {
					graph.nodes = self.paths.dim_pair(&graph.nodes, &pair);
					surface.update_nodes(graph.nodes.to_vec());
					match PathQuery::new(&graph.params, &graph.nodes, &pair) {
						Some(query) => {
							debug!("requesting shortest path {} -> {}", query.start, query.end);
							self.pending_path = Some(query.clone());
							vec![Request::ShortestPath(query)]
						}
						None => {
							warn!("cannot resolve labels for {pair:?}");
							Vec::new()
						}
					}
				}
				PathSelection::Pending | PathSelection::Ignored => Vec::new(),
			},
		}
	}

	/// The surface's own double-click behaviour: zoom to the node, or fit the whole graph.
	pub fn on_double_click(&mut self, event: &ClickEvent) {
		self.clicks.on_double_click(event.at);
		let Some(surface) = self.surface.as_mut() else {
			return;
		};
		match event.node() {
			Some(id) => surface.focus(id, self.focus),
			None => surface.fit(FitOptions::default()),
		}
	}

	/// Returns `false` when the response no longer matches the pending query.
	pub fn apply_shortest_path(
		&mut self,
		query: &PathQuery,
		result: Result<Vec<String>, ApiError>,
	) -> bool {
		if self.pending_path.as_ref() != Some(query) || query.params != self.params {
			debug!("discarding stale shortest path {} -> {}", query.start, query.end);
			return false;
		}
		self.pending_path = None;

		let path = match result {
			Ok(path) => path,
			Err(err) => {
				error!("shortest path query failed: {err}");
				self.error = Some(ExplorerError::ShortestPath(err));
				return true;
			}
		};
		let (Some(surface), Some(graph)) = (self.surface.as_mut(), self.graph.as_mut()) else {
			return false;
		};
		graph.nodes = self.paths.paint(&graph.nodes, &path);
		surface.update_nodes(graph.nodes.to_vec());
		self.path_description = Some(describe(&query.start, &query.end, &path));
		self.highlight.shortest_path.clear();
		self.highlight.highlight_active = true;
		true
	}

	pub fn request_analysis(&mut self) -> Option<Request> {
		if !self.params.is_complete() {
			return None;
		}
		Some(Request::Analysis(self.params.clone()))
	}

	pub fn apply_analysis(
		&mut self,
		params: &SelectionParams,
		result: Result<AnalysisStats, ApiError>,
	) -> bool {
		if !params.same_query(&self.params) || !self.params.is_complete() {
			debug!("discarding stale network analysis for {params:?}");
			return false;
		}
		match result {
			Ok(stats) => self.analysis = Some(stats),
			Err(err) => {
				error!("network analysis failed: {err}");
				self.error = Some(ExplorerError::Analysis(err));
			}
		}
		true
	}

	pub fn dismiss_error(&mut self) {
		self.error = None;
	}

	/// Close control of the shortest-path banner.
	pub fn dismiss_path(&mut self) {
		self.path_description = None;
		self.pending_path = None;
		self.highlight = HighlightState::default();
		let (Some(surface), Some(graph)) = (self.surface.as_mut(), self.graph.as_mut()) else {
			return;
		};
		if graph.nodes.has_highlight() {
			graph.nodes = graph.nodes.restored();
			surface.update_nodes(graph.nodes.to_vec());
		}
	}

	pub fn params(&self) -> &SelectionParams {
		&self.params
	}

	pub fn highlight(&self) -> &HighlightState {
		&self.highlight
	}

	pub fn nodes(&self) -> Option<&NodeMap> {
		self.graph.as_ref().map(|g| &g.nodes)
	}

	pub fn columns(&self) -> &[ColumnDef] {
		match &self.dtypes {
			DtypesState::Loaded(columns) => columns,
			DtypesState::Pending | DtypesState::Failed => &[],
		}
	}

	pub fn groups(&self) -> Option<&GroupsMapping> {
		self.groups.as_ref()
	}

	pub fn path_description(&self) -> Option<&str> {
		self.path_description.as_deref()
	}

	pub fn analysis(&self) -> Option<&AnalysisStats> {
		self.analysis.as_ref()
	}

	pub fn error(&self) -> Option<&ExplorerError> {
		self.error.as_ref()
	}

	pub fn is_loading(&self) -> bool {
		self.pending_graph.is_some()
	}

	pub fn surface(&self) -> Option<&F::Surface> {
		self.surface.as_ref()
	}

	pub fn surface_mut(&mut self) -> Option<&mut F::Surface> {
		self.surface.as_mut()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::BTreeMap;
	use std::rc::Rc;

	use serde_json::json;

	use super::*;
	use crate::components::network_graph::color::{DIM_COLOR, SECONDARY_DIM_COLOR};
	use crate::components::network_graph::highlight::Adjacency;
	use crate::components::network_graph::types::{ColorSpec, Hierarchy, Node};

	#[derive(Debug, Default)]
	struct Journal {
		created: Vec<SurfaceOptions>,
		destroyed: usize,
		updates: usize,
		focused: Vec<(NodeId, f64)>,
		fits: usize,
	}

	struct FakeSurface {
		adjacency: BTreeMap<NodeId, Vec<NodeId>>,
		groups: BTreeMap<NodeId, String>,
		journal: Rc<RefCell<Journal>>,
	}

	impl Adjacency for FakeSurface {
		fn connected_nodes(&self, id: &NodeId) -> Vec<NodeId> {
			self.adjacency.get(id).cloned().unwrap_or_default()
		}
	}

	impl RenderSurface for FakeSurface {
		fn update_nodes(&mut self, _nodes: Vec<Node>) {
			self.journal.borrow_mut().updates += 1;
		}

		fn focus(&mut self, id: &NodeId, options: FocusOptions) {
			self.journal.borrow_mut().focused.push((id.clone(), options.scale));
		}

		fn fit(&mut self, _options: FitOptions) {
			self.journal.borrow_mut().fits += 1;
		}

		fn node_color(&self, id: &NodeId) -> Option<ColorSpec> {
			self.groups.get(id).map(|g| ColorSpec::new(format!("color-{g}")))
		}

		fn destroy(&mut self) {
			self.journal.borrow_mut().destroyed += 1;
		}
	}

	#[derive(Default)]
	struct FakeFactory {
		journal: Rc<RefCell<Journal>>,
	}

	impl SurfaceFactory for FakeFactory {
		type Surface = FakeSurface;

		fn create(
			&mut self,
			nodes: Vec<Node>,
			edges: &[Edge],
			options: SurfaceOptions,
		) -> Result<FakeSurface, ExplorerError> {
			self.journal.borrow_mut().created.push(options);
			let mut adjacency: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
			for edge in edges {
				adjacency.entry(edge.from.clone()).or_default().push(edge.to.clone());
				adjacency.entry(edge.to.clone()).or_default().push(edge.from.clone());
			}
			let groups = nodes
				.into_iter()
				.filter_map(|n| n.group.map(|g| (n.id, g)))
				.collect();
			Ok(FakeSurface {
				adjacency,
				groups,
				journal: self.journal.clone(),
			})
		}
	}

	type Controller = GraphViewController<FakeFactory>;

	fn setup() -> (Controller, Rc<RefCell<Journal>>) {
		let factory = FakeFactory::default();
		let journal = factory.journal.clone();
		let mut controller = GraphViewController::new(factory, &ExplorerConfig::default());
		controller.apply_dtypes(Ok(vec![]));
		(controller, journal)
	}

	/// a - b - c - d - e, labelled with their ids.
	fn chain() -> GraphData {
		serde_json::from_value(json!({
			"nodes": [
				{"id": "a", "label": "a", "group": "x"},
				{"id": "b", "label": "b", "group": "y"},
				{"id": "c", "label": "c", "group": "x"},
				{"id": "d", "label": "d", "group": "y"},
				{"id": "e", "label": "e", "group": "x"}
			],
			"edges": [
				{"from": "a", "to": "b"},
				{"from": "b", "to": "c"},
				{"from": "c", "to": "d"},
				{"from": "d", "to": "e"}
			],
			"groups": {"y": "b", "x": "a"}
		}))
		.unwrap()
	}

	fn loaded() -> (Controller, Rc<RefCell<Journal>>) {
		let (mut controller, journal) = setup();
		let params = SelectionParams::new("to", "from");
		controller.set_params(params.clone());
		assert!(controller.apply_graph(&params, Ok(chain())));
		(controller, journal)
	}

	fn click(controller: &mut Controller, node: Option<&str>, shift: bool, at: f64) -> Vec<Request> {
		let pending = controller.on_click(ClickEvent {
			nodes: node.map(NodeId::from).into_iter().collect(),
			shift,
			at,
		});
		controller.resolve_click(&pending)
	}

	fn node<'a>(controller: &'a Controller, id: &str) -> &'a Node {
		controller.nodes().unwrap().get(&id.into()).unwrap()
	}

	#[test]
	fn start_requests_dtypes_and_graph() {
		let mut controller = GraphViewController::new(FakeFactory::default(), &ExplorerConfig::default());
		let params = SelectionParams::new("to", "from");
		assert_eq!(
			controller.start(params.clone()),
			vec![Request::Dtypes, Request::Graph(params)]
		);
		assert!(controller.is_loading());
	}

	#[test]
	fn start_without_columns_only_requests_dtypes() {
		let mut controller = GraphViewController::new(FakeFactory::default(), &ExplorerConfig::default());
		assert_eq!(controller.start(SelectionParams::default()), vec![Request::Dtypes]);
	}

	#[test]
	fn stale_graph_response_is_discarded() {
		let (mut controller, _) = setup();
		let first = SelectionParams::new("a", "b");
		let second = SelectionParams::new("c", "d");
		controller.set_params(first.clone());
		controller.set_params(second.clone());

		assert!(!controller.apply_graph(&first, Ok(chain())));
		assert!(controller.nodes().is_none());
		assert!(controller.is_loading());

		let mut newer = chain();
		newer.nodes.truncate(2);
		assert!(controller.apply_graph(&second, Ok(newer)));
		assert!(!controller.apply_graph(&first, Ok(chain())));
		assert_eq!(controller.nodes().unwrap().len(), 2);
	}

	#[test]
	fn groups_mapping_needs_more_than_one_group() {
		let (controller, _) = loaded();
		let groups = controller.groups().unwrap();
		assert_eq!(
			groups.0,
			vec![
				("x".to_string(), ColorSpec::new("color-x")),
				("y".to_string(), ColorSpec::new("color-y")),
			]
		);

		let (mut controller, _) = setup();
		let params = SelectionParams::new("to", "from");
		controller.set_params(params.clone());
		let mut single = chain();
		single.groups.remove("y");
		controller.apply_graph(&params, Ok(single));
		assert!(controller.groups().is_none());
	}

	#[test]
	fn clearing_a_column_tears_everything_down() {
		let (mut controller, journal) = loaded();
		click(&mut controller, Some("c"), false, 0.0);
		assert!(controller.highlight().highlight_active);

		let mut params = controller.params().clone();
		params.to = Some(String::new());
		assert!(controller.set_params(params).is_empty());

		assert_eq!(journal.borrow().destroyed, 1);
		assert!(controller.surface().is_none());
		assert!(controller.nodes().is_none());
		assert_eq!(*controller.highlight(), HighlightState::default());
	}

	#[test]
	fn hierarchy_change_rebuilds_without_reloading() {
		let (mut controller, journal) = loaded();
		click(&mut controller, Some("c"), false, 0.0);

		let mut params = controller.params().clone();
		params.hierarchy = Some(Hierarchy::LeftRight);
		assert!(controller.set_params(params).is_empty());

		let journal = journal.borrow();
		assert_eq!(journal.created.len(), 2);
		assert_eq!(journal.created[1].hierarchy, Some(Hierarchy::LeftRight));
		assert_eq!(journal.destroyed, 1);
		assert!(!controller.highlight().highlight_active);
		assert!(!controller.nodes().unwrap().has_highlight());
	}

	#[test]
	fn hierarchy_change_during_load_supersedes_it() {
		let (mut controller, _) = setup();
		let first = SelectionParams::new("to", "from");
		controller.set_params(first.clone());

		let mut second = first.clone();
		second.hierarchy = Some(Hierarchy::UpDown);
		assert_eq!(controller.set_params(second.clone()), vec![Request::Graph(second.clone())]);
		assert!(!controller.apply_graph(&first, Ok(chain())));
		assert!(controller.apply_graph(&second, Ok(chain())));
	}

	#[test]
	fn failed_load_keeps_previous_graph() {
		let (mut controller, journal) = loaded();
		let params = SelectionParams::new("other", "from");
		controller.set_params(params.clone());

		assert!(controller.apply_graph(&params, Err(ApiError::Status(500))));
		assert!(matches!(controller.error(), Some(ExplorerError::GraphData(_))));
		assert_eq!(controller.nodes().unwrap().len(), 5);
		assert_eq!(journal.borrow().destroyed, 0);

		controller.dismiss_error();
		assert!(controller.error().is_none());
	}

	#[test]
	fn hierarchy_change_after_failed_load_reloads() {
		let (mut controller, journal) = loaded();
		let params = SelectionParams::new("other", "from");
		controller.set_params(params.clone());
		assert!(controller.apply_graph(&params, Err(ApiError::Status(500))));

		let layered = SelectionParams {
			hierarchy: Some(Hierarchy::UpDown),
			..params
		};
		let requests = controller.set_params(layered.clone());
		assert_eq!(requests, vec![Request::Graph(layered)]);
		assert_eq!(journal.borrow().created.len(), 1);
	}

	#[test]
	fn reselecting_failed_params_retries() {
		let (mut controller, _) = loaded();
		let params = SelectionParams::new("other", "from");
		controller.set_params(params.clone());
		assert!(controller.apply_graph(&params, Err(ApiError::Status(500))));

		assert_eq!(controller.set_params(params.clone()), vec![Request::Graph(params)]);
	}

	#[test]
	fn path_query_uses_columns_of_drawn_graph() {
		let (mut controller, _) = loaded();
		let params = SelectionParams::new("other", "from");
		controller.set_params(params.clone());
		assert!(controller.apply_graph(&params, Err(ApiError::Status(500))));

		click(&mut controller, Some("a"), true, 0.0);
		let requests = click(&mut controller, Some("c"), true, 300.0);
		let [Request::ShortestPath(query)] = requests.as_slice() else {
			panic!("expected a path request");
		};
		assert_eq!(query.params, SelectionParams::new("to", "from"));
		assert!(!controller.apply_shortest_path(query, Ok(vec!["a".into(), "b".into(), "c".into()])));
	}

	#[test]
	fn path_after_hierarchy_rebuild_is_applied() {
		let (mut controller, _) = loaded();
		let layered = SelectionParams {
			hierarchy: Some(Hierarchy::LeftRight),
			..SelectionParams::new("to", "from")
		};
		assert!(controller.set_params(layered.clone()).is_empty());

		click(&mut controller, Some("a"), true, 0.0);
		let requests = click(&mut controller, Some("c"), true, 300.0);
		let [Request::ShortestPath(query)] = requests.as_slice() else {
			panic!("expected a path request");
		};
		assert_eq!(query.params, layered);
		assert!(controller.apply_shortest_path(query, Ok(vec!["a".into(), "b".into(), "c".into()])));
		assert!(controller.path_description().is_some());
	}

	#[test]
	fn dtype_failure_blocks_drawing() {
		let mut controller = GraphViewController::new(FakeFactory::default(), &ExplorerConfig::default());
		let params = SelectionParams::new("to", "from");
		controller.start(params.clone());
		controller.apply_dtypes(Err(ApiError::Server("no data".into())));

		assert!(!controller.apply_graph(&params, Ok(chain())));
		assert!(controller.surface().is_none());
		assert!(matches!(controller.error(), Some(ExplorerError::Dtypes(_))));
	}

	#[test]
	fn single_click_highlights_neighbourhood() {
		let (mut controller, journal) = loaded();
		assert!(click(&mut controller, Some("c"), false, 0.0).is_empty());

		assert!(node(&controller, "b").is_default());
		assert!(node(&controller, "d").is_default());
		assert_eq!(node(&controller, "a").color, Some(ColorSpec::new(SECONDARY_DIM_COLOR)));
		assert_eq!(node(&controller, "a").label(), Some("a"));
		assert_eq!(journal.borrow().updates, 1);

		click(&mut controller, None, false, 500.0);
		assert!(!controller.nodes().unwrap().has_highlight());
		assert!(!controller.highlight().highlight_active);
	}

	#[test]
	fn double_click_suppresses_pending_single_and_focuses() {
		let (mut controller, journal) = loaded();
		let event = ClickEvent {
			nodes: vec!["c".into()],
			shift: false,
			at: 1_000.0,
		};
		let pending = controller.on_click(event.clone());
		controller.on_double_click(&ClickEvent { at: 1_150.0, ..event });

		assert!(controller.resolve_click(&pending).is_empty());
		assert!(!controller.highlight().highlight_active);
		assert_eq!(journal.borrow().focused, vec![(NodeId::from("c"), 1.5)]);

		controller.on_double_click(&ClickEvent {
			nodes: vec![],
			shift: false,
			at: 2_000.0,
		});
		assert_eq!(journal.borrow().fits, 1);
	}

	#[test]
	fn two_shift_clicks_request_a_path() {
		let (mut controller, _) = loaded();
		assert!(click(&mut controller, Some("a"), true, 0.0).is_empty());
		assert!(!controller.nodes().unwrap().has_highlight());

		let requests = click(&mut controller, Some("d"), true, 300.0);
		let [Request::ShortestPath(query)] = requests.as_slice() else {
			panic!("expected a path request, got {requests:?}");
		};
		assert_eq!(query.nodes, [NodeId::from("a"), NodeId::from("d")]);
		assert_eq!((query.start.as_str(), query.end.as_str()), ("a", "d"));
		assert_eq!(node(&controller, "b").color, Some(ColorSpec::new(DIM_COLOR)));
		assert!(node(&controller, "d").is_default());

		assert!(click(&mut controller, Some("e"), true, 600.0).is_empty());
		assert_eq!(controller.highlight().shortest_path.len(), 2);
	}

	#[test]
	fn path_response_paints_and_resets_buffer() {
		let (mut controller, _) = loaded();
		click(&mut controller, Some("a"), true, 0.0);
		let requests = click(&mut controller, Some("c"), true, 300.0);
		let [Request::ShortestPath(query)] = requests.as_slice() else {
			panic!("expected a path request");
		};

		let path = vec!["a".to_string(), "b".to_string(), "c".to_string()];
		assert!(controller.apply_shortest_path(query, Ok(path)));

		assert_eq!(
			controller.path_description(),
			Some("Shortest path between nodes a & c: a -> b -> c")
		);
		assert!(node(&controller, "b").is_default());
		assert_eq!(node(&controller, "e").color, Some(ColorSpec::new(SECONDARY_DIM_COLOR)));
		assert!(controller.highlight().shortest_path.is_empty());
		assert!(controller.highlight().highlight_active);

		controller.dismiss_path();
		assert!(controller.path_description().is_none());
		assert!(!controller.nodes().unwrap().has_highlight());
	}

	#[test]
	fn path_failure_leaves_state_alone() {
		let (mut controller, _) = loaded();
		click(&mut controller, Some("a"), true, 0.0);
		let requests = click(&mut controller, Some("c"), true, 300.0);
		let [Request::ShortestPath(query)] = requests.as_slice() else {
			panic!("expected a path request");
		};
		let before = controller.nodes().unwrap().clone();
		let highlight = controller.highlight().clone();

		assert!(controller.apply_shortest_path(query, Err(ApiError::Transport("offline".into()))));
		assert!(matches!(controller.error(), Some(ExplorerError::ShortestPath(_))));
		assert_eq!(controller.nodes().unwrap(), &before);
		assert_eq!(controller.highlight(), &highlight);
		assert!(controller.path_description().is_none());
	}

	#[test]
	fn neighbourhood_click_drops_in_flight_path() {
		let (mut controller, _) = loaded();
		click(&mut controller, Some("a"), true, 0.0);
		let requests = click(&mut controller, Some("c"), true, 300.0);
		let [Request::ShortestPath(query)] = requests.as_slice() else {
			panic!("expected a path request");
		};
		let query = query.clone();

		click(&mut controller, Some("e"), false, 600.0);
		assert!(controller.highlight().shortest_path.is_empty());
		assert!(!controller.apply_shortest_path(&query, Ok(vec!["a".into(), "c".into()])));
		assert!(controller.path_description().is_none());
	}

	#[test]
	fn analysis_follows_current_query() {
		let (mut controller, _) = loaded();
		let Some(Request::Analysis(params)) = controller.request_analysis() else {
			panic!("expected an analysis request");
		};
		let stats = AnalysisStats {
			node_ct: Some(5),
			..AnalysisStats::default()
		};
		assert!(controller.apply_analysis(&params, Ok(stats.clone())));
		assert_eq!(controller.analysis(), Some(&stats));

		controller.set_params(SelectionParams::new("x", "y"));
		assert!(controller.analysis().is_none());
		assert!(!controller.apply_analysis(&params, Ok(stats)));
	}
}
