use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Maximum number of nodes buffered for a shortest-path request.
pub const MAX_PATH_SELECTION: usize = 2;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

impl<'de> Deserialize<'de> for NodeId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		flexible_string(deserializer).map(NodeId)
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
	Int(i64),
	Float(f64),
	Text(String),
}

impl From<Scalar> for String {
	fn from(value: Scalar) -> Self {
		match value {
			Scalar::Int(i) => i.to_string(),
			Scalar::Float(f) => f.to_string(),
			Scalar::Text(s) => s,
		}
	}
}

/// Accepts JSON numbers or strings and yields their text.
pub(crate) fn flexible_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Scalar::deserialize(deserializer).map(String::from)
}

pub(crate) fn optional_flexible_string<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Option<String>, D::Error> {
	Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

/// A CSS color understood by the render surface.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorSpec(String);

impl ColorSpec {
	pub fn new(color: impl Into<String>) -> Self {
		Self(color.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ColorSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// The text of a node. It is either shown as its label or parked as a hidden label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeText {
	Visible(String),
	Hidden(String),
}

impl NodeText {
	pub fn text(&self) -> &str {
		match self {
			NodeText::Visible(text) | NodeText::Hidden(text) => text,
		}
	}

	pub fn is_visible(&self) -> bool {
		matches!(self, NodeText::Visible(_))
	}

	pub fn hide(&mut self) {
		if let NodeText::Visible(text) = self {
			let text = std::mem::take(text);
			*self = NodeText::Hidden(text);
		}
	}

	pub fn show(&mut self) {
		if let NodeText::Hidden(text) = self {
			let text = std::mem::take(text);
			*self = NodeText::Visible(text);
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "WireNode")]
pub struct Node {
	pub id: NodeId,
	pub text: NodeText,
	pub color: Option<ColorSpec>,
	pub title: Option<String>,
	pub group: Option<String>,
}

impl Node {
	pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
		Self {
			id: NodeId::new(id),
			text: NodeText::Visible(label.into()),
			color: None,
			title: None,
			group: None,
		}
	}

	pub fn with_group(mut self, group: impl Into<String>) -> Self {
		self.group = Some(group.into());
		self
	}

	/// The label as currently displayed, if any.
	pub fn label(&self) -> Option<&str> {
		match &self.text {
			NodeText::Visible(text) => Some(text),
			NodeText::Hidden(_) => None,
		}
	}

	pub fn hidden_label(&self) -> Option<&str> {
		match &self.text {
			NodeText::Hidden(text) => Some(text),
			NodeText::Visible(_) => None,
		}
	}
}

#[derive(Deserialize)]
struct WireNode {
	id: NodeId,
	#[serde(default, deserialize_with = "optional_flexible_string")]
	label: Option<String>,
	#[serde(default)]
	title: Option<String>,
	#[serde(default, deserialize_with = "optional_flexible_string")]
	group: Option<String>,
}

impl From<WireNode> for Node {
	fn from(wire: WireNode) -> Self {
		let label = wire.label.unwrap_or_else(|| wire.id.to_string());
		Self {
			id: wire.id,
			text: NodeText::Visible(label),
			color: None,
			title: wire.title,
			group: wire.group,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Edge {
	pub from: NodeId,
	pub to: NodeId,
	#[serde(default)]
	pub value: Option<f64>,
	#[serde(default)]
	pub title: Option<String>,
}

impl Edge {
	pub fn new(from: &str, to: &str) -> Self {
		Self {
			from: from.into(),
			to: to.into(),
			value: None,
			title: None,
		}
	}
}

/// Payload of the network-data endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<Node>,
	#[serde(default)]
	pub edges: Vec<Edge>,
	/// Group name to a representative node of that group.
	#[serde(default)]
	pub groups: BTreeMap<String, NodeId>,
}

/// Legend entries, ordered by group name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupsMapping(pub Vec<(String, ColorSpec)>);

impl GroupsMapping {
	pub fn iter(&self) -> impl Iterator<Item = &(String, ColorSpec)> {
		self.0.iter()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hierarchy {
	#[serde(rename = "UD")]
	UpDown,
	#[serde(rename = "DU")]
	DownUp,
	#[serde(rename = "LR")]
	LeftRight,
	#[serde(rename = "RL")]
	RightLeft,
}

impl Hierarchy {
	pub const ALL: [Hierarchy; 4] = [
		Hierarchy::UpDown,
		Hierarchy::DownUp,
		Hierarchy::LeftRight,
		Hierarchy::RightLeft,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Hierarchy::UpDown => "UD",
			Hierarchy::DownUp => "DU",
			Hierarchy::LeftRight => "LR",
			Hierarchy::RightLeft => "RL",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			Hierarchy::UpDown => "Up-Down",
			Hierarchy::DownUp => "Down-Up",
			Hierarchy::LeftRight => "Left-Right",
			Hierarchy::RightLeft => "Right-Left",
		}
	}
}

impl fmt::Display for Hierarchy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownHierarchy(pub String);

impl FromStr for Hierarchy {
	type Err = UnknownHierarchy;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Hierarchy::ALL
			.into_iter()
			.find(|h| h.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownHierarchy(s.to_string()))
	}
}

/// The query that defines the current graph.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionParams {
	pub to: Option<String>,
	pub from: Option<String>,
	pub group: Option<String>,
	pub weight: Option<String>,
	pub hierarchy: Option<Hierarchy>,
}

impl SelectionParams {
	pub fn new(to: &str, from: &str) -> Self {
		Self {
			to: Some(to.to_string()),
			from: Some(from.to_string()),
			..Self::default()
		}
	}

	/// Empty strings count as unset.
	pub fn normalized(mut self) -> Self {
		for field in [&mut self.to, &mut self.from, &mut self.group, &mut self.weight] {
			if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
				*field = None;
			}
		}
		self
	}

	/// Both endpoint columns are chosen.
	pub fn is_complete(&self) -> bool {
		self.to.is_some() && self.from.is_some()
	}

	/// Equal on every field the server query depends on.
	pub fn same_query(&self, other: &SelectionParams) -> bool {
		self.to == other.to
			&& self.from == other.from
			&& self.group == other.group
			&& self.weight == other.weight
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightState {
	pub highlight_active: bool,
	pub shortest_path: Vec<NodeId>,
}

/// Column listing entry from the dtypes endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ColumnDef {
	pub name: String,
	pub dtype: String,
	#[serde(default)]
	pub index: usize,
}

/// Summary statistics from the network-analysis endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalysisStats {
	pub node_ct: Option<u64>,
	pub edge_ct: Option<u64>,
	pub leaf_ct: Option<u64>,
	pub triangle_ct: Option<u64>,
	#[serde(deserialize_with = "optional_flexible_string")]
	pub most_connected_node: Option<String>,
	pub max_edge: Option<f64>,
	pub min_edge: Option<f64>,
	pub avg_weight: Option<f64>,
}

impl AnalysisStats {
	/// Labelled rows for display, skipping unreported values.
	pub fn rows(&self) -> Vec<(&'static str, String)> {
		let counts = [
			("Nodes", self.node_ct),
			("Edges", self.edge_ct),
			("Leaves", self.leaf_ct),
			("Triangles", self.triangle_ct),
		];
		let weights = [
			("Max edge weight", self.max_edge),
			("Min edge weight", self.min_edge),
			("Average weight", self.avg_weight),
		];
		let mut rows: Vec<(&'static str, String)> = counts
			.into_iter()
			.filter_map(|(name, v)| v.map(|v| (name, v.to_string())))
			.collect();
		if let Some(node) = &self.most_connected_node {
			rows.push(("Most connected node", node.clone()));
		}
		rows.extend(
			weights
				.into_iter()
				.filter_map(|(name, v)| v.map(|v| (name, format!("{v:.2}")))),
		);
		rows
	}
}
