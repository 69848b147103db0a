use super::types::NodeId;

pub const DOUBLE_CLICK_THRESHOLD_MS: f64 = 200.0;

/// Milliseconds, as reported by `Date.now()`.
pub type Timestamp = f64;

#[derive(Clone, Debug, PartialEq)]
pub struct ClickEvent {
	pub nodes: Vec<NodeId>,
	pub shift: bool,
	pub at: Timestamp,
}

impl ClickEvent {
	pub fn node(&self) -> Option<&NodeId> {
		self.nodes.first()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClickAction {
	/// Shift-click on a node.
	SelectPathNode(NodeId),
	/// Plain click; `None` when the background was clicked.
	Highlight(Option<NodeId>),
}

/// A click waiting out the double-click window.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingClick {
	event: ClickEvent,
}

impl PendingClick {
	pub fn event(&self) -> &ClickEvent {
		&self.event
	}
}

/// Holds single clicks back until it is clear no double click followed them.
///
/// The render surface reports double clicks as their own event, so this never infers one
/// from click timing.
#[derive(Clone, Debug)]
pub struct ClickDisambiguator {
	threshold: f64,
	last_double_click_at: Option<Timestamp>,
}

impl Default for ClickDisambiguator {
	fn default() -> Self {
		Self::new(DOUBLE_CLICK_THRESHOLD_MS)
	}
}

impl ClickDisambiguator {
	pub fn new(threshold_ms: f64) -> Self {
		Self {
			threshold: threshold_ms,
			last_double_click_at: None,
		}
	}

	pub fn threshold_ms(&self) -> f64 {
		self.threshold
	}

	/// The caller must hand the result back to [`resolve`](Self::resolve) once the threshold
	/// has elapsed.
	pub fn on_click(&self, event: ClickEvent) -> PendingClick {
		PendingClick { event }
	}

	pub fn on_double_click(&mut self, at: Timestamp) {
		self.last_double_click_at = Some(at);
	}

	pub fn resolve(&self, pending: &PendingClick) -> Option<ClickAction> {
		let event = &pending.event;
		let single = match self.last_double_click_at {
			None => true,
			Some(last) => event.at - last > self.threshold,
		};
		if !single {
			return None;
		}
		match event.node() {
			Some(id) if event.shift => Some(ClickAction::SelectPathNode(id.clone())),
			node => Some(ClickAction::Highlight(node.cloned())),
		}
	}
}
