//! Runtime configuration for the network explorer.

use std::time::Duration;

use log::warn;
use serde::Deserialize;

use crate::components::network_graph::{ColorSpec, DIM_COLOR, SECONDARY_DIM_COLOR};

/// Id of the `<script type="application/json">` element holding the configuration.
pub const CONFIG_ELEMENT_ID: &str = "explorer-config";

/// Explorer settings. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
	/// Prefix of every endpoint, without a trailing slash.
	pub api_base: String,
	/// Dataset the endpoints are queried for.
	pub data_id: String,
	/// How long a single click waits for a double click.
	pub double_click_threshold_ms: u32,
	/// Color of nodes outside the highlight.
	pub dim_color: ColorSpec,
	/// Color of second-degree neighbours and nodes off the shortest path.
	pub second_degree_color: ColorSpec,
	/// Zoom applied when a node is double-clicked.
	pub focus_scale: f64,
}

impl Default for ExplorerConfig {
	fn default() -> Self {
		Self {
			api_base: "/api".into(),
			data_id: "1".into(),
			double_click_threshold_ms: 200,
			dim_color: ColorSpec::new(DIM_COLOR),
			second_degree_color: ColorSpec::new(SECONDARY_DIM_COLOR),
			focus_scale: 1.5,
		}
	}
}

impl ExplorerConfig {
	/// Parses a JSON document.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}

	/// Reads the configuration embedded in the page, falling back to defaults.
	pub fn from_document() -> Self {
		let text = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
			.and_then(|el| el.text_content());
		match text {
			Some(json) => Self::from_json(&json).unwrap_or_else(|err| {
				warn!("ignoring malformed explorer config: {err}");
				Self::default()
			}),
			None => Self::default(),
		}
	}

	/// Double-click window as a [`Duration`].
	pub fn double_click_threshold(&self) -> Duration {
		Duration::from_millis(u64::from(self.double_click_threshold_ms))
	}

	/// Base URL with any trailing slash removed.
	pub fn api_base(&self) -> &str {
		self.api_base.trim_end_matches('/')
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = ExplorerConfig::from_json(r#"{"data_id": "7", "api_base": "/dtale/"}"#).unwrap();
		assert_eq!(config.data_id, "7");
		assert_eq!(config.api_base(), "/dtale");
		assert_eq!(config.double_click_threshold(), Duration::from_millis(200));
		assert_eq!(config.dim_color, ColorSpec::new(DIM_COLOR));
	}

	#[test]
	fn rejects_wrong_types() {
		assert!(ExplorerConfig::from_json(r#"{"focus_scale": "big"}"#).is_err());
	}
}
