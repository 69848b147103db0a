//! JSON endpoints the explorer reads from.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::form_urlencoded;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::shortest_path::PathQuery;
use super::types::{AnalysisStats, ColumnDef, GraphData, SelectionParams};
use crate::config::ExplorerConfig;
use crate::error::ApiError;

#[derive(Deserialize)]
struct DtypesResponse {
	dtypes: Vec<ColumnDef>,
}

#[derive(Deserialize)]
struct DataResponse<T> {
	data: T,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiClient {
	base: String,
	data_id: String,
}

impl ApiClient {
	pub fn new(config: &ExplorerConfig) -> Self {
		Self {
			base: config.api_base().to_string(),
			data_id: config.data_id.clone(),
		}
	}

	fn url(&self, endpoint: &str, query: &[(&str, Option<&str>)]) -> String {
		let mut url = format!("{}/{endpoint}/{}", self.base, self.data_id);
		let mut pairs = form_urlencoded::Serializer::new(String::new());
		for (key, value) in query {
			if let Some(value) = value {
				pairs.append_pair(key, value);
			}
		}
		let pairs = pairs.finish();
		if !pairs.is_empty() {
			url.push('?');
			url.push_str(&pairs);
		}
		url
	}

	pub fn dtypes_url(&self) -> String {
		self.url("dtypes", &[])
	}

	pub fn network_data_url(&self, params: &SelectionParams) -> String {
		self.url(
			"network-data",
			&[
				("to", params.to.as_deref()),
				("from", params.from.as_deref()),
				("group", params.group.as_deref()),
				("weight", params.weight.as_deref()),
			],
		)
	}

	pub fn shortest_path_url(&self, query: &PathQuery) -> String {
		self.url(
			"shortest-path",
			&[
				("to", query.params.to.as_deref()),
				("from", query.params.from.as_deref()),
				("start", Some(query.start.as_str())),
				("end", Some(query.end.as_str())),
			],
		)
	}

	pub fn analysis_url(&self, params: &SelectionParams) -> String {
		self.url(
			"network-analysis",
			&[
				("to", params.to.as_deref()),
				("from", params.from.as_deref()),
				("weight", params.weight.as_deref()),
			],
		)
	}

	pub async fn dtypes(&self) -> Result<Vec<ColumnDef>, ApiError> {
		let response: DtypesResponse = self.get(&self.dtypes_url()).await?;
		Ok(response.dtypes)
	}

	pub async fn network_data(&self, params: &SelectionParams) -> Result<GraphData, ApiError> {
		self.get(&self.network_data_url(params)).await
	}

	pub async fn shortest_path(&self, query: &PathQuery) -> Result<Vec<String>, ApiError> {
		let response: DataResponse<Vec<String>> = self.get(&self.shortest_path_url(query)).await?;
		Ok(response.data)
	}

	pub async fn analysis(&self, params: &SelectionParams) -> Result<AnalysisStats, ApiError> {
		let response: DataResponse<AnalysisStats> = self.get(&self.analysis_url(params)).await?;
		Ok(response.data)
	}

	async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
		let window =
			web_sys::window().ok_or_else(|| ApiError::Transport("no browser window".into()))?;
		let response = JsFuture::from(window.fetch_with_str(url))
			.await
			.map_err(transport)?;
		let response: Response = response.dyn_into().map_err(transport)?;
		if !response.ok() {
			return Err(ApiError::Status(response.status()));
		}
		let body = JsFuture::from(response.text().map_err(transport)?)
			.await
			.map_err(transport)?;
		let body = body
			.as_string()
			.ok_or_else(|| ApiError::Decode("response body is not text".into()))?;
		decode(&body)
	}
}

fn transport(err: JsValue) -> ApiError {
	ApiError::Transport(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

/// Parses a response body, turning `"success": false` envelopes into [`ApiError::Server`].
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
	let value: Value = serde_json::from_str(body)?;
	if value.get("success") == Some(&Value::Bool(false)) {
		let message = value
			.get("error")
			.and_then(Value::as_str)
			.unwrap_or("unknown server error");
		return Err(ApiError::Server(message.to_string()));
	}
	Ok(serde_json::from_value(value)?)
}
