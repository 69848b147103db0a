//! Error types shared by the API client and the graph controller.

use thiserror::Error;

/// A failed request to the dashboard server.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ApiError {
	/// The request never produced a response.
	#[error("request failed: {0}")]
	Transport(String),
	/// The server answered with a non-success status.
	#[error("server responded with status {0}")]
	Status(u16),
	/// The server reported `"success": false`.
	#[error("{0}")]
	Server(String),
	/// The body was not the expected JSON.
	#[error("malformed response: {0}")]
	Decode(String),
}

impl From<serde_json::Error> for ApiError {
	fn from(err: serde_json::Error) -> Self {
		ApiError::Decode(err.to_string())
	}
}

/// Errors surfaced to the user as a dismissible banner.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ExplorerError {
	/// Column types could not be loaded; nothing is drawn.
	#[error("failed to load column types: {0}")]
	Dtypes(ApiError),
	/// Node and edge data could not be loaded.
	#[error("failed to load network data: {0}")]
	GraphData(ApiError),
	/// The shortest-path query failed.
	#[error("failed to load shortest path: {0}")]
	ShortestPath(ApiError),
	/// Network statistics could not be loaded.
	#[error("failed to load network analysis: {0}")]
	Analysis(ApiError),
	/// The render surface could not be created.
	#[error("unable to draw network: {0}")]
	Surface(String),
}
