//! Keeps [`SelectionParams`] in the URL so back/forward navigation restores a graph.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use log::{debug, warn};
use url::form_urlencoded;
use wasm_bindgen::prelude::*;

use super::types::SelectionParams;

pub type SubscriptionId = u64;

/// Browser history as seen by the explorer.
///
/// Each subscriber is independent: unsubscribing one leaves the others and any handlers
/// installed outside the explorer in place.
pub trait Navigator {
	/// Current query string, with or without the leading `?`.
	fn query(&self) -> String;
	fn push(&self, query: &str);
	fn subscribe(&self, on_navigate: Box<dyn FnMut(String)>) -> SubscriptionId;
	fn unsubscribe(&self, id: SubscriptionId);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamOrigin {
	/// The user picked something in the widget.
	User,
	/// Params were read back from the URL.
	Navigation,
}

pub fn parse_query(query: &str) -> SelectionParams {
	let query = query.strip_prefix('?').unwrap_or(query);
	let mut params = SelectionParams::default();
	for (key, value) in form_urlencoded::parse(query.as_bytes()) {
		let value = value.into_owned();
		match key.as_ref() {
			"to" => params.to = Some(value),
			"from" => params.from = Some(value),
			"group" => params.group = Some(value),
			"weight" => params.weight = Some(value),
			"hierarchy" => params.hierarchy = value.parse().ok(),
			_ => {}
		}
	}
	params.normalized()
}

pub fn encode_query(params: &SelectionParams) -> String {
	let mut query = form_urlencoded::Serializer::new(String::new());
	let fields = [
		("to", params.to.as_deref()),
		("from", params.from.as_deref()),
		("group", params.group.as_deref()),
		("weight", params.weight.as_deref()),
		("hierarchy", params.hierarchy.map(|h| h.as_str())),
	];
	for (key, value) in fields {
		if let Some(value) = value {
			query.append_pair(key, value);
		}
	}
	query.finish()
}

pub struct HistorySync<N: Navigator> {
	navigator: N,
	subscription: Option<SubscriptionId>,
	current: SelectionParams,
}

impl<N: Navigator> HistorySync<N> {
	pub fn new(navigator: N) -> Self {
		Self {
			navigator,
			subscription: None,
			current: SelectionParams::default(),
		}
	}

	/// Reads the params in the URL and starts listening for navigation.
	pub fn mount(&mut self, mut on_navigate: impl FnMut(SelectionParams) + 'static) -> SelectionParams {
		self.unmount();
		self.current = parse_query(&self.navigator.query());
		let id = self
			.navigator
			.subscribe(Box::new(move |query| on_navigate(parse_query(&query))));
		self.subscription = Some(id);
		self.current.clone()
	}

	/// Records new params; pushes a history entry unless they came from the URL.
	pub fn params_changed(&mut self, params: &SelectionParams, origin: ParamOrigin) -> bool {
		if *params == self.current {
			return false;
		}
		self.current = params.clone();
		if origin == ParamOrigin::Navigation {
			return false;
		}
		self.navigator.push(&format!("?{}", encode_query(params)));
		true
	}

	pub fn unmount(&mut self) {
		if let Some(id) = self.subscription.take() {
			self.navigator.unsubscribe(id);
		}
	}
}

impl<N: Navigator> Drop for HistorySync<N> {
	fn drop(&mut self) {
		self.unmount();
	}
}

/// `window.history` and `popstate` listeners.
#[derive(Default)]
pub struct BrowserNavigator {
	listeners: RefCell<HashMap<SubscriptionId, Closure<dyn FnMut(web_sys::Event)>>>,
	next_id: Cell<SubscriptionId>,
}

fn location_search() -> String {
	web_sys::window()
		.and_then(|w| w.location().search().ok())
		.unwrap_or_default()
}

impl Navigator for BrowserNavigator {
	fn query(&self) -> String {
		location_search()
	}

	fn push(&self, query: &str) {
		let Some(window) = web_sys::window() else {
			return;
		};
		let url = match window.location().pathname() {
			Ok(path) => format!("{path}{query}"),
			Err(_) => query.to_string(),
		};
		let pushed = window
			.history()
			.and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(&url)));
		match pushed {
			Ok(()) => debug!("pushed history entry {url}"),
			Err(err) => warn!("failed to push history entry: {err:?}"),
		}
	}

	fn subscribe(&self, mut on_navigate: Box<dyn FnMut(String)>) -> SubscriptionId {
		let id = self.next_id.get();
		self.next_id.set(id + 1);
		let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| {
			on_navigate(location_search());
		});
		if let Some(window) = web_sys::window() {
			if let Err(err) = window
				.add_event_listener_with_callback("popstate", listener.as_ref().unchecked_ref())
			{
				warn!("failed to listen for popstate: {err:?}");
			}
		}
		self.listeners.borrow_mut().insert(id, listener);
		id
	}

	fn unsubscribe(&self, id: SubscriptionId) {
		let Some(listener) = self.listeners.borrow_mut().remove(&id) else {
			return;
		};
		if let Some(window) = web_sys::window() {
			if let Err(err) = window
				.remove_event_listener_with_callback("popstate", listener.as_ref().unchecked_ref())
			{
				warn!("failed to stop listening for popstate: {err:?}");
			}
		}
	}
}
