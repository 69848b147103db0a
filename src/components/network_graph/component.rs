use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use leptos::prelude::*;
use log::{debug, info};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::api::ApiClient;
use super::canvas::{CanvasSurface, CanvasSurfaceFactory};
use super::click::ClickEvent;
use super::controller::{GraphViewController, Request};
use super::history::{BrowserNavigator, HistorySync, ParamOrigin};
use super::state::CanvasState;
use super::types::{AnalysisStats, ColumnDef, GroupsMapping, Hierarchy, SelectionParams};
use crate::config::ExplorerConfig;

type Controller = GraphViewController<CanvasSurfaceFactory>;

/// What the markup shows, copied out of the controller after every change.
#[derive(Clone, Debug, Default, PartialEq)]
struct ViewModel {
	params: SelectionParams,
	columns: Vec<ColumnDef>,
	groups: Option<GroupsMapping>,
	path_description: Option<String>,
	error: Option<String>,
	analysis: Option<AnalysisStats>,
	loading: bool,
}

impl ViewModel {
	fn capture(controller: &Controller) -> Self {
		Self {
			params: controller.params().clone(),
			columns: controller.columns().to_vec(),
			groups: controller.groups().cloned(),
			path_description: controller.path_description().map(String::from),
			error: controller.error().map(ToString::to_string),
			analysis: controller.analysis().cloned(),
			loading: controller.is_loading(),
		}
	}
}

#[derive(Clone, Copy, Debug)]
enum Column {
	To,
	From,
	Group,
	Weight,
}

impl Column {
	const ALL: [Column; 4] = [Column::From, Column::To, Column::Group, Column::Weight];

	fn label(self) -> &'static str {
		match self {
			Column::To => "To",
			Column::From => "From",
			Column::Group => "Group",
			Column::Weight => "Weight",
		}
	}

	fn get(self, params: &SelectionParams) -> Option<&String> {
		match self {
			Column::To => params.to.as_ref(),
			Column::From => params.from.as_ref(),
			Column::Group => params.group.as_ref(),
			Column::Weight => params.weight.as_ref(),
		}
	}

	fn set(self, params: &mut SelectionParams, value: Option<String>) {
		match self {
			Column::To => params.to = value,
			Column::From => params.from = value,
			Column::Group => params.group = value,
			Column::Weight => params.weight = value,
		}
	}
}

/// Shared handle the event handlers and futures go through.
#[derive(Clone)]
struct Explorer {
	controller: Rc<RefCell<Controller>>,
	history: Rc<RefCell<HistorySync<BrowserNavigator>>>,
	api: Rc<ApiClient>,
	model: RwSignal<ViewModel>,
	threshold: Duration,
}

impl Explorer {
	fn sync(&self) {
		let model = ViewModel::capture(&self.controller.borrow());
		self.model.set(model);
	}

	fn run(&self, requests: Vec<Request>) {
		for request in requests {
			let explorer = self.clone();
			wasm_bindgen_futures::spawn_local(async move { explorer.complete(request).await });
		}
		self.sync();
	}

	async fn complete(&self, request: Request) {
		match request {
			Request::Dtypes => {
				let result = self.api.dtypes().await;
				self.controller.borrow_mut().apply_dtypes(result);
			}
			Request::Graph(params) => {
				let result = self.api.network_data(&params).await;
				self.controller.borrow_mut().apply_graph(&params, result);
			}
			Request::ShortestPath(query) => {
				let result = self.api.shortest_path(&query).await;
				self.controller
					.borrow_mut()
					.apply_shortest_path(&query, result);
			}
			Request::Analysis(params) => {
				let result = self.api.analysis(&params).await;
				self.controller.borrow_mut().apply_analysis(&params, result);
			}
		}
		self.sync();
	}

	fn mount(&self) {
		let explorer = self.clone();
		let initial = self
			.history
			.borrow_mut()
			.mount(move |params| explorer.change_params(params, ParamOrigin::Navigation));
		info!("mounting network explorer with {initial:?}");
		let requests = self.controller.borrow_mut().start(initial);
		self.run(requests);
	}

	fn unmount(&self) {
		self.history.borrow_mut().unmount();
	}

	fn change_params(&self, params: SelectionParams, origin: ParamOrigin) {
		let requests = self.controller.borrow_mut().set_params(params);
		let current = self.controller.borrow().params().clone();
		self.history.borrow_mut().params_changed(&current, origin);
		self.run(requests);
	}

	fn update_params(&self, edit: impl FnOnce(&mut SelectionParams)) {
		let mut params = self.controller.borrow().params().clone();
		edit(&mut params);
		self.change_params(params, ParamOrigin::User);
	}

	fn click(&self, event: ClickEvent) {
		let pending = self.controller.borrow().on_click(event);
		let explorer = self.clone();
		set_timeout(
			move || {
				let requests = explorer.controller.borrow_mut().resolve_click(&pending);
				explorer.run(requests);
			},
			self.threshold,
		);
	}

	fn double_click(&self, event: ClickEvent) {
		self.controller.borrow_mut().on_double_click(&event);
		self.sync();
	}

	fn analyze(&self) {
		let request = self.controller.borrow_mut().request_analysis();
		self.run(request.into_iter().collect());
	}

	fn dismiss_error(&self) {
		self.controller.borrow_mut().dismiss_error();
		self.sync();
	}

	fn dismiss_path(&self) {
		self.controller.borrow_mut().dismiss_path();
		self.sync();
	}

	fn canvas_state(&self) -> Option<Rc<RefCell<CanvasState>>> {
		self.controller.borrow().surface().map(CanvasSurface::state)
	}

	fn node_event(&self, canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> ClickEvent {
		let node = local_position(canvas_ref, ev).and_then(|(x, y)| {
			self.canvas_state()
				.and_then(|state| state.borrow().node_at_position(x, y))
		});
		ClickEvent {
			nodes: node.into_iter().collect(),
			shift: ev.shift_key(),
			at: js_sys::Date::now(),
		}
	}
}

fn local_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas = canvas_ref.get_untracked()?;
	let canvas: HtmlCanvasElement = canvas.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |value: Result<JsValue, JsValue>, fallback: f64| {
		value.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(
		dim(window.inner_width(), 800.0),
		dim(window.inner_height(), 600.0),
	)
}

fn column_picker(column: Column, explorer: Explorer) -> impl IntoView {
	let model = explorer.model;
	let on_change = move |ev: web_sys::Event| {
		let value = event_target_value(&ev);
		explorer.update_params(|params| column.set(params, Some(value)));
	};
	view! {
		<label class="network-picker">
			{column.label()}
			<select on:change=on_change>
				<option value="">"--"</option>
				{move || {
					let current = model.with(|m| column.get(&m.params).cloned());
					model.with(|m| {
						m.columns
							.iter()
							.map(|c| {
								let selected = current.as_deref() == Some(c.name.as_str());
								view! {
									<option value=c.name.clone() selected=selected>
										{c.name.clone()}
									</option>
								}
							})
							.collect_view()
					})
				}}
			</select>
		</label>
	}
}

fn hierarchy_picker(explorer: Explorer) -> impl IntoView {
	let model = explorer.model;
	let on_change = move |ev: web_sys::Event| {
		let value = event_target_value(&ev);
		explorer.update_params(|params| params.hierarchy = value.parse::<Hierarchy>().ok());
	};
	view! {
		<label class="network-picker">
			"Hierarchy"
			<select on:change=on_change>
				<option value="">"None"</option>
				{move || {
					let current = model.with(|m| m.params.hierarchy);
					Hierarchy::ALL
						.into_iter()
						.map(|h| {
							view! {
								<option value=h.as_str() selected={current == Some(h)}>
									{h.description()}
								</option>
							}
						})
						.collect_view()
				}}
			</select>
		</label>
	}
}

fn shown(visible: bool) -> &'static str {
	if visible { "flex" } else { "none" }
}

/// Network view with column pickers, legend, shortest-path banner and analysis panel.
///
/// Plain click highlights a node's neighbourhood, shift-click two nodes for their shortest
/// path, double-click zooms to a node (or fits the graph on the background).
#[component]
pub fn NetworkExplorer(
	config: ExplorerConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let model = RwSignal::new(ViewModel::default());
	let explorer = Explorer {
		controller: Rc::new(RefCell::new(GraphViewController::new(
			CanvasSurfaceFactory::new(canvas_ref),
			&config,
		))),
		history: Rc::new(RefCell::new(HistorySync::new(BrowserNavigator::default()))),
		api: Rc::new(ApiClient::new(&config)),
		model,
		threshold: config.double_click_threshold(),
	};
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let started = Rc::new(Cell::new(false));

	let (explorer_init, resize_cb_init) = (explorer.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if started.replace(true) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		if fullscreen {
			let (explorer_resize, canvas_resize) = (explorer_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(state) = explorer_resize.canvas_state() {
					state.borrow_mut().resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		explorer_init.mount();
	});

	let teardown = StoredValue::new_local((explorer.clone(), resize_cb));
	on_cleanup(move || {
		teardown.try_with_value(|(explorer, resize_cb)| {
			debug!("unmounting network explorer");
			explorer.unmount();
			if let (Some(window), Some(cb)) = (web_sys::window(), resize_cb.borrow().as_ref()) {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		});
	});

	let explorer_md = explorer.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(state) = explorer_md.canvas_state() {
			state.borrow_mut().press(x, y);
		}
	};

	let explorer_mm = explorer.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(state) = explorer_mm.canvas_state() {
			state.borrow_mut().drag_to(x, y);
		}
	};

	let explorer_mu = explorer.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(state) = explorer_mu.canvas_state() {
			state.borrow_mut().release();
		}
	};

	let explorer_ml = explorer.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(state) = explorer_ml.canvas_state() {
			state.borrow_mut().release();
		}
	};

	let explorer_wh = explorer.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(state) = explorer_wh.canvas_state() {
			state.borrow_mut().zoom_at(x, y, ev.delta_y() < 0.0);
		}
	};

	let explorer_click = explorer.clone();
	let on_click = move |ev: MouseEvent| {
		let suppressed = explorer_click
			.canvas_state()
			.is_some_and(|state| state.borrow_mut().take_suppressed_click());
		if !suppressed {
			explorer_click.click(explorer_click.node_event(canvas_ref, &ev));
		}
	};

	let explorer_dbl = explorer.clone();
	let on_dblclick = move |ev: MouseEvent| {
		explorer_dbl.double_click(explorer_dbl.node_event(canvas_ref, &ev));
	};

	let (explorer_err, explorer_path, explorer_stats) =
		(explorer.clone(), explorer.clone(), explorer.clone());
	let pickers = Column::ALL
		.into_iter()
		.map(|column| column_picker(column, explorer.clone()))
		.collect_view();

	view! {
		<div class="network-explorer">
			<div class="network-controls">
				{pickers}
				{hierarchy_picker(explorer.clone())}
				<button class="network-analyze" on:click=move |_| explorer_stats.analyze()>
					"Analyze network"
				</button>
				<span
					class="network-loading"
					style:display=move || shown(model.with(|m| m.loading))
				>
					"Loading..."
				</span>
			</div>
			<div
				class="network-error"
				style:display=move || shown(model.with(|m| m.error.is_some()))
			>
				<span>{move || model.with(|m| m.error.clone().unwrap_or_default())}</span>
				<button on:click=move |_| explorer_err.dismiss_error()>"×"</button>
			</div>
			<div
				class="network-path"
				style:display=move || shown(model.with(|m| m.path_description.is_some()))
			>
				<span>{move || model.with(|m| m.path_description.clone().unwrap_or_default())}</span>
				<button on:click=move |_| explorer_path.dismiss_path()>"×"</button>
			</div>
			<ul class="network-legend">
				{move || {
					model
						.with(|m| {
							m.groups
								.as_ref()
								.map(|groups| {
									groups
										.iter()
										.map(|(name, color)| {
											view! {
												<li>
													<span
														class="network-legend-swatch"
														style:background-color=color.to_string()
													></span>
													{name.clone()}
												</li>
											}
										})
										.collect_view()
								})
						})
				}}
			</ul>
			<dl class="network-analysis">
				{move || {
					model
						.with(|m| {
							m.analysis
								.as_ref()
								.map(|stats| {
									stats
										.rows()
										.into_iter()
										.map(|(name, value)| view! { <dt>{name}</dt><dd>{value}</dd> })
										.collect_view()
								})
						})
				}}
			</dl>
			<canvas
				node_ref=canvas_ref
				class="network-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:click=on_click
				on:dblclick=on_dblclick
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}
