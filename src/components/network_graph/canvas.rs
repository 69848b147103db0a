use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::highlight::Adjacency;
use super::render;
use super::state::CanvasState;
use super::surface::{FitOptions, FocusOptions, RenderSurface, SurfaceFactory, SurfaceOptions};
use super::types::{ColorSpec, Edge, Node, NodeId};
use crate::error::ExplorerError;

/// Source of animation frames. Returns a handle that can cancel the pending frame.
pub trait Scheduler: 'static {
	fn request(&self, frame: Box<dyn FnOnce()>) -> Option<i32>;
	fn cancel(&self, handle: i32);
}

/// `window.requestAnimationFrame`.
pub struct AnimationFrames;

impl Scheduler for AnimationFrames {
	fn request(&self, frame: Box<dyn FnOnce()>) -> Option<i32> {
		let window = web_sys::window()?;
		let callback = Closure::once_into_js(move || frame());
		window
			.request_animation_frame(callback.unchecked_ref())
			.map_err(|err| warn!("failed to request animation frame: {err:?}"))
			.ok()
	}

	fn cancel(&self, handle: i32) {
		let Some(window) = web_sys::window() else {
			return;
		};
		if let Err(err) = window.cancel_animation_frame(handle) {
			warn!("failed to cancel animation frame: {err:?}");
		}
	}
}

struct LoopShared<S> {
	scheduler: S,
	step: RefCell<Box<dyn FnMut()>>,
	pending: Cell<Option<i32>>,
	stopped: Cell<bool>,
}

/// Runs `step` once per frame until stopped or dropped.
///
/// Scheduled frames only hold a weak reference, so dropping the loop frees `step` and
/// everything it captured.
pub struct FrameLoop<S: Scheduler> {
	shared: Rc<LoopShared<S>>,
}

impl<S: Scheduler> FrameLoop<S> {
	pub fn start(scheduler: S, step: impl FnMut() + 'static) -> Self {
		let shared = Rc::new(LoopShared {
			scheduler,
			step: RefCell::new(Box::new(step)),
			pending: Cell::new(None),
			stopped: Cell::new(false),
		});
		schedule(&shared);
		Self { shared }
	}

	pub fn stop(&self) {
		self.shared.stopped.set(true);
		if let Some(handle) = self.shared.pending.take() {
			self.shared.scheduler.cancel(handle);
		}
	}
}

impl<S: Scheduler> Drop for FrameLoop<S> {
	fn drop(&mut self) {
		self.stop();
	}
}

fn schedule<S: Scheduler>(shared: &Rc<LoopShared<S>>) {
	let weak: Weak<LoopShared<S>> = Rc::downgrade(shared);
	let handle = shared.scheduler.request(Box::new(move || {
		let Some(shared) = weak.upgrade() else {
			return;
		};
		shared.pending.set(None);
		if shared.stopped.get() {
			return;
		}
		{
			let mut step = shared.step.borrow_mut();
			(&mut **step)();
		}
		schedule(&shared);
	}));
	shared.pending.set(handle);
}

/// A network drawn on a 2D canvas and animated by `requestAnimationFrame`.
pub struct CanvasSurface {
	state: Rc<RefCell<CanvasState>>,
	frames: FrameLoop<AnimationFrames>,
}

impl CanvasSurface {
	fn start(state: CanvasState, ctx: CanvasRenderingContext2d) -> Self {
		let state = Rc::new(RefCell::new(state));
		let state_anim = state.clone();
		let frames = FrameLoop::start(AnimationFrames, move || {
			let mut s = state_anim.borrow_mut();
			s.tick(0.016);
			render::render(&s, &ctx);
		});
		Self { state, frames }
	}

	/// Shared view state, for pointer handling.
	pub fn state(&self) -> Rc<RefCell<CanvasState>> {
		self.state.clone()
	}
}

impl Adjacency for CanvasSurface {
	fn connected_nodes(&self, id: &NodeId) -> Vec<NodeId> {
		self.state.borrow().neighbors(id)
	}
}

impl RenderSurface for CanvasSurface {
	fn update_nodes(&mut self, nodes: Vec<Node>) {
		self.state.borrow_mut().update_nodes(&nodes);
	}

	fn focus(&mut self, id: &NodeId, options: FocusOptions) {
		self.state.borrow_mut().focus(id, options.scale);
	}

	fn fit(&mut self, options: FitOptions) {
		self.state.borrow_mut().fit(options);
	}

	fn node_color(&self, id: &NodeId) -> Option<ColorSpec> {
		self.state.borrow().base_color(id).map(ColorSpec::new)
	}

	fn destroy(&mut self) {
		debug!("stopping canvas frame loop");
		self.frames.stop();
	}
}

/// Creates surfaces on the mounted `<canvas>`.
pub struct CanvasSurfaceFactory {
	canvas: NodeRef<leptos::html::Canvas>,
}

impl CanvasSurfaceFactory {
	pub fn new(canvas: NodeRef<leptos::html::Canvas>) -> Self {
		Self { canvas }
	}
}

impl SurfaceFactory for CanvasSurfaceFactory {
	type Surface = CanvasSurface;

	fn create(
		&mut self,
		nodes: Vec<Node>,
		edges: &[Edge],
		options: SurfaceOptions,
	) -> Result<CanvasSurface, ExplorerError> {
		let canvas: HtmlCanvasElement = self
			.canvas
			.get_untracked()
			.ok_or_else(|| ExplorerError::Surface("canvas is not mounted".into()))?;
		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.map_err(|err| ExplorerError::Surface(format!("{err:?}")))?
			.ok_or_else(|| ExplorerError::Surface("no 2d context".into()))?
			.dyn_into()
			.map_err(|_| ExplorerError::Surface("unexpected context type".into()))?;

		let state = CanvasState::new(
			&nodes,
			edges,
			&options,
			canvas.width() as f64,
			canvas.height() as f64,
		);
		Ok(CanvasSurface::start(state, ctx))
	}
}
