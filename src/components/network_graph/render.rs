use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{CanvasState, NODE_RADIUS};

const BACKGROUND: &str = "#1a1a2e";
const EDGE_COLOR: &str = "rgba(100, 180, 255, 0.6)";
const ARROW_COLOR: &str = "rgba(100, 180, 255, 0.8)";

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap, head) = (8.0 / k, 4.0 / k, 8.0 / k);
	let pattern = js_sys::Array::of2(&JsValue::from_f64(dash), &JsValue::from_f64(gap));
	let solid = js_sys::Array::new();

	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_fill_style_str(ARROW_COLOR);
	ctx.set_line_dash_offset(-(state.flow_time * 30.0) % (dash + gap));
	state.graph.visit_edges(|src, tgt, _| {
		let from = (src.x() as f64, src.y() as f64);
		let to = (tgt.x() as f64, tgt.y() as f64);
		let len = (to.0 - from.0).hypot(to.1 - from.1);
		if len < 0.001 {
			return;
		}
		// unit vector along the edge
		let dir = ((to.0 - from.0) / len, (to.1 - from.1) / len);
		let tip = (to.0 - dir.0 * NODE_RADIUS, to.1 - dir.1 * NODE_RADIUS);

		ctx.set_line_width(1.5 * state.edge_width(src.index(), tgt.index()) / k);
		let _ = ctx.set_line_dash(&pattern);
		ctx.begin_path();
		ctx.move_to(from.0 + dir.0 * NODE_RADIUS, from.1 + dir.1 * NODE_RADIUS);
		ctx.line_to(tip.0 - dir.0 * head, tip.1 - dir.1 * head);
		ctx.stroke();

		let _ = ctx.set_line_dash(&solid);
		draw_arrowhead(ctx, tip, dir, head);
	});
	let _ = ctx.set_line_dash(&solid);
}

fn draw_arrowhead(ctx: &CanvasRenderingContext2d, tip: (f64, f64), dir: (f64, f64), size: f64) {
	let base = (tip.0 - dir.0 * size, tip.1 - dir.1 * size);
	let half = (-dir.1 * size * 0.5, dir.0 * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(base.0 + half.0, base.1 + half.1);
	ctx.line_to(base.0 - half.0, base.1 - half.1);
	ctx.close_path();
	ctx.fill();
}

/// Nodes carry their own display color; dimmed nodes simply have no label.
fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));

	state.graph.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);
		let info = &node.data.user_data;

		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&info.color);
		ctx.fill();

		if let Some(label) = &info.label {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.85)");
			let _ = ctx.fill_text(label, x + NODE_RADIUS + 3.0, y + 3.0);
		}
	});
}
