use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, NODE_RADIUS};
use super::types::NodeRole;
use crate::engine::normalize_links;

struct Palette {
	fill: &'static str,
	stroke: &'static str,
	shadow: &'static str,
}

const SOURCE: Palette = Palette {
	fill: "rgba(56, 232, 198, 0.18)",
	stroke: "rgba(56, 232, 198, 0.5)",
	shadow: "rgba(56, 232, 198, 0.35)",
};
const TARGET: Palette = Palette {
	fill: "rgba(255, 90, 126, 0.22)",
	stroke: "rgba(255, 90, 126, 0.6)",
	shadow: "rgba(255, 90, 126, 0.35)",
};
const PLAYER: Palette = Palette {
	fill: "rgba(109, 116, 209, 0.22)",
	stroke: "rgba(109, 116, 209, 0.6)",
	shadow: "rgba(109, 116, 209, 0.35)",
};

const BACKGROUND: &str = "#0b1020";
const LINK_COLOR: &str = "rgba(56, 232, 198, 0.4)";
const HIGHLIGHT: &str = "rgba(255, 255, 255, 0.85)";
const LABEL_COLOR: &str = "#E4E8FF";

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let canvas = state.canvas();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, canvas.width, canvas.height);

	let vp = state.camera.current();
	ctx.save();
	let _ = ctx.translate(vp.x, vp.y);
	let _ = ctx.scale(vp.zoom, vp.zoom);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_links(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(LINK_COLOR);
	ctx.set_line_width(2.0);
	ctx.set_line_cap("round");
	for link in normalize_links(&state.data.nodes, &state.data.links) {
		let (Some(from), Some(to)) = (state.position(&link.source), state.position(&link.target))
		else {
			continue;
		};
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
		ctx.stroke();
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let data = &state.data;
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_font("600 16px sans-serif");

	for node in &data.nodes {
		let Some(p) = state.position(&node.id) else {
			continue;
		};
		let palette = match data.role(&node.id) {
			NodeRole::Source => &SOURCE,
			NodeRole::Target => &TARGET,
			NodeRole::Player => &PLAYER,
		};
		let is_active = data.active_id.as_deref() == Some(node.id.as_str());
		let is_hovered = state.hover.as_deref() == Some(node.id.as_str());
		let scale = if is_active {
			1.08
		} else if is_hovered {
			1.04
		} else {
			1.0
		};
		let radius = NODE_RADIUS * scale;

		ctx.save();
		ctx.set_shadow_color(if is_active || is_hovered {
			"rgba(255, 255, 255, 0.25)"
		} else {
			palette.shadow
		});
		ctx.set_shadow_blur(25.0);
		ctx.set_shadow_offset_y(10.0);
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(palette.fill);
		ctx.fill();
		ctx.restore();

		ctx.set_stroke_style_str(if is_active || is_hovered {
			HIGHLIGHT
		} else {
			palette.stroke
		});
		ctx.set_line_width(2.5);
		ctx.stroke();

		if data.is_loading(&node.id) {
			draw_loading_ring(ctx, p.x, p.y, radius + 8.0);
		}

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&node.label, p.x, p.y);
	}
}

fn draw_loading_ring(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64) {
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0),
		&JsValue::from_f64(6.0),
	));
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(HIGHLIGHT);
	ctx.set_line_width(1.5);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}
