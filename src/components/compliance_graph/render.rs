use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::camera::Projected;
use super::geometry::{COMPONENT_COLOR, rgba};
use super::state::SceneState;
use super::vec3::Vec3;

const LINK_COLOR: &str = "rgba(6, 182, 212, 0.3)";
const LINK_WIDTH: f64 = 0.5;
const PARTICLE_WIDTH: f64 = 2.0;
const SOLID_ALPHA: f64 = 0.9;
const WIREFRAME_ALPHA: f64 = 0.3;
const LABEL_FONT: &str = "Inter, system-ui, sans-serif";

pub fn render(state: &SceneState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(&state.config().background);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
}

fn project(state: &SceneState, p: Vec3) -> Option<Projected> {
	state.camera.project(p, state.width, state.height)
}

fn draw_links(state: &SceneState, ctx: &CanvasRenderingContext2d) {
	let nodes = state.simulation.nodes();
	let offsets: Vec<f64> = state.particle_offsets().collect();

	for &(s, t) in state.simulation.links() {
		let (from, to) = (nodes[s].pos, nodes[t].pos);
		let (Some(a), Some(b)) = (project(state, from), project(state, to)) else {
			continue;
		};
		ctx.set_stroke_style_str(LINK_COLOR);
		ctx.set_line_width((LINK_WIDTH * (a.scale + b.scale) / 2.0).max(0.5));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();

		ctx.set_fill_style_str(COMPONENT_COLOR);
		for &f in &offsets {
			let Some(p) = project(state, from.lerp(to, f)) else {
				continue;
			};
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, (PARTICLE_WIDTH / 2.0 * p.scale).max(1.0), 0.0, 2.0 * PI);
			ctx.fill();
		}
	}
}

fn draw_nodes(state: &SceneState, ctx: &CanvasRenderingContext2d) {
	let eye = state.camera.position();
	let nodes = state.simulation.nodes();

	// Painter's order: far nodes first
	let mut order: Vec<(usize, Projected)> = nodes
		.iter()
		.enumerate()
		.filter_map(|(i, n)| project(state, n.pos).map(|p| (i, p)))
		.collect();
	order.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

	for (idx, center) in order {
		let node = &nodes[idx];
		let info = &node.user_data;
		let mesh = &info.mesh;
		let screen: Vec<Option<Projected>> = mesh
			.vertices
			.iter()
			.map(|&v| project(state, node.pos + v))
			.collect();

		ctx.set_global_alpha(SOLID_ALPHA);
		for face in &mesh.faces {
			let local = mesh.face_center(face);
			let normal = local.normalized();
			let view = (eye - (node.pos + local)).normalized();
			let facing = normal.dot(view);
			if facing <= 0.0 {
				continue;
			}
			let Some(points) = face.iter().map(|&i| screen[i]).collect::<Option<Vec<_>>>() else {
				continue;
			};
			ctx.set_fill_style_str(&rgba(info.style.color, 0.45 + 0.55 * facing, 1.0));
			ctx.begin_path();
			ctx.move_to(points[0].x, points[0].y);
			for p in &points[1..] {
				ctx.line_to(p.x, p.y);
			}
			ctx.close_path();
			ctx.fill();
		}
		ctx.set_global_alpha(1.0);

		ctx.set_stroke_style_str(&rgba(info.style.color, 1.0, WIREFRAME_ALPHA));
		ctx.set_line_width(1.0);
		ctx.begin_path();
		for &(a, b) in &mesh.edges {
			if let (Some(pa), Some(pb)) = (screen[a], screen[b]) {
				ctx.move_to(pa.x, pa.y);
				ctx.line_to(pb.x, pb.y);
			}
		}
		ctx.stroke();

		let radius = info.style.shape.bounding_radius() * center.scale;
		if state.hover == Some(idx) {
			ctx.begin_path();
			let _ = ctx.arc(center.x, center.y, radius + 3.0, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
			ctx.set_line_width(1.5);
			ctx.stroke();
		}

		if let Some(label) = project(state, node.pos + Vec3::Y * (info.weight * 2.5)) {
			let px = info.weight * 0.8 * label.scale;
			if px >= 4.0 {
				ctx.set_fill_style_str(info.style.color);
				ctx.set_font(&format!("bold {px:.1}px {LABEL_FONT}"));
				ctx.set_text_align("center");
				let _ = ctx.fill_text(&info.name, label.x, label.y);
			}
		}
	}
}
