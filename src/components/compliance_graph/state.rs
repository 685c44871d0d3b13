use std::collections::HashMap;

use super::camera::Camera;
use super::config::GraphConfig;
use super::geometry::{Mesh, NodeStyle, node_style};
use super::simulation::{
	DRAG_ALPHA_TARGET, SimNode, Simulation, SimulationParameters, seed_position,
};
use super::vec3::Vec3;
use crate::graph::{GraphData, NodeCategory};

const FRAME_MS: f64 = 1000.0 / 60.0;
const MIN_ZOOM_STEP: f64 = 0.9;
const MAX_ZOOM_STEP: f64 = 1.1;

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: String,
	pub name: String,
	pub category: NodeCategory,
	pub weight: f64,
	pub description: Option<String>,
	pub style: NodeStyle,
	pub mesh: Mesh,
}

/// What the pointer reports about the node under it.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverInfo {
	pub name: String,
	pub description: Option<String>,
	pub category: NodeCategory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
	Primary,
	Secondary,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
	Rotate,
	Pan,
	DragNode { idx: usize, depth: f64 },
}

#[derive(Clone, Debug, Default)]
pub struct PointerState {
	gesture: Option<Gesture>,
	last_x: f64,
	last_y: f64,
}

pub struct SceneState {
	pub simulation: Simulation<NodeInfo>,
	pub camera: Camera,
	pub pointer: PointerState,
	pub hover: Option<usize>,
	pub width: f64,
	pub height: f64,
	/// Frames elapsed, drives the link particles.
	pub flow_frames: f64,
	index: HashMap<String, usize>,
	config: GraphConfig,
	auto_fit_in_ms: Option<f64>,
}

impl SceneState {
	pub fn new(data: &GraphData, width: f64, height: f64, config: GraphConfig) -> Self {
		let mut state = Self {
			simulation: Simulation::new(SimulationParameters::from(&config)),
			camera: Camera::default(),
			pointer: PointerState::default(),
			hover: None,
			width,
			height,
			flow_frames: 0.0,
			index: HashMap::new(),
			config,
			auto_fit_in_ms: None,
		};
		state.set_data(data);
		state
	}

	/// Swaps in new graph data in place. Nodes whose id survives keep their
	/// position, velocity and pin.
	pub fn set_data(&mut self, data: &GraphData) {
		let previous = std::mem::take(&mut self.index);
		let old_nodes: Vec<_> = self
			.simulation
			.nodes()
			.iter()
			.map(|n| (n.pos, n.vel, n.fixed))
			.collect();

		let mut nodes = Vec::with_capacity(data.nodes.len());
		for (i, node) in data.nodes.iter().enumerate() {
			let style = node_style(node.category, node.weight);
			let (pos, vel, fixed) = previous
				.get(&node.id)
				.map(|&old| old_nodes[old])
				.unwrap_or((seed_position(i), Vec3::ZERO, None));
			nodes.push(SimNode {
				pos,
				vel,
				fixed,
				user_data: NodeInfo {
					id: node.id.clone(),
					name: node.name.clone(),
					category: node.category,
					weight: node.weight,
					description: node.description.clone(),
					style,
					mesh: style.shape.mesh(),
				},
			});
			self.index.entry(node.id.clone()).or_insert(i);
		}

		let links = data
			.links
			.iter()
			.filter_map(|link| {
				Some((*self.index.get(&link.source)?, *self.index.get(&link.target)?))
			})
			.collect();

		self.simulation.set_topology(nodes, links);
		self.simulation.reheat();
		self.hover = None;
		self.pointer = PointerState::default();
		self.auto_fit_in_ms = Some(self.config.auto_fit_delay_ms as f64);
	}

	pub fn node_count(&self) -> usize {
		self.simulation.nodes().len()
	}

	pub fn node_position(&self, id: &str) -> Option<Vec3> {
		self.index.get(id).map(|&i| self.simulation.nodes()[i].pos)
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Viewport change only; the layout is untouched.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn tick(&mut self, dt_ms: f64) {
		self.simulation.step();
		self.camera.advance(dt_ms);
		self.flow_frames += dt_ms / FRAME_MS;

		if let Some(left) = self.auto_fit_in_ms.as_mut() {
			*left -= dt_ms;
			if *left <= 0.0 {
				self.auto_fit_in_ms = None;
				self.zoom_to_fit(
					self.config.auto_fit_duration_ms as f64,
					self.config.fit_padding_px,
				);
			}
		}
	}

	pub fn zoom_to_fit(&mut self, duration_ms: f64, padding: f64) {
		let Some((lo, hi)) = self.simulation.bounds() else {
			return;
		};
		// Grow by the largest node so shapes are not clipped at the edges
		let margin = self
			.simulation
			.nodes()
			.iter()
			.map(|n| n.user_data.style.shape.bounding_radius())
			.fold(0.0, f64::max);
		let pad = Vec3::new(margin, margin, margin);
		self.camera
			.zoom_to_fit((lo - pad, hi + pad), self.width, self.height, duration_ms, padding);
	}

	/// Positions of the link's particles as fractions from source to target.
	pub fn particle_offsets(&self) -> impl Iterator<Item = f64> + '_ {
		let n = self.config.particles_per_link.max(1) as f64;
		let base = (self.flow_frames * self.config.particle_speed).fract();
		(0..self.config.particles_per_link).map(move |k| (base + k as f64 / n).fract())
	}

	/// Nearest node whose silhouette covers the screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let mut found: Option<(usize, f64)> = None;
		for (i, node) in self.simulation.nodes().iter().enumerate() {
			let Some(p) = self.camera.project(node.pos, self.width, self.height) else {
				continue;
			};
			let r = node.user_data.style.shape.bounding_radius() * p.scale;
			let (dx, dy) = (p.x - sx, p.y - sy);
			if dx * dx + dy * dy <= r * r && found.is_none_or(|(_, d)| p.depth < d) {
				found = Some((i, p.depth));
			}
		}
		found.map(|(i, _)| i)
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.hover = node;
	}

	pub fn hover_info(&self) -> Option<HoverInfo> {
		let node = &self.simulation.nodes().get(self.hover?)?.user_data;
		Some(HoverInfo {
			name: node.name.clone(),
			description: node.description.clone(),
			category: node.category,
		})
	}

	pub fn pointer_down(&mut self, x: f64, y: f64, button: PointerButton) {
		let gesture = match (button, self.node_at_position(x, y)) {
			(PointerButton::Primary, Some(idx)) => {
				let node = &self.simulation.nodes()[idx];
				let depth = self
					.camera
					.project(node.pos, self.width, self.height)
					.map_or(self.camera.distance, |p| p.depth);
				Gesture::DragNode { idx, depth }
			}
			(PointerButton::Primary, None) => Gesture::Rotate,
			(PointerButton::Secondary, _) => Gesture::Pan,
		};
		self.pointer = PointerState {
			gesture: Some(gesture),
			last_x: x,
			last_y: y,
		};
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let (dx, dy) = (x - self.pointer.last_x, y - self.pointer.last_y);
		self.pointer.last_x = x;
		self.pointer.last_y = y;
		match self.pointer.gesture {
			None => {
				let hovered = self.node_at_position(x, y);
				self.set_hover(hovered);
			}
			Some(Gesture::Rotate) => self.camera.rotate(dx, dy),
			Some(Gesture::Pan) => self.camera.pan(dx, dy, self.height),
			Some(Gesture::DragNode { idx, depth }) => {
				let delta = self.camera.unproject_delta(dx, dy, depth, self.height);
				if let Some(pos) = self.simulation.nodes().get(idx).map(|n| n.pos) {
					// Pinning starts with the first movement; a plain click leaves the node free
					self.simulation.pin(idx, pos + delta);
					self.simulation.set_alpha_target(DRAG_ALPHA_TARGET);
				}
			}
		}
	}

	/// Ends the gesture. A dragged node stays pinned where it was dropped.
	pub fn pointer_up(&mut self) {
		if let Some(Gesture::DragNode { .. }) = self.pointer.gesture {
			self.simulation.set_alpha_target(0.0);
		}
		self.pointer.gesture = None;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.set_hover(None);
	}

	pub fn wheel(&mut self, delta_y: f64) {
		let factor = if delta_y > 0.0 { MAX_ZOOM_STEP } else { MIN_ZOOM_STEP };
		self.camera.zoom(factor);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::build_graph;
	use crate::report::{DataMap, PolicyAlignment, PolicyStatus, Report};

	fn report() -> Report {
		Report {
			data_map: DataMap {
				data_categories_detected: vec!["PII".into(), "Financial".into()],
				..Default::default()
			},
			policy_matrix: vec![PolicyAlignment {
				policy_area: "Data Privacy".into(),
				status: PolicyStatus::AtRisk,
				reason: "unencrypted exports".into(),
			}],
			..Default::default()
		}
	}

	fn scene() -> SceneState {
		SceneState::new(&build_graph(&report()), 800.0, 600.0, GraphConfig::default())
	}

	fn run(state: &mut SceneState, frames: usize) {
		for _ in 0..frames {
			state.tick(FRAME_MS);
		}
	}

	#[test]
	fn resize_keeps_layout() {
		let mut s = scene();
		run(&mut s, 30);
		let layout = |s: &SceneState| -> Vec<(String, Vec3)> {
			s.simulation
				.nodes()
				.iter()
				.map(|n| (n.user_data.id.clone(), n.pos))
				.collect()
		};
		let before = layout(&s);
		s.resize(1024.0, 300.0);
		let after = layout(&s);
		assert_eq!(before, after);
		assert_eq!((s.width, s.height), (1024.0, 300.0));
		assert_eq!(s.simulation.links().len(), 3);
	}

	#[test]
	fn update_preserves_surviving_positions() {
		let mut s = scene();
		run(&mut s, 40);
		let pii = s.node_position("PII").unwrap();

		let mut next = report();
		next.data_map.data_categories_detected.push("Health".into());
		s.set_data(&build_graph(&next));

		assert_eq!(s.node_position("PII"), Some(pii));
		assert!(s.node_position("Health").is_some());
		assert_eq!(s.node_count(), 5);
		assert!(s.simulation.is_running());
	}

	#[test]
	fn removed_nodes_disappear() {
		let mut s = scene();
		let mut next = report();
		next.data_map.data_categories_detected.clear();
		s.set_data(&build_graph(&next));
		assert!(s.node_position("PII").is_none());
		assert_eq!(s.node_count(), 2);
		assert_eq!(s.simulation.links().len(), 1);
	}

	#[test]
	fn auto_fit_runs_once_after_delay() {
		let mut s = scene();
		run(&mut s, 30);
		assert!(!s.camera.is_animating());
		run(&mut s, 40);
		assert!(s.camera.is_animating());
		assert!(s.auto_fit_in_ms.is_none());
	}

	/// The node closest to the camera, with its projection.
	fn frontmost(s: &SceneState) -> (String, Vec3, f64, f64) {
		s.simulation
			.nodes()
			.iter()
			.filter_map(|n| {
				let p = s.camera.project(n.pos, s.width, s.height)?;
				Some((n.user_data.id.clone(), n.pos, p.x, p.y, p.depth))
			})
			.min_by(|a, b| a.4.total_cmp(&b.4))
			.map(|(id, pos, x, y, _)| (id, pos, x, y))
			.unwrap()
	}

	#[test]
	fn hit_test_finds_projected_node() {
		let mut s = scene();
		s.zoom_to_fit(0.0, 50.0);
		let (id, _, x, y) = frontmost(&s);
		let idx = s.node_at_position(x, y).unwrap();
		assert_eq!(s.simulation.nodes()[idx].user_data.id, id);
		assert!(s.node_at_position(-500.0, -500.0).is_none());
	}

	#[test]
	fn dragged_node_is_pinned_on_release() {
		let mut s = scene();
		s.zoom_to_fit(0.0, 50.0);
		let (id, start, x, y) = frontmost(&s);

		s.pointer_down(x, y, PointerButton::Primary);
		s.pointer_move(x + 40.0, y);
		s.pointer_up();
		run(&mut s, 10);

		let moved = s.node_position(&id).unwrap();
		assert!(moved.x > start.x);
		let idx = s.index[&id];
		assert_eq!(s.simulation.nodes()[idx].fixed, Some(moved));
	}

	#[test]
	fn clicking_a_node_does_not_pin_it() {
		let mut s = scene();
		s.zoom_to_fit(0.0, 50.0);
		let (id, _, x, y) = frontmost(&s);
		let idx = s.index[&id];

		s.pointer_down(x, y, PointerButton::Primary);
		s.pointer_up();
		run(&mut s, 5);

		assert_eq!(s.simulation.nodes()[idx].fixed, None);
	}

	#[test]
	fn background_drag_rotates_and_right_drag_pans() {
		let mut s = scene();
		s.pointer_down(-100.0, -100.0, PointerButton::Primary);
		s.pointer_move(-50.0, -100.0);
		s.pointer_up();
		assert!(s.camera.yaw != 0.0);

		let target = s.camera.target;
		s.pointer_down(10.0, 10.0, PointerButton::Secondary);
		s.pointer_move(30.0, 10.0);
		s.pointer_up();
		assert!(s.camera.target != target);
	}

	#[test]
	fn hover_reports_node_details() {
		let mut s = scene();
		let idx = s.index["Data Privacy"];
		s.set_hover(Some(idx));
		let info = s.hover_info().unwrap();
		assert_eq!(info.name, "Data Privacy");
		assert_eq!(info.category, NodeCategory::Policy);
		assert_eq!(info.description.as_deref(), Some("unencrypted exports"));
		s.pointer_leave();
		assert!(s.hover_info().is_none());
	}

	#[test]
	fn particles_are_evenly_spaced() {
		let mut s = scene();
		s.flow_frames = 30.0;
		let offsets: Vec<_> = s.particle_offsets().collect();
		assert_eq!(offsets.len(), 2);
		assert!(((offsets[1] - offsets[0]).rem_euclid(1.0) - 0.5).abs() < 1e-9);
	}
}
