//! Three-dimensional force-directed layout.
//!
//! Follows the d3-force model: forces write into velocities scaled by a
//! cooling `alpha`, then velocities decay and are integrated once per tick.

use std::f64::consts::PI;

use super::config::GraphConfig;
use super::vec3::Vec3;

const INITIAL_RADIUS: f64 = 10.0;
const DISTANCE_MIN_SQ: f64 = 1.0;
/// Alpha held while a node is being dragged so neighbours follow it.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationParameters {
	pub link_distance: f64,
	pub link_strength: f64,
	pub charge_strength: f64,
	pub velocity_decay: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub cooldown_ticks: u32,
}

impl From<&GraphConfig> for SimulationParameters {
	fn from(cfg: &GraphConfig) -> Self {
		Self {
			link_distance: cfg.link_distance,
			link_strength: cfg.link_strength,
			charge_strength: cfg.charge_strength,
			velocity_decay: cfg.velocity_decay,
			alpha_min: cfg.alpha_min,
			alpha_decay: 1.0 - cfg.alpha_min.powf(1.0 / 300.0),
			cooldown_ticks: cfg.cooldown_ticks,
		}
	}
}

#[derive(Clone, Debug)]
pub struct SimNode<T> {
	pub pos: Vec3,
	pub vel: Vec3,
	/// Pinned position; the node ignores forces while set.
	pub fixed: Option<Vec3>,
	pub user_data: T,
}

pub struct Simulation<T> {
	params: SimulationParameters,
	nodes: Vec<SimNode<T>>,
	links: Vec<(usize, usize)>,
	degree: Vec<usize>,
	alpha: f64,
	alpha_target: f64,
	ticks: u32,
}

/// Deterministic spherical phyllotaxis seed position for the `i`th node.
pub fn seed_position(i: usize) -> Vec3 {
	let roll_step = PI * (3.0 - 5f64.sqrt());
	let yaw_step = PI * 20.0 / (9.0 + 221f64.sqrt());
	let i = i as f64;
	let radius = INITIAL_RADIUS * (0.5 + i).cbrt();
	let (roll, yaw) = (i * roll_step, i * yaw_step);
	Vec3::new(
		radius * roll.sin() * yaw.cos(),
		radius * roll.cos(),
		radius * roll.sin() * yaw.sin(),
	)
}

/// Tiny deterministic offset so coincident nodes can still separate.
fn jiggle(i: usize) -> f64 {
	((i % 7) as f64 - 3.0 + 0.5) * 1e-6
}

impl<T> Simulation<T> {
	pub fn new(params: SimulationParameters) -> Self {
		Self {
			params,
			nodes: Vec::new(),
			links: Vec::new(),
			degree: Vec::new(),
			alpha: 1.0,
			alpha_target: 0.0,
			ticks: 0,
		}
	}

	pub fn nodes(&self) -> &[SimNode<T>] {
		&self.nodes
	}

	pub fn links(&self) -> &[(usize, usize)] {
		&self.links
	}

	/// Replaces the node and link sets. Indices in `links` refer to `nodes`.
	pub fn set_topology(&mut self, nodes: Vec<SimNode<T>>, links: Vec<(usize, usize)>) {
		let mut degree = vec![0; nodes.len()];
		let links: Vec<_> = links
			.into_iter()
			.filter(|&(s, t)| s < nodes.len() && t < nodes.len())
			.collect();
		for &(s, t) in &links {
			degree[s] += 1;
			degree[t] += 1;
		}
		self.nodes = nodes;
		self.links = links;
		self.degree = degree;
	}

	/// Restarts cooling from full heat.
	pub fn reheat(&mut self) {
		self.alpha = 1.0;
		self.ticks = 0;
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
		if target > 0.0 {
			self.ticks = 0;
			self.alpha = self.alpha.max(target);
		}
	}

	pub fn is_running(&self) -> bool {
		if self.alpha_target > 0.0 {
			return true;
		}
		self.alpha >= self.params.alpha_min && self.ticks < self.params.cooldown_ticks
	}

	pub fn pin(&mut self, idx: usize, pos: Vec3) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.pos = pos;
			node.vel = Vec3::ZERO;
			node.fixed = Some(pos);
		}
	}

	/// Axis-aligned bounds of every node, or `None` for an empty layout.
	pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
		let mut iter = self.nodes.iter().map(|n| n.pos);
		let first = iter.next()?;
		Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
	}

	/// Advances one frame if the layout is still cooling.
	pub fn step(&mut self) -> bool {
		if !self.is_running() {
			return false;
		}
		self.tick();
		true
	}

	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		self.apply_links();
		self.apply_charge();
		self.integrate();
		self.apply_center();
		self.ticks = self.ticks.saturating_add(1);
	}

	fn apply_links(&mut self) {
		let (distance, strength, alpha) =
			(self.params.link_distance, self.params.link_strength, self.alpha);
		for (i, &(s, t)) in self.links.iter().enumerate() {
			if s == t {
				continue;
			}
			let (src, tgt) = (&self.nodes[s], &self.nodes[t]);
			let mut delta = (tgt.pos + tgt.vel) - (src.pos + src.vel);
			if delta.length_sq() == 0.0 {
				delta = Vec3::new(jiggle(i), jiggle(i + 1), jiggle(i + 2));
			}
			let len = delta.length();
			let delta = delta * ((len - distance) / len * alpha * strength);
			let bias = self.degree[s] as f64 / (self.degree[s] + self.degree[t]) as f64;
			self.nodes[t].vel -= delta * bias;
			self.nodes[s].vel += delta * (1.0 - bias);
		}
	}

	fn apply_charge(&mut self) {
		let k = self.params.charge_strength * self.alpha;
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let mut d = self.nodes[j].pos - self.nodes[i].pos;
				if d.length_sq() == 0.0 {
					d = Vec3::new(jiggle(i), jiggle(j), jiggle(i + j));
				}
				let mut l = d.length_sq();
				if l < DISTANCE_MIN_SQ {
					l = (DISTANCE_MIN_SQ * l).sqrt();
				}
				let push = d * (k / l);
				self.nodes[i].vel += push;
				self.nodes[j].vel -= push;
			}
		}
	}

	fn integrate(&mut self) {
		let keep = 1.0 - self.params.velocity_decay;
		for node in &mut self.nodes {
			match node.fixed {
				Some(p) => {
					node.pos = p;
					node.vel = Vec3::ZERO;
				}
				None => {
					node.vel = node.vel * keep;
					node.pos += node.vel;
				}
			}
		}
	}

	fn apply_center(&mut self) {
		let free: Vec<_> = self.nodes.iter().filter(|n| n.fixed.is_none()).collect();
		if free.is_empty() || free.len() < self.nodes.len() {
			// Pinned nodes anchor the layout
			return;
		}
		let mean = free.iter().fold(Vec3::ZERO, |acc, n| acc + n.pos) * (1.0 / free.len() as f64);
		for node in &mut self.nodes {
			node.pos -= mean;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sim(n: usize, links: Vec<(usize, usize)>) -> Simulation<usize> {
		let mut sim = Simulation::new(SimulationParameters::from(&GraphConfig::default()));
		let nodes = (0..n)
			.map(|i| SimNode {
				pos: seed_position(i),
				vel: Vec3::ZERO,
				fixed: None,
				user_data: i,
			})
			.collect();
		sim.set_topology(nodes, links);
		sim
	}

	#[test]
	fn seeds_are_distinct() {
		let seeds: Vec<_> = (0..50).map(seed_position).collect();
		for (i, a) in seeds.iter().enumerate() {
			for b in &seeds[i + 1..] {
				assert!((*a - *b).length() > 1e-3);
			}
		}
	}

	#[test]
	fn charge_pushes_unlinked_nodes_apart() {
		let mut s = sim(2, vec![]);
		let before = (s.nodes()[0].pos - s.nodes()[1].pos).length();
		for _ in 0..20 {
			s.tick();
		}
		let after = (s.nodes()[0].pos - s.nodes()[1].pos).length();
		assert!(after > before);
	}

	#[test]
	fn links_pull_towards_link_distance() {
		let mut s = sim(2, vec![(0, 1)]);
		s.pin(0, Vec3::ZERO);
		s.nodes[1].pos = Vec3::new(600.0, 0.0, 0.0);
		for _ in 0..200 {
			s.tick();
		}
		let len = s.nodes()[1].pos.length();
		assert!(len < 600.0, "link should contract, got {len}");
	}

	#[test]
	fn cooldown_stops_stepping() {
		let mut s = sim(3, vec![(0, 1), (1, 2)]);
		let mut steps = 0;
		while s.step() {
			steps += 1;
			assert!(steps <= 1000);
		}
		assert_eq!(steps, GraphConfig::default().cooldown_ticks);
		s.reheat();
		assert!(s.is_running());
	}

	#[test]
	fn drag_target_keeps_simulation_alive() {
		let mut s = sim(2, vec![(0, 1)]);
		for _ in 0..200 {
			s.step();
		}
		assert!(!s.is_running());
		s.set_alpha_target(DRAG_ALPHA_TARGET);
		assert!(s.step());
		s.set_alpha_target(0.0);
	}

	#[test]
	fn pinned_nodes_stay_put() {
		let mut s = sim(4, vec![(0, 1), (1, 2), (2, 3)]);
		let spot = Vec3::new(40.0, -10.0, 5.0);
		s.pin(2, spot);
		for _ in 0..30 {
			s.tick();
		}
		assert_eq!(s.nodes()[2].pos, spot);
	}

	#[test]
	fn bounds_cover_all_nodes() {
		assert!(sim(0, vec![]).bounds().is_none());
		let s = sim(10, vec![]);
		let (lo, hi) = s.bounds().unwrap();
		for n in s.nodes() {
			assert!(n.pos.x >= lo.x && n.pos.x <= hi.x);
			assert!(n.pos.z >= lo.z && n.pos.z <= hi.z);
		}
	}

	#[test]
	fn out_of_range_links_are_dropped() {
		let s = sim(2, vec![(0, 1), (0, 5)]);
		assert_eq!(s.links(), &[(0, 1)]);
	}
}
