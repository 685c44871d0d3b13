use serde::Deserialize;

/// Tunables for the simulation, camera and link styling.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	pub link_distance: f64,
	pub link_strength: f64,
	/// Negative values repel.
	pub charge_strength: f64,
	pub velocity_decay: f64,
	pub alpha_min: f64,
	/// Simulation frames run after each (re)heat before the layout freezes.
	pub cooldown_ticks: u32,
	/// Delay before the surface is measured, so surrounding layout can settle.
	pub init_delay_ms: u32,
	pub auto_fit_delay_ms: u32,
	pub auto_fit_duration_ms: u32,
	pub fit_padding_px: f64,
	pub recenter_duration_ms: u32,
	pub particles_per_link: u32,
	/// Fraction of a link travelled per frame.
	pub particle_speed: f64,
	pub background: String,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			link_distance: 150.0,
			link_strength: 0.5,
			charge_strength: -500.0,
			velocity_decay: 0.4,
			alpha_min: 0.001,
			cooldown_ticks: 100,
			init_delay_ms: 150,
			auto_fit_delay_ms: 1000,
			auto_fit_duration_ms: 800,
			fit_padding_px: 100.0,
			recenter_duration_ms: 600,
			particles_per_link: 2,
			particle_speed: 0.005,
			background: "#01060e".into(),
		}
	}
}
