use std::f64::consts::FRAC_PI_2;

use super::vec3::Vec3;

const FOV_DEG: f64 = 50.0;
const NEAR: f64 = 1.0;
const MIN_DISTANCE: f64 = 20.0;
const MAX_DISTANCE: f64 = 20_000.0;
const ROTATE_SPEED: f64 = 0.005;
const PITCH_LIMIT: f64 = FRAC_PI_2 - 0.01;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// A point mapped to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
	pub x: f64,
	pub y: f64,
	/// Distance along the view axis; larger is further away.
	pub depth: f64,
	/// Screen pixels per world unit at this depth.
	pub scale: f64,
}

#[derive(Clone, Debug)]
struct Tween {
	from: (Vec3, f64),
	to: (Vec3, f64),
	elapsed_ms: f64,
	duration_ms: f64,
}

/// Orbit camera looking at `target` from `distance` away.
#[derive(Clone, Debug)]
pub struct Camera {
	pub target: Vec3,
	pub distance: f64,
	pub yaw: f64,
	pub pitch: f64,
	tween: Option<Tween>,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			target: Vec3::ZERO,
			distance: 1000.0,
			yaw: 0.0,
			pitch: 0.0,
			tween: None,
		}
	}
}

impl Camera {
	pub fn position(&self) -> Vec3 {
		let dir = Vec3::new(
			self.pitch.cos() * self.yaw.sin(),
			self.pitch.sin(),
			self.pitch.cos() * self.yaw.cos(),
		);
		self.target + dir * self.distance
	}

	/// Forward, right and up unit vectors.
	fn basis(&self) -> (Vec3, Vec3, Vec3) {
		let forward = (self.target - self.position()).normalized();
		let right = forward.cross(Vec3::Y).normalized();
		let up = right.cross(forward);
		(forward, right, up)
	}

	fn focal(height: f64) -> f64 {
		(height / 2.0) / (FOV_DEG.to_radians() / 2.0).tan()
	}

	pub fn project(&self, p: Vec3, width: f64, height: f64) -> Option<Projected> {
		let (forward, right, up) = self.basis();
		let rel = p - self.position();
		let depth = rel.dot(forward);
		if depth <= NEAR {
			return None;
		}
		let scale = Self::focal(height) / depth;
		Some(Projected {
			x: width / 2.0 + rel.dot(right) * scale,
			y: height / 2.0 - rel.dot(up) * scale,
			depth,
			scale,
		})
	}

	/// World-space displacement for a screen drag at the given depth.
	pub fn unproject_delta(&self, dx: f64, dy: f64, depth: f64, height: f64) -> Vec3 {
		let (_, right, up) = self.basis();
		let per_px = depth / Self::focal(height);
		right * (dx * per_px) - up * (dy * per_px)
	}

	pub fn rotate(&mut self, dx: f64, dy: f64) {
		self.tween = None;
		self.yaw -= dx * ROTATE_SPEED;
		self.pitch = (self.pitch + dy * ROTATE_SPEED).clamp(-PITCH_LIMIT, PITCH_LIMIT);
	}

	pub fn pan(&mut self, dx: f64, dy: f64, height: f64) {
		self.tween = None;
		let delta = self.unproject_delta(dx, dy, self.distance, height);
		self.target -= delta;
	}

	pub fn zoom(&mut self, factor: f64) {
		self.tween = None;
		self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
	}

	/// Frames the given bounds, leaving `padding` pixels on every side.
	/// A zero duration jumps straight there.
	pub fn zoom_to_fit(
		&mut self,
		bounds: (Vec3, Vec3),
		width: f64,
		height: f64,
		duration_ms: f64,
		padding: f64,
	) {
		let (lo, hi) = bounds;
		let center = lo.lerp(hi, 0.5);
		let radius = ((hi - lo).length() / 2.0).max(1.0);
		let focal = Self::focal(height);
		let avail = (width.min(height) / 2.0 - padding).max(1.0);
		let distance = (radius * focal / avail + radius).clamp(MIN_DISTANCE, MAX_DISTANCE);

		if duration_ms <= 0.0 {
			self.tween = None;
			self.target = center;
			self.distance = distance;
		} else {
			self.tween = Some(Tween {
				from: (self.target, self.distance),
				to: (center, distance),
				elapsed_ms: 0.0,
				duration_ms,
			});
		}
	}

	pub fn is_animating(&self) -> bool {
		self.tween.is_some()
	}

	pub fn advance(&mut self, dt_ms: f64) {
		let Some(tween) = self.tween.as_mut() else {
			return;
		};
		tween.elapsed_ms += dt_ms;
		let t = ease_out_cubic((tween.elapsed_ms / tween.duration_ms).min(1.0));
		self.target = tween.from.0.lerp(tween.to.0, t);
		self.distance = tween.from.1 + (tween.to.1 - tween.from.1) * t;
		if tween.elapsed_ms >= tween.duration_ms {
			self.tween = None;
		}
	}
}
