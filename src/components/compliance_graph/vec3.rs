use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Vec3 {
	pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
	pub const Y: Self = Self::new(0.0, 1.0, 0.0);

	pub const fn new(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z }
	}

	pub fn dot(self, o: Self) -> f64 {
		self.x * o.x + self.y * o.y + self.z * o.z
	}

	pub fn cross(self, o: Self) -> Self {
		Self::new(
			self.y * o.z - self.z * o.y,
			self.z * o.x - self.x * o.z,
			self.x * o.y - self.y * o.x,
		)
	}

	pub fn length_sq(self) -> f64 {
		self.dot(self)
	}

	pub fn length(self) -> f64 {
		self.length_sq().sqrt()
	}

	pub fn normalized(self) -> Self {
		let len = self.length();
		if len < f64::EPSILON { Self::ZERO } else { self * (1.0 / len) }
	}

	pub fn lerp(self, o: Self, t: f64) -> Self {
		self + (o - self) * t
	}

	pub fn min(self, o: Self) -> Self {
		Self::new(self.x.min(o.x), self.y.min(o.y), self.z.min(o.z))
	}

	pub fn max(self, o: Self) -> Self {
		Self::new(self.x.max(o.x), self.y.max(o.y), self.z.max(o.z))
	}
}

impl Add for Vec3 {
	type Output = Self;
	fn add(self, o: Self) -> Self {
		Self::new(self.x + o.x, self.y + o.y, self.z + o.z)
	}
}

impl Sub for Vec3 {
	type Output = Self;
	fn sub(self, o: Self) -> Self {
		Self::new(self.x - o.x, self.y - o.y, self.z - o.z)
	}
}

impl Mul<f64> for Vec3 {
	type Output = Self;
	fn mul(self, k: f64) -> Self {
		Self::new(self.x * k, self.y * k, self.z * k)
	}
}

impl AddAssign for Vec3 {
	fn add_assign(&mut self, o: Self) {
		*self = *self + o;
	}
}

impl SubAssign for Vec3 {
	fn sub_assign(&mut self, o: Self) {
		*self = *self - o;
	}
}
