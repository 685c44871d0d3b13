//! Node category to solid shape and colour.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use super::vec3::Vec3;
use crate::graph::NodeCategory;

pub const RISK_COLOR: &str = "#ef4444";
pub const POLICY_COLOR: &str = "#3b82f6";
pub const COMPONENT_COLOR: &str = "#06b6d4";

const SPHERE_SEGMENTS: usize = 16;
const SPHERE_RINGS: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
	Octahedron { radius: f64 },
	Cube { side: f64 },
	Sphere { radius: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
	pub shape: Shape,
	pub color: &'static str,
}

pub fn node_style(category: NodeCategory, weight: f64) -> NodeStyle {
	match category {
		NodeCategory::Risk => NodeStyle {
			shape: Shape::Octahedron { radius: weight * 1.5 },
			color: RISK_COLOR,
		},
		NodeCategory::Policy => NodeStyle {
			shape: Shape::Cube { side: weight * 2.0 },
			color: POLICY_COLOR,
		},
		NodeCategory::Component => NodeStyle {
			shape: Shape::Sphere { radius: weight * 1.2 },
			color: COMPONENT_COLOR,
		},
	}
}

/// `rgba()` CSS colour for a `#rrggbb` hex, scaled by `shade`.
pub fn rgba(hex: &str, shade: f64, alpha: f64) -> String {
	let channel = |i: usize| {
		hex.get(i..i + 2)
			.and_then(|c| u8::from_str_radix(c, 16).ok())
			.map_or(255.0, f64::from)
	};
	let scale = |c: f64| (c * shade).round().clamp(0.0, 255.0) as u8;
	format!(
		"rgba({}, {}, {}, {alpha})",
		scale(channel(1)),
		scale(channel(3)),
		scale(channel(5))
	)
}

/// Convex polyhedron centred on the origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
	pub vertices: Vec<Vec3>,
	/// Vertex indices per face, in winding order.
	pub faces: Vec<Vec<usize>>,
	/// Unique edges, used for the wireframe overlay.
	pub edges: Vec<(usize, usize)>,
}

impl Mesh {
	fn from_faces(vertices: Vec<Vec3>, faces: Vec<Vec<usize>>) -> Self {
		let mut edges = BTreeSet::new();
		for face in &faces {
			for (i, &a) in face.iter().enumerate() {
				let b = face[(i + 1) % face.len()];
				if a != b {
					edges.insert((a.min(b), a.max(b)));
				}
			}
		}
		Self {
			vertices,
			faces,
			edges: edges.into_iter().collect(),
		}
	}

	pub fn face_center(&self, face: &[usize]) -> Vec3 {
		let sum = face.iter().fold(Vec3::ZERO, |acc, &i| acc + self.vertices[i]);
		sum * (1.0 / face.len() as f64)
	}
}

impl Shape {
	/// Radius of the sphere enclosing the shape.
	pub fn bounding_radius(&self) -> f64 {
		match *self {
			Self::Octahedron { radius } | Self::Sphere { radius } => radius,
			Self::Cube { side } => side * 3f64.sqrt() / 2.0,
		}
	}

	pub fn mesh(&self) -> Mesh {
		match *self {
			Self::Octahedron { radius: r } => Mesh::from_faces(
				vec![
					Vec3::new(r, 0.0, 0.0),
					Vec3::new(-r, 0.0, 0.0),
					Vec3::new(0.0, r, 0.0),
					Vec3::new(0.0, -r, 0.0),
					Vec3::new(0.0, 0.0, r),
					Vec3::new(0.0, 0.0, -r),
				],
				vec![
					vec![0, 2, 4],
					vec![0, 4, 3],
					vec![0, 3, 5],
					vec![0, 5, 2],
					vec![1, 2, 5],
					vec![1, 5, 3],
					vec![1, 3, 4],
					vec![1, 4, 2],
				],
			),
			Self::Cube { side } => {
				let h = side / 2.0;
				let vertices = (0..8)
					.map(|i| {
						let sign = |bit: usize| if i & bit == 0 { -h } else { h };
						Vec3::new(sign(1), sign(2), sign(4))
					})
					.collect();
				Mesh::from_faces(
					vertices,
					vec![
						vec![0, 2, 3, 1],
						vec![4, 5, 7, 6],
						vec![0, 1, 5, 4],
						vec![2, 6, 7, 3],
						vec![0, 4, 6, 2],
						vec![1, 3, 7, 5],
					],
				)
			}
			Self::Sphere { radius } => {
				let mut vertices = Vec::with_capacity((SPHERE_RINGS + 1) * SPHERE_SEGMENTS);
				for ring in 0..=SPHERE_RINGS {
					let phi = PI * ring as f64 / SPHERE_RINGS as f64;
					for seg in 0..SPHERE_SEGMENTS {
						let theta = 2.0 * PI * seg as f64 / SPHERE_SEGMENTS as f64;
						vertices.push(Vec3::new(
							radius * phi.sin() * theta.cos(),
							radius * phi.cos(),
							radius * phi.sin() * theta.sin(),
						));
					}
				}
				let at = |ring: usize, seg: usize| ring * SPHERE_SEGMENTS + seg % SPHERE_SEGMENTS;
				let mut faces = Vec::with_capacity(SPHERE_RINGS * SPHERE_SEGMENTS);
				for ring in 0..SPHERE_RINGS {
					for seg in 0..SPHERE_SEGMENTS {
						faces.push(vec![
							at(ring, seg),
							at(ring, seg + 1),
							at(ring + 1, seg + 1),
							at(ring + 1, seg),
						]);
					}
				}
				Mesh::from_faces(vertices, faces)
			}
		}
	}
}
