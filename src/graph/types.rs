use std::fmt;

/// Node family. Drives the geometry and colour a node is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
	Component,
	Policy,
	Risk,
}

impl NodeCategory {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Component => "component",
			Self::Policy => "policy",
			Self::Risk => "risk",
		}
	}
}

impl fmt::Display for NodeCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
	Contains,
	Governs,
	Violates,
}

impl Relation {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Contains => "contains",
			Self::Governs => "governs",
			Self::Violates => "violates",
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub name: String,
	pub category: NodeCategory,
	/// Visual size.
	pub weight: f64,
	pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
	pub relation: Relation,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

impl GraphData {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}
}
