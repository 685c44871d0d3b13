//! Typed shape of the compliance-assessment report consumed by the graph view.
//!
//! The report is produced elsewhere; this module only reads it. A field that
//! is absent, `null` or of the wrong type falls back to its empty value, so a
//! partial or sloppy report still yields a graph. Scalars in text fields are
//! rendered as text.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Raised when the report payload is not JSON at all.
#[derive(Debug, Error)]
pub enum ReportError {
	#[error("report is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

fn scalar_text(value: Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s),
		Value::Number(n) => Some(n.to_string()),
		Value::Bool(b) => Some(b.to_string()),
		_ => None,
	}
}

/// Any value that does not fit `T` becomes `T::default()`.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned + Default,
{
	let value = Value::deserialize(deserializer)?;
	Ok(T::deserialize(value).unwrap_or_default())
}

/// Strings pass through, numbers and booleans are printed, anything else is empty.
fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Keeps the scalar entries of an array. Anything but an array is empty.
fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
		_ => Vec::new(),
	})
}

/// Keeps the entries of an array that decode as `T`. Anything but an array
/// is empty.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
	D: Deserializer<'de>,
	T: DeserializeOwned,
{
	Ok(match Value::deserialize(deserializer)? {
		Value::Array(items) => items
			.into_iter()
			.filter_map(|item| T::deserialize(item).ok())
			.collect(),
		_ => Vec::new(),
	})
}

/// A complete compliance report.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Report {
	#[serde(deserialize_with = "text")]
	pub report_id: String,
	#[serde(deserialize_with = "text")]
	pub timestamp: String,
	#[serde(deserialize_with = "lenient")]
	pub workflow_name: Option<String>,
	#[serde(deserialize_with = "lenient")]
	pub system_spec: SystemSpec,
	#[serde(deserialize_with = "lenient")]
	pub data_map: DataMap,
	#[serde(deserialize_with = "lenient_list")]
	pub policy_matrix: Vec<PolicyAlignment>,
	#[serde(deserialize_with = "lenient_list")]
	pub evidence: Vec<EvidenceTrace>,
}

impl Report {
	/// Parses a report from its JSON form. Valid JSON that is not an object
	/// yields an empty report.
	pub fn from_json(raw: &str) -> Result<Self, ReportError> {
		let value: Value = serde_json::from_str(raw)?;
		Ok(Self::deserialize(value).unwrap_or_default())
	}
}

/// The assessed AI system.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemSpec {
	#[serde(deserialize_with = "text")]
	pub agent_name: String,
	#[serde(deserialize_with = "text")]
	pub summary: String,
	#[serde(deserialize_with = "text")]
	pub primary_purpose: String,
	#[serde(deserialize_with = "text")]
	pub decision_authority: String,
	#[serde(deserialize_with = "text")]
	pub automation_level: String,
	#[serde(deserialize_with = "text")]
	pub deployment_stage: String,
	#[serde(deserialize_with = "text_list")]
	pub geographic_exposure: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataMap {
	#[serde(deserialize_with = "text_list")]
	pub data_categories_detected: Vec<String>,
	#[serde(deserialize_with = "text")]
	pub data_flow_source: String,
	#[serde(deserialize_with = "text")]
	pub data_storage_retention: String,
	#[serde(deserialize_with = "text")]
	pub cross_border_transfer: String,
}

/// Compliance status of one policy area.
///
/// Statuses outside the known set are kept verbatim in `Other`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PolicyStatus {
	Compliant,
	PartialCompliance,
	AtRisk,
	NonCompliant,
	#[default]
	CannotBeAssessed,
	NotApplicable,
	Other(String),
}

impl PolicyStatus {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Compliant => "Compliant",
			Self::PartialCompliance => "Partial Compliance",
			Self::AtRisk => "At Risk",
			Self::NonCompliant => "Non-Compliant",
			Self::CannotBeAssessed => "Cannot Be Assessed",
			Self::NotApplicable => "Not Applicable",
			Self::Other(s) => s,
		}
	}

	pub fn is_compliant(&self) -> bool {
		matches!(self, Self::Compliant)
	}
}

impl From<String> for PolicyStatus {
	fn from(s: String) -> Self {
		match s.as_str() {
			"Compliant" => Self::Compliant,
			"Partial Compliance" => Self::PartialCompliance,
			"At Risk" => Self::AtRisk,
			"Non-Compliant" => Self::NonCompliant,
			"Cannot Be Assessed" => Self::CannotBeAssessed,
			"Not Applicable" => Self::NotApplicable,
			_ => Self::Other(s),
		}
	}
}

/// One row of the policy matrix.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PolicyAlignment {
	#[serde(deserialize_with = "text")]
	pub policy_area: String,
	#[serde(deserialize_with = "lenient")]
	pub status: PolicyStatus,
	#[serde(deserialize_with = "text")]
	pub reason: String,
}

/// A finding. Not linked to a policy row by the report itself.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvidenceTrace {
	#[serde(deserialize_with = "text")]
	pub source_doc: String,
	#[serde(deserialize_with = "text")]
	pub policy_section: String,
	#[serde(deserialize_with = "text")]
	pub workflow_component: String,
	#[serde(deserialize_with = "text")]
	pub issue_description: String,
	#[serde(deserialize_with = "text")]
	pub severity: String,
	#[serde(deserialize_with = "text")]
	pub snippet: String,
}
