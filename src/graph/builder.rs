use std::collections::HashSet;

use super::types::{GraphData, GraphLink, GraphNode, NodeCategory, Relation};
use crate::report::{EvidenceTrace, PolicyAlignment, Report};

pub const HUB_FALLBACK_NAME: &str = "AI System";
pub const HUB_WEIGHT: f64 = 20.0;
pub const CATEGORY_WEIGHT: f64 = 10.0;
pub const POLICY_WEIGHT: f64 = 15.0;
pub const RISK_WEIGHT: f64 = 12.0;

const ISSUE_PREFIX_CHARS: usize = 10;

/// Decides whether a finding belongs to a policy row.
pub trait EvidenceMatcher {
	fn matches(&self, policy: &PolicyAlignment, evidence: &EvidenceTrace) -> bool;
}

impl<F> EvidenceMatcher for F
where
	F: Fn(&PolicyAlignment, &EvidenceTrace) -> bool,
{
	fn matches(&self, policy: &PolicyAlignment, evidence: &EvidenceTrace) -> bool {
		self(policy, evidence)
	}
}

/// Matches when the evidence section names the policy area, or when the
/// policy reason quotes the first ten characters of the issue.
///
/// An empty issue description has an empty prefix and therefore matches
/// every non-compliant policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct SubstringMatcher;

impl EvidenceMatcher for SubstringMatcher {
	fn matches(&self, policy: &PolicyAlignment, evidence: &EvidenceTrace) -> bool {
		evidence.policy_section.contains(&policy.policy_area)
			|| policy
				.reason
				.contains(char_prefix(&evidence.issue_description, ISSUE_PREFIX_CHARS))
	}
}

fn char_prefix(s: &str, n: usize) -> &str {
	match s.char_indices().nth(n) {
		Some((end, _)) => &s[..end],
		None => s,
	}
}

/// Accumulates nodes with first-writer-wins identity.
#[derive(Default)]
struct Accumulator {
	data: GraphData,
	ids: HashSet<String>,
}

impl Accumulator {
	fn add_node(
		&mut self,
		id: &str,
		name: &str,
		category: NodeCategory,
		weight: f64,
		description: Option<&str>,
	) {
		if !self.ids.insert(id.to_owned()) {
			return;
		}
		self.data.nodes.push(GraphNode {
			id: id.to_owned(),
			name: name.to_owned(),
			category,
			weight,
			description: description.map(str::to_owned),
		});
	}

	fn link(&mut self, source: &str, target: &str, relation: Relation) {
		self.data.links.push(GraphLink {
			source: source.to_owned(),
			target: target.to_owned(),
			relation,
		});
	}
}

/// Report to graph projection with a pluggable evidence matcher.
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder<M = SubstringMatcher> {
	matcher: M,
}

impl<M: EvidenceMatcher> GraphBuilder<M> {
	pub fn with_matcher(matcher: M) -> Self {
		Self { matcher }
	}

	pub fn build(&self, report: &Report) -> GraphData {
		let mut acc = Accumulator::default();

		let hub = match report.system_spec.agent_name.as_str() {
			"" => HUB_FALLBACK_NAME,
			name => name,
		};
		acc.add_node(
			hub,
			hub,
			NodeCategory::Component,
			HUB_WEIGHT,
			Some(report.system_spec.summary.as_str()),
		);

		for category in &report.data_map.data_categories_detected {
			acc.add_node(
				category,
				category,
				NodeCategory::Component,
				CATEGORY_WEIGHT,
				Some("Data Category"),
			);
			acc.link(hub, category, Relation::Contains);
		}

		for policy in &report.policy_matrix {
			let policy_id = policy.policy_area.as_str();
			acc.add_node(
				policy_id,
				policy_id,
				NodeCategory::Policy,
				POLICY_WEIGHT,
				Some(policy.reason.as_str()),
			);
			acc.link(hub, policy_id, Relation::Governs);

			if policy.status.is_compliant() {
				continue;
			}
			let findings = report
				.evidence
				.iter()
				.filter(|ev| self.matcher.matches(policy, ev));
			for (idx, ev) in findings.enumerate() {
				let risk_id = format!("Risk-{policy_id}-{idx}");
				acc.add_node(
					&risk_id,
					&format!("{} Risk", ev.severity),
					NodeCategory::Risk,
					RISK_WEIGHT,
					Some(ev.issue_description.as_str()),
				);
				acc.link(policy_id, &risk_id, Relation::Violates);
			}
		}

		log::debug!(
			"built graph: {} nodes, {} links",
			acc.data.nodes.len(),
			acc.data.links.len()
		);
		acc.data
	}
}

/// Builds the graph with the default substring heuristic.
pub fn build_graph(report: &Report) -> GraphData {
	GraphBuilder::<SubstringMatcher>::default().build(report)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::report::{DataMap, PolicyStatus, SystemSpec};

	fn policy(area: &str, status: PolicyStatus, reason: &str) -> PolicyAlignment {
		PolicyAlignment {
			policy_area: area.into(),
			status,
			reason: reason.into(),
		}
	}

	fn evidence(section: &str, issue: &str, severity: &str) -> EvidenceTrace {
		EvidenceTrace {
			policy_section: section.into(),
			issue_description: issue.into(),
			severity: severity.into(),
			..Default::default()
		}
	}

	fn sample() -> Report {
		Report {
			system_spec: SystemSpec {
				agent_name: "Loan Agent".into(),
				summary: "Scores loan applications".into(),
				..Default::default()
			},
			data_map: DataMap {
				data_categories_detected: vec!["PII".into(), "Financial".into(), "PII".into()],
				..Default::default()
			},
			policy_matrix: vec![
				policy("Data Privacy", PolicyStatus::NonCompliant, "stores raw SSNs in logs"),
				policy("Fairness", PolicyStatus::Compliant, "bias audit passed"),
				policy("Retention", PolicyStatus::AtRisk, "no deletion schedule"),
			],
			evidence: vec![
				evidence("Data Privacy 4.2", "Raw identifiers persisted", "High"),
				evidence("Fairness 1.1", "bias audit skipped for region", "Low"),
				evidence("General", "no deletion job configured", "Medium"),
			],
			..Default::default()
		}
	}

	fn assert_well_formed(graph: &GraphData) {
		let ids: HashSet<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids.len(), graph.nodes.len(), "node ids must be unique");
		for link in &graph.links {
			assert!(ids.contains(link.source.as_str()), "dangling source {}", link.source);
			assert!(ids.contains(link.target.as_str()), "dangling target {}", link.target);
		}
	}

	#[test]
	fn empty_report_is_just_the_hub() {
		let graph = build_graph(&Report::default());
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.links.is_empty());
		let hub = &graph.nodes[0];
		assert_eq!(hub.id, HUB_FALLBACK_NAME);
		assert_eq!(hub.category, NodeCategory::Component);
		assert_eq!(hub.weight, HUB_WEIGHT);
	}

	#[test]
	fn hub_carries_name_and_summary() {
		let graph = build_graph(&sample());
		let hub = &graph.nodes[0];
		assert_eq!(hub.id, "Loan Agent");
		assert_eq!(hub.description.as_deref(), Some("Scores loan applications"));
	}

	#[test]
	fn duplicate_categories_collapse_but_links_repeat() {
		let graph = build_graph(&sample());
		assert_well_formed(&graph);
		let pii = graph.nodes.iter().filter(|n| n.id == "PII").count();
		assert_eq!(pii, 1);
		let contains: Vec<_> = graph
			.links
			.iter()
			.filter(|l| l.relation == Relation::Contains)
			.map(|l| l.target.as_str())
			.collect();
		assert_eq!(contains, ["PII", "Financial", "PII"]);
	}

	#[test]
	fn two_categories_give_two_components_and_contains_links() {
		let report = Report {
			data_map: DataMap {
				data_categories_detected: vec!["PII".into(), "Financial".into()],
				..Default::default()
			},
			..sample()
		};
		let graph = build_graph(&report);
		let categories: Vec<_> = graph
			.nodes
			.iter()
			.filter(|n| n.category == NodeCategory::Component && n.weight == CATEGORY_WEIGHT)
			.collect();
		assert_eq!(categories.len(), 2);
		let from_hub = graph
			.links
			.iter()
			.filter(|l| l.relation == Relation::Contains && l.source == "Loan Agent")
			.count();
		assert_eq!(from_hub, 2);
	}

	#[test]
	fn one_policy_node_per_matrix_row() {
		let report = sample();
		let graph = build_graph(&report);
		let policies = graph
			.nodes
			.iter()
			.filter(|n| n.category == NodeCategory::Policy)
			.count();
		assert_eq!(policies, report.policy_matrix.len());
	}

	#[test]
	fn compliant_policy_never_violates() {
		let graph = build_graph(&sample());
		assert!(
			!graph
				.links
				.iter()
				.any(|l| l.source == "Fairness" && l.relation == Relation::Violates)
		);
	}

	#[test]
	fn matching_by_section_and_by_issue_prefix() {
		let graph = build_graph(&sample());
		assert_well_formed(&graph);

		let privacy = graph.node("Risk-Data Privacy-0").unwrap();
		assert_eq!(privacy.name, "High Risk");
		assert_eq!(privacy.category, NodeCategory::Risk);
		assert_eq!(privacy.weight, RISK_WEIGHT);
		assert_eq!(privacy.description.as_deref(), Some("Raw identifiers persisted"));

		// "no deletion" is the ten-char prefix of the third finding
		let retention = graph.node("Risk-Retention-0").unwrap();
		assert_eq!(retention.name, "Medium Risk");
		assert!(graph.node("Risk-Retention-1").is_none());
	}

	#[test]
	fn data_privacy_scenario() {
		let report = Report {
			policy_matrix: vec![policy(
				"Data Privacy",
				PolicyStatus::NonCompliant,
				"reason mentions evidenceprefix here",
			)],
			evidence: vec![evidence("Unrelated", "evidenceprefix and more detail", "Critical")],
			..Default::default()
		};
		let graph = build_graph(&report);
		assert_well_formed(&graph);
		assert_eq!(graph.nodes.len(), 3);
		assert_eq!(graph.node("Data Privacy").unwrap().category, NodeCategory::Policy);
		let risks: Vec<_> = graph
			.nodes
			.iter()
			.filter(|n| n.category == NodeCategory::Risk)
			.collect();
		assert_eq!(risks.len(), 1);
		assert!(graph.links.contains(&GraphLink {
			source: HUB_FALLBACK_NAME.into(),
			target: "Data Privacy".into(),
			relation: Relation::Governs,
		}));
		assert!(graph.links.contains(&GraphLink {
			source: "Data Privacy".into(),
			target: risks[0].id.clone(),
			relation: Relation::Violates,
		}));
	}

	#[test]
	fn risk_ordinals_follow_evidence_order() {
		let report = Report {
			policy_matrix: vec![policy("Security", PolicyStatus::PartialCompliance, "")],
			evidence: vec![
				evidence("Security 1", "open port", "High"),
				evidence("Other", "x", "Low"),
				evidence("Security 2", "weak cipher", "Medium"),
			],
			..Default::default()
		};
		let graph = build_graph(&report);
		let risks: Vec<_> = graph
			.nodes
			.iter()
			.filter(|n| n.category == NodeCategory::Risk)
			.map(|n| (n.id.as_str(), n.name.as_str()))
			.collect();
		assert_eq!(risks, [("Risk-Security-0", "High Risk"), ("Risk-Security-1", "Medium Risk")]);
	}

	#[test]
	fn empty_issue_matches_every_open_policy() {
		let report = Report {
			policy_matrix: vec![
				policy("A", PolicyStatus::AtRisk, "anything"),
				policy("B", PolicyStatus::NonCompliant, "else"),
			],
			evidence: vec![evidence("", "", "Low")],
			..Default::default()
		};
		let graph = build_graph(&report);
		assert!(graph.node("Risk-A-0").is_some());
		assert!(graph.node("Risk-B-0").is_some());
	}

	#[test]
	fn prefix_counts_characters_not_bytes() {
		assert_eq!(char_prefix("héllo wörld, more", 10), "héllo wörl");
		assert_eq!(char_prefix("short", 10), "short");
	}

	#[test]
	fn numeric_severity_names_the_risk() {
		let report = Report::from_json(
			r#"{
				"policy_matrix": [{"policy_area": "Security", "status": "At Risk", "reason": "open port"}],
				"evidence": [{"policy_section": "Security 2", "issue_description": "open port", "severity": 3}]
			}"#,
		)
		.unwrap();
		let graph = build_graph(&report);
		assert_eq!(graph.node("Risk-Security-0").unwrap().name, "3 Risk");
	}

	#[test]
	fn mistyped_policy_matrix_leaves_the_hub() {
		let report = Report::from_json(r#"{"policy_matrix": "oops", "evidence": {}}"#).unwrap();
		let graph = build_graph(&report);
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.links.is_empty());
	}

	#[test]
	fn rebuild_is_idempotent() {
		let report = sample();
		assert_eq!(build_graph(&report), build_graph(&report));
	}

	#[test]
	fn custom_matcher_replaces_heuristic() {
		let builder = GraphBuilder::with_matcher(|p: &PolicyAlignment, e: &EvidenceTrace| {
			e.policy_section == p.policy_area
		});
		let graph = builder.build(&sample());
		assert!(
			graph
				.nodes
				.iter()
				.all(|n| n.category != NodeCategory::Risk)
		);
	}
}
