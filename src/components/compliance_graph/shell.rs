use leptos::prelude::*;
use web_sys::MouseEvent;

use super::component::{ComplianceGraphCanvas, ComplianceGraphHandle, HoverTip};
use super::config::GraphConfig;
use super::engine::EnginePhase;
use crate::graph::{GraphData, build_graph};
use crate::report::Report;

#[component]
fn Legend() -> impl IntoView {
	view! {
		<div class="graph-legend">
			<h3>"System Topology"</h3>
			<div class="legend-row">
				<span class="legend-swatch legend-policy"></span>
				<span>"Policy (Constraint)"</span>
			</div>
			<div class="legend-row">
				<span class="legend-swatch legend-component"></span>
				<span>"Component (Asset)"</span>
			</div>
			<div class="legend-row">
				<span class="legend-swatch legend-risk"></span>
				<span>"Risk / Violation"</span>
			</div>
		</div>
	}
}

#[component]
fn Hud() -> impl IntoView {
	view! {
		<div class="graph-hud">
			<span>"L: Rotate"</span>
			<span>"R: Pan"</span>
			<span>"Wheel: Zoom"</span>
			<span>"Drag Nodes: Position"</span>
		</div>
	}
}

#[component]
fn Tooltip(tip: HoverTip) -> impl IntoView {
	let style = format!("left: {}px; top: {}px;", tip.x + 14.0, tip.y + 14.0);
	let description = tip
		.info
		.description
		.filter(|d| !d.is_empty())
		.unwrap_or_else(|| "No additional data available.".into());
	view! {
		<div class="graph-tooltip" style=style>
			<div class="tooltip-name">{tip.info.name}</div>
			<div class="tooltip-desc">{description}</div>
			<div class="tooltip-group">"Group: " {tip.info.category.as_str()}</div>
		</div>
	}
}

/// The 3D compliance graph with its legend, gesture help and recenter
/// control. Shows a placeholder until a report is available and the scene
/// is ready, and a message if the scene could not be created.
///
/// Pass `handle` to keep imperative access (`recenter`, `phase`) from the
/// outside; its config then wins over `config`. Without one, the view owns
/// a private engine built from `config`.
#[component]
pub fn ComplianceGraph(
	#[prop(into)] report: Signal<Option<Report>>,
	#[prop(optional)] config: Option<GraphConfig>,
	#[prop(optional)] handle: Option<ComplianceGraphHandle>,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let handle = handle.unwrap_or_else(|| ComplianceGraphHandle::new(config.unwrap_or_default()));
	let (recenter_ms, padding) = handle.with(|e| {
		let cfg = e.config();
		(cfg.recenter_duration_ms as f64, cfg.fit_padding_px)
	});
	let graph = Memo::new(move |_| {
		report.with(|r| r.as_ref().map(build_graph).unwrap_or_else(GraphData::default))
	});
	let status = RwSignal::new(EnginePhase::Uninitialized);
	let hover = RwSignal::new(None::<HoverTip>);

	let overlay = move || {
		if graph.with(GraphData::is_empty) {
			return Some(view! { <div class="graph-placeholder">"Waiting for assessment data..."</div> }.into_any());
		}
		match status.get() {
			EnginePhase::Ready | EnginePhase::Disposed => None,
			EnginePhase::Failed(reason) => Some(
				view! {
					<div class="graph-placeholder graph-error">
						<p>"The topology view could not be displayed."</p>
						<p class="graph-error-detail">{reason}</p>
					</div>
				}
				.into_any(),
			),
			EnginePhase::Uninitialized | EnginePhase::Initializing => {
				Some(view! { <div class="graph-placeholder">"Initializing topology..."</div> }.into_any())
			}
		}
	};

	let handle_btn = handle.clone();
	let on_recenter = move |ev: MouseEvent| {
		ev.prevent_default();
		ev.stop_propagation();
		handle_btn.recenter(recenter_ms, padding);
	};

	view! {
		<div class="compliance-graph">
			<ComplianceGraphCanvas data=graph handle=handle status=status hover=hover fullscreen=fullscreen />
			{overlay}
			<Legend />
			<Hud />
			<button class="graph-recenter" on:click=on_recenter>
				"Recenter Matrix"
			</button>
			{move || hover.get().map(|tip| view! { <Tooltip tip=tip /> })}
		</div>
	}
}
