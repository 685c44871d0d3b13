use leptos::prelude::*;

use crate::components::compliance_graph::{ComplianceGraph, ComplianceGraphHandle, GraphConfig};
use crate::report::Report;

/// Assessment bundled with the app for the landing view.
const SAMPLE_REPORT: &str = include_str!("../../assets/sample_report.json");

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let report = Report::from_json(SAMPLE_REPORT).inspect_err(|e| {
		log::error!("bundled report is unreadable: {e}");
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			{report
				.map(|report| {
					let title = report.system_spec.agent_name.clone();
					let report = Signal::derive(move || Some(report.clone()));
					let handle = ComplianceGraphHandle::new(GraphConfig::default());
					let on_key = {
						let handle = handle.clone();
						move |ev: leptos::ev::KeyboardEvent| {
							if ev.key() == "f" {
								let (ms, padding) = handle.with(|e| {
									let cfg = e.config();
									(cfg.recenter_duration_ms as f64, cfg.fit_padding_px)
								});
								handle.recenter(ms, padding);
							}
						}
					};
					view! {
						<div class="fullscreen-graph" tabindex="0" on:keydown=on_key>
							<ComplianceGraph report=report handle=handle fullscreen=true />
							<div class="graph-overlay">
								<h1>"Compliance Topology"</h1>
								<p class="subtitle">{title}</p>
							</div>
						</div>
					}
				})}
		</ErrorBoundary>
	}
}
