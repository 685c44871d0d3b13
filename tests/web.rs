#![cfg(target_arch = "wasm32")]

use compliance_graph::components::compliance_graph::{
	ComplianceGraph, ComplianceGraphCanvas, ComplianceGraphHandle, EnginePhase, GraphConfig,
	HoverTip,
};
use compliance_graph::graph::build_graph;
use compliance_graph::report::Report;
use leptos::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

async fn sleep(ms: i32) {
	let promise = js_sys::Promise::new(&mut |resolve, _| {
		web_sys::window()
			.unwrap()
			.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
			.unwrap();
	});
	JsFuture::from(promise).await.unwrap();
}

fn body() -> web_sys::HtmlElement {
	web_sys::window().unwrap().document().unwrap().body().unwrap()
}

fn sample() -> Report {
	Report::from_json(include_str!("../assets/sample_report.json")).unwrap()
}

#[wasm_bindgen_test]
fn handle_buffers_until_a_surface_is_acquired() {
	let handle = ComplianceGraphHandle::new(GraphConfig::default());
	handle.update(build_graph(&Report::default()));
	assert_eq!(handle.phase(), EnginePhase::Uninitialized);
	handle.recenter(600.0, 100.0);
	handle.dispose();
	assert_eq!(handle.phase(), EnginePhase::Disposed);
}

#[wasm_bindgen_test]
async fn unmount_before_init_disposes_without_acquiring() {
	let handle = ComplianceGraphHandle::new(GraphConfig::default());
	let inner = handle.clone();
	let mounted = leptos::mount::mount_to(body(), move || {
		let data = Signal::derive(|| build_graph(&sample()));
		let status = RwSignal::new(EnginePhase::Uninitialized);
		let hover = RwSignal::new(None::<HoverTip>);
		view! {
			<ComplianceGraphCanvas data=data handle=inner status=status hover=hover fullscreen=true />
		}
	});

	// Let the mount effects run, but stay inside the init delay
	sleep(10).await;
	assert_eq!(handle.phase(), EnginePhase::Uninitialized);

	drop(mounted);
	assert_eq!(handle.phase(), EnginePhase::Disposed);

	let delay = GraphConfig::default().init_delay_ms as i32;
	sleep(delay * 3).await;
	assert_eq!(handle.phase(), EnginePhase::Disposed);
	assert!(handle.with(|e| e.scene().is_none()));
}

#[wasm_bindgen_test]
async fn caller_held_handle_recenters_the_mounted_graph() {
	let handle = ComplianceGraphHandle::new(GraphConfig::default());
	let inner = handle.clone();
	let mounted = leptos::mount::mount_to(body(), move || {
		let report = Signal::derive(|| Some(sample()));
		view! { <ComplianceGraph report=report handle=inner fullscreen=true /> }
	});

	for _ in 0..40 {
		if handle.phase() == EnginePhase::Ready {
			break;
		}
		sleep(50).await;
	}
	assert_eq!(handle.phase(), EnginePhase::Ready);
	assert!(handle.with(|e| e.scene().map_or(0, |s| s.node_count())) > 1);

	handle.recenter(600.0, 100.0);
	assert!(handle.with(|e| e.scene().is_some_and(|s| s.camera.is_animating())));

	drop(mounted);
	assert_eq!(handle.phase(), EnginePhase::Disposed);
}
