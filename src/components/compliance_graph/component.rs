use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent};

use super::engine::{EngineError, EnginePhase, GraphHandle, InitOutcome};
use super::state::{HoverInfo, PointerButton};
use super::surface::{CanvasSurface, Sizing};
use crate::graph::GraphData;

/// Handle to a canvas-backed engine.
pub type ComplianceGraphHandle = GraphHandle<CanvasSurface>;

const FRAME_MS: f64 = 1000.0 / 60.0;
/// Longest frame step fed to the simulation, so a background tab does not
/// produce one huge jump when it wakes up.
const MAX_FRAME_MS: f64 = 100.0;

/// Node under the pointer, with the pointer position inside the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverTip {
	pub info: HoverInfo,
	pub x: f64,
	pub y: f64,
}

/// Browser resources bound to one mounted canvas.
struct Mount {
	handle: ComplianceGraphHandle,
	canvas: HtmlCanvasElement,
	sizing: Sizing,
	status: RwSignal<EnginePhase>,
	timer: Cell<Option<i32>>,
	frame: Cell<Option<i32>>,
	init_cb: RefCell<Option<Closure<dyn FnMut()>>>,
	animate: RefCell<Option<Closure<dyn FnMut(f64)>>>,
	resize_cb: RefCell<Option<Closure<dyn FnMut()>>>,
}

/// Runs teardown when the owning reactive scope is disposed.
struct Teardown(Rc<Mount>);

impl Drop for Teardown {
	fn drop(&mut self) {
		let mount = &self.0;
		if let Some(window) = web_sys::window() {
			if let Some(id) = mount.timer.take() {
				window.clear_timeout_with_handle(id);
			}
			if let Some(id) = mount.frame.take() {
				let _ = window.cancel_animation_frame(id);
			}
			if let Some(cb) = mount.resize_cb.borrow_mut().take() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		// Dropping the closures breaks their reference cycles back to `mount`
		mount.init_cb.borrow_mut().take();
		mount.animate.borrow_mut().take();
		mount.handle.dispose();
	}
}

fn schedule_init(mount: &Rc<Mount>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let delay = mount.handle.with(|e| e.config().init_delay_ms) as i32;
	let inner = mount.clone();
	let cb = Closure::<dyn FnMut()>::new(move || {
		inner.timer.set(None);
		start_init(&inner);
	});
	match window
		.set_timeout_with_callback_and_timeout_and_arguments_0(cb.as_ref().unchecked_ref(), delay)
	{
		Ok(id) => mount.timer.set(Some(id)),
		Err(e) => log::error!("could not schedule graph initialization: {e:?}"),
	}
	*mount.init_cb.borrow_mut() = Some(cb);
}

fn start_init(mount: &Rc<Mount>) {
	match mount.handle.with(|e| e.begin_init()) {
		Ok(true) => {}
		Ok(false) => return,
		Err(e) => {
			log::debug!("skipping initialization: {e}");
			return;
		}
	}
	mount.status.set(EnginePhase::Initializing);

	let mount = mount.clone();
	spawn_local(async move {
		let acquired = CanvasSurface::acquire(mount.canvas.clone(), mount.sizing).await;
		match mount.handle.with(|e| e.complete_init(acquired)) {
			Ok(InitOutcome::Ready) => {
				mount.status.set(EnginePhase::Ready);
				bind_resize(&mount);
				start_loop(&mount);
			}
			Ok(InitOutcome::Retry) => {
				mount.status.set(EnginePhase::Uninitialized);
				schedule_init(&mount);
			}
			Err(EngineError::Disposed) => {}
			Err(e) => mount.status.set(EnginePhase::Failed(e.to_string())),
		}
	});
}

fn bind_resize(mount: &Rc<Mount>) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let inner = mount.clone();
	let cb = Closure::<dyn FnMut()>::new(move || {
		let (w, h) = inner.sizing.measure(&inner.canvas);
		if w > 0.0 && h > 0.0 {
			inner.handle.with(|e| e.resize(w, h));
		}
	});
	if let Err(e) = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref()) {
		log::warn!("resize listener not installed: {e:?}");
	}
	*mount.resize_cb.borrow_mut() = Some(cb);
}

fn request_frame(mount: &Mount) {
	let Some(window) = web_sys::window() else {
		return;
	};
	if let Some(cb) = mount.animate.borrow().as_ref() {
		match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
			Ok(id) => mount.frame.set(Some(id)),
			Err(e) => log::error!("animation frame refused: {e:?}"),
		}
	}
}

fn start_loop(mount: &Rc<Mount>) {
	let inner = mount.clone();
	let last = Cell::new(None::<f64>);
	*mount.animate.borrow_mut() = Some(Closure::new(move |now: f64| {
		let dt = last
			.get()
			.map_or(FRAME_MS, |prev| (now - prev).clamp(0.0, MAX_FRAME_MS));
		last.set(Some(now));
		let running = inner.handle.with(|e| {
			e.frame(dt);
			e.phase() == EnginePhase::Ready
		});
		if running {
			request_frame(&inner);
		}
	}));
	request_frame(mount);
}

fn pointer_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn ComplianceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	handle: ComplianceGraphHandle,
	status: RwSignal<EnginePhase>,
	hover: RwSignal<Option<HoverTip>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let sizing = if fullscreen {
		Sizing::Fullscreen
	} else {
		Sizing::Parent { width, height }
	};

	let handle_data = handle.clone();
	Effect::new(move |_| {
		handle_data.update(data.get());
	});

	let handle_mount = handle.clone();
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let mount = Rc::new(Mount {
			handle: handle_mount.clone(),
			canvas: canvas.into(),
			sizing,
			status,
			timer: Cell::new(None),
			frame: Cell::new(None),
			init_cb: RefCell::new(None),
			animate: RefCell::new(None),
			resize_cb: RefCell::new(None),
		});
		schedule_init(&mount);
		let _ = StoredValue::new_local(Teardown(mount));
	});

	let handle_md = handle.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let button = match ev.button() {
			2 => PointerButton::Secondary,
			_ => PointerButton::Primary,
		};
		handle_md.with(|e| {
			if let Some(scene) = e.scene_mut() {
				scene.pointer_down(x, y, button);
			}
		});
	};

	let handle_mm = handle.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		let info = handle_mm.with(|e| {
			let scene = e.scene_mut()?;
			scene.pointer_move(x, y);
			scene.hover_info()
		});
		let tip = info.map(|info| HoverTip { info, x, y });
		if hover.with_untracked(|current| *current != tip) {
			hover.set(tip);
		}
	};

	let handle_mu = handle.clone();
	let on_mouseup = move |_: MouseEvent| {
		handle_mu.with(|e| {
			if let Some(scene) = e.scene_mut() {
				scene.pointer_up();
			}
		});
	};

	let handle_ml = handle.clone();
	let on_mouseleave = move |_: MouseEvent| {
		handle_ml.with(|e| {
			if let Some(scene) = e.scene_mut() {
				scene.pointer_leave();
			}
		});
		hover.set(None);
	};

	let handle_wh = handle;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		handle_wh.with(|e| {
			if let Some(scene) = e.scene_mut() {
				scene.wheel(ev.delta_y());
			}
		});
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="compliance-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:contextmenu=|ev: MouseEvent| ev.prevent_default()
			style="display: block; cursor: grab;"
		/>
	}
}
