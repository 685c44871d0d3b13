use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::engine::{EngineError, Surface};
use super::render;
use super::state::SceneState;

/// How the canvas takes its size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Sizing {
	/// Follows the browser window.
	Fullscreen,
	/// Explicit dimensions, falling back to the parent element's box.
	Parent {
		width: Option<f64>,
		height: Option<f64>,
	},
}

impl Sizing {
	pub fn measure(&self, canvas: &HtmlCanvasElement) -> (f64, f64) {
		match *self {
			Self::Fullscreen => {
				let Some(win) = web_sys::window() else {
					return (0.0, 0.0);
				};
				let dim = |v: Result<wasm_bindgen::JsValue, _>| {
					v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
				};
				(dim(win.inner_width()), dim(win.inner_height()))
			}
			Self::Parent { width, height } => {
				let parent = canvas.parent_element();
				(
					width.unwrap_or_else(|| {
						parent.as_ref().map(|p| p.client_width() as f64).unwrap_or(0.0)
					}),
					height.unwrap_or_else(|| {
						parent.as_ref().map(|p| p.client_height() as f64).unwrap_or(0.0)
					}),
				)
			}
		}
	}
}

/// A `<canvas>` with its 2D context.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	width: f64,
	height: f64,
}

impl CanvasSurface {
	/// Waits for the label fonts, then takes the 2D context and sizes the
	/// canvas to its measured box.
	pub async fn acquire(canvas: HtmlCanvasElement, sizing: Sizing) -> Result<Self, EngineError> {
		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or(EngineError::SurfaceUnavailable)?;
		let ready: js_sys::Promise = document
			.fonts()
			.ready()
			.map_err(|e| EngineError::AcquisitionFailed(format!("{e:?}")))?;
		JsFuture::from(ready)
			.await
			.map_err(|e| EngineError::AcquisitionFailed(format!("{e:?}")))?;

		let ctx = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
			.ok_or(EngineError::ContextUnavailable)?;

		let (width, height) = sizing.measure(&canvas);
		let mut surface = Self {
			canvas,
			ctx,
			width,
			height,
		};
		surface.set_size(width, height);
		Ok(surface)
	}
}

impl Surface for CanvasSurface {
	fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	fn set_size(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.canvas.set_width(width as u32);
		self.canvas.set_height(height as u32);
	}

	fn draw(&self, scene: &SceneState) {
		render::render(scene, &self.ctx);
	}

	fn release(&mut self) {
		self.ctx.clear_rect(0.0, 0.0, self.width, self.height);
		// A zero-sized canvas drops its backing store
		self.canvas.set_width(0);
		self.canvas.set_height(0);
	}
}
