//! Lifecycle of the rendered scene.
//!
//! The engine starts `Uninitialized`, moves to `Initializing` while the
//! drawing surface is acquired and becomes `Ready` once a scene exists.
//! Graph values that arrive before then are buffered; only the latest is
//! kept and it seeds the scene when it is built.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use super::config::GraphConfig;
use super::state::SceneState;
use crate::graph::GraphData;

/// Zero-sized measurements tolerated before giving up.
const MAX_INIT_ATTEMPTS: u32 = 40;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
	#[error("no drawing surface is mounted")]
	SurfaceUnavailable,
	#[error("the browser refused a 2D drawing context")]
	ContextUnavailable,
	#[error("rendering engine could not be loaded: {0}")]
	AcquisitionFailed(String),
	#[error("drawing surface still has no size after {0} attempts")]
	ZeroSizedSurface(u32),
	#[error("engine was disposed")]
	Disposed,
}

/// A drawing target the engine renders into.
pub trait Surface {
	/// Measured size in CSS pixels.
	fn size(&self) -> (f64, f64);
	fn set_size(&mut self, width: f64, height: f64);
	fn draw(&self, scene: &SceneState);
	/// Frees anything the surface holds outside the Rust heap.
	fn release(&mut self);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnginePhase {
	Uninitialized,
	Initializing,
	Ready,
	Failed(String),
	Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitOutcome {
	Ready,
	/// The surface measured zero; schedule another attempt.
	Retry,
}

enum Lifecycle<S> {
	Uninitialized,
	Initializing,
	Ready { surface: S, scene: SceneState },
	Failed(EngineError),
	Disposed,
}

pub struct RenderEngine<S: Surface> {
	lifecycle: Lifecycle<S>,
	pending: Option<GraphData>,
	config: GraphConfig,
	attempts: u32,
}

impl<S: Surface> RenderEngine<S> {
	pub fn new(config: GraphConfig) -> Self {
		Self {
			lifecycle: Lifecycle::Uninitialized,
			pending: None,
			config,
			attempts: 0,
		}
	}

	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	pub fn phase(&self) -> EnginePhase {
		match &self.lifecycle {
			Lifecycle::Uninitialized => EnginePhase::Uninitialized,
			Lifecycle::Initializing => EnginePhase::Initializing,
			Lifecycle::Ready { .. } => EnginePhase::Ready,
			Lifecycle::Failed(e) => EnginePhase::Failed(e.to_string()),
			Lifecycle::Disposed => EnginePhase::Disposed,
		}
	}

	pub fn scene(&self) -> Option<&SceneState> {
		match &self.lifecycle {
			Lifecycle::Ready { scene, .. } => Some(scene),
			_ => None,
		}
	}

	pub fn scene_mut(&mut self) -> Option<&mut SceneState> {
		match &mut self.lifecycle {
			Lifecycle::Ready { scene, .. } => Some(scene),
			_ => None,
		}
	}

	/// Moves to `Initializing`. Returns `false` when initialization already
	/// started or finished.
	pub fn begin_init(&mut self) -> Result<bool, EngineError> {
		match self.lifecycle {
			Lifecycle::Uninitialized => {
				log::info!("render engine initializing");
				self.lifecycle = Lifecycle::Initializing;
				Ok(true)
			}
			Lifecycle::Disposed => Err(EngineError::Disposed),
			_ => Ok(false),
		}
	}

	/// Finishes initialization with the outcome of surface acquisition.
	pub fn complete_init(
		&mut self,
		acquired: Result<S, EngineError>,
	) -> Result<InitOutcome, EngineError> {
		if let Lifecycle::Disposed = self.lifecycle {
			if let Ok(mut surface) = acquired {
				surface.release();
			}
			return Err(EngineError::Disposed);
		}

		let surface = match acquired {
			Ok(surface) => surface,
			Err(e) => {
				log::error!("render engine failed: {e}");
				self.lifecycle = Lifecycle::Failed(e.clone());
				return Err(e);
			}
		};

		let (width, height) = surface.size();
		if width <= 0.0 || height <= 0.0 {
			self.attempts += 1;
			if self.attempts >= MAX_INIT_ATTEMPTS {
				let e = EngineError::ZeroSizedSurface(self.attempts);
				log::error!("render engine failed: {e}");
				self.lifecycle = Lifecycle::Failed(e.clone());
				return Err(e);
			}
			log::debug!("surface measured {width}x{height}, retrying initialization");
			self.lifecycle = Lifecycle::Uninitialized;
			return Ok(InitOutcome::Retry);
		}

		let data = self.pending.take().unwrap_or_default();
		let scene = SceneState::new(&data, width, height, self.config.clone());
		log::info!(
			"render engine ready ({width}x{height}, {} nodes)",
			scene.node_count()
		);
		self.lifecycle = Lifecycle::Ready { surface, scene };
		Ok(InitOutcome::Ready)
	}

	/// Applies new graph data, or buffers it until the scene exists.
	pub fn update(&mut self, data: GraphData) {
		match &mut self.lifecycle {
			Lifecycle::Ready { scene, .. } => scene.set_data(&data),
			Lifecycle::Uninitialized | Lifecycle::Initializing => {
				log::debug!("buffering graph update until the scene is ready");
				self.pending = Some(data);
			}
			Lifecycle::Failed(_) | Lifecycle::Disposed => {}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		if let Lifecycle::Ready { surface, scene } = &mut self.lifecycle {
			surface.set_size(width, height);
			scene.resize(width, height);
		}
	}

	/// Advances the simulation and draws one frame.
	pub fn frame(&mut self, dt_ms: f64) {
		if let Lifecycle::Ready { surface, scene } = &mut self.lifecycle {
			scene.tick(dt_ms);
			surface.draw(scene);
		}
	}

	pub fn recenter(&mut self, duration_ms: f64, padding: f64) {
		if let Some(scene) = self.scene_mut() {
			scene.zoom_to_fit(duration_ms, padding);
		}
	}

	/// Releases the surface. Later calls are no-ops.
	pub fn dispose(&mut self) {
		if let Lifecycle::Ready { surface, .. } = &mut self.lifecycle {
			surface.release();
		}
		if !matches!(self.lifecycle, Lifecycle::Disposed) {
			log::info!("render engine disposed");
		}
		self.lifecycle = Lifecycle::Disposed;
		self.pending = None;
	}
}

/// Caller-held handle to an engine, shared between the canvas and the
/// controls around it.
pub struct GraphHandle<S: Surface> {
	engine: Rc<RefCell<RenderEngine<S>>>,
}

impl<S: Surface> Clone for GraphHandle<S> {
	fn clone(&self) -> Self {
		Self {
			engine: self.engine.clone(),
		}
	}
}

impl<S: Surface> GraphHandle<S> {
	pub fn new(config: GraphConfig) -> Self {
		Self {
			engine: Rc::new(RefCell::new(RenderEngine::new(config))),
		}
	}

	pub fn with<R>(&self, f: impl FnOnce(&mut RenderEngine<S>) -> R) -> R {
		f(&mut self.engine.borrow_mut())
	}

	pub fn phase(&self) -> EnginePhase {
		self.engine.borrow().phase()
	}

	pub fn update(&self, data: GraphData) {
		self.with(|e| e.update(data));
	}

	/// Animates the camera so the whole graph is in view.
	pub fn recenter(&self, duration_ms: f64, padding_px: f64) {
		self.with(|e| e.recenter(duration_ms, padding_px));
	}

	pub fn dispose(&self) {
		self.with(RenderEngine::dispose);
	}
}
