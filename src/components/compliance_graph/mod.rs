//! Interactive 3D view of a compliance graph.

mod camera;
mod component;
mod config;
mod engine;
mod geometry;
mod render;
mod shell;
mod simulation;
mod state;
mod surface;
mod vec3;

pub use component::{ComplianceGraphCanvas, ComplianceGraphHandle, HoverTip};
pub use config::GraphConfig;
pub use engine::{EngineError, EnginePhase, GraphHandle, RenderEngine, Surface};
pub use shell::ComplianceGraph;
