//! Minkowski diagrams for the twin paradox.
//!
//! A [`Scene`] derives every event of the trip from a distance and a speed;
//! [`diagram::compose`] turns it into drawing commands for the Earth frame and
//! the traveler's frame(s).

pub mod diagram;
pub mod error;
pub mod relativity;
pub mod scene;

pub use diagram::{Diagram, DiagramStyle, DrawCommand, RenderMode, View, compose};
pub use error::{RelativityError, SceneError, SceneResult};
pub use relativity::{Event, Frame, LightRay, RayDirection};
pub use scene::{
    AgeMarker, LegKind, MAX_MARKERS, MarkerKind, Scene, SceneParams, WorldlineLeg, build_scene,
};
