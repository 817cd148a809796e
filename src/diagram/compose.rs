use log::info;

use super::builder::FrameDiagramBuilder;
use super::style::DiagramStyle;
use super::{Diagram, View};
use crate::error::RelativityError;
use crate::scene::Scene;

/// How the traveler's side of the picture is split up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// One traveler diagram holding both legs.
    #[default]
    Combined,
    /// One traveler diagram per leg.
    SplitLegs,
}

impl RenderMode {
    pub fn traveler_views(self) -> &'static [View] {
        match self {
            RenderMode::Combined => &[View::Traveler],
            RenderMode::SplitLegs => &[View::Outbound, View::Return],
        }
    }
}

/// The Earth-frame diagram followed by the traveler diagram(s).
pub fn compose(
    scene: &Scene,
    mode: RenderMode,
    style: &DiagramStyle,
) -> Result<Vec<Diagram>, RelativityError> {
    let mut diagrams = Vec::with_capacity(1 + mode.traveler_views().len());
    diagrams.push(
        FrameDiagramBuilder::new(scene, style, View::Earth)
            .with_x_extent(2.0 * scene.params().distance)
            .build()?,
    );
    for &view in mode.traveler_views() {
        diagrams.push(
            FrameDiagramBuilder::new(scene, style, view)
                .with_x_extent(scene.apparent_earth_distance())
                .build()?,
        );
    }
    info!("composed {} diagrams ({:?})", diagrams.len(), mode);
    Ok(diagrams)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneParams;

    #[test]
    fn combined_mode_yields_two_diagrams() {
        let scene = Scene::new(SceneParams::default()).unwrap();
        let diagrams = compose(&scene, RenderMode::Combined, &DiagramStyle::default()).unwrap();
        let views: Vec<View> = diagrams.iter().map(|d| d.view).collect();
        assert_eq!(views, vec![View::Earth, View::Traveler]);
    }

    #[test]
    fn split_mode_scales_return_leg_by_apparent_distance() {
        let scene = Scene::new(SceneParams::default()).unwrap();
        let diagrams = compose(&scene, RenderMode::SplitLegs, &DiagramStyle::default()).unwrap();
        assert_eq!(diagrams.len(), 3);
        assert_eq!(diagrams[0].viewport.x_max, 20.0);
        assert_eq!(diagrams[2].view, View::Return);
        assert_eq!(diagrams[2].viewport.x_max, scene.apparent_earth_distance());
    }
}
