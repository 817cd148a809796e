//! Spacetime diagrams as ordered lists of drawing commands.

pub mod builder;
pub mod command;
pub mod compose;
pub mod style;

pub use builder::{FrameDiagramBuilder, Phase};
pub use command::DrawCommand;
pub use compose::{RenderMode, compose};
pub use style::{DiagramStyle, LineStyle, MarkerShape, Rgb};

use crate::relativity::Event;
use crate::scene::LegKind;

/// The frame a diagram is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Earth's rest frame, both legs.
    Earth,
    /// The outbound leg's frame, outbound leg only.
    Outbound,
    /// The return leg's frame, return leg only.
    Return,
    /// Both legs, each drawn in its own frame and stacked along the traveler's clock.
    Traveler,
}

impl View {
    pub fn title(self) -> &'static str {
        match self {
            View::Earth => "Earth frame",
            View::Outbound => "Traveler frame (outbound)",
            View::Return => "Traveler frame (return)",
            View::Traveler => "Traveler frame",
        }
    }

    pub fn renders(self, leg: LegKind) -> bool {
        match self {
            View::Earth | View::Traveler => leg != LegKind::Earth,
            View::Outbound => leg == LegKind::Outbound,
            View::Return => leg == LegKind::Return,
        }
    }

    /// Whose frame coordinates `leg` is drawn in.
    pub fn frame_owner(self, leg: LegKind) -> LegKind {
        match self {
            View::Earth => LegKind::Earth,
            View::Outbound => LegKind::Outbound,
            View::Return => LegKind::Return,
            View::Traveler => leg,
        }
    }

    pub fn axis_names(self) -> (&'static str, &'static str) {
        match self {
            View::Earth => ("x", "t"),
            View::Outbound => ("x'", "t'"),
            View::Return => ("x''", "t''"),
            View::Traveler => ("x'/x''", "t'/t''"),
        }
    }
}

/// Plot range and ticks for one diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub t_min: f64,
    pub t_max: f64,
    /// Padding around the range, straight from the scene parameters.
    pub margin: f64,
    pub tick_step: f64,
    pub minor_tick_step: f64,
    pub x_label: String,
    pub t_label: String,
}

impl Viewport {
    /// The part of the segment `from -> from + delta` inside the plot range,
    /// as a start and a delta. `None` when nothing of it is visible.
    pub fn clip(&self, from: Event, delta: Event) -> Option<(Event, Event)> {
        let (mut enter, mut leave) = (0.0f64, 1.0f64);
        let bounds = [
            (-delta.x, from.x - self.x_min),
            (delta.x, self.x_max - from.x),
            (-delta.t, from.t - self.t_min),
            (delta.t, self.t_max - from.t),
        ];
        for (p, q) in bounds {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                enter = enter.max(r);
            } else {
                leave = leave.min(r);
            }
        }
        if leave - enter <= 1e-9 {
            return None;
        }
        Some((from + delta.scale(enter), delta.scale(leave - enter)))
    }
}

/// A finished diagram, ready for a rendering backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub title: String,
    pub view: View,
    pub viewport: Viewport,
    pub commands: Vec<DrawCommand>,
}
