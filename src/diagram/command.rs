use super::style::{LineStyle, MarkerShape, Rgb};
use crate::relativity::Event;

/// One primitive for the drawing surface, in the diagram's own coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Line {
        points: Vec<Event>,
        color: Rgb,
        width: u32,
        style: LineStyle,
    },
    Marker {
        x: f64,
        t: f64,
        color: Rgb,
        shape: MarkerShape,
        label: Option<String>,
    },
    AxisArrow {
        x0: f64,
        t0: f64,
        dx: f64,
        dt: f64,
        color: Rgb,
        label: String,
    },
    Text {
        x: f64,
        t: f64,
        content: String,
        color: Rgb,
        rotation_degrees: f64,
    },
}

impl DrawCommand {
    pub fn segment(from: Event, to: Event, color: Rgb, width: u32, style: LineStyle) -> Self {
        DrawCommand::Line {
            points: vec![from, to],
            color,
            width,
            style,
        }
    }

    pub fn marker(at: Event, color: Rgb, shape: MarkerShape) -> Self {
        DrawCommand::Marker {
            x: at.x,
            t: at.t,
            color,
            shape,
            label: None,
        }
    }

    pub fn text(at: Event, content: impl Into<String>, color: Rgb, rotation_degrees: f64) -> Self {
        DrawCommand::Text {
            x: at.x,
            t: at.t,
            content: content.into(),
            color,
            rotation_degrees,
        }
    }

    pub fn arrow(from: Event, delta: Event, color: Rgb, label: impl Into<String>) -> Self {
        DrawCommand::AxisArrow {
            x0: from.x,
            t0: from.t,
            dx: delta.x,
            dt: delta.t,
            color,
            label: label.into(),
        }
    }
}
