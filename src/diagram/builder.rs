//! Turns a [`Scene`] into the drawing commands of one frame's diagram.

use log::debug;

use super::command::DrawCommand;
use super::style::{DiagramStyle, MINOR_TICK_STEP, MarkerShape, Rgb, TICK_STEP};
use super::{Diagram, View, Viewport};
use crate::error::RelativityError;
use crate::relativity::{Event, Frame, earth_simultaneous};
use crate::scene::{AgeMarker, LegKind, MAX_MARKERS, Scene};

/// Where the builder is along the traveler's trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Outbound,
    Turnaround,
    Return,
    Done,
}

impl Phase {
    pub fn next(self) -> Phase {
        match self {
            Phase::Outbound => Phase::Turnaround,
            Phase::Turnaround => Phase::Return,
            Phase::Return | Phase::Done => Phase::Done,
        }
    }

    pub fn leg(self) -> Option<LegKind> {
        match self {
            Phase::Outbound => Some(LegKind::Outbound),
            Phase::Return => Some(LegKind::Return),
            Phase::Turnaround | Phase::Done => None,
        }
    }
}

fn counterpart(leg: LegKind) -> LegKind {
    match leg {
        LegKind::Outbound => LegKind::Return,
        LegKind::Return => LegKind::Outbound,
        LegKind::Earth => LegKind::Earth,
    }
}

fn axis_labels(owner: LegKind) -> (&'static str, &'static str) {
    match owner {
        LegKind::Earth => ("x", "t"),
        LegKind::Outbound => ("x'", "t'"),
        LegKind::Return => ("x''", "t''"),
    }
}

/// Angle of the segment `from -> to` in degrees, 0 for a degenerate segment.
fn line_angle_deg(from: Event, to: Event) -> f64 {
    let delta = to - from;
    if delta.x == 0.0 && delta.t == 0.0 {
        return 0.0;
    }
    delta.t.atan2(delta.x).to_degrees()
}

fn age_label(age: f64) -> String {
    if (age - age.round()).abs() < 1e-9 {
        format!("{:.0}", age)
    } else {
        format!("{:.1}", age)
    }
}

/// Builds the diagram for one [`View`]. Borrows the scene read-only.
pub struct FrameDiagramBuilder<'a> {
    scene: &'a Scene,
    style: &'a DiagramStyle,
    view: View,
    x_extent: f64,
}

impl<'a> FrameDiagramBuilder<'a> {
    pub fn new(scene: &'a Scene, style: &'a DiagramStyle, view: View) -> Self {
        let x_extent = match view {
            View::Earth => 2.0 * scene.params().distance,
            _ => scene.apparent_earth_distance(),
        };
        Self {
            scene,
            style,
            view,
            x_extent,
        }
    }

    /// Horizontal half-range of traveler views, or full range of the Earth view.
    pub fn with_x_extent(mut self, x_extent: f64) -> Self {
        self.x_extent = x_extent;
        self
    }

    pub fn build(&self) -> Result<Diagram, RelativityError> {
        let mut out = Vec::new();
        let mut drawn = Vec::new();

        if self.view == View::Earth {
            let earth = self.scene.leg(LegKind::Earth);
            out.push(DrawCommand::segment(
                earth.start,
                earth.end,
                self.style.earth,
                self.style.leg_width,
                self.style.leg_style,
            ));
            self.draw_axes(LegKind::Earth, &Frame::REST, &mut out)?;
            drawn.push(LegKind::Earth);
        }

        let mut phase = Phase::Outbound;
        while phase != Phase::Done {
            match phase.leg() {
                Some(leg) if self.view.renders(leg) => self.draw_leg(leg, &mut drawn, &mut out)?,
                Some(_) => {}
                None => self.draw_turnaround(&mut out)?,
            }
            phase = phase.next();
        }

        debug!("{}: {} draw commands", self.view.title(), out.len());
        Ok(Diagram {
            title: self.view.title().to_string(),
            view: self.view,
            viewport: self.viewport(),
            commands: out,
        })
    }

    fn frame_of(&self, leg: LegKind) -> &Frame {
        &self.scene.leg(leg).frame
    }

    fn view_frame(&self, leg: LegKind) -> &Frame {
        self.frame_of(self.view.frame_owner(leg))
    }

    fn viewport(&self) -> Viewport {
        let (x_name, t_name) = self.view.axis_names();
        let (x_min, x_max, t_max) = match self.view {
            View::Earth => (0.0, self.x_extent, self.scene.t_reunion()),
            _ => (-self.x_extent, self.x_extent, self.scene.reunion_age()),
        };
        Viewport {
            x_min,
            x_max,
            t_min: 0.0,
            t_max,
            margin: self.scene.params().margin,
            tick_step: TICK_STEP,
            minor_tick_step: MINOR_TICK_STEP,
            x_label: format!("{x_name} [ly]"),
            t_label: format!("{t_name} [y]"),
        }
    }

    fn draw_leg(
        &self,
        leg: LegKind,
        drawn: &mut Vec<LegKind>,
        out: &mut Vec<DrawCommand>,
    ) -> Result<(), RelativityError> {
        let frame = *self.view_frame(leg);
        let worldline = self.scene.leg(leg);
        let color = self.style.color_for(leg);
        let dark = color.darken();
        debug!("{}: drawing {} leg", self.view.title(), leg.label());

        // worldlines
        if self.view != View::Earth {
            let from = earth_simultaneous(worldline.start, &worldline.frame)?;
            let to = earth_simultaneous(worldline.end, &worldline.frame)?;
            out.push(DrawCommand::segment(
                frame.to_frame(from)?,
                frame.to_frame(to)?,
                self.style.earth,
                self.style.leg_width,
                self.style.leg_style,
            ));
        }
        out.push(DrawCommand::segment(
            frame.to_frame(worldline.start)?,
            frame.to_frame(worldline.end)?,
            color,
            self.style.leg_width,
            self.style.leg_style,
        ));

        // axes of every frame not drawn yet; other rendered legs draw their own
        for owner in [leg, LegKind::Earth, counterpart(leg)] {
            let drawn_later = owner != leg && owner != LegKind::Earth && self.view.renders(owner);
            if drawn.contains(&owner) || drawn_later {
                continue;
            }
            self.draw_axes(owner, &frame, out)?;
            drawn.push(owner);
        }

        // age markers
        let markers: Vec<&AgeMarker> = self.scene.markers_for(leg).collect();
        let regular = markers.iter().filter(|m| !m.is_terminal()).count();
        let caption_at = (leg == LegKind::Outbound && regular > 0).then_some(regular / 2);
        for (i, marker) in markers.iter().enumerate() {
            self.draw_age_marker(marker, &frame, dark, caption_at == Some(i), out)?;
        }

        if leg == LegKind::Outbound {
            self.draw_light_rays(&markers, &frame, out)?;
        }

        // what the traveler infers about Earth when turning around
        // anchored at the Earth event this leg's frame calls simultaneous with the turnaround
        let earth_event = frame.to_frame(self.scene.earth_at_turnaround(leg))?;
        let turnaround = frame.to_frame(self.scene.turnaround())?;
        out.push(DrawCommand::marker(
            earth_event,
            self.style.earth.darken(),
            MarkerShape::Square,
        ));
        out.push(DrawCommand::text(
            earth_event,
            format!(
                "d={:.1} ly; v={:.2}",
                self.scene.apparent_earth_distance(),
                self.scene.apparent_earth_speed()
            ),
            dark,
            line_angle_deg(earth_event, turnaround) + self.style.rotation_correction_deg,
        ));
        Ok(())
    }

    fn draw_axes(
        &self,
        owner: LegKind,
        view: &Frame,
        out: &mut Vec<DrawCommand>,
    ) -> Result<(), RelativityError> {
        let frame = self.frame_of(owner);
        let color = self.style.color_for(owner).darken();
        let (x_label, t_label) = axis_labels(owner);
        let d = self.scene.params().distance;
        let (x_lo, x_hi, t_len) = match owner {
            LegKind::Earth => (0.0, 2.0 * d, self.scene.t_reunion()),
            LegKind::Outbound => (
                0.0,
                2.0 * d,
                self.style.axis_reach * self.scene.turnaround_age(),
            ),
            LegKind::Return => (-d, d, self.style.axis_reach * self.scene.turnaround_age()),
        };

        let viewport = self.viewport();
        let origin = view.to_frame(frame.origin())?;
        let x_dir = view.direction_to_frame(frame.direction_to_rest(Event::new(1.0, 0.0))?)?;
        let t_dir = view.direction_to_frame(frame.direction_to_rest(Event::new(0.0, 1.0))?)?;
        let axes = [
            (origin + x_dir.scale(x_lo), x_dir.scale(x_hi - x_lo), x_label),
            (origin, t_dir.scale(t_len), t_label),
        ];
        for (from, delta, label) in axes {
            match viewport.clip(from, delta) {
                Some((from, delta)) => out.push(DrawCommand::arrow(from, delta, color, label)),
                None => debug!("{}: axis {label} lies outside the plot", self.view.title()),
            }
        }

        if owner == LegKind::Outbound {
            let step = self.style.length_step;
            let x_limit = viewport.x_max;
            let marks = (1u64..)
                .map(|k| k as f64 * step)
                .take_while(|&length| length < x_hi)
                .take(MAX_MARKERS);
            for length in marks {
                let rest = frame.to_rest(Event::new(length, frame.time_offset()))?;
                let at = view.to_frame(rest)?;
                if at.x > x_limit {
                    break;
                }
                out.push(DrawCommand::marker(at, color, MarkerShape::Tick));
                out.push(DrawCommand::text(at, age_label(length), color, 0.0));
            }
        }
        Ok(())
    }

    fn draw_age_marker(
        &self,
        marker: &AgeMarker,
        frame: &Frame,
        color: Rgb,
        caption: bool,
        out: &mut Vec<DrawCommand>,
    ) -> Result<(), RelativityError> {
        let at = frame.to_frame(marker.traveler)?;
        let earth = frame.to_frame(marker.earth)?;
        out.push(DrawCommand::segment(
            at,
            earth,
            color,
            self.style.annotation_width,
            self.style.annotation_style,
        ));
        out.push(DrawCommand::text(at, age_label(marker.age), color, 0.0));

        if caption {
            let angle = line_angle_deg(earth, at);
            let margin = self.scene.params().margin;
            let (sin, cos) = angle.to_radians().sin_cos();
            out.push(DrawCommand::text(
                at + Event::new(cos * margin, sin * margin),
                "traveler's simultaneity",
                color,
                angle + self.style.rotation_correction_deg,
            ));
        }

        if marker.is_terminal() {
            out.push(DrawCommand::marker(at, color, MarkerShape::Square));
            out.push(DrawCommand::marker(
                earth,
                self.style.earth.darken(),
                MarkerShape::Square,
            ));
        }
        Ok(())
    }

    fn draw_light_rays(
        &self,
        markers: &[&AgeMarker],
        frame: &Frame,
        out: &mut Vec<DrawCommand>,
    ) -> Result<(), RelativityError> {
        let light = self.style.light;
        let reach = self.style.light_ray_reach * self.scene.params().distance;
        for ray in self.scene.earth_light_rays() {
            let start = frame.to_frame(ray.origin)?;
            let end = frame.to_frame(ray.event_at(reach))?;
            out.push(DrawCommand::segment(
                start,
                end,
                light,
                self.style.annotation_width,
                self.style.annotation_style,
            ));
            out.push(DrawCommand::text(
                end,
                "light",
                light.darken(),
                line_angle_deg(start, end),
            ));
        }

        let earth = self.scene.leg(LegKind::Earth);
        for ray in markers.iter().filter_map(|m| m.light_ray) {
            let received = ray
                .crossing(earth.start, earth.end)
                .unwrap_or_else(|| ray.event_at(0.0));
            out.push(DrawCommand::segment(
                frame.to_frame(ray.origin)?,
                frame.to_frame(received)?,
                light,
                self.style.annotation_width,
                self.style.annotation_style,
            ));
        }
        Ok(())
    }

    fn draw_turnaround(&self, out: &mut Vec<DrawCommand>) -> Result<(), RelativityError> {
        let owner = if self.view.renders(LegKind::Outbound) {
            LegKind::Outbound
        } else {
            LegKind::Return
        };
        let frame = self.view_frame(owner);
        let outbound = self.scene.leg(LegKind::Outbound);
        let at = frame.to_frame(outbound.end)?;
        let delta = outbound.end - outbound.start;
        out.push(DrawCommand::marker(
            at,
            self.style.outbound.darken(),
            MarkerShape::Square,
        ));
        out.push(DrawCommand::text(
            at,
            format!("d={:.1} ly; v={:.2}", delta.x, delta.x / delta.t),
            self.style.earth.darken(),
            0.0,
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneParams;

    fn scene() -> Scene {
        Scene::new(SceneParams::default()).unwrap()
    }

    fn lines_in(diagram: &Diagram, color: Rgb) -> Vec<&[Event]> {
        diagram
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { points, color: c, .. } if *c == color => {
                    Some(points.as_slice())
                }
                _ => None,
            })
            .collect()
    }

    fn texts(diagram: &Diagram) -> Vec<&str> {
        diagram
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn phases_run_in_order() {
        let mut phase = Phase::Outbound;
        let mut seen = vec![phase];
        while phase != Phase::Done {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![Phase::Outbound, Phase::Turnaround, Phase::Return, Phase::Done]
        );
    }

    #[test]
    fn earth_view_starts_with_earth_worldline() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Earth).build().unwrap();
        match &diagram.commands[0] {
            DrawCommand::Line { points, color, .. } => {
                assert_eq!(*color, style.earth);
                assert_eq!(points.as_slice(), &[Event::ORIGIN, Event::new(0.0, 40.0)]);
            }
            other => panic!("unexpected first command {other:?}"),
        }
    }

    #[test]
    fn earth_view_labels_inferred_distance() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Earth).build().unwrap();
        let labels = texts(&diagram);
        assert!(labels.contains(&"d=8.7 ly; v=0.50"));
        assert!(labels.contains(&"d=10.0 ly; v=0.50"));
        assert!(labels.contains(&"17.3"));
        assert!(labels.contains(&"traveler's simultaneity"));
    }

    #[test]
    fn own_frame_simultaneity_is_horizontal() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Outbound)
            .build()
            .unwrap();
        let lines = lines_in(&diagram, style.outbound.darken());
        assert_eq!(lines.len(), 9);
        for points in lines {
            assert!((points[0].t - points[1].t).abs() < 1e-9);
        }
    }

    #[test]
    fn light_stays_at_light_speed_in_every_view() {
        let scene = scene();
        let style = DiagramStyle::default();
        for view in [View::Earth, View::Outbound, View::Traveler] {
            let diagram = FrameDiagramBuilder::new(&scene, &style, view).build().unwrap();
            let rays = lines_in(&diagram, style.light);
            assert!(!rays.is_empty());
            for points in rays {
                let delta = points[1] - points[0];
                assert!((delta.t.abs() - delta.x.abs()).abs() < 1e-9, "{view:?}");
            }
        }
    }

    #[test]
    fn return_view_has_no_light_rays() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Return).build().unwrap();
        assert!(lines_in(&diagram, style.light).is_empty());
    }

    #[test]
    fn traveler_view_keeps_traveler_at_origin() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Traveler)
            .build()
            .unwrap();
        let legs: Vec<&[Event]> = lines_in(&diagram, style.outbound)
            .into_iter()
            .chain(lines_in(&diagram, style.return_leg))
            .collect();
        assert_eq!(legs.len(), 2);
        for points in &legs {
            assert!(points.iter().all(|p| p.x.abs() < 1e-9));
        }
        assert!((legs[0][1].t - scene.turnaround_age()).abs() < 1e-9);
        assert!((legs[1][0].t - scene.turnaround_age()).abs() < 1e-9);
        assert!((legs[1][1].t - scene.reunion_age()).abs() < 1e-9);
    }

    fn arrows(diagram: &Diagram) -> Vec<(Event, Event, &str)> {
        diagram
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::AxisArrow {
                    x0,
                    t0,
                    dx,
                    dt,
                    label,
                    ..
                } => Some((
                    Event::new(*x0, *t0),
                    Event::new(x0 + dx, t0 + dt),
                    label.as_str(),
                )),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn each_frame_gets_one_pair_of_axes() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Earth).build().unwrap();
        let labels: Vec<&str> = arrows(&diagram).iter().map(|a| a.2).collect();
        assert_eq!(labels, ["x", "t", "x'", "t'", "x''", "t''"]);
        for view in [View::Outbound, View::Return] {
            let diagram = FrameDiagramBuilder::new(&scene, &style, view).build().unwrap();
            let labels: Vec<&str> = arrows(&diagram).iter().map(|a| a.2).collect();
            assert!(labels.len() <= 6, "{view:?}");
            for label in ["x'", "t'", "x''", "t''"] {
                assert_eq!(labels.iter().filter(|l| **l == label).count(), 1, "{view:?} {label}");
            }
        }
    }

    #[test]
    fn axes_stay_inside_the_viewport() {
        let scene = scene();
        let style = DiagramStyle::default();
        for view in [View::Earth, View::Outbound, View::Return, View::Traveler] {
            let diagram = FrameDiagramBuilder::new(&scene, &style, view).build().unwrap();
            let vp = &diagram.viewport;
            let inside = |p: Event| {
                p.x >= vp.x_min - 1e-9
                    && p.x <= vp.x_max + 1e-9
                    && p.t >= vp.t_min - 1e-9
                    && p.t <= vp.t_max + 1e-9
            };
            for (start, tip, label) in arrows(&diagram) {
                assert!(inside(start) && inside(tip), "{view:?} {label}");
            }
        }
    }

    #[test]
    fn earth_view_axes_meet_the_plot_edges() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Earth).build().unwrap();
        let found = arrows(&diagram);
        let axis = |name: &str| found.iter().find(|a| a.2 == name).copied().unwrap();
        // x' runs out at the right edge, (x_max, x_max v)
        let (_, tip, _) = axis("x'");
        assert!((tip.x - 20.0).abs() < 1e-9 && (tip.t - 10.0).abs() < 1e-9);
        // x'' enters on Earth's worldline at t_planet + v d
        let (start, _, _) = axis("x''");
        assert!(start.x.abs() < 1e-9 && (start.t - 25.0).abs() < 1e-9);
    }

    #[test]
    fn turnaround_label_is_rounded() {
        let scene = Scene::new(SceneParams {
            distance: 1.0,
            speed: 0.11,
            ..SceneParams::default()
        })
        .unwrap();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Earth).build().unwrap();
        assert!(texts(&diagram).contains(&"d=1.0 ly; v=0.11"));
    }

    #[test]
    fn traveler_viewport_uses_apparent_distance() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Return).build().unwrap();
        assert!((diagram.viewport.x_max - 8.660254037844386).abs() < 1e-9);
        assert_eq!(diagram.viewport.x_min, -diagram.viewport.x_max);
        assert_eq!(diagram.viewport.margin, 0.5);
    }

    #[test]
    fn apparent_distance_labels_sit_on_simultaneous_earth_events() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Earth).build().unwrap();
        let anchors: Vec<(f64, f64)> = diagram
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { x, t, content, .. } if content == "d=8.7 ly; v=0.50" => {
                    Some((*x, *t))
                }
                _ => None,
            })
            .collect();
        assert_eq!(anchors.len(), 2);
        assert!(anchors[0].0.abs() < 1e-9 && (anchors[0].1 - 15.0).abs() < 1e-9);
        assert!(anchors[1].0.abs() < 1e-9 && (anchors[1].1 - 25.0).abs() < 1e-9);
    }

    #[test]
    fn terminal_marker_pins_earth_event() {
        let scene = scene();
        let style = DiagramStyle::default();
        let diagram = FrameDiagramBuilder::new(&scene, &style, View::Earth).build().unwrap();
        let earth_dark = style.earth.darken();
        let pinned = diagram.commands.iter().any(|c| {
            matches!(c, DrawCommand::Marker { x, t, color, .. }
                if *color == earth_dark && x.abs() < 1e-9 && (t - 15.0).abs() < 1e-9)
        });
        assert!(pinned);
    }

    #[test]
    fn angle_of_rest_simultaneity_line() {
        let angle = line_angle_deg(Event::new(0.0, 15.0), Event::new(10.0, 20.0));
        assert!((angle - 0.5f64.atan().to_degrees()).abs() < 1e-9);
        assert_eq!(line_angle_deg(Event::ORIGIN, Event::ORIGIN), 0.0);
    }
}
