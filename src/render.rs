use std::iter;
use std::ops::Range;
use std::path::Path;

use anyhow::Result;
use log::{info, trace};
use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::element::DashedPathElement;
use plotters::prelude::*;

use twin_paradox::Event;
use twin_paradox::diagram::{Diagram, DrawCommand, LineStyle, MarkerShape, Rgb, Viewport};

/// Pixel height of every panel; widths follow each diagram's aspect ratio.
const PANEL_HEIGHT: u32 = 900;
/// Approximate height `titled` reserves for a caption of `CAPTION_SIZE`.
const CAPTION_HEIGHT: u32 = 30;
const CAPTION_SIZE: u32 = 20;
const CHART_MARGIN: u32 = 10;
const X_LABEL_AREA: u32 = 40;
const Y_LABEL_AREA: u32 = 50;
/// Dash and gap of dotted strokes, in pixels.
const DOT_PX: u32 = 4;
const GAP_PX: u32 = 4;
const ARROW_HEAD: f64 = 0.5;
const FONT: &str = "sans-serif";

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Draws the diagrams side by side. `.svg` paths get vector output, anything else a bitmap.
pub fn render(diagrams: &[Diagram], path: &Path) -> Result<()> {
    let widths: Vec<u32> = diagrams
        .iter()
        .map(|d| panel_width(&d.viewport, PANEL_HEIGHT))
        .collect();
    let size = (widths.iter().sum::<u32>().max(1), PANEL_HEIGHT);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("svg") => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_panels(root, diagrams, &widths)?
        }
        _ => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_panels(root, diagrams, &widths)?
        }
    }
    info!("✅ Diagram saved to {}", path.display());
    Ok(())
}

fn draw_panels<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    diagrams: &[Diagram],
    widths: &[u32],
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&RGBColor(211, 211, 211))?;
    let panels = root.split_by_breakpoints(breakpoints(widths), [0u32; 0]);
    for (panel, diagram) in panels.iter().zip(diagrams) {
        draw_diagram(panel, diagram)?;
    }
    root.present()?;
    Ok(())
}

fn draw_diagram<DB: DrawingBackend>(panel: &DrawingArea<DB, Shift>, diagram: &Diagram) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let vp = &diagram.viewport;
    panel.fill(&WHITE)?;
    let area = panel.titled(&diagram.title, (FONT, CAPTION_SIZE))?;
    let (x_range, t_range) = equal_aspect_ranges(vp, plot_size(area.dim_in_pixel()));
    trace!("{}: x {:?}, t {:?}", diagram.title, x_range, t_range);

    let ticks = |range: &Range<f64>| {
        ((range.end - range.start) / vp.tick_step).round().max(1.0) as usize + 1
    };
    let (x_ticks, t_ticks) = (ticks(&x_range), ticks(&t_range));
    let mut chart = ChartBuilder::on(&area)
        .margin(CHART_MARGIN)
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA)
        .build_cartesian_2d(x_range, t_range)?;

    chart
        .configure_mesh()
        .x_desc(vp.x_label.as_str())
        .y_desc(vp.t_label.as_str())
        .x_labels(x_ticks)
        .y_labels(t_ticks)
        .max_light_lines(minor_divisions(vp))
        .light_line_style(RGBColor(235, 235, 235))
        .draw()?;

    for command in &diagram.commands {
        trace!("{}: {:?}", diagram.title, command);
        draw_command(&mut chart, command)?;
    }
    Ok(())
}

fn rgb(Rgb(r, g, b): Rgb) -> RGBColor {
    RGBColor(r, g, b)
}

fn coords(points: &[Event]) -> Vec<(f64, f64)> {
    points.iter().map(|p| (p.x, p.t)).collect()
}

/// Dash and gap in pixels, `None` for a solid stroke.
fn dash_pattern(style: LineStyle) -> Option<(u32, u32)> {
    match style {
        LineStyle::Solid => None,
        LineStyle::Dotted => Some((DOT_PX, GAP_PX)),
    }
}

/// Viewport extent including its margin, as `(x, t)`.
fn spans(vp: &Viewport) -> (f64, f64) {
    (
        vp.x_max - vp.x_min + 2.0 * vp.margin,
        vp.t_max - vp.t_min + 2.0 * vp.margin,
    )
}

/// Plotting area left inside a titled panel of `size` pixels.
fn plot_size((width, height): (u32, u32)) -> (u32, u32) {
    (
        width.saturating_sub(2 * CHART_MARGIN + Y_LABEL_AREA).max(1),
        height.saturating_sub(2 * CHART_MARGIN + X_LABEL_AREA).max(1),
    )
}

/// Panel width at which one unit of `x` takes as many pixels as one unit of `t`.
fn panel_width(vp: &Viewport, height: u32) -> u32 {
    let (_, plot_height) = plot_size((0, height.saturating_sub(CAPTION_HEIGHT)));
    let (x_span, t_span) = spans(vp);
    let plot_width = (plot_height as f64 * x_span / t_span).round() as u32;
    plot_width.max(1) + 2 * CHART_MARGIN + Y_LABEL_AREA
}

/// Left edges of every panel but the first.
fn breakpoints(widths: &[u32]) -> Vec<u32> {
    widths
        .iter()
        .scan(0, |edge, width| {
            *edge += width;
            Some(*edge)
        })
        .take(widths.len().saturating_sub(1))
        .collect()
}

/// Chart ranges that cover the viewport and keep the pixel scale equal on both axes.
/// Slack goes to both sides of `x` and to the top of `t`.
fn equal_aspect_ranges(vp: &Viewport, (width, height): (u32, u32)) -> (Range<f64>, Range<f64>) {
    let (x_span, t_span) = spans(vp);
    let (width, height) = (width as f64, height as f64);
    let per_pixel = (x_span / width).max(t_span / height);
    let x_pad = ((per_pixel * width - x_span) / 2.0).max(0.0);
    let t_pad = (per_pixel * height - t_span).max(0.0);
    (
        (vp.x_min - vp.margin - x_pad)..(vp.x_max + vp.margin + x_pad),
        (vp.t_min - vp.margin)..(vp.t_max + vp.margin + t_pad),
    )
}

/// Minor grid divisions between two labelled ticks.
fn minor_divisions(vp: &Viewport) -> usize {
    (vp.tick_step / vp.minor_tick_step).round().max(1.0) as usize
}

fn draw_path<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    points: &[Event],
    stroke: ShapeStyle,
    style: LineStyle,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    match dash_pattern(style) {
        None => {
            chart.draw_series(iter::once(PathElement::new(coords(points), stroke)))?;
        }
        Some((dash, gap)) => {
            chart.draw_series(iter::once(DashedPathElement::new(
                coords(points),
                dash,
                gap,
                stroke,
            )))?;
        }
    }
    Ok(())
}

fn draw_command<DB: DrawingBackend>(chart: &mut Chart<'_, DB>, command: &DrawCommand) -> Result<()>
where
    DB::ErrorType: 'static,
{
    match command {
        DrawCommand::Line {
            points,
            color,
            width,
            style,
        } => {
            draw_path(chart, points, rgb(*color).stroke_width(*width), *style)?;
        }
        DrawCommand::Marker {
            x,
            t,
            color,
            shape,
            label,
        } => {
            let at = (*x, *t);
            match shape {
                MarkerShape::Square => {
                    chart.draw_series(iter::once(
                        EmptyElement::at(at) + Rectangle::new([(-4, -4), (4, 4)], rgb(*color).filled()),
                    ))?;
                }
                MarkerShape::Tick => {
                    chart.draw_series(iter::once(
                        EmptyElement::at(at)
                            + PathElement::new(vec![(0, -5), (0, 5)], rgb(*color).stroke_width(1)),
                    ))?;
                }
            }
            if let Some(label) = label {
                chart.draw_series(iter::once(Text::new(
                    label.clone(),
                    at,
                    (FONT, 14).into_font().color(&rgb(*color)),
                )))?;
            }
        }
        DrawCommand::AxisArrow {
            x0,
            t0,
            dx,
            dt,
            color,
            label,
        } => {
            let start = Event::new(*x0, *t0);
            let delta = Event::new(*dx, *dt);
            let tip = start + delta;
            draw_path(chart, &[start, tip], rgb(*color).stroke_width(1), LineStyle::Dotted)?;
            let length = dx.hypot(*dt);
            if length > 0.0 {
                let along = delta.scale(ARROW_HEAD / length);
                let across = Event::new(-along.t, along.x).scale(0.5);
                let base = tip - along;
                chart.draw_series(iter::once(Polygon::new(
                    coords(&[tip, base + across, base - across]),
                    rgb(*color).filled(),
                )))?;
            }
            chart.draw_series(iter::once(Text::new(
                label.clone(),
                (tip.x, tip.t),
                (FONT, 16).into_font().color(&rgb(*color)),
            )))?;
        }
        DrawCommand::Text {
            x,
            t,
            content,
            color,
            rotation_degrees,
        } => {
            // plotters only rotates text by quarter turns; captions stay horizontal
            trace!("text {content:?} requested at {rotation_degrees:.1}°");
            chart.draw_series(iter::once(Text::new(
                content.clone(),
                (*x, *t),
                (FONT, 13).into_font().color(&rgb(*color)),
            )))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use twin_paradox::{DiagramStyle, RenderMode, Scene, SceneParams, compose};

    fn diagrams() -> Vec<Diagram> {
        let scene = Scene::new(SceneParams::default()).unwrap();
        compose(&scene, RenderMode::SplitLegs, &DiagramStyle::default()).unwrap()
    }

    #[test]
    fn dotted_lines_become_dashed_paths() {
        assert_eq!(dash_pattern(LineStyle::Solid), None);
        assert_eq!(dash_pattern(LineStyle::Dotted), Some((DOT_PX, GAP_PX)));
    }

    #[test]
    fn panels_keep_pixels_per_unit_equal() {
        for diagram in diagrams() {
            let vp = &diagram.viewport;
            let width = panel_width(vp, PANEL_HEIGHT);
            let (plot_w, plot_h) = plot_size((width, PANEL_HEIGHT - CAPTION_HEIGHT));
            let (x_span, t_span) = spans(vp);
            let ratio = (plot_w as f64 / x_span) / (plot_h as f64 / t_span);
            assert!((ratio - 1.0).abs() < 0.01, "{}: {ratio}", diagram.title);
        }
    }

    #[test]
    fn earth_panel_is_narrower_than_tall() {
        let earth = &diagrams()[0];
        assert!(panel_width(&earth.viewport, PANEL_HEIGHT) < PANEL_HEIGHT);
    }

    #[test]
    fn ranges_are_padded_to_equal_scale() {
        let earth = &diagrams()[0];
        let plot = (600, 800);
        let (x, t) = equal_aspect_ranges(&earth.viewport, plot);
        let x_scale = plot.0 as f64 / (x.end - x.start);
        let t_scale = plot.1 as f64 / (t.end - t.start);
        assert!((x_scale - t_scale).abs() < 1e-9);
        assert!(x.start <= -0.5 && x.end >= 20.5);
        assert_eq!(t.start, -0.5);
        assert!(t.end >= 40.5);
    }

    #[test]
    fn breakpoints_sit_between_panels() {
        assert_eq!(breakpoints(&[300, 400, 500]), vec![300, 700]);
        assert!(breakpoints(&[300]).is_empty());
    }

    #[test]
    fn minor_grid_splits_each_tick() {
        assert_eq!(minor_divisions(&diagrams()[0].viewport), 2);
    }
}
