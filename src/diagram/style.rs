//! Presentation configuration: colours, widths and text tweaks.

use crate::scene::LegKind;

/// Empirical correction added to simultaneity caption angles, in degrees.
pub const ROTATION_CORRECTION_DEG: f64 = -3.0;
/// Earth light rays run out to this multiple of the turnaround distance.
pub const LIGHT_RAY_REACH: f64 = 1.2;
/// Projected axes run out to this multiple of the leg they belong to.
pub const AXIS_REACH: f64 = 1.2;
pub const TICK_STEP: f64 = 2.0;
pub const MINOR_TICK_STEP: f64 = 1.0;
/// HSL lightness multiplier for annotation colours.
pub const DARKEN_LIGHTNESS: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Same hue and saturation, lightness scaled by [`DARKEN_LIGHTNESS`].
    pub fn darken(self) -> Rgb {
        let (h, s, l) = rgb_to_hsl(self);
        hsl_to_rgb(h, s, (l * DARKEN_LIGHTNESS).min(1.0))
    }
}

fn rgb_to_hsl(Rgb(r, g, b): Rgb) -> (f64, f64, f64) {
    let (r, g, b) = (r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }
    let delta = max - min;
    let s = if l > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };
    let h = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    (h / 6.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let channel = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;
    if s == 0.0 {
        return Rgb(channel(l), channel(l), channel(l));
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let hue = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    Rgb(
        channel(hue(h + 1.0 / 3.0)),
        channel(hue(h)),
        channel(hue(h - 1.0 / 3.0)),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Square,
    /// A short vertical tick, used for length marks.
    Tick,
}

/// Colours and strokes for one diagram. `Default` reproduces the classic palette.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagramStyle {
    pub earth: Rgb,
    pub outbound: Rgb,
    pub return_leg: Rgb,
    pub light: Rgb,
    pub leg_width: u32,
    pub leg_style: LineStyle,
    pub annotation_width: u32,
    pub annotation_style: LineStyle,
    pub rotation_correction_deg: f64,
    pub light_ray_reach: f64,
    pub axis_reach: f64,
    pub length_step: f64,
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            earth: Rgb::from_hex(0x0088ff),
            outbound: Rgb::from_hex(0xffa500),
            return_leg: Rgb::from_hex(0xaa00aa),
            light: Rgb::from_hex(0x008000),
            leg_width: 2,
            leg_style: LineStyle::Solid,
            annotation_width: 1,
            annotation_style: LineStyle::Dotted,
            rotation_correction_deg: ROTATION_CORRECTION_DEG,
            light_ray_reach: LIGHT_RAY_REACH,
            axis_reach: AXIS_REACH,
            length_step: TICK_STEP,
        }
    }
}

impl DiagramStyle {
    pub fn color_for(&self, leg: LegKind) -> Rgb {
        match leg {
            LegKind::Earth => self.earth,
            LegKind::Outbound => self.outbound,
            LegKind::Return => self.return_leg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_splits_channels() {
        assert_eq!(Rgb::from_hex(0xaa00aa), Rgb(0xaa, 0x00, 0xaa));
    }

    #[test]
    fn darken_keeps_hue_and_lowers_lightness() {
        let Rgb(r, g, b) = Rgb::from_hex(0x0088ff).darken();
        assert_eq!(r, 0);
        assert!(b < 0xff && g < 0x88);
        // hue preserved: ratio of g to b stays close
        assert!(((g as f64 / b as f64) - (0x88 as f64 / 255.0)).abs() < 0.02);
    }

    #[test]
    fn darken_grey_stays_grey() {
        let Rgb(r, g, b) = Rgb(200, 200, 200).darken();
        assert_eq!((r, g), (g, b));
        assert_eq!(r, 120);
    }
}
