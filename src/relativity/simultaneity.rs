//! Simultaneity lines and light rays between Earth and the traveler.

use super::special::{Event, Frame, to_moving_frame};
use crate::error::RelativityError;

/// The Earth event that `frame` judges simultaneous with `event`.
///
/// Earth sits at `x = 0` in the rest frame. Along that worldline the frame's
/// clock is affine in rest time with slope γ, so the simultaneous Earth time is
/// recovered by inverting that line at the frame time of `event`. For a frame
/// through the rest origin this reduces to `(0, t - v·x)`; for the return leg
/// (velocity `-v`) it gives `(0, t + v·x)`.
pub fn earth_simultaneous(event: Event, frame: &Frame) -> Result<Event, RelativityError> {
    let own_time = frame.to_frame(event)?.t;
    let intercept = frame.to_frame(Event::ORIGIN)?.t;
    let gamma = frame.gamma()?;
    Ok(Event::new(0.0, (own_time - intercept) / gamma))
}

/// The traveler's age on arrival at the turnaround point `d` light-units away.
pub fn turnaround_proper_time(distance: f64, speed: f64) -> Result<f64, RelativityError> {
    Ok(to_moving_frame(distance, distance / speed, speed)?.t)
}

/// How far away Earth is, as judged by the traveler in `return_frame` at the
/// `turnaround` event.
///
/// The frame's spatial origin must be the turnaround event.
pub fn apparent_earth_distance(
    turnaround: Event,
    return_frame: &Frame,
) -> Result<f64, RelativityError> {
    let earth = earth_simultaneous(turnaround, return_frame)?;
    Ok(-return_frame.to_frame(earth)?.x)
}

/// Which way along `x` a light ray travels as time increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayDirection {
    /// Away from Earth.
    Increasing,
    /// Toward Earth.
    Decreasing,
}

impl RayDirection {
    fn sign(self) -> f64 {
        match self {
            RayDirection::Increasing => 1.0,
            RayDirection::Decreasing => -1.0,
        }
    }
}

/// A photon worldline of slope ±1 starting at `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRay {
    pub origin: Event,
    pub direction: RayDirection,
}

impl LightRay {
    pub fn new(origin: Event, direction: RayDirection) -> Self {
        Self { origin, direction }
    }

    /// `t(x) = t0 + |x - x0|`
    pub fn t_at(&self, x: f64) -> f64 {
        self.origin.t + (x - self.origin.x).abs()
    }

    /// The event on the ray at position `x`.
    pub fn event_at(&self, x: f64) -> Event {
        Event::new(x, self.t_at(x))
    }

    /// Whether `x` lies ahead of the origin in the ray's direction.
    pub fn reaches(&self, x: f64) -> bool {
        (x - self.origin.x) * self.direction.sign() >= 0.0
    }

    /// Where the ray crosses the worldline segment `start..=end`, if it does.
    pub fn crossing(&self, start: Event, end: Event) -> Option<Event> {
        let sign = self.direction.sign();
        let delta = end - start;
        let denom = delta.t - sign * delta.x;
        if denom.abs() < f64::EPSILON {
            return None;
        }
        // start + s·delta lies on t - t0 = sign·(x - x0)
        let s = (self.origin.t - start.t + sign * (start.x - self.origin.x)) / denom;
        if !(-1e-12..=1.0 + 1e-12).contains(&s) {
            return None;
        }
        let hit = start + delta.scale(s);
        self.reaches(hit.x).then_some(hit)
    }
}
