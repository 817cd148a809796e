use std::ops::{Add, Sub};

use crate::error::RelativityError;

/// Speed of light in natural units: distances in light-T, times in T.
pub const C: f64 = 1.0;

/// A point `(x, t)` in some inertial frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Event {
    pub x: f64,
    pub t: f64,
}

impl Event {
    pub const ORIGIN: Event = Event { x: 0.0, t: 0.0 };

    pub const fn new(x: f64, t: f64) -> Self {
        Self { x, t }
    }

    /// Scales both components, for use on direction vectors.
    pub fn scale(self, factor: f64) -> Event {
        Event::new(self.x * factor, self.t * factor)
    }
}

impl Add for Event {
    type Output = Event;

    fn add(self, rhs: Event) -> Event {
        Event::new(self.x + rhs.x, self.t + rhs.t)
    }
}

impl Sub for Event {
    type Output = Event;

    fn sub(self, rhs: Event) -> Event {
        Event::new(self.x - rhs.x, self.t - rhs.t)
    }
}

fn check_velocity(v: f64) -> Result<(), RelativityError> {
    // written so that NaN fails too
    if v > -C && v < C {
        Ok(())
    } else {
        Err(RelativityError::Domain { velocity: v })
    }
}

/// Lorentz factor γ = 1 / sqrt(1 - v^2/c^2)
pub fn lorentz_factor(v: f64) -> Result<f64, RelativityError> {
    check_velocity(v)?;
    Ok(1.0 / (1.0 - (v * v) / (C * C)).sqrt())
}

/// Length contraction: L = L0 / γ
pub fn length_contraction(proper_length: f64, v: f64) -> Result<f64, RelativityError> {
    let gamma = lorentz_factor(v)?;
    Ok(proper_length / gamma)
}

/// Transforms `(x', t')` in a frame moving at `v` back to the rest frame.
pub fn to_rest_frame(x_moving: f64, t_moving: f64, v: f64) -> Result<Event, RelativityError> {
    let gamma = lorentz_factor(v)?;
    Ok(Event::new(
        gamma * (x_moving + v * t_moving),
        gamma * (t_moving + v * x_moving),
    ))
}

/// Transforms `(x, t)` in the rest frame into a frame moving at `v`.
pub fn to_moving_frame(x_rest: f64, t_rest: f64, v: f64) -> Result<Event, RelativityError> {
    let gamma = lorentz_factor(v)?;
    Ok(Event::new(
        gamma * (x_rest - v * t_rest),
        gamma * (t_rest - v * x_rest),
    ))
}

/// An inertial frame moving at `velocity` relative to the rest frame.
///
/// The frame's spatial origin passes through `origin` (a rest-frame event),
/// and its clock reads `time_offset` there. This lets a return-leg frame keep
/// counting the traveler's age instead of restarting at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    velocity: f64,
    origin: Event,
    time_offset: f64,
}

impl Frame {
    /// The frame Earth is at rest in.
    pub const REST: Frame = Frame {
        velocity: 0.0,
        origin: Event::ORIGIN,
        time_offset: 0.0,
    };

    pub fn new(velocity: f64, origin: Event, time_offset: f64) -> Result<Self, RelativityError> {
        check_velocity(velocity)?;
        Ok(Self {
            velocity,
            origin,
            time_offset,
        })
    }

    /// A frame sharing the rest frame's origin event.
    pub fn moving(velocity: f64) -> Result<Self, RelativityError> {
        Self::new(velocity, Event::ORIGIN, 0.0)
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn origin(&self) -> Event {
        self.origin
    }

    pub fn time_offset(&self) -> f64 {
        self.time_offset
    }

    pub fn gamma(&self) -> Result<f64, RelativityError> {
        lorentz_factor(self.velocity)
    }

    /// Rest-frame event to this frame's coordinates.
    pub fn to_frame(&self, rest: Event) -> Result<Event, RelativityError> {
        let local = rest - self.origin;
        let moved = to_moving_frame(local.x, local.t, self.velocity)?;
        Ok(Event::new(moved.x, moved.t + self.time_offset))
    }

    /// This frame's coordinates back to a rest-frame event.
    pub fn to_rest(&self, event: Event) -> Result<Event, RelativityError> {
        let rest = to_rest_frame(event.x, event.t - self.time_offset, self.velocity)?;
        Ok(rest + self.origin)
    }

    /// Maps a displacement in this frame to a rest-frame displacement.
    pub fn direction_to_rest(&self, direction: Event) -> Result<Event, RelativityError> {
        to_rest_frame(direction.x, direction.t, self.velocity)
    }

    /// Maps a rest-frame displacement into this frame.
    pub fn direction_to_frame(&self, direction: Event) -> Result<Event, RelativityError> {
        to_moving_frame(direction.x, direction.t, self.velocity)
    }
}
