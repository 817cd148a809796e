//! The twin-paradox scene: both travel legs, Earth, and every derived event.

use log::{debug, info};

use crate::error::{DegenerateRange, SceneError, SceneResult};
use crate::relativity::{
    Event, Frame, LightRay, RayDirection, apparent_earth_distance, earth_simultaneous,
    turnaround_proper_time,
};

/// Slack used when comparing marker ages against leg boundaries.
const AGE_EPSILON: f64 = 1e-9;

/// Upper bound on the age markers of one scene.
pub const MAX_MARKERS: usize = 10_000;

/// Physical input parameters for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneParams {
    /// Distance to the turnaround point, in light-time units.
    pub distance: f64,
    /// Traveler speed as a fraction of light speed, strictly inside (0, 1).
    pub speed: f64,
    /// Proper-time step between age markers.
    pub age_step: f64,
    /// Rendering padding, passed through untouched.
    pub margin: f64,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            distance: 10.0,
            speed: 0.5,
            age_step: 2.0,
            margin: 0.5,
        }
    }
}

impl SceneParams {
    fn validate(&self) -> SceneResult<()> {
        let invalid = |name, value, reason| SceneError::InvalidParameter {
            name,
            value,
            reason,
        };
        if !self.distance.is_finite() || self.distance <= 0.0 {
            return Err(invalid("distance", self.distance, "must be finite and > 0"));
        }
        if !(self.speed > 0.0 && self.speed < 1.0) {
            return Err(invalid("speed", self.speed, "must lie strictly inside (0, 1)"));
        }
        if !self.age_step.is_finite() || self.age_step <= 0.0 {
            return Err(invalid("age_step", self.age_step, "must be finite and > 0"));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(invalid("margin", self.margin, "must be finite and >= 0"));
        }
        Ok(())
    }
}

/// Which worldline segment something belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegKind {
    Earth,
    Outbound,
    Return,
}

impl LegKind {
    pub fn label(self) -> &'static str {
        match self {
            LegKind::Earth => "earth",
            LegKind::Outbound => "outbound",
            LegKind::Return => "return",
        }
    }
}

/// A straight inertial segment of a worldline, in rest-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldlineLeg {
    pub kind: LegKind,
    pub start: Event,
    pub end: Event,
    /// The frame in which this leg is at rest, clocked in proper time.
    pub frame: Frame,
    pub start_age: f64,
    pub end_age: f64,
}

impl WorldlineLeg {
    /// Rest-frame velocity along the leg.
    pub fn velocity(&self) -> f64 {
        self.frame.velocity()
    }

    /// The rest-frame event at which the leg's own clock reads `age`.
    pub fn event_at_age(&self, age: f64) -> SceneResult<Event> {
        Ok(self.frame.to_rest(Event::new(0.0, age))?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// At a multiple of the age step.
    Regular,
    /// At the exact final age of the leg.
    Terminal,
}

/// "The traveler is `age` years old here", with the Earth event its leg frame
/// deems simultaneous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeMarker {
    pub leg: LegKind,
    pub age: f64,
    pub kind: MarkerKind,
    pub traveler: Event,
    pub earth: Event,
    /// Light sent from the traveler back toward Earth.
    pub light_ray: Option<LightRay>,
}

impl AgeMarker {
    pub fn is_terminal(&self) -> bool {
        self.kind == MarkerKind::Terminal
    }
}

/// Multiples of `step` strictly between `start` and `end`.
///
/// Callers keep `(end - start) / step` below [`MAX_MARKERS`].
pub(crate) fn marker_ages(start: f64, end: f64, step: f64) -> Result<Vec<f64>, DegenerateRange> {
    if !(end > start) || end <= 0.0 {
        return Err(DegenerateRange { start, end });
    }
    let first = (start / step).floor().max(0.0) as u64;
    let last = (end / step).ceil() as u64;
    Ok((first..=last)
        .map(|k| k as f64 * step)
        .filter(|&age| age > start + AGE_EPSILON && age < end - AGE_EPSILON)
        .collect())
}

/// Everything derived from one set of [`SceneParams`]. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    params: SceneParams,
    earth: WorldlineLeg,
    outbound: WorldlineLeg,
    return_leg: WorldlineLeg,
    markers: Vec<AgeMarker>,
    earth_light_rays: Vec<LightRay>,
    t_planet: f64,
    t_reunion: f64,
    turnaround_age: f64,
    earth_at_turnaround_outbound: Event,
    earth_at_turnaround_return: Event,
    apparent_earth_distance: f64,
}

/// Builds a scene with the default rendering margin.
pub fn build_scene(distance: f64, speed: f64, age_step: f64) -> SceneResult<Scene> {
    Scene::new(SceneParams {
        distance,
        speed,
        age_step,
        ..SceneParams::default()
    })
}

impl Scene {
    pub fn new(params: SceneParams) -> SceneResult<Self> {
        params.validate()?;
        let SceneParams {
            distance: d,
            speed: v,
            age_step,
            ..
        } = params;

        let t_planet = d / v;
        let t_reunion = 2.0 * t_planet;
        let turnaround_age = turnaround_proper_time(d, v)?;
        // NaN and infinite counts fail the comparison too
        if !(2.0 * turnaround_age / age_step <= MAX_MARKERS as f64) {
            return Err(SceneError::InvalidParameter {
                name: "age_step",
                value: age_step,
                reason: "yields too many age markers for the trip",
            });
        }
        let turnaround = Event::new(d, t_planet);

        let earth = WorldlineLeg {
            kind: LegKind::Earth,
            start: Event::ORIGIN,
            end: Event::new(0.0, t_reunion),
            frame: Frame::REST,
            start_age: 0.0,
            end_age: t_reunion,
        };
        let outbound = WorldlineLeg {
            kind: LegKind::Outbound,
            start: Event::ORIGIN,
            end: turnaround,
            frame: Frame::moving(v)?,
            start_age: 0.0,
            end_age: turnaround_age,
        };
        let return_leg = WorldlineLeg {
            kind: LegKind::Return,
            start: outbound.end,
            end: Event::new(0.0, t_reunion),
            frame: Frame::new(-v, turnaround, turnaround_age)?,
            start_age: turnaround_age,
            end_age: 2.0 * turnaround_age,
        };

        let mut markers = Vec::new();
        for leg in [&outbound, &return_leg] {
            let ages = marker_ages(leg.start_age, leg.end_age, age_step).unwrap_or_else(|range| {
                debug!(
                    "{} leg: empty age range {:.3}..{:.3}, terminal marker only",
                    leg.kind.label(),
                    range.start,
                    range.end
                );
                Vec::new()
            });
            let regular = ages.into_iter().map(|age| (age, MarkerKind::Regular));
            let terminal = std::iter::once((leg.end_age, MarkerKind::Terminal));
            for (age, kind) in regular.chain(terminal) {
                markers.push(Self::age_marker(leg, age, kind, turnaround_age)?);
            }
        }

        let rays_until = (turnaround_age / 2.0).floor();
        let earth_light_rays: Vec<LightRay> = (0..(rays_until / age_step).ceil() as u64)
            .map(|k| k as f64 * age_step)
            .filter(|&emitted| emitted < rays_until)
            .map(|emitted| LightRay::new(Event::new(0.0, emitted), RayDirection::Increasing))
            .collect();

        let earth_at_turnaround_outbound = earth_simultaneous(turnaround, &outbound.frame)?;
        let earth_at_turnaround_return = earth_simultaneous(turnaround, &return_leg.frame)?;
        let apparent_earth_distance = apparent_earth_distance(turnaround, &return_leg.frame)?;

        info!(
            "scene d={d} v={v}: t_planet={t_planet:.3} t_reunion={t_reunion:.3} \
             turnaround_age={turnaround_age:.3} apparent_distance={apparent_earth_distance:.3} \
             markers={}",
            markers.len()
        );

        Ok(Self {
            params,
            earth,
            outbound,
            return_leg,
            markers,
            earth_light_rays,
            t_planet,
            t_reunion,
            turnaround_age,
            earth_at_turnaround_outbound,
            earth_at_turnaround_return,
            apparent_earth_distance,
        })
    }

    fn age_marker(
        leg: &WorldlineLeg,
        age: f64,
        kind: MarkerKind,
        turnaround_age: f64,
    ) -> SceneResult<AgeMarker> {
        let traveler = leg.event_at_age(age)?;
        let earth = earth_simultaneous(traveler, &leg.frame)?;
        let light_ray = (leg.kind == LegKind::Outbound && age < turnaround_age / 2.0)
            .then(|| LightRay::new(traveler, RayDirection::Decreasing));
        Ok(AgeMarker {
            leg: leg.kind,
            age,
            kind,
            traveler,
            earth,
            light_ray,
        })
    }

    pub fn params(&self) -> &SceneParams {
        &self.params
    }

    pub fn leg(&self, kind: LegKind) -> &WorldlineLeg {
        match kind {
            LegKind::Earth => &self.earth,
            LegKind::Outbound => &self.outbound,
            LegKind::Return => &self.return_leg,
        }
    }

    pub fn markers(&self) -> &[AgeMarker] {
        &self.markers
    }

    pub fn markers_for(&self, leg: LegKind) -> impl Iterator<Item = &AgeMarker> {
        self.markers.iter().filter(move |m| m.leg == leg)
    }

    /// Rays emitted from Earth toward the outbound traveler.
    pub fn earth_light_rays(&self) -> &[LightRay] {
        &self.earth_light_rays
    }

    pub fn turnaround(&self) -> Event {
        self.outbound.end
    }

    /// Rest-frame time of arrival at the turnaround point, `d / v`.
    pub fn t_planet(&self) -> f64 {
        self.t_planet
    }

    pub fn t_reunion(&self) -> f64 {
        self.t_reunion
    }

    /// Traveler's proper time at the turnaround point.
    pub fn turnaround_age(&self) -> f64 {
        self.turnaround_age
    }

    pub fn reunion_age(&self) -> f64 {
        self.return_leg.end_age
    }

    /// The Earth event simultaneous with the turnaround, as judged in `leg`'s frame.
    pub fn earth_at_turnaround(&self, leg: LegKind) -> Event {
        match leg {
            LegKind::Return => self.earth_at_turnaround_return,
            _ => self.earth_at_turnaround_outbound,
        }
    }

    /// Earth time skipped over when the traveler switches frames.
    pub fn simultaneity_jump(&self) -> f64 {
        self.earth_at_turnaround_return.t - self.earth_at_turnaround_outbound.t
    }

    /// Distance to Earth as seen by the traveler starting the return leg.
    pub fn apparent_earth_distance(&self) -> f64 {
        self.apparent_earth_distance
    }

    /// Earth's speed as seen by the traveler: apparent distance over leg age.
    pub fn apparent_earth_speed(&self) -> f64 {
        self.apparent_earth_distance / self.turnaround_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ages_skip_the_leg_start() {
        let ages = marker_ages(17.32, 34.64, 2.0).unwrap();
        assert_eq!(ages.first().copied(), Some(18.0));
        assert_eq!(ages.last().copied(), Some(34.0));
        assert_eq!(ages.len(), 9);
    }

    #[test]
    fn ages_exclude_an_aligned_end() {
        assert_eq!(marker_ages(0.0, 16.0, 2.0).unwrap().last().copied(), Some(14.0));
    }

    #[test]
    fn non_positive_end_is_degenerate() {
        assert!(marker_ages(0.0, 0.0, 2.0).is_err());
        assert!(marker_ages(0.0, -3.0, 2.0).is_err());
    }

    #[test]
    fn step_beyond_range_yields_nothing() {
        assert!(marker_ages(0.0, 1.5, 2.0).unwrap().is_empty());
    }

    #[test]
    fn return_leg_starts_where_outbound_ends() {
        let scene = Scene::new(SceneParams::default()).unwrap();
        assert_eq!(scene.leg(LegKind::Outbound).end, scene.leg(LegKind::Return).start);
        assert_eq!(scene.leg(LegKind::Return).end, scene.leg(LegKind::Earth).end);
    }

    #[test]
    fn rejects_margin_below_zero() {
        let params = SceneParams {
            margin: -0.1,
            ..SceneParams::default()
        };
        assert!(matches!(
            Scene::new(params),
            Err(SceneError::InvalidParameter { name: "margin", .. })
        ));
    }

    #[test]
    fn return_markers_lie_on_return_leg() {
        let scene = Scene::new(SceneParams::default()).unwrap();
        for marker in scene.markers_for(LegKind::Return) {
            // x = d - v (t - t_planet)
            let expected = 10.0 - 0.5 * (marker.traveler.t - 20.0);
            assert!((marker.traveler.x - expected).abs() < 1e-9);
            assert!(marker.light_ray.is_none());
        }
    }

    #[test]
    fn earth_rays_stop_before_outbound_midpoint() {
        let scene = Scene::new(SceneParams::default()).unwrap();
        let times: Vec<f64> = scene.earth_light_rays().iter().map(|r| r.origin.t).collect();
        // half the turnaround age is 8.66, rounded down to whole years
        assert_eq!(times, vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn earth_rays_follow_unaligned_step() {
        let scene = build_scene(10.0, 0.5, 3.0).unwrap();
        let times: Vec<f64> = scene.earth_light_rays().iter().map(|r| r.origin.t).collect();
        assert_eq!(times, vec![0.0, 3.0, 6.0]);
    }

    #[test]
    fn tiny_step_is_rejected_before_any_marker_is_built() {
        assert!(matches!(
            build_scene(10.0, 0.5, 1e-9),
            Err(SceneError::InvalidParameter { name: "age_step", .. })
        ));
    }

    #[test]
    fn marker_budget_admits_its_limit() {
        // 2 * 17.32 / 0.0035 stays just under the cap
        let scene = build_scene(10.0, 0.5, 0.0035).unwrap();
        assert!(scene.markers().len() <= MAX_MARKERS + 2);
    }
}
