pub mod simultaneity;
pub mod special;

pub use simultaneity::{
    LightRay, RayDirection, apparent_earth_distance, earth_simultaneous, turnaround_proper_time,
};
pub use special::{Event, Frame, lorentz_factor, to_moving_frame, to_rest_frame};
