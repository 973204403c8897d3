use std::time::Duration;

use foundation::GeoPoint;
use foundation::math::{Ecef, ecef_from_degrees};

pub const DEFAULT_FLIGHT_ALTITUDE_M: f64 = 2_000.0;
pub const DEFAULT_FLIGHT_DURATION: Duration = Duration::from_millis(1_800);

/// How the camera approaches an inspected point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlightSettings {
    pub altitude_m: f64,
    pub duration: Duration,
}

impl Default for FlightSettings {
    fn default() -> Self {
        Self {
            altitude_m: DEFAULT_FLIGHT_ALTITUDE_M,
            duration: DEFAULT_FLIGHT_DURATION,
        }
    }
}

impl FlightSettings {
    pub fn flight_to(&self, target: GeoPoint) -> CameraFlight {
        CameraFlight {
            target,
            altitude_m: self.altitude_m,
            duration: self.duration,
        }
    }
}

/// A single animated camera move ending above `target`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraFlight {
    pub target: GeoPoint,
    pub altitude_m: f64,
    pub duration: Duration,
}

impl CameraFlight {
    /// Final camera pose: straight above the target, looking down at it.
    pub fn destination(&self) -> Camera3D {
        let target = self.target.wrapped();
        Camera3D::look_at(
            ecef_from_degrees(target, self.altitude_m),
            ecef_from_degrees(target, 0.0),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera3D {
    pub position: Ecef,
    pub target: Ecef,
}

impl Camera3D {
    pub fn look_at(position: Ecef, target: Ecef) -> Self {
        Self { position, target }
    }

    pub fn height_above_target(&self) -> f64 {
        let d = Ecef::new(
            self.position.x - self.target.x,
            self.position.y - self.target.y,
            self.position.z - self.target.z,
        );
        d.norm()
    }
}
