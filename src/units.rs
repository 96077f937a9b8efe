// Unit conversions shared by the physics and reporting code

use uom::si::f64::{Length, Velocity};
use uom::si::length::{meter, millimeter};
use uom::si::velocity::{kilometer_per_hour, meter_per_second};

pub fn kmh_to_mps(speed_kmh: f64) -> f64 {
    Velocity::new::<kilometer_per_hour>(speed_kmh).get::<meter_per_second>()
}

pub fn mps_to_kmh(speed_mps: f64) -> f64 {
    Velocity::new::<meter_per_second>(speed_mps).get::<kilometer_per_hour>()
}

pub fn meters_to_mm(length_m: f64) -> f64 {
    Length::new::<meter>(length_m).get::<millimeter>()
}
