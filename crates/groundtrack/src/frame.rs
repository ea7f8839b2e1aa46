//! ECI to ECEF to geodetic frame transformation.
//!
//! The transform is a pure function of an inertial position vector and a UTC
//! instant. The instant only determines the sidereal angle used for the Earth
//! rotation; everything else is geometry on the WGS84 ellipsoid.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::time::{gmst, julian_date_utc};

/// Default cap on latitude refinement steps.
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

/// Default convergence threshold for the latitude iteration, in radians.
pub const DEFAULT_TOLERANCE_RAD: f64 = 1e-10;

/// A Cartesian vector in kilometres (positions) or km/s (velocities).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// Create a vector from its components.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length.
    #[must_use]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Position in the Earth-Centered-Inertial frame, km.
pub type PositionVector = Vector3;

/// Velocity in the Earth-Centered-Inertial frame, km/s. Reported untransformed.
pub type VelocityVector = Vector3;

/// Position in the Earth-Centered-Earth-Fixed frame, km.
pub type EcefVector = Vector3;

/// A reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    /// Semi-major axis, km.
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

/// The WGS84 reference ellipsoid.
pub const WGS84: Ellipsoid = Ellipsoid {
    a: 6378.137,
    f: 1.0 / 298.257_223_563,
};

impl Ellipsoid {
    /// Semi-minor axis, km.
    #[must_use]
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// First eccentricity squared.
    #[must_use]
    pub fn e2(&self) -> f64 {
        let b = self.b();
        1.0 - (b * b) / (self.a * self.a)
    }

    /// Prime vertical radius of curvature at geodetic latitude `lat` (radians).
    #[must_use]
    pub fn prime_vertical_radius(&self, lat: f64) -> f64 {
        let sin_lat = lat.sin();
        self.a / (1.0 - self.e2() * sin_lat * sin_lat).sqrt()
    }
}

/// Latitude, longitude and altitude on the WGS84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticCoordinate {
    /// Geodetic latitude in degrees, `[-90, 90]`.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in degrees, `(-180, 180]`.
    #[serde(rename = "lon")]
    pub longitude: f64,
    /// Height above the ellipsoid in kilometres.
    #[serde(rename = "alt")]
    pub altitude: f64,
}

impl GeodeticCoordinate {
    /// True if any component is NaN.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        self.latitude.is_nan() || self.longitude.is_nan() || self.altitude.is_nan()
    }
}

/// Settings for the bounded latitude refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Iteration {
    /// Maximum number of refinement steps before giving up.
    pub max_iterations: u32,
    /// Stop once successive latitudes differ by no more than this, radians.
    pub tolerance_rad: f64,
}

impl Default for Iteration {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance_rad: DEFAULT_TOLERANCE_RAD,
        }
    }
}

/// Transform an ECI position at a UTC instant into geodetic coordinates.
///
/// # Errors
///
/// Returns [`Error::NonConvergence`] if the latitude iteration does not settle
/// within [`DEFAULT_MAX_ITERATIONS`] steps.
pub fn transform(position: &PositionVector, at: &DateTime<Utc>) -> Result<GeodeticCoordinate> {
    transform_with(position, at, &Iteration::default())
}

/// Like [`transform`] with explicit iteration settings.
///
/// # Errors
///
/// Returns [`Error::NonConvergence`] if the latitude iteration does not settle
/// within `iteration.max_iterations` steps.
pub fn transform_with(
    position: &PositionVector,
    at: &DateTime<Utc>,
    iteration: &Iteration,
) -> Result<GeodeticCoordinate> {
    let theta = gmst(julian_date_utc(at));
    ecef_to_geodetic(&eci_to_ecef(position, theta), iteration)
}

/// Rotate an ECI vector about Z by `-gmst` radians.
#[must_use]
pub fn eci_to_ecef(position: &PositionVector, gmst: f64) -> EcefVector {
    let (sin_g, cos_g) = gmst.sin_cos();
    Vector3 {
        x: cos_g * position.x + sin_g * position.y,
        y: -sin_g * position.x + cos_g * position.y,
        z: position.z,
    }
}

/// Convert an ECEF vector to geodetic coordinates on WGS84.
///
/// Degenerate input such as the Earth's centre yields NaN components rather
/// than an error.
///
/// # Errors
///
/// Returns [`Error::NonConvergence`] if the latitude iteration does not settle
/// within `iteration.max_iterations` steps.
pub fn ecef_to_geodetic(ecef: &EcefVector, iteration: &Iteration) -> Result<GeodeticCoordinate> {
    let ellipsoid = WGS84;
    let e2 = ellipsoid.e2();

    let longitude = normalize_longitude(ecef.y.atan2(ecef.x).to_degrees());

    let r = ecef.x.hypot(ecef.y);
    let mut lat = ecef.z.atan2(r);
    let mut converged = false;

    for step in 1..=iteration.max_iterations {
        let n = ellipsoid.prime_vertical_radius(lat);
        let alt = height(&ellipsoid, r, ecef.z, lat, n);
        let next = ecef.z.atan2(r * (1.0 - e2 * n / (n + alt)));

        let delta = (next - lat).abs();
        lat = next;

        if delta <= iteration.tolerance_rad || lat.is_nan() {
            trace!(steps = step, "latitude iteration settled");
            converged = true;
            break;
        }
    }

    if !converged {
        return Err(Error::NonConvergence {
            iterations: iteration.max_iterations,
        });
    }

    let n = ellipsoid.prime_vertical_radius(lat);
    let altitude = height(&ellipsoid, r, ecef.z, lat, n);

    Ok(GeodeticCoordinate {
        latitude: lat.to_degrees(),
        longitude,
        altitude,
    })
}

/// Height above the ellipsoid for a point at equatorial distance `r`, axial
/// coordinate `z` and geodetic latitude `lat`.
///
/// `r / cos(lat) - N` loses all precision near the poles, so above 45° the
/// equivalent `|z| / |sin(lat)| - N(1 - e²)` is used instead.
fn height(ellipsoid: &Ellipsoid, r: f64, z: f64, lat: f64, n: f64) -> f64 {
    let (sin_lat, cos_lat) = lat.sin_cos();
    if cos_lat.abs() >= sin_lat.abs() {
        r / cos_lat - n
    } else {
        z.abs() / sin_lat.abs() - n * (1.0 - ellipsoid.e2())
    }
}

/// Fold a longitude in degrees into `(-180, 180]`.
fn normalize_longitude(degrees: f64) -> f64 {
    if degrees <= -180.0 {
        degrees + 360.0
    } else {
        degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::f64::consts::TAU;

    const KM_TOLERANCE: f64 = 1e-6;
    const DEG_TOLERANCE: f64 = 1e-9;

    fn geodetic_at_zero_gmst(x: f64, y: f64, z: f64) -> GeodeticCoordinate {
        let ecef = eci_to_ecef(&Vector3::new(x, y, z), 0.0);
        ecef_to_geodetic(&ecef, &Iteration::default()).unwrap()
    }

    /// Forward conversion used to build fixtures with a known answer.
    fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, alt: f64) -> EcefVector {
        let lat = lat_deg.to_radians();
        let lon = lon_deg.to_radians();
        let n = WGS84.prime_vertical_radius(lat);
        Vector3::new(
            (n + alt) * lat.cos() * lon.cos(),
            (n + alt) * lat.cos() * lon.sin(),
            (n * (1.0 - WGS84.e2()) + alt) * lat.sin(),
        )
    }

    #[test]
    fn test_wgs84_derived_constants() {
        assert!((WGS84.b() - 6356.752_314_245).abs() < 1e-6);
        assert!((WGS84.e2() - 6.694_379_990_14e-3).abs() < 1e-12);
    }

    #[test]
    fn test_equator_surface_point() {
        let geo = geodetic_at_zero_gmst(WGS84.a, 0.0, 0.0);
        assert!(geo.latitude.abs() < DEG_TOLERANCE);
        assert!(geo.longitude.abs() < DEG_TOLERANCE);
        assert!(geo.altitude.abs() < KM_TOLERANCE);
    }

    #[test]
    fn test_north_pole_surface_point() {
        let geo = geodetic_at_zero_gmst(0.0, 0.0, WGS84.b());
        assert!((geo.latitude - 90.0).abs() < DEG_TOLERANCE);
        assert!(geo.altitude.abs() < KM_TOLERANCE);
    }

    #[test]
    fn test_south_pole_surface_point() {
        let geo = geodetic_at_zero_gmst(0.0, 0.0, -WGS84.b());
        assert!((geo.latitude + 90.0).abs() < DEG_TOLERANCE);
        assert!(geo.altitude.abs() < KM_TOLERANCE);
    }

    #[test]
    fn test_longitude_sign_convention() {
        let east = geodetic_at_zero_gmst(0.0, 7000.0, 0.0);
        assert!((east.longitude - 90.0).abs() < DEG_TOLERANCE);

        let west = geodetic_at_zero_gmst(0.0, -7000.0, 0.0);
        assert!((west.longitude + 90.0).abs() < DEG_TOLERANCE);
    }

    #[test]
    fn test_longitude_antimeridian_is_positive() {
        let geo = ecef_to_geodetic(&Vector3::new(-7000.0, -0.0, 0.0), &Iteration::default())
            .unwrap();
        assert!((geo.longitude - 180.0).abs() < DEG_TOLERANCE);
    }

    #[test]
    fn test_gmst_rotation_moves_longitude_west() {
        // A quarter turn of the Earth puts the inertial +X axis at -90° longitude
        let ecef = eci_to_ecef(&Vector3::new(7000.0, 0.0, 0.0), TAU / 4.0);
        let geo = ecef_to_geodetic(&ecef, &Iteration::default()).unwrap();
        assert!((geo.longitude + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_gmst_periodicity() {
        let position = Vector3::new(-4_400.594, 1_932.870, 4_760.712);
        for gmst in [0.0, 1.234, 4.5] {
            let a = ecef_to_geodetic(&eci_to_ecef(&position, gmst), &Iteration::default())
                .unwrap();
            let b = ecef_to_geodetic(&eci_to_ecef(&position, gmst + TAU), &Iteration::default())
                .unwrap();
            assert!((a.latitude - b.latitude).abs() < 1e-9);
            assert!((a.longitude - b.longitude).abs() < 1e-9);
            assert!((a.altitude - b.altitude).abs() < 1e-6);
        }
    }

    #[test]
    fn test_recovers_leo_fixtures() {
        let iteration = Iteration::default();
        for alt in [200.0, 420.0, 800.0, 1_400.0, 2_000.0] {
            for lat in [-89.0, -51.6, -12.5, 0.0, 33.3, 51.6, 70.0, 89.9] {
                for lon in [-179.5, -45.0, 0.0, 120.0, 180.0] {
                    let ecef = geodetic_to_ecef(lat, lon, alt);
                    let geo = ecef_to_geodetic(&ecef, &iteration).unwrap();
                    assert!(
                        (geo.latitude - lat).abs() < 1e-7,
                        "lat {lat} alt {alt}: got {}",
                        geo.latitude
                    );
                    assert!((geo.altitude - alt).abs() < 1e-5, "alt {alt}: got {}", geo.altitude);
                }
            }
        }
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let ecef = geodetic_to_ecef(45.0, 10.0, 500.0);
        let iteration = Iteration {
            max_iterations: 1,
            tolerance_rad: 1e-15,
        };
        let err = ecef_to_geodetic(&ecef, &iteration).unwrap_err();
        assert!(matches!(err, Error::NonConvergence { iterations: 1 }));
    }

    #[test]
    fn test_origin_produces_nan() {
        let geo = ecef_to_geodetic(&Vector3::default(), &Iteration::default()).unwrap();
        assert!(geo.is_nan());
    }

    #[test]
    fn test_transform_is_deterministic() {
        let at = Utc.with_ymd_and_hms(2020, 7, 12, 21, 16, 1).unwrap();
        let position = Vector3::new(2_328.97, -5_995.22, 1_719.97);
        let first = transform(&position, &at).unwrap();
        let second = transform(&position, &at).unwrap();
        assert_eq!(first, second);
        assert!(first.altitude > 200.0 && first.altitude < 2_000.0);
    }

    #[test]
    fn test_transform_matches_manual_pipeline() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 6, 30, 0).unwrap();
        let position = Vector3::new(6_778.0, 120.0, -40.0);
        let theta = gmst(julian_date_utc(&at));
        let manual = ecef_to_geodetic(&eci_to_ecef(&position, theta), &Iteration::default())
            .unwrap();
        assert_eq!(transform(&position, &at).unwrap(), manual);
    }

    #[test]
    fn test_geodetic_serializes_short_keys() {
        let geo = GeodeticCoordinate {
            latitude: 1.0,
            longitude: 2.0,
            altitude: 3.0,
        };
        let json = serde_json::to_string(&geo).unwrap();
        assert_eq!(json, r#"{"lat":1.0,"lon":2.0,"alt":3.0}"#);
    }

    #[test]
    fn test_vector_from_array_and_norm() {
        let v = Vector3::from([3.0, 4.0, 12.0]);
        assert_eq!(v, Vector3::new(3.0, 4.0, 12.0));
        assert!((v.norm() - 13.0).abs() < 1e-12);
    }
}
