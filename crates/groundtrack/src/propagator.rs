//! The orbit propagator boundary.
//!
//! The ground-track engine only needs "give me the inertial state at this
//! Julian date". [`Propagator`] is that seam; [`SgpPropagator`] fills it with the
//! `sgp4` crate so the binary has something real to drive.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::frame::{PositionVector, VelocityVector};
use crate::time::{julian_date, MINUTES_PER_DAY};

/// Inertial position and velocity at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    /// Position, km.
    pub position: PositionVector,
    /// Velocity, km/s.
    pub velocity: VelocityVector,
}

/// Something that can produce an ECI state for a Julian date.
///
/// Implementations must be deterministic and side-effect free; the sampler may
/// call them from several threads at once.
pub trait Propagator: Send + Sync {
    /// Propagate to `julian_date`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Propagation`] if no state can be produced for that instant.
    fn propagate(&self, julian_date: f64) -> Result<StateVector>;
}

/// Earth gravity model used to initialise SGP4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GravityModel {
    /// WGS84 constants.
    #[default]
    Wgs84,
    /// WGS72 constants, matching the AFSPC reference implementation.
    Wgs72,
}

impl std::fmt::Display for GravityModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wgs84 => write!(f, "wgs84"),
            Self::Wgs72 => write!(f, "wgs72"),
        }
    }
}

/// SGP4/SDP4 propagation of a two-line element set.
pub struct SgpPropagator {
    elements: sgp4::Elements,
    constants: sgp4::Constants,
    epoch_jd: f64,
}

impl std::fmt::Debug for SgpPropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SgpPropagator")
            .field("object_name", &self.elements.object_name)
            .field("norad_id", &self.elements.norad_id)
            .field("epoch", &self.elements.datetime)
            .finish_non_exhaustive()
    }
}

impl SgpPropagator {
    /// Parse a TLE and initialise the propagator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TleParse`] if the lines are malformed, or
    /// [`Error::Propagation`] if the elements cannot seed SGP4.
    pub fn from_tle(
        name: Option<String>,
        line1: &str,
        line2: &str,
        gravity: GravityModel,
    ) -> Result<Self> {
        let elements = sgp4::Elements::from_tle(name, line1.trim().as_bytes(), line2.trim().as_bytes())
            .map_err(|e| Error::tle_parse(e.to_string()))?;

        let constants = match gravity {
            GravityModel::Wgs84 => sgp4::Constants::from_elements(&elements),
            GravityModel::Wgs72 => sgp4::Constants::from_elements_afspc_compatibility_mode(&elements),
        }
        .map_err(|e| Error::propagation(e.to_string()))?;

        let epoch_jd = julian_date(&elements.datetime);
        debug!(
            norad_id = elements.norad_id,
            epoch = %elements.datetime,
            %gravity,
            "Initialised SGP4 propagator"
        );

        Ok(Self {
            elements,
            constants,
            epoch_jd,
        })
    }

    /// Julian Date of the element set epoch.
    #[must_use]
    pub fn epoch_julian_date(&self) -> f64 {
        self.epoch_jd
    }

    /// Catalogue number of the satellite.
    #[must_use]
    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    /// Object name from the title line, if one was supplied.
    #[must_use]
    pub fn object_name(&self) -> Option<&str> {
        self.elements.object_name.as_deref()
    }
}

impl Propagator for SgpPropagator {
    fn propagate(&self, julian_date: f64) -> Result<StateVector> {
        let minutes = (julian_date - self.epoch_jd) * MINUTES_PER_DAY;
        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| Error::propagation(e.to_string()))?;

        Ok(StateVector {
            position: prediction.position.into(),
            velocity: prediction.velocity.into(),
        })
    }
}
