//! `groundtrack` - Satellite ground tracks from two-line element sets
//!
//! This library converts inertial orbit positions into geodetic coordinates on
//! the WGS84 ellipsoid and samples them over a window of minute offsets to
//! build a ground track.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod frame;
pub mod logging;
pub mod propagator;
pub mod report;
pub mod storage;
pub mod time;
pub mod tle;
pub mod track;

pub use config::Config;
pub use error::{Error, Result};
pub use frame::{transform, GeodeticCoordinate, Iteration, PositionVector, Vector3, VelocityVector};
pub use logging::init_logging;
pub use propagator::{GravityModel, Propagator, SgpPropagator, StateVector};
pub use report::{build_report, build_report_concurrent, SatelliteReport};
pub use storage::{TleStore, UpsertOutcome};
pub use tle::TleRecord;
pub use track::{sample_track, sample_track_concurrent, split_at_dateline, GroundTrackSample};
