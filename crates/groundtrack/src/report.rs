//! Current position plus past and future ground track.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TrackConfig;
use crate::error::Result;
use crate::frame::{transform_with, GeodeticCoordinate, Iteration, PositionVector, VelocityVector};
use crate::propagator::Propagator;
use crate::time::julian_date_utc;
use crate::track::{sample_track, sample_track_concurrent, GroundTrackSample};

/// Current position in both frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionReport {
    /// ECI position, km.
    pub vector: PositionVector,
    /// Sub-satellite point.
    pub geodetic: GeodeticCoordinate,
}

/// Everything known about a satellite around one reference instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteReport {
    /// The reference instant.
    pub timestamp: DateTime<Utc>,
    /// Position at the reference instant.
    pub position: PositionReport,
    /// ECI velocity at the reference instant, km/s.
    pub velocity: VelocityVector,
    /// Track ahead of the reference instant.
    pub future: Vec<GroundTrackSample>,
    /// Track behind the reference instant.
    pub past: Vec<GroundTrackSample>,
}

/// Build a report for `reference`.
///
/// # Errors
///
/// Fails if the propagator rejects the reference instant itself or its
/// position does not converge. Track offsets that fail are simply left out.
pub fn build_report<P: Propagator + ?Sized>(
    propagator: &P,
    reference: DateTime<Utc>,
    track: &TrackConfig,
    iteration: &Iteration,
) -> Result<SatelliteReport> {
    let (position, velocity) = current(propagator, reference, iteration)?;
    let future = sample_track(propagator, reference, &track.future_offsets(), iteration);
    let past = sample_track(propagator, reference, &track.past_offsets(), iteration);
    Ok(finish(reference, position, velocity, future, past))
}

/// Like [`build_report`], sampling the track offsets concurrently.
///
/// # Errors
///
/// Same conditions as [`build_report`].
pub async fn build_report_concurrent<P: Propagator + 'static>(
    propagator: Arc<P>,
    reference: DateTime<Utc>,
    track: &TrackConfig,
    iteration: Iteration,
) -> Result<SatelliteReport> {
    let (position, velocity) = current(propagator.as_ref(), reference, &iteration)?;
    let (future, past) = tokio::join!(
        sample_track_concurrent(
            Arc::clone(&propagator),
            reference,
            track.future_offsets(),
            iteration
        ),
        sample_track_concurrent(propagator, reference, track.past_offsets(), iteration),
    );
    Ok(finish(reference, position, velocity, future, past))
}

fn current<P: Propagator + ?Sized>(
    propagator: &P,
    reference: DateTime<Utc>,
    iteration: &Iteration,
) -> Result<(PositionReport, VelocityVector)> {
    let state = propagator.propagate(julian_date_utc(&reference))?;
    let geodetic = transform_with(&state.position, &reference, iteration)?;
    Ok((
        PositionReport {
            vector: state.position,
            geodetic,
        },
        state.velocity,
    ))
}

fn finish(
    timestamp: DateTime<Utc>,
    position: PositionReport,
    velocity: VelocityVector,
    future: Vec<GroundTrackSample>,
    past: Vec<GroundTrackSample>,
) -> SatelliteReport {
    info!(
        lat = position.geodetic.latitude,
        lon = position.geodetic.longitude,
        alt = position.geodetic.altitude,
        future = future.len(),
        past = past.len(),
        "Built satellite report"
    );
    SatelliteReport {
        timestamp,
        position,
        velocity,
        future,
        past,
    }
}
