//! Ground-track sampling.
//!
//! A track is built by propagating to a series of minute offsets around a
//! reference instant and projecting each position onto the ellipsoid. Sampling
//! is best effort: an offset the propagator rejects, or whose latitude
//! iteration fails, is dropped and the rest of the track is still returned.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::error::Result;
use crate::frame::{transform_with, GeodeticCoordinate, Iteration};
use crate::propagator::Propagator;
use crate::time::{julian_date_utc, offset_minutes};

/// A geodetic point tagged with its offset from the reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTrackSample {
    /// Signed offset from the reference instant, minutes.
    pub offset_minutes: i64,
    /// Sub-satellite point at that offset.
    #[serde(flatten)]
    pub geodetic: GeodeticCoordinate,
}

/// Sample the ground track at each offset, in the order given.
///
/// Offsets whose propagation or transform fails are skipped.
pub fn sample_track<P: Propagator + ?Sized>(
    propagator: &P,
    reference: DateTime<Utc>,
    offsets: &[i64],
    iteration: &Iteration,
) -> Vec<GroundTrackSample> {
    offsets
        .iter()
        .filter_map(|&offset| sample_one(propagator, reference, offset, iteration))
        .collect()
}

/// Like [`sample_track`], but propagates every offset on its own blocking task.
///
/// The result keeps the caller's offset order regardless of which task
/// finishes first.
pub async fn sample_track_concurrent<P: Propagator + 'static>(
    propagator: Arc<P>,
    reference: DateTime<Utc>,
    offsets: Vec<i64>,
    iteration: Iteration,
) -> Vec<GroundTrackSample> {
    let mut tasks = JoinSet::new();
    for (index, offset) in offsets.into_iter().enumerate() {
        let propagator = Arc::clone(&propagator);
        tasks.spawn_blocking(move || {
            (
                index,
                sample_one(propagator.as_ref(), reference, offset, &iteration),
            )
        });
    }

    let mut slots = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(slot) => slots.push(slot),
            Err(e) => warn!("Sampling task failed: {}", e),
        }
    }

    slots.sort_unstable_by_key(|(index, _)| *index);
    slots.into_iter().filter_map(|(_, sample)| sample).collect()
}

fn sample_one<P: Propagator + ?Sized>(
    propagator: &P,
    reference: DateTime<Utc>,
    offset: i64,
    iteration: &Iteration,
) -> Option<GroundTrackSample> {
    match try_sample(propagator, reference, offset, iteration) {
        Ok(sample) => Some(sample),
        Err(e) => {
            debug!(offset, "Dropping track sample: {}", e);
            None
        }
    }
}

fn try_sample<P: Propagator + ?Sized>(
    propagator: &P,
    reference: DateTime<Utc>,
    offset: i64,
    iteration: &Iteration,
) -> Result<GroundTrackSample> {
    let at = offset_minutes(reference, offset)?;
    let state = propagator.propagate(julian_date_utc(&at))?;
    let geodetic = transform_with(&state.position, &at, iteration)?;
    Ok(GroundTrackSample {
        offset_minutes: offset,
        geodetic,
    })
}

/// Evenly spaced offsets `start, start + step, ...` up to and including `end`.
///
/// Works in either direction; a `step` of zero yields only `start`.
#[must_use]
pub fn offsets(start: i64, end: i64, step: u32) -> Vec<i64> {
    let step = i64::from(step);
    if step == 0 {
        return vec![start];
    }
    let step = if end < start { -step } else { step };

    let mut out = Vec::new();
    let mut current = start;
    while (step > 0 && current <= end) || (step < 0 && current >= end) {
        out.push(current);
        current += step;
    }
    out
}

/// Break a sequence of points into runs that never jump across the
/// antimeridian, so each run can be drawn as a single polyline.
#[must_use]
pub fn split_at_dateline(points: &[GeodeticCoordinate]) -> Vec<Vec<GeodeticCoordinate>> {
    let Some((first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut segments = Vec::new();
    let mut current = vec![*first];
    for point in rest {
        let previous = current[current.len() - 1];
        if (point.longitude - previous.longitude).abs() > 180.0 {
            segments.push(std::mem::take(&mut current));
        }
        current.push(*point);
    }
    segments.push(current);
    segments
}
