use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{ObjectHandle, World};

/// Upper bound on overlap hits examined per scan.
pub const MAX_OVERLAP_RESULTS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Radius of the coarse overlap query around the interactor.
    pub detection_radius: f32,
    /// Seconds between scans.
    pub detection_interval: f32,
    pub max_results: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            detection_radius: 2.0,
            detection_interval: 0.2,
            max_results: MAX_OVERLAP_RESULTS,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectorConfigError {
    #[error("detection radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),
    #[error("detection interval must be finite and non-negative, got {0}")]
    InvalidInterval(f32),
    #[error("max results must be between 1 and {MAX_OVERLAP_RESULTS}, got {0}")]
    InvalidMaxResults(usize),
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<(), DetectorConfigError> {
        if !self.detection_radius.is_finite() || self.detection_radius < 0.0 {
            return Err(DetectorConfigError::InvalidRadius(self.detection_radius));
        }
        if !self.detection_interval.is_finite() || self.detection_interval < 0.0 {
            return Err(DetectorConfigError::InvalidInterval(self.detection_interval));
        }
        if !(1..=MAX_OVERLAP_RESULTS).contains(&self.max_results) {
            return Err(DetectorConfigError::InvalidMaxResults(self.max_results));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub handle: ObjectHandle,
    pub distance_squared: f32,
}

/// Throttled nearest-interactable query.
///
/// The snapshot is only replaced by [`InteractionDetector::scan`], so
/// consumers polling [`InteractionDetector::current_candidate`] between
/// scans keep seeing the previous result.
#[derive(Debug)]
pub struct InteractionDetector {
    config: DetectorConfig,
    overlap: Vec<ObjectHandle>,
    snapshot: Option<Detection>,
    next_scan_at: f64,
    scans: u64,
}

impl InteractionDetector {
    /// Does not validate `config`; hosts loading settings from files call
    /// [`DetectorConfig::validate`] first.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            overlap: Vec::with_capacity(config.max_results.min(MAX_OVERLAP_RESULTS)),
            config,
            snapshot: None,
            next_scan_at: 0.0,
            scans: 0,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn current_candidate(&self) -> Option<ObjectHandle> {
        self.snapshot.map(|detection| detection.handle)
    }

    pub fn current_detection(&self) -> Option<Detection> {
        self.snapshot
    }

    pub fn scan_count(&self) -> u64 {
        self.scans
    }

    /// Scans when the interval has elapsed since the previous scan. Returns
    /// whether a scan ran.
    pub fn tick(&mut self, now: f64, origin: Vec3, world: &World) -> bool {
        if now < self.next_scan_at {
            return false;
        }
        self.next_scan_at = now + f64::from(self.config.detection_interval.max(0.0));
        self.scan(origin, world);
        true
    }

    /// Runs a scan immediately, ignoring the throttle.
    pub fn scan(&mut self, origin: Vec3, world: &World) -> Option<Detection> {
        world.overlap_sphere(
            origin,
            self.config.detection_radius,
            &mut self.overlap,
            self.config.max_results,
        );
        let closest = select_closest(origin, world, &self.overlap);
        if closest.map(|d| d.handle) != self.current_candidate() {
            log::debug!(
                "closest interactable -> {}",
                closest
                    .and_then(|d| world.name_of(d.handle))
                    .unwrap_or("<none>")
            );
        }
        self.snapshot = closest;
        self.scans += 1;
        closest
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
        self.next_scan_at = 0.0;
    }
}

/// Picks the candidate with the smallest squared distance to its interaction
/// point among those within their own range. The first of equal distances
/// wins.
pub fn select_closest(origin: Vec3, world: &World, candidates: &[ObjectHandle]) -> Option<Detection> {
    let mut closest: Option<Detection> = None;
    for &handle in candidates {
        let Some(object) = world.get(handle) else {
            continue;
        };
        let Some(distance_squared) = object.reach_distance_squared(origin) else {
            continue;
        };
        if closest
            .map(|best| distance_squared < best.distance_squared)
            .unwrap_or(true)
        {
            closest = Some(Detection {
                handle,
                distance_squared,
            });
        }
    }
    closest
}
