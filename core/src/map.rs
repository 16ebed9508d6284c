//! Map vocabulary: the normalised layout produced by generation and the
//! world-space path graph enemies walk along.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Smallest total length a path graph ever reports.
pub const MIN_PATH_LENGTH: f32 = 1.0;

/// Axis-aligned rectangle in normalised `[0, 1]` coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RectN {
    /// Left edge.
    pub min_x: f32,
    /// Top edge.
    pub min_y: f32,
    /// Right edge.
    pub max_x: f32,
    /// Bottom edge.
    pub max_y: f32,
}

impl RectN {
    /// Rectangle covering the whole viewport.
    pub const FULL: RectN = RectN {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 1.0,
        max_y: 1.0,
    };
}

/// Decorative pool that blocks construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    /// Normalised centre.
    pub center: Vec2,
    /// Radius in grid cells.
    pub radius_cells: f32,
}

/// Layout produced by the map generator, stored resolution independent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    /// Seed that produced the layout.
    pub seed: u32,
    /// Environment identifier that produced the layout.
    pub env_id: u32,
    /// Bounds the generator worked inside.
    pub bounds_n: RectN,
    /// Path waypoints from spawn to goal.
    pub path_n: Vec<Vec2>,
    /// Power tile centres.
    pub power_tiles_n: Vec<Vec2>,
    /// Decorative pools.
    pub pools_n: Vec<Pool>,
    /// Whether the cramped-geometry fallback replaced the UI-constrained bounds.
    pub used_full_bounds: bool,
}

impl MapData {
    /// Builds the world-space path for a viewport of the given size.
    #[must_use]
    pub fn path_graph(&self, width: f32, height: f32) -> PathGraph {
        PathGraph::new(
            self.path_n
                .iter()
                .map(|point| denormalize(*point, width, height))
                .collect(),
        )
    }

    /// Power tile centres in world space.
    #[must_use]
    pub fn power_tile_points(&self, width: f32, height: f32) -> Vec<Vec2> {
        self.power_tiles_n
            .iter()
            .map(|point| denormalize(*point, width, height))
            .collect()
    }
}

fn denormalize(point: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(point.x * width, point.y * height)
}

/// Straight piece of the path with its cumulative arc length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSegment {
    /// Start point.
    pub start: Vec2,
    /// End point.
    pub end: Vec2,
    /// Length of the segment.
    pub length: f32,
    /// Arc length of the path before this segment.
    pub cumulative: f32,
}

impl PathSegment {
    /// Unit direction from start to end.
    #[must_use]
    pub fn direction(&self) -> Vec2 {
        (self.end - self.start).normalize_or_zero()
    }

    /// Shortest distance from the point to the segment.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        let span = self.end - self.start;
        let length_sq = span.length_squared();
        if length_sq <= f32::EPSILON {
            return point.distance(self.start);
        }
        let t = ((point - self.start).dot(span) / length_sq).clamp(0.0, 1.0);
        point.distance(self.start + span * t)
    }
}

/// Ordered polyline enemies follow, indexed by arc length.
#[derive(Clone, Debug, PartialEq)]
pub struct PathGraph {
    points: Vec<Vec2>,
    segments: Vec<PathSegment>,
    total_length: f32,
}

impl PathGraph {
    /// Builds a path from world-space waypoints.
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        let mut segments = Vec::with_capacity(points.len().saturating_sub(1));
        let mut cumulative = 0.0;
        for pair in points.windows(2) {
            let length = pair[0].distance(pair[1]);
            let length = if length.is_finite() { length } else { 0.0 };
            segments.push(PathSegment {
                start: pair[0],
                end: pair[1],
                length,
                cumulative,
            });
            cumulative += length;
        }
        Self {
            points,
            segments,
            total_length: cumulative.max(MIN_PATH_LENGTH),
        }
    }

    /// Waypoints of the path.
    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Segments with cumulative arc lengths.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Total arc length, never below [`MIN_PATH_LENGTH`].
    #[must_use]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    /// First waypoint, where enemies spawn.
    #[must_use]
    pub fn spawn(&self) -> Vec2 {
        self.points.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Last waypoint, where enemies leak.
    #[must_use]
    pub fn goal(&self) -> Vec2 {
        self.points.last().copied().unwrap_or(Vec2::ZERO)
    }

    fn segment_at(&self, distance: f32) -> Option<&PathSegment> {
        let index = self
            .segments
            .partition_point(|segment| segment.cumulative + segment.length < distance);
        self.segments
            .get(index.min(self.segments.len().saturating_sub(1)))
    }

    /// Point at the given arc length, clamped to the path ends.
    #[must_use]
    pub fn point_at(&self, distance: f32) -> Vec2 {
        let Some(segment) = self.segment_at(distance) else {
            return self.spawn();
        };
        if segment.length <= f32::EPSILON {
            return segment.end;
        }
        let t = ((distance - segment.cumulative) / segment.length).clamp(0.0, 1.0);
        segment.start.lerp(segment.end, t)
    }

    /// Direction of travel at the given arc length.
    #[must_use]
    pub fn direction_at(&self, distance: f32) -> Vec2 {
        self.segment_at(distance)
            .map_or(Vec2::X, PathSegment::direction)
    }

    /// Shortest distance from the point to any segment.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        if self.segments.is_empty() {
            return point.distance(self.spawn());
        }
        self.segments
            .iter()
            .map(|segment| segment.distance_to(point))
            .fold(f32::INFINITY, f32::min)
    }
}
