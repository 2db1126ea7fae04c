//! Plane geometry over flat `[x0, y0, x1, y1, ...]` coordinate sequences.
//!
//! Elements store their vertices as a flat list of pixel coordinates, the same
//! layout the drawing canvas consumes. Everything here is pure; conversion to
//! real-world units happens through a single `meters_per_pixel` factor derived
//! from the drawing settings.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::camera::Point;

/// Iterate the `(x, y)` pairs of a flat coordinate sequence.
///
/// A trailing unpaired coordinate is ignored.
pub fn vertices(points: &[f64]) -> impl Iterator<Item = Point> + '_ {
    points.chunks_exact(2).map(|pair| Point::new(pair[0], pair[1]))
}

/// Number of complete vertices in a flat coordinate sequence.
#[must_use]
pub fn vertex_count(points: &[f64]) -> usize {
    points.len() / 2
}

/// Enclosed area of a closed polygon in real-world square units.
///
/// Uses the shoelace formula over consecutive vertices, wrapping the last
/// vertex back to the first. The pixel-space area is scaled by
/// `meters_per_pixel²`. Fewer than three vertices yields `0.0`. Winding
/// direction does not affect the result.
#[must_use]
pub fn compute_area(points: &[f64], meters_per_pixel: f64) -> f64 {
    let n = vertex_count(points);
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        let (xi, yi) = (points[2 * i], points[2 * i + 1]);
        let (xj, yj) = (points[2 * j], points[2 * j + 1]);
        twice_area += xi * yj - xj * yi;
    }

    let pixel_area = twice_area.abs() / 2.0;
    pixel_area * meters_per_pixel * meters_per_pixel
}

/// Round a pixel coordinate to the nearest grid line.
///
/// A non-positive or non-finite `grid_size` leaves the value unchanged.
#[must_use]
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if !(grid_size.is_finite() && grid_size > 0.0) {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Snap both coordinates of a point to the grid.
#[must_use]
pub fn snap_point(point: Point, grid_size: f64) -> Point {
    Point::new(snap_to_grid(point.x, grid_size), snap_to_grid(point.y, grid_size))
}

/// Euclidean length of an open polyline, in real-world units.
#[must_use]
pub fn polyline_length(points: &[f64], meters_per_pixel: f64) -> f64 {
    let pts: Vec<Point> = vertices(points).collect();
    let pixels: f64 = pts
        .windows(2)
        .map(|w| (w[1].x - w[0].x).hypot(w[1].y - w[0].y))
        .sum();
    pixels * meters_per_pixel
}
