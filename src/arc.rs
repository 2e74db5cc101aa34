use std::f64::consts::{PI, TAU};

use crate::pie::Angles;

const EPSILON: f64 = 1e-12;

/// Maximum angle between two sampled points of a polygon outline
const SAMPLE_STEP: f64 = TAU / 180.0;

/// Annular sector generator for donut slices
///
/// Coordinates are relative to the donut centre with y growing downwards, so
/// angle 0 points straight up and angles grow clockwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcShape {
    pub outer_radius: f64,
    pub inner_radius: f64,
}

impl ArcShape {
    pub fn new(outer_radius: f64, inner_radius: f64) -> Self {
        ArcShape {
            outer_radius,
            inner_radius,
        }
    }

    /// Point on the circle of `radius` at `angle`
    pub fn point(radius: f64, angle: f64) -> (f64, f64) {
        (radius * angle.sin(), -radius * angle.cos())
    }

    /// SVG path data for the sector
    pub fn path(&self, angles: &Angles) -> String {
        let (a0, a1) = (angles.start, angles.end);
        let da = (a1 - a0).abs();
        let (r0, r1) = (self.inner_radius, self.outer_radius);
        let mut d = String::new();

        if r1 <= EPSILON {
            return "M0,0Z".to_string();
        }

        if da > TAU - 1e-6 {
            // Full ring: two half circles outside, two inside in reverse
            let (sx, sy) = Self::point(r1, a0);
            let (mx, my) = Self::point(r1, a0 + PI);
            d.push_str(&format!(
                "M{},{}A{},{},0,1,1,{},{}A{},{},0,1,1,{},{}",
                fmt(sx), fmt(sy), fmt(r1), fmt(r1), fmt(mx), fmt(my),
                fmt(r1), fmt(r1), fmt(sx), fmt(sy)
            ));
            if r0 > EPSILON {
                let (sx, sy) = Self::point(r0, a0);
                let (mx, my) = Self::point(r0, a0 + PI);
                d.push_str(&format!(
                    "M{},{}A{},{},0,1,0,{},{}A{},{},0,1,0,{},{}",
                    fmt(sx), fmt(sy), fmt(r0), fmt(r0), fmt(mx), fmt(my),
                    fmt(r0), fmt(r0), fmt(sx), fmt(sy)
                ));
            }
            d.push('Z');
            return d;
        }

        let large = if da > PI { 1 } else { 0 };
        let sweep = if a1 >= a0 { 1 } else { 0 };
        let (ox0, oy0) = Self::point(r1, a0);
        let (ox1, oy1) = Self::point(r1, a1);
        d.push_str(&format!(
            "M{},{}A{},{},0,{},{},{},{}",
            fmt(ox0), fmt(oy0), fmt(r1), fmt(r1), large, sweep, fmt(ox1), fmt(oy1)
        ));
        if r0 > EPSILON {
            let (ix1, iy1) = Self::point(r0, a1);
            let (ix0, iy0) = Self::point(r0, a0);
            d.push_str(&format!(
                "L{},{}A{},{},0,{},{},{},{}",
                fmt(ix1), fmt(iy1), fmt(r0), fmt(r0), large, 1 - sweep, fmt(ix0), fmt(iy0)
            ));
        } else {
            d.push_str("L0,0");
        }
        d.push('Z');
        d
    }

    /// Outline of the sector as a closed polygon around `center`
    ///
    /// The outer edge runs from start to end and the inner edge back again.
    pub fn polygon(&self, angles: &Angles, center: (f64, f64)) -> Vec<(f64, f64)> {
        let (a0, a1) = (angles.start, angles.end);
        let steps = ((a1 - a0).abs() / SAMPLE_STEP).ceil().max(1.0) as usize;
        let mut points = Vec::with_capacity(2 * (steps + 1));

        for i in 0..=steps {
            let a = a0 + (a1 - a0) * i as f64 / steps as f64;
            let (x, y) = Self::point(self.outer_radius, a);
            points.push((center.0 + x, center.1 + y));
        }
        for i in (0..=steps).rev() {
            let a = a0 + (a1 - a0) * i as f64 / steps as f64;
            let (x, y) = Self::point(self.inner_radius, a);
            points.push((center.0 + x, center.1 + y));
        }
        points
    }

    /// Whether a point relative to the centre lies inside the sector
    pub fn contains(&self, angles: &Angles, dx: f64, dy: f64) -> bool {
        let r = dx.hypot(dy);
        if r < self.inner_radius || r > self.outer_radius {
            return false;
        }
        let (lo, hi) = if angles.start <= angles.end {
            (angles.start, angles.end)
        } else {
            (angles.end, angles.start)
        };
        if hi - lo <= EPSILON {
            return false;
        }
        if hi - lo >= TAU - EPSILON {
            return true;
        }
        let angle = pointer_angle(dx, dy);
        (lo..hi).contains(&angle)
    }

    /// Midpoint of the sector, halfway between both radii
    pub fn centroid(&self, angles: &Angles) -> (f64, f64) {
        let r = (self.inner_radius + self.outer_radius) / 2.0;
        Self::point(r, (angles.start + angles.end) / 2.0)
    }
}

/// Angle of a point relative to the centre, in `[0, TAU)`
pub fn pointer_angle(dx: f64, dy: f64) -> f64 {
    let angle = dx.atan2(-dy);
    if angle < 0.0 { angle + TAU } else { angle }
}

fn fmt(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    // Avoid "-0" in the output
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}
