//! Rotated-rectangle geometry
//!
//! Shared value types for the detection decoders, the suppressor, and the
//! rectifier: rotated boxes in detector-grid space, the grid-to-source scale
//! ratios, and rotated-box intersection-over-union via polygon clipping.

/// A point in continuous pixel coordinates.
pub type Point = (f32, f32);

/// Rectangle defined by center, size, and rotation, as opposed to an
/// axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    /// Center (x, y)
    pub center: Point,
    /// Size (width, height)
    pub size: (f32, f32),
    /// Rotation in degrees
    pub angle_degrees: f32,
}

impl RotatedRect {
    /// Create a rotated rectangle.
    pub fn new(center: Point, size: (f32, f32), angle_degrees: f32) -> Self {
        Self {
            center,
            size,
            angle_degrees,
        }
    }

    /// The four corner points in fixed winding order: bottom-left, top-left,
    /// top-right, bottom-right.
    ///
    /// The winding order and the rotation convention are shared between the
    /// rectifier and the annotation drawing; the recognizer only reads text
    /// upright because both agree on it.
    pub fn corners(&self) -> [Point; 4] {
        let (cx, cy) = self.center;
        let (w, h) = self.size;
        let radians = self.angle_degrees.to_radians();
        let b = radians.cos() * 0.5;
        let a = radians.sin() * 0.5;

        let p0 = (cx - a * h - b * w, cy + b * h - a * w);
        let p1 = (cx + a * h - b * w, cy - b * h - a * w);
        let p2 = (2.0 * cx - p0.0, 2.0 * cy - p0.1);
        let p3 = (2.0 * cx - p1.0, 2.0 * cy - p1.1);

        [p0, p1, p2, p3]
    }

    /// Area of the rectangle.
    pub fn area(&self) -> f32 {
        self.size.0 * self.size.1
    }
}

/// Multiplicative factors mapping detector-grid coordinates to source-image
/// pixel coordinates. Computed once per run and reused for every box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRatios {
    pub ratio_width: f32,
    pub ratio_height: f32,
}

impl ScaleRatios {
    /// Ratios from source image dimensions and detector input dimensions.
    pub fn new(source_width: u32, source_height: u32, input_width: u32, input_height: u32) -> Self {
        Self {
            ratio_width: source_width as f32 / input_width as f32,
            ratio_height: source_height as f32 / input_height as f32,
        }
    }

    /// Map a grid-space point into source pixel space.
    pub fn apply(&self, point: Point) -> Point {
        (point.0 * self.ratio_width, point.1 * self.ratio_height)
    }
}

/// Intersection-over-union of two rotated rectangles.
///
/// Intersection area comes from clipping one corner quadrilateral against the
/// other (Sutherland-Hodgman); areas are shoelace sums.
pub fn rotated_iou(a: &RotatedRect, b: &RotatedRect) -> f32 {
    let area_a = a.area();
    let area_b = b.area();
    if area_a <= 0.0 || area_b <= 0.0 {
        return 0.0;
    }

    let intersection = polygon_area(&clip_polygon(&a.corners(), &b.corners()));
    let union = area_a + area_b - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}

/// Clip a subject polygon against a convex clip polygon (Sutherland-Hodgman).
fn clip_polygon(subject: &[Point], clip: &[Point]) -> Vec<Point> {
    let mut output: Vec<Point> = subject.to_vec();

    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let edge_start = clip[i];
        let edge_end = clip[(i + 1) % clip.len()];

        let input = output;
        output = Vec::with_capacity(input.len() + 1);

        for j in 0..input.len() {
            let current = input[j];
            let previous = input[(j + input.len() - 1) % input.len()];

            let current_inside = is_inside(edge_start, edge_end, current);
            let previous_inside = is_inside(edge_start, edge_end, previous);

            if current_inside {
                if !previous_inside {
                    if let Some(p) = line_intersection(previous, current, edge_start, edge_end) {
                        output.push(p);
                    }
                }
                output.push(current);
            } else if previous_inside {
                if let Some(p) = line_intersection(previous, current, edge_start, edge_end) {
                    output.push(p);
                }
            }
        }
    }

    output
}

/// Whether a point lies on the inner side of a directed clip edge.
///
/// `RotatedRect::corners` winds all quadrilaterals the same way, so the sign
/// convention here holds for every box the decoders emit.
fn is_inside(edge_start: Point, edge_end: Point, point: Point) -> bool {
    let (ex, ey) = (edge_end.0 - edge_start.0, edge_end.1 - edge_start.1);
    let (px, py) = (point.0 - edge_start.0, point.1 - edge_start.1);
    ex * py - ey * px >= 0.0
}

/// Intersection of segment (p1, p2) with the infinite line through (p3, p4).
fn line_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let d1 = (p2.0 - p1.0, p2.1 - p1.1);
    let d2 = (p4.0 - p3.0, p4.1 - p3.1);

    let denom = d1.0 * d2.1 - d1.1 * d2.0;
    if denom.abs() < 1e-12 {
        return None;
    }

    let t = ((p3.0 - p1.0) * d2.1 - (p3.1 - p1.1) * d2.0) / denom;
    Some((p1.0 + t * d1.0, p1.1 + t * d1.1))
}

/// Shoelace area of a polygon.
fn polygon_area(polygon: &[Point]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0f32;
    for i in 0..polygon.len() {
        let (x1, y1) = polygon[i];
        let (x2, y2) = polygon[(i + 1) % polygon.len()];
        sum += x1 * y2 - x2 * y1;
    }
    sum.abs() * 0.5
}
