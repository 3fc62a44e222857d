//! Plane analytic geometry: lines `a x + b y + c = 0`, circles, and affine
//! transforms of triangles in homogeneous coordinates.

use anyhow::{bail, Result};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

const GEOMETRY_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

/// The line `a x + b y + c = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Line {
    pub fn new(a: f64, b: f64, c: f64) -> Result<Self> {
        if a == 0.0 && b == 0.0 {
            bail!("Line coefficients a and b cannot both be zero.");
        }
        Ok(Self { a, b, c })
    }

    fn normal_norm_sq(&self) -> f64 {
        self.a * self.a + self.b * self.b
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Result<Self> {
        if !(radius >= 0.0) {
            bail!("Circle radius must be non-negative, got {}.", radius);
        }
        Ok(Self { center, radius })
    }
}

/// Intersection of two lines by Cramer's rule. Parallel or coincident lines
/// have no single intersection and give `None`.
pub fn line_intersection(l1: &Line, l2: &Line) -> Option<Point> {
    let det = l1.a * l2.b - l2.a * l1.b;
    if det.abs() < GEOMETRY_EPS {
        return None;
    }
    let x = (l1.b * l2.c - l2.b * l1.c) / det;
    let y = (l2.a * l1.c - l1.a * l2.c) / det;
    Some(Point::new(x, y))
}

/// Intersections of a line with a circle: none, one tangent point, or two.
pub fn line_circle_intersections(line: &Line, circle: &Circle) -> Vec<Point> {
    let (cx, cy) = (circle.center.x, circle.center.y);
    let norm_sq = line.normal_norm_sq();
    let r_sq = circle.radius * circle.radius;

    // line equation with the circle centre moved to the origin
    let c_shifted = line.a * cx + line.b * cy + line.c;
    let dist_sq = c_shifted * c_shifted / norm_sq;
    if dist_sq > r_sq + GEOMETRY_EPS {
        return Vec::new();
    }

    let x0 = -line.a * c_shifted / norm_sq;
    let y0 = -line.b * c_shifted / norm_sq;
    if (dist_sq - r_sq).abs() < GEOMETRY_EPS {
        return vec![Point::new(x0 + cx, y0 + cy)];
    }

    let half_chord = (r_sq - dist_sq).sqrt();
    let mult = half_chord / norm_sq.sqrt();
    vec![
        Point::new(x0 + line.b * mult + cx, y0 - line.a * mult + cy),
        Point::new(x0 - line.b * mult + cx, y0 + line.a * mult + cy),
    ]
}

/// Intersections of two circles through their radical line.
pub fn circle_intersections(c1: &Circle, c2: &Circle) -> Result<Vec<Point>> {
    let a = 2.0 * (c2.center.x - c1.center.x);
    let b = 2.0 * (c2.center.y - c1.center.y);
    if a == 0.0 && b == 0.0 {
        if (c1.radius - c2.radius).abs() < GEOMETRY_EPS {
            bail!("Circles coincide; they share infinitely many points.");
        }
        return Ok(Vec::new());
    }
    let c = c1.center.x.powi(2) + c1.center.y.powi(2)
        - c1.radius.powi(2)
        - (c2.center.x.powi(2) + c2.center.y.powi(2) - c2.radius.powi(2));
    let radical = Line::new(a, b, c)?;
    Ok(line_circle_intersections(&radical, c1))
}

/// Foot of the perpendicular dropped from `point` onto `line`.
pub fn foot_of_perpendicular(point: &Point, line: &Line) -> Point {
    let k = (line.a * point.x + line.b * point.y + line.c) / line.normal_norm_sq();
    Point::new(point.x - line.a * k, point.y - line.b * k)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub vertices: [Point; 3],
}

impl Triangle {
    pub fn new(p1: Point, p2: Point, p3: Point) -> Self {
        Self {
            vertices: [p1, p2, p3],
        }
    }

    /// Applies a 3x3 matrix to each vertex in homogeneous coordinates
    /// `[x, y, 1]`. The bottom row is ignored.
    pub fn apply_transform(&mut self, matrix: &Matrix3<f64>) {
        for vertex in &mut self.vertices {
            let mapped = matrix * Vector3::new(vertex.x, vertex.y, 1.0);
            *vertex = Point::new(mapped[0], mapped[1]);
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        let m = Matrix3::new(1.0, 0.0, dx, 0.0, 1.0, dy, 0.0, 0.0, 1.0);
        self.apply_transform(&m);
    }

    pub fn scale(&mut self, s: f64) {
        let m = Matrix3::new(s, 0.0, 0.0, 0.0, s, 0.0, 0.0, 0.0, 1.0);
        self.apply_transform(&m);
    }

    /// Counter-clockwise rotation about the origin.
    pub fn rotate(&mut self, angle_deg: f64) {
        let (s, c) = angle_deg.to_radians().sin_cos();
        let m = Matrix3::new(c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0);
        self.apply_transform(&m);
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [p1, p2, p3] = &self.vertices;
        write!(f, "Triangle: [{p1}, {p2}, {p3}]")
    }
}
