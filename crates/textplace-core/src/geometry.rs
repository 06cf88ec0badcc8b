//! Affine transforms and axis-aligned bounding boxes in PDF user space.
//!
//! Matrices follow the PDF convention: a point is a row vector `[x y 1]`
//! multiplied on the right by
//!
//! ```text
//! | a b 0 |
//! | c d 0 |
//! | e f 1 |
//! ```
//!
//! so `m1.concat(&m2)` applies `m1` first and `m2` second.

/// A 2D affine transformation matrix `[a b c d e f]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    /// Horizontal scaling component.
    pub a: f64,
    /// Vertical skew component.
    pub b: f64,
    /// Horizontal skew component.
    pub c: f64,
    /// Vertical scaling component.
    pub d: f64,
    /// Horizontal translation.
    pub e: f64,
    /// Vertical translation.
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn from_array(values: [f64; 6]) -> Self {
        let [a, b, c, d, e, f] = values;
        Self { a, b, c, d, e, f }
    }

    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Counter-clockwise rotation by `radians` about the origin.
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Returns `self × other`: the transform that applies `self`, then `other`.
    pub fn concat(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Transform a displacement vector (the translation part is ignored).
    pub fn transform_vector(&self, dx: f64, dy: f64) -> (f64, f64) {
        (self.a * dx + self.c * dy, self.b * dx + self.d * dy)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// The inverse transform, or `None` when the matrix is singular.
    pub fn inverse(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        Some(Matrix {
            a: self.d / det,
            b: -self.b / det,
            c: -self.c / det,
            d: self.a / det,
            e: (self.c * self.f - self.d * self.e) / det,
            f: (self.b * self.e - self.a * self.f) / det,
        })
    }

    pub fn approx_eq(&self, other: &Matrix, tolerance: f64) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .all(|(x, y)| (x - y).abs() <= tolerance)
    }
}

/// Axis-aligned bounding box with `(x0, y0)` the lower-left corner and
/// `(x1, y1)` the upper-right corner, in PDF orientation (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    /// Create a box from two opposite corners, normalising their order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest box containing every point. Returns `None` for an empty input.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (x, y) = iter.next()?;
        let mut bbox = BBox {
            x0: x,
            y0: y,
            x1: x,
            y1: y,
        };
        for (x, y) in iter {
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Corners in counter-clockwise order starting at the lower-left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x0, self.y0),
            (self.x1, self.y0),
            (self.x1, self.y1),
            (self.x0, self.y1),
        ]
    }

    /// `[x0, y0, x1, y1]`.
    pub fn to_array(&self) -> [f64; 4] {
        [self.x0, self.y0, self.x1, self.y1]
    }

    /// `[x, y, width, height]` with `(x, y)` the lower-left corner.
    pub fn to_xywh(&self) -> [f64; 4] {
        [self.x0, self.y0, self.width(), self.height()]
    }

    /// Map the box through `matrix` and return the axis-aligned hull of the
    /// four transformed corners.
    ///
    /// All four corners are needed: under rotation or skew the image of the
    /// lower-left corner is not necessarily the minimum.
    pub fn transform(&self, matrix: &Matrix) -> BBox {
        let corners = self.corners().map(|(x, y)| matrix.transform_point(x, y));
        let mut bbox = BBox {
            x0: f64::INFINITY,
            y0: f64::INFINITY,
            x1: f64::NEG_INFINITY,
            y1: f64::NEG_INFINITY,
        };
        for (x, y) in corners {
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
        }
        bbox
    }

    pub fn approx_eq(&self, other: &BBox, tolerance: f64) -> bool {
        (self.x0 - other.x0).abs() <= tolerance
            && (self.y0 - other.y0).abs() <= tolerance
            && (self.x1 - other.x1).abs() <= tolerance
            && (self.y1 - other.y1).abs() <= tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn identity_leaves_points_unchanged() {
        assert_eq!(Matrix::IDENTITY.transform_point(3.5, -2.0), (3.5, -2.0));
        assert_eq!(Matrix::default(), Matrix::IDENTITY);
    }

    #[test]
    fn concat_applies_left_operand_first() {
        let scale = Matrix::scale(2.0, 3.0);
        let translate = Matrix::translation(10.0, 20.0);

        // scale then translate
        let st = scale.concat(&translate);
        assert_eq!(st.transform_point(1.0, 1.0), (12.0, 23.0));

        // translate then scale
        let ts = translate.concat(&scale);
        assert_eq!(ts.transform_point(1.0, 1.0), (22.0, 63.0));
    }

    #[test]
    fn transform_vector_ignores_translation() {
        let m = Matrix::new(2.0, 0.0, 0.0, 2.0, 100.0, 100.0);
        assert_eq!(m.transform_vector(1.0, 0.5), (2.0, 1.0));
    }

    #[test]
    fn rotation_quarter_turn() {
        let (x, y) = Matrix::rotation(FRAC_PI_2).transform_point(1.0, 0.0);
        assert!(x.abs() < EPS);
        assert!((y - 1.0).abs() < EPS);
    }

    #[test]
    fn inverse_round_trips_composite_transform() {
        let m = Matrix::new(2.0, 0.5, -0.25, 1.5, 30.0, -7.0);
        let inv = m.inverse().unwrap();
        assert!(m.concat(&inv).approx_eq(&Matrix::IDENTITY, EPS));
        assert!(inv.concat(&m).approx_eq(&Matrix::IDENTITY, EPS));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Matrix::new(1.0, 2.0, 2.0, 4.0, 0.0, 0.0).inverse().is_none());
        assert!(Matrix::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn bbox_new_normalises_corners() {
        let b = BBox::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(b, BBox { x0: 0.0, y0: 5.0, x1: 10.0, y1: 20.0 });
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 15.0);
        assert_eq!(b.to_xywh(), [0.0, 5.0, 10.0, 15.0]);
    }

    #[test]
    fn bbox_union_and_from_points() {
        let a = BBox::new(0.0, 0.0, 5.0, 5.0);
        let b = BBox::new(3.0, -2.0, 8.0, 4.0);
        assert_eq!(a.union(&b), BBox::new(0.0, -2.0, 8.0, 5.0));

        let hull = BBox::from_points([(1.0, 9.0), (-3.0, 2.0), (4.0, 4.0)]).unwrap();
        assert_eq!(hull, BBox::new(-3.0, 2.0, 4.0, 9.0));
        assert!(BBox::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn transform_translation_shifts_box() {
        let b = BBox::new(0.0, -3.0, 20.0, 9.0);
        let moved = b.transform(&Matrix::translation(100.0, 700.0));
        assert!(moved.approx_eq(&BBox::new(100.0, 697.0, 120.0, 709.0), EPS));
    }

    #[test]
    fn transform_rotation_uses_all_corners() {
        // A quarter turn maps the lower-left corner to the lower-right of the result.
        let b = BBox::new(0.0, 0.0, 10.0, 2.0);
        let rotated = b.transform(&Matrix::rotation(FRAC_PI_2));
        assert!(rotated.approx_eq(&BBox::new(-2.0, 0.0, 0.0, 10.0), EPS));
    }

    #[test]
    fn transform_skew_expands_hull() {
        let b = BBox::new(0.0, 0.0, 10.0, 10.0);
        let skew = Matrix::new(1.0, 0.0, 0.5, 1.0, 0.0, 0.0);
        let out = b.transform(&skew);
        assert!(out.approx_eq(&BBox::new(0.0, 0.0, 15.0, 10.0), EPS));
    }

    #[test]
    fn rotation_followed_by_inverse_restores_global_box() {
        let local = BBox::new(0.0, -2.5, 37.0, 9.5);
        let text_matrix = Matrix::translation(100.0, 700.0);
        let rotated_ctm = Matrix::rotation(FRAC_PI_2);
        let inverse = rotated_ctm.inverse().unwrap();

        let plain = local.transform(&text_matrix);
        let round_trip = local.transform(&text_matrix.concat(&rotated_ctm).concat(&inverse));
        assert!(round_trip.approx_eq(&plain, 1e-6));
    }
}
