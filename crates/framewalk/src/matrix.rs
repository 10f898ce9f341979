//! Homogeneous 2D (3×3) and 3D (4×4) matrices.
//!
//! Flat representations are column-major, matching CSS `matrix3d()` argument order, so a 3×3
//! matrix `[a, b, 0, c, d, 0, e, f, 1]` is the CSS `matrix(a, b, c, d, e, f)`.

use crate::error::{Error, Result};
use crate::geom::{Point, Vector, point, vector};
use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// 3×3 homogeneous.
    #[default]
    Planar,
    /// 4×4 homogeneous.
    Spatial,
}

impl Dimension {
    pub fn size(self) -> usize {
        match self {
            Dimension::Planar => 3,
            Dimension::Spatial => 4,
        }
    }

    pub fn flat_len(self) -> usize {
        self.size() * self.size()
    }

    pub fn from_flat_len(len: usize) -> Option<Self> {
        match len {
            9 => Some(Dimension::Planar),
            16 => Some(Dimension::Spatial),
            _ => None,
        }
    }

    pub fn is_3d(self) -> bool {
        matches!(self, Dimension::Spatial)
    }

    /// The dimension able to hold both operands. Promotion only ever goes 3 → 4.
    pub fn max(self, other: Dimension) -> Dimension {
        if self.is_3d() || other.is_3d() {
            Dimension::Spatial
        } else {
            Dimension::Planar
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Matrix {
    Planar(Matrix3<f64>),
    Spatial(Matrix4<f64>),
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix::identity(Dimension::Planar)
    }
}

impl Matrix {
    pub fn identity(dim: Dimension) -> Self {
        match dim {
            Dimension::Planar => Matrix::Planar(Matrix3::identity()),
            Dimension::Spatial => Matrix::Spatial(Matrix4::identity()),
        }
    }

    pub fn translation(dim: Dimension, offset: Vector) -> Self {
        match dim {
            Dimension::Planar => {
                let mut m = Matrix3::identity();
                m[(0, 2)] = offset.x;
                m[(1, 2)] = offset.y;
                Matrix::Planar(m)
            }
            Dimension::Spatial => {
                let mut m = Matrix4::identity();
                m[(0, 3)] = offset.x;
                m[(1, 3)] = offset.y;
                Matrix::Spatial(m)
            }
        }
    }

    pub fn scale(dim: Dimension, sx: f64, sy: f64) -> Self {
        let mut m = Matrix::identity(dim);
        m.set(0, 0, sx);
        m.set(1, 1, sy);
        m
    }

    /// Builds the 2D matrix of CSS `matrix(a, b, c, d, e, f)`.
    pub fn from_affine(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Matrix::Planar(Matrix3::new(a, c, e, b, d, f, 0.0, 0.0, 1.0))
    }

    /// Column-major flat values; only lengths 9 and 16 are accepted.
    pub fn from_flat(values: &[f64]) -> Result<Self> {
        match Dimension::from_flat_len(values.len()) {
            Some(Dimension::Planar) => Ok(Matrix::Planar(Matrix3::from_column_slice(values))),
            Some(Dimension::Spatial) => Ok(Matrix::Spatial(Matrix4::from_column_slice(values))),
            None => Err(Error::InvalidMatrixLength { len: values.len() }),
        }
    }

    pub fn to_flat(&self) -> Vec<f64> {
        match self {
            Matrix::Planar(m) => m.as_slice().to_vec(),
            Matrix::Spatial(m) => m.as_slice().to_vec(),
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Matrix::Planar(_) => Dimension::Planar,
            Matrix::Spatial(_) => Dimension::Spatial,
        }
    }

    pub fn is_3d(&self) -> bool {
        self.dimension().is_3d()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        match self {
            Matrix::Planar(m) => m[(row, col)],
            Matrix::Spatial(m) => m[(row, col)],
        }
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        match self {
            Matrix::Planar(m) => m[(row, col)] = value,
            Matrix::Spatial(m) => m[(row, col)] = value,
        }
    }

    /// Re-expresses the matrix in `dim`.
    ///
    /// Going 3 → 4 keeps the x/y block, the translation column and the projective row and
    /// inserts an identity z axis. Going 4 → 3 drops the z row and column.
    pub fn embed(&self, dim: Dimension) -> Self {
        match (self, dim) {
            (Matrix::Planar(_), Dimension::Planar) | (Matrix::Spatial(_), Dimension::Spatial) => {
                *self
            }
            (Matrix::Planar(m), Dimension::Spatial) => {
                let mut out = Matrix4::identity();
                for (r3, r4) in [(0, 0), (1, 1), (2, 3)] {
                    for (c3, c4) in [(0, 0), (1, 1), (2, 3)] {
                        out[(r4, c4)] = m[(r3, c3)];
                    }
                }
                Matrix::Spatial(out)
            }
            (Matrix::Spatial(m), Dimension::Planar) => {
                let mut out = Matrix3::identity();
                for (r3, r4) in [(0, 0), (1, 1), (2, 3)] {
                    for (c3, c4) in [(0, 0), (1, 1), (2, 3)] {
                        out[(r3, c3)] = m[(r4, c4)];
                    }
                }
                Matrix::Planar(out)
            }
        }
    }

    /// `self · rhs`, promoting the smaller operand first.
    pub fn multiply(&self, rhs: &Matrix) -> Matrix {
        let dim = self.dimension().max(rhs.dimension());
        match (self.embed(dim), rhs.embed(dim)) {
            (Matrix::Planar(a), Matrix::Planar(b)) => Matrix::Planar(a * b),
            (Matrix::Spatial(a), Matrix::Spatial(b)) => Matrix::Spatial(a * b),
            _ => unreachable!("operands share a dimension after embedding"),
        }
    }

    /// `T(origin) · self · T(-origin)`: the matrix applied around `origin` instead of (0, 0).
    pub fn about_origin(&self, origin: Point) -> Matrix {
        let dim = self.dimension();
        let to = Matrix::translation(dim, origin.to_vector());
        let back = Matrix::translation(dim, -origin.to_vector());
        to.multiply(self).multiply(&back)
    }

    pub fn inverse(&self) -> Option<Matrix> {
        match self {
            Matrix::Planar(m) => m.try_inverse().map(Matrix::Planar),
            Matrix::Spatial(m) => m.try_inverse().map(Matrix::Spatial),
        }
    }

    /// Maps a point (z = 0) and divides by the homogeneous coordinate when it is non-zero.
    pub fn transform_point(&self, p: Point) -> Point {
        let (x, y, w) = match self {
            Matrix::Planar(m) => {
                let v = m * Vector3::new(p.x, p.y, 1.0);
                (v.x, v.y, v.z)
            }
            Matrix::Spatial(m) => {
                let v = m * Vector4::new(p.x, p.y, 0.0, 1.0);
                (v.x, v.y, v.w)
            }
        };
        if w == 0.0 || w == 1.0 {
            point(x, y)
        } else {
            point(x / w, y / w)
        }
    }

    /// Translation column divided by the homogeneous corner.
    pub fn translation_part(&self) -> Vector {
        let last = self.dimension().size() - 1;
        let w = self.get(last, last);
        let w = if w == 0.0 { 1.0 } else { w };
        vector(self.get(0, last) / w, self.get(1, last) / w)
    }

    /// Clears the last row and column, keeping a 1 in the corner.
    pub fn without_translation(&self) -> Matrix {
        let mut out = *self;
        let last = self.dimension().size() - 1;
        for i in 0..=last {
            out.set(i, last, 0.0);
            out.set(last, i, 0.0);
        }
        out.set(last, last, 1.0);
        out
    }

    pub fn is_identity(&self) -> bool {
        *self == Matrix::identity(self.dimension())
    }

    pub fn approx_eq(&self, other: &Matrix, epsilon: f64) -> bool {
        let dim = self.dimension().max(other.dimension());
        self.embed(dim)
            .to_flat()
            .iter()
            .zip(other.embed(dim).to_flat())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }

    /// CSS text for the matrix: `matrix3d(...)` when `is_3d`, otherwise `matrix(a,b,c,d,e,f)`.
    pub fn to_css(&self, is_3d: bool) -> String {
        let mut out = String::new();
        if is_3d {
            out.push_str("matrix3d(");
            push_numbers(&mut out, &self.embed(Dimension::Spatial).to_flat());
        } else {
            let flat = self.embed(Dimension::Planar).to_flat();
            out.push_str("matrix(");
            push_numbers(
                &mut out,
                &[flat[0], flat[1], flat[3], flat[4], flat[6], flat[7]],
            );
        }
        out.push(')');
        out
    }
}

fn push_numbers(out: &mut String, values: &[f64]) {
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let v = if *v == 0.0 { 0.0 } else { *v };
        let _ = write!(out, "{v}");
    }
}

impl std::ops::Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        self.multiply(&rhs)
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_flat().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Matrix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<f64>::deserialize(deserializer)?;
        Matrix::from_flat(&values).map_err(serde::de::Error::custom)
    }
}
