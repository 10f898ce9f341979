//! Transform-string to matrix conversion.

use crate::error::{Error, Result};
use crate::matrix::{Dimension, Matrix};
use std::str::FromStr;

/// Converts a computed `transform` value into a matrix.
///
/// 2D values come back as 3×3 matrices and inherently 3D values as 4×4 ones; the walker uses
/// that distinction to decide when a resolution run must be promoted.
pub trait TransformParser {
    fn parse_transform(&self, value: &str) -> Result<Matrix>;
}

impl<T: TransformParser + ?Sized> TransformParser for &T {
    fn parse_transform(&self, value: &str) -> Result<Matrix> {
        (**self).parse_transform(value)
    }
}

/// Parser for computed style values.
///
/// Browsers serialize computed transforms as `none`, `matrix(...)` or `matrix3d(...)`.
/// Anything else is handed to the SVG transform-list grammar, which covers presentation
/// attributes such as `translate(10 20) rotate(30)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputedTransformParser;

impl TransformParser for ComputedTransformParser {
    fn parse_transform(&self, value: &str) -> Result<Matrix> {
        let text = value.trim();
        if text.is_empty() || text == "none" {
            return Ok(Matrix::identity(Dimension::Planar));
        }
        if let Some(args) = function_args(text, "matrix3d") {
            let values = parse_numbers(value, args)?;
            if values.len() != 16 {
                return Err(Error::TransformParse {
                    value: value.to_string(),
                    message: format!("matrix3d() takes 16 values, got {}", values.len()),
                });
            }
            return Matrix::from_flat(&values);
        }
        let ts = svgtypes::Transform::from_str(text).map_err(|err| Error::TransformParse {
            value: value.to_string(),
            message: err.to_string(),
        })?;
        Ok(Matrix::from_affine(ts.a, ts.b, ts.c, ts.d, ts.e, ts.f))
    }
}

fn function_args<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(name)?.trim_start();
    let rest = rest.strip_prefix('(')?;
    rest.strip_suffix(')')
}

fn parse_numbers(value: &str, args: &str) -> Result<Vec<f64>> {
    svgtypes::NumberListParser::from(args)
        .map(|n| {
            n.map_err(|err| Error::TransformParse {
                value: value.to_string(),
                message: err.to_string(),
            })
        })
        .collect()
}
