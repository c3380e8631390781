//! Numeric ranges.
//!
//! A range has inclusive bounds, either of which may be omitted, and a
//! non-zero step. When no step is written it is `-1` if both bounds are
//! present and descending, otherwise `1`. Open ranges are legal values (they
//! are how slicers express "to the end") but cannot be iterated.

use std::fmt;

use slate_types::Type;

use super::Value;
use crate::errors::{domain_error, open_range, zero_step, EvalError, EvalResult};

/// A range over `int` or `float`.
#[derive(Clone, Debug, PartialEq)]
pub enum RangeValue {
    Int(IntRange),
    Float(FloatRange),
}

impl RangeValue {
    pub fn element_type(&self) -> Type {
        match self {
            RangeValue::Int(_) => Type::Int,
            RangeValue::Float(_) => Type::Float,
        }
    }

    /// Iterate a closed range. Open ranges raise `OpenRange`.
    pub fn iter(&self) -> EvalResult<RangeIter> {
        match self {
            RangeValue::Int(r) => r.iter(),
            RangeValue::Float(r) => r.iter(),
        }
    }

    pub fn len(&self) -> EvalResult<usize> {
        match self {
            RangeValue::Int(r) => r.len(),
            RangeValue::Float(r) => r.len(),
        }
    }

    /// The integer range of a value the checker typed as `range<int>`.
    #[track_caller]
    pub fn expect_int(&self) -> &IntRange {
        match self {
            RangeValue::Int(r) => r,
            RangeValue::Float(_) => slate_types::defect(format_args!(
                "expected range<int>, found range<float>"
            )),
        }
    }
}

impl From<IntRange> for RangeValue {
    fn from(r: IntRange) -> Self {
        RangeValue::Int(r)
    }
}

impl From<FloatRange> for RangeValue {
    fn from(r: FloatRange) -> Self {
        RangeValue::Float(r)
    }
}

impl fmt::Display for RangeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeValue::Int(r) => fmt::Display::fmt(r, f),
            RangeValue::Float(r) => fmt::Display::fmt(r, f),
        }
    }
}

/// Integer range `first:last:step`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IntRange {
    first: Option<i64>,
    last: Option<i64>,
    step: i64,
}

impl IntRange {
    /// Build a range, inferring the step when it is omitted.
    pub fn new(first: Option<i64>, last: Option<i64>, step: Option<i64>) -> EvalResult<Self> {
        let step = step.unwrap_or_else(|| implied_int_step(first, last));
        if step == 0 {
            return Err(zero_step());
        }
        if step == i64::MIN {
            return Err(domain_error("range", format!("step must be greater than {}", i64::MIN)));
        }
        Ok(IntRange { first, last, step })
    }

    /// Closed range with the implied step.
    pub fn closed(first: i64, last: i64) -> Self {
        IntRange {
            first: Some(first),
            last: Some(last),
            step: implied_int_step(Some(first), Some(last)),
        }
    }

    #[inline]
    pub fn first(&self) -> Option<i64> {
        self.first
    }

    #[inline]
    pub fn last(&self) -> Option<i64> {
        self.last
    }

    #[inline]
    pub fn step(&self) -> i64 {
        self.step
    }

    fn bounds(&self) -> EvalResult<(i64, i64)> {
        match (self.first, self.last) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(open_range(self)),
        }
    }

    /// Number of elements of a closed range.
    pub fn len(&self) -> EvalResult<usize> {
        let (first, last) = self.bounds()?;
        int_count(first, last, self.step)
    }

    pub fn iter(&self) -> EvalResult<RangeIter> {
        let (first, last) = self.bounds()?;
        Ok(RangeIter::Int {
            next: first,
            step: self.step,
            remaining: int_count(first, last, self.step)?,
        })
    }
}

fn implied_int_step(first: Option<i64>, last: Option<i64>) -> i64 {
    match (first, last) {
        (Some(first), Some(last)) if last < first => -1,
        _ => 1,
    }
}

fn int_count(first: i64, last: i64, step: i64) -> EvalResult<usize> {
    let (wide_first, wide_last, wide_step) =
        (i128::from(first), i128::from(last), i128::from(step));
    let span = if wide_step > 0 {
        wide_last - wide_first
    } else {
        wide_first - wide_last
    };
    if span < 0 {
        return Ok(0);
    }
    usize::try_from(span / wide_step.abs() + 1).map_err(|_| too_many_elements(first, last, step))
}

#[cold]
fn too_many_elements(
    first: impl fmt::Display,
    last: impl fmt::Display,
    step: impl fmt::Display,
) -> EvalError {
    domain_error(
        "range",
        format!("{first} to {last} by {step} has too many elements"),
    )
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bound(f, self.first)?;
        f.write_str(":")?;
        write_bound(f, self.last)?;
        if self.step != implied_int_step(self.first, self.last) {
            write!(f, ":{}", self.step)?;
        }
        Ok(())
    }
}

/// Float range `first:last:step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatRange {
    first: Option<f64>,
    last: Option<f64>,
    step: f64,
}

impl FloatRange {
    pub fn new(first: Option<f64>, last: Option<f64>, step: Option<f64>) -> EvalResult<Self> {
        let step = step.unwrap_or_else(|| implied_float_step(first, last));
        if step == 0.0 {
            return Err(zero_step());
        }
        if !step.is_finite() {
            return Err(domain_error("range", format!("step must be finite, found {step}")));
        }
        Ok(FloatRange { first, last, step })
    }

    #[inline]
    pub fn first(&self) -> Option<f64> {
        self.first
    }

    #[inline]
    pub fn last(&self) -> Option<f64> {
        self.last
    }

    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    fn bounds(&self) -> EvalResult<(f64, f64)> {
        match (self.first, self.last) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(open_range(self)),
        }
    }

    pub fn len(&self) -> EvalResult<usize> {
        let (first, last) = self.bounds()?;
        float_count(first, last, self.step)
    }

    /// Elements are computed as `first + i * step` so rounding does not
    /// accumulate along the range.
    pub fn iter(&self) -> EvalResult<RangeIter> {
        let (first, last) = self.bounds()?;
        Ok(RangeIter::Float {
            first,
            step: self.step,
            index: 0,
            count: float_count(first, last, self.step)?,
        })
    }
}

fn implied_float_step(first: Option<f64>, last: Option<f64>) -> f64 {
    match (first, last) {
        (Some(first), Some(last)) if last < first => -1.0,
        _ => 1.0,
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "count is checked to be finite, non-negative and below usize::MAX"
)]
fn float_count(first: f64, last: f64, step: f64) -> EvalResult<usize> {
    let steps = ((last - first) / step).floor();
    if steps.is_nan() || steps.is_infinite() {
        return Err(domain_error(
            "range",
            format!("cannot enumerate {first} to {last} by {step}"),
        ));
    }
    if steps < 0.0 {
        return Ok(0);
    }
    // `usize::MAX as f64` rounds up to 2^64; every float below it leaves
    // room for the `+ 1`.
    if steps >= usize::MAX as f64 {
        return Err(too_many_elements(first, last, step));
    }
    Ok(steps as usize + 1)
}

impl fmt::Display for FloatRange {
    #[allow(clippy::float_cmp, reason = "implied steps are exactly +/-1")]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bound(f, self.first.map(FloatBound))?;
        f.write_str(":")?;
        write_bound(f, self.last.map(FloatBound))?;
        if self.step != implied_float_step(self.first, self.last) {
            write!(f, ":{:?}", self.step)?;
        }
        Ok(())
    }
}

struct FloatBound(f64);

impl fmt::Display for FloatBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

fn write_bound(f: &mut fmt::Formatter<'_>, bound: Option<impl fmt::Display>) -> fmt::Result {
    match bound {
        Some(b) => write!(f, "{b}"),
        None => f.write_str("*"),
    }
}

/// Iterator over the elements of a closed range.
#[derive(Clone, Debug)]
pub enum RangeIter {
    Int {
        next: i64,
        step: i64,
        remaining: usize,
    },
    Float {
        first: f64,
        step: f64,
        index: usize,
        count: usize,
    },
}

impl Iterator for RangeIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            RangeIter::Int {
                next,
                step,
                remaining,
            } => {
                if *remaining == 0 {
                    return None;
                }
                let value = *next;
                *remaining -= 1;
                if *remaining > 0 {
                    // In range by construction of `remaining`.
                    *next = next.wrapping_add(*step);
                }
                Some(Value::Int(value))
            }
            RangeIter::Float {
                first,
                step,
                index,
                count,
            } => {
                if *index >= *count {
                    return None;
                }
                #[allow(clippy::cast_precision_loss, reason = "float ranges are float-indexed")]
                let value = *first + *index as f64 * *step;
                *index += 1;
                Some(Value::Float(value))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = match self {
            RangeIter::Int { remaining, .. } => *remaining,
            RangeIter::Float { index, count, .. } => count - index,
        };
        (n, Some(n))
    }
}
