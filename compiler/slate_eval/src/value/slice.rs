//! Slice views over array storage.
//!
//! Slices never copy: they keep the underlying array alive and address it
//! through an offset and a (possibly negative) stride. Slicing a slice
//! composes the two views.
//!
//! Indices seen by guest code are one-based. A slicer is a `range<int>` with
//! inclusive bounds, normalized as follows:
//! - an omitted first bound is `1` for a positive step, `len` for a negative one
//! - an omitted last bound is `len` for a positive step, `1` for a negative one
//! - `first` must lie in `1..=max(1, len)`
//! - `last` must lie in `1..=len`, except that `first - step` with a unit step
//!   denotes the empty slice at `first`

use slate_types::Type;

use super::array::{ArrayBuilder, ArrayValue};
use super::range::IntRange;
use super::Value;
use crate::errors::{index_out_of_bounds, invalid_slice_bound, EvalResult};

/// A strided view of an array.
#[derive(Clone, Debug)]
pub struct SliceValue {
    array: ArrayValue,
    /// Storage position of the first element.
    offset: usize,
    step: isize,
    len: usize,
}

impl SliceValue {
    /// View covering a whole array.
    pub fn whole(array: ArrayValue) -> Self {
        let len = array.len();
        SliceValue {
            array,
            offset: 0,
            step: 1,
            len,
        }
    }

    #[inline]
    pub fn element_type(&self) -> &Type {
        self.array.element_type()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The array this view reads from.
    pub fn array(&self) -> &ArrayValue {
        &self.array
    }

    #[inline]
    #[allow(
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        reason = "positions are bounded by the storage length"
    )]
    fn position(&self, k: usize) -> usize {
        (self.offset as isize + k as isize * self.step) as usize
    }

    /// Storage position of a one-based guest index.
    #[inline]
    fn locate(&self, index: i64) -> EvalResult<usize> {
        match usize::try_from(index) {
            Ok(i) if i >= 1 && i <= self.len => Ok(self.position(i - 1)),
            _ => Err(index_out_of_bounds(index, self.len)),
        }
    }

    pub fn get(&self, index: i64) -> EvalResult<Value> {
        Ok(self.array.get_value(self.locate(index)?))
    }

    pub fn get_bool(&self, index: i64) -> EvalResult<bool> {
        Ok(self.array.get_bool(self.locate(index)?))
    }

    pub fn get_int(&self, index: i64) -> EvalResult<i64> {
        Ok(self.array.get_int(self.locate(index)?))
    }

    pub fn get_float(&self, index: i64) -> EvalResult<f64> {
        Ok(self.array.get_float(self.locate(index)?))
    }

    /// Apply a slicer, producing a new view over the same storage.
    pub fn slice(&self, slicer: &IntRange) -> EvalResult<SliceValue> {
        let len = i128::try_from(self.len).unwrap_or(i128::MAX);
        let step = i128::from(slicer.step());
        let up = step > 0;

        let first = match slicer.first() {
            Some(first) => {
                let first = i128::from(first);
                if first < 1 || first > len.max(1) {
                    return Err(invalid_slice_bound(clamp_i64(first), self.len));
                }
                first
            }
            None if up => 1,
            None => len,
        };
        let last = match slicer.last() {
            Some(last) => {
                let last = i128::from(last);
                let empty_marker = step.abs() == 1 && last == first - step;
                if !empty_marker && (last < 1 || last > len) {
                    return Err(invalid_slice_bound(clamp_i64(last), self.len));
                }
                last
            }
            None if up => len,
            None => 1,
        };

        // Zero-based half-open [start, end) in the direction of the step.
        let start = first - 1;
        let end = last - 1 + step.signum();
        let count = if up {
            if end <= start {
                0
            } else {
                (end - start + step - 1) / step
            }
        } else if end >= start {
            0
        } else {
            (start - end - step - 1) / -step
        };

        let count = usize::try_from(count).unwrap_or(0);
        if count == 0 {
            return Ok(SliceValue {
                array: self.array.clone(),
                offset: self.offset,
                step: self.step,
                len: 0,
            });
        }

        let start = usize::try_from(start).unwrap_or(0);
        let step = if count == 1 {
            self.step
        } else {
            isize::try_from(step)
                .ok()
                .and_then(|s| s.checked_mul(self.step))
                .ok_or_else(|| invalid_slice_bound(slicer.step(), self.len))?
        };
        Ok(SliceValue {
            array: self.array.clone(),
            offset: self.position(start),
            step,
            len: count,
        })
    }

    /// Iterate boxed elements in view order.
    pub fn iter(&self) -> SliceIter<'_> {
        SliceIter::new(&self.array, self.offset, self.step, self.len)
    }

    /// Copy the viewed elements into a fresh array.
    pub fn to_array(&self) -> ArrayValue {
        if self.offset == 0 && self.step == 1 && self.len == self.array.len() {
            return self.array.clone();
        }
        let mut builder = ArrayBuilder::with_capacity(self.element_type().clone(), self.len);
        for item in self.iter() {
            builder.push(item);
        }
        builder.finish()
    }
}

fn clamp_i64(n: i128) -> i64 {
    i64::try_from(n).unwrap_or(if n < 0 { i64::MIN } else { i64::MAX })
}

/// Iterator over a strided run of array storage.
pub struct SliceIter<'a> {
    array: &'a ArrayValue,
    next: usize,
    step: isize,
    remaining: usize,
}

impl<'a> SliceIter<'a> {
    pub(super) fn new(array: &'a ArrayValue, offset: usize, step: isize, len: usize) -> Self {
        SliceIter {
            array,
            next: offset,
            step,
            remaining: len,
        }
    }
}

impl Iterator for SliceIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.remaining == 0 {
            return None;
        }
        let value = self.array.get_value(self.next);
        self.remaining -= 1;
        if self.remaining > 0 {
            self.next = self.next.wrapping_add_signed(self.step);
        }
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for SliceIter<'_> {}
