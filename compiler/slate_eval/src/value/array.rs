//! Arrays with natively-typed backing storage.

use std::collections::TryReserveError;
use std::rc::Rc;

use slate_types::{defect, SlotCategory, Type};

use super::slice::SliceIter;
use super::Value;

/// Backing storage, chosen by the element type's slot category.
///
/// Primitive elements are stored unboxed; everything else is boxed.
#[derive(Clone, Debug)]
pub(super) enum Storage {
    Bool(Vec<bool>),
    Int(Vec<i64>),
    Float(Vec<f64>),
    Reference(Vec<Value>),
}

impl Storage {
    fn for_element(element: &Type, capacity: usize) -> Self {
        match element.slot_category() {
            SlotCategory::Bool => Storage::Bool(Vec::with_capacity(capacity)),
            SlotCategory::Int => Storage::Int(Vec::with_capacity(capacity)),
            SlotCategory::Float => Storage::Float(Vec::with_capacity(capacity)),
            SlotCategory::Reference => Storage::Reference(Vec::with_capacity(capacity)),
        }
    }

    fn try_reserve_exact(&mut self, additional: usize) -> Result<(), TryReserveError> {
        match self {
            Storage::Bool(v) => v.try_reserve_exact(additional),
            Storage::Int(v) => v.try_reserve_exact(additional),
            Storage::Float(v) => v.try_reserve_exact(additional),
            Storage::Reference(v) => v.try_reserve_exact(additional),
        }
    }

    fn len(&self) -> usize {
        match self {
            Storage::Bool(v) => v.len(),
            Storage::Int(v) => v.len(),
            Storage::Float(v) => v.len(),
            Storage::Reference(v) => v.len(),
        }
    }

    #[inline]
    pub(super) fn get(&self, position: usize) -> Value {
        match self {
            Storage::Bool(v) => Value::Bool(v[position]),
            Storage::Int(v) => Value::Int(v[position]),
            Storage::Float(v) => Value::Float(v[position]),
            Storage::Reference(v) => v[position].clone(),
        }
    }

    fn push(&mut self, value: Value) {
        match self {
            Storage::Bool(v) => v.push(value.into_bool()),
            Storage::Int(v) => v.push(value.into_int()),
            Storage::Float(v) => v.push(value.into_float()),
            Storage::Reference(v) => v.push(value),
        }
    }
}

/// Immutable homogeneous array.
///
/// Clones share storage.
#[derive(Clone, Debug)]
pub struct ArrayValue {
    element: Type,
    storage: Rc<Storage>,
}

impl ArrayValue {
    pub fn from_bools(items: Vec<bool>) -> Self {
        ArrayValue {
            element: Type::Bool,
            storage: Rc::new(Storage::Bool(items)),
        }
    }

    pub fn from_ints(items: Vec<i64>) -> Self {
        ArrayValue {
            element: Type::Int,
            storage: Rc::new(Storage::Int(items)),
        }
    }

    pub fn from_floats(items: Vec<f64>) -> Self {
        ArrayValue {
            element: Type::Float,
            storage: Rc::new(Storage::Float(items)),
        }
    }

    /// Build an array from boxed values, unboxing primitive elements.
    ///
    /// Storage for the iterator's lower size bound is reserved up front, so
    /// an impossible length fails here instead of midway through.
    pub fn from_values(
        element: Type,
        items: impl IntoIterator<Item = Value>,
    ) -> Result<Self, TryReserveError> {
        let items = items.into_iter();
        let mut builder = ArrayBuilder::try_with_capacity(element, items.size_hint().0)?;
        for item in items {
            builder.push(item);
        }
        Ok(builder.finish())
    }

    /// An empty array of the given element type.
    pub fn empty(element: Type) -> Self {
        ArrayBuilder::new(element).finish()
    }

    #[inline]
    pub fn element_type(&self) -> &Type {
        &self.element
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boxed element at a zero-based storage position.
    #[inline]
    pub(super) fn get_value(&self, position: usize) -> Value {
        self.storage.get(position)
    }

    #[inline]
    #[track_caller]
    pub(super) fn get_bool(&self, position: usize) -> bool {
        match &*self.storage {
            Storage::Bool(v) => v[position],
            _ => storage_defect("bool", &self.element),
        }
    }

    #[inline]
    #[track_caller]
    pub(super) fn get_int(&self, position: usize) -> i64 {
        match &*self.storage {
            Storage::Int(v) => v[position],
            _ => storage_defect("int", &self.element),
        }
    }

    #[inline]
    #[track_caller]
    pub(super) fn get_float(&self, position: usize) -> f64 {
        match &*self.storage {
            Storage::Float(v) => v[position],
            _ => storage_defect("float", &self.element),
        }
    }

    /// Iterate boxed elements in order.
    pub fn iter(&self) -> SliceIter<'_> {
        SliceIter::new(self, 0, 1, self.len())
    }

    /// Check whether two arrays share the same backing storage.
    pub fn shares_storage(&self, other: &ArrayValue) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }
}

#[cold]
#[track_caller]
fn storage_defect(requested: &str, element: &Type) -> ! {
    defect(format_args!(
        "{requested} element read from an array of {element}"
    ))
}

/// Incremental construction of an [`ArrayValue`].
pub struct ArrayBuilder {
    element: Type,
    storage: Storage,
}

impl ArrayBuilder {
    pub fn new(element: Type) -> Self {
        Self::with_capacity(element, 0)
    }

    pub fn with_capacity(element: Type, capacity: usize) -> Self {
        let storage = Storage::for_element(&element, capacity);
        ArrayBuilder { element, storage }
    }

    /// Like [`with_capacity`](Self::with_capacity), but reports a capacity
    /// the allocator cannot provide instead of aborting.
    pub fn try_with_capacity(element: Type, capacity: usize) -> Result<Self, TryReserveError> {
        let mut storage = Storage::for_element(&element, 0);
        storage.try_reserve_exact(capacity)?;
        Ok(ArrayBuilder { element, storage })
    }

    /// Append a boxed element; its representation must match the element type.
    #[inline]
    pub fn push(&mut self, value: Value) {
        debug_assert_eq!(
            value.representation(),
            self.element.representation(),
            "array element representation"
        );
        self.storage.push(value);
    }

    #[inline]
    pub fn push_bool(&mut self, value: bool) {
        match &mut self.storage {
            Storage::Bool(v) => v.push(value),
            _ => storage_defect("bool", &self.element),
        }
    }

    #[inline]
    pub fn push_int(&mut self, value: i64) {
        match &mut self.storage {
            Storage::Int(v) => v.push(value),
            _ => storage_defect("int", &self.element),
        }
    }

    #[inline]
    pub fn push_float(&mut self, value: f64) {
        match &mut self.storage {
            Storage::Float(v) => v.push(value),
            _ => storage_defect("float", &self.element),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn finish(self) -> ArrayValue {
        ArrayValue {
            element: self.element,
            storage: Rc::new(self.storage),
        }
    }
}
