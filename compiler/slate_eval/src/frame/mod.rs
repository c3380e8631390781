//! Frame and slot model.
//!
//! A [`FrameDescriptor`] fixes the slot layout of one scope at construction
//! time: an ordered list of declared types (with debug names). A [`Frame`] is
//! one activation of that layout. Slots are stored in their natural category
//! so primitive reads and writes never box.
//!
//! Slot indices come from the upstream resolver. Accessing a slot with the
//! wrong category, or reading one that was never written, means the tree is
//! malformed and is reported as a defect.

use std::fmt;
use std::rc::Rc;

use slate_types::{assert_same_type, defect, SlotCategory, Type};

use crate::value::{FunctionValue, Value};

/// Index of a slot within a frame.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(u32);

impl SlotIndex {
    #[inline]
    pub const fn new(index: u32) -> Self {
        SlotIndex(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotIndex({})", self.0)
    }
}

#[derive(Clone, Debug)]
struct SlotDescriptor {
    name: Rc<str>,
    ty: Type,
}

/// Static slot layout of a scope.
#[derive(Debug)]
pub struct FrameDescriptor {
    slots: Vec<SlotDescriptor>,
}

impl FrameDescriptor {
    pub fn builder() -> FrameDescriptorBuilder {
        FrameDescriptorBuilder { slots: Vec::new() }
    }

    /// A descriptor with no slots.
    pub fn empty() -> Rc<Self> {
        Rc::new(FrameDescriptor { slots: Vec::new() })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[track_caller]
    fn slot(&self, slot: SlotIndex) -> &SlotDescriptor {
        match self.slots.get(slot.index()) {
            Some(desc) => desc,
            None => defect(format_args!(
                "{slot:?} outside a frame of {} slots",
                self.slots.len()
            )),
        }
    }

    /// Declared type of a slot.
    #[track_caller]
    pub fn slot_type(&self, slot: SlotIndex) -> &Type {
        &self.slot(slot).ty
    }

    #[track_caller]
    pub fn slot_name(&self, slot: SlotIndex) -> &str {
        &self.slot(slot).name
    }

    /// Look up a slot by debug name. Later slots shadow earlier ones.
    pub fn find(&self, name: &str) -> Option<SlotIndex> {
        self.slots
            .iter()
            .rposition(|s| &*s.name == name)
            .and_then(|i| u32::try_from(i).ok())
            .map(SlotIndex)
    }

    /// Check that a slot is declared with exactly `ty`.
    #[track_caller]
    pub fn expect_slot_type(&self, slot: SlotIndex, ty: &Type) {
        assert_same_type(self.slot_type(slot), ty, self.slot_name(slot));
    }
}

/// Incremental construction of a [`FrameDescriptor`].
pub struct FrameDescriptorBuilder {
    slots: Vec<SlotDescriptor>,
}

impl FrameDescriptorBuilder {
    /// Append a slot and return its index.
    pub fn add_slot(&mut self, name: &str, ty: Type) -> SlotIndex {
        let index = match u32::try_from(self.slots.len()) {
            Ok(i) => i,
            Err(_) => defect(format_args!("frame exceeds {} slots", u32::MAX)),
        };
        self.slots.push(SlotDescriptor {
            name: Rc::from(name),
            ty,
        });
        SlotIndex(index)
    }

    pub fn build(self) -> Rc<FrameDescriptor> {
        Rc::new(FrameDescriptor { slots: self.slots })
    }
}

/// Contents of one slot.
#[derive(Clone, Debug)]
enum SlotValue {
    Undefined,
    Bool(bool),
    Int(i64),
    Float(f64),
    Reference(Value),
}

/// Runtime storage for one activation of a [`FrameDescriptor`].
pub struct Frame {
    descriptor: Rc<FrameDescriptor>,
    slots: Vec<SlotValue>,
}

impl Frame {
    /// Fresh frame with every slot undefined.
    pub fn allocate(descriptor: &Rc<FrameDescriptor>) -> Self {
        Frame {
            descriptor: Rc::clone(descriptor),
            slots: vec![SlotValue::Undefined; descriptor.len()],
        }
    }

    #[inline]
    pub fn descriptor(&self) -> &Rc<FrameDescriptor> {
        &self.descriptor
    }

    /// Whether the slot has been written.
    #[track_caller]
    pub fn is_defined(&self, slot: SlotIndex) -> bool {
        self.descriptor.slot(slot);
        !matches!(self.slots[slot.index()], SlotValue::Undefined)
    }

    #[inline]
    #[track_caller]
    fn check_category(&self, slot: SlotIndex, category: SlotCategory) {
        let declared = self.descriptor.slot(slot);
        if declared.ty.slot_category() != category {
            defect(format_args!(
                "{category} access to slot `{}` declared {}",
                declared.name, declared.ty
            ));
        }
    }

    #[cold]
    #[track_caller]
    fn undefined(&self, slot: SlotIndex) -> ! {
        defect(format_args!(
            "read of undefined slot `{}`",
            self.descriptor.slot_name(slot)
        ))
    }

    // Typed reads

    #[inline]
    #[track_caller]
    pub fn read_bool(&self, slot: SlotIndex) -> bool {
        self.check_category(slot, SlotCategory::Bool);
        match self.slots[slot.index()] {
            SlotValue::Bool(b) => b,
            _ => self.undefined(slot),
        }
    }

    #[inline]
    #[track_caller]
    pub fn read_int(&self, slot: SlotIndex) -> i64 {
        self.check_category(slot, SlotCategory::Int);
        match self.slots[slot.index()] {
            SlotValue::Int(n) => n,
            _ => self.undefined(slot),
        }
    }

    #[inline]
    #[track_caller]
    pub fn read_float(&self, slot: SlotIndex) -> f64 {
        self.check_category(slot, SlotCategory::Float);
        match self.slots[slot.index()] {
            SlotValue::Float(x) => x,
            _ => self.undefined(slot),
        }
    }

    #[track_caller]
    pub fn read_function(&self, slot: SlotIndex) -> FunctionValue {
        self.check_category(slot, SlotCategory::Reference);
        match &self.slots[slot.index()] {
            SlotValue::Reference(Value::Function(f)) => f.clone(),
            SlotValue::Undefined => self.undefined(slot),
            SlotValue::Reference(other) => defect(format_args!(
                "function read of slot `{}` holding a {}",
                self.descriptor.slot_name(slot),
                other.kind_name()
            )),
            _ => unreachable!("category checked above"),
        }
    }

    #[track_caller]
    pub fn read_reference(&self, slot: SlotIndex) -> Value {
        self.check_category(slot, SlotCategory::Reference);
        match &self.slots[slot.index()] {
            SlotValue::Reference(v) => v.clone(),
            _ => self.undefined(slot),
        }
    }

    /// Read any slot in boxed form.
    #[track_caller]
    pub fn read_value(&self, slot: SlotIndex) -> Value {
        match self.descriptor.slot_type(slot).slot_category() {
            SlotCategory::Bool => Value::Bool(self.read_bool(slot)),
            SlotCategory::Int => Value::Int(self.read_int(slot)),
            SlotCategory::Float => Value::Float(self.read_float(slot)),
            SlotCategory::Reference => self.read_reference(slot),
        }
    }

    // Typed writes

    #[inline]
    #[track_caller]
    pub fn write_bool(&mut self, slot: SlotIndex, value: bool) {
        self.check_category(slot, SlotCategory::Bool);
        self.slots[slot.index()] = SlotValue::Bool(value);
    }

    #[inline]
    #[track_caller]
    pub fn write_int(&mut self, slot: SlotIndex, value: i64) {
        self.check_category(slot, SlotCategory::Int);
        self.slots[slot.index()] = SlotValue::Int(value);
    }

    #[inline]
    #[track_caller]
    pub fn write_float(&mut self, slot: SlotIndex, value: f64) {
        self.check_category(slot, SlotCategory::Float);
        self.slots[slot.index()] = SlotValue::Float(value);
    }

    #[track_caller]
    pub fn write_function(&mut self, slot: SlotIndex, value: FunctionValue) {
        self.check_category(slot, SlotCategory::Reference);
        debug_assert_eq!(
            self.descriptor.slot_type(slot),
            value.ty(),
            "function type of slot `{}`",
            self.descriptor.slot_name(slot)
        );
        self.slots[slot.index()] = SlotValue::Reference(Value::Function(value));
    }

    #[track_caller]
    pub fn write_reference(&mut self, slot: SlotIndex, value: Value) {
        self.check_category(slot, SlotCategory::Reference);
        if value.representation().is_primitive() {
            defect(format_args!(
                "{} written to reference slot `{}`",
                value.kind_name(),
                self.descriptor.slot_name(slot)
            ));
        }
        debug_assert_eq!(
            *self.descriptor.slot_type(slot),
            value.ty(),
            "type of slot `{}`",
            self.descriptor.slot_name(slot)
        );
        self.slots[slot.index()] = SlotValue::Reference(value);
    }

    /// Write a boxed value, unboxing primitives into their category.
    #[track_caller]
    pub fn write_value(&mut self, slot: SlotIndex, value: Value) {
        match self.descriptor.slot_type(slot).slot_category() {
            SlotCategory::Bool => self.write_bool(slot, value.into_bool()),
            SlotCategory::Int => self.write_int(slot, value.into_int()),
            SlotCategory::Float => self.write_float(slot, value.into_float()),
            SlotCategory::Reference => self.write_reference(slot, value),
        }
    }

    /// Raw copy between frames.
    ///
    /// Both slots must be declared with the same type. An undefined source
    /// copies as undefined.
    #[track_caller]
    pub fn copy_slot(source: &Frame, from: SlotIndex, target: &mut Frame, to: SlotIndex) {
        assert_same_type(
            target.descriptor.slot_type(to),
            source.descriptor.slot_type(from),
            source.descriptor.slot_name(from),
        );
        target.slots[to.index()] = source.slots[from.index()].clone();
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (desc, value) in self.descriptor.slots.iter().zip(&self.slots) {
            match value {
                SlotValue::Undefined => map.entry(&desc.name, &format_args!("<undefined>")),
                SlotValue::Bool(b) => map.entry(&desc.name, b),
                SlotValue::Int(n) => map.entry(&desc.name, n),
                SlotValue::Float(x) => map.entry(&desc.name, x),
                SlotValue::Reference(v) => map.entry(&desc.name, v),
            };
        }
        map.finish()
    }
}
