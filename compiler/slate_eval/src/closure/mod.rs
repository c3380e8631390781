//! Closure capture and disclosure.
//!
//! When a function definition is evaluated, its [`Encloser`] copies the free
//! variables it needs out of the defining frame into a fresh closure frame.
//! When the function is called, the target's [`Discloser`] copies them back
//! into the new call frame. Both sides use the slot bindings the resolver
//! computed, so a closure holds exactly the variables its body reads.
//!
//! A recursive binding (`let f = (n) -> ... f(n - 1) ...`) needs the bound
//! function inside its own closure. That is the one mutation a closure sees
//! after creation; see [`capture_recursive`]. The copy stored in the closure
//! refers to the closure weakly so the pair does not form an `Rc` cycle.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use slate_types::defect;

use crate::frame::{Frame, FrameDescriptor, SlotIndex};

/// Heap frame of captured variables, shared by every value of one
/// instantiation.
pub struct Closure {
    frame: RefCell<Frame>,
}

impl Closure {
    /// An empty closure for the given layout.
    pub fn allocate(descriptor: &Rc<FrameDescriptor>) -> Rc<Self> {
        Rc::new(Closure {
            frame: RefCell::new(Frame::allocate(descriptor)),
        })
    }

    pub fn descriptor(&self) -> Rc<FrameDescriptor> {
        Rc::clone(self.frame.borrow().descriptor())
    }

    /// Captured variables.
    pub fn frame(&self) -> Ref<'_, Frame> {
        self.frame.borrow()
    }

    fn frame_mut(&self) -> RefMut<'_, Frame> {
        self.frame.borrow_mut()
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frame.try_borrow() {
            Ok(frame) => f.debug_tuple("Closure").field(&*frame).finish(),
            Err(_) => f.write_str("Closure(<borrowed>)"),
        }
    }
}

/// How a function value holds its closure.
#[derive(Clone)]
pub(crate) enum ClosureRef {
    Shared(Rc<Closure>),
    /// Held inside the closure it points to.
    SelfReference(Weak<Closure>),
}

impl ClosureRef {
    pub(crate) fn as_ptr(&self) -> *const Closure {
        match self {
            ClosureRef::Shared(c) => Rc::as_ptr(c),
            ClosureRef::SelfReference(w) => w.as_ptr(),
        }
    }
}

/// Copy `source` of one frame into `target` of another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotBinding {
    pub source: SlotIndex,
    pub target: SlotIndex,
}

impl SlotBinding {
    pub const fn new(source: SlotIndex, target: SlotIndex) -> Self {
        SlotBinding { source, target }
    }
}

/// Captures free variables from a defining frame.
#[derive(Debug)]
pub struct Encloser {
    descriptor: Rc<FrameDescriptor>,
    bindings: Vec<SlotBinding>,
}

impl Encloser {
    /// `bindings` map defining-frame slots (source) to closure slots (target).
    ///
    /// Checks that paired slots are declared with the same type.
    pub fn new(
        enclosing: &FrameDescriptor,
        descriptor: Rc<FrameDescriptor>,
        bindings: Vec<SlotBinding>,
    ) -> Self {
        for b in &bindings {
            descriptor.expect_slot_type(b.target, enclosing.slot_type(b.source));
        }
        Encloser {
            descriptor,
            bindings,
        }
    }

    #[inline]
    pub fn bindings(&self) -> &[SlotBinding] {
        &self.bindings
    }

    /// Snapshot the bound slots. Allocates only when something is captured.
    pub fn capture(&self, frame: &Frame) -> Option<Rc<Closure>> {
        if self.bindings.is_empty() {
            return None;
        }
        let closure = Closure::allocate(&self.descriptor);
        {
            let mut target = closure.frame_mut();
            for b in &self.bindings {
                Frame::copy_slot(frame, b.source, &mut target, b.target);
            }
        }
        Some(closure)
    }
}

/// Restores captured variables into a call frame.
#[derive(Debug)]
pub struct Discloser {
    bindings: Vec<SlotBinding>,
}

impl Discloser {
    /// `bindings` map closure slots (source) to call-frame slots (target).
    pub fn new(closure: &FrameDescriptor, frame: &FrameDescriptor, bindings: Vec<SlotBinding>) -> Self {
        for b in &bindings {
            frame.expect_slot_type(b.target, closure.slot_type(b.source));
        }
        Discloser { bindings }
    }

    #[inline]
    pub fn bindings(&self) -> &[SlotBinding] {
        &self.bindings
    }

    /// Copy every closure slot into the call frame.
    ///
    /// A closure without disclosure bindings, or bindings without a closure,
    /// is a defect.
    pub fn disclose(&self, closure: Option<&Rc<Closure>>, frame: &mut Frame) {
        let closure = match (closure, self.bindings.is_empty()) {
            (None, true) => return,
            (Some(c), false) => c,
            (None, false) => defect(format_args!(
                "call needs {} captured slots but has no closure",
                self.bindings.len()
            )),
            (Some(_), true) => defect(format_args!("closure passed to a function that captures nothing")),
        };
        let source = closure.frame();
        for b in &self.bindings {
            Frame::copy_slot(&source, b.source, frame, b.target);
            if frame.is_defined(b.target) && frame.descriptor().slot_type(b.target).is_function() {
                let f = frame.read_function(b.target);
                if f.is_self_reference() {
                    frame.write_function(b.target, f.with_closure(Rc::clone(closure)));
                }
            }
        }
    }
}

/// Complete a recursive binding after the function was written to `slot`.
///
/// Copies the slot's value into `closure_slot` of its own closure. If the
/// function captured nothing else it has no closure yet; one is allocated
/// from the target's closure layout and the slot is rewritten to use it.
#[track_caller]
pub fn capture_recursive(frame: &mut Frame, slot: SlotIndex, closure_slot: SlotIndex) {
    let mut function = frame.read_function(slot);
    let closure = match function.closure() {
        Some(c) => c,
        None => {
            let Some(descriptor) = function.target().closure_descriptor() else {
                defect(format_args!(
                    "recursive binding of `{}` to a function without a closure layout",
                    frame.descriptor().slot_name(slot)
                ))
            };
            let c = Closure::allocate(descriptor);
            function = function.with_closure(Rc::clone(&c));
            frame.write_function(slot, function.clone());
            c
        }
    };
    closure
        .frame_mut()
        .write_function(closure_slot, function.self_reference());
}

#[cfg(test)]
mod tests;
