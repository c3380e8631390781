//! Physical representations used for typed dispatch.
//!
//! Every type evaluates in exactly one representation. Frames use a coarser
//! split: functions share the reference slot category with arrays and ranges.

use std::fmt;

/// Evaluation entry point category for a node.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum Representation {
    Bool,
    Int,
    Float,
    Function,
    /// Arrays, slices and ranges.
    Reference,
}

/// Storage category of a frame slot.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub enum SlotCategory {
    Bool,
    Int,
    Float,
    /// Functions and every aggregate value.
    Reference,
}

impl Representation {
    #[inline]
    pub const fn slot_category(self) -> SlotCategory {
        match self {
            Self::Bool => SlotCategory::Bool,
            Self::Int => SlotCategory::Int,
            Self::Float => SlotCategory::Float,
            Self::Function | Self::Reference => SlotCategory::Reference,
        }
    }

    /// Check if values of this representation live unboxed.
    #[inline]
    pub const fn is_primitive(self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Float)
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Function => "function",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SlotCategory {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for SlotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
