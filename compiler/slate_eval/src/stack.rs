//! Stack headroom for deeply recursive guest programs.
//!
//! Guest calls recurse on the native stack. Every call enters through
//! [`ensure_sufficient_stack`], which grows the stack with `stacker` once the
//! remaining space drops below the red zone, so recursion depth is limited by
//! memory rather than the initial thread stack.
//!
//! On WASM the closure runs directly; the engine manages its own stack.

/// Space that must remain before a call runs (128KB).
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment (2MB).
const STACK_PER_RECURSION: usize = 2 * 1024 * 1024;

/// Run `f` with at least [`RED_ZONE`] bytes of stack available.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
