//! Top-level execution.

use std::rc::Rc;
use std::sync::Once;

use slate_types::Type;

use crate::errors::EvalResult;
use crate::frame::{Frame, FrameDescriptor};
use crate::nodes::Node;
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

/// A checked program: a body and the layout of its top-level frame.
#[derive(Debug)]
pub struct Program {
    descriptor: Rc<FrameDescriptor>,
    body: Node,
}

impl Program {
    pub fn new(descriptor: Rc<FrameDescriptor>, body: Node) -> Self {
        Program { descriptor, body }
    }

    /// Result type of the program.
    pub fn ty(&self) -> Type {
        self.body.ty()
    }

    pub fn descriptor(&self) -> &Rc<FrameDescriptor> {
        &self.descriptor
    }

    /// Evaluate in a fresh top-level frame.
    ///
    /// Runtime errors end this evaluation only; the program may be executed
    /// again.
    #[tracing::instrument(level = "debug", skip_all, fields(ty = %self.body.ty()))]
    pub fn execute(&self) -> EvalResult<Value> {
        let mut frame = Frame::allocate(&self.descriptor);
        let result = ensure_sufficient_stack(|| self.body.eval_value(&mut frame));
        if let Err(e) = &result {
            tracing::debug!(error = %e.kind, "evaluation failed");
        }
        result
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once; only
/// the first call installs anything.
///
/// # Panics
///
/// If `RUST_LOG` is set and the host already installed a global subscriber.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
