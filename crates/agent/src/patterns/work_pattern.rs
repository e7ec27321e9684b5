//! The work-pattern contract shared by every multi-agent composition.
//!
//! A pattern is configured once as a prototype (name, description, output
//! stream) and then bound to concrete members. Binding always produces a
//! fresh instance; the prototype is never mutated, so one prototype can
//! serve any number of concurrent invocations.

use std::fmt;
use std::sync::Arc;

use agora_core::{Bindings, Error, Result};
use async_trait::async_trait;
use tokio::task::JoinHandle;

/// A member bound into one slot of a pattern instance.
pub struct Slot<T: ?Sized> {
    pub name: String,
    pub agent: Arc<T>,
}

impl<T: ?Sized> Slot<T> {
    pub fn new(name: impl Into<String>, agent: Arc<T>) -> Self {
        Self {
            name: name.into(),
            agent,
        }
    }
}

impl<T: ?Sized> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            agent: self.agent.clone(),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&self.name).finish()
    }
}

/// Name of the agent bound to a slot, if any.
pub(crate) fn slot_name<T: ?Sized>(slot: &Option<Slot<T>>) -> Option<String> {
    slot.as_ref().map(|s| s.name.clone())
}

/// A reusable multi-agent composition strategy.
#[async_trait]
pub trait WorkPattern: Send + Sync + Sized + 'static {
    type Request: Send + 'static;
    type Output: Send + 'static;

    /// The pattern instance's name (used in logs and events).
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Create a fresh instance with `members` assigned to their slots.
    ///
    /// Name, description and output stream are copied from `self`; slots
    /// missing from `members` are unbound. A member that lacks the
    /// capability its slot requires is a `TypeMismatch`, raised here before
    /// any stage can run.
    fn bind(&self, members: &Bindings) -> Result<Self>;

    /// Run the pattern to completion.
    async fn invoke(&self, request: Self::Request) -> Result<Self::Output>;

    /// Run the whole invocation as one background task.
    fn spawn_invoke(self: Arc<Self>, request: Self::Request) -> JoinHandle<Result<Self::Output>> {
        tokio::spawn(async move { self.invoke(request).await })
    }

    /// Run the invocation to completion from synchronous code.
    ///
    /// Builds a current-thread runtime. Calling it from inside an async
    /// runtime is an `Error::Internal`; use `invoke` or `spawn_invoke` there.
    fn invoke_blocking(&self, request: Self::Request) -> Result<Self::Output> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(Error::Internal(format!(
                "{}: invoke_blocking called from within an async runtime",
                self.name()
            )));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Internal(format!("Failed to start runtime: {e}")))?;
        runtime.block_on(self.invoke(request))
    }
}
