use std::sync::Arc;

use crate::{
    callback::CallbackId,
    client::Client,
    errors::InjectError,
    resolver::Resolver,
    types::{Instance, TypeInfo},
};

/// Shared handle to a resolution context, as handed to callbacks
pub type Ctx = Arc<dyn Context>;

/// A resolution context
///
/// Threads type lookups and callback execution through one resolution tree.
pub trait Context: Send + Sync {
    /// The client owning the type registry and executing callbacks
    fn injection_client(&self) -> &Arc<Client>;

    /// Looks up the implementation registered for a type
    ///
    /// Returns `None` if the type isn't registered.
    fn get_type_dependency(&self, info: &TypeInfo) -> Option<Instance> {
        self.injection_client().get_type_dependency(info)
    }

    /// The callback this context was created for, if any
    fn frame(&self) -> Option<&CallFrame> {
        None
    }

    /// The context this one was derived from
    fn parent(&self) -> Option<&Ctx> {
        None
    }
}

impl<'a> dyn Context + 'a {
    /// Resolves a statically typed dependency from this context
    pub fn resolve<R: Resolver>(&self) -> Result<R, InjectError> {
        R::resolve(self)
    }

    /// All callbacks currently executing on this branch, outermost first
    pub fn call_chain(&self) -> Vec<CallFrame> {
        let mut chain = Vec::new();
        let mut current: &dyn Context = self;
        loop {
            if let Some(frame) = current.frame() {
                chain.push(*frame);
            }
            match current.parent() {
                Some(parent) => current = parent.as_ref(),
                None => break,
            }
        }
        chain.reverse();
        chain
    }
}

/// A callback on the current resolution branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallFrame {
    pub id: CallbackId,
    pub name: &'static str,
}

/// Root context of a resolution tree
pub struct BasicContext {
    client: Arc<Client>,
}

impl BasicContext {
    pub fn new(client: Arc<Client>) -> Self {
        BasicContext { client }
    }

    /// Creates a new root context behind a shared handle
    pub fn shared(client: Arc<Client>) -> Ctx {
        Arc::new(Self::new(client))
    }
}

impl Context for BasicContext {
    fn injection_client(&self) -> &Arc<Client> {
        &self.client
    }
}

/// Context a single callback executes in
///
/// Lookups are forwarded to the parent, so a custom parent context keeps
/// applying to the whole subtree.
pub(crate) struct CallbackContext {
    parent: Ctx,
    frame: CallFrame,
}

impl CallbackContext {
    pub(crate) fn new(parent: Ctx, frame: CallFrame) -> Self {
        CallbackContext { parent, frame }
    }
}

impl Context for CallbackContext {
    fn injection_client(&self) -> &Arc<Client> {
        self.parent.injection_client()
    }

    fn get_type_dependency(&self, info: &TypeInfo) -> Option<Instance> {
        self.parent.get_type_dependency(info)
    }

    fn frame(&self) -> Option<&CallFrame> {
        Some(&self.frame)
    }

    fn parent(&self) -> Option<&Ctx> {
        Some(&self.parent)
    }
}
