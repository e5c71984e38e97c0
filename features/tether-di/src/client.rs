use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    builder::ClientBuilder,
    callback::CallbackSig,
    context::{BasicContext, CallFrame, CallbackContext, Ctx},
    errors::InjectError,
    types::{Injectable, Instance, TypeInfo},
};

pub(crate) const DEFAULT_MAX_DEPTH: usize = 64;

/// Injection client
///
/// Holds the registered type dependencies and executes callbacks within a context.
/// Registration needs `&mut self`, so register everything before sharing the client.
pub struct Client {
    type_dependencies: HashMap<TypeId, Instance>,
    max_depth: usize,
    detect_cycles: bool,
}
impl Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_struct("Client");
        for instance in self.type_dependencies.values() {
            map.field(instance.info.type_name, &"registered");
        }
        map.finish()
    }
}
impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        ClientBuilder::new().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        type_dependencies: HashMap<TypeId, Instance>,
        max_depth: usize,
        detect_cycles: bool,
    ) -> Self {
        Client {
            type_dependencies,
            max_depth,
            detect_cycles,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

// Type registry
impl Client {
    /// Registers the implementation of type `T`, replacing any previous one
    pub fn set_type_dependency<T: Injectable>(&mut self, value: T) -> &mut Self {
        let instance = Instance::new(value);
        self.type_dependencies.insert(instance.info.type_id, instance);
        self
    }

    /// Registers an already shared implementation of type `T`
    pub fn set_shared_type_dependency<T: Injectable>(&mut self, value: Arc<T>) -> &mut Self {
        let instance = Instance::from_arc(value);
        self.type_dependencies.insert(instance.info.type_id, instance);
        self
    }

    /// Looks up the implementation registered for a type
    pub fn get_type_dependency(&self, info: &TypeInfo) -> Option<Instance> {
        self.type_dependencies.get(&info.type_id).cloned()
    }

    /// Typed variant of [Client::get_type_dependency]
    pub fn get<T: Injectable>(&self) -> Option<Arc<T>> {
        self.type_dependencies
            .get(&TypeId::of::<T>())
            .and_then(|instance| instance.downcast().ok())
    }

    pub fn has_type_dependency<T: Injectable>(&self) -> bool {
        self.type_dependencies.contains_key(&TypeId::of::<T>())
    }

    /// Removes the implementation of type `T`, returning it if it was registered
    pub fn remove_type_dependency<T: Injectable>(&mut self) -> Option<Instance> {
        let removed = self.type_dependencies.remove(&TypeId::of::<T>());
        if removed.is_none() {
            tracing::debug!("Tried to remove unregistered type {}", type_name::<T>());
        }
        removed
    }
}

// Callback execution
impl Client {
    /// Executes a callback within a context, blocking the current thread
    ///
    /// Fails with [InjectError::AsyncOnly] if the callback, or any callback it
    /// depends on, is asynchronous.
    pub fn execute_with_ctx(&self, ctx: &Ctx, callback: &CallbackSig) -> Result<Instance, InjectError> {
        let child = self.enter(ctx, callback)?;
        tracing::trace!("Executing callback {}", callback.name());
        callback.call(child)
    }

    /// Executes a callback within a context, suspending on asynchronous dependencies
    ///
    /// Nothing runs until the returned future is polled.
    pub fn execute_with_ctx_async(
        &self,
        ctx: &Ctx,
        callback: &CallbackSig,
    ) -> BoxFuture<'static, Result<Instance, InjectError>> {
        let child = match self.enter(ctx, callback) {
            Ok(child) => child,
            Err(e) => return futures::future::ready(Err(e)).boxed(),
        };
        tracing::trace!("Executing callback {} asynchronously", callback.name());
        callback.call_async(child)
    }

    /// Executes a callback in a fresh [BasicContext]
    pub fn call_with_di(self: &Arc<Self>, callback: &CallbackSig) -> Result<Instance, InjectError> {
        let ctx = BasicContext::shared(self.clone());
        self.execute_with_ctx(&ctx, callback)
    }

    /// Asynchronously executes a callback in a fresh [BasicContext]
    pub fn call_with_async_di(
        self: &Arc<Self>,
        callback: &CallbackSig,
    ) -> BoxFuture<'static, Result<Instance, InjectError>> {
        let ctx = BasicContext::shared(self.clone());
        self.execute_with_ctx_async(&ctx, callback)
    }

    /// Creates the context a callback executes in
    ///
    /// Rejects callbacks already executing on the same branch, and branches
    /// deeper than the configured limit.
    fn enter(&self, ctx: &Ctx, callback: &CallbackSig) -> Result<Ctx, InjectError> {
        let chain = ctx.call_chain();
        let id = callback.id();

        if self.detect_cycles {
            if let Some(start) = chain.iter().position(|frame| frame.id == id) {
                let mut names: Vec<_> = chain[start..].iter().map(|frame| frame.name).collect();
                names.push(callback.name());
                tracing::debug!("Circular callback dependency through {:?}", names);
                return Err(InjectError::CircularDependency { chain: names });
            }
        }

        if chain.len() >= self.max_depth {
            return Err(InjectError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let frame = CallFrame {
            id,
            name: callback.name(),
        };
        Ok(Arc::new(CallbackContext::new(ctx.clone(), frame)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_type_dependency_replaces_previous() {
        let mut client = Client::new();
        client.set_type_dependency(1_u32).set_type_dependency(2_u32);

        assert_eq!(*client.get::<u32>().unwrap(), 2);
        assert!(client.has_type_dependency::<u32>());
    }

    #[test]
    fn remove_type_dependency() {
        let mut client = Client::new();
        client.set_type_dependency(String::from("value"));

        assert!(client.remove_type_dependency::<String>().is_some());
        assert!(client.remove_type_dependency::<String>().is_none());
        assert!(client.get_type_dependency(&TypeInfo::of::<String>()).is_none());
    }

    #[test]
    fn shared_type_dependency_keeps_allocation() {
        let value = Arc::new(vec![1, 2, 3]);
        let mut client = Client::new();
        client.set_shared_type_dependency(value.clone());

        assert!(Arc::ptr_eq(&client.get::<Vec<i32>>().unwrap(), &value));
    }

    #[test]
    fn call_with_di_runs_callback() {
        let client = Arc::new(Client::new());
        let callback = CallbackSig::new(|_| Ok("nyaa"));

        let result = client.call_with_di(&callback).unwrap();

        assert_eq!(*result.downcast::<&str>().unwrap(), "nyaa");
    }

    #[test]
    fn debug_lists_registered_types() {
        let mut client = Client::new();
        client.set_type_dependency(3_u8);

        assert!(format!("{client:?}").contains("u8"));
    }
}
