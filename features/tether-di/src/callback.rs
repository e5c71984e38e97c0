use std::{any::type_name, fmt::Debug, future::Future, sync::Arc};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    context::Ctx,
    descriptor::Injected,
    errors::InjectError,
    types::{Injectable, Instance},
};

/// A blocking callback, erased to return an [Instance]
///
/// Receives the resolved values of its declared dependencies, in declaration order.
pub type BlockingFn = dyn Fn(Ctx, Vec<Instance>) -> Result<Instance, InjectError> + Send + Sync;
/// A suspending callback, erased to return an [Instance]
pub type SuspendingFn =
    dyn Fn(Ctx, Vec<Instance>) -> BoxFuture<'static, Result<Instance, InjectError>> + Send + Sync;

/// Identity of a callback - clones of the same [CallbackSig] share it
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct CallbackId(usize);

#[derive(Clone)]
enum CallbackKind {
    Blocking(Arc<BlockingFn>),
    Suspending(Arc<SuspendingFn>),
}

/// A callback whose return value supplies an injected dependency
///
/// The callback receives the context it is executed in, and can resolve its own
/// dependencies through it, forming a resolution tree.
///
/// Dependencies can also be declared up front with [CallbackSig::with_deps]. Those
/// are resolved depth-first before the callback runs, in the mode of the caller:
/// blocking resolution resolves them blocking, asynchronous resolution awaits them.
/// A blocking callback with an asynchronous declared dependency therefore works
/// on the asynchronous path.
///
/// A callback is either blocking or suspending. Suspending callbacks can only be
/// executed by the asynchronous resolution path.
#[derive(Clone)]
pub struct CallbackSig {
    name: &'static str,
    deps: Arc<[Injected]>,
    kind: CallbackKind,
}
impl Debug for CallbackSig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackSig")
            .field("name", &self.name)
            .field("deps", &self.deps.len())
            .field("is_async", &self.is_async())
            .finish()
    }
}

impl CallbackSig {
    /// Wraps a blocking callback
    pub fn new<T, F>(callback: F) -> Self
    where
        T: Injectable,
        F: Fn(Ctx) -> Result<T, InjectError> + Send + Sync + 'static,
    {
        let erased = move |ctx: Ctx, _: Vec<Instance>| callback(ctx).map(Instance::new);
        CallbackSig {
            name: type_name::<F>(),
            deps: Vec::new().into(),
            kind: CallbackKind::Blocking(Arc::new(erased)),
        }
    }

    /// Wraps a blocking callback taking the values of `deps`
    pub fn with_deps<T, F>(deps: Vec<Injected>, callback: F) -> Self
    where
        T: Injectable,
        F: Fn(Ctx, Vec<Instance>) -> Result<T, InjectError> + Send + Sync + 'static,
    {
        let erased = move |ctx: Ctx, args: Vec<Instance>| callback(ctx, args).map(Instance::new);
        CallbackSig {
            name: type_name::<F>(),
            deps: deps.into(),
            kind: CallbackKind::Blocking(Arc::new(erased)),
        }
    }

    /// Wraps a suspending callback
    pub fn new_async<T, F, Fut>(callback: F) -> Self
    where
        T: Injectable,
        F: Fn(Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, InjectError>> + Send + 'static,
    {
        let erased = move |ctx: Ctx, _: Vec<Instance>| {
            callback(ctx).map(|res| res.map(Instance::new)).boxed()
        };
        CallbackSig {
            name: type_name::<F>(),
            deps: Vec::new().into(),
            kind: CallbackKind::Suspending(Arc::new(erased)),
        }
    }

    /// Wraps a suspending callback taking the values of `deps`
    pub fn with_deps_async<T, F, Fut>(deps: Vec<Injected>, callback: F) -> Self
    where
        T: Injectable,
        F: Fn(Ctx, Vec<Instance>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, InjectError>> + Send + 'static,
    {
        let erased = move |ctx: Ctx, args: Vec<Instance>| {
            callback(ctx, args).map(|res| res.map(Instance::new)).boxed()
        };
        CallbackSig {
            name: type_name::<F>(),
            deps: deps.into(),
            kind: CallbackKind::Suspending(Arc::new(erased)),
        }
    }

    /// Replaces the generated name used in diagnostics
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Dependencies resolved before the callback runs
    pub fn deps(&self) -> &[Injected] {
        &self.deps
    }

    pub fn is_async(&self) -> bool {
        matches!(self.kind, CallbackKind::Suspending(_))
    }

    pub fn id(&self) -> CallbackId {
        let ptr = match &self.kind {
            CallbackKind::Blocking(f) => Arc::as_ptr(f) as *const (),
            CallbackKind::Suspending(f) => Arc::as_ptr(f) as *const (),
        };
        CallbackId(ptr as usize)
    }

    /// Resolves the declared dependencies, then runs the callback on the current thread
    ///
    /// Fails with [InjectError::AsyncOnly] for suspending callbacks, without polling them.
    pub(crate) fn call(&self, ctx: Ctx) -> Result<Instance, InjectError> {
        let CallbackKind::Blocking(f) = &self.kind else {
            return Err(InjectError::AsyncOnly {
                callback: self.name,
            });
        };

        let args = self
            .deps
            .iter()
            .map(|dep| dep.resolve(&ctx))
            .collect::<Result<Vec<_>, _>>()?;
        f(ctx, args)
    }

    /// Resolves the declared dependencies and runs the callback once the returned future is polled
    pub(crate) fn call_async(&self, ctx: Ctx) -> BoxFuture<'static, Result<Instance, InjectError>> {
        let deps = self.deps.clone();
        let kind = self.kind.clone();
        async move {
            let mut args = Vec::with_capacity(deps.len());
            for dep in deps.iter() {
                args.push(dep.resolve_async(&ctx).await?);
            }

            match kind {
                CallbackKind::Blocking(f) => f(ctx, args),
                CallbackKind::Suspending(f) => f(ctx, args).await,
            }
        }
        .boxed()
    }
}
