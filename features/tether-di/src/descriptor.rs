//! Descriptors of injected dependencies
//!
//! A descriptor is built once, when a dependency is declared, and resolved
//! against a live context every time the dependency is needed. Resolution
//! never mutates the descriptor.

use std::{any::type_name, fmt::Debug, future::Future, marker::PhantomData, sync::Arc};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    callback::CallbackSig,
    context::{Context, Ctx},
    errors::{DeclarationError, InjectError},
    types::{Injectable, Instance, TypeInfo},
};

/// A requested type expression - either a single type or a union of expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Single(TypeInfo),
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    /// Expands nested unions into their member types, in declaration order
    ///
    /// Repeated members only keep their first occurrence.
    pub fn flatten(&self) -> Vec<TypeInfo> {
        let mut types: Vec<TypeInfo> = Vec::new();
        let mut pending = vec![self];

        while let Some(expr) = pending.pop() {
            match expr {
                TypeExpr::Single(info) => {
                    if !types.contains(info) {
                        types.push(*info);
                    }
                }
                // Reversed so the first member is popped first
                TypeExpr::Union(members) => pending.extend(members.iter().rev()),
            }
        }

        types
    }
}

/// The `type` half of a declaration: what to look up, and what to fall back to
#[derive(Clone)]
pub struct TypeRequest {
    expr: TypeExpr,
    default: Option<Instance>,
}
impl Debug for TypeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRequest")
            .field("expr", &self.expr)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

impl TypeRequest {
    pub fn of<T: Injectable>() -> Self {
        TypeRequest {
            expr: TypeExpr::Single(TypeInfo::of::<T>()),
            default: None,
        }
    }

    /// A union of other requests, their members tried in the given order
    ///
    /// Defaults of the members are discarded.
    pub fn union(members: impl IntoIterator<Item = TypeRequest>) -> Self {
        TypeRequest {
            expr: TypeExpr::Union(members.into_iter().map(|member| member.expr).collect()),
            default: None,
        }
    }

    /// Adds `T` as the last member of this request's union
    pub fn or<T: Injectable>(self) -> Self {
        let next = TypeExpr::Single(TypeInfo::of::<T>());
        let expr = match self.expr {
            TypeExpr::Union(mut members) => {
                members.push(next);
                TypeExpr::Union(members)
            }
            single => TypeExpr::Union(vec![single, next]),
        };
        TypeRequest { expr, ..self }
    }

    /// Value to use when none of the types are registered
    pub fn with_default<T: Injectable>(self, default: T) -> Self {
        self.with_default_instance(Instance::new(default))
    }

    pub fn with_default_instance(mut self, default: Instance) -> Self {
        self.default = Some(default);
        self
    }

    pub fn expr(&self) -> &TypeExpr {
        &self.expr
    }
}

/// Descriptor of a type that a dependency is resolved to
#[derive(Clone)]
pub struct InjectedType {
    repr_type: String,
    types: Vec<TypeInfo>,
    default: Option<Instance>,
}
impl Debug for InjectedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InjectedType")
            .field("repr_type", &self.repr_type)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

impl InjectedType {
    /// Creates the descriptor from already expanded candidate types
    pub fn new(
        repr_type: impl Into<String>,
        types: Vec<TypeInfo>,
        default: Option<Instance>,
    ) -> Result<Self, DeclarationError> {
        if types.is_empty() {
            return Err(DeclarationError::EmptyUnion);
        }

        Ok(InjectedType {
            repr_type: repr_type.into(),
            types,
            default,
        })
    }

    /// Creates the descriptor from a request, flattening any union to its members
    pub fn from_request(request: TypeRequest) -> Result<Self, DeclarationError> {
        let types = request.expr.flatten();
        let repr_type = types
            .iter()
            .map(|info| info.type_name)
            .collect::<Vec<_>>()
            .join(" | ");

        Self::new(repr_type, types, request.default)
    }

    fn from_single(info: TypeInfo) -> Self {
        InjectedType {
            repr_type: info.type_name.to_string(),
            types: vec![info],
            default: None,
        }
    }

    /// Human readable representation of the requested type(s)
    pub fn repr_type(&self) -> &str {
        &self.repr_type
    }

    /// Candidate types, in the order they are tried
    pub fn types(&self) -> &[TypeInfo] {
        &self.types
    }

    pub fn default(&self) -> Option<&Instance> {
        self.default.as_ref()
    }

    /// Resolves to the first registered candidate type
    ///
    /// The first declared candidate wins when several are registered. Falls back
    /// to the default, and fails with [InjectError::MissingDependency] without one.
    pub fn resolve(&self, ctx: &dyn Context) -> Result<Instance, InjectError> {
        for info in &self.types {
            tracing::trace!("Looking up type dependency {}", info.type_name);
            if let Some(result) = ctx.get_type_dependency(info) {
                return Ok(result);
            }
        }

        if let Some(default) = &self.default {
            tracing::debug!("No implementation for {}, using default", self.repr_type);
            return Ok(default.clone());
        }

        tracing::debug!("No implementation for {}", self.repr_type);
        Err(InjectError::missing(self.repr_type.clone()))
    }
}

/// Descriptor of a callback used to resolve a dependency's value
#[derive(Debug, Clone)]
pub struct InjectedCallback {
    callback: CallbackSig,
}

impl InjectedCallback {
    pub fn new(callback: CallbackSig) -> Self {
        InjectedCallback { callback }
    }

    pub fn callback(&self) -> &CallbackSig {
        &self.callback
    }

    /// Synchronously resolves the callback, blocking the current thread
    ///
    /// Fails with [InjectError::AsyncOnly] if the callback or any of its callback
    /// dependencies are asynchronous.
    pub fn resolve(&self, ctx: &Ctx) -> Result<Instance, InjectError> {
        ctx.injection_client().execute_with_ctx(ctx, &self.callback)
    }

    /// Asynchronously resolves the callback
    pub fn resolve_async(&self, ctx: &Ctx) -> BoxFuture<'static, Result<Instance, InjectError>> {
        ctx.injection_client()
            .execute_with_ctx_async(ctx, &self.callback)
    }
}

/// An injected dependency - resolved either through a callback or a type lookup
#[derive(Debug, Clone)]
pub enum Injected {
    Callback(InjectedCallback),
    Type(InjectedType),
}

impl Injected {
    /// Resolves the dependency without suspending
    pub fn resolve(&self, ctx: &Ctx) -> Result<Instance, InjectError> {
        match self {
            Injected::Callback(callback) => callback.resolve(ctx),
            Injected::Type(injected_type) => injected_type.resolve(ctx.as_ref()),
        }
    }

    /// Resolves the dependency, suspending on asynchronous callbacks
    pub fn resolve_async(&self, ctx: &Ctx) -> BoxFuture<'static, Result<Instance, InjectError>> {
        match self {
            Injected::Callback(callback) => callback.resolve_async(ctx),
            Injected::Type(injected_type) => {
                futures::future::ready(injected_type.resolve(ctx.as_ref())).boxed()
            }
        }
    }
}

/// Declares a dependency of type `T`
///
/// Exactly one of a callback or a type request must be given. `T` is only used
/// to downcast the resolved value.
pub struct InjectedDescriptor<T> {
    injected: Injected,
    _type: PhantomData<fn() -> T>,
}
impl<T> Clone for InjectedDescriptor<T> {
    fn clone(&self) -> Self {
        InjectedDescriptor {
            injected: self.injected.clone(),
            _type: PhantomData,
        }
    }
}
impl<T> Debug for InjectedDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("InjectedDescriptor")
            .field(&self.injected)
            .finish()
    }
}

impl<T: Injectable> InjectedDescriptor<T> {
    pub fn new(
        callback: Option<CallbackSig>,
        type_request: Option<TypeRequest>,
    ) -> Result<Self, DeclarationError> {
        let injected = match (callback, type_request) {
            (None, None) => return Err(DeclarationError::MissingStrategy),
            (Some(_), Some(_)) => return Err(DeclarationError::ConflictingStrategy),
            (Some(callback), None) => Injected::Callback(InjectedCallback::new(callback)),
            (None, Some(request)) => Injected::Type(InjectedType::from_request(request)?),
        };

        Ok(InjectedDescriptor {
            injected,
            _type: PhantomData,
        })
    }

    pub fn from_callback(callback: CallbackSig) -> Self {
        InjectedDescriptor {
            injected: Injected::Callback(InjectedCallback::new(callback)),
            _type: PhantomData,
        }
    }

    pub fn from_type(request: TypeRequest) -> Result<Self, DeclarationError> {
        Self::new(None, Some(request))
    }

    /// Declares a dependency on `T` itself
    pub fn of_type() -> Self {
        InjectedDescriptor {
            injected: Injected::Type(InjectedType::from_single(TypeInfo::of::<T>())),
            _type: PhantomData,
        }
    }

    pub fn injected(&self) -> &Injected {
        &self.injected
    }

    pub fn into_injected(self) -> Injected {
        self.injected
    }

    pub fn resolve(&self, ctx: &Ctx) -> Result<Arc<T>, InjectError> {
        downcast_resolved(&self.injected.resolve(ctx)?)
    }

    pub fn resolve_async(
        &self,
        ctx: &Ctx,
    ) -> impl Future<Output = Result<Arc<T>, InjectError>> + Send + 'static {
        let pending = self.injected.resolve_async(ctx);
        async move { downcast_resolved(&pending.await?) }
    }
}

fn downcast_resolved<T: Injectable>(instance: &Instance) -> Result<Arc<T>, InjectError> {
    instance
        .downcast::<T>()
        .map_err(|actual_type| InjectError::DowncastFailed {
            required_type: type_name::<T>(),
            actual_type,
        })
}
