use crate::{context::Context, errors::InjectError};

pub mod arc;

/// Statically typed resolution of a dependency from a context
///
/// Implemented for `Arc<T>` (a required type dependency) and `Option<R>`
/// (resolves to `None` when the dependency is missing).
pub trait Resolver {
    fn resolve(ctx: &dyn Context) -> Result<Self, InjectError>
    where
        Self: Sized;
}
