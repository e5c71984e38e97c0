use std::{any::type_name, sync::Arc};

use crate::{
    context::Context,
    errors::InjectError,
    resolver::Resolver,
    types::{Injectable, TypeInfo},
};

impl<T: Injectable> Resolver for Arc<T> {
    fn resolve(ctx: &dyn Context) -> Result<Self, InjectError> {
        let resolved = ctx
            .get_type_dependency(&TypeInfo::of::<T>())
            .ok_or_else(|| InjectError::missing(type_name::<T>()))?;

        resolved
            .downcast::<T>()
            .map_err(|actual_type| InjectError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }
}

impl<Resolvable: Resolver> Resolver for Option<Resolvable> {
    fn resolve(ctx: &dyn Context) -> Result<Self, InjectError>
    where
        Self: Sized,
    {
        match Resolvable::resolve(ctx) {
            Ok(resolved) => Ok(Some(resolved)),
            // A missing dependency is fine for an Option, anything else still fails
            Err(InjectError::MissingDependency { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
