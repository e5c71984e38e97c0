//! A client bound to the current thread
//!
//! Nothing here works before [initialize] was called on the calling thread.

use std::{cell::RefCell, sync::Arc};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    callback::CallbackSig,
    client::Client,
    errors::{InjectError, LocalError},
    self_injecting::{AsyncSelfInjecting, SelfInjecting},
    types::Instance,
};

thread_local! {
    static LOCAL_CLIENT: RefCell<Option<Arc<Client>>> = const { RefCell::new(None) };
}

/// Binds a client to the current thread, creating a default one if none is given
pub fn initialize(client: Option<Arc<Client>>) -> Result<(), LocalError> {
    LOCAL_CLIENT.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.is_some() {
            return Err(LocalError::AlreadyInitialized);
        }

        *slot = Some(client.unwrap_or_default());
        tracing::debug!("Initialized thread local client");
        Ok(())
    })
}

/// The client bound to the current thread
pub fn get() -> Result<Arc<Client>, LocalError> {
    try_get().ok_or(LocalError::NotInitialized)
}

/// The client bound to the current thread, if there is one
pub fn try_get() -> Option<Arc<Client>> {
    LOCAL_CLIENT.with(|slot| slot.borrow().clone())
}

/// The client bound to the current thread, or `default` without one
pub fn get_or(default: Arc<Client>) -> Arc<Client> {
    try_get().unwrap_or(default)
}

/// Executes a callback with the thread's client
pub fn call_with_di(callback: &CallbackSig) -> Result<Instance, InjectError> {
    get()?.call_with_di(callback)
}

/// Asynchronously executes a callback with the thread's client
///
/// The client is looked up immediately, on the calling thread.
pub fn call_with_async_di(callback: &CallbackSig) -> BoxFuture<'static, Result<Instance, InjectError>> {
    match get() {
        Ok(client) => client.call_with_async_di(callback),
        Err(e) => futures::future::ready(Err(e.into())).boxed(),
    }
}

/// Binds a callback to whichever client the calling thread has at call time
pub fn as_self_injecting(callback: CallbackSig) -> SelfInjecting {
    SelfInjecting::with_getter(Arc::new(get), callback)
}

pub fn as_self_async_injecting(callback: CallbackSig) -> AsyncSelfInjecting {
    AsyncSelfInjecting::with_getter(Arc::new(get), callback)
}

// Every test runs on its own thread, so the slot starts out empty
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_creates_client() {
        initialize(None).unwrap();

        assert!(get().is_ok());
    }

    #[test]
    fn initialize_keeps_passed_client() {
        let client = Arc::new(Client::new());
        initialize(Some(client.clone())).unwrap();

        assert!(Arc::ptr_eq(&get().unwrap(), &client));
    }

    #[test]
    fn initialize_twice_fails() {
        initialize(None).unwrap();

        assert_eq!(
            initialize(Some(Arc::new(Client::new()))),
            Err(LocalError::AlreadyInitialized)
        );
    }

    #[test]
    fn get_without_client_fails() {
        assert_eq!(get().unwrap_err(), LocalError::NotInitialized);
        assert!(try_get().is_none());
    }

    #[test]
    fn get_or_prefers_bound_client() {
        let fallback = Arc::new(Client::new());
        assert!(Arc::ptr_eq(&get_or(fallback.clone()), &fallback));

        let bound = Arc::new(Client::new());
        initialize(Some(bound.clone())).unwrap();

        assert!(Arc::ptr_eq(&get_or(fallback), &bound));
    }

    #[test]
    fn call_with_di_uses_local_client() {
        let mut client = Client::new();
        client.set_type_dependency(21_u32);
        initialize(Some(Arc::new(client))).unwrap();
        let callback = CallbackSig::new(|ctx: crate::context::Ctx| {
            let value = ctx.resolve::<Arc<u32>>()?;
            Ok(*value * 2)
        });

        let result = call_with_di(&callback).unwrap();
        let result_async = futures::executor::block_on(call_with_async_di(&callback)).unwrap();

        assert_eq!(*result.downcast::<u32>().unwrap(), 42);
        assert_eq!(*result_async.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn call_with_di_without_client_fails() {
        let error = call_with_di(&CallbackSig::new(|_| Ok(()))).unwrap_err();

        assert!(matches!(error, InjectError::Local(LocalError::NotInitialized)));
    }

    #[test]
    fn self_injecting_looks_up_client_on_call() {
        let bound = as_self_injecting(CallbackSig::new(|_| Ok("late")));
        assert!(bound.call().is_err());

        initialize(None).unwrap();

        assert_eq!(*bound.call().unwrap().downcast::<&str>().unwrap(), "late");
    }

    #[test]
    fn self_async_injecting_runs_with_local_client() {
        initialize(None).unwrap();
        let bound = as_self_async_injecting(CallbackSig::new_async(|_| async { Ok::<_, InjectError>(7_i8) }));

        let result = futures::executor::block_on(bound.call()).unwrap();

        assert_eq!(*result.downcast::<i8>().unwrap(), 7);
    }
}
