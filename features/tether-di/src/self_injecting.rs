use std::{fmt::Debug, sync::Arc};

use futures::{future::BoxFuture, FutureExt};

use crate::{
    callback::CallbackSig,
    client::Client,
    errors::{InjectError, LocalError},
    types::Instance,
};

/// Returns the client a self-injecting callback runs with
pub type ClientGetter = Arc<dyn Fn() -> Result<Arc<Client>, LocalError> + Send + Sync>;

/// A callback bound to a client, executed synchronously on call
#[derive(Clone)]
pub struct SelfInjecting {
    get_client: ClientGetter,
    callback: CallbackSig,
}
impl Debug for SelfInjecting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SelfInjecting").field(&self.callback).finish()
    }
}

impl SelfInjecting {
    pub fn new(client: Arc<Client>, callback: CallbackSig) -> Self {
        Self::with_getter(Arc::new(move || Ok::<_, LocalError>(client.clone())), callback)
    }

    /// Looks the client up on every call instead of binding it
    pub fn with_getter(get_client: ClientGetter, callback: CallbackSig) -> Self {
        SelfInjecting {
            get_client,
            callback,
        }
    }

    pub fn callback(&self) -> &CallbackSig {
        &self.callback
    }

    pub fn call(&self) -> Result<Instance, InjectError> {
        (self.get_client)()?.call_with_di(&self.callback)
    }
}

/// A callback bound to a client, executed asynchronously on call
#[derive(Clone)]
pub struct AsyncSelfInjecting {
    get_client: ClientGetter,
    callback: CallbackSig,
}
impl Debug for AsyncSelfInjecting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AsyncSelfInjecting")
            .field(&self.callback)
            .finish()
    }
}

impl AsyncSelfInjecting {
    pub fn new(client: Arc<Client>, callback: CallbackSig) -> Self {
        Self::with_getter(Arc::new(move || Ok::<_, LocalError>(client.clone())), callback)
    }

    pub fn with_getter(get_client: ClientGetter, callback: CallbackSig) -> Self {
        AsyncSelfInjecting {
            get_client,
            callback,
        }
    }

    pub fn callback(&self) -> &CallbackSig {
        &self.callback
    }

    /// The client is looked up when this is called, not when the future is polled
    pub fn call(&self) -> BoxFuture<'static, Result<Instance, InjectError>> {
        match (self.get_client)() {
            Ok(client) => client.call_with_async_di(&self.callback),
            Err(e) => futures::future::ready(Err(e.into())).boxed(),
        }
    }
}
