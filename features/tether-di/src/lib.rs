//! Tether DI resolves injected dependencies at call time.
//!
//! A dependency is declared once as a descriptor, either backed by a callback
//! whose return value supplies it, or by one or more types looked up in the
//! client's registry. The descriptor is then resolved against a live context,
//! synchronously or asynchronously.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use tether_di::{BasicContext, CallbackSig, Client, Ctx, InjectedDescriptor, TypeRequest};
//!
//! struct Database {
//!     url: String,
//! }
//!
//! let mut client = Client::new();
//! client.set_type_dependency(Database {
//!     url: "sqlite::memory:".to_string(),
//! });
//! let ctx = BasicContext::shared(Arc::new(client));
//!
//! let database = InjectedDescriptor::<Database>::from_type(TypeRequest::of::<Database>()).unwrap();
//! assert_eq!(database.resolve(&ctx).unwrap().url, "sqlite::memory:");
//!
//! let url_len = InjectedDescriptor::<usize>::from_callback(CallbackSig::new(|ctx: Ctx| {
//!     let database = ctx.resolve::<Arc<Database>>()?;
//!     Ok(database.url.len())
//! }));
//! assert_eq!(*url_len.resolve(&ctx).unwrap(), 15);
//! ```
//!
//! Tether DI consists of the following components:
//!
//! 1. Descriptor - declaring what must be injected and resolving it
//! 2. Callback - the callables backing callback dependencies
//! 3. Client - the type registry, and execution of callbacks within a context
//! 4. Context - threads lookups through one resolution tree
//! 5. Local - a client bound to the current thread

pub mod builder;
pub mod callback;
pub mod client;
pub mod context;
pub mod descriptor;
pub mod errors;
pub mod local;
pub mod resolver;
pub mod self_injecting;
pub mod types;

pub use builder::ClientBuilder;
pub use callback::{CallbackId, CallbackSig};
pub use client::Client;
pub use context::{BasicContext, CallFrame, Context, Ctx};
pub use descriptor::{Injected, InjectedCallback, InjectedDescriptor, InjectedType, TypeExpr, TypeRequest};
pub use errors::{DeclarationError, InjectError, LocalError};
pub use resolver::Resolver;
pub use self_injecting::{AsyncSelfInjecting, SelfInjecting};
pub use types::{DynError, Injectable, Instance, TypeInfo};
