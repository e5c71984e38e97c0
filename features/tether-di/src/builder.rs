use std::{any::TypeId, collections::HashMap, sync::Arc};

use crate::{
    client::{Client, DEFAULT_MAX_DEPTH},
    types::{Injectable, Instance},
};

/// Configures and builds a [Client]
pub struct ClientBuilder {
    /// Type dependencies registered up front
    pub(crate) registered_instances: HashMap<TypeId, Instance>,
    /// Maximum number of nested callbacks on one resolution branch
    pub(crate) max_depth: usize,
    /// Whether a callback requiring itself fails fast
    pub(crate) detect_cycles: bool,
}
impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        ClientBuilder {
            registered_instances: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            detect_cycles: true,
        }
    }
}
impl ClientBuilder {
    pub fn add_instance<T: Injectable>(mut self, instance: T) -> Self {
        self.registered_instances
            .insert(TypeId::of::<T>(), Instance::new(instance));
        self
    }

    pub fn add_shared<T: Injectable>(mut self, instance: Arc<T>) -> Self {
        self.registered_instances
            .insert(TypeId::of::<T>(), Instance::from_arc(instance));
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Without cycle detection a self-requiring callback recurses until `max_depth` is hit
    pub fn detect_cycles(mut self, detect_cycles: bool) -> Self {
        self.detect_cycles = detect_cycles;
        self
    }

    pub fn build(self) -> Client {
        tracing::debug!(
            "Building client with {} type dependencies",
            self.registered_instances.len()
        );
        Client::from_parts(self.registered_instances, self.max_depth, self.detect_cycles)
    }
}
