//! Instance directory registration.

use std::collections::HashSet;
use std::sync::RwLock;

use tracing::debug;

use vbl_types::InstanceId;

/// Directory of sibling store instances.
///
/// Registration happens exactly once, at engine construction, and must not
/// fail: a directory that cannot record an identity is a deployment problem,
/// not a runtime one.
pub trait InstanceDirectory: Send + Sync {
    /// Record the given instance identity.
    fn register(&self, id: InstanceId);
}

/// In-memory directory for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    registered: RwLock<HashSet<InstanceId>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has been registered.
    pub fn is_registered(&self, id: &InstanceId) -> bool {
        self.registered
            .read()
            .expect("directory lock poisoned")
            .contains(id)
    }

    /// Number of registered instances.
    pub fn len(&self) -> usize {
        self.registered.read().expect("directory lock poisoned").len()
    }

    /// Returns `true` if no instance has registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InstanceDirectory for InMemoryDirectory {
    fn register(&self, id: InstanceId) {
        self.registered
            .write()
            .expect("directory lock poisoned")
            .insert(id);
        debug!(instance = %id, "instance registered");
    }
}
