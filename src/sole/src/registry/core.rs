use std::collections::HashMap;
use std::thread::{self, ThreadId};

use oneshot::{Receiver, Sender};
use parking_lot::{RwLock, RwLockWriteGuard};

use crate::key::TypeKey;
use crate::registry::object_map::ObjectMap;
use crate::registry::SharedObject;

/// Type-erased state shared by every handle of a [`Registry`].
///
/// [`Registry`]: crate::registry::Registry
pub struct RegistryCore {
    managed: RwLock<ManagedObjectData>,
}

impl RegistryCore {
    pub fn new() -> Self {
        Self {
            managed: RwLock::new(ManagedObjectData::new()),
        }
    }

    pub fn get(&self, key: &TypeKey) -> Option<SharedObject> {
        let objects = &self.managed.read().objects;
        objects.get(key).map(|entry| entry.clone_shared())
    }

    pub fn len(&self) -> usize {
        self.managed.read().objects.len()
    }

    /// Decides what the calling thread should do to obtain the object
    /// identified by `key`.
    ///
    /// At most one [`Claim::Owned`] is handed out per key at a time, so the
    /// check and the registration of the constructing thread happen under the
    /// same write guard.
    pub fn claim(&self, key: TypeKey) -> Claim<'_> {
        if let Some(object) = self.get(&key) {
            tracing::trace!(key = %key, "singleton already constructed");
            return Claim::Constructed(object);
        }

        let mut managed = self.managed.write();

        if let Some(entry) = managed.objects.get(&key) {
            return Claim::Constructed(entry.clone_shared());
        }

        if let Some(context) = managed.constructing.get_mut(&key) {
            if context.is_constructed_by_current_thread() {
                tracing::warn!(key = %key, "singleton requested during its own construction");
                Claim::Reentrant
            } else {
                let (sender, receiver) = oneshot::channel();
                context.register_waiter(sender);
                Claim::Waiting(receiver)
            }
        } else {
            let on_thread = thread::current().id();
            let context = ConstructingObjectContext::new(on_thread);
            managed.constructing.insert(key, context);
            tracing::debug!(key = %key, "constructing singleton");
            Claim::Owned(ConstructionGuard::new(self, key))
        }
    }

    /// Blocks until the thread constructing `key` finishes, whatever the
    /// outcome.
    pub fn wait(&self, key: TypeKey, receiver: Receiver<WaitResponse>) {
        tracing::debug!(key = %key, "waiting for singleton constructed by another thread");
        match receiver.recv() {
            Ok(WaitResponse::Constructed) => {}
            Ok(WaitResponse::Abandoned) | Err(_) => {
                tracing::debug!(key = %key, "construction abandoned, retrying");
            }
        }
    }

    fn complete(&self, key: TypeKey, object: SharedObject) {
        let mut managed = self.managed.write();
        if managed.objects.insert(key, object).is_err() {
            unreachable!("only the thread owning the construction of `key` should insert it");
        }
        tracing::debug!(key = %key, "singleton constructed");
        self.notify_waiters(managed, key, WaitResponse::Constructed);
    }

    fn abandon(&self, key: TypeKey) {
        let managed = self.managed.write();
        tracing::debug!(key = %key, "singleton construction abandoned");
        self.notify_waiters(managed, key, WaitResponse::Abandoned);
    }

    fn notify_waiters(
        &self,
        mut managed: RwLockWriteGuard<ManagedObjectData>,
        key: TypeKey,
        response: WaitResponse,
    ) {
        if let Some(context) = managed.constructing.remove(&key) {
            drop(managed);
            context.notify(response);
        }
    }
}

/// The outcome of [`RegistryCore::claim`].
pub enum Claim<'a> {
    /// The object already exists.
    Constructed(SharedObject),
    /// Another thread is constructing the object.
    Waiting(Receiver<WaitResponse>),
    /// The calling thread must construct the object and report the result
    /// through the guard.
    Owned(ConstructionGuard<'a>),
    /// The calling thread is already constructing the object further up its
    /// stack.
    Reentrant,
}

/// Exclusive right to construct the object identified by `key`.
///
/// Dropping the guard without calling [`ConstructionGuard::complete`], either
/// on a failed construction or while unwinding from a panic, releases the key
/// so that later callers can try again.
pub struct ConstructionGuard<'a> {
    core: &'a RegistryCore,
    key: TypeKey,
    completed: bool,
}

impl<'a> ConstructionGuard<'a> {
    fn new(core: &'a RegistryCore, key: TypeKey) -> Self {
        Self {
            core,
            key,
            completed: false,
        }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn complete(mut self, object: SharedObject) {
        self.completed = true;
        self.core.complete(self.key, object);
    }
}

impl Drop for ConstructionGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            self.core.abandon(self.key);
        }
    }
}

struct ManagedObjectData {
    objects: ObjectMap,
    constructing: HashMap<TypeKey, ConstructingObjectContext>,
}

impl ManagedObjectData {
    fn new() -> Self {
        Self {
            objects: ObjectMap::new(),
            constructing: HashMap::new(),
        }
    }
}

struct ConstructingObjectContext {
    on_thread: ThreadId,
    waiters: Vec<Sender<WaitResponse>>,
}

impl ConstructingObjectContext {
    fn new(on_thread: ThreadId) -> Self {
        Self {
            on_thread,
            waiters: Vec::new(),
        }
    }

    fn is_constructed_by_current_thread(&self) -> bool {
        thread::current().id() == self.on_thread
    }

    fn register_waiter(&mut self, sender: Sender<WaitResponse>) {
        self.waiters.push(sender);
    }

    fn notify(self, response: WaitResponse) {
        for sender in self.waiters {
            let _ = sender.send(response);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResponse {
    Constructed,
    Abandoned,
}
