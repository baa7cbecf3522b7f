//! Identity tokens for kinds.
//!
//! A kind is identified by the token returned when it was created, never by its
//! name. Two kinds created with the same name are different kinds.

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_KIND_ID: AtomicU64 = AtomicU64::new(1);

/// Untyped identity of an object kind or generator kind.
///
/// Equality and hashing use the identity only; the name is for diagnostics.
#[derive(Clone)]
pub struct KindKey {
    id: u64,
    name: Rc<str>,
}

impl KindKey {
    pub(crate) fn fresh(name: &str) -> Self {
        Self {
            id: NEXT_KIND_ID.fetch_add(1, Ordering::Relaxed),
            name: Rc::from(name),
        }
    }

    /// Human-readable name the kind was created with.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for KindKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for KindKey {}

impl Hash for KindKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for KindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

impl fmt::Display for KindKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A family of registrable objects producing values of type `T`.
///
/// # Example
///
/// ```ignore
/// struct Block { light: u8 }
///
/// let blocks = ObjectKind::<Block>::new("block");
/// let torch = registrar.declare("torch", &blocks, |_| Ok(Block { light: 14 }))?;
/// ```
pub struct ObjectKind<T> {
    key: KindKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> ObjectKind<T> {
    /// Create a new kind. Every call returns a distinct kind.
    pub fn new(name: &str) -> Self {
        Self {
            key: KindKey::fresh(name),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &KindKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        self.key.name()
    }
}

impl<T> Clone for ObjectKind<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ObjectKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectKind").field(&self.key).finish()
    }
}
