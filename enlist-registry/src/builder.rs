//! The builder protocol.
//!
//! A builder knows its owner, its entry name, its kind and its parent. Calling
//! [`Builder::register`] consumes the builder and moves its configuration into
//! the construction thunk handed to the registration table, so nothing can
//! change the configuration after registration. [`Builder::build`] does the
//! same but returns the parent, letting a chain continue where it started.

use std::{cell::LazyCell, rc::Rc};

use enlist_core::ResourceId;

use crate::{
    DataGenerator, GeneratorKind, LazyHandle, ObjectKind, Registrar, Result, WeakRegistrar,
};

/// A lazily computed group id shared by every builder that consumes it.
pub(crate) type Group = Rc<LazyCell<ResourceId, Box<dyn FnOnce() -> ResourceId>>>;

/// Deferred construction of a builder's object.
pub type Thunk<T> = Box<dyn FnOnce(&ResourceId) -> eyre::Result<T>>;

/// Context passed to a [`SimpleBuilder`] factory when the entry is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Id of the entry being constructed.
    pub id: ResourceId,
    /// The group the entry belongs to, if one was set or defaulted.
    pub group: Option<ResourceId>,
}

/// Common contract of every object builder.
pub trait Builder: Sized {
    /// The object this builder constructs.
    type Object: 'static;
    /// Whatever started this builder; returned by [`build`](Self::build).
    type Parent;

    fn owner(&self) -> &Registrar;

    fn parent(&self) -> &Self::Parent;

    fn name(&self) -> &str;

    fn kind(&self) -> &ObjectKind<Self::Object>;

    /// Split the builder into its parent and its deferred construction.
    fn into_parts(self) -> (Self::Parent, Thunk<Self::Object>);

    /// Declare the entry and return its handle.
    fn register(self) -> Result<LazyHandle<Self::Object>> {
        self.register_and_return().map(|(handle, _)| handle)
    }

    /// Declare the entry and return to the parent.
    fn build(self) -> Result<Self::Parent> {
        self.register_and_return().map(|(_, parent)| parent)
    }

    fn register_and_return(self) -> Result<(LazyHandle<Self::Object>, Self::Parent)> {
        let owner = self.owner().clone();
        let name = self.name().to_string();
        let kind = self.kind().clone();

        let (parent, thunk) = self.into_parts();
        let handle = owner.declare(&name, &kind, thunk)?;
        Ok((handle, parent))
    }

    /// Set this entry's callback for a generator kind, replacing any previous
    /// one. The entry is this builder's (name, kind) pair.
    fn data<G, F>(self, kind: &GeneratorKind<G>, callback: F) -> Self
    where
        G: DataGenerator,
        F: Fn(&DataContext<Self::Object>, &mut G) -> eyre::Result<()> + 'static,
    {
        let context = DataContext {
            owner: self.owner().downgrade(),
            name: self.name().to_string(),
            kind: self.kind().clone(),
        };
        self.owner()
            .set_data_generator(self.name(), self.kind(), kind, move |generator| {
                callback(&context, generator)
            });
        self
    }

    /// Run `callback` with the constructed object during the register walk.
    fn on_register<F>(self, callback: F) -> Self
    where
        F: FnOnce(&Self::Object) -> eyre::Result<()> + 'static,
    {
        self.owner().on_register(self.name(), self.kind(), callback);
        self
    }
}

/// What an entry's data callback can see about its entry.
pub struct DataContext<T> {
    owner: WeakRegistrar,
    name: String,
    kind: ObjectKind<T>,
}

impl<T: 'static> DataContext<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ObjectKind<T> {
        &self.kind
    }

    /// Handle of the entry. Fails if the entry was never registered.
    pub fn handle(&self) -> Result<LazyHandle<T>> {
        self.owner.upgrade()?.get(&self.name, &self.kind)
    }

    /// Id of the entry.
    pub fn id(&self) -> Result<ResourceId> {
        self.handle().map(|handle| handle.id().clone())
    }

    /// The constructed entry.
    pub fn entry(&self) -> Result<Rc<T>> {
        self.handle()?.get()
    }
}

/// Builder for kinds that need nothing beyond a factory closure.
///
/// # Example
///
/// ```ignore
/// let handle = registrar
///     .simple("torch", &blocks, |ctx| Ok(Block::new(ctx.id.clone())))
///     .group("demo:lights".parse()?)
///     .register()?;
/// ```
pub struct SimpleBuilder<T: 'static, P> {
    owner: Registrar,
    parent: P,
    name: String,
    kind: ObjectKind<T>,
    factory: Box<dyn FnOnce(&BuildContext) -> eyre::Result<T>>,
    group: Option<Group>,
}

impl<T: 'static, P> SimpleBuilder<T, P> {
    pub fn new<F>(owner: Registrar, parent: P, name: &str, kind: &ObjectKind<T>, factory: F) -> Self
    where
        F: FnOnce(&BuildContext) -> eyre::Result<T> + 'static,
    {
        Self {
            owner,
            parent,
            name: name.to_string(),
            kind: kind.clone(),
            factory: Box::new(factory),
            group: None,
        }
    }

    /// Put the entry in `group`, overriding any session default.
    pub fn group(mut self, group: ResourceId) -> Self {
        let supplier: Box<dyn FnOnce() -> ResourceId> = Box::new(move || group);
        self.group = Some(Rc::new(LazyCell::new(supplier)));
        self
    }

    pub(crate) fn with_default_group(mut self, group: Option<Group>) -> Self {
        self.group = group;
        self
    }

    /// Start a nested builder for the same name under another kind.
    ///
    /// The child inherits this builder's group; its [`build`](Builder::build)
    /// returns this builder.
    pub fn child<U, F>(self, kind: &ObjectKind<U>, factory: F) -> SimpleBuilder<U, Self>
    where
        U: 'static,
        F: FnOnce(&BuildContext) -> eyre::Result<U> + 'static,
    {
        let owner = self.owner.clone();
        let name = self.name.clone();
        let group = self.group.clone();
        SimpleBuilder::new(owner, self, &name, kind, factory).with_default_group(group)
    }
}

impl<T: 'static, P> Builder for SimpleBuilder<T, P> {
    type Object = T;
    type Parent = P;

    fn owner(&self) -> &Registrar {
        &self.owner
    }

    fn parent(&self) -> &P {
        &self.parent
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &ObjectKind<T> {
        &self.kind
    }

    fn into_parts(self) -> (P, Thunk<T>) {
        let Self {
            parent,
            factory,
            group,
            ..
        } = self;

        let thunk: Thunk<T> = Box::new(move |id: &ResourceId| {
            let context = BuildContext {
                id: id.clone(),
                group: group.map(|group| (**group).clone()),
            };
            factory(&context)
        });
        (parent, thunk)
    }
}
