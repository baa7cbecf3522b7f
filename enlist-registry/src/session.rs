//! The fluent authoring context.
//!
//! An [`AuthoringSession`] carries the "current name" and "default group"
//! that let a caller open a name once and have the next builder pick it up.
//! Sessions are separate values, so two authoring chains never see each
//! other's current name.

use std::{cell::LazyCell, rc::Rc};

use enlist_core::ResourceId;

use crate::{BuildContext, Error, ObjectKind, Registrar, Result, SimpleBuilder, builder::Group};

pub struct AuthoringSession {
    owner: Registrar,
    current_name: Option<String>,
    default_group: Option<Group>,
}

impl AuthoringSession {
    pub(crate) fn new(owner: Registrar) -> Self {
        Self {
            owner,
            current_name: None,
            default_group: None,
        }
    }

    pub fn owner(&self) -> &Registrar {
        &self.owner
    }

    /// Make `name` the current name. Nothing clears it automatically.
    pub fn open(&mut self, name: impl Into<String>) -> &mut Self {
        self.current_name = Some(name.into());
        self
    }

    pub fn current_name(&self) -> Result<&str> {
        self.current_name.as_deref().ok_or(Error::CurrentNameNotSet)
    }

    /// Set the group builders from this session default to.
    ///
    /// `supplier` runs at most once, the first time any entry needs it.
    pub fn set_default_group<F>(&mut self, supplier: F) -> &mut Self
    where
        F: FnOnce() -> ResourceId + 'static,
    {
        let supplier: Box<dyn FnOnce() -> ResourceId> = Box::new(supplier);
        self.default_group = Some(Rc::new(LazyCell::new(supplier)));
        self
    }

    /// The default group, computing it if needed.
    pub fn default_group(&self) -> Option<ResourceId> {
        self.default_group.as_ref().map(|group| (**group).clone())
    }

    /// Start a builder for the current name using `factory`.
    ///
    /// `factory` receives the current name and this session as the builder's
    /// parent, so the builder's `build` returns here.
    pub fn entry<'s, B, F>(&'s mut self, factory: F) -> Result<B>
    where
        F: FnOnce(String, &'s mut Self) -> B,
    {
        let name = self.current_name()?.to_string();
        Ok(factory(name, self))
    }

    /// Start a [`SimpleBuilder`] for the current name.
    pub fn simple<T, F>(
        &mut self,
        kind: &ObjectKind<T>,
        factory: F,
    ) -> Result<SimpleBuilder<T, &mut Self>>
    where
        T: 'static,
        F: FnOnce(&BuildContext) -> eyre::Result<T> + 'static,
    {
        self.entry(|name, session| {
            let owner = session.owner.clone();
            let group = session.default_group.clone();
            SimpleBuilder::new(owner, session, &name, kind, factory).with_default_group(group)
        })
    }
}
