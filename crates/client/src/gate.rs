//! Visibility gate: hide UI elements the current user may not use.
//!
//! [`PermissionGate`] mirrors a declarative directive: it evaluates when the
//! element is mounted and whenever its binding is updated, reading the
//! session's codes at that moment. A session change alone does not
//! re-evaluate an already mounted element; use [`ReactiveGate`] when the
//! element must follow session changes.
//!
//! A denied element is hidden, never removed, so a later evaluation can show
//! it again without re-creating it.

use cmsadmin_auth::{Requirement, SessionStore, SessionWatch, satisfies};

/// An element whose display can be suppressed.
pub trait Displayable {
    fn set_hidden(&mut self, hidden: bool);
    fn is_hidden(&self) -> bool;
}

/// Headless element state, for renderers that apply visibility themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visibility {
    hidden: bool,
}

impl Displayable for Visibility {
    fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Evaluate `binding` against the current codes and apply the result to `el`.
///
/// An unrestricted binding always shows the element.
fn apply<E: Displayable + ?Sized>(el: &mut E, binding: &Requirement, store: &SessionStore) {
    if binding.is_unrestricted() {
        el.set_hidden(false);
        return;
    }
    let allowed = satisfies(binding, &store.access_codes());
    el.set_hidden(!allowed);
}

/// Lifecycle-driven gate (mount + update).
#[derive(Debug, Clone)]
pub struct PermissionGate {
    session: SessionStore,
}

impl PermissionGate {
    pub fn new(session: SessionStore) -> Self {
        Self { session }
    }

    pub fn mounted<E: Displayable + ?Sized>(&self, el: &mut E, binding: &Requirement) {
        apply(el, binding, &self.session);
    }

    pub fn updated<E: Displayable + ?Sized>(&self, el: &mut E, binding: &Requirement) {
        apply(el, binding, &self.session);
    }
}

/// Gate that re-evaluates on every session store update.
#[derive(Debug)]
pub struct ReactiveGate<E: Displayable> {
    session: SessionStore,
    rx: SessionWatch,
    binding: Requirement,
    element: E,
}

impl<E: Displayable> ReactiveGate<E> {
    /// Attach to `element` and evaluate immediately.
    pub fn attach(session: SessionStore, binding: Requirement, mut element: E) -> Self {
        let mut rx = session.subscribe();
        rx.mark_unchanged();
        apply(&mut element, &binding, &session);
        Self {
            session,
            rx,
            binding,
            element,
        }
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn into_element(self) -> E {
        self.element
    }

    /// Replace the binding and re-evaluate (the "update" hook).
    pub fn rebind(&mut self, binding: Requirement) {
        self.binding = binding;
        apply(&mut self.element, &self.binding, &self.session);
    }

    /// Re-evaluate if the session changed since the last evaluation.
    /// Returns `true` when an evaluation happened.
    pub fn sync(&mut self) -> bool {
        match self.rx.has_changed() {
            Ok(true) => {
                self.rx.mark_unchanged();
                apply(&mut self.element, &self.binding, &self.session);
                true
            }
            _ => false,
        }
    }

    /// Wait for the next session change and re-evaluate.
    ///
    /// Returns `false` if the update channel is closed.
    pub async fn changed(&mut self) -> bool {
        if self.rx.changed().await.is_err() {
            return false;
        }
        self.rx.mark_unchanged();
        apply(&mut self.element, &self.binding, &self.session);
        true
    }
}
