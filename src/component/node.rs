//! Node: The tree links every component embeds.
//!
//! Children are owned by their parent's child list. The parent link is a
//! `Weak` back-reference set and cleared together with the list entry, so
//! the tree never forms a reference cycle.

use super::{Component, ComponentBase};
use crate::animation::Params;
use crate::event::Event;
use crate::layout::{text, Element};
use std::cell::{OnceCell, RefCell};
use std::rc::{Rc, Weak};

/// Parent and children of one component.
///
/// Mutation goes through [`ComponentExt`](super::ComponentExt); the
/// `*_children` helpers here are the default behaviors of
/// [`ComponentBase`], callable from overrides that want to extend them.
#[derive(Default)]
pub struct ComponentNode {
    this: OnceCell<Weak<dyn ComponentBase>>,
    parent: RefCell<Option<Weak<dyn ComponentBase>>>,
    children: RefCell<Vec<Component>>,
}

impl ComponentNode {
    /// An unattached node with no children.
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn bind(&self, this: Weak<dyn ComponentBase>) {
        if self.this.set(this).is_err() {
            tracing::warn!("component bound twice, keeping the first binding");
        }
    }

    /// The component owning this node, while it is alive.
    pub fn this(&self) -> Option<Component> {
        self.this.get().and_then(Weak::upgrade)
    }

    pub(super) fn weak_this(&self) -> Option<Weak<dyn ComponentBase>> {
        self.this.get().cloned()
    }

    /// The parent, `None` for a root.
    pub fn parent(&self) -> Option<Component> {
        self.parent.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub(super) fn set_parent(&self, parent: Option<Weak<dyn ComponentBase>>) {
        *self.parent.borrow_mut() = parent;
    }

    /// A snapshot of the children. Dispatch iterates over snapshots so that
    /// handlers may add or detach components while being called.
    pub fn children(&self) -> Vec<Component> {
        self.children.borrow().clone()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.children.borrow().len()
    }

    /// Child `index`. Indexing past the end is a caller bug.
    pub fn child_at(&self, index: usize) -> Option<Component> {
        let children = self.children.borrow();
        debug_assert!(
            index < children.len(),
            "child index {index} out of range ({} children)",
            children.len()
        );
        children.get(index).cloned()
    }

    pub(super) fn push_child(&self, child: Component) {
        self.children.borrow_mut().push(child);
    }

    /// Remove `child` from the list, returning the owning handle.
    pub(super) fn remove_child(&self, child: *const ()) -> Option<Component> {
        let mut children = self.children.borrow_mut();
        let index = children
            .iter()
            .position(|c| std::ptr::addr_eq(Rc::as_ptr(c), child))?;
        Some(children.remove(index))
    }

    /// Move `child` to the front, keeping the order of the others.
    pub(crate) fn bring_to_front(&self, child: *const ()) {
        let mut children = self.children.borrow_mut();
        if let Some(index) = children
            .iter()
            .position(|c| std::ptr::addr_eq(Rc::as_ptr(c), child))
        {
            children[..=index].rotate_right(1);
        }
    }

    /// Position of `child` in the list.
    pub(crate) fn index_of(&self, child: *const ()) -> Option<usize> {
        self.children
            .borrow()
            .iter()
            .position(|c| std::ptr::addr_eq(Rc::as_ptr(c), child))
    }

    /// Delegate to the only child, or a placeholder.
    pub fn render_children(&self) -> Element {
        let only = {
            let children = self.children.borrow();
            (children.len() == 1).then(|| Rc::clone(&children[0]))
        };
        match only {
            Some(child) => child.render(),
            None => text("Not implemented component"),
        }
    }

    /// Offer `event` to the children in order until one handles it.
    pub fn dispatch_to_children(&self, event: &Event) -> bool {
        self.children().iter().any(|child| child.on_event(event))
    }

    /// Step every child's animation.
    pub fn animate_children(&self, params: &Params) {
        for child in self.children() {
            child.on_animation(params);
        }
    }

    /// The first focusable child.
    pub fn first_focusable_child(&self) -> Option<Component> {
        self.children().into_iter().find(|child| child.focusable())
    }

    /// Whether any child is focusable.
    pub fn any_child_focusable(&self) -> bool {
        self.children().iter().any(|child| child.focusable())
    }
}

impl Drop for ComponentNode {
    fn drop(&mut self) {
        for child in self.children.get_mut().drain(..) {
            child.node().set_parent(None);
        }
    }
}

impl std::fmt::Debug for ComponentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentNode")
            .field("attached", &self.parent().is_some())
            .field("children", &self.child_count())
            .finish()
    }
}
