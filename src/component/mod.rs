//! Component module: The retained tree of interactive nodes.
//!
//! A component renders to an [`Element`], reacts to [`Event`]s and animation
//! steps, and owns an ordered list of children. Every capability has a
//! default that delegates to the children, so a widget only overrides what
//! it changes:
//!
//! | Method | Default |
//! |---|---|
//! | [`render`](ComponentBase::render) | the only child's element, else a placeholder |
//! | [`on_event`](ComponentBase::on_event) | children in order, first `true` wins |
//! | [`on_animation`](ComponentBase::on_animation) | every child |
//! | [`active_child`](ComponentBase::active_child) | first focusable child |
//! | [`focusable`](ComponentBase::focusable) | any child focusable |
//!
//! Focus is not a flag. A component is focused when it is focusable and
//! every ancestor considers the branch leading to it its active child;
//! [`ComponentExt::take_focus`] rewrites the ancestors' selection to get
//! there.
//!
//! The tree is single-threaded: it lives on the thread running the screen
//! loop. Other threads reach it by posting closures through a
//! [`ScreenHandle`](crate::screen::ScreenHandle).

mod captured_mouse;
pub mod container;
mod decorators;
mod node;

pub use captured_mouse::CapturedMouse;
pub use container::{Container, ContainerMode};
pub use decorators::{catch_event, focusable_renderer, maybe, renderer, renderer_with};
pub use node::ComponentNode;

use crate::animation::Params;
use crate::event::Event;
use crate::layout::Element;
use std::rc::Rc;

/// Shared handle to a component.
pub type Component = Rc<dyn ComponentBase>;

/// Overridable capabilities of a component.
pub trait ComponentBase {
    /// Tree links. Usually a `node: ComponentNode` field.
    fn node(&self) -> &ComponentNode;

    /// Produce the element to paint.
    fn render(&self) -> Element {
        self.node().render_children()
    }

    /// React to an event. Returns whether it was handled.
    fn on_event(&self, event: &Event) -> bool {
        self.node().dispatch_to_children(event)
    }

    /// Advance animations by one step.
    fn on_animation(&self, params: &Params) {
        self.node().animate_children(params);
    }

    /// The child currently selected, focused or not.
    fn active_child(&self) -> Option<Component> {
        self.node().first_focusable_child()
    }

    /// Whether this component, or something below it, can take keyboard focus.
    fn focusable(&self) -> bool {
        self.node().any_child_focusable()
    }

    /// Make `child` the active child. Ignored by default.
    fn set_active_child(&self, _child: &dyn ComponentBase) {}
}

/// Wrap a component so it can be linked into a tree.
///
/// The returned `Rc` coerces to a [`Component`]:
///
/// ```
/// use treeterm::component::{make, Component, Container};
///
/// let list: Component = make(Container::vertical());
/// ```
pub fn make<T: ComponentBase + 'static>(component: T) -> Rc<T> {
    let component = Rc::new(component);
    let erased: Component = Rc::clone(&component) as Component;
    component.node().bind(Rc::downgrade(&erased));
    component
}

/// Tree operations shared by every component.
pub trait ComponentExt: ComponentBase {
    /// Append `child`, detaching it from its previous parent first.
    fn add(&self, child: Component) {
        child.detach();
        let parent = self.node().weak_this();
        debug_assert!(parent.is_some(), "component was not created with `make`");
        child.node().set_parent(parent);
        self.node().push_child(child);
    }

    /// Remove this component from its parent. No-op when detached.
    fn detach(&self) {
        let Some(parent) = self.node().parent() else {
            return;
        };
        self.node().set_parent(None);
        let removed = parent.node().remove_child(identity(self));
        if removed.is_none() {
            tracing::warn!("detached component was missing from its parent's children");
        }
    }

    /// The parent, `None` at the root.
    fn parent(&self) -> Option<Component> {
        self.node().parent()
    }

    /// Number of children.
    fn child_count(&self) -> usize {
        self.node().child_count()
    }

    /// Child `index`.
    fn child_at(&self, index: usize) -> Option<Component> {
        self.node().child_at(index)
    }

    /// Remove every child.
    fn detach_all_children(&self) {
        for child in self.node().children() {
            child.detach();
        }
    }

    /// Whether the parent considers this component its active child. A root
    /// is always active.
    fn active(&self) -> bool {
        self.node().parent().map_or(true, |parent| {
            parent
                .active_child()
                .is_some_and(|active| std::ptr::addr_eq(Rc::as_ptr(&active), identity(self)))
        })
    }

    /// Whether this component is focusable and on the active path from the
    /// root.
    fn focused(&self) -> bool {
        if !self.active() {
            return false;
        }
        let mut current = self.node().parent();
        while let Some(node) = current {
            if !node.active() {
                return false;
            }
            current = node.node().parent();
        }
        self.focusable()
    }

    /// Make every ancestor select the branch leading here.
    fn take_focus(&self) {
        let Some(mut child) = self.node().this() else {
            return;
        };
        while let Some(parent) = child.node().parent() {
            parent.set_active_child(child.as_ref());
            child = parent;
        }
    }

    /// Try to take exclusive ownership of the mouse from the screen that
    /// dispatched `event`. Returns `None` while someone else holds it.
    fn capture_mouse(&self, event: &Event) -> Option<CapturedMouse> {
        match event.screen() {
            Some(screen) => screen.capture_mouse(),
            None => Some(CapturedMouse::detached()),
        }
    }
}

impl<T: ComponentBase + ?Sized> ComponentExt for T {}

/// Address of a component, for identity comparisons.
fn identity<T: ?Sized>(component: &T) -> *const () {
    std::ptr::from_ref(component).cast::<()>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::text;
    use proptest::prelude::*;
    use std::cell::Cell;

    /// A focusable leaf counting the events it receives.
    #[derive(Default)]
    struct Leaf {
        node: ComponentNode,
        focusable: bool,
        handled: Cell<usize>,
    }

    impl ComponentBase for Leaf {
        fn node(&self) -> &ComponentNode {
            &self.node
        }

        fn render(&self) -> Element {
            text("leaf")
        }

        fn on_event(&self, _event: &Event) -> bool {
            self.handled.set(self.handled.get() + 1);
            true
        }

        fn focusable(&self) -> bool {
            self.focusable
        }
    }

    #[derive(Default)]
    struct Plain {
        node: ComponentNode,
    }

    impl ComponentBase for Plain {
        fn node(&self) -> &ComponentNode {
            &self.node
        }
    }

    fn leaf(focusable: bool) -> Rc<Leaf> {
        make(Leaf {
            focusable,
            ..Leaf::default()
        })
    }

    fn plain() -> Rc<Plain> {
        make(Plain::default())
    }

    fn same(a: &Component, b: &Component) -> bool {
        Rc::ptr_eq(a, b)
    }

    #[test]
    fn test_add_reparents() {
        let first = plain();
        let second = plain();
        let child: Component = leaf(true);

        first.add(Rc::clone(&child));
        assert_eq!(first.child_count(), 1);
        assert!(same(&child.parent().unwrap(), &(first.clone() as Component)));

        second.add(Rc::clone(&child));
        assert_eq!(first.child_count(), 0);
        assert_eq!(second.child_count(), 1);
        assert!(same(&child.parent().unwrap(), &(second.clone() as Component)));
    }

    #[test]
    fn test_detach_is_idempotent() {
        let root = plain();
        let child: Component = leaf(true);
        root.add(Rc::clone(&child));

        child.detach();
        assert!(child.parent().is_none());
        assert_eq!(root.child_count(), 0);

        child.detach();
        assert!(child.parent().is_none());
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_dropping_parent_clears_links() {
        let child: Component = leaf(true);
        {
            let root = plain();
            root.add(Rc::clone(&child));
        }
        assert!(child.parent().is_none());
    }

    #[test]
    fn test_default_render_placeholder() {
        let root = plain();
        let buffer = crate::layout::render_fit(root.render().as_ref());
        assert_eq!(buffer.width(), 25);

        root.add(leaf(false));
        let buffer = crate::layout::render_fit(root.render().as_ref());
        assert_eq!(buffer.width(), 4);
    }

    #[test]
    fn test_default_dispatch_short_circuits() {
        let root = plain();
        let first = leaf(true);
        let second = leaf(true);
        root.add(first.clone());
        root.add(second.clone());

        assert!(root.on_event(&Event::RETURN));
        assert_eq!(first.handled.get(), 1);
        assert_eq!(second.handled.get(), 0);
    }

    #[test]
    fn test_focus_path() {
        // root -> [a (non-focusable leaf), branch -> [b, c]]
        let root = plain();
        let a = leaf(false);
        let branch = plain();
        let b = leaf(true);
        let c = leaf(true);
        root.add(a.clone());
        root.add(branch.clone());
        branch.add(b.clone());
        branch.add(c.clone());

        assert!(root.focused());
        assert!(!a.focused());
        assert!(branch.focused());
        assert!(b.focused());
        assert!(!c.focused());

        // The default `set_active_child` ignores the request: `c` stays
        // inactive because `b` is the first focusable child.
        c.take_focus();
        assert!(!c.focused());
    }

    #[test]
    fn test_detached_subtree_is_its_own_root() {
        let root = plain();
        let branch = plain();
        let inner = leaf(true);
        root.add(branch.clone());
        branch.add(inner.clone());
        assert!(inner.focused());

        root.detach_all_children();
        assert!(branch.parent().is_none());
        assert!(inner.focused());
    }

    #[test]
    fn test_capture_without_screen_is_detached() {
        let component = leaf(true);
        let token = component.capture_mouse(&Event::RETURN);
        assert!(token.is_some_and(|token| token.is_detached()));
    }

    /// Tree layout drawn by the focus properties.
    #[derive(Debug, Clone)]
    enum Shape {
        Leaf(bool),
        Branch(ContainerMode, usize, Vec<Shape>),
    }

    fn tree_shape() -> impl Strategy<Value = Shape> {
        let leaf = any::<bool>().prop_map(Shape::Leaf);
        leaf.prop_recursive(4, 32, 4, |inner| {
            let mode = prop_oneof![
                Just(ContainerMode::Vertical),
                Just(ContainerMode::Horizontal),
                Just(ContainerMode::Tab),
                Just(ContainerMode::Stacked),
            ];
            (mode, 0usize..5, prop::collection::vec(inner, 0..4))
                .prop_map(|(mode, selected, children)| Shape::Branch(mode, selected, children))
        })
    }

    /// Build `shape`, appending every node to `nodes` in pre-order.
    fn grow(shape: &Shape, nodes: &mut Vec<Component>) -> Component {
        match shape {
            Shape::Leaf(focusable) => {
                let node: Component = leaf(*focusable);
                nodes.push(Rc::clone(&node));
                node
            }
            Shape::Branch(mode, selected, children) => {
                let container: Component =
                    make(Container::new(*mode).with_selector(Rc::new(Cell::new(*selected))));
                nodes.push(Rc::clone(&container));
                for child in children {
                    container.add(grow(child, nodes));
                }
                container
            }
        }
    }

    /// Whether every ancestor of `node` has the branch leading to it as its
    /// active child.
    fn on_active_path(node: &Component) -> bool {
        let mut child = Rc::clone(node);
        while let Some(parent) = child.parent() {
            let selected = parent
                .active_child()
                .is_some_and(|active| std::ptr::addr_eq(Rc::as_ptr(&active), Rc::as_ptr(&child)));
            if !selected {
                return false;
            }
            child = parent;
        }
        true
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_focused_iff_focusable_on_active_path(shape in tree_shape()) {
            let mut nodes = Vec::new();
            let _root = grow(&shape, &mut nodes);
            for node in &nodes {
                prop_assert_eq!(node.focused(), node.focusable() && on_active_path(node));
            }
        }

        #[test]
        fn test_take_focus_focuses_focusable_nodes(shape in tree_shape()) {
            let mut nodes = Vec::new();
            let _root = grow(&shape, &mut nodes);
            for node in &nodes {
                if !node.focusable() {
                    continue;
                }
                node.take_focus();
                prop_assert!(node.focused());
                prop_assert!(on_active_path(node));
            }
        }

        #[test]
        fn test_detach_twice_matches_once(count in 1usize..6, pick in 0usize..6) {
            let root = plain();
            let children: Vec<Component> = (0..count).map(|_| leaf(true) as Component).collect();
            for child in &children {
                root.add(Rc::clone(child));
            }
            let target = &children[pick % count];

            target.detach();
            let after_once = root.child_count();
            target.detach();

            prop_assert_eq!(root.child_count(), after_once);
            prop_assert_eq!(after_once, count - 1);
            prop_assert!(target.parent().is_none());
        }
    }
}
