//! Container: A selectable list of children plus a navigation mode.
//!
//! All four modes share one selected index. Arrow keys move it among the
//! focusable children and stop at the ends; Tab and Shift-Tab wrap around.
//! The index is corrected lazily: when the children list shrinks under a
//! stale index, the next render or event clamps it back into range.
//!
//! ```
//! use treeterm::component::{container, focusable_renderer, ComponentBase};
//! use treeterm::layout::text;
//! use treeterm::Event;
//!
//! let menu = container::vertical(vec![
//!     focusable_renderer(|_| text("first")),
//!     focusable_renderer(|_| text("second")),
//! ]);
//! assert!(menu.on_event(&Event::ARROW_DOWN));
//! assert_eq!(menu.selected(), 1);
//! ```

use super::{make, Component, ComponentBase, ComponentExt, ComponentNode};
use crate::event::{Event, MouseButton};
use crate::layout::{dbox, hbox, reflect, text, vbox, Element, Rect};
use std::cell::Cell;
use std::rc::Rc;

/// Navigation and layout policy of a [`Container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerMode {
    /// Stacked top to bottom; Up/Down, `k`/`j`, paging, Home/End, wheel.
    Vertical,
    /// Laid out left to right; Left/Right, `h`/`l`.
    Horizontal,
    /// Only the selected child is rendered and receives events.
    Tab,
    /// Children drawn as overlapping layers, the first child on top.
    Stacked,
}

/// A component managing a selectable sequence of children.
pub struct Container {
    node: ComponentNode,
    mode: ContainerMode,
    selector: Rc<Cell<usize>>,
    area: Rc<Cell<Rect>>,
}

impl Container {
    /// An empty container with its own selected index.
    pub fn new(mode: ContainerMode) -> Self {
        Self {
            node: ComponentNode::new(),
            mode,
            selector: Rc::new(Cell::new(0)),
            area: Rc::new(Cell::new(Rect::ZERO)),
        }
    }

    /// Empty vertical container.
    pub fn vertical() -> Self {
        Self::new(ContainerMode::Vertical)
    }

    /// Empty horizontal container.
    pub fn horizontal() -> Self {
        Self::new(ContainerMode::Horizontal)
    }

    /// Empty tab container driven by `selector`.
    pub fn tab(selector: Rc<Cell<usize>>) -> Self {
        Self::new(ContainerMode::Tab).with_selector(selector)
    }

    /// Empty stacked container.
    pub fn stacked() -> Self {
        Self::new(ContainerMode::Stacked)
    }

    /// Share the selected index with the application.
    #[must_use]
    pub fn with_selector(mut self, selector: Rc<Cell<usize>>) -> Self {
        self.selector = selector;
        self
    }

    /// Navigation mode.
    pub const fn mode(&self) -> ContainerMode {
        self.mode
    }

    /// The selected index, as last corrected.
    pub fn selected(&self) -> usize {
        self.selector.get()
    }

    /// The selected index, shared.
    pub fn selector(&self) -> Rc<Cell<usize>> {
        Rc::clone(&self.selector)
    }

    /// Where the container was last painted.
    pub fn area(&self) -> Rect {
        self.area.get()
    }

    /// Clamp a stale index into `[0, count - 1]`.
    fn clamp_selector(&self) {
        let count = self.node.child_count();
        if count > 0 && self.selector.get() >= count {
            self.selector.set(count - 1);
        }
    }

    /// Rows a page key moves: the distance from the top row of the painted
    /// area to its bottom row.
    fn page_size(&self) -> u16 {
        self.area.get().height.saturating_sub(1)
    }

    /// Move to the next focusable child in one direction. Stays put when
    /// there is none.
    fn move_selector(&self, children: &[Component], forward: bool) {
        let current = self.selector.get();
        let target = if forward {
            (current.saturating_add(1)..children.len()).find(|&i| children[i].focusable())
        } else {
            (0..current.min(children.len()))
                .rev()
                .find(|&i| children[i].focusable())
        };
        if let Some(index) = target {
            self.selector.set(index);
        }
    }

    /// Move to the next focusable child, wrapping around the ends.
    fn move_selector_wrap(&self, children: &[Component], forward: bool) {
        let count = children.len();
        if count == 0 {
            return;
        }
        let current = self.selector.get() % count;
        let target = (1..count)
            .map(|offset| {
                if forward {
                    (current + offset) % count
                } else {
                    (current + count - offset) % count
                }
            })
            .find(|&i| children[i].focusable());
        if let Some(index) = target {
            self.selector.set(index);
        }
    }

    /// Keyboard navigation. Returns whether the selection changed.
    fn handle_navigation(&self, event: &Event) -> bool {
        let children = self.node.children();
        let old = self.selector.get();
        let character = event.as_character();

        match self.mode {
            ContainerMode::Vertical => {
                if *event == Event::ARROW_UP || character == Some("k") {
                    self.move_selector(&children, false);
                }
                if *event == Event::ARROW_DOWN || character == Some("j") {
                    self.move_selector(&children, true);
                }
                if *event == Event::PAGE_UP {
                    for _ in 0..self.page_size() {
                        self.move_selector(&children, false);
                    }
                }
                if *event == Event::PAGE_DOWN {
                    for _ in 0..self.page_size() {
                        self.move_selector(&children, true);
                    }
                }
                if *event == Event::HOME {
                    for _ in 0..children.len() {
                        self.move_selector(&children, false);
                    }
                }
                if *event == Event::END {
                    for _ in 0..children.len() {
                        self.move_selector(&children, true);
                    }
                }
            }
            ContainerMode::Horizontal => {
                if *event == Event::ARROW_LEFT || character == Some("h") {
                    self.move_selector(&children, false);
                }
                if *event == Event::ARROW_RIGHT || character == Some("l") {
                    self.move_selector(&children, true);
                }
            }
            ContainerMode::Tab | ContainerMode::Stacked => return false,
        }

        if *event == Event::TAB {
            self.move_selector_wrap(&children, true);
        }
        if *event == Event::TAB_REVERSE {
            self.move_selector_wrap(&children, false);
        }

        self.clamp_selector();
        old != self.selector.get()
    }

    /// Mouse events skip the focus check: they go where the pointer is.
    fn on_mouse_event(&self, event: &Event) -> bool {
        match self.mode {
            ContainerMode::Tab => self
                .active_child()
                .is_some_and(|child| child.on_event(event)),
            ContainerMode::Horizontal | ContainerMode::Stacked => {
                self.node.dispatch_to_children(event)
            }
            ContainerMode::Vertical => {
                if self.node.dispatch_to_children(event) {
                    return true;
                }
                let Some(mouse) = event.as_mouse() else {
                    return false;
                };
                let forward = match mouse.button {
                    MouseButton::WheelUp => false,
                    MouseButton::WheelDown => true,
                    _ => return false,
                };
                if !self.area.get().contains_point(mouse.x, mouse.y) {
                    return false;
                }
                let children = self.node.children();
                self.move_selector(&children, forward);
                self.clamp_selector();
                true
            }
        }
    }
}

impl ComponentBase for Container {
    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn render(&self) -> Element {
        self.clamp_selector();
        let area = Rc::clone(&self.area);
        match self.mode {
            ContainerMode::Vertical | ContainerMode::Horizontal => {
                let elements: Vec<Element> =
                    self.node.children().iter().map(|child| child.render()).collect();
                if elements.is_empty() {
                    return reflect(text("Empty container"), area);
                }
                let stack = if self.mode == ContainerMode::Vertical {
                    vbox(elements)
                } else {
                    hbox(elements)
                };
                reflect(stack, area)
            }
            ContainerMode::Tab => match self.active_child() {
                Some(child) => reflect(child.render(), area),
                None => reflect(text("Empty container"), area),
            },
            ContainerMode::Stacked => {
                let elements: Vec<Element> = self
                    .node
                    .children()
                    .iter()
                    .rev()
                    .map(|child| child.render())
                    .collect();
                reflect(dbox(elements), area)
            }
        }
    }

    fn on_event(&self, event: &Event) -> bool {
        if self.mode == ContainerMode::Stacked {
            return self.node.dispatch_to_children(event);
        }
        self.clamp_selector();
        if event.is_mouse() {
            return self.on_mouse_event(event);
        }
        if !self.focused() {
            return false;
        }
        if self
            .active_child()
            .is_some_and(|child| child.on_event(event))
        {
            return true;
        }
        self.handle_navigation(event)
    }

    fn active_child(&self) -> Option<Component> {
        let count = self.node.child_count();
        if count == 0 {
            return None;
        }
        match self.mode {
            ContainerMode::Stacked => self.node.child_at(0),
            _ => self.node.child_at(self.selector.get().min(count - 1)),
        }
    }

    fn focusable(&self) -> bool {
        match self.mode {
            ContainerMode::Tab => self.active_child().is_some_and(|child| child.focusable()),
            _ => self.node.any_child_focusable(),
        }
    }

    fn set_active_child(&self, child: &dyn ComponentBase) {
        let identity = std::ptr::from_ref(child).cast::<()>();
        match self.mode {
            ContainerMode::Stacked => self.node.bring_to_front(identity),
            _ => {
                if let Some(index) = self.node.index_of(identity) {
                    self.selector.set(index);
                }
            }
        }
    }
}

fn build(container: Container, children: Vec<Component>) -> Rc<Container> {
    let container = make(container);
    for child in children {
        container.add(child);
    }
    container
}

/// Vertical container holding `children`.
pub fn vertical(children: Vec<Component>) -> Rc<Container> {
    build(Container::vertical(), children)
}

/// Horizontal container holding `children`.
pub fn horizontal(children: Vec<Component>) -> Rc<Container> {
    build(Container::horizontal(), children)
}

/// Tab container holding `children`, showing the one `selector` names.
pub fn tab(children: Vec<Component>, selector: Rc<Cell<usize>>) -> Rc<Container> {
    build(Container::tab(selector), children)
}

/// Stacked container holding `children`, the first one on top.
pub fn stacked(children: Vec<Component>) -> Rc<Container> {
    build(Container::stacked(), children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Motion, Mouse};
    use crate::layout::render_fit;
    use proptest::prelude::*;

    /// Leaf recording which events reached it.
    struct Recorder {
        node: ComponentNode,
        label: &'static str,
        focusable: bool,
        handles: bool,
        seen: Cell<usize>,
    }

    impl ComponentBase for Recorder {
        fn node(&self) -> &ComponentNode {
            &self.node
        }

        fn render(&self) -> Element {
            text(self.label)
        }

        fn on_event(&self, _event: &Event) -> bool {
            self.seen.set(self.seen.get() + 1);
            self.handles
        }

        fn focusable(&self) -> bool {
            self.focusable
        }
    }

    fn recorder(label: &'static str, focusable: bool) -> Rc<Recorder> {
        make(Recorder {
            node: ComponentNode::new(),
            label,
            focusable,
            handles: false,
            seen: Cell::new(0),
        })
    }

    fn rendered(component: &dyn ComponentBase) -> String {
        let buffer = render_fit(component.render().as_ref());
        (0..buffer.height())
            .map(|y| {
                buffer
                    .row(y)
                    .iter()
                    .map(crate::buffer::Cell::glyph)
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn wheel(button: MouseButton, x: i32, y: i32) -> Event {
        Event::mouse("", Mouse::new(button, Motion::Pressed, x, y))
    }

    #[test]
    fn test_arrow_clamps_tab_wraps() {
        let list = vertical(vec![recorder("a", true), recorder("b", true), recorder("c", true)]);
        assert!(list.on_event(&Event::ARROW_DOWN));
        assert!(list.on_event(&Event::from_char('j')));
        assert_eq!(list.selected(), 2);

        assert!(!list.on_event(&Event::ARROW_DOWN));
        assert_eq!(list.selected(), 2);

        assert!(list.on_event(&Event::TAB));
        assert_eq!(list.selected(), 0);

        assert!(list.on_event(&Event::TAB_REVERSE));
        assert_eq!(list.selected(), 2);
    }

    #[test]
    fn test_navigation_skips_unfocusable() {
        let list = vertical(vec![recorder("a", true), recorder("-", false), recorder("c", true)]);
        assert!(list.on_event(&Event::ARROW_DOWN));
        assert_eq!(list.selected(), 2);
        assert!(list.on_event(&Event::ARROW_UP));
        assert_eq!(list.selected(), 0);

        // Nothing focusable above: the selection stays.
        assert!(!list.on_event(&Event::ARROW_UP));
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_home_end_and_paging() {
        let children: Vec<Component> = (0..10).map(|_| recorder("x", true) as Component).collect();
        let list = vertical(children);
        assert!(list.on_event(&Event::END));
        assert_eq!(list.selected(), 9);
        assert!(list.on_event(&Event::HOME));
        assert_eq!(list.selected(), 0);

        // Paging moves from one edge of the painted area to the other.
        let _ = render_fit(list.render().as_ref());
        assert_eq!(list.area().height, 10);
        assert!(list.on_event(&Event::PAGE_DOWN));
        assert_eq!(list.selected(), 9);
    }

    #[test]
    fn test_page_moves_one_less_than_height() {
        let children: Vec<Component> = (0..10).map(|_| recorder("x", true) as Component).collect();
        let list = vertical(children);
        let mut buffer = crate::buffer::Buffer::new(1, 4);
        let area = buffer.area();
        list.render().render(&mut buffer, area);
        assert_eq!(list.area().height, 4);

        assert!(list.on_event(&Event::PAGE_DOWN));
        assert_eq!(list.selected(), 3);
        assert!(list.on_event(&Event::PAGE_DOWN));
        assert_eq!(list.selected(), 6);
        assert!(list.on_event(&Event::PAGE_UP));
        assert_eq!(list.selected(), 3);
    }

    #[test]
    fn test_horizontal_keys() {
        let row = horizontal(vec![recorder("a", true), recorder("b", true)]);
        assert!(!row.on_event(&Event::ARROW_DOWN));
        assert!(row.on_event(&Event::from_char('l')));
        assert_eq!(row.selected(), 1);
        assert!(row.on_event(&Event::ARROW_LEFT));
        assert_eq!(row.selected(), 0);
        assert_eq!(rendered(row.as_ref()), "ab");
    }

    #[test]
    fn test_active_child_gets_events_first() {
        let handler = make(Recorder {
            node: ComponentNode::new(),
            label: "h",
            focusable: true,
            handles: true,
            seen: Cell::new(0),
        });
        let list = vertical(vec![handler.clone(), recorder("b", true)]);
        assert!(list.on_event(&Event::ARROW_DOWN));
        assert_eq!(handler.seen.get(), 1);
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_unfocused_container_ignores_keys() {
        let outer = vertical(vec![]);
        let first = vertical(vec![recorder("a", true), recorder("b", true)]);
        let second = vertical(vec![recorder("c", true), recorder("d", true)]);
        outer.add(first.clone());
        outer.add(second.clone());

        assert!(!second.on_event(&Event::ARROW_DOWN));
        assert_eq!(second.selected(), 0);

        second.child_at(1).unwrap().take_focus();
        assert_eq!(outer.selected(), 1);
        assert_eq!(second.selected(), 1);
        assert!(second.child_at(1).unwrap().focused());
    }

    #[test]
    fn test_tab_exclusivity() {
        let a = recorder("A", true);
        let b = recorder("B", true);
        let selector = Rc::new(Cell::new(0));
        let tabs = tab(vec![a.clone(), b.clone()], Rc::clone(&selector));

        assert_eq!(rendered(tabs.as_ref()), "A");
        tabs.on_event(&Event::from_char('x'));
        assert_eq!((a.seen.get(), b.seen.get()), (1, 0));

        selector.set(1);
        assert_eq!(rendered(tabs.as_ref()), "B");
        tabs.on_event(&Event::from_char('x'));
        tabs.on_event(&wheel(MouseButton::Left, 0, 0));
        assert_eq!((a.seen.get(), b.seen.get()), (1, 2));
    }

    #[test]
    fn test_tab_focusable_follows_selection() {
        let selector = Rc::new(Cell::new(0));
        let tabs = tab(vec![recorder("pane", false), recorder("input", true)], Rc::clone(&selector));
        assert!(!tabs.focusable());
        selector.set(1);
        assert!(tabs.focusable());
    }

    #[test]
    fn test_stacked_bring_to_front() {
        let a = recorder("a", true);
        let b = recorder("bb", true);
        let c = recorder("ccc", true);
        let layers = stacked(vec![a.clone(), b.clone(), c.clone()]);
        // The first child is painted last, on top.
        assert_eq!(rendered(layers.as_ref()), "abc");

        c.take_focus();
        let order: Vec<_> = layers
            .node()
            .children()
            .iter()
            .map(|child| rendered(child.as_ref()))
            .collect();
        assert_eq!(order, vec!["ccc", "a", "bb"]);
        assert!(c.focused());
        assert_eq!(rendered(layers.as_ref()), "ccc");

        // Events are offered front to back.
        layers.on_event(&Event::RETURN);
        assert_eq!((c.seen.get(), a.seen.get(), b.seen.get()), (1, 1, 1));
    }

    #[test]
    fn test_wheel_scrolls_inside_area() {
        let list = vertical(vec![recorder("a", true), recorder("b", true), recorder("c", true)]);
        let _ = render_fit(list.render().as_ref());

        assert!(list.on_event(&wheel(MouseButton::WheelDown, 0, 1)));
        assert_eq!(list.selected(), 1);
        assert!(!list.on_event(&wheel(MouseButton::WheelDown, 5, 1)));
        assert_eq!(list.selected(), 1);
        assert!(list.on_event(&wheel(MouseButton::WheelUp, 0, 0)));
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_empty_container() {
        let list = vertical(vec![]);
        assert_eq!(rendered(list.as_ref()), "Empty container");
        assert!(list.active_child().is_none());
        assert!(!list.focusable());
        assert!(!list.on_event(&Event::ARROW_DOWN));
        assert!(!list.on_event(&Event::TAB));
    }

    #[test]
    fn test_stale_selection_is_clamped_lazily() {
        let children: Vec<Component> = (0..4).map(|_| recorder("x", true) as Component).collect();
        let selector = Rc::new(Cell::new(3));
        let list = make(Container::vertical().with_selector(Rc::clone(&selector)));
        for child in &children {
            list.add(Rc::clone(child));
        }
        children[3].detach();
        children[2].detach();
        assert_eq!(selector.get(), 3);

        let _ = list.render();
        assert_eq!(selector.get(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn test_selection_stays_in_range(
            initial in 0usize..8,
            ops in proptest::collection::vec((any::<bool>(), 0usize..8), 0..24),
        ) {
            let list = vertical(
                (0..initial).map(|_| recorder("x", true) as Component).collect(),
            );
            let mut pool: Vec<Component> = list.node().children();
            for (add, pick) in ops {
                if add {
                    let child: Component = recorder("y", true);
                    list.add(Rc::clone(&child));
                    pool.push(child);
                } else if !pool.is_empty() {
                    pool.remove(pick % pool.len()).detach();
                }

                let before = list.selected();
                let _ = list.render();
                let count = list.child_count();
                if count > 0 {
                    prop_assert!(list.selected() < count);
                    if before < count {
                        prop_assert_eq!(list.selected(), before);
                    }
                }
                let _ = list.on_event(&Event::ARROW_DOWN);
                if count > 0 {
                    prop_assert!(list.selected() < count);
                }
            }
        }
    }
}
