//! Decorators: Components built from closures.

use super::{make, Component, ComponentBase, ComponentExt, ComponentNode};
use crate::event::Event;
use crate::layout::{empty, reflect, Element, Rect};
use std::cell::Cell;
use std::rc::Rc;

struct Renderer<F> {
    node: ComponentNode,
    render: F,
}

impl<F: Fn() -> Element> ComponentBase for Renderer<F> {
    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn render(&self) -> Element {
        (self.render)()
    }
}

/// A component whose element is produced by `render`. It has no children
/// and is not focusable.
pub fn renderer(render: impl Fn() -> Element + 'static) -> Component {
    make(Renderer {
        node: ComponentNode::new(),
        render,
    })
}

/// Like [`renderer`], with `child` attached so that events, focus and
/// animation still reach it. `render` usually decorates `child.render()`.
pub fn renderer_with(child: Component, render: impl Fn() -> Element + 'static) -> Component {
    let component = renderer(render);
    component.add(child);
    component
}

struct FocusableRenderer<F> {
    node: ComponentNode,
    render: F,
    area: Rc<Cell<Rect>>,
}

impl<F: Fn(bool) -> Element> ComponentBase for FocusableRenderer<F> {
    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn render(&self) -> Element {
        reflect((self.render)(self.focused()), Rc::clone(&self.area))
    }

    fn on_event(&self, event: &Event) -> bool {
        let Some(mouse) = event.as_mouse() else {
            return false;
        };
        if !self.area.get().contains_point(mouse.x, mouse.y) {
            return false;
        }
        // Only claim focus when no one else is mid-gesture.
        if self.capture_mouse(event).is_some() {
            self.take_focus();
        }
        false
    }

    fn focusable(&self) -> bool {
        true
    }
}

/// A focusable leaf rendered by `render(focused)`. Clicking it takes focus.
pub fn focusable_renderer(render: impl Fn(bool) -> Element + 'static) -> Component {
    make(FocusableRenderer {
        node: ComponentNode::new(),
        render,
        area: Rc::new(Cell::new(Rect::ZERO)),
    })
}

struct CatchEvent<F> {
    node: ComponentNode,
    on_event: F,
}

impl<F: Fn(&Event) -> bool> ComponentBase for CatchEvent<F> {
    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn on_event(&self, event: &Event) -> bool {
        (self.on_event)(event) || self.node.dispatch_to_children(event)
    }
}

/// Wrap `child`, offering every event to `on_event` first. The child only
/// sees events the closure leaves unhandled.
pub fn catch_event(child: Component, on_event: impl Fn(&Event) -> bool + 'static) -> Component {
    let component = make(CatchEvent {
        node: ComponentNode::new(),
        on_event,
    });
    component.add(child);
    component
}

struct Maybe<F> {
    node: ComponentNode,
    show: F,
}

impl<F: Fn() -> bool> ComponentBase for Maybe<F> {
    fn node(&self) -> &ComponentNode {
        &self.node
    }

    fn render(&self) -> Element {
        if (self.show)() {
            self.node.render_children()
        } else {
            empty()
        }
    }

    fn on_event(&self, event: &Event) -> bool {
        (self.show)() && self.node.dispatch_to_children(event)
    }

    fn focusable(&self) -> bool {
        (self.show)() && self.node.any_child_focusable()
    }
}

/// Show `child` only while `show` returns true. Hidden, it renders nothing,
/// cannot take focus and ignores events.
pub fn maybe(child: Component, show: impl Fn() -> bool + 'static) -> Component {
    let component = make(Maybe {
        node: ComponentNode::new(),
        show,
    });
    component.add(child);
    component
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::container;
    use crate::event::{Motion, Mouse, MouseButton};
    use crate::layout::{render_fit, text, Requirement};
    use crate::screen::ScreenShared;
    use std::sync::Arc;

    fn click(x: i32, y: i32) -> Event {
        Event::mouse("", Mouse::new(MouseButton::Left, Motion::Pressed, x, y))
    }

    #[test]
    fn test_renderer_is_not_focusable() {
        let component = renderer(|| text("static"));
        assert!(!component.focusable());
        assert_eq!(render_fit(component.render().as_ref()).width(), 6);
    }

    #[test]
    fn test_renderer_with_keeps_child_reachable() {
        let inner = focusable_renderer(|_| text("x"));
        let outer = renderer_with(Rc::clone(&inner), || text("frame"));
        assert!(outer.focusable());
        assert!(inner.focused());
    }

    #[test]
    fn test_focusable_renderer_reports_focus() {
        let first = focusable_renderer(|focused| text(if focused { "[a]" } else { " a " }));
        let second = focusable_renderer(|focused| text(if focused { "[b]" } else { " b " }));
        let list = container::vertical(vec![first, second]);

        let lines = |buffer: &crate::buffer::Buffer| {
            (0..buffer.height())
                .map(|y| buffer.row(y).iter().map(crate::buffer::Cell::glyph).collect::<String>())
                .collect::<Vec<_>>()
        };
        assert_eq!(lines(&render_fit(list.render().as_ref())), vec!["[a]", " b "]);

        // Clicking the second row takes focus through the container.
        assert!(!list.on_event(&click(1, 1)));
        assert_eq!(list.selected(), 1);
        assert_eq!(lines(&render_fit(list.render().as_ref())), vec![" a ", "[b]"]);
    }

    #[test]
    fn test_click_refused_while_mouse_captured() {
        let first = focusable_renderer(|_| text("a"));
        let second = focusable_renderer(|_| text("b"));
        let list = container::vertical(vec![first, second]);
        let _ = render_fit(list.render().as_ref());

        let shared = Arc::new(ScreenShared::new());
        let held = crate::screen::ScreenHandle::from_shared(Arc::clone(&shared)).capture_mouse();
        assert!(held.is_some());

        let mut event = click(0, 1);
        event.set_screen(&shared);
        list.on_event(&event);
        assert_eq!(list.selected(), 0);

        drop(held);
        list.on_event(&event);
        assert_eq!(list.selected(), 1);
    }

    #[test]
    fn test_catch_event_runs_first() {
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let child = catch_event(renderer(|| text("child")), move |event| {
            counter.set(counter.get() + 1);
            *event == Event::ESCAPE
        });
        assert!(child.on_event(&Event::ESCAPE));
        assert!(!child.on_event(&Event::RETURN));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn test_maybe_hides_child() {
        let visible = Rc::new(Cell::new(false));
        let flag = Rc::clone(&visible);
        let inner = catch_event(focusable_renderer(|_| text("shown")), |_| true);
        let component = maybe(inner, move || flag.get());

        assert_eq!(component.render().requirement(), Requirement::default());
        assert!(!component.focusable());
        assert!(!component.on_event(&Event::RETURN));

        visible.set(true);
        assert_eq!(component.render().requirement().min_width, 5);
        assert!(component.focusable());
        assert!(component.on_event(&Event::RETURN));
    }
}
