//! Navigation demo: Tabs of menus, mouse focus and a nested screen.
//!
//! Keys: Tab/Shift-Tab switch between the tab bar and the menu, arrows or
//! hjkl move, Enter on a menu item opens a nested confirmation screen,
//! `q` quits.

use std::cell::Cell;
use std::rc::Rc;
use treeterm::component::{catch_event, container, focusable_renderer, make, renderer_with};
use treeterm::layout::{inverted, text, vbox, Element};
use treeterm::{
    Component, ComponentBase, ComponentExt, Container, Event, ScreenConfig, ScreenInteractive,
};

fn item(label: String) -> Component {
    focusable_renderer(move |focused| {
        let line = text(format!(" {label} "));
        if focused {
            inverted(line)
        } else {
            line
        }
    })
}

fn menu(name: &str, count: usize) -> Component {
    container::vertical((1..=count).map(|i| item(format!("{name} {i}"))).collect())
}

fn confirm(screen: &ScreenInteractive, question: String) -> bool {
    let nested = screen.nested(ScreenConfig::fit_component());
    let answer = Rc::new(Cell::new(false));
    let yes = item("yes".into());
    let no = item("no".into());
    let buttons = container::horizontal(vec![Rc::clone(&yes), no]);
    let row = Rc::clone(&buttons);
    let body = renderer_with(buttons, move || vbox(vec![text(question.clone()), row.render()]));

    let chosen = Rc::clone(&answer);
    let quit = nested.exit_loop_closure();
    let dialog = catch_event(body, move |event| {
        if *event == Event::RETURN {
            chosen.set(yes.focused());
            quit();
            return true;
        }
        false
    });
    nested.run(dialog);
    answer.get()
}

fn main() {
    let screen = ScreenInteractive::terminal_output();
    let selected_tab = Rc::new(Cell::new(0));
    let confirmed = Rc::new(Cell::new(0usize));

    let tab_labels = ["fruits", "colors", "tools"];
    // The tab bar and the pages share one selector.
    let tab_bar = make(Container::horizontal().with_selector(Rc::clone(&selected_tab)));
    for label in tab_labels {
        tab_bar.add(item(label.to_string()));
    }
    let pages = container::tab(
        tab_labels.iter().map(|label| menu(label, 4)).collect(),
        selected_tab,
    );
    let layout = container::vertical(vec![
        Rc::clone(&tab_bar) as Component,
        Rc::clone(&pages) as Component,
    ]);

    let page_view = Rc::clone(&pages);
    let count = Rc::clone(&confirmed);
    let view = renderer_with(layout, move || -> Element {
        vbox(vec![
            tab_bar.render(),
            text("─".repeat(24)),
            page_view.render(),
            text(format!("confirmed: {}", count.get())),
        ])
    });

    let quit = screen.exit_loop_closure();
    let dialog_screen = screen.clone();
    let root = catch_event(view, move |event| {
        if event.as_character() == Some("q") {
            quit();
            return true;
        }
        if *event == Event::RETURN && pages.focused() {
            if confirm(&dialog_screen, "Really pick this one?".into()) {
                confirmed.set(confirmed.get() + 1);
            }
            return true;
        }
        false
    });

    screen.run(root);
}
