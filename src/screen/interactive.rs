//! Screen Interactive: Terminal install, task handling and drawing.
//!
//! A [`ScreenInteractive`] owns the frame buffer, the task queue and the
//! terminal state changes of one interactive session. The loop thread
//! drains tasks, dispatches them to the component tree, and repaints when
//! something may have changed.
//!
//! # Frame bookkeeping
//!
//! Frames are painted inline, starting where the cursor was when the screen
//! was installed. After each frame the terminal cursor is moved to where the
//! component asked for it; the inverse move is remembered and replayed
//! before the next frame, so every repaint starts from the bottom-left of
//! the previous one.

use super::config::{Dimension, ScreenConfig};
use super::context::Context;
use super::event_loop::Loop;
use super::shared::{ScreenHandle, ScreenShared};
use crate::actor::{channel, Receiver, Task};
use crate::animation::Params;
use crate::buffer::{ansi, Buffer};
use crate::component::{CapturedMouse, Component, ComponentBase};
use crate::event::{Event, MouseState};
use crate::terminal::signals::{os, OS_SIGNALS};
use crate::terminal::{
    DecMode, OutputBuffer, SignalAction, TerminalDriver, REQUEST_CURSOR_POSITION,
    REQUEST_CURSOR_SHAPE,
};
use std::cell::{Cell, RefCell};
use std::io::Write;
use std::rc::Rc;
use std::sync::Arc;

/// Terminal size assumed when the terminal cannot be queried.
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// DECSCUSR value restored on exit until the terminal reports its own.
const DEFAULT_CURSOR_SHAPE: i32 = 1;

type Output = Box<dyn Write + Send>;

/// Loop-thread state of a screen.
pub(crate) struct ScreenCore {
    config: ScreenConfig,
    context: Context,
    shared: Arc<ScreenShared>,
    receiver: Receiver<Task>,
    output: RefCell<Output>,
    buffer: RefCell<Buffer>,
    driver: RefCell<TerminalDriver>,
    installed: Cell<bool>,
    frame_valid: Cell<bool>,
    frame_count: Cell<u32>,
    /// Terminal position of the frame's top-left cell, 1-based.
    origin: Cell<(i32, i32)>,
    cursor_reset_shape: Rc<Cell<i32>>,
    previous_mouse: Cell<Option<MouseState>>,
    /// Moves the cursor from where the last frame left it back to the
    /// frame's bottom-right.
    reset_cursor: RefCell<OutputBuffer>,
    /// Screen paused while this one runs a nested loop.
    suspended: RefCell<Option<Rc<ScreenCore>>>,
}

impl ScreenCore {
    fn new(config: ScreenConfig, context: Context, output: Output) -> Self {
        Self {
            config,
            context,
            shared: Arc::new(ScreenShared::new()),
            receiver: channel(),
            output: RefCell::new(output),
            buffer: RefCell::new(Buffer::default()),
            driver: RefCell::new(TerminalDriver::new()),
            installed: Cell::new(false),
            frame_valid: Cell::new(false),
            frame_count: Cell::new(0),
            origin: Cell::new((1, 1)),
            cursor_reset_shape: Rc::new(Cell::new(DEFAULT_CURSOR_SHAPE)),
            previous_mouse: Cell::new(None),
            reset_cursor: RefCell::new(OutputBuffer::with_capacity(32)),
            suspended: RefCell::new(None),
        }
    }

    fn handle(&self) -> ScreenHandle {
        ScreenHandle::from_shared(Arc::clone(&self.shared))
    }

    pub(crate) fn has_quitted(&self) -> bool {
        self.shared.has_quitted()
    }

    /// Take over the terminal. Failing steps are logged and skipped.
    fn install(&self) {
        if self.installed.replace(true) {
            return;
        }
        self.frame_valid.set(false);
        // Whatever the application printed before must land first.
        if let Err(err) = self.output.borrow_mut().flush() {
            tracing::warn!(error = %err, "failed to flush output");
        }

        let mut out = OutputBuffer::new();
        let mut driver = self.driver.borrow_mut();

        if !self.config.headless {
            out.write_str(REQUEST_CURSOR_SHAPE);
        }
        let shape = Rc::clone(&self.cursor_reset_shape);
        driver.push_undo(move |writer| {
            let mut out = OutputBuffer::with_capacity(16);
            out.cursor_show();
            out.cursor_shape(shape.get());
            if let Err(err) = out.flush_to(writer) {
                tracing::warn!(error = %err, "failed to restore cursor");
            }
        });

        if !self.config.headless {
            if let Err(err) = driver.install_signal_handlers(&os::EXIT_SIGNALS) {
                tracing::warn!(error = %err, "exit signals not handled");
            }
            if let Err(err) = driver.enter_raw_mode() {
                tracing::warn!(error = %err, "terminal left in cooked mode");
            }
            #[cfg(unix)]
            {
                if let Err(err) = driver.install_signal_handlers(&os::JOB_CONTROL_SIGNALS) {
                    tracing::warn!(error = %err, "resize and suspend signals not handled");
                }
            }
        }

        if self.config.alternate_screen {
            driver.enable_modes(&mut out, &[DecMode::AlternateScreen]);
        }
        driver.disable_modes(&mut out, &[DecMode::LineWrap]);
        if self.config.track_mouse {
            driver.enable_modes(&mut out, &DecMode::MOUSE);
        }
        self.emit(&out);

        self.shared.open(self.receiver.make_sender());
        if !self.config.headless {
            let sender = self.receiver.make_sender();
            if let Err(err) = driver.start_listeners(
                &sender,
                self.config.input_timing(),
                self.config.tick_interval,
            ) {
                tracing::warn!(error = %err, "screen running without listeners");
            }
        }
        tracing::debug!(
            dimension = ?self.config.dimension,
            headless = self.config.headless,
            "screen installed"
        );
    }

    /// Close the mailbox, stop the listeners and undo every install step.
    fn uninstall(&self) {
        if !self.installed.replace(false) {
            return;
        }
        self.shared.exit_now();
        let mut driver = self.driver.borrow_mut();
        driver.stop_listeners();
        let mut output = self.output.borrow_mut();
        driver.restore(&mut **output);
        if let Err(err) = output.flush() {
            tracing::warn!(error = %err, "failed to flush output");
        }
        tracing::debug!("screen uninstalled");
    }

    pub(crate) fn pre_main(self: &Rc<Self>) {
        if let Some(previous) = self.context.active() {
            if !Rc::ptr_eq(&previous, self) {
                tracing::debug!("suspending the running screen");
                previous.erase_frame();
                previous.uninstall();
                *self.suspended.borrow_mut() = Some(previous);
            }
        }
        self.context.set_active(Some(self));
        self.install();
        self.shared.reset_animation_clock();
    }

    pub(crate) fn post_main(&self) {
        let mut out = OutputBuffer::with_capacity(32);
        self.take_reset_cursor(&mut out);
        self.emit(&out);
        self.context.set_active(None);

        if let Some(previous) = self.suspended.take() {
            self.erase_frame();
            self.uninstall();
            self.context.set_active(Some(&previous));
            previous.install();
            tracing::debug!("resumed the suspended screen");
        } else {
            self.uninstall();
            // Keep the last frame and continue on the line below it.
            let mut out = OutputBuffer::with_capacity(2);
            out.write_str("\r");
            if !self.config.alternate_screen {
                out.write_str("\n");
            }
            self.emit(&out);
        }
    }

    /// Clear the frame and park the cursor at its top-left. The next draw
    /// starts from scratch.
    fn erase_frame(&self) {
        let mut out = OutputBuffer::new();
        self.take_reset_cursor(&mut out);
        out.reset_position(self.buffer.borrow().height(), true);
        self.emit(&out);
        self.buffer.borrow_mut().resize(0, 0);
    }

    pub(crate) fn run_once(&self, component: &dyn ComponentBase) {
        while let Some(task) = self.receiver.receive_non_blocking() {
            self.handle_task(component, task);
        }
        self.execute_signal_handlers();
        self.draw(component);
    }

    pub(crate) fn run_once_blocking(&self, component: &dyn ComponentBase) {
        self.execute_signal_handlers();
        if let Some(task) = self.receiver.receive() {
            self.handle_task(component, task);
        }
        self.run_once(component);
    }

    fn handle_task(&self, component: &dyn ComponentBase, task: Task) {
        match task {
            Task::Event(event) => self.handle_event(component, event),
            Task::Closure(closure) => closure(),
            Task::AnimationTick => {
                let Some(delta) = self.shared.take_animation_step() else {
                    return;
                };
                component.on_animation(&Params::with_screen(delta, self.handle()));
                self.frame_valid.set(false);
            }
        }
    }

    fn handle_event(&self, component: &dyn ComponentBase, mut event: Event) {
        if let Some(origin) = event.as_cursor_position() {
            self.origin.set(origin);
            return;
        }
        if let Some(shape) = event.as_cursor_shape() {
            self.cursor_reset_shape.set(shape);
            return;
        }
        if let Some(mouse) = event.as_mouse_mut() {
            let (x, y) = self.origin.get();
            mouse.x -= x;
            mouse.y -= y;
            mouse.previous = self.previous_mouse.replace(Some(mouse.state()));
        }

        event.set_screen(&self.shared);
        let handled = component.on_event(&event);

        if event == Event::CTRL_C && (!handled || self.config.force_handle_ctrl_c) {
            self.shared.signals.record(SignalAction::Exit);
        }
        #[cfg(unix)]
        {
            if event == Event::CTRL_Z && (!handled || self.config.force_handle_ctrl_z) {
                self.shared.signals.record(SignalAction::Stop);
            }
        }
        self.frame_valid.set(false);
    }

    fn execute_signal_handlers(&self) {
        let drain = |action| {
            let mut count = self.shared.signals.drain(action);
            if self.driver.borrow().has_os_signals() {
                count += OS_SIGNALS.drain(action);
            }
            count
        };
        let exits = drain(SignalAction::Exit);
        let stops = drain(SignalAction::Stop);
        let resizes = drain(SignalAction::Resize);

        if exits > 0 {
            tracing::debug!(count = exits, "exit requested");
            self.handle().exit();
        }
        if stops > 0 {
            self.suspend_process();
        }
        if resizes > 0 {
            self.shared.post(Task::Event(Event::CUSTOM));
        }
    }

    /// Hand the terminal back, stop the process, and take the terminal
    /// again once continued.
    #[cfg(unix)]
    fn suspend_process(&self) {
        tracing::debug!("suspending process");
        self.erase_frame();
        self.uninstall();
        os::stop_process();
        self.install();
    }

    #[cfg(not(unix))]
    fn suspend_process(&self) {}

    fn terminal_size(&self) -> (u16, u16) {
        if let Some(size) = self.config.terminal_size {
            return size;
        }
        match crossterm::terminal::size() {
            Ok((width, height)) if width > 0 && height > 0 => (width, height),
            Ok(_) => FALLBACK_SIZE,
            Err(err) => {
                tracing::trace!(error = %err, "terminal size unavailable");
                FALLBACK_SIZE
            }
        }
    }

    fn should_report_cursor(&self) -> bool {
        let frame = self.frame_count.get();
        self.frame_count.set(frame.wrapping_add(1));
        let interval = self.config.cursor_report_interval;
        !self.config.alternate_screen
            && !self.config.headless
            && interval > 0
            && frame % interval == 0
    }

    fn draw(&self, component: &dyn ComponentBase) {
        if self.frame_valid.get() {
            return;
        }
        let element = component.render();
        let requirement = element.requirement();
        let (terminal_width, terminal_height) = self.terminal_size();
        let (width, height) = match self.config.dimension {
            Dimension::Fixed { width, height } => (width, height),
            Dimension::TerminalOutput => (terminal_width, requirement.min_height),
            Dimension::Fullscreen => (terminal_width, terminal_height),
            Dimension::FitComponent => (
                requirement.min_width.min(terminal_width),
                requirement.min_height.min(terminal_height),
            ),
        };

        let mut buffer = self.buffer.borrow_mut();
        let (previous_width, previous_height) = (buffer.width(), buffer.height());
        let resized = (width, height) != (previous_width, previous_height);

        let mut out = OutputBuffer::new();
        self.take_reset_cursor(&mut out);
        out.reset_position(previous_height, resized);
        // A narrower terminal rewraps the old frame: wipe everything.
        if width < previous_width && !self.config.alternate_screen {
            out.clear_below_and_home();
        }
        if resized {
            tracing::debug!(width, height, "frame resized");
            buffer.resize(width, height);
        }
        if self.should_report_cursor() {
            out.write_str(REQUEST_CURSOR_POSITION);
        }

        let area = buffer.area();
        element.render(&mut buffer, area);
        out.write_str(&ansi::to_ansi(&buffer));

        // A frame narrower than the terminal leaves the cursor one column
        // past its last cell instead of on it.
        let cursor = buffer.cursor();
        let dx = width.saturating_sub(1).saturating_sub(cursor.x) + u16::from(width != terminal_width);
        let dy = height.saturating_sub(1).saturating_sub(cursor.y);
        out.cursor_up(dy);
        out.cursor_left(dx);
        match cursor.shape.code() {
            None => out.cursor_hide(),
            Some(code) => {
                out.cursor_show();
                out.cursor_shape(i32::from(code));
            }
        }
        {
            let mut reset = self.reset_cursor.borrow_mut();
            reset.clear();
            reset.cursor_down(dy);
            reset.cursor_right(dx);
        }

        self.emit(&out);
        buffer.clear();
        self.frame_valid.set(true);
    }

    fn take_reset_cursor(&self, out: &mut OutputBuffer) {
        let mut reset = self.reset_cursor.borrow_mut();
        out.append(&reset);
        reset.clear();
    }

    fn emit(&self, out: &OutputBuffer) {
        if out.is_empty() {
            return;
        }
        let mut output = self.output.borrow_mut();
        if let Err(err) = out.flush_to(&mut **output) {
            tracing::warn!(error = %err, bytes = out.len(), "failed to write to terminal");
        }
    }
}

/// An interactive terminal session.
///
/// Cloning yields another handle to the same screen, for components that
/// need to call [`with_restored_io`](Self::with_restored_io) or start a
/// nested loop.
///
/// ```no_run
/// use treeterm::component::renderer;
/// use treeterm::layout::text;
/// use treeterm::screen::ScreenInteractive;
///
/// let screen = ScreenInteractive::terminal_output();
/// let quit = screen.exit_loop_closure();
/// let component = treeterm::component::catch_event(renderer(|| text("press q")), move |event| {
///     if event.as_character() == Some("q") {
///         quit();
///         return true;
///     }
///     false
/// });
/// screen.run(component);
/// ```
#[derive(Clone)]
pub struct ScreenInteractive {
    core: Rc<ScreenCore>,
}

impl ScreenInteractive {
    /// A `width` x `height` frame drawn inline.
    pub fn fixed_size(width: u16, height: u16) -> Self {
        Self::with_config(ScreenConfig::fixed_size(width, height))
    }

    /// The whole terminal, on the alternate screen.
    pub fn fullscreen() -> Self {
        Self::with_config(ScreenConfig::fullscreen())
    }

    /// As small as the component allows, drawn inline.
    pub fn fit_component() -> Self {
        Self::with_config(ScreenConfig::fit_component())
    }

    /// Full width, as tall as the component needs, drawn inline.
    pub fn terminal_output() -> Self {
        Self::with_config(ScreenConfig::terminal_output())
    }

    /// A screen on this thread's default [`Context`], writing to stdout.
    /// Starting it while another default screen runs suspends that one.
    pub fn with_config(config: ScreenConfig) -> Self {
        Self::with_context(config, &Context::thread_default())
    }

    /// A screen taking turns with the other screens of `context`.
    pub fn with_context(config: ScreenConfig, context: &Context) -> Self {
        Self {
            core: Rc::new(ScreenCore::new(
                config,
                context.clone(),
                Box::new(std::io::stdout()),
            )),
        }
    }

    /// A screen sharing this screen's context, writing to stdout. Running
    /// it suspends this one until its loop ends.
    pub fn nested(&self, config: ScreenConfig) -> Self {
        Self::with_context(config, &self.core.context)
    }

    /// Write frames and control sequences to `output` instead of stdout.
    #[must_use]
    pub fn with_output(self, output: impl Write + Send + 'static) -> Self {
        *self.core.output.borrow_mut() = Box::new(output);
        self
    }

    /// The configuration this screen was built with.
    pub fn config(&self) -> &ScreenConfig {
        &self.core.config
    }

    /// The context shared with nested screens.
    pub fn context(&self) -> &Context {
        &self.core.context
    }

    /// A handle usable from any thread.
    pub fn handle(&self) -> ScreenHandle {
        self.core.handle()
    }

    /// See [`ScreenHandle::post`].
    pub fn post(&self, closure: impl FnOnce() + Send + 'static) {
        self.handle().post(closure);
    }

    /// See [`ScreenHandle::post_event`].
    pub fn post_event(&self, event: Event) {
        self.handle().post_event(event);
    }

    /// See [`ScreenHandle::exit`].
    pub fn exit(&self) {
        self.handle().exit();
    }

    /// See [`ScreenHandle::request_animation_frame`].
    pub fn request_animation_frame(&self) {
        self.core.shared.request_animation_frame();
    }

    /// See [`ScreenHandle::capture_mouse`].
    pub fn capture_mouse(&self) -> Option<CapturedMouse> {
        self.core.shared.capture_mouse()
    }

    /// A callback that stops the loop, for buttons and key bindings.
    pub fn exit_loop_closure(&self) -> impl Fn() + Send + Sync + 'static {
        let handle = self.handle();
        move || handle.exit()
    }

    /// Whether the loop was asked to stop.
    pub fn has_quitted(&self) -> bool {
        self.core.has_quitted()
    }

    /// Width of the last frame.
    pub fn width(&self) -> u16 {
        self.core.buffer.borrow().width()
    }

    /// Height of the last frame.
    pub fn height(&self) -> u16 {
        self.core.buffer.borrow().height()
    }

    /// Whether the screen currently owns the terminal.
    pub fn is_installed(&self) -> bool {
        self.core.installed.get()
    }

    /// Run `component` until [`exit`](Self::exit) is called.
    pub fn run(&self, component: Component) {
        Loop::new(self, component).run();
    }

    /// Hand the terminal back for the duration of `f`, e.g. to spawn an
    /// editor, then take it again and repaint. Tasks posted meanwhile are
    /// dropped.
    pub fn with_restored_io<R>(&self, f: impl FnOnce() -> R) -> R {
        let installed = self.core.installed.get();
        if installed {
            self.core.uninstall();
        }
        let result = f();
        if installed {
            self.core.install();
        }
        result
    }

    pub(crate) const fn core(&self) -> &Rc<ScreenCore> {
        &self.core
    }
}

impl std::fmt::Debug for ScreenInteractive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenInteractive")
            .field("config", &self.core.config)
            .field("installed", &self.core.installed.get())
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}
