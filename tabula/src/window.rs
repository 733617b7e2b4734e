use crate::actions::{self, hotkeys::KeyboardHotkey, Action};
use crate::render_device::RenderContext;
use crate::status_bar::StatusBar;

use std::sync::Arc;

use anyhow::Result as AnyResult;
use tabula_core::events::{
    ButtonState, ButtonTracker, ClickEvent, MotionEvent, MouseButton, ScrollEvent,
};
use tabula_core::ImageView;

/// Pixel scroll deltas per notch of a line-based wheel.
const PIXELS_PER_NOTCH: f32 = 10.0;

pub struct Surface {
    event_loop: winit::event_loop::EventLoop<()>,
    win: Arc<winit::window::Window>,
}
impl Surface {
    pub fn new(settings: &crate::settings::WindowSettings) -> AnyResult<Self> {
        const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

        let event_loop = winit::event_loop::EventLoopBuilder::default().build()?;
        let win = winit::window::WindowBuilder::default()
            .with_title(format!("Tabula v{}", VERSION.unwrap_or("[unknown]")))
            .with_inner_size(winit::dpi::LogicalSize::new(settings.width, settings.height))
            .with_min_inner_size(winit::dpi::LogicalSize::new(200u32, 200u32))
            .with_transparent(false)
            .build(&event_loop)?;

        let win = Arc::new(win);

        Ok(Self { event_loop, win })
    }
    pub fn window(&self) -> Arc<winit::window::Window> {
        self.win.clone()
    }
    pub fn with_view(
        self,
        view: ImageView,
        render_context: RenderContext,
        status_bar: StatusBar,
        tools: tabula_core::tools::ToolSender,
        hotkeys: actions::hotkeys::KeysToActions,
    ) -> Renderer {
        let (deferred_sender, deferred) = actions::deferred_queue();
        let size = self.win.inner_size();
        Renderer {
            win: self.win,
            event_loop: Some(self.event_loop),
            render_context,
            view,
            status_bar,
            tools,
            hotkeys,
            modifiers: winit::keyboard::ModifiersState::empty(),
            buttons: ButtonTracker::default(),
            cursor: ultraviolet::Vec2::zero(),
            scroll: ScrollAccumulator::default(),
            last_size: [size.width, size.height],
            deferred_sender,
            deferred,
        }
    }
}

pub struct Renderer {
    event_loop: Option<winit::event_loop::EventLoop<()>>,
    win: Arc<winit::window::Window>,
    render_context: RenderContext,
    view: ImageView,
    status_bar: StatusBar,

    tools: tabula_core::tools::ToolSender,
    hotkeys: actions::hotkeys::KeysToActions,
    modifiers: winit::keyboard::ModifiersState,
    buttons: ButtonTracker,
    cursor: ultraviolet::Vec2,
    scroll: ScrollAccumulator,
    last_size: [u32; 2],

    deferred_sender: actions::DeferredSender,
    deferred: actions::DeferredQueue,
}

fn convert_button(button: winit::event::MouseButton) -> MouseButton {
    use winit::event::MouseButton as Winit;
    match button {
        Winit::Left => MouseButton::Left,
        Winit::Middle => MouseButton::Middle,
        Winit::Right => MouseButton::Right,
        Winit::Back => MouseButton::Other(3),
        Winit::Forward => MouseButton::Other(4),
        Winit::Other(n) => MouseButton::Other(n),
    }
}
/// Wheel delta in notches, positive away from the user.
fn convert_scroll(delta: winit::event::MouseScrollDelta) -> f32 {
    match delta {
        winit::event::MouseScrollDelta::LineDelta(_, y) => y,
        #[allow(clippy::cast_possible_truncation)]
        winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_NOTCH,
    }
}
/// Collects fractional wheel motion until it adds up to whole notches. Touchpads report many
/// tiny deltas per gesture, each of which would otherwise count as a full zoom step.
#[derive(Copy, Clone, Debug, Default)]
struct ScrollAccumulator {
    pending: f32,
}
impl ScrollAccumulator {
    /// Add `notches`, returning the whole notches ready to be acted on, if any.
    fn push(&mut self, notches: f32) -> Option<f32> {
        // Reversing direction drops whatever was pending the other way.
        if self.pending * notches < 0.0 {
            self.pending = 0.0;
        }
        self.pending += notches;
        let whole = self.pending.trunc();
        if whole == 0.0 {
            return None;
        }
        self.pending -= whole;
        Some(whole)
    }
}
/// Signed change between two sizes, saturating.
fn size_delta(old: [u32; 2], new: [u32; 2]) -> (i32, i32) {
    let delta = |old: u32, new: u32| {
        let d = i64::from(new) - i64::from(old);
        i32::try_from(d).unwrap_or(if d < 0 { i32::MIN } else { i32::MAX })
    };
    (delta(old[0], new[0]), delta(old[1], new[1]))
}

impl Renderer {
    pub fn window(&self) -> Arc<winit::window::Window> {
        self.win.clone()
    }
    pub fn run(mut self) -> Result<(), winit::error::EventLoopError> {
        let Some(event_loop) = self.event_loop.take() else {
            // Only taken here, and `run` consumes self.
            return Ok(());
        };
        self.window().request_redraw();

        event_loop.run(move |event, target| {
            use winit::event::{Event, WindowEvent};
            match event {
                Event::WindowEvent { event, window_id } if window_id == self.window().id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::Resized(size) => {
                            let new = [size.width, size.height];
                            let (dx, dy) = size_delta(self.last_size, new);
                            self.last_size = new;
                            self.view.on_resize(dx, dy);
                            self.render_context.resize(size.width, size.height);
                        }
                        WindowEvent::CursorLeft { .. } => {
                            self.buttons.clear();
                            self.view.on_leave();
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            #[allow(clippy::cast_possible_truncation)]
                            let position =
                                ultraviolet::Vec2::new(position.x as f32, position.y as f32);
                            self.cursor = position;
                            self.view.on_motion(&MotionEvent {
                                position,
                                held: self.buttons.held(),
                            });
                        }
                        WindowEvent::MouseInput { state, button, .. } => {
                            let button = convert_button(button);
                            let state = match state {
                                winit::event::ElementState::Pressed => ButtonState::Pressed,
                                winit::event::ElementState::Released => ButtonState::Released,
                            };
                            self.buttons.update(button, state);
                            self.view.on_click(&ClickEvent {
                                position: self.cursor,
                                button,
                                state,
                            });
                        }
                        WindowEvent::MouseWheel { delta, .. } => {
                            if let Some(delta) = self.scroll.push(convert_scroll(delta)) {
                                self.view.on_scroll(&ScrollEvent { delta });
                            }
                        }
                        WindowEvent::ModifiersChanged(modifiers) => {
                            self.modifiers = modifiers.state();
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            self.key_event(&event, target);
                        }
                        WindowEvent::RedrawRequested => {
                            if let Err(e) = self.paint() {
                                log::error!("{e:?}");
                            }
                        }
                        _ => (),
                    }
                }
                Event::AboutToWait => {
                    // Tool switches and deferred work arrive through channels, poll for them.
                    self.window().request_redraw();
                }
                Event::LoopExiting => {
                    self.view.destroy(&mut self.render_context);
                }
                _ => (),
            }
        })
    }
    fn key_event(
        &mut self,
        event: &winit::event::KeyEvent,
        target: &winit::event_loop::EventLoopWindowTarget<()>,
    ) {
        if event.state != winit::event::ElementState::Pressed || event.repeat {
            return;
        }
        let winit::keyboard::PhysicalKey::Code(key) = event.physical_key else {
            return;
        };
        let hotkey = KeyboardHotkey {
            ctrl: self.modifiers.control_key(),
            alt: self.modifiers.alt_key(),
            shift: self.modifiers.shift_key(),
            key,
        };
        let Some(action) = self.hotkeys.action_of(&hotkey) else {
            return;
        };
        log::debug!("{hotkey:?} -> {action:?}");
        if let Some(tool) = action.tool() {
            // Picked up by the view at the end of the next frame.
            let _ = self.tools.send(tool);
            return;
        }
        match action {
            Action::OpenFile => self.deferred_sender.defer(|view, backend| {
                let Some(path) = actions::pick_image_file() else {
                    log::info!("Open cancelled");
                    return;
                };
                if let Err(e) = view.load_from_file(&path, backend) {
                    log::error!("Failed to open {}: {e}", path.display());
                }
            }),
            Action::CenterImage => self.view.center_image(),
            Action::ZoomIn => {
                self.view.zoom_in();
            }
            Action::ZoomOut => {
                self.view.zoom_out();
            }
            Action::Quit => target.exit(),
            Action::ToolNone | Action::ToolSelect | Action::ToolColor => (),
        }
    }
    fn paint(&mut self) -> AnyResult<()> {
        self.deferred.drain(&mut self.view, &mut self.render_context);
        self.status_bar.render(&self.win);

        self.view.render(&mut self.render_context);
        self.window().pre_present_notify();
        self.render_context.present()
    }
}
