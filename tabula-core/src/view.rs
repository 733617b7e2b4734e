//! # Image view
//!
//! Ties the pieces together into something that can be fed window events and asked to draw.
//!
//! The view owns a rect of the window (`area`) and shows the image in it at a power-of-two
//! zoom. Where the image sits is described by its *pan*, the area-local position of image
//! pixel (0, 0). Until the user drags or zooms, the image is kept centered and the pan follows
//! the area around. After that the pan is whatever the user left it at.
//!
//! Right-drag on the image or middle-drag anywhere pans, the wheel zooms about the cursor, and
//! everything else goes to the active tool.

use crate::events::{ClickEvent, MotionEvent, MouseButton, ScrollEvent};
use crate::layer::Layer;
use crate::loader::{ImageLoadError, LoadedImage};
use crate::render::{LineVertex, PixelRegion, RenderBackend, ResourceError};
use crate::selection::SelectionSet;
use crate::status::{StatusPublisher, StatusSnapshot};
use crate::tools::{Tool, ToolKind, ToolReceiver, ToolTarget};
use crate::util::{FRect, Point, RangeError, Rect};
use crate::zoom::ZoomController;
use ultraviolet::Vec2;

#[derive(thiserror::Error, Debug)]
pub enum ViewError {
    #[error(transparent)]
    Load(#[from] ImageLoadError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

/// Where the image sits within the area.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub enum Placement {
    /// Centered in the area, following it through resizes.
    #[default]
    Centered,
    /// Area-local position of the image origin.
    Panned(Vec2),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewConfig {
    /// Optional cap on zoomed image size, below whatever the backend allows.
    pub max_texture_dimension: Option<u32>,
    pub outline_color: [f32; 4],
    pub paint_color: [u8; 4],
    pub initial_tool: ToolKind,
}
impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            max_texture_dimension: None,
            outline_color: [1.0, 1.0, 1.0, 1.0],
            paint_color: [0xFF, 0x00, 0xFF, 0xFF],
            initial_tool: ToolKind::default(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default)]
struct MouseState {
    /// Last known window-space position.
    location: Vec2,
    /// Image pixel under `location`, as of the last non-drag update.
    pixel: Point,
    drag_anchor: Vec2,
    /// The button panning the image, if any.
    drag_button: Option<MouseButton>,
}

pub struct ImageView {
    area: Rect,
    placement: Placement,
    zoom: ZoomController,
    /// Bottom to top. The first is the image itself.
    layers: Vec<Layer>,
    selection: SelectionSet,
    tool: Box<dyn Tool>,
    mouse: MouseState,
    file_name: String,
    status: StatusPublisher,
    tool_requests: ToolReceiver,
    config: ViewConfig,
}
impl ImageView {
    /// Open the image at `path` in a view covering `area`.
    pub fn new(
        area: Rect,
        path: impl AsRef<std::path::Path>,
        status: StatusPublisher,
        tool_requests: ToolReceiver,
        config: ViewConfig,
        backend: &mut dyn RenderBackend,
    ) -> Result<Self, ViewError> {
        let image = crate::loader::load_image(path)?;
        Ok(Self::with_image(
            area,
            image,
            status,
            tool_requests,
            config,
            backend,
        )?)
    }
    /// Like [`Self::new`], with an image that's already been decoded.
    pub fn with_image(
        area: Rect,
        image: LoadedImage,
        status: StatusPublisher,
        tool_requests: ToolReceiver,
        config: ViewConfig,
        backend: &mut dyn RenderBackend,
    ) -> Result<Self, ResourceError> {
        let LoadedImage { pixels, file_name } = image;
        let (width, height) = pixels.dimensions();
        let base = Layer::new(Point::ZERO, pixels, backend)?;
        let mut this = Self {
            area,
            placement: Placement::Centered,
            zoom: ZoomController::new(width, height, Self::zoom_limit(&config, backend)),
            layers: vec![base],
            selection: SelectionSet::new(width, height),
            tool: config.initial_tool.into_tool(),
            mouse: MouseState::default(),
            file_name,
            status,
            tool_requests,
            config,
        };
        this.update_mouse_pixel();
        Ok(this)
    }
    fn zoom_limit(config: &ViewConfig, backend: &dyn RenderBackend) -> u32 {
        let device = backend.max_texture_dimension();
        config
            .max_texture_dimension
            .map_or(device, |cap| cap.min(device))
    }
    /// Replace the image with the one at `path`. On failure, nothing changes.
    pub fn load_from_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), ViewError> {
        let image = crate::loader::load_image(path)?;
        self.load_image_data(image, backend)?;
        Ok(())
    }
    /// Replace the image. Zoom, placement, and selection start over. On failure, nothing changes.
    pub fn load_image_data(
        &mut self,
        image: LoadedImage,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), ResourceError> {
        let LoadedImage { pixels, file_name } = image;
        let (width, height) = pixels.dimensions();
        // Create before releasing, so a failure leaves the old image intact.
        let base = Layer::new(Point::ZERO, pixels, backend)?;
        let old = std::mem::replace(&mut self.layers, vec![base]);
        for layer in old {
            layer.release(backend);
        }

        self.zoom = ZoomController::new(width, height, Self::zoom_limit(&self.config, backend));
        self.selection = SelectionSet::new(width, height);
        self.placement = Placement::Centered;
        self.mouse.drag_button = None;
        self.file_name = file_name;
        self.update_mouse_pixel();
        log::info!("viewing {} ({width}x{height})", self.file_name);
        Ok(())
    }
    /// Place an overlay above all existing layers, with its top-left at `origin` in image space.
    pub fn add_layer(
        &mut self,
        origin: Point,
        pixels: image::RgbaImage,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), ResourceError> {
        self.layers.push(Layer::new(origin, pixels, backend)?);
        Ok(())
    }
    /// Release every texture. The view is empty and useless afterwards.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        for layer in self.layers.drain(..) {
            layer.release(backend);
        }
    }

    #[must_use]
    pub fn area(&self) -> Rect {
        self.area
    }
    #[must_use]
    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }
    #[must_use]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
    #[must_use]
    pub fn mouse_pixel(&self) -> Point {
        self.mouse.pixel
    }
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.mouse.drag_button.is_some()
    }
    #[must_use]
    pub fn placement(&self) -> Placement {
        self.placement
    }
    #[must_use]
    pub fn active_tool(&self) -> ToolKind {
        self.tool.kind()
    }
    /// Area-local position of image pixel (0, 0), in screen pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pan(&self) -> Vec2 {
        match self.placement {
            Placement::Panned(pan) => pan,
            Placement::Centered => {
                let (width, height) = self.canvas_size();
                Vec2::new(
                    ((self.area.w as f32 - width) / 2.0).floor(),
                    ((self.area.h as f32 - height) / 2.0).floor(),
                )
            }
        }
    }
    /// Size of the image on screen.
    fn canvas_size(&self) -> (f32, f32) {
        let (width, height) = self.zoom.original_size();
        let scale = self.zoom.scale();
        (width * scale, height * scale)
    }
    /// Window-space rect of the base image.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn canvas_rect(&self) -> FRect {
        let pan = self.pan();
        let (width, height) = self.canvas_size();
        FRect::new(
            self.area.x as f32 + pan.x,
            self.area.y as f32 + pan.y,
            width,
            height,
        )
    }
    /// Image-space rect visible through the area.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn view_rect(&self) -> FRect {
        let pan = self.pan();
        let scale = self.zoom.scale();
        FRect::new(
            -pan.x / scale,
            -pan.y / scale,
            self.area.w as f32 / scale,
            self.area.h as f32 / scale,
        )
    }
    /// Return to centered placement, keeping the zoom.
    pub fn center_image(&mut self) {
        self.placement = Placement::Centered;
        self.update_mouse_pixel();
    }

    fn update_mouse_pixel(&mut self) {
        self.mouse.pixel =
            crate::coords::to_image_pixel(self.mouse.location, self.area, self.view_rect());
    }
    #[allow(clippy::cast_precision_loss)]
    fn area_origin(&self) -> Vec2 {
        Vec2::new(self.area.x as f32, self.area.y as f32)
    }
    /// Zoom one step, keeping the image point under the area-local `anchor` where it is.
    fn zoom_about(&mut self, anchor: Vec2, zoom_in: bool) -> bool {
        let pan = self.pan();
        let changed = if zoom_in {
            self.zoom.zoom_in()
        } else {
            self.zoom.zoom_out()
        };
        if !changed {
            return false;
        }
        let factor = if zoom_in { 2.0 } else { 0.5 };
        self.placement = Placement::Panned(anchor - (anchor - pan) * factor);
        self.update_mouse_pixel();
        true
    }
    #[allow(clippy::cast_precision_loss)]
    fn area_center(&self) -> Vec2 {
        Vec2::new(self.area.w as f32 / 2.0, self.area.h as f32 / 2.0)
    }
    /// Zoom in one step about the middle of the area.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_about(self.area_center(), true)
    }
    /// Zoom out one step about the middle of the area.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_about(self.area_center(), false)
    }
    pub fn select_pixel(&mut self, point: Point) -> Result<(), RangeError> {
        self.selection.select(point)
    }
    /// Paint a pixel of the topmost layer at `point`. Shows up on the next render.
    pub fn set_pixel(&mut self, point: Point, rgba: [u8; 4]) -> Result<PixelRegion, RangeError> {
        crate::layer::set_topmost_pixel(&mut self.layers, point, rgba)
    }
    pub fn set_tool(&mut self, kind: ToolKind) {
        log::info!("switching to {kind} tool");
        self.tool = kind.into_tool();
    }

    pub fn on_click(&mut self, event: &ClickEvent) {
        self.mouse.location = event.position;
        self.update_mouse_pixel();

        let mut target = ToolTarget {
            mouse_pixel: self.mouse.pixel,
            selection: &mut self.selection,
            layers: &mut self.layers,
            paint_color: self.config.paint_color,
        };
        self.tool.on_click(event, &mut target);

        match self.mouse.drag_button {
            Some(button) if event.is_release(button) => self.mouse.drag_button = None,
            // One drag at a time.
            Some(_) => (),
            None => {
                // Right grabs the image, so the background does nothing. Middle pans from anywhere.
                let grabbed = event.is_press(MouseButton::Middle)
                    || (event.is_press(MouseButton::Right)
                        && self
                            .canvas_rect()
                            .contains(event.position.x, event.position.y));
                if grabbed {
                    self.mouse.drag_button = Some(event.button);
                    self.mouse.drag_anchor = event.position;
                }
            }
        }
    }
    pub fn on_motion(&mut self, event: &MotionEvent) {
        if let Some(button) = self.mouse.drag_button {
            if !event.held.contains(button.mask()) {
                // Release happened somewhere we didn't hear about.
                self.mouse.drag_button = None;
            }
        }
        if self.mouse.drag_button.is_some() {
            // The image moves with the cursor, so the pixel under it stays put.
            let delta = event.position - self.mouse.drag_anchor;
            self.placement = Placement::Panned(self.pan() + delta);
            self.mouse.drag_anchor = event.position;
            self.mouse.location = event.position;
            return;
        }

        self.mouse.location = event.position;
        self.update_mouse_pixel();
        let mut target = ToolTarget {
            mouse_pixel: self.mouse.pixel,
            selection: &mut self.selection,
            layers: &mut self.layers,
            paint_color: self.config.paint_color,
        };
        self.tool.on_motion(event, &mut target);
    }
    pub fn on_scroll(&mut self, event: &ScrollEvent) {
        if self.is_dragging() {
            return;
        }
        let anchor = self.mouse.location - self.area_origin();
        if event.delta > 0.0 {
            self.zoom_about(anchor, true);
        } else if event.delta < 0.0 {
            self.zoom_about(anchor, false);
        }
    }
    /// The area grew or shrank by this much, keeping its origin.
    pub fn on_resize(&mut self, dx: i32, dy: i32) {
        self.area.resize_by(dx, dy);
        self.update_mouse_pixel();
    }
    /// The cursor left the window.
    pub fn on_leave(&mut self) {
        self.mouse.drag_button = None;
    }

    fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            file_name: self.file_name.clone(),
            mouse_pixel: self.mouse.pixel,
            zoom: self.zoom.scale(),
        }
    }
    /// Selection outline as a line list, in area-local screen pixels.
    #[allow(clippy::cast_precision_loss)]
    fn outline_vertices(&self) -> Vec<LineVertex> {
        let pan = self.pan();
        let scale = self.zoom.scale();
        let to_screen = |[x, y]: [u32; 2]| LineVertex {
            position: [x as f32 * scale + pan.x, y as f32 * scale + pan.y],
        };
        self.selection
            .outline_edges()
            .into_iter()
            .flat_map(|edge| [to_screen(edge.from), to_screen(edge.to)])
            .collect()
    }
    /// Draw one frame, then pick up at most one pending tool change.
    pub fn render(&mut self, backend: &mut dyn RenderBackend) {
        self.status.publish(self.snapshot());

        let outline = self.outline_vertices();
        let view = self.view_rect();
        let scale = self.zoom.scale();

        for layer in &mut self.layers {
            layer.flush(backend);
        }
        backend.set_viewport(self.area);
        for (depth, layer) in self.layers.iter().enumerate() {
            if let Some(quad) = layer.geometry(view, scale) {
                // Only the image itself gets a backdrop, overlays blend over whatever is below.
                if depth == 0 {
                    backend.draw_checkerboard(&quad);
                }
                backend.draw_triangles(layer.texture(), &quad);
            }
        }
        if !outline.is_empty() {
            backend.draw_lines(&outline, self.config.outline_color);
        }

        if let Ok(kind) = self.tool_requests.try_recv() {
            self.set_tool(kind);
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ImageView, Placement, ViewConfig};
    use crate::events::{
        ButtonMask, ButtonState, ClickEvent, MotionEvent, MouseButton, ScrollEvent,
    };
    use crate::loader::{testing, LoadedImage};
    use crate::render::testing::{Call, RecordingBackend};
    use crate::status::{status_channel, StatusReceiver};
    use crate::tools::{tool_channel, ToolKind, ToolSender};
    use crate::util::{Point, Rect};
    use ultraviolet::Vec2;

    struct Harness {
        view: ImageView,
        backend: RecordingBackend,
        status: StatusReceiver,
        tools: ToolSender,
    }
    fn harness(width: u32, height: u32, tool: ToolKind) -> Harness {
        let mut backend = RecordingBackend::default();
        let (publisher, status) = status_channel();
        let (tools, requests) = tool_channel();
        let config = ViewConfig {
            initial_tool: tool,
            ..ViewConfig::default()
        };
        let image = LoadedImage {
            pixels: image::RgbaImage::new(width, height),
            file_name: "blank.png".to_owned(),
        };
        let view = ImageView::with_image(
            Rect::new(0, 0, 100, 100),
            image,
            publisher,
            requests,
            config,
            &mut backend,
        )
        .unwrap();
        Harness {
            view,
            backend,
            status,
            tools,
        }
    }
    fn click(x: f32, y: f32, button: MouseButton, state: ButtonState) -> ClickEvent {
        ClickEvent {
            position: Vec2::new(x, y),
            button,
            state,
        }
    }
    fn motion(x: f32, y: f32, held: ButtonMask) -> MotionEvent {
        MotionEvent {
            position: Vec2::new(x, y),
            held,
        }
    }
    fn scroll(delta: f32) -> ScrollEvent {
        ScrollEvent { delta }
    }

    #[test]
    fn end_to_end() {
        let path = testing::write_png("e2e.png", 4, 4);
        let mut backend = RecordingBackend::default();
        let (publisher, mut status) = status_channel();
        let (_tools, requests) = tool_channel();
        let config = ViewConfig {
            initial_tool: ToolKind::PixelSelection,
            ..ViewConfig::default()
        };
        let mut view = ImageView::new(
            Rect::new(0, 0, 100, 100),
            &path,
            publisher,
            requests,
            config,
            &mut backend,
        )
        .unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(view.pan(), Vec2::new(48.0, 48.0));

        view.on_motion(&motion(50.0, 50.0, ButtonMask::empty()));
        assert_eq!(view.mouse_pixel(), Point::new(2, 2));
        view.on_scroll(&scroll(1.0));
        view.on_scroll(&scroll(1.0));
        assert_eq!(view.zoom().scale(), 4.0);
        // Zooming about the cursor keeps the same pixel under it.
        assert_eq!(view.pan(), Vec2::new(42.0, 42.0));
        assert_eq!(view.mouse_pixel(), Point::new(2, 2));

        view.on_click(&click(50.0, 50.0, MouseButton::Left, ButtonState::Pressed));
        assert!(view.selection().contains(10));
        assert_eq!(view.selection().len(), 1);
        assert_eq!(view.selection().outline_edges().len(), 4);

        view.render(&mut backend);
        let lines: Vec<_> = backend.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 8);
        assert_eq!(backend.triangles().count(), 1);

        let snapshot = status.latest().unwrap();
        assert_eq!(snapshot.mouse_pixel, Point::new(2, 2));
        assert_eq!(snapshot.zoom, 4.0);
        assert!(snapshot.file_name.ends_with("e2e.png"));
    }
    #[test]
    fn pan_is_chunking_independent() {
        let drag = |steps: &[(f32, f32)]| {
            let mut h = harness(10, 10, ToolKind::Empty);
            let start = h.view.pan();
            h.view
                .on_click(&click(50.0, 50.0, MouseButton::Right, ButtonState::Pressed));
            assert!(h.view.is_dragging());
            let mut position = Vec2::new(50.0, 50.0);
            for &(dx, dy) in steps {
                position += Vec2::new(dx, dy);
                h.view
                    .on_motion(&motion(position.x, position.y, ButtonMask::RIGHT));
            }
            h.view.on_click(&click(
                position.x,
                position.y,
                MouseButton::Right,
                ButtonState::Released,
            ));
            assert!(!h.view.is_dragging());
            h.view.pan() - start
        };
        let whole = drag(&[(30.0, -20.0)]);
        let chunked = drag(&[(10.0, -5.0), (10.0, -5.0), (10.0, -10.0)]);
        let wobbly = drag(&[(45.0, 3.0), (-15.0, -23.0)]);
        assert_eq!(whole, Vec2::new(30.0, -20.0));
        assert_eq!(chunked, whole);
        assert_eq!(wobbly, whole);
    }
    #[test]
    fn drag_needs_the_canvas() {
        let mut h = harness(10, 10, ToolKind::Empty);
        // Canvas spans 45..55
        h.view
            .on_click(&click(5.0, 5.0, MouseButton::Right, ButtonState::Pressed));
        assert!(!h.view.is_dragging());
        h.view.on_motion(&motion(20.0, 20.0, ButtonMask::RIGHT));
        assert_eq!(h.view.placement(), Placement::Centered);
    }
    #[test]
    fn drag_does_not_outlive_the_button() {
        let mut h = harness(10, 10, ToolKind::Empty);
        h.view
            .on_click(&click(50.0, 50.0, MouseButton::Right, ButtonState::Pressed));
        h.view.on_leave();
        assert!(!h.view.is_dragging());

        h.view
            .on_click(&click(50.0, 50.0, MouseButton::Right, ButtonState::Pressed));
        // Released outside the window, came back with nothing held.
        h.view.on_motion(&motion(60.0, 60.0, ButtonMask::empty()));
        assert!(!h.view.is_dragging());
        assert_eq!(h.view.placement(), Placement::Centered);
    }
    #[test]
    fn middle_drag_pans_from_anywhere() {
        let mut h = harness(10, 10, ToolKind::PixelSelection);
        // Off the canvas, which spans 45..55.
        h.view
            .on_click(&click(5.0, 5.0, MouseButton::Middle, ButtonState::Pressed));
        assert!(h.view.is_dragging());
        h.view.on_motion(&motion(25.0, 15.0, ButtonMask::MIDDLE));
        assert_eq!(h.view.pan(), Vec2::new(65.0, 55.0));
        // The other pan button can't take over, nor end it.
        h.view
            .on_click(&click(25.0, 15.0, MouseButton::Right, ButtonState::Released));
        assert!(h.view.is_dragging());
        h.view
            .on_click(&click(25.0, 15.0, MouseButton::Middle, ButtonState::Released));
        assert!(!h.view.is_dragging());
        // Panning never reaches the tool.
        assert!(h.view.selection().is_empty());

        // Let go of middle without us hearing about it.
        h.view
            .on_click(&click(5.0, 5.0, MouseButton::Middle, ButtonState::Pressed));
        h.view.on_motion(&motion(10.0, 10.0, ButtonMask::RIGHT));
        assert!(!h.view.is_dragging());
    }
    #[test]
    fn scroll_ignored_while_dragging() {
        let mut h = harness(10, 10, ToolKind::Empty);
        h.view
            .on_click(&click(50.0, 50.0, MouseButton::Right, ButtonState::Pressed));
        h.view.on_scroll(&scroll(1.0));
        assert_eq!(h.view.zoom().mult(), 0);
        h.view
            .on_click(&click(50.0, 50.0, MouseButton::Right, ButtonState::Released));
        h.view.on_scroll(&scroll(1.0));
        assert_eq!(h.view.zoom().mult(), 1);
        h.view.on_scroll(&scroll(-2.5));
        h.view.on_scroll(&scroll(0.0));
        assert_eq!(h.view.zoom().mult(), 0);
    }
    #[test]
    fn zoom_out_anchored() {
        let mut h = harness(8, 8, ToolKind::Empty);
        h.view.on_motion(&motion(50.0, 50.0, ButtonMask::empty()));
        let before = h.view.mouse_pixel();
        assert!(h.view.zoom_about(Vec2::new(50.0, 50.0), false));
        // pan 46 -> (46 + 50) / 2
        assert_eq!(h.view.pan(), Vec2::new(48.0, 48.0));
        assert_eq!(h.view.mouse_pixel(), before);
    }
    #[test]
    fn resize_recenters() {
        let mut h = harness(10, 10, ToolKind::Empty);
        assert_eq!(h.view.pan(), Vec2::new(45.0, 45.0));
        h.view.on_resize(20, -40);
        assert_eq!(h.view.area(), Rect::new(0, 0, 120, 60));
        assert_eq!(h.view.pan(), Vec2::new(55.0, 25.0));
        // Odd leftovers floor
        h.view.on_resize(1, 0);
        assert_eq!(h.view.pan().x, 55.0);
    }
    #[test]
    fn center_after_pan() {
        let mut h = harness(10, 10, ToolKind::Empty);
        assert!(h.view.zoom_in());
        assert!(matches!(h.view.placement(), Placement::Panned(_)));
        h.view.center_image();
        assert_eq!(h.view.placement(), Placement::Centered);
        assert_eq!(h.view.pan(), Vec2::new(40.0, 40.0));
        assert_eq!(h.view.zoom().mult(), 1);
    }
    #[test]
    fn one_tool_switch_per_frame() {
        let mut h = harness(4, 4, ToolKind::Empty);
        h.tools.send(ToolKind::PixelSelection).unwrap();
        h.tools.send(ToolKind::PixelColor).unwrap();
        assert_eq!(h.view.active_tool(), ToolKind::Empty);
        h.view.render(&mut h.backend);
        assert_eq!(h.view.active_tool(), ToolKind::PixelSelection);
        h.view.render(&mut h.backend);
        assert_eq!(h.view.active_tool(), ToolKind::PixelColor);
        h.view.render(&mut h.backend);
        assert_eq!(h.view.active_tool(), ToolKind::PixelColor);
    }
    #[test]
    fn failed_reload_keeps_state() {
        let mut h = harness(4, 4, ToolKind::PixelSelection);
        h.view.select_pixel(Point::new(1, 1)).unwrap();
        h.view.zoom_in();
        let pan = h.view.pan();

        let path = testing::scratch_path("corrupt.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G', 0, 0, 0]).unwrap();
        assert!(h.view.load_from_file(&path, &mut h.backend).is_err());
        std::fs::remove_file(&path).unwrap();

        assert_eq!(h.view.file_name(), "blank.png");
        assert_eq!(h.view.layers().len(), 1);
        assert!(h.view.selection().contains(5));
        assert_eq!(h.view.zoom().mult(), 1);
        assert_eq!(h.view.pan(), pan);
        assert_eq!(h.backend.live_textures(), 1);

        // Decodes, but the backend refuses it.
        h.backend.fail_uploads = true;
        let image = LoadedImage {
            pixels: image::RgbaImage::new(2, 2),
            file_name: "other.png".to_owned(),
        };
        assert!(h.view.load_image_data(image, &mut h.backend).is_err());
        assert_eq!(h.view.file_name(), "blank.png");
        assert_eq!(h.backend.live_textures(), 1);
    }
    #[test]
    fn reload_replaces_everything() {
        let mut h = harness(4, 4, ToolKind::PixelSelection);
        h.view.select_pixel(Point::new(1, 1)).unwrap();
        h.view
            .add_layer(Point::new(1, 1), image::RgbaImage::new(2, 2), &mut h.backend)
            .unwrap();
        h.view.zoom_in();
        assert_eq!(h.backend.live_textures(), 2);

        let path = testing::write_png("next.png", 6, 2);
        h.view.load_from_file(&path, &mut h.backend).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(h.view.file_name().ends_with("next.png"));
        assert_eq!(h.view.layers().len(), 1);
        assert!(h.view.selection().is_empty());
        assert_eq!(h.view.selection().width(), 6);
        assert_eq!(h.view.zoom().mult(), 0);
        assert_eq!(h.view.placement(), Placement::Centered);
        // Old textures went back.
        assert_eq!(h.backend.live_textures(), 1);
        // New texture made before the old ones were released.
        let first_destroy = h
            .backend
            .calls
            .iter()
            .position(|call| matches!(call, Call::Destroy { .. }))
            .unwrap();
        let last_upload = h
            .backend
            .calls
            .iter()
            .rposition(|call| matches!(call, Call::Upload { .. }))
            .unwrap();
        assert!(last_upload < first_destroy);
    }
    #[test]
    fn out_of_range_writes() {
        let mut h = harness(4, 4, ToolKind::PixelColor);
        assert!(h.view.set_pixel(Point::new(4, 0), [1; 4]).is_err());
        assert!(h.view.set_pixel(Point::new(0, -1), [1; 4]).is_err());
        assert!(h.view.select_pixel(Point::new(-3, 2)).is_err());
        assert!(!h.view.layers()[0].is_dirty());
        assert!(h.view.selection().is_empty());

        // Clicking the background with the color tool is a no-op too.
        h.view
            .on_click(&click(1.0, 1.0, MouseButton::Left, ButtonState::Pressed));
        assert!(!h.view.layers()[0].is_dirty());
        h.view.render(&mut h.backend);
        assert!(!h
            .backend
            .calls
            .iter()
            .any(|call| matches!(call, Call::Update { .. })));
    }
    #[test]
    fn painting_reaches_the_texture() {
        let mut h = harness(4, 4, ToolKind::PixelColor);
        // Canvas spans 48..52
        h.view
            .on_click(&click(49.0, 50.0, MouseButton::Left, ButtonState::Pressed));
        assert_eq!(
            h.view.layers()[0].pixel(Point::new(1, 2)),
            Some([0xFF, 0x00, 0xFF, 0xFF])
        );
        h.view.render(&mut h.backend);
        assert!(h
            .backend
            .calls
            .iter()
            .any(|call| matches!(call, Call::Update { .. })));
    }
    #[test]
    fn culls_offscreen() {
        let mut h = harness(4, 4, ToolKind::Empty);
        h.view
            .on_click(&click(50.0, 50.0, MouseButton::Right, ButtonState::Pressed));
        h.view.on_motion(&motion(500.0, 50.0, ButtonMask::RIGHT));
        h.view.render(&mut h.backend);
        assert_eq!(h.backend.triangles().count(), 0);
        // Still sets up the viewport
        assert!(h
            .backend
            .calls
            .contains(&Call::Viewport(Rect::new(0, 0, 100, 100))));
    }
    #[test]
    fn checkerboard_behind_image_only() {
        let mut h = harness(4, 4, ToolKind::Empty);
        h.view
            .add_layer(Point::new(1, 1), image::RgbaImage::new(2, 2), &mut h.backend)
            .unwrap();
        h.backend.calls.clear();
        h.view.render(&mut h.backend);

        let draws: Vec<_> = h
            .backend
            .calls
            .iter()
            .filter(|call| matches!(call, Call::Checkerboard { .. } | Call::Triangles { .. }))
            .collect();
        assert_eq!(draws.len(), 3);
        // Backdrop first, covering exactly the image's quad.
        let (Call::Checkerboard { vertices: backdrop }, Call::Triangles { vertices: image, .. }) =
            (draws[0], draws[1])
        else {
            panic!("unexpected draw order {draws:?}");
        };
        assert_eq!(
            backdrop.iter().map(|v| v.position).collect::<Vec<_>>(),
            image.iter().map(|v| v.position).collect::<Vec<_>>()
        );
        assert!(matches!(draws[2], Call::Triangles { .. }));

        // Nothing on screen, no backdrop either.
        h.view
            .on_click(&click(50.0, 50.0, MouseButton::Right, ButtonState::Pressed));
        h.view.on_motion(&motion(500.0, 50.0, ButtonMask::RIGHT));
        h.backend.calls.clear();
        h.view.render(&mut h.backend);
        assert!(!h
            .backend
            .calls
            .iter()
            .any(|call| matches!(call, Call::Checkerboard { .. })));
    }
    #[test]
    fn status_each_frame() {
        let mut h = harness(4, 4, ToolKind::Empty);
        h.view.render(&mut h.backend);
        let first = h.status.latest().unwrap();
        assert_eq!(first.file_name, "blank.png");
        assert_eq!(first.zoom, 1.0);
        // Nothing changed, nothing new.
        h.view.render(&mut h.backend);
        assert_eq!(h.status.latest(), None);
        h.view.on_motion(&motion(49.0, 51.0, ButtonMask::empty()));
        h.view.render(&mut h.backend);
        assert_eq!(h.status.latest().unwrap().mouse_pixel, Point::new(1, 3));
    }
    #[test]
    fn destroy_releases() {
        let mut h = harness(4, 4, ToolKind::Empty);
        h.view
            .add_layer(Point::new(-2, -2), image::RgbaImage::new(3, 3), &mut h.backend)
            .unwrap();
        h.view.destroy(&mut h.backend);
        assert_eq!(h.backend.live_textures(), 0);
        assert!(h.view.layers().is_empty());
    }
    #[test]
    fn zoom_limit_from_config() {
        let mut backend = RecordingBackend::new(4096);
        let (publisher, _status) = status_channel();
        let (_tools, requests) = tool_channel();
        let config = ViewConfig {
            max_texture_dimension: Some(64),
            ..ViewConfig::default()
        };
        let image = LoadedImage {
            pixels: image::RgbaImage::new(10, 10),
            file_name: "capped.png".to_owned(),
        };
        let mut view = ImageView::with_image(
            Rect::new(0, 0, 100, 100),
            image,
            publisher,
            requests,
            config,
            &mut backend,
        )
        .unwrap();
        // 20, 40 fit under 64. 80 doesn't.
        assert!(view.zoom_in());
        assert!(view.zoom_in());
        assert!(!view.zoom_in());
        assert_eq!(view.zoom().mult(), 2);
    }
}
