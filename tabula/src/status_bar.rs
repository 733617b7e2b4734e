//! The status display. There's no widget toolkit, so the window title does the job.

use tabula_core::status::{StatusReceiver, StatusSnapshot};

pub struct StatusBar {
    receiver: StatusReceiver,
}
impl StatusBar {
    #[must_use]
    pub fn new(receiver: StatusReceiver) -> Self {
        Self { receiver }
    }
    #[must_use]
    pub fn title(snapshot: &StatusSnapshot) -> String {
        format!("{snapshot} - Tabula")
    }
    /// Show the latest status, if it changed since last time.
    pub fn render(&mut self, window: &winit::window::Window) {
        if let Some(snapshot) = self.receiver.latest() {
            log::trace!("status: {snapshot}");
            window.set_title(&Self::title(&snapshot));
        }
    }
}

#[cfg(test)]
mod test {
    use super::StatusBar;
    use tabula_core::status::StatusSnapshot;
    use tabula_core::util::Point;
    #[test]
    fn title() {
        let snapshot = StatusSnapshot {
            file_name: "cat.png".to_owned(),
            mouse_pixel: Point::new(3, -7),
            zoom: 0.5,
        };
        assert_eq!(StatusBar::title(&snapshot), "cat.png | 0.5x | (3, -7) - Tabula");
    }
}
