//! # Status
//!
//! The view describes itself once per frame for whatever status display is listening. The
//! channel holds a single snapshot: publishing overwrites anything not yet read and never waits,
//! so a slow or absent reader can't hold up rendering.

use crate::util::Point;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct StatusSnapshot {
    pub file_name: String,
    /// Image-space pixel under the cursor. May be outside the image.
    pub mouse_pixel: Point,
    /// Scale factor, `2^mult`.
    pub zoom: f32,
}
impl std::fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} | {}x | {}",
            self.file_name, self.zoom, self.mouse_pixel
        )
    }
}

pub struct StatusPublisher {
    sender: tokio::sync::watch::Sender<StatusSnapshot>,
}
impl StatusPublisher {
    /// Replace the current snapshot. Readers are only woken if it actually changed.
    pub fn publish(&self, snapshot: StatusSnapshot) {
        self.sender.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
    /// The most recently published snapshot.
    #[must_use]
    pub fn current(&self) -> StatusSnapshot {
        self.sender.borrow().clone()
    }
    #[must_use]
    pub fn subscribe(&self) -> StatusReceiver {
        StatusReceiver {
            receiver: self.sender.subscribe(),
        }
    }
}

#[derive(Clone)]
pub struct StatusReceiver {
    receiver: tokio::sync::watch::Receiver<StatusSnapshot>,
}
impl StatusReceiver {
    /// The newest snapshot, if there's been one since the last call.
    pub fn latest(&mut self) -> Option<StatusSnapshot> {
        // Err means the view is gone, nothing new will ever arrive.
        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }
    /// The newest snapshot, changed or not.
    #[must_use]
    pub fn current(&self) -> StatusSnapshot {
        self.receiver.borrow().clone()
    }
}

#[must_use]
pub fn status_channel() -> (StatusPublisher, StatusReceiver) {
    let (sender, receiver) = tokio::sync::watch::channel(StatusSnapshot::default());
    (StatusPublisher { sender }, StatusReceiver { receiver })
}
