#![warn(clippy::pedantic)]

pub mod actions;
pub mod render_device;
pub mod settings;
pub mod status_bar;
pub mod window;

use anyhow::Result as AnyResult;

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let (settings, state) = settings::Settings::load();
    if state == settings::LoadState::Missing {
        // First run, leave an editable copy behind.
        if let Err(e) = settings.save() {
            log::warn!("Failed to save settings:\n{e:?}");
        }
    }
    let hotkeys = settings.keys_to_actions()?;

    // A path on the command line, else ask. Paths are OSStrings, let the system handle encoding.
    let path = match std::env::args_os().nth(1) {
        Some(path) => std::path::PathBuf::from(path),
        None => {
            let Some(path) = actions::pick_image_file() else {
                log::info!("No image chosen, exiting.");
                return Ok(());
            };
            path
        }
    };

    let window_surface = window::Surface::new(&settings.window)?;
    let window = window_surface.window();
    let size = window.inner_size();
    let mut render_context =
        render_device::RenderContext::new_with_window(window, settings.view.background)?;

    let (status, status_receiver) = tabula_core::status::status_channel();
    let (tools, tool_requests) = tabula_core::tools::tool_channel();
    let view = tabula_core::ImageView::new(
        tabula_core::util::Rect::new(0, 0, size.width, size.height),
        &path,
        status,
        tool_requests,
        settings.view_config(),
        &mut render_context,
    )?;

    window_surface
        .with_view(
            view,
            render_context,
            status_bar::StatusBar::new(status_receiver),
            tools,
            hotkeys,
        )
        .run()
        .map_err(Into::into)
}
