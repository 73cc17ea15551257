//! box-watch - follows a panel as it moves and resizes.
//!
//! A tokio interval stands in for the frame clock of a real event loop:
//! every frame advances the host's timers, and scripted frames move the
//! panel, resize it or resize the window. The component is re-rendered only
//! when something it reads has changed.

use lookout::prelude::*;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(50);
const FRAMES: u32 = 40;

#[tokio::main(flavor = "current_thread")]
async fn main() -> lookout::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let host = LocalHost::new();
    let component = Component::new();
    let panel = Node::new(Rect::new(40.0, 40.0, 240.0, 140.0));
    let options = LocationOptions::default();

    let render = || component.render(|| (use_box(&host, options), use_window_size(&host)));

    let ((handle, _), window) = render();
    tracing::info!("Window is {}x{}", window.width, window.height);
    handle.attach(Some(panel.clone()));
    render();
    host.notify_resize(&panel, panel.rect().size())?;

    let mut interval = tokio::time::interval(FRAME);
    let mut renders = 0;
    for frame in 0..FRAMES {
        interval.tick().await;

        match frame {
            10 => panel.move_to(Point::new(80.0, 60.0)),
            20 => {
                panel.set_rect(panel.rect().with_size(Size::new(320.0, 180.0)));
                host.notify_resize(&panel, panel.rect().size())?;
            }
            30 => {
                host.dispatch(WindowEvent::Resized(Size::new(1280.0, 720.0)));
            }
            _ => {}
        }
        host.advance(FRAME);
        host.clear_operations();

        if !component.is_dirty() {
            continue;
        }
        renders += 1;
        let ((_, bounds), window) = render();
        match bounds {
            Some(bounds) => tracing::info!(
                "Frame {}: panel at ({}, {}) size {}x{}, window {}x{}",
                frame,
                bounds.x0,
                bounds.y0,
                bounds.width(),
                bounds.height(),
                window.width,
                window.height
            ),
            None => tracing::info!("Frame {}: panel not measured yet", frame),
        }
    }

    tracing::info!("{} frames, {} renders", FRAMES, renders);
    component.unmount();
    Ok(())
}
