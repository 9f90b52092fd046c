use super::*;

const POLL_MS: u64 = 100;

pub(crate) fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
) -> Result<()> {
    // Sub-models learn the terminal size before the first frame.
    if let Ok(area) = terminal.size() {
        app.handle_event(&Event::Resize(area.width, area.height));
    }
    let mut needs_draw = true;

    loop {
        if needs_draw {
            terminal.draw(|f| ui::draw(f, &app)).context("draw frame")?;
            needs_draw = false;
        }

        if app.should_quit() {
            break;
        }

        if !event::poll(Duration::from_millis(POLL_MS)).context("event poll")? {
            continue;
        }

        loop {
            match event::read().context("event read")? {
                Event::Key(key) if matches!(key.kind, KeyEventKind::Release) => {}
                ev @ (Event::Key(_) | Event::Resize(_, _) | Event::Paste(_)) => {
                    app.handle_event(&ev);
                    needs_draw = true;
                }
                _ => {}
            }
            if app.should_quit() {
                break;
            }
            if !event::poll(Duration::from_millis(0)).context("event poll drain")? {
                break;
            }
        }
    }

    tracing::info!(mode = app.mode().as_str(), "event loop finished");
    Ok(())
}
