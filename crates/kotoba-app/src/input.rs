use kanal::AsyncSender;
use kotoba_core::types::AppEvent;

/// Map one line typed at the prompt to an event.
///
/// `:dict NAME` selects a dictionary, `:cancel` stops the running search,
/// `:quit` exits. Anything else is a query.
pub fn parse_line(line: &str) -> Option<AppEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    match line.split_once(char::is_whitespace) {
        Some((":dict", name)) => Some(AppEvent::SelectDictionary(name.trim().to_string())),
        _ => match line {
            ":cancel" => Some(AppEvent::CancelSearch),
            ":quit" | ":q" => Some(AppEvent::Shutdown),
            _ => Some(AppEvent::TextInput(line.to_string())),
        },
    }
}

/// Read stdin on a plain thread; a pending read would otherwise hold up
/// runtime shutdown
pub fn spawn_stdin_reader(input_tx: AsyncSender<AppEvent>) -> std::io::Result<()> {
    let input_tx = input_tx.to_sync();
    std::thread::Builder::new()
        .name("kotoba-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("stdin read failed: {e}");
                        break;
                    }
                };
                let Some(event) = parse_line(&line) else {
                    continue;
                };
                if input_tx.send(event).is_err() {
                    return;
                }
            }
            let _ = input_tx.send(AppEvent::Shutdown);
        })?;
    Ok(())
}
