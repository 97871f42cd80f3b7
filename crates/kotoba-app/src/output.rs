use kanal::AsyncReceiver;
use kotoba_core::Relevance;
use kotoba_core::types::{AppEvent, DisplayResult};

fn tier_mark(relevance: Relevance) -> &'static str {
    match relevance {
        Relevance::High => "[H]",
        Relevance::Medium => "[M]",
        Relevance::Low => "[L]",
    }
}

pub fn format_result(result: &DisplayResult) -> String {
    let mut line = format!("{} {}", tier_mark(result.relevance), result.term);
    if !result.reading.is_empty() {
        line.push_str(&format!(" [{}]", result.reading));
    }
    if !result.definition.is_empty() {
        line.push_str(&format!(" {}", result.definition));
    }
    if result.important {
        line.push_str(" (P)");
    }
    line
}

/// What to print for an event, if anything
pub fn render(event: &AppEvent, json: bool) -> anyhow::Result<Vec<String>> {
    let lines: Vec<String> = match event {
        AppEvent::ShowResults(results) if json => results
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<_, _>>()?,
        AppEvent::ShowResults(results) => results.iter().map(format_result).collect(),
        AppEvent::SearchFinished { total: 0, .. } => vec!["No results found".to_string()],
        _ => Vec::new(),
    };
    Ok(lines)
}

/// Prints results on stdout and problems on stderr until shutdown
pub async fn output_loop(output_rx: AsyncReceiver<AppEvent>, json: bool) -> anyhow::Result<()> {
    loop {
        let event = output_rx.recv().await?;
        match &event {
            AppEvent::Shutdown => break,
            AppEvent::SearchFailed(message) => eprintln!("{message}"),
            AppEvent::SearchStatus { status, progress } => {
                tracing::trace!(status, progress, "Search status");
            }
            AppEvent::SearchFinished { dictionary, total } => {
                tracing::debug!(dictionary, total, "Search finished");
            }
            _ => {}
        }
        for line in render(&event, json)? {
            println!("{line}");
        }
    }
    Ok(())
}
