use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use kotoba_core::language::Deconjugator;
use kotoba_core::types::{AppEvent, DisplayResult};
use kotoba_core::{Relevance, SearchError};
use kotoba_search::{Caps, Search, SearchStatus};
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Compile `text`, search the selected dictionary and stream results out,
/// best first. Query and dictionary problems are reported as
/// `SearchFailed`, not returned.
pub async fn handle_text_input(
    state: Arc<AppState>,
    text: String,
    output_tx: &AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let Some(dictionary_config) = state.dictionary().await else {
        output_tx
            .send(AppEvent::SearchFailed("No dictionary configured".to_string()))
            .await?;
        return Ok(());
    };

    let (flags, caps, morphology, delta_time) = {
        let config = state.config.read().await;
        (
            config.search.flags(),
            Caps::from(config.search.caps()),
            config.search.morphology,
            Duration::from_millis(config.delta_time.max(1)),
        )
    };

    let dictionary = Arc::new(dictionary_config.dictionary());
    let deconjugator = morphology.then_some(&state.deconjugator as &dyn Deconjugator);

    let query = match dictionary.parse_query(&text, flags, deconjugator) {
        Ok(query) => query,
        Err(e) => {
            tracing::debug!("Rejected query '{text}': {e}");
            output_tx.send(AppEvent::SearchFailed(e.to_string())).await?;
            return Ok(());
        }
    };
    tracing::debug!(patterns = ?query.pattern_sources(), "Query compiled");

    let search = Arc::new(Search::new(Arc::new(query), dictionary.clone(), caps)?);

    let started = if state.options.foreground {
        run_foreground(&search, &cancel).await?
    } else {
        run_background(&search, output_tx, &cancel, delta_time).await?
    };
    if let Err(e) = started {
        output_tx.send(AppEvent::SearchFailed(e.to_string())).await?;
        return Ok(());
    }

    send_results(&search, output_tx).await?;
    let total: usize = Relevance::ALL.iter().map(|r| search.total_results(*r)).sum();
    tracing::info!(
        dictionary = dictionary.name(),
        outcome = ?search.outcome(),
        total,
        "Search done"
    );
    output_tx
        .send(AppEvent::SearchFinished {
            dictionary: dictionary.name().to_string(),
            total,
        })
        .await?;

    Ok(())
}

/// Scan on a blocking task; nothing is shown until it ends
async fn run_foreground(
    search: &Arc<Search>,
    cancel: &CancellationToken,
) -> anyhow::Result<Result<(), SearchError>> {
    let worker = {
        let search = search.clone();
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || {
            if cancel.is_cancelled() {
                return Ok(());
            }
            search.start(false)
        })
    };
    tokio::pin!(worker);

    tokio::select! {
        result = &mut worker => Ok(result?),
        _ = cancel.cancelled() => loop {
            // a scan that began after the cancel landed is stopped on the next pass
            cancel_blocking(search).await?;
            tokio::select! {
                result = &mut worker => return Ok(result?),
                _ = tokio::time::sleep(Duration::from_millis(10)) => {}
            }
        },
    }
}

/// Scan on the search's own worker thread, forwarding high relevance
/// results while it runs
async fn run_background(
    search: &Arc<Search>,
    output_tx: &AsyncSender<AppEvent>,
    cancel: &CancellationToken,
    delta_time: Duration,
) -> anyhow::Result<Result<(), SearchError>> {
    if let Err(e) = search.start(true) {
        return Ok(Err(e));
    }

    let mut interval = tokio::time::interval(delta_time);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                cancel_blocking(search).await?;
                break;
            }
            _ = interval.tick() => {
                let status = search.status();
                output_tx
                    .send(AppEvent::SearchStatus {
                        status: format!("{status:?}"),
                        progress: search.progress(),
                    })
                    .await?;
                if status == SearchStatus::Idle {
                    break;
                }
                send_results(search, output_tx).await?;
            }
        }
    }
    Ok(Ok(()))
}

/// `Search::cancel` blocks until the worker has exited
async fn cancel_blocking(search: &Arc<Search>) -> anyhow::Result<()> {
    tracing::debug!("Cancelling search");
    let search = search.clone();
    tokio::task::spawn_blocking(move || search.cancel()).await?;
    Ok(())
}

/// Forward whatever can be pulled now; returns how many were sent
async fn send_results(search: &Search, output_tx: &AsyncSender<AppEvent>) -> anyhow::Result<usize> {
    let batch: Vec<DisplayResult> = std::iter::from_fn(|| search.pull_result())
        .map(|result| DisplayResult::from_record(result.relevance, &result.record))
        .collect();

    let sent = batch.len();
    if sent > 0 {
        output_tx.send(AppEvent::ShowResults(batch)).await?;
    }
    Ok(sent)
}
