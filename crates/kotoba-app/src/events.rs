use std::collections::VecDeque;
use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use kotoba_core::types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

pub mod select_dictionary;
pub mod text_input;

use select_dictionary::handle_dictionary_selection;
use text_input::handle_text_input;

/// App's main loop.
///
/// Searches run one at a time in arrival order. While one runs, the loop
/// still listens for `CancelSearch` and `Shutdown`; anything else waits.
pub async fn event_loop(
    state: Arc<AppState>,
    input_rx: AsyncReceiver<AppEvent>,
    output_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut pending: VecDeque<AppEvent> = VecDeque::new();
    let mut shutting_down = false;

    tracing::debug!("Event loop started");
    while !shutting_down || !pending.is_empty() {
        let event = match pending.pop_front() {
            Some(event) => event,
            None => tokio::select! {
                _ = cancel.cancelled() => break,
                event = input_rx.recv() => match event {
                    Ok(event) => event,
                    Err(_) => break,
                },
            },
        };

        tracing::debug!(event = ?std::mem::discriminant(&event), "Event received");
        match event {
            AppEvent::TextInput(text) => {
                let search_cancel = cancel.child_token();
                let search = handle_text_input(state.clone(), text, &output_tx, search_cancel.clone());
                tokio::pin!(search);

                loop {
                    tokio::select! {
                        result = &mut search => {
                            result?;
                            break;
                        }
                        event = input_rx.recv(), if !shutting_down => match event {
                            Ok(AppEvent::CancelSearch) => search_cancel.cancel(),
                            Ok(AppEvent::Shutdown) => shutting_down = true,
                            Ok(other) => pending.push_back(other),
                            // input is gone, let the search finish
                            Err(_) => shutting_down = true,
                        },
                    }
                }
            }
            AppEvent::SelectDictionary(name) => {
                handle_dictionary_selection(&state, name, &output_tx).await?;
            }
            AppEvent::CancelSearch => {
                tracing::debug!("Nothing to cancel");
            }
            AppEvent::Shutdown => shutting_down = true,
            AppEvent::ShowResults(_)
            | AppEvent::SearchStatus { .. }
            | AppEvent::SearchFailed(_)
            | AppEvent::SearchFinished { .. } => {
                // output-only events
            }
        }
    }

    tracing::debug!("Event loop finished");
    output_tx.send(AppEvent::Shutdown).await?;
    Ok(())
}
