use kanal::AsyncSender;
use kotoba_core::types::AppEvent;

use crate::state::AppState;

pub async fn handle_dictionary_selection(
    state: &AppState,
    name: String,
    output_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let known = state.config.read().await.dictionary(&name).map(|d| d.name.clone());

    match known {
        Some(name) => {
            tracing::info!("Selected dictionary {name}");
            *state.selected_dictionary.write().await = Some(name);
        }
        None => {
            tracing::warn!("Unknown dictionary {name}");
            output_tx
                .send(AppEvent::SearchFailed(format!("Unknown dictionary: {name}")))
                .await?;
        }
    }
    Ok(())
}
