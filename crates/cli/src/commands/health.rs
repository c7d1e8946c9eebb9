//! Backend health commands.

use avira_vastra_storefront::AppState;
use avira_vastra_storefront::api::health_url;
use avira_vastra_storefront::services::health::check_once;

use super::{CommandResult, say};

/// Probe once, or watch until interrupted.
pub async fn run(state: &AppState, watch: bool) -> CommandResult {
    if !watch {
        let status = check_once(state.api()).await;
        say!("{status} ({})", health_url(state.api().base_url()));
        return Ok(());
    }

    let monitor = state.spawn_health_monitor();
    let mut updates = monitor.subscribe();
    say!("{}", monitor.status());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let status = *updates.borrow_and_update();
                say!("{status}");
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
