use client_core::ListState;
use serde_json::Value;
use shared::domain::ListPhase;

/// Fields tried, in order, when picking a row label.
const LABEL_FIELDS: [&str; 5] = ["name", "title", "reference", "plate", "id"];

pub fn status_line(state: &ListState<Value>) -> String {
    let page = state
        .pagination
        .map(|info| format!("page {}/{} total={}", info.current_page, info.last_page, info.total))
        .unwrap_or_else(|| "no pages".to_string());

    match state.phase() {
        ListPhase::Idle => "idle".to_string(),
        ListPhase::Loading => "loading...".to_string(),
        ListPhase::LoadingMore => format!("loading more... ({page})"),
        ListPhase::Refreshing => format!("refreshing... ({page})"),
        ListPhase::Settled => {
            let more = if state.can_load_more() {
                " (:more for next page)"
            } else {
                ""
            };
            format!("{} items, {page}{more}", state.items.len())
        }
        ListPhase::Error => format!(
            "error: {} (:retry to try again)",
            state.error.as_deref().unwrap_or_default()
        ),
    }
}

pub fn item_label(item: &Value) -> String {
    LABEL_FIELDS
        .iter()
        .find_map(|field| match item.get(field) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| item.to_string())
}
