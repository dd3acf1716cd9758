use anyhow::Context;
use fundmatch_core::domain::contract::RecommendRequest;
use fundmatch_core::Engine;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

/// Accepted request file shapes: one request, an array, or `{ "users": [...] }`.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum BatchDocument {
    Requests(Vec<RecommendRequest>),
    Wrapped { users: Vec<RecommendRequest> },
    Single(RecommendRequest),
}

pub async fn read_requests(path: &Path) -> anyhow::Result<Vec<RecommendRequest>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read profiles {}", path.display()))?;
    let doc = serde_json::from_str::<BatchDocument>(&text)
        .with_context(|| format!("profiles {} do not match the request schema", path.display()))?;

    let requests = match doc {
        BatchDocument::Requests(v) => v,
        BatchDocument::Wrapped { users } => users,
        BatchDocument::Single(r) => vec![r],
    };
    anyhow::ensure!(!requests.is_empty(), "no profiles provided");
    Ok(requests)
}

#[derive(Debug, Clone, Copy)]
pub enum OutputShape {
    Flat,
    Structured,
}

/// Serves every request against the shared engine, one blocking task per request.
/// A failing request is reported in its slot and does not abort the batch.
pub async fn run(
    engine: Arc<Engine>,
    requests: Vec<RecommendRequest>,
    shape: OutputShape,
) -> anyhow::Result<Vec<Value>> {
    let mut handles = Vec::with_capacity(requests.len());
    for request in requests {
        let engine = Arc::clone(&engine);
        let user_id = request.profile.user_id.clone();
        let handle = tokio::task::spawn_blocking(move || -> anyhow::Result<Value> {
            let value = match shape {
                OutputShape::Flat => serde_json::to_value(engine.recommend(request)?)?,
                OutputShape::Structured => {
                    serde_json::to_value(engine.recommend_structured(request)?)?
                }
            };
            Ok(value)
        });
        handles.push((user_id, handle));
    }

    let mut out = Vec::with_capacity(handles.len());
    for (user_id, handle) in handles {
        let result = handle
            .await
            .with_context(|| format!("recommendation task panicked (user_id={user_id})"))?;
        match result {
            Ok(value) => out.push(json!({
                "user_id": user_id,
                "status": "success",
                "result": value,
            })),
            Err(err) => {
                sentry_anyhow::capture_anyhow(&err);
                tracing::warn!(%user_id, error = %format!("{err:#}"), "recommendation failed");
                out.push(json!({
                    "user_id": user_id,
                    "status": "error",
                    "error": format!("{err:#}"),
                }));
            }
        }
    }

    Ok(out)
}
