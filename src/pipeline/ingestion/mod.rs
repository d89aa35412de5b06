use std::collections::HashSet;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::app::ports::FetchedResponse;
use crate::common::error::{CurateError, Result};
use crate::model::rawuri::raw_urim;
use crate::model::CollectionModel;

/// Fetches a batch of URI-Ms (and their raw-content counterparts)
/// concurrently and drains them in completion order.
///
/// Every URI-M settles exactly once: a successful fetch whose response
/// carries a `Memento-Datetime` header is registered with the model;
/// anything else (request failure, missing memento marker) becomes an Error
/// Record. One slow or dead link never blocks the rest of the batch, and a
/// failed fetch is not retried within the session.
pub async fn add_many_mementos(model: &mut CollectionModel, urims: &[String]) -> Result<()> {
    let mut tasks: JoinSet<(String, Result<FetchedResponse>)> = JoinSet::new();
    let mut submitted: HashSet<String> = HashSet::new();

    for urim in urims {
        if !submitted.insert(urim.clone()) {
            continue;
        }
        let fetch = model.fetch_port();
        let urim = urim.clone();
        tasks.spawn(async move {
            let raw = raw_urim(&urim);
            let outcome = match fetch.get(&urim).await {
                Ok(response) => match fetch.get(&raw).await {
                    Ok(_) => Ok(response),
                    Err(message) => Err(CurateError::Fetch { uri: raw, message }),
                },
                Err(message) => Err(CurateError::Fetch { uri: urim.clone(), message }),
            };
            (urim, outcome)
        });
    }

    info!(count = submitted.len(), "ingesting memento batch");

    let mut registered = 0usize;
    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        let (urim, outcome) = joined.map_err(|e| CurateError::Ingestion(e.to_string()))?;
        match outcome {
            Ok(response) => {
                if response.header("memento-datetime").is_some() {
                    model.register_memento(&urim);
                    registered += 1;
                    debug!(urim, "memento registered");
                } else {
                    failed += 1;
                    model
                        .add_memento_error(
                            &urim,
                            &format!("URI-M {urim} does not produce a memento"),
                        )
                        .await?;
                }
            }
            Err(error) => {
                warn!(urim, %error, "memento fetch failed during batch ingestion");
                failed += 1;
                model.add_memento_error(&urim, &error.to_string()).await?;
            }
        }
    }

    info!(registered, failed, "memento batch settled");
    Ok(())
}
