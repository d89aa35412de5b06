use std::collections::HashSet;
use tracing::debug;

use crate::common::error::Result;
use crate::model::CollectionModel;

/// Collapses near-duplicate clusters: fingerprints every registered,
/// error-free memento, then keeps one canonical representative per
/// fingerprint group — the most recent capture, via
/// [`CollectionModel::get_first_urim_by_raw_fingerprint`].
///
/// Canonical URI-Ms are emitted in the order their fingerprint group first
/// appears in the registration list.
pub async fn list_canonical_urims(model: &CollectionModel) -> Result<Vec<String>> {
    let urims: Vec<String> = model.get_memento_uri_list().to_vec();

    let mut group_order: Vec<u64> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();
    for urim in &urims {
        if model.get_memento_error_information(urim).await?.is_some() {
            debug!(urim, "skipping error-recorded memento during dedup");
            continue;
        }
        let fingerprint = model.get_raw_fingerprint(urim).await?;
        if seen.insert(fingerprint) {
            group_order.push(fingerprint);
        }
    }

    let mut canonical = Vec::with_capacity(group_order.len());
    for fingerprint in group_order {
        let (_, urim) = model.get_first_urim_by_raw_fingerprint(fingerprint).await?;
        canonical.push(urim);
    }
    Ok(canonical)
}
