use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use dedup_cluster::Item;
use dedup_store::ListingStore;

use crate::error::PipelineError;

/// Loads (item, source, embedding) triples for clustering.
///
/// With `only_new` set, items already present in the assignment table are
/// filtered out; the remaining items are then clustered only among
/// themselves, without the representatives of previously created clusters.
/// A new item therefore never joins a pre-existing cluster in that mode.
///
/// Rows whose embedding fails to parse, has the wrong dimension or contains
/// non-finite values are skipped with a warning, as are rows with no known
/// source. The expected dimension is fixed by the first well-formed row.
/// Output is sorted by item id so runs are reproducible.
pub async fn load_items(
    store: &dyn ListingStore,
    only_new: bool,
) -> Result<Vec<Item>, PipelineError> {
    let rows = store.embeddings().await?;
    let sources: HashMap<String, String> = store
        .sources()
        .await?
        .into_iter()
        .map(|row| (row.id, row.source))
        .collect();

    let assigned: HashSet<String> = if only_new {
        store
            .assignments()
            .await?
            .into_iter()
            .map(|row| row.item_id)
            .collect()
    } else {
        HashSet::new()
    };

    let total = rows.len();
    let mut items = Vec::with_capacity(total);
    let mut dimension: Option<usize> = None;
    let mut skipped = 0usize;

    for row in rows {
        if only_new && assigned.contains(&row.item_id) {
            continue;
        }
        let Some(source) = sources.get(&row.item_id) else {
            warn!(item = %row.item_id, "no source for item, skipping");
            skipped += 1;
            continue;
        };
        let embedding = match parse_embedding(&row.embedding, dimension) {
            Ok(v) => v,
            Err(e) => {
                warn!(item = %row.item_id, error = %e, "skipping row");
                skipped += 1;
                continue;
            }
        };
        dimension.get_or_insert(embedding.len());
        items.push(Item {
            id: row.item_id,
            source: source.clone(),
            embedding,
        });
    }

    items.sort_by(|a, b| a.id.cmp(&b.id));
    info!(loaded = items.len(), total, skipped, only_new, "loaded items");
    Ok(items)
}

/// Decodes one persisted embedding from its JSON text form.
fn parse_embedding(raw: &str, expected: Option<usize>) -> Result<Vec<f32>, PipelineError> {
    let v: Vec<f32> =
        serde_json::from_str(raw).map_err(|e| PipelineError::Data(e.to_string()))?;
    if v.is_empty() {
        return Err(PipelineError::Data("empty vector".to_string()));
    }
    if let Some(dim) = expected {
        if v.len() != dim {
            return Err(PipelineError::Data(format!(
                "dimension mismatch: expected {dim}, got {}",
                v.len()
            )));
        }
    }
    if v.iter().any(|x| !x.is_finite()) {
        return Err(PipelineError::Data("non-finite component".to_string()));
    }
    Ok(v)
}
