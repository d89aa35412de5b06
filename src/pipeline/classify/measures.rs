use async_trait::async_trait;
use std::collections::HashSet;
use tracing::debug;

use crate::common::error::{CurateError, Result};
use crate::model::CollectionModel;
use crate::pipeline::classify::{Measure, MeasureModel};

/// Published default threshold for [`ByteCountMeasure`]: a memento whose
/// boilerplate-free size shrinks by more than 65% relative to the first
/// capture in its TimeMap is judged off-topic.
pub const DEFAULT_BYTECOUNT_THRESHOLD: f64 = -0.65;

/// Published default threshold for [`WordCountMeasure`]: off-topic past a
/// 70% relative word-count drop.
pub const DEFAULT_WORDCOUNT_THRESHOLD: f64 = -0.70;

/// Scores each memento by the relative change of some content count against
/// the first registered memento of its TimeMap. A capture replaced by an
/// error page or a domain-parking stub collapses toward -1.0.
async fn score_relative_change(
    model: &CollectionModel,
    result: &mut MeasureModel,
    measure_name: &str,
    count: fn(&str) -> f64,
) -> Result<()> {
    let registered: HashSet<&String> = model.get_memento_uri_list().iter().collect();

    for urit in model.get_timemap_uri_list() {
        let timemap = model.get_timemap(urit).await?;
        let mut baseline: Option<f64> = None;

        for entry in &timemap.mementos {
            if !registered.contains(&entry.urim) {
                continue;
            }
            let content = match model.get_memento_content_without_boilerplate(&entry.urim).await
            {
                Ok(content) => content,
                Err(CurateError::MementoError(_)) => {
                    debug!(urim = %entry.urim, "skipping error-recorded memento");
                    continue;
                }
                Err(e) => return Err(e),
            };

            let value = count(&content);
            let first = *baseline.get_or_insert(value);
            let score = if first == 0.0 { 0.0 } else { (value - first) / first };
            result.set_score(measure_name, &entry.urim, score);
        }
    }
    Ok(())
}

/// Relative byte-count change of boilerplate-free content across a TimeMap.
pub struct ByteCountMeasure;

#[async_trait]
impl Measure for ByteCountMeasure {
    fn name(&self) -> &str {
        "bytecount"
    }

    async fn score(
        &self,
        model: &CollectionModel,
        result: &mut MeasureModel,
        _topic_count: Option<usize>,
    ) -> Result<()> {
        score_relative_change(model, result, self.name(), |content| content.len() as f64).await
    }
}

/// Relative word-count change of boilerplate-free content across a TimeMap.
pub struct WordCountMeasure;

#[async_trait]
impl Measure for WordCountMeasure {
    fn name(&self) -> &str {
        "wordcount"
    }

    async fn score(
        &self,
        model: &CollectionModel,
        result: &mut MeasureModel,
        _topic_count: Option<usize>,
    ) -> Result<()> {
        score_relative_change(model, result, self.name(), |content| {
            content.split_whitespace().count() as f64
        })
        .await
    }
}
