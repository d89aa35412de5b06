pub mod measures;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::common::error::{CurateError, Result};
use crate::model::CollectionModel;

/// Which side of the threshold counts as on-topic for a measure's scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonDirection {
    GreaterThanOrEqual,
    GreaterThan,
    LessThanOrEqual,
    LessThan,
}

impl ComparisonDirection {
    pub fn on_topic(self, score: f64, threshold: f64) -> bool {
        match self {
            ComparisonDirection::GreaterThanOrEqual => score >= threshold,
            ComparisonDirection::GreaterThan => score > threshold,
            ComparisonDirection::LessThanOrEqual => score <= threshold,
            ComparisonDirection::LessThan => score < threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicStatus {
    OnTopic,
    OffTopic,
}

/// Running classification state for one `detect_off_topic` invocation:
/// per-measure raw scores, per-measure verdicts, and the aggregated overall
/// verdict per URI-M. Recomputed from scratch each run, never persisted.
#[derive(Debug, Default)]
pub struct MeasureModel {
    scores: HashMap<String, HashMap<String, f64>>,
    verdicts: HashMap<String, HashMap<String, TopicStatus>>,
    overall: HashMap<String, TopicStatus>,
}

impl MeasureModel {
    pub fn set_score(&mut self, measure: &str, urim: &str, score: f64) {
        self.scores
            .entry(measure.to_string())
            .or_default()
            .insert(urim.to_string(), score);
    }

    pub fn score(&self, measure: &str, urim: &str) -> Option<f64> {
        self.scores.get(measure)?.get(urim).copied()
    }

    /// Thresholds one measure's scores into per-URI-M verdicts.
    pub fn apply_threshold(
        &mut self,
        measure: &str,
        threshold: f64,
        direction: ComparisonDirection,
    ) {
        let Some(scores) = self.scores.get(measure) else {
            return;
        };
        for (urim, score) in scores {
            let status = if direction.on_topic(*score, threshold) {
                TopicStatus::OnTopic
            } else {
                TopicStatus::OffTopic
            };
            self.verdicts
                .entry(urim.clone())
                .or_default()
                .insert(measure.to_string(), status);
        }
    }

    /// A URI-M is on-topic only if every measure judged it on-topic.
    pub fn calculate_overall_status(&mut self) {
        for (urim, per_measure) in &self.verdicts {
            let status = if per_measure.values().all(|s| *s == TopicStatus::OnTopic) {
                TopicStatus::OnTopic
            } else {
                TopicStatus::OffTopic
            };
            self.overall.insert(urim.clone(), status);
        }
    }

    pub fn overall_status(&self, urim: &str) -> Option<TopicStatus> {
        self.overall.get(urim).copied()
    }
}

/// A pluggable relevance-scoring function run over the whole collection.
#[async_trait]
pub trait Measure: Send + Sync {
    fn name(&self) -> &str;

    /// Writes per-URI-M scores into `result` under [`Self::name`].
    /// `topic_count` only matters to topic-model measures; others ignore it.
    async fn score(
        &self,
        model: &CollectionModel,
        result: &mut MeasureModel,
        topic_count: Option<usize>,
    ) -> Result<()>;
}

/// A measure plus its published classification defaults.
#[derive(Clone)]
pub struct MeasureDefinition {
    pub measure: Arc<dyn Measure>,
    pub direction: ComparisonDirection,
    pub default_threshold: Option<f64>,
    pub default_topic_count: Option<usize>,
}

/// Explicit measure registry passed into each classification run, replacing
/// any notion of process-global measure state.
#[derive(Default, Clone)]
pub struct MeasureCatalog {
    definitions: HashMap<String, MeasureDefinition>,
}

impl MeasureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog preloaded with the built-in TimeMap measures.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(MeasureDefinition {
            measure: Arc::new(measures::ByteCountMeasure),
            direction: ComparisonDirection::GreaterThanOrEqual,
            default_threshold: Some(measures::DEFAULT_BYTECOUNT_THRESHOLD),
            default_topic_count: None,
        });
        catalog.register(MeasureDefinition {
            measure: Arc::new(measures::WordCountMeasure),
            direction: ComparisonDirection::GreaterThanOrEqual,
            default_threshold: Some(measures::DEFAULT_WORDCOUNT_THRESHOLD),
            default_topic_count: None,
        });
        catalog
    }

    pub fn register(&mut self, definition: MeasureDefinition) {
        self.definitions
            .insert(definition.measure.name().to_string(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&MeasureDefinition> {
        self.definitions.get(name)
    }
}

/// Runs the requested measures over the collection, thresholds each one with
/// its registered comparison direction, aggregates with logical AND, and
/// returns the on-topic URI-Ms ordered TimeMap-by-TimeMap.
///
/// URI-Ms that end the run without an overall verdict (a measure skipped or
/// never scored them) are logged and excluded: fail closed, never default to
/// on-topic. Measure errors are not caught here and abort the run.
pub async fn detect_off_topic(
    model: &CollectionModel,
    catalog: &MeasureCatalog,
    requested: &[(String, f64)],
    topic_count: Option<usize>,
) -> Result<Vec<String>> {
    let mut result = MeasureModel::default();

    for (name, threshold) in requested {
        let definition = catalog
            .get(name)
            .ok_or_else(|| CurateError::Config(format!("unknown measure: {name}")))?;

        info!(measure = %name, threshold, "scoring mementos with TimeMap measure");
        let topics = topic_count.or(definition.default_topic_count);
        definition.measure.score(model, &mut result, topics).await?;
        result.apply_threshold(name, *threshold, definition.direction);
    }

    result.calculate_overall_status();
    collect_ontopic(model, &result).await
}

async fn collect_ontopic(model: &CollectionModel, result: &MeasureModel) -> Result<Vec<String>> {
    let mut ontopic = Vec::new();
    for urit in model.get_timemap_uri_list() {
        let timemap = model.get_timemap(urit).await?;
        for entry in &timemap.mementos {
            match result.overall_status(&entry.urim) {
                Some(TopicStatus::OnTopic) => ontopic.push(entry.urim.clone()),
                Some(TopicStatus::OffTopic) => {}
                None => {
                    warn!(urim = %entry.urim, "no overall topic status, excluding URI-M");
                }
            }
        }
    }
    Ok(ontopic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict_for(scores: (f64, f64)) -> Option<TopicStatus> {
        let mut result = MeasureModel::default();
        result.set_score("m1", "urim", scores.0);
        result.set_score("m2", "urim", scores.1);
        result.apply_threshold("m1", 0.5, ComparisonDirection::GreaterThanOrEqual);
        result.apply_threshold("m2", 0.3, ComparisonDirection::LessThanOrEqual);
        result.calculate_overall_status();
        result.overall_status("urim")
    }

    #[test]
    fn passing_every_measure_is_on_topic() {
        assert_eq!(verdict_for((0.6, 0.2)), Some(TopicStatus::OnTopic));
    }

    #[test]
    fn one_failing_measure_is_off_topic() {
        assert_eq!(verdict_for((0.4, 0.2)), Some(TopicStatus::OffTopic));
        assert_eq!(verdict_for((0.6, 0.5)), Some(TopicStatus::OffTopic));
    }

    #[test]
    fn unscored_urims_have_no_overall_status() {
        let mut result = MeasureModel::default();
        result.set_score("m1", "scored", 1.0);
        result.apply_threshold("m1", 0.5, ComparisonDirection::GreaterThanOrEqual);
        result.calculate_overall_status();
        assert_eq!(result.overall_status("never-scored"), None);
    }

    #[test]
    fn comparison_directions_match_their_names() {
        use ComparisonDirection::*;
        assert!(GreaterThanOrEqual.on_topic(0.5, 0.5));
        assert!(!GreaterThan.on_topic(0.5, 0.5));
        assert!(LessThanOrEqual.on_topic(0.5, 0.5));
        assert!(!LessThan.on_topic(0.5, 0.5));
        assert!(LessThan.on_topic(-0.8, -0.65));
    }
}
