mod common;

use async_trait::async_trait;
use std::sync::Arc;

use memento_curator::common::error::{CurateError, Result};
use memento_curator::model::CollectionModel;
use memento_curator::pipeline::classify::{
    detect_off_topic, ComparisonDirection, Measure, MeasureCatalog, MeasureDefinition,
    MeasureModel,
};
use memento_curator::pipeline::ingestion::add_many_mementos;

use common::{harness, plain_response, seed_memento, Harness};

const URIT: &str = "https://archive.example.org/timemap/link/http://site.test/page";
const M1: &str = "https://archive.example.org/web/20200106000000/http://site.test/page";
const M2: &str = "https://archive.example.org/web/20200601000000/http://site.test/page";
const M3: &str = "https://archive.example.org/web/20210601000000/http://site.test/page";
const M4: &str = "https://archive.example.org/web/20210701000000/http://site.test/page";

fn paragraph_of(words: usize) -> String {
    let body = vec!["topic"; words].join(" ");
    format!("<html><body><p>{body}</p></body></html>")
}

/// TimeMap with three live captures and one dead link; the third capture has
/// collapsed to a single word.
async fn curated_collection() -> Harness {
    let mut h = harness();
    let body = format!(
        "<http://site.test/page>; rel=\"original\",\n\
         <{M1}>; rel=\"first memento\"; datetime=\"Mon, 06 Jan 2020 00:00:00 GMT\",\n\
         <{M2}>; rel=\"memento\"; datetime=\"Mon, 01 Jun 2020 00:00:00 GMT\",\n\
         <{M3}>; rel=\"memento\"; datetime=\"Tue, 01 Jun 2021 00:00:00 GMT\",\n\
         <{M4}>; rel=\"last memento\"; datetime=\"Thu, 01 Jul 2021 00:00:00 GMT\""
    );
    h.fetch.insert(URIT, plain_response(&body));
    seed_memento(&h.fetch, M1, "Mon, 06 Jan 2020 00:00:00 GMT", &paragraph_of(20));
    seed_memento(&h.fetch, M2, "Mon, 01 Jun 2020 00:00:00 GMT", &paragraph_of(18));
    seed_memento(&h.fetch, M3, "Tue, 01 Jun 2021 00:00:00 GMT", &paragraph_of(1));
    // M4 is never seeded and fails ingestion.

    h.model.add_timemap(URIT).await.unwrap();
    let timemap = h.model.get_timemap(URIT).await.unwrap();
    let urims: Vec<String> = timemap.mementos.iter().map(|m| m.urim.clone()).collect();
    add_many_mementos(&mut h.model, &urims).await.unwrap();
    h
}

#[tokio::test]
async fn collapsed_captures_are_classified_off_topic() {
    let h = curated_collection().await;
    let catalog = MeasureCatalog::builtin();
    let requested = vec![
        ("bytecount".to_string(), -0.65),
        ("wordcount".to_string(), -0.70),
    ];

    let ontopic = detect_off_topic(&h.model, &catalog, &requested, None)
        .await
        .unwrap();

    // M3 shrank ~95% relative to the first capture; M4 never ingested and is
    // excluded fail-closed. Output preserves TimeMap order.
    assert_eq!(ontopic, vec![M1.to_string(), M2.to_string()]);
}

#[tokio::test]
async fn a_single_failing_measure_marks_the_memento_off_topic() {
    let h = curated_collection().await;

    // Tighten only the bytecount threshold so M2's mild shrink now fails it
    // while wordcount still passes.
    let catalog = MeasureCatalog::builtin();
    let requested = vec![
        ("bytecount".to_string(), -0.05),
        ("wordcount".to_string(), -0.70),
    ];

    let ontopic = detect_off_topic(&h.model, &catalog, &requested, None)
        .await
        .unwrap();
    assert_eq!(ontopic, vec![M1.to_string()]);
}

#[tokio::test]
async fn unknown_measures_are_a_configuration_error() {
    let h = curated_collection().await;
    let catalog = MeasureCatalog::builtin();
    let requested = vec![("gensim_lda".to_string(), 0.5)];

    assert!(matches!(
        detect_off_topic(&h.model, &catalog, &requested, None).await,
        Err(CurateError::Config(_))
    ));
}

#[tokio::test]
async fn topic_count_defaults_come_from_the_catalog() {
    struct TopicCountProbe;

    #[async_trait]
    impl Measure for TopicCountProbe {
        fn name(&self) -> &str {
            "topic_probe"
        }

        async fn score(
            &self,
            model: &CollectionModel,
            result: &mut MeasureModel,
            topic_count: Option<usize>,
        ) -> Result<()> {
            assert_eq!(topic_count, Some(25));
            for urim in model.get_memento_uri_list() {
                result.set_score(self.name(), urim, 1.0);
            }
            Ok(())
        }
    }

    let h = curated_collection().await;
    let mut catalog = MeasureCatalog::new();
    catalog.register(MeasureDefinition {
        measure: Arc::new(TopicCountProbe),
        direction: ComparisonDirection::GreaterThanOrEqual,
        default_threshold: Some(0.5),
        default_topic_count: Some(25),
    });

    let requested = vec![("topic_probe".to_string(), 0.5)];
    let ontopic = detect_off_topic(&h.model, &catalog, &requested, None)
        .await
        .unwrap();
    assert_eq!(ontopic.len(), 3);
}
