//! End-to-end content extraction against the mock backend and an in-memory sink.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use luthier_core::{
    IdentifyPhaseResponse, PersistableRecord, Provenance, RecordSink, Result, SourceType,
};
use luthier_inference::mock::MockInferenceBackend;
use luthier_pipeline::{compose_source, ContentPipeline, ContentPipelineConfig};
use uuid::Uuid;

#[derive(Default)]
struct MemorySink {
    records: Mutex<Vec<PersistableRecord>>,
}

impl MemorySink {
    fn records(&self) -> Vec<PersistableRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn insert(&self, record: &PersistableRecord) -> Result<Uuid> {
        self.records.lock().unwrap().push(record.clone());
        Ok(Uuid::now_v7())
    }
}

const JEM_TEXT: &str =
    "My 1987 Ibanez JEM7, nicknamed 'Junior', has been with me since I was 17.";

const JEM_IDENTIFY_REPLY: &str = r#"```json
{
  "guitars": [
    {
      "brand": "Ibanez",
      "model": "JEM7",
      "year": "1987",
      "year_range": "",
      "serial_number": "",
      "finish": "",
      "category": "electric",
      "production_status": "discontinued",
      "context": "My 1987 Ibanez JEM7, nicknamed 'Junior', has been with me since I was 17.",
      "_famous_owner": "",
      "_nickname": "Junior",
      "_notable_events": [],
      "_ownership_history": ["Owned since the author was 17"],
      "_modification_history": []
    }
  ],
  "source_type": "user_text",
  "original_text": "My 1987 Ibanez JEM7, nicknamed 'Junior', has been with me since I was 17.",
  "summary": "A player's long-held Ibanez JEM7"
}
```"#;

const JEM_ENRICH_REPLY: &str = r#"Here is the enrichment:
{
  "body_style": "superstrat",
  "instrument_type": "electric guitar",
  "finish": "White",
  "finish_options": ["White", "Loch Ness Green", "White"],
  "specifications": {
    "frets": {"value": 24, "provenance": "inferred", "confidence": 0.8},
    "bridge": "Edge tremolo",
    "year": 1987,
    "_confidence": {"bridge": "medium"},
    "_spec_sources": {"bridge": ["Ibanez 1987 catalog"]}
  },
  "story": "A short story.",
  "_images": [],
  "extraction_confidence": "high",
  "fields_requiring_verification": []
}
Let me know if you need more."#;

fn pipeline(backend: MockInferenceBackend, sink: Arc<MemorySink>) -> ContentPipeline {
    ContentPipeline::new(Arc::new(backend), sink, ContentPipelineConfig::default())
}

#[tokio::test]
async fn test_jem7_end_to_end() {
    let backend = MockInferenceBackend::new()
        .with_response_mapping("Extract all guitars", JEM_IDENTIFY_REPLY)
        .with_response_mapping("Model: JEM7", JEM_ENRICH_REPLY);
    let sink = Arc::new(MemorySink::default());
    let pipeline = pipeline(backend.clone(), sink.clone());

    let source = compose_source(Some(JEM_TEXT), None).unwrap();

    let identified = pipeline.identify(&source).await.unwrap();
    assert_eq!(identified.guitars.len(), 1);
    let jem = &identified.guitars[0];
    assert_eq!(jem.brand, "Ibanez");
    assert!(jem.model.contains("JEM7"));
    assert_eq!(jem.year, Some(1987));
    assert_eq!(jem.nickname.as_deref(), Some("Junior"));
    assert_eq!(jem.context, JEM_TEXT);
    assert_eq!(identified.source_type, Some(SourceType::UserText));

    let outcome = pipeline.enrich_and_persist(&identified.guitars, &source).await;
    assert_eq!(outcome.inserted, 1);
    assert!(outcome.failed.is_empty());

    let stored = sink.records();
    assert_eq!(stored.len(), 1);
    let record = &stored[0];
    assert_eq!(record.dedup_fingerprint, "ibanez|jem7|1987");
    assert_eq!(record.source, "content_extraction");
    assert_eq!(record.nickname.as_deref(), Some("Junior"));
    assert_eq!(record.finish.as_deref(), Some("White"));
    assert_eq!(record.finish_options.len(), 2);

    // Stated in the text.
    assert_eq!(record.specifications["year"].provenance, Provenance::Observed);
    assert_eq!(record.specifications["year"].confidence, 0.9);
    // Explicitly inferred, with its own confidence.
    assert_eq!(record.specifications["frets"].provenance, Provenance::Inferred);
    assert_eq!(record.specifications["frets"].confidence, 0.8);
    // Inferred, confidence from `_confidence`, source from `_spec_sources`.
    let bridge = &record.specifications["bridge"];
    assert_eq!(bridge.provenance, Provenance::Inferred);
    assert_eq!(bridge.confidence, 0.6);
    assert_eq!(bridge.sources, vec!["Ibanez 1987 catalog"]);

    // A four-word story is outside the accepted length.
    assert!(record
        .fields_requiring_verification
        .contains(&"story".to_string()));

    assert_eq!(outcome.guitars[0], *record);
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_failing_second_of_three_still_inserts_two() {
    let identify_reply = r#"{"guitars": [
        {"brand": "Fender", "model": "Telecaster", "year": 1952, "context": "a"},
        {"brand": "Gibson", "model": "Broken", "year": 1959, "context": "b"},
        {"brand": "Gretsch", "model": "White Falcon", "year_range": "1955-1960", "context": "c"}
    ], "source_type": "article", "summary": "three guitars"}"#;
    let enrich_reply = r#"{"body_style": "solid", "specifications": {}, "story": ""}"#;

    let backend = MockInferenceBackend::new()
        .with_response_mapping("Extract all guitars", identify_reply)
        .with_failure_mapping("Model: Broken", "Anthropic returned 529: Overloaded")
        .with_fixed_response(enrich_reply);
    let sink = Arc::new(MemorySink::default());
    let pipeline = pipeline(backend, sink.clone());

    let outcome = pipeline.run_full("An article about three guitars").await.unwrap();

    assert_eq!(outcome.inserted, 2);
    let models: Vec<&str> = outcome.guitars.iter().map(|g| g.model.as_str()).collect();
    assert_eq!(models, vec!["Telecaster", "White Falcon"]);
    assert_eq!(outcome.guitars[1].dedup_fingerprint, "gretsch|white falcon|1955-1960");

    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].index, 1);
    assert_eq!(outcome.failed[0].brand, "Gibson");
    assert!(outcome.failed[0].error.contains("Overloaded"));

    assert_eq!(sink.records().len(), 2);
}

#[tokio::test]
async fn test_unparseable_enrichment_isolated() {
    let backend = MockInferenceBackend::new()
        .with_response_mapping("Model: Prose", "I could not find any specifications.")
        .with_fixed_response(r#"{"body_style": "hollow"}"#);
    let sink = Arc::new(MemorySink::default());
    let pipeline = pipeline(backend, sink.clone());

    let identities: Vec<_> = ["Prose", "Fine"]
        .iter()
        .map(|m| luthier_core::InstrumentIdentity {
            brand: "Epiphone".to_string(),
            model: m.to_string(),
            ..Default::default()
        })
        .collect();

    let outcome = pipeline.enrich_and_persist(&identities, "").await;
    assert_eq!(outcome.inserted, 1);
    assert_eq!(outcome.guitars[0].dedup_fingerprint, "epiphone|fine|unknown");
    assert!(outcome.failed[0].error.contains("Unparseable"));
}

#[tokio::test]
async fn test_no_guitars_is_not_an_error() {
    let backend = MockInferenceBackend::new().with_fixed_response(r#"{"guitars": []}"#);
    let pipeline = pipeline(backend, Arc::new(MemorySink::default()));

    let identified = pipeline.identify("The weather was nice today.").await.unwrap();
    assert!(identified.guitars.is_empty());
    assert_eq!(identified.error, None);
}

#[tokio::test]
async fn test_no_guitars_reason_surfaced() {
    let backend = MockInferenceBackend::new()
        .with_fixed_response(r#"{"guitars":[],"error":"The text mentions a piano, not a guitar"}"#);
    let sink = Arc::new(MemorySink::default());
    let pipeline = pipeline(backend, sink.clone());

    let identified: IdentifyPhaseResponse = pipeline.identify("My old upright piano").await.unwrap();
    assert!(identified.guitars.is_empty());
    assert_eq!(
        identified.error.as_deref(),
        Some("The text mentions a piano, not a guitar")
    );

    let outcome = pipeline.run_full("My old upright piano").await.unwrap();
    assert_eq!(outcome.inserted, 0);
    assert!(sink.records().is_empty());
}

#[tokio::test]
async fn test_unparseable_identify_is_fatal() {
    let backend = MockInferenceBackend::new().with_fixed_response("No guitars here, sorry!");
    let pipeline = pipeline(backend, Arc::new(MemorySink::default()));

    let err = pipeline.identify("text").await.unwrap_err();
    assert!(err.is_unparseable());
}
