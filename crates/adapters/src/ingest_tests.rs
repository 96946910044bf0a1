use super::*;

#[tokio::test]
async fn plain_text_ingest_splits_into_fixed_size_chunks() {
    let ingest = PlainTextIngest::new(4);
    let doc = ingest.ingest(b"Title\nabcdefgh", "text/plain").await.unwrap();
    assert_eq!(doc.title, "Title");
    assert_eq!(doc.chunks, vec!["Titl", "e\nab", "cdef", "gh"]);
}

#[tokio::test]
async fn plain_text_ingest_rejects_unsupported_mime() {
    let ingest = PlainTextIngest::new(100);
    let result = ingest.ingest(b"x", "application/pdf").await;
    assert!(matches!(result, Err(IngestError::UnsupportedMime(_))));
}

#[tokio::test]
async fn fake_ingest_returns_configured_chunks() {
    let fake = fake::FakeIngest::new("Fixture", vec!["a".to_string(), "b".to_string()]);
    let doc = fake.ingest(b"ignored", "text/plain").await.unwrap();
    assert_eq!(doc.chunks.len(), 2);
    assert_eq!(doc.title, "Fixture");
}
