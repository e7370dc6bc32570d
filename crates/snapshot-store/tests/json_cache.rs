use locus_core_types::{AriaRole, QueryKind, StructuredQuery};
use locus_snapshot_store::{DisabledCache, JsonFileCache, MemoryCache, QueryCache};
use tempfile::TempDir;

fn heading() -> StructuredQuery {
    StructuredQuery::role(AriaRole::Heading, Some("Example Domain"))
}

#[tokio::test]
async fn missing_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let cache = JsonFileCache::new(dir.path().join("absent.json"));
    assert!(cache.read().await.is_empty());
    assert_eq!(cache.label(), "absent");
}

#[tokio::test]
async fn write_creates_parent_directories_and_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("scope").join("default.json");
    let cache = JsonFileCache::new(&path);

    cache.write("the main heading", &heading()).await;
    assert!(path.exists());

    let entries = cache.read().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries.get("the main heading"), Some(&heading()));
    assert_eq!(cache.lookup("the main heading").await, Some(heading()));
    assert_eq!(cache.lookup("The Main Heading").await, None);
}

#[tokio::test]
async fn file_uses_query_name_wire_shape() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wire.json");
    let cache = JsonFileCache::new(&path);
    cache.write("the main heading", &heading()).await;

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({
            "the main heading": { "queryName": "getByRole", "params": ["heading", "Example Domain"] }
        })
    );
}

#[tokio::test]
async fn later_writes_overwrite_and_keep_other_entries() {
    let dir = TempDir::new().unwrap();
    let cache = JsonFileCache::new(dir.path().join("c.json"));
    let submit = StructuredQuery::role(AriaRole::Button, Some("Submit"));
    let label = StructuredQuery::new(QueryKind::Label, vec!["Email".into()]).unwrap();

    cache.write("the submit button", &submit).await;
    cache.write("email field", &label).await;
    let replacement = StructuredQuery::new(QueryKind::TestId, vec!["submit".into()]).unwrap();
    cache.write("the submit button", &replacement).await;

    let entries = cache.read().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries["the submit button"], replacement);
    assert_eq!(entries["email field"], label);
}

#[tokio::test]
async fn malformed_file_reads_as_empty_and_is_replaced_on_write() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let cache = JsonFileCache::new(&path);

    assert!(cache.read().await.is_empty());
    cache.write("the main heading", &heading()).await;
    assert_eq!(cache.read().await.len(), 1);
}

#[tokio::test]
async fn malformed_entries_are_skipped_individually() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mixed.json");
    std::fs::write(
        &path,
        r##"{
            "good": { "queryName": "getByText", "params": ["Sign in"] },
            "bad kind": { "queryName": "getByCss", "params": ["#x"] },
            "bad role": { "queryName": "getByRole", "params": ["div"] },
            "no params": { "queryName": "getByLabel", "params": [] },
            "not an object": 42
        }"##,
    )
    .unwrap();
    let cache = JsonFileCache::new(&path);

    let entries = cache.read().await;
    assert_eq!(entries.len(), 1);
    assert!(entries.contains_key("good"));
}

#[tokio::test]
async fn clear_removes_the_file_and_tolerates_absence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("clear.json");
    let cache = JsonFileCache::new(&path);
    cache.write("x", &heading()).await;
    assert!(path.exists());

    cache.clear().await.unwrap();
    assert!(!path.exists());
    cache.clear().await.unwrap();
}

#[tokio::test]
async fn unwritable_location_is_swallowed() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    std::fs::write(&blocker, "").unwrap();
    let cache = JsonFileCache::new(blocker.join("child.json"));

    cache.write("x", &heading()).await;
    assert!(cache.read().await.is_empty());
}

#[tokio::test]
async fn memory_and_disabled_caches() {
    let memory = MemoryCache::with_entries([("h", heading())]);
    assert_eq!(memory.lookup("h").await, Some(heading()));
    memory.write("b", &heading()).await;
    assert_eq!(memory.len(), 2);

    let disabled = DisabledCache;
    disabled.write("h", &heading()).await;
    assert!(disabled.read().await.is_empty());
    assert_eq!(disabled.lookup("h").await, None);
}

#[tokio::test]
async fn role_entries_read_back_in_canonical_form() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r#"{ "the main heading": { "queryName": "getByRole", "params": ["HEADING", "Example Domain"] } }"#,
    )
    .unwrap();
    let cache = JsonFileCache::new(&path);

    assert_eq!(cache.lookup("the main heading").await, Some(heading()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_never_corrupt_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("shared.json");
    let cache = JsonFileCache::new(&path);

    let mut previous = 0;
    for round in 0..20 {
        let writers: Vec<_> = (0..16)
            .map(|writer| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    let query =
                        StructuredQuery::new(QueryKind::Text, vec![format!("item {round}-{writer}")])
                            .unwrap();
                    cache.write(&format!("round {round} writer {writer}"), &query).await;
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        let raw = std::fs::read(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&raw).expect("cache file parses");
        let count = parsed.as_object().map(|map| map.len()).unwrap_or_default();
        assert!(
            count > previous,
            "round {round}: {count} entries after {previous}; earlier rounds were lost"
        );
        previous = count;
    }

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name != "shared.json")
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}
