use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use highlight_saver::{
    dom::{Document, DocumentPage, Element, HostPage, Rect, MARKER_CLASS},
    navigation::{Navigator, UrlOpener},
    CaptureOutcome, CollectionController, HighlightStore, HostEvent, MemoryStore, PromptStatus,
    PromptTimings, SelectionCapture, SettingsStore,
};

struct NoopOpener;

impl UrlOpener for NoopOpener {
    fn open_url(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}

fn page(url: &str, title: &str, text: &str) -> Arc<DocumentPage> {
    Arc::new(DocumentPage::new(
        url,
        title,
        Document::new(Element::new("body").with_child(Element::new("p").with_text(text))),
    ))
}

fn collection(store: &HighlightStore) -> CollectionController {
    CollectionController::new(store.clone(), Navigator::new(None, Arc::new(NoopOpener)))
}

async fn select_and_save(
    capture: &Arc<SelectionCapture>,
    page: &DocumentPage,
    needle: &str,
) -> CaptureOutcome {
    assert!(page.select_text(needle, Rect::new(0.0, 0.0, 10.0, 10.0)));
    capture.handle(HostEvent::SelectionEnd).await;
    capture.settled().await;
    capture.handle(HostEvent::PromptClick).await
}

#[tokio::test(start_paused = true)]
async fn confirmed_selection_shows_first_in_collection() {
    let backend = Arc::new(MemoryStore::new());
    let store = HighlightStore::new(backend);
    let page = page("https://a.test", "A", "well hello world again");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());

    let CaptureOutcome::Saved(saved) = select_and_save(&capture, &page, "hello world").await else {
        panic!("highlight was not saved");
    };
    assert_eq!(saved.highlight.text, "hello world");
    assert_eq!(saved.highlight.url, "https://a.test");
    assert_eq!(saved.highlight.page_title, "A");
    assert!(!capture.prompt().snapshot().await.is_visible());
    assert_eq!(page.document().elements_with_class(MARKER_CLASS).len(), 1);

    let view = collection(&store);
    let listed = view.load().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], saved.highlight);
}

#[tokio::test(start_paused = true)]
async fn every_confirm_grows_store_by_one_with_increasing_ids() {
    let store = HighlightStore::new(Arc::new(MemoryStore::new()));
    let page = page("https://a.test", "A", "one two three four");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());

    for (count, needle) in ["one", "two", "three"].into_iter().enumerate() {
        let before = store.load_highlights().await.unwrap().len();
        assert_eq!(before, count);
        assert!(matches!(
            select_and_save(&capture, &page, needle).await,
            CaptureOutcome::Saved(_)
        ));
        assert_eq!(store.load_highlights().await.unwrap().len(), before + 1);
    }

    let stored = store.load_highlights().await.unwrap();
    let ids: Vec<i64> = stored.iter().map(|h| h.id.parse().unwrap()).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test(start_paused = true)]
async fn delete_from_view_keeps_reverse_ordering() {
    let store = HighlightStore::new(Arc::new(MemoryStore::new()));
    let page = page("https://a.test", "A", "older newer");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());

    let CaptureOutcome::Saved(a) = select_and_save(&capture, &page, "older").await else {
        panic!("first save failed");
    };
    let CaptureOutcome::Saved(b) = select_and_save(&capture, &page, "newer").await else {
        panic!("second save failed");
    };

    let view = collection(&store);
    assert_eq!(view.load().await.unwrap(), vec![b.highlight.clone(), a.highlight.clone()]);

    assert!(view.delete(&a.highlight.id).await.unwrap());
    assert_eq!(store.load_highlights().await.unwrap(), vec![b.highlight.clone()]);
    assert_eq!(view.highlights().await, vec![b.highlight]);
}

#[tokio::test(start_paused = true)]
async fn store_failure_shows_error_then_returns_to_idle() {
    let backend = Arc::new(MemoryStore::new());
    let store = HighlightStore::new(backend.clone());
    let page = page("https://a.test", "A", "doomed text");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());

    backend.set_available(false);
    let outcome = select_and_save(&capture, &page, "doomed").await;
    assert!(matches!(outcome, CaptureOutcome::SaveFailed(_)));
    assert_eq!(capture.prompt().snapshot().await.status, PromptStatus::Failed);
    assert!(page.document().elements_with_class(MARKER_CLASS).is_empty());

    tokio::time::sleep(Duration::from_millis(2_001)).await;
    assert!(!capture.prompt().snapshot().await.is_visible());

    backend.set_available(true);
    assert!(store.load_highlights().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn summary_of_seven_lists_five_and_two_more() {
    let store = HighlightStore::new(Arc::new(MemoryStore::new()));
    let page = page("https://a.test", "A", "a b c d e f g");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());
    for needle in ["a", "b", "c", "d", "e", "f", "g"] {
        select_and_save(&capture, &page, needle).await;
    }

    let view = collection(&store);
    view.load().await.unwrap();
    let summary = view.summarize().await.unwrap();
    assert!(summary.starts_with("Summary of 7 highlights (7 words total):"));
    // newest first
    assert!(summary.contains("1. \"g\""));
    assert!(summary.contains("5. \"c\""));
    assert!(summary.ends_with("... and 2 more highlights."));
}

#[tokio::test(start_paused = true)]
async fn collection_delete_races_capture_save() {
    // Both surfaces rewrite the whole list; the later write wins.
    let store = HighlightStore::new(Arc::new(MemoryStore::new()));
    let page = page("https://a.test", "A", "first second");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());
    let CaptureOutcome::Saved(first) = select_and_save(&capture, &page, "first").await else {
        panic!("save failed");
    };

    let view = collection(&store);
    view.load().await.unwrap();

    select_and_save(&capture, &page, "second").await;
    assert_eq!(store.load_highlights().await.unwrap().len(), 2);

    view.delete(&first.highlight.id).await.unwrap();
    assert!(store.load_highlights().await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_backed_store_is_shared_between_contexts() {
    let dir = tempfile::tempdir().unwrap();
    let store = HighlightStore::open_sqlite(dir.path().join("highlights.sqlite3")).unwrap();
    let page = page("https://a.test", "", "persisted words");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());

    assert!(matches!(
        select_and_save(&capture, &page, "persisted").await,
        CaptureOutcome::Saved(_)
    ));

    let view = collection(&store);
    view.load().await.unwrap();
    let rows = view.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source, "Unknown Page");
    assert!(page.selection().is_none());
}

#[tokio::test(start_paused = true)]
async fn selection_end_from_the_prompt_click_does_not_reoffer_the_saved_text() {
    let backend = Arc::new(MemoryStore::new());
    backend.set_write_latency(Duration::from_millis(50));
    let store = HighlightStore::new(backend.clone());
    let page = page("https://a.test", "A", "hello world");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());

    assert!(page.select_text("hello world", Rect::new(0.0, 0.0, 10.0, 10.0)));
    capture.handle(HostEvent::SelectionEnd).await;
    capture.settled().await;

    let click = tokio::spawn({
        let capture = capture.clone();
        async move { capture.handle(HostEvent::PromptClick).await }
    });
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(capture.prompt().snapshot().await.status, PromptStatus::Saving);

    // the mouseup of the click itself, with the selection still live
    capture.handle(HostEvent::SelectionEnd).await;
    capture.settled().await;

    assert!(matches!(click.await.unwrap(), CaptureOutcome::Saved(_)));
    let snapshot = capture.prompt().snapshot().await;
    assert_eq!(snapshot.status, PromptStatus::Idle);
    assert_eq!(snapshot.selection_text, None);

    assert_eq!(capture.handle(HostEvent::PromptClick).await, CaptureOutcome::Ignored);
    assert_eq!(store.load_highlights().await.unwrap().len(), 1);
    assert_eq!(backend.write_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn save_outlasting_the_display_timeout_still_lands() {
    let backend = Arc::new(MemoryStore::new());
    backend.set_write_latency(Duration::from_secs(8));
    let store = HighlightStore::new(backend.clone());
    let page = page("https://a.test", "A", "slow network text");
    let capture = SelectionCapture::for_page(store.clone(), page.clone(), PromptTimings::default());

    assert!(page.select_text("slow network", Rect::new(0.0, 0.0, 10.0, 10.0)));
    capture.handle(HostEvent::SelectionEnd).await;
    capture.settled().await;

    let click = tokio::spawn({
        let capture = capture.clone();
        async move { capture.handle(HostEvent::PromptClick).await }
    });
    tokio::time::sleep(Duration::from_millis(5_001)).await;
    assert!(!capture.prompt().snapshot().await.is_visible());

    let CaptureOutcome::Saved(saved) = click.await.unwrap() else {
        panic!("slow save did not complete");
    };
    assert_eq!(saved.highlight.text, "slow network");
    assert!(!capture.prompt().snapshot().await.is_visible());
    assert_eq!(page.document().elements_with_class(MARKER_CLASS).len(), 1);
    assert_eq!(store.load_highlights().await.unwrap(), vec![saved.highlight]);
}

#[tokio::test(start_paused = true)]
async fn settings_file_drives_prompt_timeout_and_summary_length() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    std::fs::write(
        &settings_path,
        r#"{"prompt":{"display_timeout_ms":1000},"summary_preview_limit":2}"#,
    )
    .unwrap();
    let settings = SettingsStore::new(settings_path).unwrap();

    let store = HighlightStore::new(Arc::new(MemoryStore::new()));
    let page = page("https://a.test", "A", "a b c");
    let capture = SelectionCapture::with_settings(store.clone(), page.clone(), &settings);

    assert!(page.select_text("a", Rect::new(0.0, 0.0, 10.0, 10.0)));
    capture.handle(HostEvent::SelectionEnd).await;
    capture.settled().await;
    assert!(capture.prompt().snapshot().await.is_visible());
    tokio::time::sleep(Duration::from_millis(1_001)).await;
    assert!(!capture.prompt().snapshot().await.is_visible());

    for needle in ["a", "b", "c"] {
        select_and_save(&capture, &page, needle).await;
    }

    let navigator = Navigator::new(None, Arc::new(NoopOpener));
    let view = CollectionController::with_settings(store, navigator, &settings);
    view.load().await.unwrap();
    let summary = view.summarize().await.unwrap();
    assert!(summary.contains("2. \"b\""));
    assert!(!summary.contains("3. "));
    assert!(summary.ends_with("... and 1 more highlight."));
}
