use std::sync::Arc;
use workbridge_core::error::Result;
use workbridge_core::mention::{MentionInput, Rect};
use workbridge_core::project::{CacheOptions, DirectoryLister, FileCache};

struct StaticTree;

#[async_trait::async_trait]
impl DirectoryLister for StaticTree {
    async fn list(&self, _session_id: &str, dir: &str) -> Result<Vec<String>> {
        let names: &[&str] = match dir {
            "" => &["Cargo.toml", "src/"],
            "src" => &["main.rs", "lib.rs"],
            _ => &[],
        };
        Ok(names.iter().map(|n| n.to_string()).collect())
    }
}

#[tokio::test]
async fn test_typing_mention_filters_cache_and_commits_path() {
    let cache = FileCache::new("s1", Arc::new(StaticTree), CacheOptions::default());
    cache.load(false).await;

    let mut input = MentionInput::new();
    input.set_container(Some(Rect {
        x: 0.0,
        y: 100.0,
        width: 400.0,
        height: 60.0,
    }));
    input.update("please check @mai", 17);

    let trigger = input.trigger();
    assert!(trigger.is_visible);
    assert_eq!(trigger.query, "mai");
    assert_eq!(trigger.trigger_index, 13);
    assert_eq!(trigger.position.x, 200.0);
    assert_eq!(trigger.position.y, 100.0);

    let suggestions = input.suggestions(&cache, Some(5));
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].path, "src/main.rs");

    assert!(input.select(&suggestions[0].path));
    assert_eq!(input.text(), "please check @src/main.rs");
    assert!(!input.trigger().is_visible);
    cache.shutdown();
}

#[tokio::test]
async fn test_no_suggestions_when_trigger_hidden() {
    let cache = FileCache::new("s1", Arc::new(StaticTree), CacheOptions::default());
    cache.load(false).await;

    let mut input = MentionInput::new();
    input.update("user@example.com", 16);
    assert!(input.suggestions(&cache, None).is_empty());

    input.update("@", 1);
    assert_eq!(input.suggestions(&cache, None).len(), 3);
    cache.shutdown();
}
