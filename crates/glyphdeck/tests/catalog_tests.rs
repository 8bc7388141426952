//! Catalog build and search filter scenarios.

mod common;

use common::{FakeSource, SAMPLE, ids, names, registry};
use glyphdeck::icons::{CacheError, CodepointCache, IconCatalog, filter};
use tempfile::TempDir;

const SHARP: &str = "add e145\nhome e88a\nsettings_power e8c6\n";

#[test]
fn test_empty_cache_fetch_then_filter() {
    let dir = TempDir::new().unwrap();
    let outlined = FakeSource::new("material-outlined", SAMPLE);
    let registry = registry(&[outlined.clone()]);
    let cache = CodepointCache::new(dir.path());
    let enabled = ids(&["material-outlined"]);

    let build = IconCatalog::build(&registry, &enabled, |s| cache.load(s));
    assert!(!build.is_partial());
    assert_eq!(outlined.fetch_count(), 1);

    let all = filter(&build.catalog, "", &enabled);
    assert_eq!(names(&all), ["home", "search", "settings"]);

    let se = filter(&build.catalog, "se", &enabled);
    assert_eq!(names(&se), ["search", "settings"]);

    let group = build.catalog.group("material-outlined").unwrap();
    assert_eq!(group.style_label, "Outlined");
    assert_eq!(group.label, "Test Symbols Outlined");
}

#[test]
fn test_filter_respects_enabled_set_over_catalog() {
    let dir = TempDir::new().unwrap();
    let outlined = FakeSource::new("material-outlined", SAMPLE);
    let sharp = FakeSource::new("material-sharp", SHARP);
    let registry = registry(&[outlined, sharp]);
    let cache = CodepointCache::new(dir.path());

    let both = ids(&["material-outlined", "material-sharp"]);
    let catalog = IconCatalog::build(&registry, &both, |s| cache.load(s)).catalog;
    assert_eq!(catalog.groups().len(), 2);

    let only_sharp = ids(&["material-sharp"]);
    let rows = filter(&catalog, "", &only_sharp);
    assert_eq!(names(&rows), ["add", "home", "settings_power"]);
    assert!(rows.iter().all(|e| e.source().as_str() == "material-sharp"));

    assert!(filter(&catalog, "", &ids(&[])).is_empty());
}

#[test]
fn test_results_follow_registration_order() {
    let dir = TempDir::new().unwrap();
    // Registered sharp first, so its rows come first
    let registry = registry(&[
        FakeSource::new("material-sharp", SHARP),
        FakeSource::new("material-outlined", SAMPLE),
    ]);
    let cache = CodepointCache::new(dir.path());
    let enabled = ids(&["material-outlined", "material-sharp"]);
    let catalog = IconCatalog::build(&registry, &enabled, |s| cache.load(s)).catalog;

    let rows = filter(&catalog, "HOME", &enabled);
    let sources: Vec<_> = rows.iter().map(|e| e.source().as_str()).collect();
    assert_eq!(sources, ["material-sharp", "material-outlined"]);

    let settings = filter(&catalog, "  settings ", &enabled);
    assert_eq!(names(&settings), ["settings_power", "settings"]);
}

#[test]
fn test_one_failing_source_yields_partial_catalog() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&[
        FakeSource::new("material-outlined", SAMPLE),
        FakeSource::failing("material-sharp"),
    ]);
    let cache = CodepointCache::new(dir.path());
    let enabled = ids(&["material-outlined", "material-sharp"]);

    let build = IconCatalog::build(&registry, &enabled, |s| cache.load(s));
    assert!(build.is_partial());
    assert_eq!(build.catalog.groups().len(), 1);
    assert_eq!(build.catalog.len(), 3);
    assert_eq!(build.skipped.len(), 1);
    assert_eq!(build.skipped[0].source.as_str(), "material-sharp");
    assert!(matches!(build.skipped[0].error, CacheError::Fetch { .. }));
}

#[test]
fn test_build_is_deterministic() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&[
        FakeSource::new("material-outlined", SAMPLE),
        FakeSource::new("material-sharp", SHARP),
    ]);
    let enabled = ids(&["material-sharp", "material-outlined"]);

    let first = IconCatalog::build(&registry, &enabled, |s| CodepointCache::new(dir.path()).load(s));
    let second = IconCatalog::build(&registry, &enabled, |s| CodepointCache::new(dir.path()).load(s));
    assert_eq!(first.catalog.entry_ids(), second.catalog.entry_ids());
    assert_eq!(first.catalog, second.catalog);
}

#[test]
fn test_unknown_enabled_ids_are_ignored() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&[FakeSource::new("material-outlined", SAMPLE)]);
    let cache = CodepointCache::new(dir.path());
    let enabled = ids(&["material-outlined", "retired-set"]);

    let build = IconCatalog::build(&registry, &enabled, |s| cache.load(s));
    assert!(!build.is_partial());
    assert_eq!(build.catalog.len(), 3);
}

#[test]
fn test_filter_properties_hold_for_every_query() {
    let dir = TempDir::new().unwrap();
    let registry = registry(&[
        FakeSource::new("material-outlined", SAMPLE),
        FakeSource::new("material-sharp", SHARP),
    ]);
    let cache = CodepointCache::new(dir.path());
    let all = ids(&["material-outlined", "material-sharp"]);
    let catalog = IconCatalog::build(&registry, &all, |s| cache.load(s)).catalog;
    let enabled = ids(&["material-outlined"]);

    for query in ["", "e", "SET", "tings p", "xyz", " home "] {
        let needle = query.trim().to_lowercase();
        for entry in filter(&catalog, query, &enabled) {
            assert!(entry.display_name().to_lowercase().contains(&needle));
            assert!(enabled.contains(entry.source()));
        }
    }
}
