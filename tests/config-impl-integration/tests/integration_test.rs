//! Centralized integration tests for config-impl crate
use config_abstractions::{
    ConfigPackage, ConfigPackageListener, DocumentChangedEvent, FnDocumentListener,
    FnSectionListener, SectionChangedEvent,
};
use config_common::{ConfigSections, ListenerError, ParameterSection};
use config_impl::{
    ConfigSnapshotStore, Fingerprint, PackageEventRouter, RemovalPolicy, SnapshotStoreOptions,
    StoreState, TypedValueAccessor,
};
use parking_lot::Mutex;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// 测试配置文档
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct ServiceSettings {
    generation: u64,
    #[serde(default)]
    endpoint: String,
}

fn document_content(generation: u64, endpoint: &str) -> String {
    format!(r#"{{"generation":{generation},"endpoint":"{endpoint}"}}"#)
}

fn write_document(dir: &Path, generation: u64, endpoint: &str) -> String {
    let content = document_content(generation, endpoint);
    std::fs::write(dir.join("Service.json"), &content).unwrap();
    content
}

fn sections(port: &str) -> ConfigSections {
    ConfigSections::new().with_section(
        "Service",
        ParameterSection::new()
            .with_plain("Port", port)
            .with_plain("Timeout", "not-a-duration"),
    )
}

/// 记录事件的存储
struct Observed {
    store: Arc<ConfigSnapshotStore<ServiceSettings>>,
    section_events: Arc<AtomicUsize>,
    document_events: Arc<Mutex<Vec<(Option<u64>, Option<u64>)>>>,
}

fn observed_store(policy: RemovalPolicy) -> Observed {
    let options = SnapshotStoreOptions::from_service_address("fabric:/App/Service")
        .unwrap()
        .with_removal_policy(policy);
    let store = Arc::new(ConfigSnapshotStore::<ServiceSettings>::new(options).unwrap());

    let section_events = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&section_events);
    store.register_section_listener(Arc::new(FnSectionListener::new(
        "counter",
        move |_: &SectionChangedEvent| -> Result<(), ListenerError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    )));

    let document_events = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&document_events);
    store.register_document_listener(Arc::new(FnDocumentListener::new(
        "recorder",
        move |event: &DocumentChangedEvent<ServiceSettings>| -> Result<(), ListenerError> {
            log.lock().push((
                event.previous.as_ref().map(|s| s.generation),
                event.current.as_ref().map(|s| s.generation),
            ));
            Ok(())
        },
    )));

    Observed {
        store,
        section_events,
        document_events,
    }
}

#[tokio::test]
async fn test_package_lifecycle_through_router() {
    let dir = tempfile::tempdir().unwrap();
    let observed = observed_store(RemovalPolicy::Reload);
    let router = PackageEventRouter::new(Arc::clone(&observed.store));

    write_document(dir.path(), 1, "http://a");
    let first = ConfigPackage::new(dir.path(), sections("8080")).with_version("1");
    router.on_package_added(first.clone()).await.unwrap();

    assert_eq!(observed.store.state(), StoreState::Loaded);
    assert_eq!(observed.store.get_i32("Port", 0), 8080);
    assert_eq!(observed.section_events.load(Ordering::SeqCst), 1);
    assert_eq!(*observed.document_events.lock(), vec![(None, Some(1))]);

    // 相同内容再次投递不触发事件
    router
        .on_package_modified(first.clone(), first.clone())
        .await
        .unwrap();
    assert_eq!(observed.section_events.load(Ordering::SeqCst), 1);
    assert_eq!(observed.document_events.lock().len(), 1);

    write_document(dir.path(), 2, "http://a");
    let second = ConfigPackage::new(dir.path(), sections("9090")).with_version("2");
    router
        .on_package_modified(first, second.clone())
        .await
        .unwrap();

    assert_eq!(observed.store.get_i32("Port", 0), 9090);
    assert_eq!(observed.section_events.load(Ordering::SeqCst), 2);
    assert_eq!(
        *observed.document_events.lock(),
        vec![(None, Some(1)), (Some(1), Some(2))]
    );

    router.on_package_removed(second).await.unwrap();
    assert_eq!(observed.store.state(), StoreState::Loaded);
    assert_eq!(observed.document_events.lock().len(), 2);
}

#[tokio::test]
async fn test_clear_policy_then_reload_counts_as_change() {
    let dir = tempfile::tempdir().unwrap();
    let observed = observed_store(RemovalPolicy::Clear);
    let router = PackageEventRouter::new(Arc::clone(&observed.store));

    write_document(dir.path(), 1, "http://a");
    let package = ConfigPackage::new(dir.path(), sections("8080"));
    router.on_package_added(package.clone()).await.unwrap();
    router.on_package_removed(package.clone()).await.unwrap();

    assert_eq!(observed.store.state(), StoreState::Empty);
    assert_eq!(observed.store.get_i32("Port", 0), 0);
    assert_eq!(observed.section_events.load(Ordering::SeqCst), 2);

    router.on_package_added(package).await.unwrap();
    assert_eq!(observed.store.state(), StoreState::Loaded);
    assert_eq!(
        *observed.document_events.lock(),
        vec![(None, Some(1)), (Some(1), None), (None, Some(1))]
    );
}

#[test]
fn test_single_character_change_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let observed = observed_store(RemovalPolicy::Reload);

    write_document(dir.path(), 7, "http://a");
    observed.store.load(dir.path(), &ConfigSections::new()).unwrap();
    write_document(dir.path(), 7, "http://b");
    let outcome = observed.store.load(dir.path(), &ConfigSections::new()).unwrap();

    assert!(outcome.document_changed);
    assert!(!outcome.section_changed);
    assert_eq!(observed.store.document().unwrap().endpoint, "http://b");
    assert_eq!(observed.document_events.lock().len(), 2);
}

#[test]
fn test_missing_document_is_not_a_change() {
    let dir = tempfile::tempdir().unwrap();
    let observed = observed_store(RemovalPolicy::Reload);

    let outcome = observed.store.load(dir.path(), &sections("8080")).unwrap();
    assert!(outcome.section_changed);
    assert!(!outcome.document_changed);
    assert_eq!(observed.store.state(), StoreState::PartiallyLoaded);
    assert!(observed.document_events.lock().is_empty());
}

#[test]
fn test_typed_accessor_falls_back_on_unparsable_value() {
    let dir = tempfile::tempdir().unwrap();
    let observed = observed_store(RemovalPolicy::Reload);
    observed.store.load(dir.path(), &sections("8080")).unwrap();

    let timeout = observed
        .store
        .get_duration("Timeout", chrono::Duration::seconds(30));
    assert_eq!(timeout, chrono::Duration::seconds(30));
}

#[test]
fn test_concurrent_readers_never_observe_torn_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let observed = observed_store(RemovalPolicy::Reload);
    let store = Arc::clone(&observed.store);
    write_document(dir.path(), 0, "http://start");
    store.load(dir.path(), &ConfigSections::new()).unwrap();

    let stop = AtomicBool::new(false);
    let reads = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                while !stop.load(Ordering::Acquire) {
                    let snapshot = store.snapshot();
                    let document = snapshot.document().unwrap();
                    let expected = Fingerprint::of(
                        document_content(document.generation, &document.endpoint).as_bytes(),
                    );
                    assert_eq!(snapshot.document_fingerprint(), Some(&expected));
                    reads.fetch_add(1, Ordering::Relaxed);
                }
            });
        }

        for generation in 1..=200 {
            write_document(dir.path(), generation, "http://next");
            store.load(dir.path(), &ConfigSections::new()).unwrap();
        }
        stop.store(true, Ordering::Release);
    });

    assert!(reads.load(Ordering::Relaxed) > 0);
    assert_eq!(store.document().unwrap().generation, 200);
    assert_eq!(observed.document_events.lock().len(), 201);
}

#[test]
fn test_concurrent_writers_apply_changes_one_at_a_time() {
    let packages: Vec<tempfile::TempDir> = (0..8_u64)
        .map(|generation| {
            let dir = tempfile::tempdir().unwrap();
            write_document(dir.path(), generation, "http://package");
            dir
        })
        .collect();
    let observed = observed_store(RemovalPolicy::Reload);
    let store = &observed.store;

    std::thread::scope(|scope| {
        for writer in 0..4_usize {
            let packages = &packages;
            scope.spawn(move || {
                for round in 0..200_usize {
                    let package = &packages[(writer * 3 + round) % packages.len()];
                    store.load(package.path(), &ConfigSections::new()).unwrap();
                }
            });
        }
    });

    let events = observed.document_events.lock();
    assert!(!events.is_empty());
    assert_eq!(events[0].0, None);
    for pair in events.windows(2) {
        assert_eq!(pair[1].0, pair[0].1);
        assert_ne!(pair[1].0, pair[1].1);
    }
    assert_eq!(
        events.last().unwrap().1,
        Some(store.document().unwrap().generation)
    );
}

#[test]
fn test_options_loaded_from_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("snapshot.toml");
    std::fs::write(
        &path,
        "logical_name = \"Gateway\"\ndocument_extension = \"json\"\nremoval_policy = \"clear\"\n",
    )?;

    let options = SnapshotStoreOptions::load(Some(&path))?;
    assert_eq!(options.logical_name, "Gateway");
    assert_eq!(options.removal_policy, RemovalPolicy::Clear);

    let store = ConfigSnapshotStore::<ServiceSettings>::new(options)?;
    assert_eq!(store.logical_name(), "Gateway");
    Ok(())
}
