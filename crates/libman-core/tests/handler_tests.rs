//! Handler behavior against a scripted backend.

mod common;

use common::*;
use futures::future;
use libman_core::handlers::{
    auto_check, builtin, data, install, installed, registry, search, stats, uninstall, updates,
};
use libman_core::handlers::auto_check::AutoCheckOutcome;
use libman_core::handlers::uninstall::PackageOperation;
use libman_core::{
    Completion, LibmanError, LibraryRef, OrchestratorConfig, RouteConfig, StateStore, StoreKeys,
    ToastLevel, UiEvent, UiEventLog,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

type Recorded = Arc<Mutex<Vec<(Option<String>, Option<Value>)>>>;

fn recording_completion() -> (Completion, Recorded) {
    let calls: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    let on_end: Completion = Box::new(move |err: Option<&LibmanError>, result: Option<&Value>| {
        sink.lock()
            .unwrap()
            .push((err.map(|e| e.to_string()), result.cloned()));
    });
    (on_end, calls)
}

/// Await per-storage sub-tasks, failing the test if one panicked.
async fn join_all(tasks: Vec<JoinHandle<()>>) {
    for result in future::join_all(tasks).await {
        result.unwrap();
    }
}

fn toasts(ui: &UiEventLog, level: ToastLevel) -> Vec<String> {
    ui.events()
        .into_iter()
        .filter_map(|event| match event {
            UiEvent::Toast {
                level: l, title, ..
            } if l == level => Some(title),
            _ => None,
        })
        .collect()
}

// ---- stats ----

#[tokio::test(start_paused = true)]
async fn test_stats_loaded_once_then_reset() {
    let h = Harness::new(ScriptedRpc::always(json!({"total": 12})));

    stats::load_stats(&h.ctx).await.unwrap();
    assert_eq!(h.rpc.argvs(), vec![argv(&["lib", "stats", "--json-output"])]);
    assert_eq!(h.slot(StoreKeys::LIB_STATS), Some(json!({"total": 12})));

    stats::load_stats(&h.ctx).await.unwrap();
    assert_eq!(h.rpc.call_count(), 1);

    tokio::time::sleep(Duration::from_secs(3601)).await;
    assert_eq!(h.slot(StoreKeys::LIB_STATS), None);

    stats::load_stats(&h.ctx).await.unwrap();
    assert_eq!(h.rpc.call_count(), 2);
}

#[tokio::test]
async fn test_stats_failure_notifies_and_leaves_slot_unloaded() {
    let h = Harness::new(ScriptedRpc::new(|_| Err(backend_error("registry offline"))));

    assert!(stats::load_stats(&h.ctx).await.is_err());
    assert_eq!(h.slot(StoreKeys::LIB_STATS), None);
    assert_eq!(
        toasts(&h.ui, ToastLevel::Error),
        vec!["Could not load library stats".to_string()]
    );
}

// ---- search ----

#[tokio::test]
async fn test_search_appends_keyed_result() {
    let h = Harness::new(ScriptedRpc::always(json!({"items": [], "page": 2})));

    search::load_search_result(&h.ctx, "json", 2).await.unwrap();

    assert_eq!(
        h.rpc.argvs(),
        vec![argv(&["lib", "search", "json", "--page", "2", "--json-output"])]
    );
    assert_eq!(
        h.slot(StoreKeys::LIB_SEARCH),
        Some(json!([{"key": "json-2", "result": {"items": [], "page": 2}}]))
    );
}

#[tokio::test]
async fn test_search_cache_hit_makes_no_call() {
    let h = Harness::new(ScriptedRpc::always(json!({"items": []})));
    h.ctx
        .store()
        .set(
            StoreKeys::LIB_SEARCH,
            json!([{"key": "json-2", "result": {"items": []}}]),
        )
        .unwrap();

    search::load_search_result(&h.ctx, "json", 2).await.unwrap();
    assert_eq!(h.rpc.call_count(), 0);
}

#[tokio::test]
async fn test_search_empty_query_omits_query_argument() {
    let h = Harness::new(ScriptedRpc::always(json!({"items": []})));

    search::load_search_result(&h.ctx, "", 1).await.unwrap();

    assert_eq!(
        h.rpc.argvs(),
        vec![argv(&["lib", "search", "--page", "1", "--json-output"])]
    );
    let cached = h.slot(StoreKeys::LIB_SEARCH).unwrap();
    assert_eq!(cached[0]["key"], json!("-1"));
}

#[tokio::test]
async fn test_search_failure_keeps_cached_history() {
    let h = Harness::new(ScriptedRpc::new(|_| Err(backend_error("registry offline"))));
    let cached = json!([{"key": "json-1", "result": {"items": []}}]);
    h.ctx
        .store()
        .set(StoreKeys::LIB_SEARCH, cached.clone())
        .unwrap();

    assert!(search::load_search_result(&h.ctx, "json", 2).await.is_err());

    assert_eq!(h.rpc.call_count(), 1);
    assert_eq!(h.slot(StoreKeys::LIB_SEARCH), Some(cached));
    assert_eq!(
        toasts(&h.ui, ToastLevel::Error),
        vec!["Could not search libraries".to_string()]
    );
}

#[tokio::test]
async fn test_search_history_is_bounded() {
    let config = OrchestratorConfig {
        max_list_entries: 3,
        ..OrchestratorConfig::default()
    };
    let h = Harness::with_options(
        ScriptedRpc::always(json!({"items": []})),
        UiEventLog::new(),
        config,
    );

    for page in 1..=5 {
        search::load_search_result(&h.ctx, "servo", page).await.unwrap();
    }

    let keys: Vec<Value> = h
        .slot(StoreKeys::LIB_SEARCH)
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["key"].clone())
        .collect();
    assert_eq!(keys, vec![json!("servo-3"), json!("servo-4"), json!("servo-5")]);
}

// ---- library data ----

#[tokio::test]
async fn test_library_data_by_id_is_cached() {
    let h = Harness::new(ScriptedRpc::always(json!({"id": 42, "name": "ArduinoJson"})));

    data::load_library_data(&h.ctx, LibraryRef::Id(42))
        .await
        .unwrap();
    data::load_library_data(&h.ctx, LibraryRef::Id(42))
        .await
        .unwrap();

    assert_eq!(
        h.rpc.argvs(),
        vec![argv(&["lib", "show", "42", "--json-output"])]
    );
    assert_eq!(
        h.slot(StoreKeys::LIB_DATA),
        Some(json!([{"id": 42, "name": "ArduinoJson"}]))
    );
}

#[tokio::test]
async fn test_library_data_manifest_loads_referenced_registry_lists() {
    let h = Harness::new(ScriptedRpc::always(json!([{"name": "atmelavr"}])));
    let manifest = json!({"name": "Servo", "platforms": ["atmelavr"]});

    data::load_library_data(&h.ctx, LibraryRef::Manifest(manifest))
        .await
        .unwrap();

    assert_eq!(
        h.rpc.argvs(),
        vec![argv(&["platform", "search", "--json-output"])]
    );
    assert_eq!(
        h.slot(StoreKeys::REGISTRY_PLATFORMS),
        Some(json!([{"name": "atmelavr"}]))
    );
    assert_eq!(h.slot(StoreKeys::REGISTRY_FRAMEWORKS), None);
}

#[tokio::test]
async fn test_registry_check_attempts_every_list_and_stays_silent() {
    let h = Harness::new(ScriptedRpc::new(|argv| {
        if has(argv, "search") {
            Err(backend_error("platform registry unavailable"))
        } else {
            Ok(json!([{"name": "arduino"}]))
        }
    }));
    let manifest = json!({"platforms": "*", "frameworks": ["arduino"]});

    let result = registry::check_platforms_and_frameworks(&h.ctx, &manifest, true).await;

    assert!(result.is_err());
    assert_eq!(h.rpc.call_count(), 2);
    assert_eq!(h.slot(StoreKeys::REGISTRY_PLATFORMS), None);
    assert_eq!(
        h.slot(StoreKeys::REGISTRY_FRAMEWORKS),
        Some(json!([{"name": "arduino"}]))
    );
    assert!(toasts(&h.ui, ToastLevel::Error).is_empty());
}

// ---- builtin ----

#[tokio::test]
async fn test_builtin_libs_loaded_once() {
    let h = Harness::new(ScriptedRpc::always(json!([{"name": "framework-arduinoavr"}])));

    builtin::load_builtin_libs(&h.ctx).await.unwrap();
    builtin::load_builtin_libs(&h.ctx).await.unwrap();

    assert_eq!(
        h.rpc.argvs(),
        vec![argv(&["lib", "builtin", "--json-output"])]
    );
    assert!(h.slot(StoreKeys::LIB_BUILTIN).is_some());
}

// ---- installed ----

#[tokio::test]
async fn test_installed_libs_per_storage() {
    let h = Harness::new(ScriptedRpc::new(|argv| {
        if has(argv, "--global") {
            Ok(json!([{"name": "ArduinoJson", "__pkg_dir": "/global/ArduinoJson"}]))
        } else {
            Err(backend_error("Error: Storage /work/blink/.pio/libdeps/uno does not exist"))
        }
    }));

    let tasks = installed::load_installed_libs(&h.ctx).await.unwrap();
    assert_eq!(tasks.len(), 2);
    join_all(tasks).await;

    assert!(h
        .rpc
        .argvs()
        .contains(&argv(&["lib", "--global", "list", "--json-output"])));
    assert!(h.rpc.argvs().contains(&argv(&[
        "lib",
        "--storage-dir",
        "/work/blink/.pio/libdeps/uno",
        "list",
        "--json-output"
    ])));
    assert_eq!(
        h.slot("installedLibs/global"),
        Some(json!([{"name": "ArduinoJson", "__pkg_dir": "/global/ArduinoJson"}]))
    );
    assert_eq!(h.slot(&project_storage().installed_key()), Some(json!([])));
    assert!(toasts(&h.ui, ToastLevel::Error).is_empty());
}

#[tokio::test]
async fn test_installed_libs_failure_is_isolated_per_storage() {
    let h = Harness::new(ScriptedRpc::new(|argv| {
        if has(argv, "--global") {
            Err(backend_error("Permission denied"))
        } else {
            Ok(json!([]))
        }
    }));

    join_all(installed::load_installed_libs(&h.ctx).await.unwrap()).await;

    assert_eq!(h.slot("installedLibs/global"), None);
    assert_eq!(h.slot(&project_storage().installed_key()), Some(json!([])));
    assert_eq!(
        toasts(&h.ui, ToastLevel::Error),
        vec!["Could not load installed libraries".to_string()]
    );
}

#[tokio::test]
async fn test_installed_libs_skips_cached_storages() {
    let h = Harness::new(ScriptedRpc::always(json!([])));
    h.ctx
        .store()
        .set("installedLibs/global", json!([{"name": "cached"}]))
        .unwrap();

    let tasks = installed::load_installed_libs(&h.ctx).await.unwrap();
    assert_eq!(tasks.len(), 1);
    join_all(tasks).await;

    assert_eq!(h.rpc.call_count(), 1);
    assert!(!has(&h.rpc.argvs()[0], "--global"));
}

// ---- updates ----

#[tokio::test]
async fn test_lib_updates_refetches_every_storage() {
    let h = Harness::new(ScriptedRpc::always(json!([{"name": "Servo"}])));
    h.ctx
        .store()
        .set("libUpdates/global", json!([{"name": "stale"}]))
        .unwrap();
    h.ctx
        .store()
        .set("libUpdates/removed-project", json!([]))
        .unwrap();

    join_all(updates::load_lib_updates(&h.ctx).await.unwrap()).await;

    assert_eq!(h.rpc.call_count(), 2);
    assert!(h.rpc.argvs().contains(&argv(&[
        "lib",
        "--global",
        "update",
        "--only-check",
        "--json-output"
    ])));
    assert_eq!(h.slot("libUpdates/global"), Some(json!([{"name": "Servo"}])));
    assert_eq!(h.slot("libUpdates/removed-project"), None);
    assert_eq!(h.ui.badge(RouteConfig::LIBRARY_UPDATES), Some(0));
}

#[tokio::test]
async fn test_lib_updates_failure_is_isolated_per_storage() {
    let h = Harness::new(ScriptedRpc::new(|argv| {
        if has(argv, "--global") {
            Err(backend_error("Network is unreachable"))
        } else {
            Ok(json!([{"name": "Servo"}]))
        }
    }));

    join_all(updates::load_lib_updates(&h.ctx).await.unwrap()).await;

    assert_eq!(h.rpc.call_count(), 2);
    assert_eq!(
        h.slot(&project_storage().updates_key()),
        Some(json!([{"name": "Servo"}]))
    );
    assert_eq!(h.slot(&global_storage().updates_key()), None);
    assert_eq!(
        toasts(&h.ui, ToastLevel::Error),
        vec!["Could not check library updates".to_string()]
    );
}

// ---- background check ----

#[tokio::test]
async fn test_auto_check_sums_updates_and_records_timestamp() {
    let h = Harness::new(ScriptedRpc::new(|argv| {
        if has(argv, "--global") {
            Ok(json!([{"name": "a"}, {"name": "b"}]))
        } else {
            Ok(json!([{"name": "c"}]))
        }
    }));

    let outcome = auto_check::check_updates_in_background(&h.ctx)
        .await
        .unwrap();

    assert_eq!(outcome, AutoCheckOutcome::Checked(3));
    assert_eq!(h.ui.badge(RouteConfig::LIBRARY_UPDATES), Some(3));
    let stamp = h.state.get("libraries.lastCheckUpdates").unwrap().unwrap();
    assert!(stamp.parse::<i64>().unwrap() > 0);

    let outcome = auto_check::check_updates_in_background(&h.ctx)
        .await
        .unwrap();
    assert_eq!(outcome, AutoCheckOutcome::Skipped);
    assert_eq!(h.rpc.call_count(), 2);
}

#[tokio::test]
async fn test_auto_check_within_interval_is_skipped() {
    let h = Harness::new(ScriptedRpc::always(json!([{"name": "a"}])));
    let an_hour_ago = chrono::Utc::now() - chrono::Duration::hours(1);
    let stamp = an_hour_ago.timestamp_millis().to_string();
    h.state.set("libraries.lastCheckUpdates", &stamp).unwrap();

    let outcome = auto_check::check_updates_in_background(&h.ctx)
        .await
        .unwrap();

    assert_eq!(outcome, AutoCheckOutcome::Skipped);
    assert_eq!(h.rpc.call_count(), 0);
    assert_eq!(h.ui.badge(RouteConfig::LIBRARY_UPDATES), None);
    assert_eq!(h.state.get("libraries.lastCheckUpdates").unwrap(), Some(stamp));
}

#[tokio::test]
async fn test_auto_check_runs_when_last_check_is_old() {
    let h = Harness::new(ScriptedRpc::new(|argv| {
        if has(argv, "--global") {
            Err(backend_error("Network is unreachable"))
        } else {
            Ok(json!([{"name": "c"}]))
        }
    }));
    let four_days_ago = chrono::Utc::now() - chrono::Duration::days(4);
    h.state
        .set(
            "libraries.lastCheckUpdates",
            &four_days_ago.timestamp_millis().to_string(),
        )
        .unwrap();

    let outcome = auto_check::check_updates_in_background(&h.ctx)
        .await
        .unwrap();

    assert_eq!(outcome, AutoCheckOutcome::Checked(1));
    assert_eq!(h.ui.badge(RouteConfig::LIBRARY_UPDATES), Some(1));
    assert!(toasts(&h.ui, ToastLevel::Error).is_empty());
}

// ---- install ----

#[tokio::test]
async fn test_install_success() {
    let output = json!(concat!(
        "Library Storage: /global\n",
        "Library Manager: Installing ArduinoJson\n",
        "ArduinoJson@6.21.3 has been installed!\n",
    ));
    let h = Harness::new(ScriptedRpc::always(output.clone()));
    h.ctx.store().set("installedLibs/global", json!([])).unwrap();
    h.ctx.store().set(StoreKeys::LIB_BUILTIN, json!([])).unwrap();
    let (on_end, calls) = recording_completion();

    install::install_library(&h.ctx, None, "ArduinoJson", Some(on_end))
        .await
        .unwrap();

    let recorded = h.rpc.calls();
    assert_eq!(recorded[0].argv, argv(&["lib", "--global", "install", "ArduinoJson"]));
    assert_eq!(recorded[0].options, Some(json!({"force_subprocess": true})));
    assert_eq!(h.slot("installedLibs/global"), None);
    assert_eq!(h.slot(StoreKeys::LIB_BUILTIN), Some(json!([])));

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (None, Some(output)));

    let events = h.ui.events();
    assert!(events.contains(&UiEvent::Toast {
        level: ToastLevel::Success,
        title: "Library has been successfully installed".to_string(),
        message: "ArduinoJson@6.21.3 has been installed!".to_string(),
    }));
}

#[tokio::test]
async fn test_install_into_project_storage_failure() {
    let h = Harness::new(ScriptedRpc::new(|_| {
        Err(backend_error("Error: Could not find the package"))
    }));
    let (on_end, calls) = recording_completion();

    let result = install::install_library(
        &h.ctx,
        Some(Path::new("/work/blink/.pio/libdeps/uno")),
        "NoSuchLib",
        Some(on_end),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(
        h.rpc.argvs()[0],
        argv(&[
            "lib",
            "--storage-dir",
            "/work/blink/.pio/libdeps/uno",
            "install",
            "NoSuchLib"
        ])
    );
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].0.is_some());
    assert_eq!(
        toasts(&h.ui, ToastLevel::Error),
        vec!["Could not install library".to_string()]
    );
}

// ---- uninstall / update ----

fn seed_package_lists(h: &Harness) {
    h.ctx
        .store()
        .set(
            "installedLibs/global",
            json!([
                {"name": "ArduinoJson", "__pkg_dir": "/global/ArduinoJson"},
                {"name": "Servo", "__pkg_dir": "/global/Servo"}
            ]),
        )
        .unwrap();
    h.ctx
        .store()
        .set(
            "libUpdates/global",
            json!([{"name": "ArduinoJson", "__pkg_dir": "/global/ArduinoJson"}]),
        )
        .unwrap();
}

#[tokio::test]
async fn test_uninstall_prunes_package_from_cached_lists() {
    let h = Harness::new(ScriptedRpc::always(json!("Uninstalling ArduinoJson\n[SUCCESS]")));
    seed_package_lists(&h);
    let (on_end, calls) = recording_completion();

    uninstall::uninstall_or_update_library(
        &h.ctx,
        PackageOperation::Uninstall,
        Path::new("/global"),
        "/global/ArduinoJson",
        Some(on_end),
    )
    .await
    .unwrap();

    let recorded = h.rpc.calls();
    assert_eq!(
        recorded[0].argv,
        argv(&["lib", "--storage-dir", "/global", "uninstall", "/global/ArduinoJson"])
    );
    assert_eq!(recorded[0].options, Some(json!({"force_subprocess": true})));
    assert_eq!(
        h.slot("installedLibs/global"),
        Some(json!([{"name": "Servo", "__pkg_dir": "/global/Servo"}]))
    );
    assert_eq!(h.slot("libUpdates/global"), Some(json!([])));
    assert_eq!(calls.lock().unwrap().len(), 1);
    assert!(h.ui.events().contains(&UiEvent::Toast {
        level: ToastLevel::Success,
        title: "Library has been successfully uninstalled".to_string(),
        message: "[SUCCESS]".to_string(),
    }));
}

#[tokio::test]
async fn test_update_invalidates_installed_lists() {
    let h = Harness::new(ScriptedRpc::always(json!("ArduinoJson@7.0.0 has been updated")));
    seed_package_lists(&h);

    uninstall::uninstall_or_update_library(
        &h.ctx,
        PackageOperation::Update,
        Path::new("/global"),
        "/global/ArduinoJson",
        None,
    )
    .await
    .unwrap();

    assert_eq!(h.rpc.argvs()[0][3], "update");
    assert_eq!(h.slot("installedLibs/global"), None);
    assert_eq!(h.slot("libUpdates/global"), Some(json!([])));
    assert_eq!(
        toasts(&h.ui, ToastLevel::Success),
        vec!["Library has been successfully updated".to_string()]
    );
}

#[tokio::test]
async fn test_uninstall_unknown_package_redirects_to_installed() {
    let h = Harness::with_options(
        ScriptedRpc::new(|_| {
            Err(backend_error(
                "Error: Detected unknown package '/global/Gone'",
            ))
        }),
        UiEventLog::with_router(),
        OrchestratorConfig::default(),
    );
    seed_package_lists(&h);
    let (on_end, calls) = recording_completion();

    let result = uninstall::uninstall_or_update_library(
        &h.ctx,
        PackageOperation::Uninstall,
        Path::new("/global"),
        "/global/Gone",
        Some(on_end),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(h.slot("installedLibs/global"), None);
    assert!(h.slot("libUpdates/global").is_some());
    assert!(toasts(&h.ui, ToastLevel::Error).is_empty());
    assert!(h.ui.events().contains(&UiEvent::Navigate {
        route: RouteConfig::LIBRARY_INSTALLED.to_string(),
        replace: true,
    }));
    assert!(calls.lock().unwrap()[0].0.is_some());
}

#[tokio::test]
async fn test_uninstall_failure_keeps_cached_lists() {
    let h = Harness::new(ScriptedRpc::new(|_| Err(backend_error("Permission denied"))));
    seed_package_lists(&h);

    let result = uninstall::uninstall_or_update_library(
        &h.ctx,
        PackageOperation::Uninstall,
        Path::new("/global"),
        "/global/ArduinoJson",
        None,
    )
    .await;

    assert!(result.is_err());
    assert_eq!(
        h.slot("installedLibs/global").unwrap().as_array().unwrap().len(),
        2
    );
    assert_eq!(
        toasts(&h.ui, ToastLevel::Error),
        vec!["Could not uninstall library".to_string()]
    );
}
