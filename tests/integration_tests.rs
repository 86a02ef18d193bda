//! Integration tests for Wizard Store

use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use wizard_store::shapes::{assessment, training, Assessment, AssessmentView, Training};
use wizard_store::{reset_store, store, Change, Record, Shape, SharedState, StoreRuntime};

fn counter() -> (Arc<AtomicUsize>, impl Fn(&Change) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();
    (count, move |_: &Change| {
        count_clone.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn reset_discards_selections() {
    StoreRuntime::scope(|| {
        let store = store::<Training>();
        assert_eq!(
            store.snapshot().to_json(),
            json!({ "skill": 0, "permutation": 0, "startTPN": 0 })
        );

        store.set(training::fields::SELECTED_LANDMARK, 4);
        store.set(training::fields::SKILL, 7);
        reset_store::<Training>();

        assert_eq!(
            store.snapshot().to_json(),
            json!({ "skill": 0, "permutation": 0, "startTPN": 0 })
        );
        assert!(!store.contains(training::fields::SELECTED_LANDMARK));
    });
}

#[test]
fn reset_of_canonical_store_still_notifies() {
    let store = SharedState::<Training>::new();
    let before = store.snapshot();

    let mut counts = Vec::new();
    let mut subs = Vec::new();
    for key in before.keys() {
        let (count, callback) = counter();
        subs.push(store.subscribe(key, callback));
        counts.push(count);
    }

    store.reset();

    assert_eq!(store.snapshot(), before);
    for count in counts {
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn reset_drops_fields_outside_shape() {
    let store = SharedState::<Training>::new();
    store.set("accuracies", json!({ "a": 1 }));

    store.reset();

    assert_eq!(store.get("accuracies"), None);
}

#[test]
fn reset_is_idempotent() {
    let store = SharedState::<Assessment>::new();
    store.set(assessment::fields::AGE, 31);
    store.set(assessment::fields::SELECTED_FREQUENCY, 2);

    store.reset();
    let once = store.snapshot();
    store.reset();

    assert_eq!(store.snapshot(), once);
    assert_eq!(once, Assessment::initial_shape());
}

#[test]
fn reset_restores_canonical_shape_after_any_writes() {
    let scripts: Vec<Vec<(&str, Value)>> = vec![
        vec![],
        vec![("age", json!(-4)), ("skill", json!(1.5))],
        vec![("conditionSince", json!(2019)), ("selectedLength", json!(3))],
        vec![("accuracies", json!({ "l1": 0.8, "l2": 0.4 })), ("accuracies", json!([]))],
        vec![("permutation", json!("not a number")), ("extra", json!(null))],
        vec![
            ("selectedLandmark", json!(1)),
            ("selectedFrequency", json!(2)),
            ("selectedLength", json!(3)),
            ("skill", json!(9)),
        ],
    ];

    for script in scripts {
        let store = SharedState::<Assessment>::new();
        for (key, value) in script {
            store.set(key, value);
        }

        store.reset();

        let record = store.snapshot();
        assert!(record.same_keys(&Assessment::initial_shape()));
        assert_eq!(record.get("age"), Some(&json!(0)));
        assert_eq!(record.get("skill"), Some(&json!(0)));
        assert_eq!(record.get("permutation"), Some(&json!(0)));
        assert_eq!(record.get("accuracies"), Some(&json!({})));
        assert!(store.is_canonical());
    }
}

#[test]
fn reset_keeps_core_fields_and_removes_optional_ones() {
    let store = SharedState::<Assessment>::new();
    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = changes.clone();

    store.set(assessment::fields::SELECTED_LANDMARK, 2);
    store.set(assessment::fields::SKILL, 4);

    let _landmark = store.subscribe(assessment::fields::SELECTED_LANDMARK, {
        let changes = changes_clone.clone();
        move |change: &Change| changes.lock().unwrap().push(change.clone())
    });
    let _skill = store.subscribe(assessment::fields::SKILL, move |change: &Change| {
        changes_clone.lock().unwrap().push(change.clone())
    });

    store.reset();

    let changes = changes.lock().unwrap();
    assert_eq!(changes.len(), 2);
    assert!(changes.contains(&Change::Removed {
        key: "selectedLandmark".to_string(),
        previous: json!(2),
    }));
    assert!(changes.contains(&Change::Assigned {
        key: "skill".to_string(),
        previous: Some(json!(4)),
        value: json!(0),
    }));
}

#[test]
fn absent_optional_field_is_not_notified_on_reset() {
    let store = SharedState::<Assessment>::new();
    let (count, callback) = counter();
    let _sub = store.subscribe(assessment::fields::SELECTED_LENGTH, callback);

    store.reset();

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn whole_record_subscriber_sees_reset_once() {
    let store = SharedState::<Training>::new();
    let records: Arc<Mutex<Vec<Record>>> = Arc::new(Mutex::new(Vec::new()));
    let records_clone = records.clone();

    store.set(training::fields::SELECTED_AMOUNT, 10);
    let _sub = store.subscribe_all(move |record| {
        records_clone.lock().unwrap().push(record.clone());
    });

    store.reset();

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], Training::initial_shape());
}

#[test]
fn typed_view_tracks_wizard_progress() {
    let store = SharedState::<Assessment>::new();
    store.set(assessment::fields::AGE, 42);
    store.set(assessment::fields::SELECTED_LANDMARK, 3);
    store
        .set_as(assessment::fields::ACCURACIES, &json!({ "first": 0.75 }))
        .unwrap();

    let view = store.view().unwrap();
    assert_eq!(view.age, 42.0);
    assert_eq!(view.selected_landmark, Some(3.0));
    assert_eq!(view.accuracies.get("first"), Some(&json!(0.75)));
    assert_eq!(view.condition_since, None);

    store.reset();
    assert_eq!(store.view().unwrap(), AssessmentView::default());
}

#[test]
fn global_store_is_shared_across_handles() {
    let runtime = StoreRuntime::new();
    StoreRuntime::with_runtime(runtime, || {
        let first = store::<Assessment>();
        let second = store::<Assessment>();

        first.set(assessment::fields::SKILL, 3);
        assert_eq!(second.get_as::<i64>(assessment::fields::SKILL).unwrap(), Some(3));

        reset_store::<Assessment>();
        assert!(first.is_canonical());
    });
}

#[test]
fn handles_shared_across_threads() {
    let store = SharedState::<Training>::new();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = store.clone();
            std::thread::spawn(move || {
                store.set(format!("scratch{i}"), i);
                store.reset();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    store.reset();
    assert!(store.is_canonical());
}

#[test]
fn subscribers_end_on_final_record_across_threads() {
    for _ in 0..50 {
        let store = SharedState::<Training>::new();
        let last: Arc<Mutex<Option<Record>>> = Arc::new(Mutex::new(None));
        let last_clone = last.clone();

        let _sub = store.subscribe_all(move |record| {
            *last_clone.lock().unwrap() = Some(record.clone());
        });

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    store.set(training::fields::SKILL, i);
                }
            })
        };
        let resetter = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    store.reset();
                }
            })
        };

        writer.join().unwrap();
        resetter.join().unwrap();

        assert_eq!(last.lock().unwrap().as_ref(), Some(&store.snapshot()));
    }
}
