//! A wizard walking through its screens against the shared assessment store

use tracing_subscriber::EnvFilter;
use wizard_store::shapes::assessment::fields;
use wizard_store::shapes::Assessment;
use wizard_store::{Change, SharedState};

/// A screen only sees the store handle it is given.
struct Screen {
    name: &'static str,
    store: SharedState<Assessment>,
}

impl Screen {
    fn new(name: &'static str, store: &SharedState<Assessment>) -> Self {
        Self {
            name,
            store: store.clone(),
        }
    }

    fn pick(&self, key: &str, value: i64) {
        println!("[{}] {} = {}", self.name, key, value);
        self.store.set(key, value);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    println!("=== Wizard Flow ===\n");

    let store = wizard_store::store::<Assessment>();

    // A progress bar that follows the selected landmark
    let _progress = store.subscribe(fields::SELECTED_LANDMARK, |change: &Change| {
        match change.current() {
            Some(value) => println!("  progress: landmark {value} selected"),
            None => println!("  progress: landmark cleared"),
        }
    });

    let profile = Screen::new("profile", &store);
    let landmarks = Screen::new("landmarks", &store);
    let schedule = Screen::new("schedule", &store);

    profile.pick(fields::AGE, 34);
    profile.pick(fields::SKILL, 2);
    landmarks.pick(fields::SELECTED_LANDMARK, 4);
    schedule.pick(fields::SELECTED_FREQUENCY, 3);
    schedule.pick(fields::SELECTED_LENGTH, 20);

    match store.view() {
        Ok(view) => println!("\nSelections: {view:#?}"),
        Err(err) => eprintln!("\nSelections unreadable: {err}"),
    }

    println!("\nStarting over...");
    wizard_store::reset_store::<Assessment>();

    println!("\nAfter reset: {}", store.snapshot().to_json());
    println!("Canonical: {}", store.is_canonical());
}
