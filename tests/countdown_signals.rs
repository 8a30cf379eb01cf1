use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use lobby::clock::ManualClock;
use lobby::countdown::PersistentCountdown;
use lobby::engine::Update;
use lobby::prefs::{MemoryPrefs, PrefsStore};

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

struct Harness {
    countdown: PersistentCountdown,
    clock: Rc<ManualClock>,
    store: Rc<RefCell<dyn PrefsStore>>,
    progress: Rc<RefCell<Vec<Duration>>>,
    completions: Rc<Cell<u32>>,
}

fn harness(duration: Duration) -> Harness {
    let store: Rc<RefCell<dyn PrefsStore>> = Rc::new(RefCell::new(MemoryPrefs::new()));
    let clock = Rc::new(ManualClock::new(noon()));
    let mut countdown =
        PersistentCountdown::new("reward", duration, store.clone(), clock.clone()).unwrap();

    let progress: Rc<RefCell<Vec<Duration>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = progress.clone();
    countdown.on_progress(move |remaining| sink.borrow_mut().push(remaining));

    let completions = Rc::new(Cell::new(0u32));
    let hits = completions.clone();
    countdown.on_complete(move || hits.set(hits.get() + 1));

    Harness {
        countdown,
        clock,
        store,
        progress,
        completions,
    }
}

#[test]
fn progress_counts_down_then_completes() {
    let mut h = harness(Duration::from_secs(10));

    // t=0: start. t=3: one frame. t=11: past the end.
    h.countdown.start(false);
    h.clock.advance(Duration::from_secs(3));
    h.countdown.update();
    assert_eq!(*h.progress.borrow(), vec![Duration::from_secs(7)]);
    assert_eq!(h.completions.get(), 0);

    h.clock.advance(Duration::from_secs(8));
    h.countdown.update();
    assert_eq!(
        *h.progress.borrow(),
        vec![Duration::from_secs(7), Duration::ZERO]
    );
    assert_eq!(h.completions.get(), 1);
    assert!(!h.countdown.is_running());
}

#[test]
fn completion_fires_exactly_once_per_run() {
    let mut h = harness(Duration::from_secs(10));

    h.countdown.start(false);
    h.clock.advance(Duration::from_secs(11));
    h.countdown.update();
    assert_eq!(h.completions.get(), 1);

    // Later frames stay silent until the next start.
    let frames_after = h.progress.borrow().len();
    h.clock.advance(Duration::from_secs(30));
    h.countdown.update();
    h.countdown.update();
    h.countdown.update();
    assert_eq!(h.completions.get(), 1);
    assert_eq!(h.progress.borrow().len(), frames_after);
}

#[test]
fn stop_is_idempotent() {
    let mut h = harness(Duration::from_secs(10));

    h.countdown.start(false);
    h.countdown.stop();
    h.countdown.stop();
    assert!(!h.countdown.is_running());

    h.clock.advance(Duration::from_secs(3));
    h.countdown.update();
    h.countdown.update();
    assert!(h.progress.borrow().is_empty());
    assert_eq!(h.completions.get(), 0);

    // Stopping never touches the persisted entry.
    assert!(h.store.borrow().has("reward"));
}

#[test]
fn start_on_expired_entry_signals_completion_only() {
    let store: Rc<RefCell<dyn PrefsStore>> = Rc::new(RefCell::new(MemoryPrefs::new()));
    let clock = Rc::new(ManualClock::new(noon()));

    let mut first = PersistentCountdown::new(
        "reward",
        Duration::from_secs(60),
        store.clone(),
        clock.clone(),
    )
    .unwrap();
    first.start(false);
    drop(first);

    clock.advance(Duration::from_secs(120));
    let mut second = PersistentCountdown::new(
        "reward",
        Duration::from_secs(60),
        store.clone(),
        clock.clone(),
    )
    .unwrap();

    let progress: Rc<RefCell<Vec<Duration>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = progress.clone();
    second.on_progress(move |remaining| sink.borrow_mut().push(remaining));
    let completions = Rc::new(Cell::new(0u32));
    let hits = completions.clone();
    second.on_complete(move || hits.set(hits.get() + 1));

    second.start(false);

    assert_eq!(completions.get(), 1);
    assert!(progress.borrow().is_empty());
    assert!(!second.is_running());
    // The expired entry stays put; only clear() deletes it.
    assert!(store.borrow().has("reward"));
}

#[test]
fn listeners_fire_in_registration_order() {
    let store: Rc<RefCell<dyn PrefsStore>> = Rc::new(RefCell::new(MemoryPrefs::new()));
    let clock = Rc::new(ManualClock::new(noon()));
    let mut countdown = PersistentCountdown::new(
        "reward",
        Duration::from_secs(10),
        store,
        clock.clone(),
    )
    .unwrap();

    let order: Rc<RefCell<Vec<u8>>> = Rc::new(RefCell::new(Vec::new()));
    let first = order.clone();
    countdown.on_progress(move |_| first.borrow_mut().push(1));
    let second = order.clone();
    countdown.on_progress(move |_| second.borrow_mut().push(2));
    let third = order.clone();
    countdown.on_complete(move || third.borrow_mut().push(3));
    let fourth = order.clone();
    countdown.on_complete(move || fourth.borrow_mut().push(4));

    countdown.start(false);
    clock.advance(Duration::from_secs(11));
    countdown.update();

    assert_eq!(*order.borrow(), vec![1, 2, 3, 4]);
}
