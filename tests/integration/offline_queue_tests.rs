//! Offline miss-you queue: queueing while disconnected, persistence of the
//! pending count and paced replay on reconnect.

use crate::app_service_tests::Rig;

use pixelpal::app::events::AppEvent;
use pixelpal::store::{PersistentStore, KEY_OFFLINE, NAMESPACE};

const MISS_YOU: &str = r#"{"type":"miss_you_button"}"#;

fn queued_rig(presses: usize) -> Rig {
    let mut rig = Rig::new(true);
    rig.link.connected = false;
    rig.step(20);
    for _ in 0..presses {
        rig.click_miss_you();
    }
    rig
}

#[test]
fn presses_while_disconnected_are_queued_and_persisted() {
    let rig = queued_rig(2);

    assert!(rig.link.sent.is_empty());
    assert_eq!(rig.app.state().offline_events, 2);
    assert_eq!(rig.app.state().stats.miss_you_presses, 2);
    assert!(rig.sink.events.contains(&AppEvent::MissYouQueued { pending: 1 }));
    assert!(rig.sink.events.contains(&AppEvent::MissYouQueued { pending: 2 }));
    assert_eq!(rig.storage.get(NAMESPACE, KEY_OFFLINE).as_deref(), Some("2"));
}

#[test]
fn failed_send_falls_back_to_the_queue() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.link.fail_sends = 1;
    rig.click_miss_you();

    assert!(rig.link.sent.is_empty());
    assert_eq!(rig.app.state().offline_events, 1);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::MissYouSent), 0);
}

#[test]
fn reconnect_replays_every_queued_event_with_pacing() {
    let mut rig = queued_rig(3);
    rig.link.connected = true;
    rig.step(20);

    assert_eq!(rig.link.sent, [MISS_YOU; 3]);
    assert_eq!(rig.board.delays, [100, 100]);
    assert_eq!(rig.app.state().offline_events, 0);
    assert!(rig.sink.events.contains(&AppEvent::OfflineFlushed {
        sent: 3,
        remaining: 0
    }));
    assert_eq!(rig.storage.get(NAMESPACE, KEY_OFFLINE).as_deref(), Some("0"));
}

#[test]
fn failed_replay_is_retried_while_the_link_stays_up() {
    let mut rig = queued_rig(2);
    rig.link.connected = true;
    rig.link.fail_sends = 1;
    rig.step(20);

    assert!(rig.link.sent.is_empty());
    assert_eq!(rig.app.state().offline_events, 2);
    assert!(rig.sink.events.contains(&AppEvent::OfflineFlushed {
        sent: 0,
        remaining: 2
    }));

    // Held back until the retry interval has passed.
    rig.step(1_000);
    assert!(rig.link.sent.is_empty());

    rig.step(4_000);
    assert_eq!(rig.link.sent, [MISS_YOU; 2]);
    assert_eq!(rig.app.state().offline_events, 0);
    assert_eq!(rig.storage.get(NAMESPACE, KEY_OFFLINE).as_deref(), Some("0"));
}

#[test]
fn reconnect_skips_the_retry_wait() {
    let mut rig = queued_rig(2);
    rig.link.connected = true;
    rig.link.fail_sends = 1;
    rig.step(20);
    assert!(rig.link.sent.is_empty());

    rig.link.connected = false;
    rig.step(20);
    rig.link.connected = true;
    rig.step(20);
    assert_eq!(rig.link.sent.len(), 2);
    assert_eq!(rig.app.state().offline_events, 0);
}

#[test]
fn failed_direct_send_is_replayed_on_a_live_link() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.link.fail_sends = 1;
    rig.click_miss_you();
    assert_eq!(rig.app.state().offline_events, 1);

    for _ in 0..200 {
        rig.step(50);
    }
    assert_eq!(rig.link.sent, [MISS_YOU]);
    assert_eq!(rig.app.state().offline_events, 0);

    rig.click_miss_you();
    assert_eq!(rig.link.sent, [MISS_YOU; 2]);
    assert_eq!(rig.app.state().offline_events, 0);
}

#[test]
fn new_press_waits_behind_queued_events() {
    let mut rig = Rig::new(true);
    rig.step(20);
    rig.link.fail_sends = 1;
    rig.click_miss_you();
    rig.click_miss_you();

    assert!(rig.link.sent.is_empty());
    assert_eq!(rig.app.state().offline_events, 2);
    assert!(rig.sink.events.contains(&AppEvent::MissYouQueued { pending: 2 }));
    assert_eq!(rig.sink.count(|e| *e == AppEvent::MissYouSent), 0);

    rig.step(5_000);
    assert_eq!(rig.link.sent, [MISS_YOU; 2]);
    assert_eq!(rig.app.state().offline_events, 0);
}

#[test]
fn drop_mid_replay_persists_the_unsent_remainder() {
    let mut rig = queued_rig(4);
    rig.link.connected = true;
    rig.link.drop_after = Some(1);
    rig.step(20);

    assert_eq!(rig.link.sent.len(), 1);
    assert_eq!(rig.app.state().offline_events, 3);
    assert_eq!(rig.storage.get(NAMESPACE, KEY_OFFLINE).as_deref(), Some("3"));
    assert!(rig.sink.events.contains(&AppEvent::OfflineFlushed {
        sent: 1,
        remaining: 3
    }));

    // The link state is re-read on the next tick; the rest goes out as
    // soon as it is back.
    rig.step(20);
    rig.link.connected = true;
    rig.step(20);
    assert_eq!(rig.link.sent.len(), 4);
    assert_eq!(rig.app.state().offline_events, 0);
}

#[test]
fn queued_count_survives_a_restart() {
    let rig = queued_rig(3);
    let storage = rig.storage.clone();
    drop(rig);

    let reloaded = PersistentStore::new(storage);
    assert_eq!(reloaded.load_offline_count(), 3);
    assert_eq!(reloaded.load_stats().miss_you_presses, 3);
}
