//! Boot-time restore from storage and degraded operation without it.

use crate::app_service_tests::Rig;
use crate::mock_hw::{MockBoard, MockLink, MockStorage, RecordingSink};

use pixelpal::app::service::AppService;
use pixelpal::config::DeviceConfig;
use pixelpal::mode::DisplayMode;
use pixelpal::store::{PersistentStore, KEY_LAST_MESSAGE, KEY_OFFLINE, KEY_STATS, NAMESPACE};

#[test]
fn restart_restores_message_style_and_counters() {
    let mut first = Rig::new(true);
    first.step(20);
    first.link.deliver(r#"{"size":3,"pos":[0,16],"text":"see you"}"#);
    first.step(20);
    first.pat();
    let storage = first.storage.clone();
    drop(first);

    let mut rig = Rig::boot(DeviceConfig::default(), storage, true, MockLink::new(true));
    let state = rig.app.state();
    assert!(state.persistent);
    assert_eq!(state.stats.messages_received, 1);
    assert_eq!(state.message.as_ref().map(|m| m.text.as_str()), Some("see you"));
    assert_eq!(state.style.size, 3);
    assert!(!state.unread, "a restored message is not unread");

    // Navigate to the message: the stored text is shown directly.
    rig.step(20);
    rig.click_mode();
    assert_eq!(rig.mode(), DisplayMode::Message);
    assert_eq!(rig.board.screen_text(), ["see you"]);
}

#[test]
fn malformed_records_load_as_defaults() {
    let storage = MockStorage::new();
    storage.put(NAMESPACE, KEY_LAST_MESSAGE, r#"{"text":"no style"}"#);
    storage.put(NAMESPACE, KEY_STATS, "{broken");
    storage.put(NAMESPACE, KEY_OFFLINE, "\"three\"");

    let rig = Rig::boot(DeviceConfig::default(), storage, true, MockLink::new(true));
    let state = rig.app.state();
    assert!(state.message.is_none());
    assert_eq!(state.stats.headpats, 0);
    assert_eq!(state.offline_events, 0);
}

#[test]
fn partial_stats_record_keeps_known_fields() {
    let storage = MockStorage::new();
    storage.put(NAMESPACE, KEY_STATS, r#"{"headpats":7}"#);

    let rig = Rig::boot(DeviceConfig::default(), storage, true, MockLink::new(true));
    assert_eq!(rig.app.state().stats.headpats, 7);
    assert_eq!(rig.app.state().stats.mood_swings, 0);
}

#[test]
fn degraded_store_runs_in_memory_and_says_so() {
    let mut app: AppService<MockStorage> =
        AppService::new(DeviceConfig::default(), PersistentStore::degraded());
    let mut board = MockBoard::new();
    let mut link = MockLink::new(false);
    let mut sink = RecordingSink::new();
    app.start(false, 0, &mut sink);

    board.advance(20);
    app.tick(&mut board, &mut link, &mut sink);
    assert!(!app.state().persistent);
    assert!(board.screen_text().contains(&"Storage: off".to_owned()));

    board.press_miss_you(true);
    board.advance(20);
    app.tick(&mut board, &mut link, &mut sink);
    assert_eq!(app.state().offline_events, 1);
    assert_eq!(app.state().stats.miss_you_presses, 1);
}

#[test]
fn failing_writes_do_not_block_the_tick() {
    let mut storage = MockStorage::new();
    storage.fail_writes = true;
    let mut rig = Rig::boot(DeviceConfig::default(), storage, true, MockLink::new(true));
    rig.step(20);
    rig.link.deliver(r#"{"text":"unsaved"}"#);
    rig.step(20);

    assert_eq!(rig.mode(), DisplayMode::Message);
    assert_eq!(rig.app.state().stats.messages_received, 1);
    assert!(rig.storage.get(NAMESPACE, KEY_LAST_MESSAGE).is_none());
}
