//! Fuzz target: inbound payloads through a full `AppService::tick`
//!
//! Each newline-separated chunk of the input is delivered as one payload
//! over a fake link. The service must never panic, whatever arrives.
//!
//! cargo fuzz run fuzz_inbound_tick

#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use pixelpal::animation::Bitmap;
use pixelpal::app::events::AppEvent;
use pixelpal::app::ports::{
    ClockPort, DisplayPort, EventSink, EyesCue, EyesPort, InputPort, LinkError, LinkPort,
    RandomPort, StorageError, StoragePort,
};
use pixelpal::app::service::AppService;
use pixelpal::config::DeviceConfig;
use pixelpal::interaction::InputLevels;
use pixelpal::link::InboundQueue;
use pixelpal::mood::Mood;
use pixelpal::store::PersistentStore;

struct Board(u64);

impl InputPort for Board {
    fn levels(&mut self) -> InputLevels {
        InputLevels::IDLE
    }
}

impl DisplayPort for Board {
    fn clear(&mut self) {}
    fn draw_text(&mut self, _x: u8, _y: u8, _size: u8, _text: &str) {}
    fn draw_bitmap(&mut self, _x: u8, _y: u8, _bitmap: &Bitmap) {}
    fn present(&mut self) {}
}

impl EyesPort for Board {
    fn advance(&mut self, _mood: Mood, _now_ms: u64) {}
    fn play_cue(&mut self, _cue: EyesCue) {}
}

impl ClockPort for Board {
    fn now_ms(&self) -> u64 {
        self.0
    }
    fn hour_of_day(&self) -> Option<u8> {
        None
    }
    fn delay_ms(&mut self, ms: u32) {
        self.0 += u64::from(ms);
    }
}

impl RandomPort for Board {
    fn next_u32(&mut self) -> u32 {
        7
    }
}

struct Link(VecDeque<String>);

impl LinkPort for Link {
    fn is_connected(&self) -> bool {
        true
    }
    fn poll(&mut self, inbox: &mut InboundQueue) {
        while let Some(p) = self.0.pop_front() {
            if inbox.push(&p).is_err() {
                break;
            }
        }
    }
    fn send(&mut self, _payload: &str) -> Result<(), LinkError> {
        Ok(())
    }
}

struct NoStorage;

impl StoragePort for NoStorage {
    fn read(&self, _ns: &str, _key: &str, _buf: &mut [u8]) -> Result<usize, StorageError> {
        Err(StorageError::NotFound)
    }
    fn write(&mut self, _ns: &str, _key: &str, _data: &[u8]) -> Result<(), StorageError> {
        Ok(())
    }
    fn delete(&mut self, _ns: &str, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
    fn exists(&self, _ns: &str, _key: &str) -> bool {
        false
    }
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut link = Link(text.split('\n').map(str::to_owned).collect());
    let mut board = Board(0);
    let mut sink = Discard;

    let mut app = AppService::new(DeviceConfig::default(), PersistentStore::new(NoStorage));
    app.start(true, 0, &mut sink);
    while !link.0.is_empty() {
        board.0 += 20;
        app.tick(&mut board, &mut link, &mut sink);
    }
});
