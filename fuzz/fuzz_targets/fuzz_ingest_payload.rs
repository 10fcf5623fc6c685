//! Fuzz target: broker payload ingestion
//!
//! Feeds arbitrary bytes to both subscribed topics and verifies:
//! - No panics on any input
//! - A rejected payload leaves the store untouched
//! - Rolls never hold more than five populated slots
//!
//! cargo fuzz run fuzz_ingest_payload

#![no_main]

use libfuzzer_sys::fuzz_target;
use wxpanel::ingest::{self, InboundMessage, TOPIC_ALERT, TOPIC_WEATHER};
use wxpanel::telemetry::{ROLL_LEN, TelemetryStore};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let topic = if selector & 1 == 0 { TOPIC_WEATHER } else { TOPIC_ALERT };

    let mut store = TelemetryStore::default();
    let msg = InboundMessage::new(topic, payload);
    match ingest::dispatch(&mut store, &msg) {
        Ok(_) => {
            assert!(store.forecast().populated() <= ROLL_LEN);
            assert!(store.history().populated() <= ROLL_LEN);
        }
        Err(_) => {
            assert!(store.weather().is_none());
            assert!(store.alert().is_none());
            assert_eq!(store.forecast().populated(), 0);
        }
    }
});
