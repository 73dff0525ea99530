//! Fuzz target for dataset ingestion.
//!
//! This fuzzer tests that the CSV parser and the local analysis service:
//! 1. Never panic on malformed input
//! 2. Always produce previews whose rows match the header width
//! 3. Can profile whatever they managed to parse

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use prepper::backend::AnalysisService;
use prepper::input::Parser;
use prepper::{Dataset, LocalService, PreviewTable, Session};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    let _ = parser.parse_bytes(data, b',');
    let _ = parser.parse_bytes(data, b'\t');

    let service = LocalService::new();
    let dataset = Dataset::from_bytes("fuzz.csv", data);
    let Ok(id) = service.create_session(&dataset) else {
        return;
    };
    let session = Session::new(id, Arc::new(dataset));

    if let Ok(payload) = service.preview(&session, 10) {
        let table = PreviewTable::project(payload.columns, payload.data)
            .expect("local previews are rectangular");
        assert!(table.row_count() <= 10);
    }
    let _ = service.column_stats(&session);
});
