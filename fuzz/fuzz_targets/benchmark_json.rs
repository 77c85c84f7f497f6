#![no_main]

use benchwatch::ingest::{merge_samples, parse_benchmark_json};
use benchwatch::regression::BenchmarkSet;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Arbitrary result-file contents must never panic the parser
        if let Ok(samples) = parse_benchmark_json(input, "real_time", Path::new("fuzz.json")) {
            let mut set = BenchmarkSet::new();
            merge_samples(&mut set, samples);
        }
    }
});
