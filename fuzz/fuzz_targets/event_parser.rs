#![no_main]

use abtest::aggregate::Aggregator;
use abtest::events::parse_events;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Any document either fails to parse or aggregates without panicking
        if let Ok(events) = parse_events(input) {
            let aggregator = Aggregator::from_events(&events);
            for id in aggregator.experiment_ids() {
                let _ = aggregator.variant_results(id);
            }
        }
    }
});
