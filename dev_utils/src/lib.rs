use chrono::NaiveDate;
use meetpoint::{AirportCode, ConnectionIndex, MAX_DAYS, MAX_STOPS};

// Synthetic scenario data for the benchmarks, since there is no "melbourne.zip"
// equivalent for an airport-connection graph — fixtures are generated instead of loaded.

pub fn get_example_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid constant date")
}

fn airport_code(index: u32) -> AirportCode {
    let letters = [
        b'A' + (index / (26 * 26)) as u8 % 26,
        b'A' + (index / 26) as u8 % 26,
        b'A' + index as u8 % 26,
    ];
    AirportCode::new(std::str::from_utf8(&letters).unwrap()).unwrap()
}

/// Builds a synthetic `ConnectionIndex` with `airport_count` airports and
/// `connection_count` randomly placed connections across the default
/// horizon, seeded for reproducible benchmark runs.
pub fn build_example_index(airport_count: u32, connection_count: u32, seed: u64) -> ConnectionIndex {
    let rng = fastrand::Rng::with_seed(seed);
    let start_date = get_example_start_date();
    let mut index = ConnectionIndex::init(start_date);

    let codes: Vec<AirportCode> = (0..airport_count).map(airport_code).collect();
    for &code in &codes {
        index.register_airport(code);
    }

    for _ in 0..connection_count {
        let origin = codes[rng.usize(0..codes.len())];
        let mut destination = codes[rng.usize(0..codes.len())];
        while destination == origin {
            destination = codes[rng.usize(0..codes.len())];
        }
        let departure_day = rng.u16(0..MAX_DAYS - 1);
        let stops = rng.u8(0..=MAX_STOPS);
        let arrives_next_day = rng.bool();
        // Randomly placed connections can collide with the horizon boundary
        // or repeat an existing bit; both are harmless no-ops for a bench fixture.
        let _ = index.set_connection_on(meetpoint::Connection::new(
            origin,
            destination,
            departure_day,
            stops,
            arrives_next_day,
        ));
    }

    index
}

/// A representative weighted-origins query against `build_example_index`'s
/// default 200-airport / 4000-connection scenario.
pub fn get_example_scenario() -> (ConnectionIndex, Vec<(AirportCode, u64)>, NaiveDate, NaiveDate) {
    let index = build_example_index(200, 4000, 42);
    let rng = fastrand::Rng::with_seed(7);
    let origins = (0..10)
        .map(|_| (airport_code(rng.u32(0..200)), rng.u64(1..=20)))
        .collect();
    let start = get_example_start_date();
    let meeting_start = start + chrono::Duration::days(30);
    let meeting_end = start + chrono::Duration::days(33);
    (index, origins, meeting_start, meeting_end)
}
