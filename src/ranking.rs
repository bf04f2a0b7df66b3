use std::collections::HashMap;

use crate::airport::{AirportCode, AirportIndex};
use crate::bitset::Bitset;
use crate::error::CoreError;
use crate::store::BitMatrixStore;

/// A scored candidate meeting destination.
///
/// Field names are part of the stable contract consumed by whatever
/// serialization layer sits above this crate — do not rename them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    pub code: AirportCode,
    pub available_origins: u32,
    pub total_stops: u64,
    pub unavailable_outbound_origins: Vec<AirportCode>,
    pub unavailable_inbound_origins: Vec<AirportCode>,
    pub outbound_shoulder_nights: u64,
    pub inbound_shoulder_nights: u64,
}

/// Selects which side of the store a shoulder-day walk reads from, and which
/// direction its shoulder days move in relative to the anchor day.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    fn tier<'a>(self, store: &'a BitMatrixStore, day: u16, anchor: AirportIndex, stops: u8) -> &'a Bitset {
        match self {
            Direction::Outbound => store.outbound(day, anchor, stops),
            Direction::Inbound => store.inbound(day, anchor, stops),
        }
    }

    /// The day to probe at shoulder distance `j` from `anchor_day`: earlier
    /// for outbound (arrive before the meeting starts), later for inbound
    /// (depart after the meeting ends). `None` on underflow/overflow.
    fn shoulder_day(self, anchor_day: u16, j: u32) -> Option<u16> {
        let j = u16::try_from(j).ok()?;
        match self {
            Direction::Outbound => anchor_day.checked_sub(j),
            Direction::Inbound => anchor_day.checked_add(j),
        }
    }
}

fn union_tiers(store: &BitMatrixStore, dir: Direction, day: u16, anchor: AirportIndex) -> Bitset {
    let mut union = dir.tier(store, day, anchor, 0).clone();
    union.or_with(dir.tier(store, day, anchor, 1));
    union.or_with(dir.tier(store, day, anchor, 2));
    union
}

/// Weights `mask`'s new coverage across stop tiers so that an origin already
/// reachable with fewer stops is never counted again at a higher tier.
fn stops_score(
    store: &BitMatrixStore,
    dir: Direction,
    day: u16,
    anchor: AirportIndex,
    mask: &Bitset,
    universe: usize,
) -> u64 {
    let direct = dir.tier(store, day, anchor, 0);
    let direct_not_served = direct.not_and(universe, mask);

    let one_stop_tier = dir.tier(store, day, anchor, 1);
    let one_stop = one_stop_tier.and(&direct_not_served);
    let not_one_stop = one_stop_tier.complement(universe);

    let two_stop_tier = dir.tier(store, day, anchor, 2);
    let two_stop = two_stop_tier.and(&direct_not_served).and(&not_one_stop);

    one_stop.count_ones() as u64 + 2 * two_stop.count_ones() as u64
}

struct SideResult {
    count: u32,
    stops: u64,
    shoulder_nights: u64,
    available: Bitset,
}

/// Walks the shoulder days on one side (outbound or inbound) of a candidate
/// airport, progressively widening `available` and shrinking the set of
/// still-unsatisfied origins, mirroring the teacher's round-based RAPTOR
/// walk over a shrinking marked-stops set.
#[allow(clippy::too_many_arguments)]
fn accumulate_side(
    store: &BitMatrixStore,
    dir: Direction,
    anchor_day: u16,
    candidate: AirportIndex,
    origins_vector: &Bitset,
    universe: usize,
    n: u32,
    max_shoulder: u32,
    weight_by_index: &HashMap<AirportIndex, u64>,
) -> Result<SideResult, CoreError> {
    let mut available = union_tiers(store, dir, anchor_day, candidate);
    let mut count = available.and(origins_vector).count_ones();
    let mut stops = stops_score(store, dir, anchor_day, candidate, origins_vector, universe);
    let mut shoulder_nights = 0u64;

    if count < n && max_shoulder > 0 {
        for j in 1..=max_shoulder {
            if count >= n {
                break;
            }
            let day = dir
                .shoulder_day(anchor_day, j)
                .ok_or(CoreError::DateOutOfRange)?;
            if day as usize >= store.max_days() as usize {
                return Err(CoreError::DateOutOfRange);
            }

            let layer = union_tiers(store, dir, day, candidate);
            let needed = available.not_and(universe, origins_vector);
            stops += stops_score(store, dir, day, candidate, &needed, universe);

            let satisfied_now = layer.and(&needed);
            for index in satisfied_now.iter_ones() {
                let weight = weight_by_index
                    .get(&(index as AirportIndex))
                    .copied()
                    .unwrap_or(0);
                shoulder_nights += weight * j as u64;
            }
            count += satisfied_now.count_ones();
            available.or_with(&layer);
        }
    }

    Ok(SideResult {
        count,
        stops,
        shoulder_nights,
        available,
    })
}

/// Scores every registered airport against `origins` for the meeting window
/// `[outbound_anchor_day, inbound_anchor_day]`, walking up to
/// `max_outbound_shoulder`/`max_inbound_shoulder` shoulder days on either
/// side, then sorts descending by `available_origins` (stable, so ties keep
/// registration order) and truncates to `take` (0 meaning "all").
///
/// `N`, the loop's unsatisfied-origin predicate bound, is `origins.len()` as
/// given — not the deduplicated cardinality of the folded origins map. This
/// is a deliberate, documented choice (see DESIGN.md), not an oversight:
/// unknown origin codes keep the shoulder-day loop running even though they
/// can never be satisfied.
pub fn rank(
    store: &BitMatrixStore,
    origins: &[(AirportCode, u64)],
    outbound_anchor_day: u16,
    inbound_anchor_day: u16,
    max_outbound_shoulder: u32,
    max_inbound_shoulder: u32,
    take: usize,
) -> Result<Vec<Destination>, CoreError> {
    store.validate_day(outbound_anchor_day)?;
    store.validate_day(inbound_anchor_day)?;

    let registry = store.registry();
    let universe = registry.len();
    let n = origins.len() as u32;

    // Fold duplicates: last write wins.
    let mut weight_by_code: HashMap<AirportCode, u64> = HashMap::with_capacity(origins.len());
    for &(code, count) in origins {
        weight_by_code.insert(code, count);
    }

    let mut origins_vector = Bitset::new();
    let mut weight_by_index: HashMap<AirportIndex, u64> = HashMap::with_capacity(weight_by_code.len());
    for (code, count) in &weight_by_code {
        match registry.index_of(*code) {
            Some(index) => {
                origins_vector.set(index as usize);
                weight_by_index.insert(index, *count);
            }
            None => log::trace!("dropping unknown origin {code} from the ranking query"),
        }
    }

    let mut destinations = Vec::with_capacity(universe);
    for candidate in 0..universe as AirportIndex {
        let out = accumulate_side(
            store,
            Direction::Outbound,
            outbound_anchor_day,
            candidate,
            &origins_vector,
            universe,
            n,
            max_outbound_shoulder,
            &weight_by_index,
        )?;
        let inn = accumulate_side(
            store,
            Direction::Inbound,
            inbound_anchor_day,
            candidate,
            &origins_vector,
            universe,
            n,
            max_inbound_shoulder,
            &weight_by_index,
        )?;

        let mut unavailable_outbound = out.available.not_and(universe, &origins_vector);
        unavailable_outbound.clear(candidate as usize);
        let mut unavailable_inbound = inn.available.not_and(universe, &origins_vector);
        unavailable_inbound.clear(candidate as usize);

        destinations.push(Destination {
            code: registry.code_of(candidate),
            available_origins: out.count + inn.count,
            total_stops: out.stops + inn.stops,
            unavailable_outbound_origins: unavailable_outbound
                .iter_ones()
                .map(|i| registry.code_of(i as AirportIndex))
                .collect(),
            unavailable_inbound_origins: unavailable_inbound
                .iter_ones()
                .map(|i| registry.code_of(i as AirportIndex))
                .collect(),
            outbound_shoulder_nights: out.shoulder_nights,
            inbound_shoulder_nights: inn.shoulder_nights,
        });
    }

    destinations.sort_by(|a, b| b.available_origins.cmp(&a.available_origins));
    if take > 0 {
        destinations.truncate(take);
    }

    log::debug!(
        "ranked {} candidates for {} origins, returning {}",
        universe,
        origins.len(),
        destinations.len()
    );

    Ok(destinations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::airport::AirportCode;
    use crate::store::{Connection, MAX_DAYS, MAX_STOPS};

    fn code(s: &str) -> AirportCode {
        AirportCode::new(s).unwrap()
    }

    fn fixture_store() -> BitMatrixStore {
        let mut store = BitMatrixStore::new(MAX_DAYS, MAX_STOPS);
        let aaa = code("AAA");
        let bbb = code("BBB");
        let ccc = code("CCC");
        let ddd = code("DDD");

        // No explicit pre-registration: airports are registered in the order
        // `set_connection` first sees them (AAA, CCC, DDD, BBB), matching the
        // registration order `tests/ranking_end_to_end.rs` and the spec's
        // worked example assume.
        //
        // Day offsets relative to a 2025-01-01 start date, matching the
        // worked example in the spec (day 8 = 2025-01-09, etc).
        store
            .set_connection(Connection::new(aaa, ccc, 8, 2, false))
            .unwrap();
        store
            .set_connection(Connection::new(aaa, ddd, 9, 0, false))
            .unwrap();
        store
            .set_connection(Connection::new(bbb, ccc, 9, 1, false))
            .unwrap();
        store
            .set_connection(Connection::new(ccc, aaa, 14, 1, false))
            .unwrap();
        store
            .set_connection(Connection::new(ddd, aaa, 14, 0, false))
            .unwrap();
        store
            .set_connection(Connection::new(ccc, bbb, 15, 0, false))
            .unwrap();
        store
    }

    #[test]
    fn worked_example_matches_spec() {
        let store = fixture_store();
        let origins = [(code("AAA"), 2), (code("BBB"), 1), (code("CCC"), 1)];

        let results = rank(&store, &origins, 9, 14, 1, 1, 0).unwrap();

        let by_code: HashMap<_, _> = results.iter().map(|d| (d.code, d.clone())).collect();

        let ccc = &by_code[&code("CCC")];
        assert_eq!(ccc.available_origins, 4);
        assert_eq!(ccc.total_stops, 4);
        assert_eq!(ccc.outbound_shoulder_nights, 2);
        assert_eq!(ccc.inbound_shoulder_nights, 1);
        assert!(ccc.unavailable_outbound_origins.is_empty());
        assert!(ccc.unavailable_inbound_origins.is_empty());

        let ddd = &by_code[&code("DDD")];
        assert_eq!(ddd.available_origins, 2);
        assert_eq!(ddd.total_stops, 0);
        assert_eq!(ddd.unavailable_outbound_origins, vec![code("CCC"), code("BBB")]);
        assert_eq!(ddd.unavailable_inbound_origins, vec![code("CCC"), code("BBB")]);

        let aaa = &by_code[&code("AAA")];
        assert_eq!(aaa.available_origins, 0);
        assert_eq!(aaa.unavailable_outbound_origins, vec![code("CCC"), code("BBB")]);

        let bbb = &by_code[&code("BBB")];
        assert_eq!(bbb.available_origins, 0);
        assert_eq!(bbb.unavailable_outbound_origins, vec![code("AAA"), code("CCC")]);

        // P6: sorted descending by available_origins.
        assert_eq!(
            results.iter().map(|d| d.code).collect::<Vec<_>>(),
            vec![code("CCC"), code("DDD"), code("AAA"), code("BBB")]
        );
    }

    #[test]
    fn take_truncates() {
        let store = fixture_store();
        let origins = [(code("AAA"), 2), (code("BBB"), 1), (code("CCC"), 1)];
        let results = rank(&store, &origins, 9, 14, 1, 1, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].code, code("CCC"));
        assert_eq!(results[1].code, code("DDD"));
    }

    #[test]
    fn unknown_origin_codes_are_dropped_but_still_counted_in_n() {
        let store = fixture_store();
        // ZZZ was never registered.
        let origins = [(code("AAA"), 2), (code("ZZZ"), 5)];
        let results = rank(&store, &origins, 9, 14, 0, 0, 0).unwrap();
        // Should not panic and should not include ZZZ anywhere.
        for destination in &results {
            assert!(!destination.unavailable_outbound_origins.contains(&code("ZZZ")));
            assert!(!destination.unavailable_inbound_origins.contains(&code("ZZZ")));
        }
    }

    #[test]
    fn empty_store_returns_empty_list() {
        let store = BitMatrixStore::new(MAX_DAYS, MAX_STOPS);
        let results = rank(&store, &[], 0, 0, 0, 0, 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn duplicate_origin_codes_last_write_wins_p8() {
        let mut store = BitMatrixStore::new(MAX_DAYS, MAX_STOPS);
        let aaa = code("AAA");
        let bbb = code("BBB");
        store.register_airport(aaa);
        store.register_airport(bbb);
        // BBB reachable from AAA only via a 1-day shoulder.
        store
            .set_connection(Connection::new(aaa, bbb, 9, 0, false))
            .unwrap();

        // AAA appears twice; the second weight (9) should win, not a sum.
        let origins = [(aaa, 1), (aaa, 9)];
        let results = rank(&store, &origins, 10, 10, 1, 0, 0).unwrap();
        let bbb_result = results.iter().find(|d| d.code == bbb).unwrap();
        assert_eq!(bbb_result.outbound_shoulder_nights, 9);
    }

    #[test]
    fn monotone_coverage_p5() {
        let store = fixture_store();
        let origins = [(code("AAA"), 2), (code("BBB"), 1), (code("CCC"), 1)];

        let narrow = rank(&store, &origins, 9, 14, 0, 0, 0).unwrap();
        let wide = rank(&store, &origins, 9, 14, 1, 1, 0).unwrap();

        let narrow_by_code: HashMap<_, _> = narrow.iter().map(|d| (d.code, d.available_origins)).collect();
        for destination in &wide {
            let narrow_count = narrow_by_code[&destination.code];
            assert!(destination.available_origins >= narrow_count);
        }
    }

    #[test]
    fn self_elimination_p4() {
        let store = fixture_store();
        let origins = [(code("AAA"), 1), (code("CCC"), 1)];
        let results = rank(&store, &origins, 9, 14, 1, 1, 0).unwrap();
        let ccc = results.iter().find(|d| d.code == code("CCC")).unwrap();
        assert!(!ccc.unavailable_outbound_origins.contains(&code("CCC")));
        assert!(!ccc.unavailable_inbound_origins.contains(&code("CCC")));
    }

    #[test]
    fn date_out_of_range_on_shoulder_underflow() {
        let store = fixture_store();
        let origins = [(code("AAA"), 1)];
        // Anchor day 0 with a shoulder of 1 day underflows below day 0.
        let err = rank(&store, &origins, 0, 0, 1, 0, 0).unwrap_err();
        assert_eq!(err, CoreError::DateOutOfRange);
    }

    #[test]
    fn date_out_of_range_on_anchor_day_itself() {
        let store = fixture_store();
        let origins = [(code("AAA"), 1)];
        // `rank` is called here directly, bypassing `ConnectionIndex::day_index`'s
        // validation, so an out-of-horizon anchor day must still be rejected
        // rather than panicking on an out-of-bounds store index.
        let err = rank(&store, &origins, MAX_DAYS, 0, 0, 0, 0).unwrap_err();
        assert_eq!(err, CoreError::DateOutOfRange);
        let err = rank(&store, &origins, 0, MAX_DAYS, 0, 0, 0).unwrap_err();
        assert_eq!(err, CoreError::DateOutOfRange);
    }
}
