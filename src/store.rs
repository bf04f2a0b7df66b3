use crate::airport::{AirportCode, AirportIndex, AirportRegistry};
use crate::bitset::Bitset;
use crate::error::CoreError;

/// Default horizon, in days, from the store's start date. Overridable at
/// construction (`BitMatrixStore::new`), but this is the value the facade
/// defaults to.
pub const MAX_DAYS: u16 = 360;

/// Hard ceiling on intermediate stops — a Non-goal, not a tunable. Bounds
/// both the default and any override passed to `BitMatrixStore::new`.
pub const MAX_STOPS: u8 = 2;

/// Number of stop tiers a connection can fall into: direct, one-stop, two-stop.
const STOP_TIERS: usize = MAX_STOPS as usize + 1;

/// A single stored connection: a flight from `origin` to `destination`
/// departing on day `departure_day` with `stops` intermediate stops, landing
/// the same day (`arrives_next_day == false`) or the day after.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    pub origin: AirportCode,
    pub destination: AirportCode,
    pub departure_day: u16,
    pub stops: u8,
    pub arrives_next_day: bool,
}

impl Connection {
    pub fn new(
        origin: AirportCode,
        destination: AirportCode,
        departure_day: u16,
        stops: u8,
        arrives_next_day: bool,
    ) -> Self {
        Self {
            origin,
            destination,
            departure_day,
            stops,
            arrives_next_day,
        }
    }

    fn arrival_day(&self) -> Option<u16> {
        self.departure_day.checked_add(self.arrives_next_day as u16)
    }
}

/// The bit-encoded connection index: an airport registry plus two parallel
/// 3-D arrays of bit vectors, `outbound[day][anchor][stops]` and
/// `inbound[day][anchor][stops]`, as described in the data model. Append-only
/// and idempotent: setting an already-set bit is a no-op.
pub struct BitMatrixStore {
    max_days: u16,
    max_stops: u8,
    registry: AirportRegistry,
    // outbound[arrival_day][destination_index][stops] -> bit set per origin index
    outbound: Vec<Vec<[Bitset; STOP_TIERS]>>,
    // inbound[departure_day][origin_index][stops] -> bit set per destination index
    inbound: Vec<Vec<[Bitset; STOP_TIERS]>>,
}

impl BitMatrixStore {
    /// Builds an empty store with the given horizon. Panics if `max_stops`
    /// exceeds the compile-time ceiling of `MAX_STOPS` — that ceiling is a
    /// Non-goal, not something a caller can opt out of.
    pub fn new(max_days: u16, max_stops: u8) -> Self {
        assert!(
            max_stops <= MAX_STOPS,
            "max_stops ({max_stops}) exceeds the supported ceiling of {MAX_STOPS}"
        );
        Self {
            max_days,
            max_stops,
            registry: AirportRegistry::new(),
            outbound: vec![Vec::new(); max_days as usize],
            inbound: vec![Vec::new(); max_days as usize],
        }
    }

    pub fn max_days(&self) -> u16 {
        self.max_days
    }

    pub fn max_stops(&self) -> u8 {
        self.max_stops
    }

    pub fn registry(&self) -> &AirportRegistry {
        &self.registry
    }

    /// Registers `code`, extending every day/stop cell of both stores by one
    /// anchor-airport slot (each initialized to the empty bit vector) if the
    /// code is newly seen. Returns whether it was newly added.
    pub fn register_airport(&mut self, code: AirportCode) -> bool {
        let (_, newly_added) = self.registry.register(code);
        if newly_added {
            let empty_cell = || std::array::from_fn(|_| Bitset::new());
            for day in self.outbound.iter_mut().chain(self.inbound.iter_mut()) {
                day.push(empty_cell());
            }
        }
        newly_added
    }

    /// Validates that `day` falls within `[0, max_days)`. Exposed so callers
    /// above the store (the ranking engine's anchor-day arguments) can reuse
    /// the same check instead of re-deriving it.
    pub fn validate_day(&self, day: u16) -> Result<(), CoreError> {
        if (day as usize) < self.max_days as usize {
            Ok(())
        } else {
            Err(CoreError::DateOutOfRange)
        }
    }

    /// Stores `connection`. Validates stops and both day indices *before*
    /// registering either airport, so a failed call never mutates the
    /// registry or either store.
    pub fn set_connection(&mut self, connection: Connection) -> Result<(), CoreError> {
        if connection.stops > self.max_stops {
            return Err(CoreError::InvalidStops(connection.stops));
        }
        self.validate_day(connection.departure_day)?;
        let arrival_day = connection.arrival_day().ok_or(CoreError::DateOutOfRange)?;
        self.validate_day(arrival_day)?;

        self.register_airport(connection.origin);
        self.register_airport(connection.destination);

        let origin_idx = self
            .registry
            .index_of(connection.origin)
            .expect("origin was just registered");
        let dest_idx = self
            .registry
            .index_of(connection.destination)
            .expect("destination was just registered");

        self.outbound[arrival_day as usize][dest_idx as usize][connection.stops as usize]
            .set(origin_idx as usize);
        self.inbound[connection.departure_day as usize][origin_idx as usize]
            [connection.stops as usize]
            .set(dest_idx as usize);

        Ok(())
    }

    /// Low-level read accessor: the bit vector of origin indices with a
    /// connection arriving at `anchor` on day `arrival_day` with `stops`
    /// intermediate stops.
    pub fn outbound(&self, arrival_day: u16, anchor: AirportIndex, stops: u8) -> &Bitset {
        &self.outbound[arrival_day as usize][anchor as usize][stops as usize]
    }

    /// Low-level read accessor: the bit vector of destination indices with a
    /// connection departing `anchor` on day `departure_day` with `stops`
    /// intermediate stops.
    pub fn inbound(&self, departure_day: u16, anchor: AirportIndex, stops: u8) -> &Bitset {
        &self.inbound[departure_day as usize][anchor as usize][stops as usize]
    }
}
