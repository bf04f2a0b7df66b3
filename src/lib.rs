pub mod airport;
pub mod bitset;
pub mod date;
pub mod error;
pub mod ranking;
pub mod store;

pub use airport::{AirportCode, AirportIndex};
pub use error::CoreError;
pub use ranking::Destination;
pub use store::{Connection, BitMatrixStore, MAX_DAYS, MAX_STOPS};

use chrono::NaiveDate;

/// The public entry point: a bit-encoded connection index anchored to a
/// concrete calendar start date, plus the airport registry and ranking
/// engine underneath it.
///
/// `ConnectionIndex` does no I/O — loading connections from a file or
/// database, and serving them over HTTP, is the caller's job. This type
/// only ever sees dates and codes already parsed by the caller.
pub struct ConnectionIndex {
    store: BitMatrixStore,
    start_date: NaiveDate,
}

impl ConnectionIndex {
    /// Builds an empty index over the default `MAX_DAYS`-day horizon
    /// starting at `start_date`.
    pub fn init(start_date: NaiveDate) -> Self {
        Self::with_horizon(start_date, MAX_DAYS, MAX_STOPS)
    }

    /// Builds an empty index with an explicit horizon and stop ceiling.
    /// Panics if `max_stops` exceeds `MAX_STOPS` (see `BitMatrixStore::new`).
    pub fn with_horizon(start_date: NaiveDate, max_days: u16, max_stops: u8) -> Self {
        Self {
            store: BitMatrixStore::new(max_days, max_stops),
            start_date,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn store(&self) -> &BitMatrixStore {
        &self.store
    }

    /// Read-only accessor for the outbound bit-matrix store. See
    /// `BitMatrixStore::outbound` for the exact semantics.
    pub fn outbound(&self, arrival_day: u16, anchor: AirportIndex, stops: u8) -> &bitset::Bitset {
        self.store.outbound(arrival_day, anchor, stops)
    }

    /// Read-only accessor for the inbound bit-matrix store. See
    /// `BitMatrixStore::inbound` for the exact semantics.
    pub fn inbound(&self, departure_day: u16, anchor: AirportIndex, stops: u8) -> &bitset::Bitset {
        self.store.inbound(departure_day, anchor, stops)
    }

    /// Registers `code`, returning whether it was newly added.
    pub fn register_airport(&mut self, code: AirportCode) -> bool {
        self.store.register_airport(code)
    }

    pub fn index_of(&self, code: AirportCode) -> Option<AirportIndex> {
        self.store.registry().index_of(code)
    }

    pub fn code_of(&self, index: AirportIndex) -> AirportCode {
        self.store.registry().code_of(index)
    }

    /// Converts a calendar date to a day index relative to this index's
    /// `start_date`, validating that it falls within the configured horizon.
    pub fn day_index(&self, date: NaiveDate) -> Result<u16, CoreError> {
        let offset = date::day_offset(date, self.start_date);
        u16::try_from(offset)
            .ok()
            .filter(|&day| (day as usize) < self.store.max_days() as usize)
            .ok_or(CoreError::DateOutOfRange)
    }

    /// Stores a connection already expressed in day-index form. Prefer
    /// `set_connection` when working with calendar dates.
    pub fn set_connection_on(&mut self, connection: Connection) -> Result<(), CoreError> {
        self.store.set_connection(connection)
    }

    /// Stores a connection between `origin` and `destination`, departing on
    /// `departure_date` with `stops` intermediate stops, landing the same
    /// day (`arrives_next_day == false`) or the next day.
    #[allow(clippy::too_many_arguments)]
    pub fn set_connection(
        &mut self,
        origin: AirportCode,
        destination: AirportCode,
        departure_date: NaiveDate,
        stops: u8,
        arrives_next_day: bool,
    ) -> Result<(), CoreError> {
        let departure_day = self.day_index(departure_date)?;
        self.set_connection_on(Connection::new(
            origin,
            destination,
            departure_day,
            stops,
            arrives_next_day,
        ))
    }

    /// Ranks every registered airport as a candidate meeting destination for
    /// `origins` (airport code, weighted traveler count) given the meeting
    /// window `[meeting_start, meeting_end]` and shoulder-night tolerances on
    /// either side. `take` caps the returned list; `0` returns every
    /// candidate. See `ranking::rank` for the full algorithm.
    #[allow(clippy::too_many_arguments)]
    pub fn rank(
        &self,
        origins: &[(AirportCode, u64)],
        meeting_start: NaiveDate,
        meeting_end: NaiveDate,
        max_outbound_shoulder: u32,
        max_inbound_shoulder: u32,
        take: usize,
    ) -> Result<Vec<Destination>, CoreError> {
        let outbound_anchor_day = self.day_index(meeting_start)?;
        let inbound_anchor_day = self.day_index(meeting_end)?;
        ranking::rank(
            &self.store,
            origins,
            outbound_anchor_day,
            inbound_anchor_day,
            max_outbound_shoulder,
            max_inbound_shoulder,
            take,
        )
    }
}
