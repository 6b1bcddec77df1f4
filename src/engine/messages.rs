use std::fmt;

use strum_macros::Display;

use crate::data::{CrossRateSnapshot, InstrumentHistory};

/// Identifies one fetch. Only the most recently issued ticket is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(pub u64);

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why the session asked for data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FetchReason {
    /// New instrument selection: instruments and cross rates.
    PrepareChart,
    /// Display currency needs edges the graph lacks: cross rates only.
    DisplayCurrency,
    /// Window start moved before the loaded range: instruments and cross rates.
    WindowExtension,
}

/// A request the caller must fulfil and hand back through `ChartSession::apply_response`.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub reason: FetchReason,
    /// Empty when only cross rates are needed.
    pub instrument_ids: Vec<String>,
    /// Currencies the cross rates must reach, besides those of the fetched instruments.
    pub currencies: Vec<String>,
    /// Earliest date wanted; `None` for the full history.
    pub from: Option<String>,
}

impl FetchRequest {
    pub fn wants_instruments(&self) -> bool {
        !self.instrument_ids.is_empty()
    }
}

/// The answer to a `FetchRequest`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchResponse {
    pub instruments: Vec<InstrumentHistory>,
    pub rates: CrossRateSnapshot,
}
