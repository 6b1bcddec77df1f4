use std::{error::Error, fmt};

/// Domain failures the chart core can report. Everything else degrades
/// to a visibly incomplete chart instead of erroring.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartError {
    /// A cross-rate edge whose two currencies are identical.
    SelfPairEdge(String),
    InvalidDate(String),
    TooManyInstruments { requested: usize, max: usize },
    NoInstruments,
    UnknownInstrument(String),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChartError::SelfPairEdge(ccy) => {
                write!(f, "Cross rate edge must join two currencies, got {ccy}/{ccy}")
            }
            ChartError::InvalidDate(raw) => write!(f, "Invalid date key: {:?}", raw),
            ChartError::TooManyInstruments { requested, max } => write!(
                f,
                "Too many instruments: {} requested, at most {} can be plotted",
                requested, max
            ),
            ChartError::NoInstruments => write!(f, "No instrument selected"),
            ChartError::UnknownInstrument(id) => write!(f, "Unknown instrument: {}", id),
        }
    }
}

impl Error for ChartError {}
