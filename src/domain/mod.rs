// Domain types and value objects
mod dated_point;
mod error;
mod instrument;

pub use dated_point::{Dated, DatedPoint, OhlcPoint, PricePoint};
pub use error::ChartError;
pub use instrument::{InstrumentInfo, InstrumentSelection, Transaction, TransactionKind};
