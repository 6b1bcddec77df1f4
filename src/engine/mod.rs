mod core;
mod messages;
mod state;

pub use self::core::{ChartSession, SessionUpdate};
pub use messages::{FetchReason, FetchRequest, FetchResponse, FetchTicket};
pub use state::{ChartSettings, InstrumentSettings};
