use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::config::Price;
use crate::domain::dated_point::Dated;

/// What the data source knows about a security or currency pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InstrumentInfo {
    pub id: String,
    pub name: String,
    /// Currency the raw price history is quoted in.
    pub currency: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TransactionKind {
    Buy,
    Sell,
    Dividend,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: String,
    pub kind: TransactionKind,
    pub quantity: f64,
    /// Price per unit in the instrument's currency.
    pub unit_price: Price,
}

impl Transaction {
    /// Signed change to the held quantity.
    pub fn holding_delta(&self) -> f64 {
        match self.kind {
            TransactionKind::Buy => self.quantity,
            TransactionKind::Sell => -self.quantity,
            TransactionKind::Dividend => 0.0,
        }
    }
}

impl Dated for Transaction {
    fn date(&self) -> &str {
        &self.date
    }
}

/// One entry of the chart selection: which instrument, and for which
/// holding (transactions are only shown for a concrete holding).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstrumentSelection {
    pub instrument_id: String,
    #[serde(default)]
    pub show_transactions: bool,
}

impl InstrumentSelection {
    pub fn new(instrument_id: impl Into<String>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            show_transactions: true,
        }
    }
}
