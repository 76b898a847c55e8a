pub mod ledger;
pub mod sequencer;

pub use ledger::{Ledger, MAX_AMOUNT, MAX_GST_RATE};
pub use sequencer::{can_follow, next_invoice_number};
