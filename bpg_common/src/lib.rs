pub mod helpers;
mod poisha;
mod secret;

pub use poisha::{Poisha, PoishaConversionError, BDT_CURRENCY_CODE};
pub use secret::Secret;
