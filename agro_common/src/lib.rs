//! Types shared by the Agro Club payment engine and server.
mod secret;
mod tenge;

pub use secret::Secret;
pub use tenge::{Tenge, TengeConversionError, TENGE_CURRENCY_CODE};
