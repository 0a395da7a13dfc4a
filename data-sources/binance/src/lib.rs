pub mod error;
pub mod protocol;
pub mod spot;

pub use error::Error;
pub use spot::BinanceClient;
