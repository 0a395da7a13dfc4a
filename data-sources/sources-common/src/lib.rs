pub mod symbol;

pub use symbol::{ParseSymbolError, Symbol};
