pub mod address;
pub mod quote;
pub mod token;

pub use address::Address;
pub use quote::{PriceQuote, ReferenceAssetPrice, UsdPrice};
pub use token::{PriceTable, TokenIdentity, TokenPrice, TokenRegistry};
