// Domain types and value objects
mod bar;
mod issuer;
mod symbol;

// Re-export commonly used types to the world
pub use bar::{Bar, closes, is_chronological, normalize_series};
pub use issuer::IssuerInfo;
pub use symbol::{Symbol, SymbolPeriod};
