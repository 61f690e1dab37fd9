pub mod quote;
pub mod watchlist;
