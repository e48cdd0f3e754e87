pub mod fsutils;
pub mod time;
pub mod workers;
