pub mod cbr;

pub use cbr::CbrDailyProvider;
