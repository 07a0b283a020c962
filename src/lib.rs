//! Currency conversion backed by cached central bank exchange rates.
//!
//! [`converter::Converter`] is what a web layer talks to: it converts amounts
//! between currency codes and lists the codes on offer. Rates come from a
//! [`core::RateSource`] and are kept in a [`core::TtlCache`] for the configured
//! time-to-live.

pub mod calculator;
pub mod converter;
pub mod core;
pub mod currency_list;
pub mod providers;

#[cfg(test)]
pub(crate) mod test_utils;

pub use converter::Converter;
