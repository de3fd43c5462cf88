//! Matching logic
//!
//! Crossing decides whether an incoming order accepts a maker price; the
//! executor turns an accepted cross into a priced, fee-carrying trade record.

pub mod crossing;
pub mod executor;
