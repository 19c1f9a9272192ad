#![allow(dead_code)]

use chainkit::chain::{Chain, ChainBuilder};
use chainkit::clock::FixedClock;
use chainkit::config::ChainConfig;
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2024-01-01 0:00 UTC);

/// A chain built at a fixed instant with the default configuration.
pub fn fixed_chain() -> Chain {
    ChainBuilder::new(ChainConfig::default())
        .clock(FixedClock(NOW))
        .build()
        .expect("chain builds")
}

/// A chain valid right now, for verifiers that check against the wall clock.
pub fn current_chain() -> Chain {
    ChainBuilder::new(ChainConfig::default())
        .build()
        .expect("chain builds")
}
