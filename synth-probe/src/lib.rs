#![deny(rust_2018_idioms)]
#![deny(clippy::correctness)]
#![deny(clippy::perf)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cdc;
pub mod config;
pub mod consumer;
pub mod error;
pub mod preview;
pub mod probe;
pub mod record;
pub mod store;
