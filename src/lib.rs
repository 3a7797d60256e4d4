#![doc(test(attr(deny(warnings))))]

//! Catering Core is the back end of a catering delivery business: directory
//! entities, daily orders keyed by bag formats, invoices, payments and the
//! report calculations behind a JSON HTTP API.

pub mod bag_format;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod http;
pub mod storage;
pub mod utils;
