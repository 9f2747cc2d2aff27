#![doc = "convert-bucket-core: core logic library for convert-bucket."]

//! This crate holds everything that decides *what* happens to an uploaded
//! object: the upload event model, key decoding, classification, credential
//! parsing, part-wise uploads and the dispatcher that drives a conversion.
//! Cloud SDK clients and the HTTP conversion client live in the `convert-bucket` binary crate
//! and plug in through the traits in [`contract`].

pub mod classify;
pub mod config;
pub mod contract;
pub mod credential;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod upload;
