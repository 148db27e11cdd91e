//! Decoding of remote API responses
//!
//! # Error Handling Strategy
//!
//! Responses are decoded leniently at the field level and strictly at the envelope level:
//!
//! - **Field level**: Lead and usage fields tolerate blanks, nulls, numbers-as-strings and
//!   list-valued opening hours (see [`deserializers`]). A quirky field never drops a row.
//!
//! - **Envelope level**: Status code, `error` key and JSON validity decide the outcome class
//!   (see [`response::check_response`]). An undecodable body is reported with a short raw
//!   snippet so the user can see what the server actually said.

pub mod deserializers;
pub mod response;

pub use response::{check_response, decode};
