//! Client for the remote lead API (`/scrape`, `/status`, `/activate`, `/login`, `/logout`).
//!
//! [`LeadApi`] is the seam the session talks to; [`ApiClient`] implements it over any
//! [`HttpTransport`], with [`ReqwestTransport`] as the production transport.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{ApiClient, LeadApi};
pub use error::{ClientError, TransportError};
pub use transport::{API_KEY_HEADER, ApiRequest, HttpTransport, Method, RawResponse, ReqwestTransport};
pub use types::{AckResponse, ActivateResponse, ResetTimes, ScrapeResponse, StatusResponse};
