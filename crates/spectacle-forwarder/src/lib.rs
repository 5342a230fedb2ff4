//! Forwarding pipeline for Spectacle events.
//!
//! An [`Invocation`] carries the tag configuration, the event data, the
//! request headers and the visitor's cookies. [`Forwarder::handle`] runs it
//! through the consent gate, resolves identity and context, assembles one of
//! the four payload shapes and posts it to the collection endpoint, logging
//! the request and response along the way. Every invocation ends in exactly
//! one [`Outcome`].
//!
//! The outbound HTTP call goes through the [`HttpTransport`] trait;
//! [`ReqwestTransport`] is the production implementation.

pub mod assemble;
pub mod consent;
pub mod dispatch;
pub mod error;
pub mod forwarder;
pub mod outcome;
pub mod transport;

pub use assemble::assemble;
pub use consent::{consent_granted, is_measurement_probe, MEASUREMENT_PROBE_PREFIX};
pub use dispatch::{DispatchOptions, Dispatcher};
pub use error::{ForwardError, TransportError};
pub use forwarder::{Forwarder, Invocation};
pub use outcome::{Outcome, SkipReason};
pub use transport::{HttpTransport, OutboundRequest, OutboundResponse, ReqwestTransport};
