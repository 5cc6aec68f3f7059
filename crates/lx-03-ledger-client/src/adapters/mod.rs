//! # Adapters Layer (Outer Hexagon)

pub mod http;
pub mod scripted;

pub use http::HttpRpcTransport;
pub use scripted::{RecordedCall, ScriptedTransport};
