//! SSH tunnel to the internal SMS gateway
//!
//! The gateway is reachable only through an SSH jump host. This module keeps
//! one authenticated session to that host alive ([`TunnelConnection`]) and
//! performs hand-framed HTTP/1.1 exchanges over forwarded channels
//! ([`TunnelHttpExchange`]).

pub mod connection;
pub mod error;
pub mod exchange;
mod handler;

pub use connection::{TunnelConnection, TunnelSession};
pub use error::TunnelError;
pub use exchange::{GatewayRequest, GatewayResponse, TunnelHttpExchange};
