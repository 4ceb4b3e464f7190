//! JSON-RPC API Layer
//!
//! Query and mutation methods over the CRM store, served as JSON-RPC 2.0
//! over HTTP on localhost.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig};
