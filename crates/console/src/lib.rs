//! Administrative console for the Redis tool proxy.
//!
//! Panels hold per-operation input and call state, `output` renders results
//! the same way for every front-end, and `client` talks to the `/trpc` link.

pub mod client;
pub mod output;
pub mod panels;

pub use client::{ClientError, RpcClient};
pub use output::Output;
pub use panels::{Answer, Call, Confirmation, ReadPanel, WritePanel};
