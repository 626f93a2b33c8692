//! Protocol-agnostic tool catalog and invocation contracts.
//!
//! The image generation server speaks MCP, but the catalog and dispatcher only
//! depend on the types in this crate. Transport crates convert at the edge.

pub mod dto;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod traits;

pub use dto::{ErrorKind, InvokeRequest, InvokeResult, ProtocolError, ToolSpec};
pub use traits::{ToolCatalog, ToolInvoker};
