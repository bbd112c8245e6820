//! Radio Abstractions
//!
//! Everything the demos need to know about the transceiver: the driver
//! seam, the PHY parameter sets, and the payload buffers.

pub mod link;
pub mod payload;
pub mod settings;
