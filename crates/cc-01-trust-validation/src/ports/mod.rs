//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that signature verification and the
//!   custody contract call into

pub mod inbound;
