//! # Ports Layer
//!
//! - **Inbound (Driving)**: API the custody contract calls into

pub mod inbound;
