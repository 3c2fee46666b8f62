//! Typed - payload-typed capabilities.
//!
//! # Two layers
//! - **Typed**: `Payload` trait, `Handler<P>` trait - what capability authors write
//! - **Erased**: `Capability` trait object - what the registry stores
//!
//! `RegistryBuilder::register_typed` wires the two together.

pub mod handler;
pub mod payload;

pub use self::handler::{Handler, TypedCapability};
pub use self::payload::Payload;
