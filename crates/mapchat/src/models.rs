//! Internal data model for the pipeline.
//!
//! Several wire formats meet here: the front-end chat payload (plain string
//! content), the Anthropic messages API (typed content blocks), and the
//! similarity index metadata. Incoming data is converted into these structs
//! at the boundary and everything downstream works with them directly. The
//! content block shapes intentionally serialize to the Anthropic block format
//! so a transcript can be returned to the client as-is.
pub mod message;
pub mod region;
pub mod role;
pub mod tool;
