//! Core pipeline for the conversational map assistant.
//!
//! A request flows through two stages. The [`resolver::RegionResolver`] turns
//! conversation context into a known region record (or a "not found"
//! sentinel) via LLM extraction, embedding, similarity search, and a
//! disambiguation call. The [`agent::Agent`] then drives the generation
//! model in a bounded tool-use loop, with a tool schema rebuilt per request
//! from the resolved sub-region list, and returns the full transcript.
//!
//! All external collaborators (generation model, embedding service,
//! similarity index, region catalog, web search) sit behind traits and are
//! injected, so the pipeline is testable with scripted doubles.
pub mod agent;
pub mod catalog;
pub mod embedding;
pub mod errors;
pub mod index;
pub mod models;
pub mod prompts;
pub mod providers;
pub mod resolver;
pub mod schema;
pub mod search;
