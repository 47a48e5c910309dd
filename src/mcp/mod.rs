//! MCP (Model Context Protocol) server for grademap.
//!
//! Exposes the query engine's operations as MCP tools that can be invoked
//! by AI assistants. The server runs over stdio and provides:
//!
//! - `search_courses`: ranked multi-criteria course search
//! - `get_grades_of_a_course`: grade report for one course
//! - `search_professors`: ranked professor search
//! - `get_grades_of_a_professor`: grade report for one professor
//! - `get_liberal_education_courses`: courses satisfying a requirement
//! - `get_abbreviations_and_terms`: department/term code listing
//!
//! # Architecture
//!
//! ```text
//! MCP Request → query engine → MCP Response
//!     ↓             ↓              ↓
//! JSON-RPC     plan/filter     JSON-RPC
//! over stdio   rank/aggregate  over stdio
//! ```
//!
//! Every tool is a pure read over the immutable catalog snapshot, so the
//! handler can serve arbitrary concurrent requests without locking.

mod server;

pub use server::GradesServer;
