//! Support window computation for versioned libraries
//!
//! Decides which published releases of a fleet of libraries are currently
//! under maintenance: the newest minor lines of every major version that is
//! still inside its support window.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Source    │────▶│  Extractor  │────▶│  Registry   │
//! │ (pages)     │◀────│ (pass loop) │     │ (releases)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                       │         │
//!                       ▼         ▼
//!              ┌─────────────┐ ┌─────────────┐
//!              │   Policy    │ │   Support   │
//!              │ (N, M)      │ │ (engine)    │
//!              └─────────────┘ └─────────────┘
//! ```

pub mod config;
pub mod extract;
pub mod logging;
pub mod policy;
pub mod release;
pub mod report;
pub mod source;
pub mod support;
