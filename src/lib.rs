//! J-Club - research trailers for journal clubs
//!
//! Look up a paper by DOI, render its PDF into slides, record a narrated
//! screen capture of the presentation and publish the result to a shared
//! feed that every club member can browse.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Capture session state machine, paper metadata, feed naming, config
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (FFmpeg, CrossRef, pdftoppm, etc.)
//! - **CLI**: Command-line interface, argument parsing, and stop triggers

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
