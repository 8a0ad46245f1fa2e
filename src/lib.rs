//! SoundRecorder - voice recording CLI
//!
//! This crate provides the core functionality for recording audio from an
//! input device into packaged (m4a/ogg/3gp) or lossless (wav) files, and for
//! browsing the resulting recordings library.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recording options, status state machine, device negotiation, library entries
//! - **Application**: The recording service and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, FFmpeg, WAV writer, filesystem, config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
