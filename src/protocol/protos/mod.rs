//! Protocol Buffer definitions for Spirc frames.
//!
//! This module contains auto-generated Rust code from `spirc.proto`. It is
//! not meant to be used directly: [`Frame`](super::Frame) and friends wrap
//! the generated messages in closed, strongly-typed structures.
//!
//! # Wire Format
//!
//! Every Mercury message on a remote-control topic carries exactly one
//! serialized `spirc::Frame` as its sole payload part. Fields are `proto2`
//! optionals, so any of them may be absent on frames sent by other devices.
//!
//! # Code Generation
//!
//! The Rust code is generated during build using:
//! * `protobuf-codegen` compiler
//! * `.proto` source files in `protos/`
//! * Build configuration in `build.rs`
//!
//! Note: The generated code allows pedantic lints to avoid
//! warnings from the auto-generated implementations.

// Allow pedantic lints in generated code
#![allow(clippy::pedantic)]

// Include the generated Rust code from Protocol Buffers
include!(concat!(env!("OUT_DIR"), "/protos/mod.rs"));
