//! Remote control of Spotify Connect devices over Spirc.
//!
//! A [`remote::Controller`] joins the remote-control topics of a user on an
//! existing [`session::Session`], discovers the devices that announce
//! themselves there and sends them playback commands.
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
// TODO : add documentation
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod config;
pub mod error;
pub mod mercury;
pub mod protocol;
mod receiver;
pub mod registry;
pub mod remote;
pub mod sequence;
pub mod session;
