//! Client SDK for the control server HTTP API.

pub mod client;

pub use client::{ControlClient, CreateSession, Session, Status};
