#![forbid(unsafe_code)]

//! Core primitives for the scribble editor surface.
//!
//! This crate holds the pieces every other scribble crate leans on:
//! - [`event`] - key events, modifier flags, and the platform `Mod` chord
//! - [`host`] - host-owned observable fields ([`HostField`]) with explicit
//!   subscription handles
//! - [`lifecycle`] - [`Liveness`], the teardown flag late results check
//! - [`logging`] - tracing re-exports and optional subscriber setup
//!
//! # Example
//! ```
//! use scribble_core::host::HostField;
//!
//! let prefix = HostField::new(String::from("//"));
//! let seen = HostField::new(String::new());
//! let sink = seen.clone();
//! let sub = prefix.subscribe(move |value: &String| sink.set(value.clone()));
//!
//! prefix.set("#".into());
//! assert_eq!(seen.get(), "#");
//! drop(sub);
//! ```

pub mod event;
pub mod host;
pub mod lifecycle;
pub mod logging;

pub use event::{KeyCode, KeyEvent, KeyEventKind, Modifiers};
pub use host::{HostField, SubscriptionHandle};
pub use lifecycle::Liveness;
