//! Server-side object model for the wirebus IPC framework.
//!
//! A process exposes named *interfaces*, each a set of methods, signals and
//! properties, under an object path, and this crate routes inbound method
//! calls and property accesses to the callbacks registered for them.
//!
//! Registration is a two-phase affair: members are registered on an
//! [`Object`] in any order, then [`Object::finish_registration`] compiles
//! one [`DispatchTable`] per interface, hands each to the transport and
//! returns a [`RegisteredObject`] that keeps the tables activated until it
//! is dropped. The transport side of the seam is the [`Connection`] trait;
//! the message container is the [`Message`] trait; both are implemented by
//! the transport crate, not here.
//!
//! Dispatch is synchronous: the entry points in an activated table run on
//! whatever thread the transport's event loop delivers inbound messages
//! from, so callbacks must not block indefinitely. A callback fails a call
//! by returning a [`CallError`], which the transport marshals into the error
//! reply; exactly one reply (success or error) results from every method
//! call.

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod connection;
mod dispatch;
mod error;
mod object;
mod registry;
mod table;

pub use connection::{Connection, Message};
pub use dispatch::DispatchContext;
pub use error::{CallError, Error, MemberKind, ERROR_PROPERTY_WRITE_ONLY};
pub use object::{Object, ObjectPath, RegisteredObject};
pub use registry::{MethodCallback, PropertyGetter, PropertySetter};
pub use table::{
	DispatchEntry, DispatchTable, MethodEntryPoint, PropertyGetEntryPoint, PropertySetEntryPoint,
};
