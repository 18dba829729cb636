use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error name carried in the reply when a read is attempted on a write-only
/// property.
pub const ERROR_PROPERTY_WRITE_ONLY: &str = "org.wirebus.Error.PropertyWriteOnly";

/// Which member namespace a registration landed in.
///
/// Methods, signals and properties live in separate namespaces within an
/// interface, so a method and a signal may share a name while two methods may
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MemberKind {
	Method,
	Signal,
	Property,
}

impl fmt::Display for MemberKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Method => "method",
			Self::Signal => "signal",
			Self::Property => "property",
		})
	}
}

/// Errors reported synchronously by the registration surface.
#[derive(Debug, Error)]
pub enum Error {
	#[error("{kind} '{interface}.{member}' is already registered")]
	AlreadyRegistered {
		kind: MemberKind,
		interface: String,
		member: String,
	},

	#[error("property '{interface}.{member}' has neither a getter nor a setter")]
	PropertyWithoutAccessors { interface: String, member: String },

	#[error("transport error: {0}")]
	Transport(String),
}

/// A structured failure produced by a method, getter or setter callback.
///
/// The pair is marshalled verbatim into the transport's error reply: `name`
/// is the symbolic, namespaced identifier remote callers match on, `message`
/// the human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CallError {
	pub name: String,
	pub message: String,
}

impl CallError {
	pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			message: message.into(),
		}
	}

	pub(crate) fn property_write_only() -> Self {
		Self::new(ERROR_PROPERTY_WRITE_ONLY, "cannot read write-only property")
	}
}
