use std::{
	collections::{hash_map::Entry, HashMap},
	fmt,
	sync::Arc,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
	connection::{Connection, Message},
	dispatch::{DispatchContext, ObjectState},
	error::{CallError, Error, MemberKind},
	registry::{
		InterfaceRegistry, MethodEntry, PropertyEntry, PropertyGetter, PropertySetter, SignalEntry,
	},
	table::DispatchTable,
};

/// Path an object is exposed under, unique per connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectPath(String);

impl ObjectPath {
	pub fn new(path: impl Into<String>) -> Self {
		Self(path.into())
	}

	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ObjectPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for ObjectPath {
	fn from(path: &str) -> Self {
		Self(path.to_owned())
	}
}

impl From<String> for ObjectPath {
	fn from(path: String) -> Self {
		Self(path)
	}
}

/// An object under construction: the registration half of the façade.
///
/// Members are registered in any order, grouped by interface name; nothing
/// reaches the transport until [`finish_registration`] compiles the dispatch
/// tables and activates them. Finalization consumes the object, so neither
/// late registration nor double activation of an interface can happen.
///
/// [`finish_registration`]: Self::finish_registration
pub struct Object<C: Connection> {
	connection: Arc<C>,
	path: ObjectPath,
	interfaces: HashMap<String, InterfaceRegistry<C::Message>>,
}

impl<C: Connection> Object<C> {
	/// Bind a new object to `path` on `connection`.
	pub fn new(connection: Arc<C>, path: impl Into<ObjectPath>) -> Self {
		Self {
			connection,
			path: path.into(),
			interfaces: HashMap::new(),
		}
	}

	/// Register a method with its callback.
	///
	/// The callback receives the request and the reply under construction;
	/// returning a [`CallError`] turns the call into an error reply instead.
	pub fn register_method(
		&mut self,
		interface: impl Into<String>,
		name: impl Into<String>,
		input_signature: impl Into<String>,
		output_signature: impl Into<String>,
		callback: impl Fn(&C::Message, &mut C::Message) -> Result<(), CallError>
			+ Send
			+ Sync
			+ 'static,
	) -> Result<(), Error> {
		let interface = interface.into();

		let registry = self.interfaces.entry(interface.clone()).or_default();
		match registry.methods.entry(name.into()) {
			Entry::Occupied(entry) => Err(Error::AlreadyRegistered {
				kind: MemberKind::Method,
				interface,
				member: entry.key().clone(),
			}),
			Entry::Vacant(entry) => {
				trace!("registering method '{}.{}'", interface, entry.key());
				entry.insert(MethodEntry {
					input_signature: input_signature.into(),
					output_signature: output_signature.into(),
					callback: Box::new(callback),
				});
				Ok(())
			}
		}
	}

	/// Register a signal's shape; signals are emitted, never invoked, so no
	/// callback is involved.
	pub fn register_signal(
		&mut self,
		interface: impl Into<String>,
		name: impl Into<String>,
		signature: impl Into<String>,
	) -> Result<(), Error> {
		let interface = interface.into();

		let registry = self.interfaces.entry(interface.clone()).or_default();
		match registry.signals.entry(name.into()) {
			Entry::Occupied(entry) => Err(Error::AlreadyRegistered {
				kind: MemberKind::Signal,
				interface,
				member: entry.key().clone(),
			}),
			Entry::Vacant(entry) => {
				trace!("registering signal '{}.{}'", interface, entry.key());
				entry.insert(SignalEntry {
					signature: signature.into(),
				});
				Ok(())
			}
		}
	}

	/// Register a property.
	///
	/// The accessors decide the property's access mode: getter only is
	/// read-only, setter only is write-only, both is read-write. At least
	/// one must be given.
	pub fn register_property(
		&mut self,
		interface: impl Into<String>,
		name: impl Into<String>,
		signature: impl Into<String>,
		getter: Option<PropertyGetter<C::Message>>,
		setter: Option<PropertySetter<C::Message>>,
	) -> Result<(), Error> {
		let interface = interface.into();
		let name = name.into();

		if getter.is_none() && setter.is_none() {
			return Err(Error::PropertyWithoutAccessors {
				interface,
				member: name,
			});
		}

		let registry = self.interfaces.entry(interface.clone()).or_default();
		match registry.properties.entry(name) {
			Entry::Occupied(entry) => Err(Error::AlreadyRegistered {
				kind: MemberKind::Property,
				interface,
				member: entry.key().clone(),
			}),
			Entry::Vacant(entry) => {
				let property = PropertyEntry {
					signature: signature.into(),
					getter,
					setter,
				};
				trace!(
					"registering {} property '{}.{}'",
					property.access_label(),
					interface,
					entry.key()
				);
				entry.insert(property);
				Ok(())
			}
		}
	}

	/// Compile one dispatch table per interface and activate them all
	/// against the transport for this object's path.
	///
	/// If activating an interface fails, the interfaces already activated
	/// are deactivated again before the error is returned.
	pub fn finish_registration(self) -> Result<RegisteredObject<C>, Error> {
		let Self {
			connection,
			path,
			mut interfaces,
		} = self;

		let mut compiled = Vec::with_capacity(interfaces.len());
		for (interface, registry) in &mut interfaces {
			let table = Arc::new(DispatchTable::build(registry));
			registry.table = Some(Arc::clone(&table));
			compiled.push((interface.clone(), table));
		}

		let state = Arc::new(ObjectState { path, interfaces });
		let context = DispatchContext {
			object: Arc::clone(&state),
		};

		let mut tokens = Vec::with_capacity(compiled.len());
		for (interface, table) in compiled {
			match connection.add_dispatch_table(&state.path, &interface, table, context.clone()) {
				Ok(token) => {
					debug!("activated interface '{}' on '{}'", interface, state.path);
					tokens.push(token);
				}
				Err(e) => {
					warn!(
						"failed to activate interface '{}' on '{}': {}",
						interface, state.path, e
					);
					for token in tokens {
						connection.remove_dispatch_table(token);
					}
					return Err(e);
				}
			}
		}

		Ok(RegisteredObject {
			connection,
			state,
			tokens,
		})
	}
}

/// An object live on the transport: the post-finalization half of the
/// façade.
///
/// Holds the activation token of every interface and releases them all with
/// the transport when dropped, before the connection itself can go away.
pub struct RegisteredObject<C: Connection> {
	connection: Arc<C>,
	state: Arc<ObjectState<C::Message>>,
	tokens: Vec<C::Token>,
}

impl<C: Connection> RegisteredObject<C> {
	#[must_use]
	pub fn path(&self) -> &ObjectPath {
		&self.state.path
	}

	/// Allocate an outgoing signal message addressed to `(path, interface,
	/// name)`, ready for the caller to fill with payload.
	pub fn create_signal(&self, interface: &str, name: &str) -> Result<C::Message, Error> {
		self.connection
			.create_signal_message(&self.state.path, interface, name)
	}

	/// Emit a signal previously created with [`create_signal`].
	///
	/// Payload and signature correctness are the transport's concern; no
	/// validation happens here.
	///
	/// [`create_signal`]: Self::create_signal
	pub fn emit_signal(&self, message: C::Message) {
		message.send();
	}
}

impl<C: Connection> Drop for RegisteredObject<C> {
	fn drop(&mut self) {
		debug!("deactivating object '{}'", self.state.path);
		for token in self.tokens.drain(..) {
			self.connection.remove_dispatch_table(token);
		}
	}
}
