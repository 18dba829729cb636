use std::{collections::HashMap, fmt, sync::Arc};

use tracing::{debug, trace};

use crate::{
	connection::Message,
	error::CallError,
	object::ObjectPath,
	registry::{InterfaceRegistry, MethodEntry, PropertyEntry},
	table::DispatchTable,
};

/// Frozen per-object state shared between the [`RegisteredObject`] and the
/// transport once registration has finished.
///
/// [`RegisteredObject`]: crate::RegisteredObject
pub(crate) struct ObjectState<M> {
	pub(crate) path: ObjectPath,
	pub(crate) interfaces: HashMap<String, InterfaceRegistry<M>>,
}

impl<M> ObjectState<M> {
	fn method(&self, interface: &str, member: &str) -> Option<&MethodEntry<M>> {
		self.interfaces.get(interface)?.methods.get(member)
	}

	fn property(&self, interface: &str, member: &str) -> Option<&PropertyEntry<M>> {
		self.interfaces.get(interface)?.properties.get(member)
	}
}

/// Handle through which the dispatch entry points find their owning object.
///
/// One clone is handed to the transport per activated interface; the
/// transport passes it back on every inbound call. There is no process-wide
/// lookup: the context is the only route from a transport callback to the
/// object's registries. Cloning is cheap.
pub struct DispatchContext<M> {
	pub(crate) object: Arc<ObjectState<M>>,
}

impl<M> DispatchContext<M> {
	/// Path of the object this context dispatches for.
	#[must_use]
	pub fn path(&self) -> &ObjectPath {
		&self.object.path
	}

	/// The compiled descriptor activated for `interface`, if this object
	/// exposes one.
	///
	/// Lets a transport walk member metadata (introspection, signal shapes)
	/// from the context handle alone.
	#[must_use]
	pub fn dispatch_table(&self, interface: &str) -> Option<&Arc<DispatchTable<M>>> {
		self.object.interfaces.get(interface)?.table.as_ref()
	}
}

impl<M> Clone for DispatchContext<M> {
	fn clone(&self) -> Self {
		Self {
			object: Arc::clone(&self.object),
		}
	}
}

impl<M> fmt::Debug for DispatchContext<M> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DispatchContext")
			.field("path", &self.object.path)
			.finish_non_exhaustive()
	}
}

/// Generic method-call entry point installed in every method slot.
///
/// Resolves the callback by the (interface, member) pair carried in the
/// message, builds the reply from the request and invokes the callback with
/// both. Exactly one reply results: the sent reply on success, the returned
/// [`CallError`] otherwise.
///
/// Panics if the message names a method absent from the registry; a
/// correctly compiled table never routes here for one.
pub(crate) fn method_call<M: Message>(
	context: &DispatchContext<M>,
	message: &M,
) -> Result<(), CallError> {
	let interface = message.interface_name();
	let member = message.member_name();

	let Some(entry) = context.object.method(interface, member) else {
		panic!("dispatch table routed method call '{interface}.{member}' with no registry entry");
	};

	trace!("dispatching method call '{}.{}'", interface, member);

	let mut reply = message.create_reply();
	if let Err(e) = (entry.callback)(message, &mut reply) {
		debug!("method '{}.{}' failed: {}", interface, member, e);
		return Err(e);
	}
	reply.send();

	Ok(())
}

/// Generic property-read entry point installed in every property slot.
///
/// A write-only property (no getter) is refused with the fixed
/// [`ERROR_PROPERTY_WRITE_ONLY`] error without invoking anything. No send
/// happens here either way; the transport completes the reply from whatever
/// the getter wrote into it.
///
/// [`ERROR_PROPERTY_WRITE_ONLY`]: crate::ERROR_PROPERTY_WRITE_ONLY
pub(crate) fn property_get<M: Message>(
	context: &DispatchContext<M>,
	interface: &str,
	member: &str,
	reply: &mut M,
) -> Result<(), CallError> {
	let Some(entry) = context.object.property(interface, member) else {
		panic!("dispatch table routed property read '{interface}.{member}' with no registry entry");
	};

	let Some(getter) = &entry.getter else {
		return Err(CallError::property_write_only());
	};

	trace!("dispatching property read '{}.{}'", interface, member);

	getter(reply).map_err(|e| {
		debug!("property read '{}.{}' failed: {}", interface, member, e);
		e
	})
}

/// Generic property-write entry point, installed only in slots whose
/// property has a setter.
///
/// Property writes are one-way acknowledgments at the transport level, so no
/// reply is produced here; a returned [`CallError`] is the transport's to
/// report.
pub(crate) fn property_set<M: Message>(
	context: &DispatchContext<M>,
	interface: &str,
	member: &str,
	value: &M,
) -> Result<(), CallError> {
	let Some(entry) = context.object.property(interface, member) else {
		panic!("dispatch table routed property write '{interface}.{member}' with no registry entry");
	};
	let Some(setter) = &entry.setter else {
		panic!("property write '{interface}.{member}' routed without a setter");
	};

	trace!("dispatching property write '{}.{}'", interface, member);

	setter(value).map_err(|e| {
		debug!("property write '{}.{}' failed: {}", interface, member, e);
		e
	})
}
