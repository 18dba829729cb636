use crate::{
	connection::Message,
	dispatch::{self, DispatchContext},
	error::CallError,
	registry::InterfaceRegistry,
};

/// Entry point a transport invokes for an inbound method call.
pub type MethodEntryPoint<M> = fn(&DispatchContext<M>, &M) -> Result<(), CallError>;

/// Entry point a transport invokes to read a property, with the interface
/// and property names plus the reply under construction.
pub type PropertyGetEntryPoint<M> =
	fn(&DispatchContext<M>, &str, &str, &mut M) -> Result<(), CallError>;

/// Entry point a transport invokes to write a property, with the interface
/// and property names plus the inbound value message.
pub type PropertySetEntryPoint<M> =
	fn(&DispatchContext<M>, &str, &str, &M) -> Result<(), CallError>;

/// One slot of a compiled [`DispatchTable`].
///
/// `Method` and `Property` slots carry the generic entry points of the
/// dispatch module, never a user callback; the callback is re-resolved by
/// (interface, member) on every inbound call. `Signal` slots carry no entry
/// point at all; they exist so the receiving side can see the signal's
/// shape.
pub enum DispatchEntry<M> {
	/// Start-of-table sentinel.
	Start,
	Method {
		name: String,
		input_signature: String,
		output_signature: String,
		handler: MethodEntryPoint<M>,
	},
	Signal {
		name: String,
		signature: String,
	},
	Property {
		name: String,
		signature: String,
		get: PropertyGetEntryPoint<M>,
		set: Option<PropertySetEntryPoint<M>>,
	},
	/// End-of-table sentinel.
	End,
}

/// The transport-facing descriptor compiled from one interface registry.
///
/// Built once at finalization and immutable after, so transports may read it
/// concurrently without locking.
pub struct DispatchTable<M> {
	entries: Vec<DispatchEntry<M>>,
}

impl<M: Message> DispatchTable<M> {
	/// Compile `registry` into its transport-facing descriptor.
	pub(crate) fn build(registry: &InterfaceRegistry<M>) -> Self {
		let mut entries = Vec::with_capacity(registry.member_count() + 2);

		entries.push(DispatchEntry::Start);

		for (name, method) in &registry.methods {
			entries.push(DispatchEntry::Method {
				name: name.clone(),
				input_signature: method.input_signature.clone(),
				output_signature: method.output_signature.clone(),
				handler: dispatch::method_call,
			});
		}

		for (name, signal) in &registry.signals {
			entries.push(DispatchEntry::Signal {
				name: name.clone(),
				signature: signal.signature.clone(),
			});
		}

		for (name, property) in &registry.properties {
			// A property without a setter gets no write entry point, so the
			// transport can never route a write to it.
			let set = if property.is_writable() {
				Some(dispatch::property_set as PropertySetEntryPoint<M>)
			} else {
				None
			};

			entries.push(DispatchEntry::Property {
				name: name.clone(),
				signature: property.signature.clone(),
				get: dispatch::property_get,
				set,
			});
		}

		entries.push(DispatchEntry::End);

		Self { entries }
	}
}

impl<M> DispatchTable<M> {
	/// The compiled slots, start sentinel first, end sentinel last.
	#[must_use]
	pub fn entries(&self) -> &[DispatchEntry<M>] {
		&self.entries
	}
}
