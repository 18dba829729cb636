use std::{collections::HashMap, sync::Arc};

use crate::{error::CallError, table::DispatchTable};

/// Callback invoked for an inbound method call, with the request and the
/// reply under construction.
pub type MethodCallback<M> = Box<dyn Fn(&M, &mut M) -> Result<(), CallError> + Send + Sync>;

/// Callback filling the reply for a property read.
pub type PropertyGetter<M> = Box<dyn Fn(&mut M) -> Result<(), CallError> + Send + Sync>;

/// Callback consuming the value message of a property write.
pub type PropertySetter<M> = Box<dyn Fn(&M) -> Result<(), CallError> + Send + Sync>;

pub(crate) struct MethodEntry<M> {
	pub(crate) input_signature: String,
	pub(crate) output_signature: String,
	pub(crate) callback: MethodCallback<M>,
}

pub(crate) struct SignalEntry {
	pub(crate) signature: String,
}

pub(crate) struct PropertyEntry<M> {
	pub(crate) signature: String,
	pub(crate) getter: Option<PropertyGetter<M>>,
	pub(crate) setter: Option<PropertySetter<M>>,
}

impl<M> PropertyEntry<M> {
	pub(crate) fn is_writable(&self) -> bool {
		self.setter.is_some()
	}

	pub(crate) fn access_label(&self) -> &'static str {
		match (self.getter.is_some(), self.setter.is_some()) {
			(true, true) => "read-write",
			(true, false) => "read-only",
			// Neither accessor is rejected at registration.
			_ => "write-only",
		}
	}
}

/// Everything registered under one interface name, plus the dispatch table
/// compiled from it at finalization.
///
/// The table slot stays empty until `finish_registration` compiles it; from
/// then on the registry keeps the descriptor alive for as long as the
/// transport holds the matching activation.
pub(crate) struct InterfaceRegistry<M> {
	pub(crate) methods: HashMap<String, MethodEntry<M>>,
	pub(crate) signals: HashMap<String, SignalEntry>,
	pub(crate) properties: HashMap<String, PropertyEntry<M>>,
	pub(crate) table: Option<Arc<DispatchTable<M>>>,
}

impl<M> Default for InterfaceRegistry<M> {
	fn default() -> Self {
		Self {
			methods: HashMap::new(),
			signals: HashMap::new(),
			properties: HashMap::new(),
			table: None,
		}
	}
}

impl<M> InterfaceRegistry<M> {
	pub(crate) fn member_count(&self) -> usize {
		self.methods.len() + self.signals.len() + self.properties.len()
	}
}
