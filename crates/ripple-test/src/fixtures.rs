//! rstest fixtures shared by Ripple test suites.

use crate::transport::MemoryTransport;
use ripple_reactive::{Capabilities, CompositionConverter};
use rstest::fixture;

/// Converter with every adapter compiled into this build.
///
/// Independent of the process-wide converter so tests do not race on its
/// initialisation.
#[fixture]
pub fn converter() -> CompositionConverter {
	CompositionConverter::new(Capabilities::all())
}

#[fixture]
pub fn memory_transport() -> MemoryTransport {
	MemoryTransport::new()
}
