//! Settings loading.

#[cfg(feature = "conf")]
pub use ripple_conf::*;

/// Installs the process-wide reactive converter described by `settings`.
///
/// Must run before anything reads
/// [`CompositionConverter::global`](ripple_reactive::CompositionConverter::global);
/// fails afterwards.
#[cfg(feature = "conf")]
pub fn install_reactive(settings: &ReactiveSettings) -> ripple_core::Result<()> {
	let converter = settings.converter();
	tracing::info!(adapters = ?converter.adapter_names(), "installing reactive adapters");
	ripple_reactive::CompositionConverter::install(converter)
}
