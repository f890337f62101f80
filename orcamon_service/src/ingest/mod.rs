/// Data source clients.
///
/// Submodules:
/// - `acartia` — community sightings API (bearer-token JSON feed).

pub mod acartia;
