//! Orca sighting annotation service.
//!
//! Fetches the Acartia community sightings feed, archives it as CSV and
//! annotates each sighting with pod, ecotype and travel-direction tags for
//! the salmon/orca dashboard, writing yearly southern resident extracts.

pub mod analysis;
pub mod annotate;
pub mod config;
pub mod ingest;
pub mod keywords;
pub mod logging;
pub mod model;
pub mod table;
