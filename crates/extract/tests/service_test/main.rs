/// Integration tests for the filing service covering the stream and section
/// scenarios, cache behavior (hits, single-flight builds, eviction, timeouts),
/// and the raw document sources.

mod cache_behavior;
mod helpers;
mod scenarios;
mod sources;
