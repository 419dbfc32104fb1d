// ATS score handling: extraction from generator text, edit deltas, issue tallies.
// Everything here is pure: no I/O, no LLM calls.

pub mod delta;
pub mod extractor;
pub mod issues;
