//! Cross-crate integration tests for the capture → classify → store
//! pipeline and the export round trip.

#[cfg(test)]
mod pipeline;
#[cfg(test)]
mod util;
