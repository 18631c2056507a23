//! Scripted demos for arbor.
//!
//! Arbor has no drawing backend of its own, so the demos drive a window with a short input
//! script and print what the tree looks like afterwards.

/// Form gym demo tree.
pub mod formgym;
/// Popup gym demo tree.
pub mod popupgym;
/// Input scripts.
pub mod script;

#[cfg(test)]
mod tests;
