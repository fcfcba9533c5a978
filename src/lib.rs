//! Streaming reader and writer for PGE-X (MDX) level, world, game-save and meta files.

/// Concrete file kinds built on the MDX engine.
pub mod formats;
/// Schema-driven MDX object/field/section engine.
pub mod mdx;
