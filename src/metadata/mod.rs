//! Effective metadata resolution.
//!
//! Songs and albums inherit genre, subgenre, language, gender and ethnicity
//! from their ancestors unless they carry an override. Resolution walks
//! Song → Album → Artist attribute-by-attribute; the first present value
//! wins. The walk is a pure function over an explicit [`AncestorChain`]
//! value, independent of how the entities are stored.

mod effective;
mod resolver;

pub use effective::{resolve_album, resolve_song, EffectiveMetadata};
pub use resolver::{AncestorChain, Attribute, MetadataError, Overrides};
