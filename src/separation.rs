//! Background separation collaborator.
//!
//! The core only consumes the contract: one encoded image in, one alpha-matted image out.

pub(crate) mod mime;
pub(crate) mod remover;
