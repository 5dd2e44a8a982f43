//! Record shapes for surveys and transportation reviews.
//!
//! # Responsibility
//! - Define canonical record structures and their closed vocabularies.
//! - Own field-level validation; persistence lives in `repo`.
//!
//! # Invariants
//! - Every record is validated as a whole before it is written.
//! - The shared review shape is composed into each review kind, never
//!   stored on its own.

pub mod geo;
pub mod place;
pub mod review;
pub mod survey;
pub mod validation;
pub mod vocab;
