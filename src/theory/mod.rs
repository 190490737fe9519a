// Music theory module - fixed note table for the playing range

pub mod note;

pub use note::{FALLBACK_FREQUENCY, NOTES, Note, NoteId, NoteKind, find, frequency_of};
