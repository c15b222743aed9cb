//! Undo sessions.
//!
//! Sessions nest: every mutation made after `start_undo_session` can be
//! rolled back with `undo_session`, or folded into the enclosing session
//! with `commit_session`.

use crate::StoreError;

pub trait UndoDatabase {
    fn start_undo_session(&mut self);

    /// Keep the changes of the innermost session.
    fn commit_session(&mut self) -> Result<(), StoreError>;

    /// Revert every change made since the innermost session started.
    fn undo_session(&mut self) -> Result<(), StoreError>;

    fn session_depth(&self) -> usize;
}
