//! Approval primitive: compares received HTML with an approved snapshot.
//!
//! The facade only needs the [`Approver`] trait. [`FileApprover`] stores
//! snapshots next to each other as `<name>.approved.html` and
//! `<name>.received.html`, the layout approval-testing tools commonly use:
//! a reviewer accepts a change by renaming the received file.

use std::path::PathBuf;
use std::sync::Arc;

mod file;
pub use self::file::FileApprover;

/// Errors reported by an [`Approver`].
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApprovalError {
    /// Snapshot files could not be read or written.
    #[display("Approval I/O error: {_0}")]
    Io(std::io::Error),

    /// There is no approved snapshot yet.
    #[display(
        "No approved snapshot for '{name}'.\nReceived output written to: {}\nRename it to {} once reviewed.",
        received.display(),
        approved.display()
    )]
    #[from(skip)]
    MissingApproved {
        /// Snapshot name.
        name: String,
        /// Where the approved file is expected.
        approved: PathBuf,
        /// Where the received output was written.
        received: PathBuf,
    },

    /// The received output differs from the approved snapshot.
    #[display(
        "Received output for '{name}' does not match the approved snapshot.\nApproved: {}\nReceived: {}",
        approved.display(),
        received.display()
    )]
    #[from(skip)]
    Mismatch {
        /// Snapshot name.
        name: String,
        /// The approved file.
        approved: PathBuf,
        /// The received file.
        received: PathBuf,
    },
}

/// Compares a received HTML document with its approved snapshot.
pub trait Approver {
    /// Verify `received` against the snapshot called `name`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApprovalError`] when no snapshot is approved yet, when the
    /// content differs, or when the snapshot store cannot be accessed.
    fn verify(&self, name: &str, received: &str) -> Result<(), ApprovalError>;
}

impl<A> Approver for &A
where
    A: Approver + ?Sized,
{
    fn verify(&self, name: &str, received: &str) -> Result<(), ApprovalError> {
        (**self).verify(name, received)
    }
}

impl<A> Approver for Arc<A>
where
    A: Approver + ?Sized,
{
    fn verify(&self, name: &str, received: &str) -> Result<(), ApprovalError> {
        (**self).verify(name, received)
    }
}
