use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{ApprovalError, Approver};

const APPROVED_SUFFIX: &str = "approved.html";
const RECEIVED_SUFFIX: &str = "received.html";

/// File-system backed [`Approver`].
///
/// For a snapshot named `Home.Index` in directory `approvals`, the approved
/// snapshot is `approvals/Home.Index.approved.html`. Each verification writes
/// `approvals/Home.Index.received.html` and deletes it again when the content
/// matches.
#[derive(Debug, Clone)]
pub struct FileApprover {
    dir: PathBuf,
}

impl FileApprover {
    /// Creates an approver storing snapshots in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The snapshot directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the approved snapshot for `name`.
    pub fn approved_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{APPROVED_SUFFIX}"))
    }

    /// Path of the received output for `name`.
    pub fn received_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{RECEIVED_SUFFIX}"))
    }
}

impl Approver for FileApprover {
    fn verify(&self, name: &str, received: &str) -> Result<(), ApprovalError> {
        let approved_path = self.approved_path(name);
        let received_path = self.received_path(name);

        let approved = match fs::read_to_string(&approved_path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };

        if approved.as_deref() == Some(received) {
            debug!(%name, "received output matches approved snapshot");
            if received_path.exists() {
                fs::remove_file(&received_path)?;
            }
            return Ok(());
        }

        fs::create_dir_all(&self.dir)?;
        fs::write(&received_path, received)?;

        let name = name.to_string();
        if approved.is_none() {
            warn!(%name, path = %received_path.display(), "no approved snapshot");
            Err(ApprovalError::MissingApproved {
                name,
                approved: approved_path,
                received: received_path,
            })
        } else {
            warn!(%name, path = %received_path.display(), "snapshot mismatch");
            Err(ApprovalError::Mismatch {
                name,
                approved: approved_path,
                received: received_path,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_approved_writes_received() {
        let dir = tempfile::tempdir().expect("temp dir");
        let approver = FileApprover::new(dir.path());

        let result = approver.verify("Home.Index", "<html></html>");

        assert!(matches!(result, Err(ApprovalError::MissingApproved { .. })));
        let received = fs::read_to_string(approver.received_path("Home.Index")).expect("received");
        assert_eq!(received, "<html></html>");
    }

    #[test]
    fn test_matching_snapshot_removes_received() {
        let dir = tempfile::tempdir().expect("temp dir");
        let approver = FileApprover::new(dir.path());
        fs::write(approver.approved_path("Home.Index"), "<p>ok</p>").expect("write approved");
        fs::write(approver.received_path("Home.Index"), "<p>stale</p>").expect("write received");

        approver.verify("Home.Index", "<p>ok</p>").expect("should match");

        assert!(!approver.received_path("Home.Index").exists());
    }

    #[test]
    fn test_mismatch_reports_both_paths() {
        let dir = tempfile::tempdir().expect("temp dir");
        let approver = FileApprover::new(dir.path());
        fs::write(approver.approved_path("Home.Index"), "<p>old</p>").expect("write approved");

        let Err(ApprovalError::Mismatch {
            approved, received, ..
        }) = approver.verify("Home.Index", "<p>new</p>")
        else {
            panic!("expected a mismatch");
        };

        assert_eq!(approved, approver.approved_path("Home.Index"));
        assert_eq!(fs::read_to_string(received).expect("received"), "<p>new</p>");
    }

    #[test]
    fn test_snapshot_paths() {
        let approver = FileApprover::new("approvals");

        assert_eq!(
            approver.approved_path("Home.Index"),
            Path::new("approvals/Home.Index.approved.html")
        );
        assert_eq!(
            approver.received_path("Home.Index"),
            Path::new("approvals/Home.Index.received.html")
        );
    }
}
