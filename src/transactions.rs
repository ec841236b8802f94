use std::{fs, marker::PhantomData, path::PathBuf};

/// Directories a save created, recorded so a failed save can remove them.
#[derive(Debug)]
pub enum RollbackOperation {
    RemoveDir(PathBuf),
}
/// Save still in progress; dropping it undoes what it recorded.
pub struct Active;
/// Save finished; nothing is undone.
pub struct Committed;
pub trait TransactionState {
    const SHOULD_ROLLBACK: bool;
}
impl TransactionState for Active {
    const SHOULD_ROLLBACK: bool = true;
}
impl TransactionState for Committed {
    const SHOULD_ROLLBACK: bool = false;
}
/// Tracks the filesystem side effects of one archive save.
///
/// A `Transaction<Active>` dropped without [`Transaction::commit`] (for example
/// because a `?` returned early) removes every directory it recorded, newest
/// first, so a failed delivery leaves no empty output directory behind.
pub struct Transaction<State: TransactionState> {
    rollback_operations: Vec<RollbackOperation>,
    state: PhantomData<State>,
}
impl Transaction<Active> {
    pub fn new() -> Self {
        Transaction {
            rollback_operations: vec![],
            state: PhantomData,
        }
    }

    pub fn add_operation(&mut self, operation: RollbackOperation) {
        self.rollback_operations.push(operation);
    }

    /// Marks the save as done; the recorded directories are kept.
    pub fn commit(mut self) -> Transaction<Committed> {
        self.rollback_operations.clear();

        Transaction {
            rollback_operations: vec![],
            state: PhantomData,
        }
    }
}
impl<S: TransactionState> Drop for Transaction<S> {
    fn drop(&mut self) {
        if !S::SHOULD_ROLLBACK {
            log::debug!("save committed");
            return;
        }

        while let Some(RollbackOperation::RemoveDir(path)) = self.rollback_operations.pop() {
            log::debug!("save failed, removing dir: {}", path.display());
            let _ = fs::remove_dir_all(&path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncommitted_save_removes_recorded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(out.join("zips")).unwrap();
        fs::write(out.join("zips").join("site.zip"), b"zip").unwrap();

        {
            let mut trx = Transaction::<Active>::new();
            trx.add_operation(RollbackOperation::RemoveDir(out.clone()));
        }

        assert!(!out.exists());
    }

    #[test]
    fn committed_save_keeps_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir_all(&out).unwrap();

        let mut trx = Transaction::<Active>::new();
        trx.add_operation(RollbackOperation::RemoveDir(out.clone()));
        drop(trx.commit());

        assert!(out.exists());
    }
}
