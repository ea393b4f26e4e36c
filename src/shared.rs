use std::sync::Arc;

use parking_lot::RwLock;

use crate::document::DocumentRoot;
use crate::latex;

/// A document shared between threads.
///
/// Every edit runs under the write lock, so a concurrent render sees the tree
/// either before or after an edit, never halfway through resizing a table.
#[derive(Debug, Clone, Default)]
pub struct SharedDocument {
    inner: Arc<RwLock<DocumentRoot>>,
}

impl SharedDocument {
    pub fn new(doc: DocumentRoot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(doc)),
        }
    }

    /// Run a mutation with exclusive access to the document.
    pub fn edit<R>(&self, f: impl FnOnce(&mut DocumentRoot) -> R) -> R {
        f(&mut *self.inner.write())
    }

    pub fn read<R>(&self, f: impl FnOnce(&DocumentRoot) -> R) -> R {
        f(&*self.inner.read())
    }

    pub fn render(&self) -> String {
        self.read(latex::generate)
    }

    /// A copy of the current document.
    pub fn snapshot(&self) -> DocumentRoot {
        self.inner.read().clone()
    }
}
