//! Breadcrumb navigation over cached listings.
//!
//! Every breadcrumb keeps the node list shown under it, so moving back up
//! the trail never needs a refetch. Descending pushes a new level;
//! ascending drops every level deeper than the target so that abandoned
//! branches cannot reappear later. Listings are kept per position, not per
//! label, since the same folder name can occur more than once on a trail.

use tracing::{debug, error};

use crate::tree::{FolderEntry, Node};
use crate::{Result, UptreeError};

/// Session-scoped navigation state.
#[derive(Debug, Clone)]
pub struct NavigationCache {
    breadcrumbs: Vec<String>,
    /// One listing per breadcrumb, root first.
    levels: Vec<Vec<Node>>,
    root_loaded: bool,
}

impl NavigationCache {
    /// Create an empty cache whose first breadcrumb is `root_label`.
    pub fn new(root_label: impl Into<String>) -> Self {
        Self {
            breadcrumbs: vec![root_label.into()],
            levels: vec![Vec::new()],
            root_loaded: false,
        }
    }

    /// Label of the root breadcrumb.
    pub fn root_label(&self) -> &str {
        &self.breadcrumbs[0]
    }

    /// Current breadcrumb trail, root first.
    pub fn breadcrumbs(&self) -> &[String] {
        &self.breadcrumbs
    }

    /// The list currently on display.
    pub fn displayed(&self) -> &[Node] {
        self.levels.last().map(Vec::as_slice).unwrap_or_default()
    }

    /// Cached listing for a label.
    ///
    /// When the label occurs more than once on the trail, the deepest
    /// occurrence wins.
    pub fn listing(&self, label: &str) -> Option<&[Node]> {
        let index = self.breadcrumbs.iter().rposition(|crumb| crumb == label)?;
        if index == 0 && !self.root_loaded {
            return None;
        }
        self.levels.get(index).map(Vec::as_slice)
    }

    /// Listing cached for the breadcrumb at `index`.
    pub fn level(&self, index: usize) -> Option<&[Node]> {
        self.levels.get(index).map(Vec::as_slice)
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> usize {
        self.breadcrumbs.len() - 1
    }

    pub fn is_at_root(&self) -> bool {
        self.breadcrumbs.len() == 1
    }

    /// Replace the root listing with ground truth from the backend.
    pub fn seed_root(&mut self, nodes: Vec<Node>) {
        debug!(count = nodes.len(), "seeding root listing");
        self.levels[0] = nodes;
        self.root_loaded = true;
    }

    /// Enter a level whose children are `child_nodes`.
    pub fn descend(&mut self, child_nodes: Vec<Node>, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        if child_nodes.is_empty() {
            error!(%label, "descend called with an empty listing");
            return Err(UptreeError::NavigationPrecondition(format!(
                "cannot descend into empty listing '{label}'"
            )));
        }

        debug!(%label, depth = self.breadcrumbs.len(), "descending");
        self.levels.push(child_nodes);
        self.breadcrumbs.push(label);
        Ok(())
    }

    /// Enter a folder, labelled by its name.
    ///
    /// Returns `false` without changing anything when the folder is empty.
    pub fn open_folder(&mut self, folder: &FolderEntry) -> Result<bool> {
        if folder.children.is_empty() {
            debug!(folder = %folder.name, "ignoring empty folder");
            return Ok(false);
        }
        self.descend(folder.child_nodes(), folder.name.clone())?;
        Ok(true)
    }

    /// Return to the breadcrumb at `target_index`.
    pub fn ascend(&mut self, target_index: usize) -> Result<()> {
        if target_index >= self.breadcrumbs.len() {
            error!(
                target_index,
                len = self.breadcrumbs.len(),
                "ascend index out of range"
            );
            return Err(UptreeError::NavigationPrecondition(format!(
                "breadcrumb index {target_index} out of range (depth {})",
                self.depth()
            )));
        }
        if target_index == self.depth() {
            return Ok(());
        }

        let evicted = self.breadcrumbs.len() - (target_index + 1);
        self.breadcrumbs.truncate(target_index + 1);
        self.levels.truncate(target_index + 1);
        debug!(label = %self.breadcrumbs[target_index], evicted, "ascended");
        Ok(())
    }

    /// Go up one level; does nothing at the root.
    pub fn back(&mut self) -> Result<()> {
        match self.depth() {
            0 => Ok(()),
            depth => self.ascend(depth - 1),
        }
    }

    /// Record freshly uploaded nodes.
    ///
    /// Uploads always land at the root, so only the root listing is amended.
    /// Deeper levels pick the nodes up once the user navigates back.
    pub fn merge_upload_result(&mut self, nodes: Vec<Node>) {
        self.levels[0].extend(nodes);
        self.root_loaded = true;
    }

    /// Drop all state, leaving an empty cache at the root.
    pub fn clear(&mut self) {
        self.breadcrumbs.truncate(1);
        self.levels = vec![Vec::new()];
        self.root_loaded = false;
    }
}

impl Default for NavigationCache {
    fn default() -> Self {
        Self::new("Home")
    }
}
