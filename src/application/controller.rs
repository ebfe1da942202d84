//! Editor controller: the single owner of the current snapshot.
//!
//! UI collaborators talk to the tree only through the id-parameterized
//! commands here. Each successful command replaces the held snapshot
//! wholesale; previously handed out `Arc<Snapshot>`s stay valid and unchanged.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::error::Feature;
use crate::application::services::MutationService;
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{DomainError, IdSequence, NodeCategory, NodeId, Snapshot, TreeNode};

/// Capabilities that can be switched off per editor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorFeatures {
    pub relink: bool,
    pub categories: bool,
}

impl Default for EditorFeatures {
    fn default() -> Self {
        Self {
            relink: true,
            categories: true,
        }
    }
}

/// Relink selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelinkState {
    #[default]
    Idle,
    AwaitingSource,
    AwaitingTarget(NodeId),
}

/// Why a relink selection left the state unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum IgnoreReason {
    NotInRelinkMode,
    UnknownNode(NodeId),
    RootSelected,
    Rejected(DomainError),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::NotInRelinkMode => f.write_str("not in relink mode"),
            IgnoreReason::UnknownNode(id) => write!(f, "unknown node: {}", id),
            IgnoreReason::RootSelected => f.write_str("the root cannot be relinked"),
            IgnoreReason::Rejected(e) => write!(f, "{}", e),
        }
    }
}

/// Result of a click on a node while in relink mode.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    SourceSelected(NodeId),
    Relinked(Arc<Snapshot>),
    Ignored(IgnoreReason),
}

#[derive(Debug)]
pub struct EditorController {
    service: MutationService,
    snapshot: Arc<Snapshot>,
    ids: IdSequence,
    relink: RelinkState,
    features: EditorFeatures,
}

impl EditorController {
    /// A controller holding a single root node labeled `root_label`.
    pub fn new(service: MutationService, features: EditorFeatures, root_label: &str) -> Self {
        let root = TreeNode::new(NodeId::ROOT, None)
            .with_label(root_label)
            .with_category(NodeCategory::System);
        let snapshot = Arc::new(service.initial(root));
        Self {
            service,
            snapshot,
            ids: IdSequence::new(),
            relink: RelinkState::Idle,
            features,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            MutationService::from_settings(settings),
            settings.editor_features(),
            &settings.root_label,
        )
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn features(&self) -> EditorFeatures {
        self.features
    }

    pub fn relink_state(&self) -> RelinkState {
        self.relink
    }

    pub fn add_child(&mut self, parent: NodeId) -> ApplicationResult<Arc<Snapshot>> {
        let next = self.service.add_child(&self.snapshot, &mut self.ids, parent, None)?;
        Ok(self.publish(next))
    }

    pub fn add_child_labeled(
        &mut self,
        parent: NodeId,
        label: &str,
    ) -> ApplicationResult<Arc<Snapshot>> {
        let next = self
            .service
            .add_child(&self.snapshot, &mut self.ids, parent, Some(label))?;
        Ok(self.publish(next))
    }

    pub fn delete_subtree(&mut self, node: NodeId) -> ApplicationResult<Arc<Snapshot>> {
        let next = self.service.delete_subtree(&self.snapshot, node)?;
        let published = self.publish(next);
        if let RelinkState::AwaitingTarget(source) = self.relink {
            if !published.contains(source) {
                debug!("delete_subtree: pending relink source {} was removed", source);
                self.relink = RelinkState::AwaitingSource;
            }
        }
        Ok(published)
    }

    pub fn relink(&mut self, node: NodeId, new_parent: NodeId) -> ApplicationResult<Arc<Snapshot>> {
        self.require_feature(Feature::Relink)?;
        let next = self.service.relink(&self.snapshot, node, new_parent)?;
        Ok(self.publish(next))
    }

    pub fn rename(&mut self, node: NodeId, label: &str) -> ApplicationResult<Arc<Snapshot>> {
        let next = self.service.rename(&self.snapshot, node, label)?;
        Ok(self.publish(next))
    }

    pub fn retype(
        &mut self,
        node: NodeId,
        category: NodeCategory,
    ) -> ApplicationResult<Arc<Snapshot>> {
        self.require_feature(Feature::Categories)?;
        let next = self.service.retype(&self.snapshot, node, category)?;
        Ok(self.publish(next))
    }

    /// Feeds a render width back from the rendering surface.
    pub fn set_measured_width(
        &mut self,
        node: NodeId,
        width: f64,
    ) -> ApplicationResult<Arc<Snapshot>> {
        let next = self.service.set_measured_width(&self.snapshot, node, width)?;
        Ok(self.publish(next))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn enter_relink_mode(&mut self) -> ApplicationResult<()> {
        self.require_feature(Feature::Relink)?;
        if self.relink == RelinkState::Idle {
            self.relink = RelinkState::AwaitingSource;
            info!("relink mode on");
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    pub fn exit_relink_mode(&mut self) {
        if self.relink != RelinkState::Idle {
            info!("relink mode off");
        }
        self.relink = RelinkState::Idle;
    }

    pub fn toggle_relink_mode(&mut self) -> ApplicationResult<()> {
        match self.relink {
            RelinkState::Idle => self.enter_relink_mode(),
            _ => {
                self.exit_relink_mode();
                Ok(())
            }
        }
    }

    /// Drops any pending selection without touching the tree.
    #[instrument(level = "debug", skip(self))]
    pub fn cancel_relink_selection(&mut self) {
        self.relink = RelinkState::Idle;
    }

    /// Handles a node click while relink mode is active.
    ///
    /// Invalid selections leave both the state and the tree unchanged.
    #[instrument(level = "debug", skip(self))]
    pub fn select_for_relink(&mut self, node: NodeId) -> SelectionOutcome {
        match self.relink {
            RelinkState::Idle => SelectionOutcome::Ignored(IgnoreReason::NotInRelinkMode),
            RelinkState::AwaitingSource => match self.snapshot.node(node) {
                None => SelectionOutcome::Ignored(IgnoreReason::UnknownNode(node)),
                Some(n) if n.is_root() => SelectionOutcome::Ignored(IgnoreReason::RootSelected),
                Some(_) => {
                    debug!("select_for_relink: source {}", node);
                    self.relink = RelinkState::AwaitingTarget(node);
                    SelectionOutcome::SourceSelected(node)
                }
            },
            RelinkState::AwaitingTarget(source) => {
                if let Err(e) = self.service.check_relink(&self.snapshot, source, node) {
                    debug!("select_for_relink: target {} rejected: {}", node, e);
                    return SelectionOutcome::Ignored(IgnoreReason::Rejected(e));
                }
                let next = self.service.apply_relink(&self.snapshot, source, node);
                self.relink = RelinkState::Idle;
                SelectionOutcome::Relinked(self.publish(next))
            }
        }
    }

    fn require_feature(&self, feature: Feature) -> ApplicationResult<()> {
        let enabled = match feature {
            Feature::Relink => self.features.relink,
            Feature::Categories => self.features.categories,
        };
        if enabled {
            Ok(())
        } else {
            Err(ApplicationError::FeatureDisabled(feature))
        }
    }

    fn publish(&mut self, next: Snapshot) -> Arc<Snapshot> {
        self.snapshot = Arc::new(next);
        Arc::clone(&self.snapshot)
    }
}
