//! `inventory`: directory tree overview, emitted as the `"tree"` sidecar.
//! Never produces candidates.

use crate::inspector::{TreeMode, TreeOptions};
use crate::slicer::candidate::StrategySidecar;
use crate::slicer::strategy::{Strategy, StrategyContext, StrategyOutput};

pub struct InventoryStrategy;

impl Strategy for InventoryStrategy {
    fn name(&self) -> &'static str {
        "inventory"
    }

    fn weight(&self) -> f32 {
        1.0
    }

    fn execute(&self, ctx: &StrategyContext) -> StrategyOutput {
        let opts = TreeOptions {
            // max_items doubles as tree depth for this strategy
            max_depth: Some(ctx.knobs.max_items.max(1)),
            mode: TreeMode::Full,
            path: None,
        };
        match ctx.inspector.tree(&opts) {
            Ok(tree) => {
                let tokens = (ctx.estimate)(&tree);
                StrategyOutput {
                    sidecar: Some(StrategySidecar {
                        name: "tree".to_string(),
                        content: tree,
                        tokens,
                    }),
                    ..Default::default()
                }
            }
            Err(e) => StrategyOutput::warning(format!("inventory: tree failed: {e}")),
        }
    }
}
