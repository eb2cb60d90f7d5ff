//! Strategy registry: name to strategy, order-preserving. A plain value
//! constructed once per process and passed by reference; no globals.

use super::strategies;
use super::strategy::Strategy;

pub struct StrategyRegistry {
    entries: Vec<Box<dyn Strategy>>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// All 13 builtin strategies in canonical order.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for strategy in strategies::builtin() {
            registry.register(strategy);
        }
        registry
    }

    /// Registers a strategy, replacing any existing one with the same name.
    /// External plugins extend the builtin set through this.
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        let name = strategy.name();
        match self.entries.iter().position(|s| s.name() == name) {
            Some(idx) => self.entries[idx] = strategy,
            None => self.entries.push(strategy),
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Strategy> {
        self.entries
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|s| s.name()).collect()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CANONICAL_ORDER;
    use crate::slicer::strategy::{StrategyContext, StrategyOutput};

    #[test]
    fn test_builtin_covers_canonical_order() {
        let registry = StrategyRegistry::builtin();
        for name in CANONICAL_ORDER {
            assert!(registry.contains(name), "missing builtin strategy {name}");
        }
        assert_eq!(registry.names().len(), CANONICAL_ORDER.len());
    }

    #[test]
    fn test_weights_in_unit_interval() {
        let registry = StrategyRegistry::builtin();
        for name in registry.names() {
            let strategy = registry.get(name).unwrap();
            let w = strategy.weight();
            assert!(w > 0.0 && w <= 1.0, "{name} weight {w} out of (0, 1]");
            if let Some(cap) = strategy.budget_cap() {
                assert!(cap > 0.0 && cap <= 1.0, "{name} cap {cap} out of range");
            }
        }
    }

    struct FakeKeyword;

    impl Strategy for FakeKeyword {
        fn name(&self) -> &'static str {
            "keyword"
        }
        fn weight(&self) -> f32 {
            0.5
        }
        fn execute(&self, _ctx: &StrategyContext) -> StrategyOutput {
            StrategyOutput::default()
        }
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = StrategyRegistry::builtin();
        let before = registry.names().len();
        registry.register(Box::new(FakeKeyword));
        assert_eq!(registry.names().len(), before);
        assert_eq!(registry.get("keyword").unwrap().weight(), 0.5);
    }
}
