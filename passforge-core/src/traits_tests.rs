#[cfg(test)]
mod tests {
    use crate::ir::Function;
    use crate::traits::*;
    use std::collections::HashSet;

    // ===== Test Implementations =====

    struct FixedLoops {
        with_loops: HashSet<String>,
    }

    impl LoopQuery for FixedLoops {
        fn has_loops(&self, function: &str) -> bool {
            self.with_loops.contains(function)
        }
    }

    struct NamePrefixViability;

    impl InlineViability for NamePrefixViability {
        fn is_inline_viable(&self, callee: &Function) -> bool {
            !callee.name.starts_with("opaque_")
        }
    }

    #[test]
    fn test_loop_query_through_reference() {
        let loops = FixedLoops {
            with_loops: ["spin".to_string()].into_iter().collect(),
        };
        let by_ref: &dyn LoopQuery = &loops;
        assert!((&by_ref).has_loops("spin"));
        assert!(!(&loops).has_loops("main"));
    }

    #[test]
    fn test_inline_viability_as_trait_object() {
        let viability: Box<dyn InlineViability> = Box::new(NamePrefixViability);
        assert!(viability.is_inline_viable(&Function::declaration("helper")));
        assert!(!viability.is_inline_viable(&Function::declaration("opaque_thing")));
    }
}
