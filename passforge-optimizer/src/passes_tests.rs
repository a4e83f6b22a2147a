#[cfg(test)]
mod tests {
    use crate::analysis::{InlineCostAnalysis, ModuleLoopInfo};
    use crate::diagnostics::Diagnostics;
    use crate::inliner::InlineCost;
    use crate::passes::find_loops::*;
    use crate::passes::function_line_number::*;
    use crate::passes::function_names::*;
    use crate::passes::scoped_inline::*;
    use crate::passes::ModulePass;
    use passforge_core::ir::*;
    use passforge_core::{
        CompileUnit, DebugInfo, Error, FunctionBuilder, LoopQuery, ModuleBuilder, Subprogram,
    };

    // ===== Helper Functions =====

    fn leaf(name: &str) -> Function {
        let mut fb = FunctionBuilder::new(name).internal();
        fb.ret(Some(Operand::Const(0)));
        fb.build()
    }

    fn caller(name: &str, callees: &[&str]) -> Function {
        let mut fb = FunctionBuilder::new(name);
        for callee in callees {
            fb.call_void(callee, vec![]);
        }
        fb.ret(None);
        fb.build()
    }

    fn looping(name: &str) -> Function {
        let mut fb = FunctionBuilder::with_params(name, 1);
        let entry = fb.create_block();
        let body = fb.create_block();
        let exit = fb.create_block();
        fb.switch_to(entry);
        fb.jump(body);
        fb.switch_to(body);
        fb.branch(fb.param(0), body, exit);
        fb.switch_to(exit);
        fb.ret(None);
        fb.build()
    }

    struct NoLoops;

    impl LoopQuery for NoLoops {
        fn has_loops(&self, _function: &str) -> bool {
            false
        }
    }

    // ===== Find Loops Tests =====

    #[test]
    fn test_find_loops_reports_only_looping_functions() {
        let mut module = ModuleBuilder::new("m")
            .function(caller("main", &["spin"]))
            .function(looping("spin"))
            .function(looping("wait"))
            .declare("ext")
            .build()
            .unwrap();

        let mut pass = FindLoopsPass::new();
        let mut diag = Diagnostics::captured();
        let changed = pass.run(&mut module, &mut diag).unwrap();

        assert!(!changed);
        assert_eq!(diag.err_lines(), vec!["spin", "wait"]);
        assert!(diag.out_text().is_empty());
        assert_eq!(pass.stats().functions_with_loops, 2);
        assert_eq!(pass.stats().functions_visited, 3);
    }

    #[test]
    fn test_find_loops_uses_supplied_analysis() {
        let module = ModuleBuilder::new("m")
            .function(looping("spin"))
            .build()
            .unwrap();

        let mut diag = Diagnostics::captured();
        let found = report_functions_with_loops(&module, &NoLoops, &mut diag).unwrap();
        assert_eq!(found, 0);
        assert!(diag.err_text().is_empty());

        let loops = ModuleLoopInfo::compute(&module);
        let found = report_functions_with_loops(&module, &loops, &mut diag).unwrap();
        assert_eq!(found, 1);
    }

    #[test]
    fn test_find_loops_escapes_names() {
        let module = ModuleBuilder::new("m")
            .function(looping("weird\tname"))
            .build()
            .unwrap();
        let mut diag = Diagnostics::captured();
        report_functions_with_loops(&module, &ModuleLoopInfo::compute(&module), &mut diag)
            .unwrap();
        assert_eq!(diag.err_text(), "weird\\tname\n");
    }

    // ===== Function Names Tests =====

    #[test]
    fn test_function_names_in_module_order() {
        let mut module = ModuleBuilder::new("m")
            .function(caller("main", &["b"]))
            .declare("printf")
            .function(leaf("b"))
            .function(leaf("a"))
            .build()
            .unwrap();

        let mut pass = FunctionNamesPass::new();
        let mut diag = Diagnostics::captured();
        pass.run(&mut module, &mut diag).unwrap();

        assert_eq!(diag.err_lines(), vec!["main", "b", "a"]);
        assert_eq!(pass.stats().functions_visited, 3);
    }

    #[test]
    fn test_function_names_empty_module() {
        let module = Module::new("empty");
        let mut diag = Diagnostics::captured();
        assert_eq!(report_function_names(&module, &mut diag).unwrap(), 0);
        assert!(diag.err_text().is_empty());
        assert!(!FunctionNamesPass::new().is_applicable(&module));
    }

    // ===== Function Line Number Tests =====

    fn with_debug_info() -> Module {
        let unit = CompileUnit::new("/src/project", "main.c")
            .with_subprogram(Subprogram::new("main", 3))
            .with_subprogram(Subprogram::new("util", 40).in_file("/src/project/lib", "util.c"));
        ModuleBuilder::new("m")
            .function(caller("main", &["util"]))
            .function(leaf("util"))
            .function(leaf("undocumented"))
            .debug_info(DebugInfo::new().with_unit(unit))
            .build()
            .unwrap()
    }

    #[test]
    fn test_line_number_requires_function_name() {
        assert!(matches!(
            FunctionLineNumberPass::new(None),
            Err(Error::MissingOption("function-name"))
        ));
        assert!(FunctionLineNumberPass::new(Some(String::new())).is_err());
    }

    #[test]
    fn test_line_number_prints_location() {
        let mut module = with_debug_info();

        let mut pass = FunctionLineNumberPass::new(Some("main".to_string())).unwrap();
        let mut diag = Diagnostics::captured();
        pass.run(&mut module, &mut diag).unwrap();
        assert_eq!(diag.out_text(), "/src/project/main.c 3\n");
        assert!(diag.err_text().is_empty());

        let mut pass = FunctionLineNumberPass::new(Some("util".to_string())).unwrap();
        let mut diag = Diagnostics::captured();
        pass.run(&mut module, &mut diag).unwrap();
        assert_eq!(diag.out_text(), "/src/project/lib/util.c 40\n");
    }

    #[test]
    fn test_line_number_without_debug_info() {
        let mut module = with_debug_info();
        let mut diag = Diagnostics::captured();
        let found =
            report_function_location(&module, "undocumented", &module, &mut diag).unwrap();
        assert!(found);
        assert_eq!(diag.out_lines(), vec![NO_DEBUG_INFO_MESSAGE]);

        module.debug_info = None;
        let mut diag = Diagnostics::captured();
        report_function_location(&module, "main", &module, &mut diag).unwrap();
        assert_eq!(diag.out_lines(), vec![NO_DEBUG_INFO_MESSAGE]);
    }

    #[test]
    fn test_line_number_unknown_function_is_silent() {
        let module = with_debug_info();
        let mut diag = Diagnostics::captured();
        let found = report_function_location(&module, "ghost", &module, &mut diag).unwrap();
        assert!(!found);
        assert!(diag.out_text().is_empty());
        assert!(diag.err_text().is_empty());
    }

    // ===== Scoped Inline Policy Tests =====

    #[test]
    fn test_policy_requires_target() {
        assert!(matches!(
            ScopedInlinePolicy::new(None),
            Err(Error::MissingOption("inline-only-in-function"))
        ));
        assert!(matches!(
            ScopedInlinePass::new(Some(String::new())),
            Err(Error::MissingOption(TARGET_OPTION))
        ));
        assert_eq!(
            Error::MissingOption(TARGET_OPTION).to_string(),
            "inline-only-in-function argument missing"
        );
    }

    #[test]
    fn test_policy_decisions() {
        let mut main = FunctionBuilder::new("main");
        main.call_void("helper", vec![]);
        main.call_void("printf", vec![]);
        main.call_indirect(Operand::Function("helper".to_string()), vec![]);
        main.call_void("varargs", vec![]);
        main.call_void("missing", vec![]);
        main.ret(None);

        let varargs = Function {
            attributes: FunctionAttributes {
                variadic: true,
                ..Default::default()
            },
            ..leaf("varargs")
        };

        let module = ModuleBuilder::new("m")
            .function(main.build())
            .function(caller("other", &["helper"]))
            .function(leaf("helper"))
            .function(varargs)
            .declare("printf")
            .build()
            .unwrap();
        let viability = InlineCostAnalysis::new(&module);
        let policy = ScopedInlinePolicy::new(Some("main".to_string())).unwrap();
        let decide = |site: &CallSite| policy.decide(site, &module, &viability);

        let main_sites = module.function("main").unwrap().call_sites();
        let verdicts: Vec<InlineCost> = main_sites.iter().map(decide).collect();
        assert_eq!(
            verdicts,
            vec![
                InlineCost::Always,
                InlineCost::Never,
                InlineCost::Never,
                InlineCost::Never,
                InlineCost::Never,
            ]
        );

        let other_site = &module.function("other").unwrap().call_sites()[0];
        assert_eq!(decide(other_site), InlineCost::Never);
    }

    #[test]
    fn test_pass_names() {
        assert_eq!(FindLoopsPass::new().name(), "find-loops");
        assert_eq!(FunctionNamesPass::new().name(), "function-names");
        assert_eq!(
            FunctionLineNumberPass::new(Some("f".to_string())).unwrap().name(),
            "function-line-number"
        );
        let pass = ScopedInlinePass::new(Some("main".to_string())).unwrap();
        assert_eq!(pass.name(), "all-inline");
        assert_eq!(pass.target(), "main");
    }
}
