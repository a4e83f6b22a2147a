#[cfg(test)]
mod tests {
    use crate::debug_info::*;
    use crate::traits::DebugInfoQuery;

    fn sample() -> DebugInfo {
        DebugInfo::new()
            .with_unit(
                CompileUnit::new("/src/app", "main.c")
                    .with_subprogram(Subprogram::new("main", 12))
                    .with_subprogram(Subprogram::new("helper", 3).in_file("/src/app/include", "util.h")),
            )
            .with_unit(CompileUnit::new("/src/lib", "lib.c").with_subprogram(Subprogram::new("lib_init", 40)))
    }

    #[test]
    fn test_location_inherits_unit_file() {
        let loc = sample().function_location("main").unwrap();
        assert_eq!(loc.directory, "/src/app");
        assert_eq!(loc.filename, "main.c");
        assert_eq!(loc.line, 12);
        assert_eq!(loc.to_string(), "/src/app/main.c 12");
    }

    #[test]
    fn test_location_uses_subprogram_file() {
        let loc = sample().function_location("helper").unwrap();
        assert_eq!(loc.to_string(), "/src/app/include/util.h 3");
    }

    #[test]
    fn test_lookup_searches_every_unit() {
        let loc = sample().function_location("lib_init").unwrap();
        assert_eq!(loc.to_string(), "/src/lib/lib.c 40");
    }

    #[test]
    fn test_missing_function() {
        assert!(sample().function_location("ghost").is_none());
        assert!(DebugInfo::new().function_location("main").is_none());
    }

    #[test]
    fn test_subprogram_without_function_is_skipped() {
        let mut detached = Subprogram::new("gone", 7);
        detached.function = None;
        let info = DebugInfo::new().with_unit(CompileUnit::new("/d", "f.c").with_subprogram(detached));
        assert!(info.function_location("gone").is_none());
        assert_eq!(info.compile_units[0].subprograms().len(), 1);
    }

    #[test]
    fn test_module_query_without_debug_info() {
        let module = crate::ir::Module::new("m");
        assert!(module.function_location("main").is_none());
    }
}
