#[cfg(test)]
mod tests {
    use crate::diagnostics::*;

    #[test]
    fn test_captured_streams_are_separate() {
        let mut diag = Diagnostics::captured();
        diag.out("to out").unwrap();
        diag.err("to err").unwrap();
        diag.err(format_args!("{} {}", "second", 2)).unwrap();

        assert_eq!(diag.out_text(), "to out\n");
        assert_eq!(diag.err_lines(), vec!["to err", "second 2"]);
    }

    #[test]
    fn test_escape_plain_name() {
        assert_eq!(escape_name("main"), "main");
        assert_eq!(escape_name("_ZN3foo3barEv"), "_ZN3foo3barEv");
    }

    #[test]
    fn test_escape_special_characters() {
        assert_eq!(escape_name("a\\b"), "a\\\\b");
        assert_eq!(escape_name("tab\there"), "tab\\there");
        assert_eq!(escape_name("q\"uote"), "q\\\"uote");
        assert_eq!(escape_name("bell\u{7}"), "bell\\007");
        assert_eq!(escape_name("é"), "\\303\\251");
    }
}
