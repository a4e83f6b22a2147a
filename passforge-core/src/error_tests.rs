#[cfg(test)]
mod tests {
    use crate::error::*;
    use crate::ir::BlockId;
    use std::io;

    // ===== Error Creation Tests =====

    #[test]
    fn test_missing_option_error() {
        let err = Error::MissingOption("function-name");
        assert_eq!(err.to_string(), "function-name argument missing");
    }

    #[test]
    fn test_unknown_pass_error() {
        let err = Error::UnknownPass("loop-unroll".to_string());
        assert_eq!(err.to_string(), "Unknown pass: loop-unroll");
    }

    #[test]
    fn test_unknown_block_error() {
        let err = Error::UnknownBlock {
            function: "main".to_string(),
            block: BlockId(3),
        };
        assert_eq!(err.to_string(), "Unknown block bb3 in function main");
    }

    #[test]
    fn test_duplicate_function_error() {
        let err = Error::DuplicateFunction("helper".to_string());
        assert_eq!(err.to_string(), "Duplicate function: helper");
    }

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("IO error:"));
    }

    #[test]
    fn test_other_error() {
        let anyhow_err = anyhow::anyhow!("custom error");
        let err = Error::Other(anyhow_err);
        assert_eq!(err.to_string(), "custom error");
    }

    // ===== Error Conversion Tests =====

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().starts_with("JSON error:"));
    }

    #[test]
    fn test_from_anyhow_error() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let err: Error = anyhow_err.into();
        assert!(matches!(err, Error::Other(_)));
        assert_eq!(err.to_string(), "something went wrong");
    }

    // ===== Result Type Tests =====

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(Error::UnknownFunction("ghost".to_string()));
        assert!(matches!(result.unwrap_err(), Error::UnknownFunction(_)));
    }
}
