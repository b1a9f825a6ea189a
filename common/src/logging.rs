/// Builds an `EnvFilter` directive string that applies `level` to every dispatch crate.
pub fn filter_directive(level: &str) -> String {
    format!(
        "dispatch_core={level},dispatch_api={level},\
        dispatch_proto={level},dispatch_common={level}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_covers_all_crates() {
        let directive = filter_directive("debug");
        assert!(directive.contains("dispatch_core=debug"));
        assert!(directive.contains("dispatch_api=debug"));
        assert_eq!(directive.split(',').count(), 4);
    }
}
