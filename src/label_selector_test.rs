#[cfg(test)]
mod tests {
    use crate::label_selector::{matches_label_selector, parse_label_selector};
    use std::collections::BTreeMap;

    fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_selector() {
        let labels = labels(&[("app", "test")]);
        assert!(matches_label_selector(&labels, "").unwrap());
        assert!(matches_label_selector(&labels, "   ").unwrap());
        assert!(matches_label_selector(&BTreeMap::new(), "").unwrap());
    }

    #[test]
    fn test_equality_selector() {
        let labels = labels(&[("app", "myapp"), ("env", "production")]);

        assert!(matches_label_selector(&labels, "app=myapp").unwrap());
        assert!(matches_label_selector(&labels, "app==myapp").unwrap());
        assert!(matches_label_selector(&labels, "app = myapp").unwrap());
        assert!(!matches_label_selector(&labels, "app=other").unwrap());
    }

    #[test]
    fn test_inequality_selector() {
        let labels = labels(&[("env", "production")]);

        assert!(matches_label_selector(&labels, "env!=staging").unwrap());
        assert!(!matches_label_selector(&labels, "env!=production").unwrap());
    }

    #[test]
    fn test_set_selectors() {
        let labels = labels(&[("env", "production")]);

        assert!(matches_label_selector(&labels, "env in (production,staging)").unwrap());
        assert!(!matches_label_selector(&labels, "env in (development, testing)").unwrap());
        assert!(matches_label_selector(&labels, "env notin (development,testing)").unwrap());
        assert!(!matches_label_selector(&labels, "env notin (production)").unwrap());
    }

    #[test]
    fn test_existence_selectors() {
        let labels = labels(&[("test-label", "label-value")]);

        assert!(matches_label_selector(&labels, "test-label").unwrap());
        assert!(!matches_label_selector(&labels, "other").unwrap());
        assert!(matches_label_selector(&labels, "!other").unwrap());
        assert!(!matches_label_selector(&labels, "!test-label").unwrap());
    }

    #[test]
    fn test_combined_selector() {
        let labels = labels(&[("app", "web"), ("env", "staging"), ("tier", "frontend")]);

        assert!(matches_label_selector(&labels, "app=web,env in (staging,production),tier").unwrap());
        assert!(!matches_label_selector(&labels, "app=web,env in (production),tier").unwrap());
        assert!(!matches_label_selector(&labels, "app=web,!tier").unwrap());
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(parse_label_selector("env in production").is_err());
        assert!(parse_label_selector("=value").is_err());
        assert!(parse_label_selector("env like prod").is_err());
    }
}
