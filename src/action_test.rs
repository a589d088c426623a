#[cfg(test)]
mod tests {
    use crate::action::Action;
    use crate::Error;

    #[test]
    fn test_valid_verbs() {
        for verb in ["get", "create", "delete", "update", "patch", "*"] {
            assert!(Action::is_valid(verb), "{} should be valid", verb);
        }
    }

    #[test]
    fn test_invalid_verbs() {
        for verb in ["", "list", "watch", "deletecollection", "GET", " get", "any"] {
            assert!(!Action::is_valid(verb), "{:?} should be invalid", verb);
        }
    }

    #[test]
    fn test_parse_reports_offending_verb() {
        let err = "list".parse::<Action>().unwrap_err();
        assert!(matches!(err, Error::InvalidAction(ref v) if v == "list"));
    }

    #[test]
    fn test_display_matches_parse() {
        let actions = [
            Action::Get,
            Action::Create,
            Action::Delete,
            Action::Update,
            Action::Patch,
            Action::Any,
        ];
        for action in actions {
            assert_eq!(action.to_string().parse::<Action>().unwrap(), action);
        }
        assert_eq!(Action::Any.to_string(), "*");
    }

    #[test]
    fn test_only_any_is_wildcard() {
        assert!(Action::Any.is_wildcard());
        assert!(!Action::Create.is_wildcard());
    }

    #[test]
    fn test_serde_uses_verbs() {
        let value = serde_json::to_value(Action::Patch).unwrap();
        assert_eq!(value, serde_json::json!("patch"));
        let any: Action = serde_json::from_value(serde_json::json!("*")).unwrap();
        assert_eq!(any, Action::Any);
    }
}
