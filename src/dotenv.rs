//! Dotenv projection of remote variables

use reconcile::{Variable, VariableSet};

/// Prefix stripped from keys unless `--prefix` says otherwise
pub const DEFAULT_PREFIX: &str = "K8S_SECRET_";

/// Render the `env_var` variables visible in `scope` as dotenv lines
///
/// A variable is visible when its scope is `scope` or `*`. File variables
/// and other kinds are skipped. `prefix` is removed once from the start of
/// each key.
pub fn render(variables: &VariableSet, scope: &str, prefix: &str) -> String {
    variables
        .iter()
        .filter(|v| v.variable_type.is_env_var() && v.applies_to(scope))
        .map(|v| line(v, prefix))
        .collect()
}

fn line(variable: &Variable, prefix: &str) -> String {
    let key = variable
        .key
        .strip_prefix(prefix)
        .unwrap_or(&variable.key);
    format!("{key}=\"{}\"\n", escape(&variable.value))
}

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::VariableType;

    #[test]
    fn test_scope_and_type_filter() {
        let mut cert = Variable::new("K8S_SECRET_CERT", "*", "pem");
        cert.variable_type = VariableType::File;

        let set = VariableSet::from(vec![
            Variable::new("K8S_SECRET_DB", "*", "postgres"),
            Variable::new("K8S_SECRET_API", "qa", "qa-key"),
            Variable::new("K8S_SECRET_API", "prod", "prod-key"),
            cert,
        ]);

        assert_eq!(
            render(&set, "qa", DEFAULT_PREFIX),
            "DB=\"postgres\"\nAPI=\"qa-key\"\n"
        );
        assert_eq!(render(&set, "*", DEFAULT_PREFIX), "DB=\"postgres\"\n");
    }

    #[test]
    fn test_prefix_stripped_once_from_start() {
        let set = VariableSet::from(vec![
            Variable::new("K8S_SECRET_K8S_SECRET_X", "*", "1"),
            Variable::new("PLAIN_K8S_SECRET_Y", "*", "2"),
        ]);
        assert_eq!(
            render(&set, "*", DEFAULT_PREFIX),
            "K8S_SECRET_X=\"1\"\nPLAIN_K8S_SECRET_Y=\"2\"\n"
        );
        assert_eq!(
            render(&set, "*", ""),
            "K8S_SECRET_K8S_SECRET_X=\"1\"\nPLAIN_K8S_SECRET_Y=\"2\"\n"
        );
    }

    #[test]
    fn test_values_are_escaped() {
        let set = VariableSet::from(vec![Variable::new("A", "*", "say \"hi\"\\\nbye")]);
        assert_eq!(render(&set, "*", ""), "A=\"say \\\"hi\\\"\\\\\\nbye\"\n");
    }

    #[test]
    fn test_empty_projection() {
        assert_eq!(render(&VariableSet::new(), "qa", DEFAULT_PREFIX), "");
    }
}
