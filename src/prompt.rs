use std::collections::HashMap;

/// Build a prompt string with variable substitution.
///
/// Replaces `{key}` placeholders in the template with values from `vars`.
/// Placeholders without a matching variable are left as-is.
///
/// Use `{{` to insert a literal `{` and `}}` to insert a literal `}`.
///
/// The template is scanned once; substituted values are copied verbatim and
/// never scanned again, so a value containing `{other}` stays literal.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use growth_pipeline::prompt::render;
///
/// let vars = HashMap::from([("brand_name".to_string(), "Popcorn Labs".to_string())]);
/// let result = render("Launch {brand_name}, reply as {{\"ok\": true}}", &vars);
/// assert_eq!(result, r#"Launch Popcorn Labs, reply as {"ok": true}"#);
/// ```
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(|c| c == '{' || c == '}') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let Some(after) = tail.strip_prefix('{') {
            let value = after
                .find('}')
                .and_then(|end| vars.get(&after[..end]).map(|v| (v, end)));
            match value {
                Some((value, end)) => {
                    out.push_str(value);
                    rest = &after[end + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        } else {
            // A lone `}`.
            out.push('}');
            rest = &tail[1..];
        }
    }

    out.push_str(rest);
    out
}

/// Wrap text in a labeled section for structured prompts.
pub fn section(label: &str, content: &str) -> String {
    format!("## {}\n{}", label, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_basic() {
        let result = render(
            "Grow {brand_name} in {niche}",
            &vars(&[("brand_name", "Popcorn Labs"), ("niche", "AI storyboard SaaS")]),
        );
        assert_eq!(result, "Grow Popcorn Labs in AI storyboard SaaS");
    }

    #[test]
    fn test_render_unknown_placeholder_left_alone() {
        let result = render("Budget: {budget_level}", &HashMap::new());
        assert_eq!(result, "Budget: {budget_level}");
    }

    #[test]
    fn test_render_values_are_not_rescanned() {
        let vars = vars(&[("brand_name", "{niche}"), ("niche", "SaaS")]);
        for _ in 0..20 {
            assert_eq!(render("Brand: {brand_name}", &vars), "Brand: {niche}");
        }
        assert_eq!(render("{niche} / {brand_name}", &vars), "SaaS / {niche}");
    }

    #[test]
    fn test_render_value_with_braces_is_literal() {
        let result = render("Voice: {brand_voice}", &vars(&[("brand_voice", "{{bold}}")]));
        assert_eq!(result, "Voice: {{bold}}");
    }

    #[test]
    fn test_render_stray_braces_survive() {
        let result = render("a } b { c {brand_name", &vars(&[("brand_name", "X")]));
        assert_eq!(result, "a } b { c {brand_name");
    }

    #[test]
    fn test_section() {
        let result = section("Context", "Earlier findings");
        assert_eq!(result, "## Context\nEarlier findings");
    }

    #[test]
    fn test_render_escaped_braces_no_substitution() {
        let result = render("Output format: {{\"result\": {{\"value\": 42}}}}", &HashMap::new());
        assert_eq!(result, r#"Output format: {"result": {"value": 42}}"#);
    }

    #[test]
    fn test_render_mixed_escaped_and_placeholder() {
        let result = render(
            "Voice is {brand_voice}, format: {{\"type\": \"object\"}}",
            &vars(&[("brand_voice", "bold")]),
        );
        assert_eq!(result, r#"Voice is bold, format: {"type": "object"}"#);
    }
}
