// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Persona shared by every career-facing prompt.
pub const CAREER_PERSONA: &str = "You are JobTalk, an experienced career mentor for \
    students and job seekers in Korea. You know the Korean job market, national \
    qualifications and typical hiring paths. Be concrete and practical.";

/// Fills `{name}` placeholders in one left-to-right pass.
/// Substituted values are never rescanned, so text that happens to contain
/// `{...}` is inserted verbatim. Unknown placeholders are left untouched.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let value = after.find('}').and_then(|end| {
            let name = &after[..end];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, end))
        });
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
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_substitutes_known_keys() {
        let filled = fill_template("a {x} b {y}", &[("x", "1"), ("y", "2")]);
        assert_eq!(filled, "a 1 b 2");
    }

    #[test]
    fn test_fill_template_does_not_rescan_inserted_values() {
        let filled = fill_template(
            "title={title} rule={rule}",
            &[("title", "{rule} 전문가"), ("rule", "R")],
        );
        assert_eq!(filled, "title={rule} 전문가 rule=R");
    }

    #[test]
    fn test_fill_template_keeps_unknown_and_unclosed_braces() {
        let filled = fill_template("{a} {unknown} {", &[("a", "x")]);
        assert_eq!(filled, "x {unknown} {");
    }
}
