//! Template rendering for stage descriptions.
//!
//! Placeholders use `{name}` syntax, where `name` is either a fixed
//! context field (`context`, `source_data`, `user_brief`,
//! `system_prompt`) or `<upstream_stage_id>.output`. Unknown names are
//! a definition error, caught when the pipeline is validated rather
//! than when a stage runs.

use crate::domain::context::PipelineContext;

use super::error::PipelineError;

/// Context field names resolvable in any template
pub const CONTEXT_FIELDS: &[&str] = &["context", "source_data", "user_brief", "system_prompt"];

/// Suffix marking an upstream-output placeholder
const OUTPUT_SUFFIX: &str = ".output";

/// Extract placeholder names from a template.
///
/// A placeholder is a `{...}` token whose inner text is a non-empty run
/// of `[A-Za-z0-9_.]`. Anything else (CSS braces, empty braces) is left
/// alone by rendering and ignored here.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let bytes = template.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(close) = template[i + 1..].find('}') {
                let name = &template[i + 1..i + 1 + close];
                if is_placeholder_name(name) {
                    found.push(name);
                    i += close + 2;
                    continue;
                }
            }
        }
        i += 1;
    }

    found
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// If `name` is an upstream-output placeholder, return the stage id
fn upstream_stage(name: &str) -> Option<&str> {
    name.strip_suffix(OUTPUT_SUFFIX).filter(|s| !s.is_empty())
}

/// Definition-time check: every placeholder in `template` must be a
/// context field or `<id>.output` for an id in `upstream_ids`.
pub fn validate_template(
    stage_id: &str,
    template: &str,
    upstream_ids: &[String],
) -> Result<(), PipelineError> {
    for name in placeholders(template) {
        let resolvable = CONTEXT_FIELDS.contains(&name)
            || upstream_stage(name)
                .map(|id| upstream_ids.iter().any(|u| u == id))
                .unwrap_or(false);

        if !resolvable {
            return Err(PipelineError::UnresolvedPlaceholder {
                stage: stage_id.to_string(),
                placeholder: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Substitute every placeholder with its resolved value.
///
/// `upstream` pairs stage ids with their recorded output text. A
/// placeholder that cannot be resolved is an error; a validated
/// pipeline never hits it at run time.
pub fn render(
    stage_id: &str,
    template: &str,
    context: &PipelineContext,
    upstream: &[(&str, &str)],
) -> Result<String, PipelineError> {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(close) = template[i + 1..].find('}') {
                let name = &template[i + 1..i + 1 + close];
                if is_placeholder_name(name) {
                    let value = resolve(name, context, upstream).ok_or_else(|| {
                        PipelineError::UnresolvedPlaceholder {
                            stage: stage_id.to_string(),
                            placeholder: name.to_string(),
                        }
                    })?;
                    out.push_str(&value);
                    i += close + 2;
                    continue;
                }
            }
        }
        // not a placeholder: copy the character through
        let ch_len = template[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&template[i..i + ch_len]);
        i += ch_len;
    }

    Ok(out)
}

fn resolve(name: &str, context: &PipelineContext, upstream: &[(&str, &str)]) -> Option<String> {
    match name {
        "context" => Some(context.as_block()),
        "source_data" => Some(context.source_data.clone()),
        "user_brief" => Some(context.user_brief.clone()),
        "system_prompt" => Some(context.system_prompt.clone()),
        _ => {
            let id = upstream_stage(name)?;
            upstream
                .iter()
                .find(|(stage, _)| *stage == id)
                .map(|(_, output)| output.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PipelineContext {
        PipelineContext::new("DATA", "X", "PROMPT")
    }

    #[test]
    fn test_placeholder_scan() {
        let names = placeholders("Use {context} and {strategy.output}, not { } or {bad name}.");
        assert_eq!(names, vec!["context", "strategy.output"]);
    }

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let rendered = render(
            "writing",
            "Brief: {user_brief}\nPlan: {strategy.output}",
            &ctx(),
            &[("strategy", "Y")],
        )
        .unwrap();

        assert!(rendered.contains("Brief: X"));
        assert!(rendered.contains("Plan: Y"));
        assert!(!rendered.contains('{'));
    }

    #[test]
    fn test_render_context_block() {
        let rendered = render("strategy", "Context: {context}", &ctx(), &[]).unwrap();
        assert!(rendered.contains("DATA"));
        assert!(rendered.contains("PROMPT"));
    }

    #[test]
    fn test_unknown_placeholder_fails() {
        let err = render("writing", "{nonsense_field}", &ctx(), &[]).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnresolvedPlaceholder { ref placeholder, .. } if placeholder == "nonsense_field"
        ));
    }

    #[test]
    fn test_unresolved_upstream_fails() {
        let err = render("editing", "{fact_check.output}", &ctx(), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvedPlaceholder { .. }));
    }

    #[test]
    fn test_validate_rejects_undeclared_upstream() {
        let err =
            validate_template("editing", "{writing.output}", &["fact_check".to_string()])
                .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnresolvedPlaceholder { ref stage, .. } if stage == "editing"
        ));
    }

    #[test]
    fn test_literal_braces_survive_rendering() {
        let rendered = render(
            "html_format",
            "body { margin: 0; } Brief: {user_brief}",
            &ctx(),
            &[],
        )
        .unwrap();
        assert_eq!(rendered, "body { margin: 0; } Brief: X");
    }
}
