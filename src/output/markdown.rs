use crate::rules::Assessment;

/// Render an assessment as a markdown document.
///
/// This is also the format persisted by `--output-file`, so it must stay
/// free of terminal escapes.
pub fn render(assessment: &Assessment) -> String {
    let mut output = String::from("# OWASP Top 10 Issues\n\n");

    if assessment.is_empty() {
        output.push_str("No OWASP Top 10 issues found.\n");
        return output;
    }

    for group in assessment.groups() {
        output.push_str(&format!(
            "## {} ({})\n",
            group.category,
            group.severity.to_string().to_uppercase()
        ));
        for item in &group.evidence {
            output.push_str(&format!("- {}\n", item));
        }
        output.push('\n');
    }

    output
}
