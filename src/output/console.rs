use colored::{ColoredString, Colorize};

use crate::rules::{Assessment, Severity};

/// Render an assessment as an annotated terminal report, grouped by category.
///
/// Emphasis follows severity: high is bold red, medium bold yellow, low
/// plain yellow. Colour is dropped automatically when stdout is not a tty
/// or `NO_COLOR` is set.
pub fn render(assessment: &Assessment) -> String {
    let mut output = String::new();

    if assessment.is_empty() {
        output.push_str(&format!("{}\n", "No OWASP Top 10 issues found!".green()));
    } else {
        output.push_str(&format!("{}\n", "OWASP Top 10 Issues:".red().bold()));

        for group in assessment.groups() {
            let heading = format!(
                "[{}] ({})",
                group.category,
                group.severity.to_string().to_uppercase()
            );
            output.push_str(&format!("\n{}\n", emphasize(&heading, group.severity)));
            for item in &group.evidence {
                output.push_str(&format!(
                    "{}\n",
                    emphasize(&format!("- {}", item), group.severity)
                ));
            }
        }
    }

    let counts = assessment.counts();
    output.push_str(&format!(
        "\nFound issues: high={}, medium={}, low={}\n",
        counts.high, counts.medium, counts.low
    ));

    output
}

fn emphasize(text: &str, severity: Severity) -> ColoredString {
    match severity {
        Severity::High => text.red().bold(),
        Severity::Medium => text.yellow().bold(),
        Severity::Low => text.yellow(),
    }
}
