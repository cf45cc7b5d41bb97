//! Prompt construction from a template, a diff, and branch context.

use crate::settings::locale::Locale;

/// Substitute `{locale}`, `{branch}`, and `{diff}` into a prompt template.
///
/// Locale and branch are replaced first. The diff goes in last: it replaces
/// `{diff}` when the template contains one, otherwise it is appended on a
/// new line. Substituting the diff last keeps placeholder-looking text
/// inside the diff from being expanded. All replacement is literal and
/// non-recursive.
pub fn construct_prompt(template: &str, diff: &str, branch: &str, locale: &Locale) -> String {
    let content = template
        .replace("{locale}", locale.display_language())
        .replace("{branch}", branch);

    if content.contains("{diff}") {
        content.replace("{diff}", diff)
    } else {
        format!("{content}\n{diff}")
    }
}
