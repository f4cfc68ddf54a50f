use crate::catalog::TemplateVersion;
use std::collections::BTreeMap;

/// Find the historical version whose body is byte-identical to `content`.
///
/// No whitespace or line-ending normalization happens: a file that differs
/// only in trailing whitespace counts as customized. When several versions
/// share a body the lowest one wins.
pub fn match_version<'a>(
    content: &str,
    previous: &'a BTreeMap<TemplateVersion, String>,
) -> Option<(TemplateVersion, &'a str)> {
    previous
        .iter()
        .find(|(_, body)| body.as_str() == content)
        .map(|(version, body)| (*version, body.as_str()))
}
