//! XML cleanup applied before deserialization

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

/// Strip inline formatting tags (`<i>`, `<sup>`, `<sub>`, `<b>`, ...) that
/// appear inside `ArticleTitle` and `AbstractText`
///
/// quick-xml's serde layer cannot map mixed content onto a plain string, so
/// the markup is removed and only its text kept.
///
/// ```ignore
/// let cleaned = strip_inline_markup("<AbstractText>CO<sup>2</sup> levels</AbstractText>");
/// assert_eq!(cleaned, "<AbstractText>CO2 levels</AbstractText>");
/// ```
pub(crate) fn strip_inline_markup(xml: &str) -> String {
    static INLINE_TAG: OnceLock<Regex> = OnceLock::new();
    let re = INLINE_TAG.get_or_init(|| {
        Regex::new(r"</?(?:i|b|u|sup|sub|em|strong|italic|bold|underline|sc)(?:\s[^>]*)?>")
            .expect("inline tag pattern is valid")
    });

    let cleaned = re.replace_all(xml, "");
    if cleaned.len() != xml.len() {
        debug!(
            removed_bytes = xml.len() - cleaned.len(),
            "Stripped inline markup"
        );
    }

    cleaned.into_owned()
}
