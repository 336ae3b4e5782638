use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is by `encodeURIComponent`; everything else is escaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub(crate) fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, URI_COMPONENT).to_string()
}

/// `mailto:` link with an optional recipient and encoded subject and body.
pub(crate) fn compose_link(recipient: &str, subject: &str, body: &str) -> String {
    format!(
        "mailto:{recipient}?subject={}&body={}",
        encode_component(subject),
        encode_component(body)
    )
}
