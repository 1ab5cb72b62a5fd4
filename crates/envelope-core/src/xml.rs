//! The ENC pointer envelope's payload XML (spec.md §4.4.3 step 9). No XML
//! crate is pulled in for this — the document shape is small and fixed, so
//! it is built and read the same way this codebase builds any other
//! fixed-shape structured text: a handful of tag-at-a-time helpers.

/// Elements copied verbatim from the plaintext configuration into the
/// pointer file, if present.
const PRESERVED_ELEMENTS: &[&str] = &["ipAddressMode", "loadInformation", "capfAuthMode", "capfList"];

/// Pull the text content of `<tag>...</tag>` out of `xml`, if present. Not a
/// general-purpose XML parser — it assumes the single-line, non-nested
/// shape the device configuration documents always use for these elements.
pub fn extract_element(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = xml.find(&open)? + open.len();
    let rest = &xml[start..];
    let end = rest.find(&close)?;
    Some(rest[..end].to_string())
}

/// Build the companion pointer envelope's payload: `<fullConfig>false`,
/// whichever of [`PRESERVED_ELEMENTS`] were present in the original
/// plaintext, the recipient certificate's MD5 fingerprint as `<certHash>`,
/// and `<encrConfig>true`.
pub fn build_pointer_xml(plaintext_xml: &str, cert_hash_hex: &str) -> String {
    let mut body = String::from("<fullConfig>false</fullConfig>");
    for tag in PRESERVED_ELEMENTS {
        if let Some(value) = extract_element(plaintext_xml, tag) {
            body.push_str(&format!("<{tag}>{value}</{tag}>"));
        }
    }
    body.push_str(&format!("<certHash>{cert_hash_hex}</certHash>"));
    body.push_str("<encrConfig>true</encrConfig>");
    format!("<device>{body}</device>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_present_element() {
        let xml = "<device><loadInformation>X</loadInformation></device>";
        assert_eq!(extract_element(xml, "loadInformation").as_deref(), Some("X"));
    }

    #[test]
    fn missing_element_is_none() {
        let xml = "<device><loadInformation>X</loadInformation></device>";
        assert_eq!(extract_element(xml, "capfList"), None);
    }

    #[test]
    fn builds_pointer_document() {
        let xml = "<device><loadInformation>X</loadInformation></device>";
        let pointer = build_pointer_xml(xml, "deadbeef");
        assert_eq!(
            pointer,
            "<device><fullConfig>false</fullConfig><loadInformation>X</loadInformation><certHash>deadbeef</certHash><encrConfig>true</encrConfig></device>"
        );
    }
}
