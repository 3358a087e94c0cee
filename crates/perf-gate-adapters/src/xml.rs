// crates/perf-gate-adapters/src/xml.rs
// ============================================================================
// Module: XML Helpers
// Description: Attribute extraction over quick-xml start tags.
// Purpose: Share attribute lookup and error mapping across XML adapters.
// Dependencies: quick-xml
// ============================================================================

use std::collections::BTreeMap;

use quick_xml::events::BytesStart;

/// Attributes of one element keyed by name.
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    /// Collects and unescapes the attributes of an element.
    pub fn of(element: &BytesStart<'_>) -> Result<Self, String> {
        let mut values = BTreeMap::new();
        for attribute in element.attributes() {
            let attribute = attribute.map_err(|err| format!("malformed attribute: {err}"))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|err| format!("malformed attribute {key}: {err}"))?
                .into_owned();
            values.insert(key, value);
        }
        Ok(Self(values))
    }

    /// Returns the first attribute present among `names`, tried in order.
    pub fn first_of(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.0.get(*name)).map(String::as_str)
    }

    /// Returns one attribute.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// Returns the local element name as text.
pub fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}
