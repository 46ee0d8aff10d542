//! Small helpers over the `quick-xml` event API shared by the export and
//! route parsers.

use crate::domain::Attributes;
use quick_xml::events::BytesStart;

/// Collects the attributes of an element into a map
///
/// Values are unescaped; a broken attribute fails the whole element.
pub(crate) fn attributes_of(element: &BytesStart<'_>) -> Result<Attributes, String> {
    let mut map = Attributes::new();
    for attr in element.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        map.insert(key, value.into_owned());
    }
    Ok(map)
}

/// Local (prefix-free) name of an element as an owned string
pub(crate) fn local_name_of(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}
