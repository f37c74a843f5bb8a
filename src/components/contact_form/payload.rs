use serde::ser::{Serialize, SerializeMap, Serializer};

/// Field values captured from a form, in document order.
///
/// Repeated names (checkbox groups, multi-selects) keep every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    entries: Vec<(String, String)>,
}

impl FormPayload {
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// First value for `name`.
    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Distinct field names in order of first appearance.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// `application/x-www-form-urlencoded` body.
    pub fn to_urlencoded(&self) -> String {
        self.entries
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormPayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::default();
        for (name, value) in iter {
            payload.push(name, value);
        }
        payload
    }
}

/// Serializes as an object: single-valued fields map to a string, repeated
/// fields to an array of strings.
impl Serialize for FormPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.names();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in names {
            let values = self.get_all(name);
            match values.as_slice() {
                [single] => map.serialize_entry(name, single)?,
                many => map.serialize_entry(name, many)?,
            }
        }
        map.end()
    }
}
