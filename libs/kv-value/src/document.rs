use crate::KvValue;
use indexmap::IndexMap;

/// An ordered set of key-value pairs. Insertion order is kept, because it is
/// part of what the client stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KvDocument {
    entries: IndexMap<String, KvValue>,
}

impl KvDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<KvValue>) -> Option<KvValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Builder flavour of [`KvDocument::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<KvValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&KvValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &KvValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, KvValue)> for KvDocument {
    fn from_iter<T: IntoIterator<Item = (String, KvValue)>>(iter: T) -> Self {
        KvDocument {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for KvDocument {
    type Item = (String, KvValue);
    type IntoIter = indexmap::map::IntoIter<String, KvValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let doc = KvDocument::new().with("z", 1).with("a", "x").with("m", true);

        assert_eq!(vec!["z", "a", "m"], doc.keys().collect::<Vec<_>>());
        assert_eq!(Some(&KvValue::Integer(1)), doc.get("z"));
    }
}
