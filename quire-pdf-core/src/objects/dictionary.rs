use crate::objects::Object;
use indexmap::IndexMap;

/// PDF dictionary. Keys keep insertion order so output is deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary {
    entries: IndexMap<String, Object>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Object>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Object>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Object)> {
        self.entries.iter()
    }

    pub fn get_dict(&self, key: &str) -> Option<&Dictionary> {
        self.get(key).and_then(|obj| {
            if let Object::Dictionary(dict) = obj {
                Some(dict)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::name("Page"));
        dict.set("Rotate", 90);

        assert_eq!(dict.get("Type"), Some(&Object::Name("Page".to_string())));
        assert_eq!(dict.get("Rotate"), Some(&Object::Integer(90)));
        assert_eq!(dict.get("Missing"), None);
        assert_eq!(dict.iter().count(), 2);
        assert!(!dict.is_empty());
        assert!(Dictionary::new().is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let dict = Dictionary::new()
            .with("Type", Object::name("XObject"))
            .with("Subtype", Object::name("Image"))
            .with("Width", 10)
            .with("Height", 20);

        let keys: Vec<_> = dict.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Type", "Subtype", "Width", "Height"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut dict = Dictionary::new().with("A", 1).with("B", 2);
        dict.set("A", 3);

        let entries: Vec<_> = dict.iter().collect();
        assert_eq!(entries[0], (&"A".to_string(), &Object::Integer(3)));
    }

    #[test]
    fn test_get_dict() {
        let mut parent = Dictionary::new();
        parent.set("Child", Dictionary::new().with("Key", 1));
        parent.set("NotDict", "String");

        assert_eq!(
            parent.get_dict("Child").and_then(|c| c.get("Key")),
            Some(&Object::Integer(1))
        );
        assert!(parent.get_dict("NotDict").is_none());
        assert!(parent.get_dict("Missing").is_none());
    }

}
