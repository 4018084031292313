use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError, StorePath};

/// In-memory document tree with the same path semantics as the remote
/// store. Backs unit tests and local development.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    root: RwLock<Value>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn root_snapshot(&self) -> Value {
        self.root.read().await.clone()
    }
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Walks to `segments`, materializing intermediate objects on the way.
fn entry<'a>(root: &'a mut Value, segments: &[String]) -> &'a mut Value {
    let mut current = root;
    for segment in segments {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let object = current
            .as_object_mut()
            .expect("slot was just made an object");
        current = object.entry(segment.clone()).or_insert(Value::Null);
    }
    current
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn read(&self, path: &StorePath) -> Result<Option<Value>, StoreError> {
        let root = self.root.read().await;
        Ok(lookup(&root, path.segments())
            .filter(|value| !value.is_null())
            .cloned())
    }

    async fn write(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        *entry(&mut root, path.segments()) = value;
        Ok(())
    }

    async fn merge(&self, path: &StorePath, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        let slot = entry(&mut root, path.segments());
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        let object = slot.as_object_mut().expect("slot was just made an object");
        for (key, value) in fields {
            object.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, path: &StorePath) -> Result<(), StoreError> {
        let mut root = self.root.write().await;
        match path.segments() {
            [] => *root = Value::Null,
            [parents @ .., last] => {
                if let Some(object) =
                    lookup_mut(&mut root, parents).and_then(Value::as_object_mut)
                {
                    object.remove(last);
                }
            }
        }
        Ok(())
    }
}

fn lookup_mut<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn write_then_read_nested_path() {
        let store = MemoryDocumentStore::new();
        let path = StorePath::new(["cvs", "u1", "cv-1"]);

        store.write(&path, json!({"title": "Intern"})).await.unwrap();

        let value = store.read(&path).await.unwrap();
        assert_eq!(value, Some(json!({"title": "Intern"})));
    }

    #[tokio::test]
    async fn read_of_absent_path_is_none() {
        let store = MemoryDocumentStore::new();
        let value = store.read(&StorePath::new(["users", "nobody"])).await.unwrap();
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn merge_updates_fields_and_keeps_siblings() {
        let store = MemoryDocumentStore::new();
        let path = StorePath::new(["cvs", "u1", "cv-1"]);
        store
            .write(&path, json!({"title": "Old", "resume": {"categories": []}}))
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("New"));
        fields.insert("lastModified".to_string(), json!("2023.01.01. 10:00:00"));
        store.merge(&path, fields).await.unwrap();

        let value = store.read(&path).await.unwrap().unwrap();
        assert_eq!(value["title"], json!("New"));
        assert_eq!(value["lastModified"], json!("2023.01.01. 10:00:00"));
        assert_eq!(value["resume"], json!({"categories": []}));
    }

    #[tokio::test]
    async fn delete_removes_only_the_keyed_child() {
        let store = MemoryDocumentStore::new();
        store
            .write(&StorePath::new(["cvs", "u1", "cv-1"]), json!({"title": "A"}))
            .await
            .unwrap();
        store
            .write(&StorePath::new(["cvs", "u1", "cv-2"]), json!({"title": "B"}))
            .await
            .unwrap();

        store.delete(&StorePath::new(["cvs", "u1", "cv-1"])).await.unwrap();

        assert_eq!(store.read(&StorePath::new(["cvs", "u1", "cv-1"])).await.unwrap(), None);
        assert!(store.read(&StorePath::new(["cvs", "u1", "cv-2"])).await.unwrap().is_some());
    }
}
