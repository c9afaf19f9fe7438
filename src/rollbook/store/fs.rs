use super::{strip_id, with_id, DataStore};
use crate::error::{RollbookError, Result};
use crate::model::{Collection, Document};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-backed store: each collection is a JSON array in `<root>/<collection>.json`.
///
/// Every call re-reads the file, so two processes sharing a directory see each
/// other's writes. Concurrent writers are not coordinated; the last write wins.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(format!("{}.json", collection.name()))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(RollbookError::Io)?;
        }
        Ok(())
    }

    fn load(&self, collection: Collection) -> Result<Vec<(Uuid, Document)>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(RollbookError::Io)?;
        let docs: Vec<Document> =
            serde_json::from_str(&content).map_err(RollbookError::Serialization)?;

        docs.into_iter()
            .map(|doc| {
                let id = doc
                    .get("id")
                    .and_then(|v| v.as_str())
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .ok_or_else(|| {
                        RollbookError::Store(format!(
                            "{} contains a document without a valid id",
                            path.display()
                        ))
                    })?;
                Ok((id, strip_id(doc)))
            })
            .collect()
    }

    fn save(&self, collection: Collection, docs: Vec<(Uuid, Document)>) -> Result<()> {
        self.ensure_dir()?;
        let out: Vec<Document> = docs
            .into_iter()
            .map(|(id, doc)| with_id(&id, doc))
            .collect();
        let content = serde_json::to_string_pretty(&out).map_err(RollbookError::Serialization)?;
        fs::write(self.collection_path(collection), content).map_err(RollbookError::Io)?;
        Ok(())
    }
}

impl DataStore for FileStore {
    fn snapshot(&self, collection: Collection) -> Result<Vec<Document>> {
        Ok(self
            .load(collection)?
            .into_iter()
            .map(|(id, doc)| with_id(&id, doc))
            .collect())
    }

    fn create(&mut self, collection: Collection, doc: Document) -> Result<Uuid> {
        let mut docs = self.load(collection)?;
        let id = Uuid::new_v4();
        docs.push((id, strip_id(doc)));
        self.save(collection, docs)?;
        Ok(id)
    }

    fn update(&mut self, collection: Collection, id: &Uuid, patch: Document) -> Result<()> {
        let mut docs = self.load(collection)?;
        let (_, doc) = docs
            .iter_mut()
            .find(|(doc_id, _)| doc_id == id)
            .ok_or(RollbookError::NotFound {
                collection,
                id: *id,
            })?;
        doc.extend(strip_id(patch));
        self.save(collection, docs)
    }

    fn delete(&mut self, collection: Collection, id: &Uuid) -> Result<()> {
        let mut docs = self.load(collection)?;
        let before = docs.len();
        docs.retain(|(doc_id, _)| doc_id != id);
        if docs.len() == before {
            return Err(RollbookError::NotFound {
                collection,
                id: *id,
            });
        }
        self.save(collection, docs)
    }
}
