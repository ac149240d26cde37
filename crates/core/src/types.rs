/// Application-visible sequence number, allocated per collection.
pub type Pk = i64;

/// Internal store identifier of a document.
pub type DocId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
