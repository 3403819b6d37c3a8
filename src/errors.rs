use std::result;

quick_error! {
    #[derive(Debug)]
    pub enum DError {
        // Following is for From other errors.
        Io(err: std::io::Error) {
            from()
            cause(err)
            display("Io {}", err)
        }
        DuplicateKey {
            description("key exists")
            display("key exists")
        }
        KeyNotFound {
            description("key not found")
            display("key not found")
        }
        // Persistence
        MalformedLine(line: String) {
            description("malformed persistence line")
            display("malformed persistence line {:?}", line)
        }
        UnencodableEntry(entry: String) {
            description("entry can not be encoded")
            display("entry {:?} can not be encoded", entry)
        }
    }
}

impl DError {
    /// True for a lookup, update or delete of an absent key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DError::KeyNotFound)
    }

    /// True when an insert hit an existing key.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DError::DuplicateKey)
    }
}

pub type DResult<T> = result::Result<T, DError>;
