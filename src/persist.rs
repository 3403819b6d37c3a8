//! Line oriented snapshot format.
//!
//! ```text
//! <key><delimiter><value>\n
//! <key><delimiter><value>\n
//! ...
//! ```
//!
//! No header and no escaping. The key ends at the first delimiter, the value
//! runs to the end of the line, so only keys must stay free of the delimiter.
//! Records are written in ascending key order.

use crate::errors::{DError, DResult};
use crate::skiplist::SkipList;
use crate::utils::random::RandomGenerator;
use scopeguard::ScopeGuard;
use slog::{debug, info};
use std::ffi::OsString;
use std::fmt::{self, Display, Write as _};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::{self, FromStr};

/// Splits a dump line at the first `delimiter`.
/// Empty lines, lines without the delimiter and empty keys or values are
/// rejected with `MalformedLine`.
pub fn split_entry(line: &str, delimiter: char) -> DResult<(&str, &str)> {
    match line.split_once(delimiter) {
        Some((k, v)) if !k.is_empty() && !v.is_empty() => Ok((k, v)),
        _ => Err(DError::MalformedLine(line.to_owned())),
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(|c| c == '\n' || c == '\r')
}

fn tmp_file_name(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

impl<K, V, R> SkipList<K, V, R>
where
    K: Ord + fmt::Debug,
    R: RandomGenerator,
{
    /// Renders every record under the shared lock, no I/O happens while it is held.
    fn encode(&self) -> DResult<(String, usize)>
    where
        K: Display,
        V: Display,
    {
        let mut buf = String::new();
        let mut count = 0;
        let mut iter = self.iter();
        iter.seek_to_first();
        while iter.valid() {
            let key = iter.key().to_string();
            let value = iter.value().to_string();
            // Anything the loader would split differently or skip is refused.
            if key.is_empty()
                || value.is_empty()
                || key.contains(self.delimiter)
                || has_line_break(&key)
                || has_line_break(&value)
            {
                return Err(DError::UnencodableEntry(format!(
                    "{}{}{}",
                    key, self.delimiter, value
                )));
            }
            ignore!(writeln!(buf, "{}{}{}", key, self.delimiter, value));
            count += 1;
            iter.next();
        }
        Ok((buf, count))
    }

    /// Writes all records to `w` in ascending key order, returns how many.
    pub fn dump<W: Write>(&self, w: &mut W) -> DResult<usize>
    where
        K: Display,
        V: Display,
    {
        let (buf, count) = self.encode()?;
        w.write_all(buf.as_bytes())?;
        w.flush()?;
        Ok(count)
    }

    /// Replaces `path` with a dump of the index.
    ///
    /// The records go to `<path>.tmp` first and are renamed into place, a
    /// failed dump leaves an existing file untouched.
    pub fn dump_file<P: AsRef<Path>>(&self, path: P) -> DResult<usize>
    where
        K: Display,
        V: Display,
    {
        let path = path.as_ref();
        let (buf, count) = self.encode()?;

        let tmp = scopeguard::guard(tmp_file_name(path), |tmp| {
            ignore!(fs::remove_file(tmp));
        });
        {
            let mut w = BufWriter::new(File::create(&*tmp)?);
            w.write_all(buf.as_bytes())?;
            w.flush()?;
        }
        fs::rename(&*tmp, path)?;
        ScopeGuard::into_inner(tmp);

        info!(self.log, "dump file"; "path" => %path.display(), "count" => count);
        Ok(count)
    }

    /// Feeds every well formed line of `r` through `insert`.
    ///
    /// Malformed lines, lines that are not UTF-8 and lines whose key or value
    /// fail to parse are skipped. Only a failing reader aborts the load.
    /// Keys already present are kept, never overwritten. Returns the number of
    /// records inserted.
    pub fn load<B: BufRead>(&self, r: B) -> DResult<usize>
    where
        K: FromStr,
        V: FromStr,
    {
        let mut count = 0;
        for (n, raw) in r.split(b'\n').enumerate() {
            let mut raw = raw?;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            let line = match str::from_utf8(&raw) {
                Ok(line) => line,
                Err(e) => {
                    debug!(self.log, "skip line"; "line" => n + 1, "err" => %e);
                    continue;
                }
            };
            let (key, value) = match split_entry(line, self.delimiter) {
                Ok(kv) => kv,
                Err(e) => {
                    debug!(self.log, "skip line"; "line" => n + 1, "err" => %e);
                    continue;
                }
            };
            let (key, value) = match (key.parse::<K>(), value.parse::<V>()) {
                (Ok(k), Ok(v)) => (k, v),
                _ => {
                    debug!(self.log, "skip unparsable line"; "line" => n + 1);
                    continue;
                }
            };
            match self.insert(key, value) {
                Ok(()) => count += 1,
                Err(DError::DuplicateKey) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(count)
    }

    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> DResult<usize>
    where
        K: FromStr,
        V: FromStr,
    {
        let path = path.as_ref();
        let count = self.load(BufReader::new(File::open(path)?))?;
        info!(self.log, "load file"; "path" => %path.display(), "count" => count);
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::{split_entry, tmp_file_name};
    use crate::DError;
    use std::path::Path;

    #[test]
    fn test_split_entry() {
        assert_eq!(split_entry("4:d", ':').unwrap(), ("4", "d"));
        assert_eq!(split_entry("k:a:b", ':').unwrap(), ("k", "a:b"));
        assert_eq!(split_entry("k=v", '=').unwrap(), ("k", "v"));
        for bad in ["", "bad", ":v", "k:", ":"] {
            assert!(matches!(
                split_entry(bad, ':'),
                Err(DError::MalformedLine(ref l)) if l == bad
            ));
        }
    }

    #[test]
    fn test_tmp_file_name() {
        assert_eq!(
            tmp_file_name(Path::new("store/dumpFile")),
            Path::new("store/dumpFile.tmp")
        );
    }
}
