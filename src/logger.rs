use slog::{o, Discard, Drain, Key, Level, Logger, OwnedKVList, Record, Serializer, KV};
use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

/// Writes one line per record: `LEVEL message key=value ...`.
struct LineDrain<W: Write> {
    out: Mutex<W>,
    level: Level,
}

struct LineSerializer<'a, W: Write>(&'a mut W);

impl<'a, W: Write> Serializer for LineSerializer<'a, W> {
    fn emit_arguments(&mut self, key: Key, val: &fmt::Arguments) -> slog::Result {
        write!(self.0, " {}={}", key, val)?;
        Ok(())
    }
}

impl<W: Write> Drain for LineDrain<W> {
    type Ok = ();
    type Err = io::Error;

    fn log(&self, record: &Record, values: &OwnedKVList) -> io::Result<()> {
        if !record.level().is_at_least(self.level) {
            return Ok(());
        }
        let mut out = match self.out.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let w = &mut *out;
        write!(w, "{} {}", record.level().as_short_str(), record.msg())?;
        let mut ser = LineSerializer(&mut *w);
        record
            .kv()
            .serialize(record, &mut ser)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        values
            .serialize(record, &mut ser)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        writeln!(w)?;
        w.flush()
    }
}

/// Builds a logger writing plain text lines at `level` and above into `w`.
/// Write failures are dropped, a broken sink never fails an index operation.
pub fn new_logger<W>(w: W, level: Level) -> Logger
where
    W: Write + Send + 'static,
{
    let drain = LineDrain {
        out: Mutex::new(w),
        level,
    };
    Logger::root(drain.ignore_res(), o!())
}

pub fn discard_logger() -> Logger {
    Logger::root(Discard, o!())
}
