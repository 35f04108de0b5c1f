use slog::{Drain, Level, Logger};

/// Writes the level (warnings and worse only) and message, nothing else.
pub struct PlainFormat<D>
where
    D: slog_term::Decorator,
{
    decorator: D,
}

impl<D: slog_term::Decorator> PlainFormat<D> {
    pub fn new(decorator: D) -> PlainFormat<D> {
        PlainFormat { decorator }
    }
}

impl<D: slog_term::Decorator> Drain for PlainFormat<D> {
    type Ok = ();
    type Err = std::io::Error;

    fn log(
        &self,
        record: &slog::Record<'_>,
        values: &slog::OwnedKVList,
    ) -> Result<Self::Ok, Self::Err> {
        self.decorator.with_record(record, values, |decorator| {
            if record.level() <= Level::Warning {
                decorator.start_level()?;
                write!(decorator, "{}: ", record.level().as_str())?;
                decorator.start_whitespace()?;
            }

            decorator.start_msg()?;
            write!(decorator, "{}", record.msg())?;

            decorator.start_whitespace()?;
            writeln!(decorator)?;

            decorator.flush()?;
            Ok(())
        })
    }
}

fn level_for(verbose_level: i64) -> Option<Level> {
    match verbose_level {
        -3 => Some(Level::Critical),
        -2 => Some(Level::Error),
        -1 => Some(Level::Warning),
        0 => Some(Level::Info),
        1 => Some(Level::Debug),
        x if x > 0 => Some(Level::Trace),
        _ => None,
    }
}

/// Root logger writing to stderr.
/// A negative `verbose_level` is quiet mode, removing warnings and then errors entirely.
pub fn create_root_logger(verbose_level: i64) -> Logger {
    let Some(log_level) = level_for(verbose_level) else {
        return Logger::root(slog::Discard, slog::o!());
    };

    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = PlainFormat::new(decorator).fuse();
    let drain = slog::LevelFilter::new(drain, log_level).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    Logger::root(drain, slog::o!())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), Some(Level::Info));
        assert_eq!(level_for(1), Some(Level::Debug));
        assert_eq!(level_for(2), Some(Level::Trace));
        assert_eq!(level_for(-2), Some(Level::Error));
        assert_eq!(level_for(-4), None);
    }
}
