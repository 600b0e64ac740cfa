//! `-v`/`-q` occurrence counting for the tracing level, after clap-verbosity-flag

use tracing::level_filters::LevelFilter;

#[derive(clap::Args, Debug, Clone)]
pub struct Verbosity {
    /// More output per occurrence
    #[clap(long, short = 'v', parse(from_occurrences), global = true)]
    verbose: i8,

    /// Less output per occurrence
    #[clap(
        long,
        short = 'q',
        parse(from_occurrences),
        global = true,
        conflicts_with = "verbose"
    )]
    quiet: i8,
}

impl Verbosity {
    /// `info`, so request traces show without any flags.
    const DEFAULT: i8 = 2;

    pub fn log_level_filter(&self) -> LevelFilter {
        match Self::DEFAULT - self.quiet + self.verbose {
            i8::MIN..=-1 => LevelFilter::OFF,
            0 => LevelFilter::ERROR,
            1 => LevelFilter::WARN,
            2 => LevelFilter::INFO,
            3 => LevelFilter::DEBUG,
            4..=i8::MAX => LevelFilter::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    #[derive(clap::Parser)]
    struct Flags {
        #[clap(flatten)]
        verbosity: Verbosity,
    }

    fn level(args: &[&str]) -> LevelFilter {
        Flags::try_parse_from(std::iter::once("ficshelf").chain(args.iter().copied()))
            .unwrap()
            .verbosity
            .log_level_filter()
    }

    #[test]
    fn defaults_to_info() {
        assert_eq!(level(&[]), LevelFilter::INFO);
    }

    #[test]
    fn flags_move_the_level() {
        assert_eq!(level(&["-v"]), LevelFilter::DEBUG);
        assert_eq!(level(&["-vvvvv"]), LevelFilter::TRACE);
        assert_eq!(level(&["-qq"]), LevelFilter::ERROR);
        assert_eq!(level(&["-qqq"]), LevelFilter::OFF);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Flags::try_parse_from(["ficshelf", "-v", "-q"]).is_err());
    }
}
