use clap::Parser;

use crate::archive::ArchiveFormat;

#[derive(Parser, Debug)]
#[command(name = "flatarc")]
#[command(version)]
#[command(about = "Read Build engine GRP and Descent II MVL archives", long_about = None)]
#[command(after_help = "Examples:\n  \
  flatarc -l DUKE3D.GRP                 list files in DUKE3D.GRP\n  \
  flatarc -p DUKE3D.GRP GAME.CON | less send GAME.CON to a pager\n  \
  flatarc -d out -f mvl HIRES.MVL       extract all movies into out/")]
pub struct Cli {
    /// Archive file path
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Files to extract (default: all)
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// List files (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely with sizes and offsets
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract files to pipe, no messages
    #[arg(short = 'p')]
    pub pipe: bool,

    /// Extract files into exdir
    #[arg(short = 'd', value_name = "DIR")]
    pub extract_dir: Option<String>,

    /// Archive format (grp or mvl); detected from the signature if omitted
    #[arg(short = 'f', value_name = "FORMAT")]
    pub format: Option<ArchiveFormat>,

    /// Never overwrite existing files
    #[arg(short = 'n')]
    pub never_overwrite: bool,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0 || self.pipe
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter for the chosen verbosity; `RUST_LOG` overrides it.
    pub fn log_filter(&self) -> &'static str {
        if self.is_very_quiet() {
            "error"
        } else if self.is_quiet() {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["flatarc", "-l", "DUKE3D.GRP"]).unwrap();
        assert!(cli.list);
        assert_eq!(cli.file, "DUKE3D.GRP");
        assert!(cli.format.is_none());
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn test_parse_format_and_files() {
        let cli =
            Cli::try_parse_from(["flatarc", "-f", "mvl", "-p", "HIRES.MVL", "INTRO.MVE"]).unwrap();
        assert_eq!(cli.format, Some(ArchiveFormat::Mvl));
        assert_eq!(cli.files, ["INTRO.MVE"]);
        assert!(cli.is_quiet());
        assert_eq!(cli.log_filter(), "warn");
    }

    #[test]
    fn test_reject_unknown_format() {
        assert!(Cli::try_parse_from(["flatarc", "-f", "zip", "a.zip"]).is_err());
    }
}
