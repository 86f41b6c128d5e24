use clap::Parser;

use crate::settings::FontFamily;

#[derive(Parser, Debug)]
#[command(name = "runepub")]
#[command(version)]
#[command(about = "A terminal EPUB reader with HTTP URL support", long_about = None)]
#[command(after_help = "Examples:\n  \
  runepub moby-dick.epub                 read interactively\n  \
  runepub -l https://example.com/book.epub   list chapters of a remote book\n  \
  runepub -c 3 book.epub | less          print chapter 3\n  \
  runepub --font inter --export ch.html book.epub")]
pub struct Cli {
    /// EPUB file path or HTTP URL
    #[arg(value_name = "FILE")]
    pub file: String,

    /// List chapters and exit
    #[arg(short = 'l')]
    pub list: bool,

    /// Print chapter N (1-based) and exit
    #[arg(short = 'c', long = "chapter", value_name = "N")]
    pub chapter: Option<usize>,

    /// Write the chapter as a standalone HTML page
    #[arg(long, value_name = "PATH")]
    pub export: Option<String>,

    /// Store a font family preference (default, inter, poppins)
    #[arg(long, value_name = "FAMILY")]
    pub font: Option<FontFamily>,

    /// Store a font size preference in pixels
    #[arg(long, value_name = "PX", value_parser = clap::value_parser!(u32).range(1..))]
    pub font_size: Option<u32>,

    /// Settings store location [env: RUNEPUB_SETTINGS]
    #[arg(long, value_name = "PATH")]
    pub settings: Option<String>,

    /// Largest accepted book in MiB [env: RUNEPUB_MAX_SIZE_MB]
    #[arg(long, value_name = "MB")]
    pub max_size_mb: Option<u64>,

    /// Text wrap width [env: RUNEPUB_WIDTH]
    #[arg(short = 'w', long, value_name = "COLS")]
    pub width: Option<usize>,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Verbose logging (-vv => trace)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn is_http_url(&self) -> bool {
        self.file.starts_with("http://") || self.file.starts_with("https://")
    }

    /// Whether to run the interactive reading loop.
    pub fn is_interactive(&self) -> bool {
        !self.list && self.chapter.is_none() && self.export.is_none()
    }

    /// Default log filter derived from `-q`/`-v`.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (q, _) if q > 1 => "error",
            (1, _) => "warn",
            (_, 0) => "info",
            (_, 1) => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_reading_options() {
        let cli = Cli::try_parse_from(["runepub", "-c", "3", "--font", "inter", "book.epub"]).unwrap();
        assert_eq!(cli.chapter, Some(3));
        assert_eq!(cli.font, Some(FontFamily::Inter));
        assert!(!cli.is_interactive());
        assert!(!cli.is_http_url());
    }

    #[test]
    fn test_rejects_unknown_font() {
        assert!(Cli::try_parse_from(["runepub", "--font", "comic", "book.epub"]).is_err());
    }

    #[test]
    fn test_font_size_must_be_positive() {
        assert!(Cli::try_parse_from(["runepub", "--font-size", "0", "book.epub"]).is_err());
        let cli = Cli::try_parse_from(["runepub", "--font-size", "18", "book.epub"]).unwrap();
        assert_eq!(cli.font_size, Some(18));
    }

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["runepub", "-qq", "book.epub"]).unwrap();
        assert_eq!(cli.log_level(), "error");
        let cli = Cli::try_parse_from(["runepub", "-v", "https://x.org/b.epub"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
        assert!(cli.is_http_url());
        assert!(cli.is_interactive());
    }
}
