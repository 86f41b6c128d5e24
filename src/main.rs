//! Main entry point for the runepub CLI application.
//!
//! Opens a book from a local path or an HTTP URL, then either prints or
//! exports one chapter, lists the chapters, or starts an interactive
//! reading session on stdin/stdout.

use anyhow::{Result, bail};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use unicode_width::UnicodeWidthStr;

use runepub::render::{render_chapter_page, render_chapter_text};
use runepub::settings::SettingsStore;
use runepub::{
    Book, Cli, Config, FontFamily, HttpRangeReader, ImportError, JsonFileStore, LocalFileReader,
    Preferences, ReaderState, import, import_book, logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_level());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Import errors already carry the message meant for the reader.
            match e.downcast_ref::<ImportError>() {
                Some(import_error) => eprintln!("Error: {}", import_error),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli)?;
    tracing::debug!(?config, "configuration resolved");

    let store = JsonFileStore::new(&config.settings_path);
    tracing::debug!(path = %store.path().display(), "using settings store");
    let mut prefs = Preferences::load(store);
    if let Some(family) = cli.font {
        prefs.set_font_family(family)?;
    }
    if let Some(size) = cli.font_size {
        prefs.set_font_size(size)?;
    }

    let book = open_book(&cli, &config).await?;
    let book_title = book.title().to_string();

    let mut state = ReaderState::new();
    state.load(book);

    if state.is_empty() {
        println!("{} has no readable chapters.", book_title);
        return Ok(());
    }

    if cli.list {
        print_chapter_list(&state);
        return Ok(());
    }

    if let Some(n) = cli.chapter {
        if n == 0 || n > state.len() {
            bail!("Chapter {} does not exist ({} has {})", n, book_title, state.len());
        }
        state.go_to(n - 1);
    }

    if let Some(ref path) = cli.export {
        export_chapter(&state, prefs.settings(), &book_title, Path::new(path)).await?;
        return Ok(());
    }

    if cli.is_interactive() {
        return interactive(&mut state, &mut prefs, &book_title, config.width).await;
    }

    if let Some(chapter) = state.current() {
        println!("{}", render_chapter_text(chapter, config.width));
    }
    Ok(())
}

/// Open the source named on the command line and import it.
async fn open_book(cli: &Cli, config: &Config) -> Result<Book> {
    let name = import::source_name(&cli.file);

    if cli.is_http_url() {
        let reader = HttpRangeReader::new(cli.file.clone())
            .await
            .map_err(|e| ImportError::Unavailable(format!("{:#}", e)))?;
        let reader = Arc::new(reader);

        let book = import_book(name, reader.clone(), config.max_upload).await?;

        // Display network transfer statistics for HTTP sources
        tracing::info!(
            url = %reader.url(),
            transferred = %format_size(reader.transferred_bytes()),
            "remote book fetched"
        );
        Ok(book)
    } else {
        let reader = LocalFileReader::new(Path::new(&cli.file))
            .map_err(|e| ImportError::Unavailable(format!("{:#}", e)))?;
        let reader = Arc::new(reader);

        let book = import_book(name, reader.clone(), config.max_upload).await?;
        tracing::info!(
            path = %reader.path().display(),
            chapters = book.chapters.len(),
            "local book opened"
        );
        Ok(book)
    }
}

fn print_chapter_list(state: &ReaderState) {
    for item in state.chapter_list() {
        let marker = if item.active { '>' } else { ' ' };
        println!("{} {:>3}. {}", marker, item.index + 1, item.title);
    }
}

async fn export_chapter(
    state: &ReaderState,
    settings: &runepub::Settings,
    book_title: &str,
    path: &Path,
) -> Result<()> {
    let Some(chapter) = state.current() else {
        bail!("Nothing to export");
    };

    let page = render_chapter_page(chapter, settings, book_title);
    tokio::fs::write(path, page).await?;
    tracing::info!(chapter = %chapter.title, path = %path.display(), "chapter exported");
    Ok(())
}

/// Interactive reading loop.
///
/// Commands are read one per line from stdin until `q` or end of input.
async fn interactive<S: SettingsStore>(
    state: &mut ReaderState,
    prefs: &mut Preferences<S>,
    book_title: &str,
    width: usize,
) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    show_chapter(&mut stdout, state, prefs, book_title, width).await?;

    while let Some(line) = lines.next_line().await? {
        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();
        let argument = parts.next();

        let redraw = match (command, argument) {
            ("n", _) | ("next", _) => state.next(),
            ("p", _) | ("prev", _) => state.previous(),
            ("g", Some(n)) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => state.go_to(n - 1),
                _ => false,
            },
            ("l", _) => {
                print_chapter_list(state);
                false
            }
            ("f", Some(family)) => match family.parse::<FontFamily>() {
                Ok(family) => {
                    prefs.set_font_family(family)?;
                    true
                }
                Err(e) => {
                    eprintln!("{}", e);
                    false
                }
            },
            ("s", Some(size)) => match size.parse::<u32>() {
                Ok(size) if size > 0 => {
                    prefs.set_font_size(size)?;
                    true
                }
                _ => {
                    eprintln!("Font size must be a positive number");
                    false
                }
            },
            ("q", _) | ("quit", _) => break,
            ("", _) => false,
            _ => {
                eprintln!("Commands: n, p, g N, l, f FAMILY, s SIZE, q");
                false
            }
        };

        if redraw {
            show_chapter(&mut stdout, state, prefs, book_title, width).await?;
        } else {
            print_status(&mut stdout, state, prefs).await?;
        }
    }

    Ok(())
}

async fn show_chapter<S: SettingsStore>(
    stdout: &mut tokio::io::Stdout,
    state: &ReaderState,
    prefs: &Preferences<S>,
    book_title: &str,
    width: usize,
) -> Result<()> {
    let Some(chapter) = state.current() else {
        return Ok(());
    };

    let header = format!("{} - {}", book_title, chapter.title);
    let rule = "=".repeat(width.min(header.width()));
    let text = render_chapter_text(chapter, width);
    stdout
        .write_all(format!("\n{}\n{}\n\n{}\n\n", header, rule, text).as_bytes())
        .await?;
    print_status(stdout, state, prefs).await
}

async fn print_status<S: SettingsStore>(
    stdout: &mut tokio::io::Stdout,
    state: &ReaderState,
    prefs: &Preferences<S>,
) -> Result<()> {
    let settings = prefs.settings();
    let back = if state.can_go_back() { "p" } else { "-" };
    let forward = if state.can_go_forward() { "n" } else { "-" };
    let status = format!(
        "[{}] font: {} {}px  ({}/{}, g N, l, f FAMILY, s SIZE, q) > ",
        state.page_info(),
        settings.font_family,
        settings.font_size,
        back,
        forward
    );
    stdout.write_all(status.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
