//! Interactive shell: a thin line reader that tokenizes commands and
//! dispatches them to an [`fatsim::Engine`].
//!
//! `write`/`append` take their content as the first pair of double-quoted
//! text on the line, followed by the path as the next whitespace-delimited
//! token — everything else splits on plain whitespace.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use fatsim::engine::Listing;
use fatsim::{Engine, FsError};

/// Where the partition image directory defaults to when `--dir` is not
/// given: the current working directory, matching the original's
/// hardcoded `fat.part` in cwd.
fn partition_dir() -> PathBuf {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--dir" {
            if let Some(dir) = args.next() {
                return PathBuf::from(dir);
            }
        }
    }
    PathBuf::from(".")
}

fn main() -> ExitCode {
    env_logger::init();

    let dir = partition_dir();
    let mut engine = Engine::new(&dir);

    println!("FAT-style file system simulator. Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut out = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let mut tokens = line.split_whitespace();
        let command = match tokens.next() {
            Some(c) => c,
            None => {
                prompt(&mut out);
                continue;
            }
        };

        match command {
            "exit" | "quit" => break,
            "init" => run_init(&mut engine),
            "load" | "mount" => run_load(&mut engine),
            other if engine.is_mounted() => run_mounted_command(&mut engine, other, &line),
            _ => eprintln!("File system not loaded. Please run 'init' and 'load'."),
        }

        prompt(&mut out);
    }

    println!("Shutting down simulator.");
    ExitCode::SUCCESS
}

fn prompt(out: &mut impl Write) {
    let _ = write!(out, "> ");
    let _ = out.flush();
}

fn run_init(engine: &mut Engine) {
    match engine.format() {
        Ok(()) => println!("File system formatted. Run 'load' to use it."),
        Err(e) => eprintln!("Failed to format file system: {e}"),
    }
}

fn run_load(engine: &mut Engine) {
    match engine.mount() {
        Ok(()) => println!("File system loaded and ready."),
        Err(e) => eprintln!("Failed to load FAT: {e}. Did you run 'init' first?"),
    }
}

/// Dispatches every command that requires a mounted filesystem. `line` is
/// the full (untrimmed of newline) original input, re-tokenized here
/// because `write`/`append` need quote-aware splitting the plain
/// whitespace split above can't express.
fn run_mounted_command(engine: &mut Engine, command: &str, line: &str) {
    let rest = line.splitn(2, char::is_whitespace).nth(1).unwrap_or("").trim();

    let result = match command {
        "ls" => {
            let path = if rest.is_empty() { "/" } else { rest };
            run_ls(engine, path)
        }
        "mkdir" => {
            if rest.is_empty() {
                eprintln!("mkdir: missing operand");
                return;
            }
            engine.mkdir(rest)
        }
        "create" => {
            if rest.is_empty() {
                eprintln!("create: missing operand");
                return;
            }
            engine.create(rest)
        }
        "unlink" => {
            if rest.is_empty() {
                eprintln!("unlink: missing operand");
                return;
            }
            engine.unlink(rest)
        }
        "read" => {
            if rest.is_empty() {
                eprintln!("read: missing operand");
                return;
            }
            run_read(engine, rest)
        }
        "write" => match parse_quoted_content_and_path(rest) {
            Some((content, path)) => engine.write(path, content.as_bytes()),
            None => {
                eprintln!("Usage: write \"content\" /path/to/file");
                return;
            }
        },
        "append" => match parse_quoted_content_and_path(rest) {
            Some((content, path)) => engine.append(path, content.as_bytes()),
            None => {
                eprintln!("Usage: append \"content\" /path/to/file");
                return;
            }
        },
        other => {
            println!("Command '{other}' not implemented or invalid.");
            return;
        }
    };

    if let Err(e) = result {
        report(&e);
    }
}

fn run_ls(engine: &mut Engine, path: &str) -> fatsim::FsResult<()> {
    match engine.ls(path)? {
        Listing::File(name) => println!("{name}"),
        Listing::Dir(entries) => {
            for e in entries {
                let kind = if e.is_dir() { "D" } else { "F" };
                println!("[{kind}]  {}  {}", e.size, e.name);
            }
        }
    }
    Ok(())
}

fn run_read(engine: &mut Engine, path: &str) -> fatsim::FsResult<()> {
    let mut out = io::stdout();
    engine.read(path, &mut out)
}

/// Splits `"content" /path`: the content is everything between the first
/// pair of double quotes, and the path is the next whitespace-delimited
/// token after the closing quote.
fn parse_quoted_content_and_path(rest: &str) -> Option<(&str, &str)> {
    let after_open = rest.strip_prefix('"')?;
    let close = after_open.find('"')?;
    let content = &after_open[..close];
    let path = after_open[close + 1..].trim();
    if path.is_empty() {
        return None;
    }
    Some((content, path))
}

fn report(err: &FsError) {
    eprintln!("Error: {err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_content_then_path() {
        let (content, path) = parse_quoted_content_and_path("\"hello\" /f").unwrap();
        assert_eq!(content, "hello");
        assert_eq!(path, "/f");
    }

    #[test]
    fn missing_path_is_rejected() {
        assert!(parse_quoted_content_and_path("\"hello\"").is_none());
    }

    #[test]
    fn missing_quotes_is_rejected() {
        assert!(parse_quoted_content_and_path("hello /f").is_none());
    }

    #[test]
    fn quoted_content_may_be_empty() {
        let (content, path) = parse_quoted_content_and_path("\"\" /f").unwrap();
        assert_eq!(content, "");
        assert_eq!(path, "/f");
    }
}
