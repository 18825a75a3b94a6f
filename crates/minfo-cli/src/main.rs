//! minfo CLI: media metadata from libmediainfo.
//!
//! Commands:
//!   minfo tree <file>              Result tree as JSON
//!   minfo report <file>            Library's formatted text report
//!   minfo version                  Library version
//!   minfo fields <kind>            Field catalog for a stream kind
//!   minfo size <bytes> [unit]      Human-readable byte count
//!   minfo duration <ms> [style]    Formatted duration
//!
//! Flags (before the command):
//!   --raw --drop-frame --all --complete --lang <file> --template <file> --si

use minfo_core::format::{self, DurationStyle, SizeUnit};
use minfo_core::{LanguageTable, Session, SessionConfig, StreamKind};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (flags, rest) = match parse_flags(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            std::process::exit(2);
        }
    };
    if rest.is_empty() {
        print_usage();
        return;
    }

    let result = match rest[0].as_str() {
        "tree" => cmd_tree(&flags, &rest[1..]),
        "report" => cmd_report(&flags, &rest[1..]),
        "version" => cmd_version(&flags),
        "fields" => cmd_fields(&flags, &rest[1..]),
        "size" => cmd_size(&flags, &rest[1..]),
        "duration" => cmd_duration(&rest[1..]),
        other => {
            eprintln!("unknown command: {}", other);
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("minfo: {}", e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
struct Flags {
    config: SessionConfig,
    lang: Option<String>,
    template: Option<String>,
    /// Decimal (1000-based) sizes instead of binary.
    si: bool,
}

/// Split leading `--flags` from the command and its arguments.
fn parse_flags(args: &[String]) -> Result<(Flags, Vec<String>), String> {
    let mut flags = Flags::default();
    let mut iter = args.iter();
    let mut rest = Vec::new();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--raw" => flags.config.raw = true,
            "--drop-frame" => flags.config.drop_frame = true,
            "--all" => flags.config.all_fields = true,
            "--complete" => flags.config.complete = true,
            "--si" => flags.si = true,
            "--lang" => {
                let file = iter.next().ok_or("--lang needs a file")?;
                flags.lang = Some(file.clone());
            }
            "--template" => {
                let file = iter.next().ok_or("--template needs a file")?;
                flags.template = Some(file.clone());
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag: {}", flag)),
            _ => {
                rest.push(arg.clone());
                rest.extend(iter.by_ref().cloned());
                break;
            }
        }
    }
    Ok((flags, rest))
}

fn open_session(flags: &Flags) -> minfo_core::Result<Session> {
    let mut session = Session::new(flags.config.clone())?;
    log::debug!("minfo: session config {:?}", flags.config);
    if let Some(path) = &flags.lang {
        let table = LanguageTable::load(path)?;
        session.set_language(&table, false)?;
    }
    if let Some(path) = &flags.template {
        let template = std::fs::read_to_string(path)?;
        session.set_option("ReportTemplate", &template)?;
    }
    Ok(session)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_tree(flags: &Flags, args: &[String]) -> minfo_core::Result<()> {
    let Some(file) = args.first() else {
        eprintln!("usage: minfo tree <file>");
        return Ok(());
    };
    let mut session = open_session(flags)?;
    let tree = session.open(file)?;
    println!("{}", tree.to_json_pretty()?);
    session.close()
}

fn cmd_report(flags: &Flags, args: &[String]) -> minfo_core::Result<()> {
    let Some(file) = args.first() else {
        eprintln!("usage: minfo report <file>");
        return Ok(());
    };
    let mut session = open_session(flags)?;
    session.open(file)?;
    print!("{}", session.report_text()?);
    session.close()
}

fn cmd_version(flags: &Flags) -> minfo_core::Result<()> {
    let mut session = open_session(flags)?;
    println!("{}", session.version()?);
    session.close()
}

fn cmd_fields(flags: &Flags, args: &[String]) -> minfo_core::Result<()> {
    let Some(kind) = args.first() else {
        eprintln!("usage: minfo fields <general|video|audio|text|other|image|menu>");
        return Ok(());
    };
    let kind: StreamKind = kind.parse()?;
    let session = open_session(flags)?;
    for entry in session.schema().fields(kind) {
        match &entry.description {
            Some(description) => println!("{:<32} {}", entry.name, description),
            None => println!("{}", entry.name),
        }
    }
    session.close()
}

fn cmd_size(flags: &Flags, args: &[String]) -> minfo_core::Result<()> {
    let Some(bytes) = args.first() else {
        eprintln!("usage: minfo size <bytes> [B|KB|MB|GB|TB]");
        return Ok(());
    };
    println!("{}", size_text(bytes, args.get(1), flags.si)?);
    Ok(())
}

/// Binary units unless `si` is set.
fn size_text(bytes: &str, unit: Option<&String>, si: bool) -> minfo_core::Result<String> {
    let bytes: u64 = bytes
        .parse()
        .map_err(|_| minfo_core::Error::InvalidInput(format!("not a byte count: {}", bytes)))?;
    let unit = unit.map(|u| u.parse::<SizeUnit>()).transpose()?;
    Ok(format::human_size(bytes, unit, 2, !si))
}

fn cmd_duration(args: &[String]) -> minfo_core::Result<()> {
    let Some(ms) = args.first() else {
        eprintln!("usage: minfo duration <ms> [hmsm|hms|hm]");
        return Ok(());
    };
    let ms: u64 = ms
        .parse()
        .map_err(|_| minfo_core::Error::InvalidInput(format!("not a millisecond count: {}", ms)))?;
    let style = args
        .get(1)
        .map(|s| s.parse::<DurationStyle>())
        .transpose()?
        .unwrap_or_default();
    println!("{}", format::format_duration(ms, style));
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_usage() {
    println!("minfo - media metadata via libmediainfo");
    println!();
    println!("usage: minfo [flags] <command> [args]");
    println!();
    println!("commands:");
    println!("  tree <file>            Result tree as JSON");
    println!("  report <file>          Formatted text report");
    println!("  version                Library version");
    println!("  fields <kind>          Field catalog for a stream kind");
    println!("  size <bytes> [unit]    Human-readable byte count");
    println!("  duration <ms> [style]  Formatted duration (hmsm, hms, hm)");
    println!();
    println!("flags:");
    println!("  --raw                  Plain values, no filtering");
    println!("  --drop-frame           Add DurationDropFrame to video streams");
    println!("  --all                  Keep empty and bookkeeping fields");
    println!("  --complete             Ask the library for every field");
    println!("  --lang <file>          Translation table for reports");
    println!("  --template <file>      Report template");
    println!("  --si                   Sizes in powers of 1000");
    println!();
    println!("The library is loaded from $MINFO_LIBRARY or the system default.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_before_command() {
        let (flags, rest) = parse_flags(&args(&["--raw", "--lang", "fr.csv", "tree", "a.mkv"])).unwrap();
        assert!(flags.config.raw);
        assert!(!flags.config.drop_frame);
        assert_eq!(flags.lang.as_deref(), Some("fr.csv"));
        assert_eq!(rest, args(&["tree", "a.mkv"]));
    }

    #[test]
    fn arguments_after_command_are_not_flags() {
        let (flags, rest) = parse_flags(&args(&["duration", "--raw"])).unwrap();
        assert_eq!(flags, Flags::default());
        assert_eq!(rest, args(&["duration", "--raw"]));
    }

    #[test]
    fn size_defaults_to_binary_units() {
        let (flags, rest) = parse_flags(&args(&["size", "5982664375"])).unwrap();
        assert!(!flags.si);
        assert_eq!(size_text(&rest[1], rest.get(2), flags.si).unwrap(), "5.57 GB");

        let (flags, rest) = parse_flags(&args(&["--si", "size", "5982664375", "MB"])).unwrap();
        assert_eq!(size_text(&rest[1], rest.get(2), flags.si).unwrap(), "5982.66 MB");

        assert!(size_text("lots", None, false).is_err());
    }

    #[test]
    fn flag_errors() {
        assert!(parse_flags(&args(&["--template"])).is_err());
        assert!(parse_flags(&args(&["--verbose", "tree"])).is_err());
    }
}
