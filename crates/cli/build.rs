use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        return;
    };
    let completions_dir = out_dir.join("completions");

    if fs::create_dir_all(&completions_dir).is_err() {
        return;
    }

    let mut cmd = clap::Command::new("apod")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fetch Astronomy Picture of the Day entries as structured records")
        .arg(clap::arg!([DATE] "Date to fetch (YYYY-MM-DD), or the first date of a range with --end"))
        .arg(clap::arg!(-e --end <DATE> "Last date of an inclusive range"))
        .arg(clap::arg!(--file <FILE> "Parse a saved page instead of fetching, or '-' for stdin"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, markdown, text)")
                .default_value("json")
                .value_parser(["json", "markdown", "text"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--pretty "Pretty print JSON output"))
        .arg(clap::arg!(--frontmatter "Include TOML frontmatter (Markdown only)"))
        .arg(clap::arg!(--references "Include a reference table of explanation links (Markdown only)"))
        .arg(clap::arg!(--width <COLS> "Wrap explanation text at this width (text only)").default_value("80"))
        .arg(clap::arg!(--"no-links" "Flatten explanation links to plain text"))
        .arg(
            clap::arg!(--"cache-file" <FILE> "Cache file location")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--"no-cache" "Keep the cache in memory only"))
        .arg(clap::arg!(--relay <URL> "Prefix prepended to every page URL"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests"))
        .arg(clap::arg!(--concurrency <NUM> "Maximum concurrent requests per range group").default_value("5"))
        .arg(clap::arg!(--timezone <TZ> "Timezone that decides which day is the latest").default_value("America/Detroit"))
        .arg(clap::arg!(--"rollover-hour" <HOUR> "Local hour before which the latest entry is still yesterday's").default_value("5"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_parser(["bash", "zsh", "fish", "powershell", "elvish"]),
        );

    for shell in [
        clap_complete::Shell::Bash,
        clap_complete::Shell::Zsh,
        clap_complete::Shell::Fish,
        clap_complete::Shell::PowerShell,
    ] {
        if let Err(e) = clap_complete::generate_to(shell, &mut cmd, "apod", &completions_dir) {
            println!("cargo:warning=Failed to generate {} completions: {}", shell, e);
        }
    }
}
