// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Umlpress CLI entrypoint.
//!
//! By default this serves the render API at `http://127.0.0.1:27436/api/diagrams/render`.
//!
//! Use `--encode` to print tokens and render URLs for local files, or `--decode` to turn
//! a token back into PlantUML source.

use std::error::Error;
use std::io::Read;

use tracing_subscriber::EnvFilter;
use umlpress::config::{ConfigKey, ServerConfig};
use umlpress::token::{decode, TokenEncoder};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--bind <addr>] [--render-host <url>] [--framing raw|zlib] [--max-body-bytes <n>]\n  {program} [--render-host <url>] [--framing raw|zlib] --encode <file|-> [<file>...]\n  {program} --decode <token>\n\nServe mode (default) answers POST /api/diagrams/render with PNG/SVG URLs.\n--encode prints the token and URLs for each input (`-` reads stdin).\n--decode prints the PlantUML source carried by a `~1` token.\n\nEach flag can also be set through its environment variable:\n  UMLPRESS_BIND, UMLPRESS_RENDER_HOST, UMLPRESS_FRAMING, UMLPRESS_MAX_BODY_BYTES\nLog verbosity follows RUST_LOG (default: info)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
enum Mode {
    #[default]
    Serve,
    Encode(Vec<String>),
    Decode(String),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    mode: Mode,
    overrides: Vec<(ConfigKey, String)>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();
    let mut positional = Vec::new();
    let mut encode = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--encode" => {
                if encode {
                    return Err(());
                }
                encode = true;
            }
            "--decode" => {
                if options.mode != Mode::Serve {
                    return Err(());
                }
                let token = args.next().ok_or(())?;
                options.mode = Mode::Decode(token);
            }
            "-" => positional.push(arg),
            flag if flag.starts_with('-') => {
                let key = ConfigKey::from_flag(flag).ok_or(())?;
                if options.overrides.iter().any(|(existing, _)| *existing == key) {
                    return Err(());
                }
                let value = args.next().ok_or(())?;
                options.overrides.push((key, value));
            }
            _ => positional.push(arg),
        }
    }

    if encode {
        if options.mode != Mode::Serve || positional.is_empty() {
            return Err(());
        }
        options.mode = Mode::Encode(positional);
    } else if !positional.is_empty() {
        return Err(());
    }

    Ok(options)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(overrides: &[(ConfigKey, String)]) -> Result<ServerConfig, Box<dyn Error>> {
    let mut config = ServerConfig::from_env()?;
    for (key, value) in overrides {
        config.set(*key, value)?;
    }
    Ok(config)
}

fn read_input(path: &str) -> Result<String, Box<dyn Error>> {
    if path == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .map_err(|err| format!("failed to read stdin: {err}"))?;
        return Ok(source);
    }
    std::fs::read_to_string(path).map_err(|err| format!("failed to read {path}: {err}").into())
}

fn run_encode(config: &ServerConfig, paths: &[String]) -> Result<(), Box<dyn Error>> {
    if paths.iter().filter(|path| path.as_str() == "-").count() > 1 {
        return Err("stdin ('-') can only be read once".into());
    }

    let sources = paths.iter().map(|path| read_input(path)).collect::<Result<Vec<_>, _>>()?;
    let encoder = TokenEncoder::new(config.framing);
    let results = encoder.encode_all(&sources);

    let mut failures = 0usize;
    for (path, result) in paths.iter().zip(results) {
        if paths.len() > 1 {
            println!("== {path}");
        }
        match result {
            Ok(token) => {
                let urls = config.render_host.urls(&token);
                println!("token: {token}");
                println!("png:   {}", urls.image_url);
                println!("svg:   {}", urls.svg_url);
            }
            Err(err) => {
                tracing::error!(input = %path, error = %err, "encoding failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} inputs failed to encode", paths.len()).into());
    }
    Ok(())
}

fn run_decode(token: &str) -> Result<(), Box<dyn Error>> {
    let source = decode(token)?;
    if source.ends_with('\n') {
        print!("{source}");
    } else {
        println!("{source}");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for ctrl-c; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "umlpress".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_tracing();

        match options.mode {
            Mode::Decode(token) => run_decode(&token),
            Mode::Encode(paths) => {
                let config = resolve_config(&options.overrides)?;
                run_encode(&config, &paths)
            }
            Mode::Serve => {
                let config = resolve_config(&options.overrides)?;
                let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
                runtime.block_on(umlpress::server::serve(config, shutdown_signal()))?;
                Ok(())
            }
        }
    })();

    if let Err(err) = result {
        eprintln!("umlpress: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use umlpress::config::ConfigKey;

    use super::{parse_options, CliOptions, Mode};

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|arg| (*arg).to_owned()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_empty_args_as_serve() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
        assert_eq!(options.mode, Mode::Serve);
    }

    #[test]
    fn parses_config_flags() {
        let options = parse_options(args(&[
            "--bind",
            "0.0.0.0:9000",
            "--render-host",
            "http://localhost:8080",
            "--framing",
            "zlib",
        ]))
        .expect("parse options");
        assert_eq!(options.mode, Mode::Serve);
        assert_eq!(
            options.overrides,
            vec![
                (ConfigKey::Bind, "0.0.0.0:9000".to_owned()),
                (ConfigKey::RenderHost, "http://localhost:8080".to_owned()),
                (ConfigKey::Framing, "zlib".to_owned()),
            ]
        );
    }

    #[test]
    fn parses_encode_with_multiple_inputs() {
        let options =
            parse_options(args(&["--encode", "a.puml", "-", "b.puml"])).expect("parse options");
        assert_eq!(
            options.mode,
            Mode::Encode(vec!["a.puml".to_owned(), "-".to_owned(), "b.puml".to_owned()])
        );
    }

    #[test]
    fn parses_encode_inputs_before_flag() {
        let options = parse_options(args(&["a.puml", "--framing", "raw", "--encode"]))
            .expect("parse options");
        assert_eq!(options.mode, Mode::Encode(vec!["a.puml".to_owned()]));
        assert_eq!(options.overrides, vec![(ConfigKey::Framing, "raw".to_owned())]);
    }

    #[test]
    fn parses_decode() {
        let options = parse_options(args(&["--decode", "~1abc"])).expect("parse options");
        assert_eq!(options.mode, Mode::Decode("~1abc".to_owned()));
    }

    #[test]
    fn rejects_encode_without_inputs() {
        parse_options(args(&["--encode"])).unwrap_err();
    }

    #[test]
    fn rejects_encode_with_decode() {
        parse_options(args(&["--decode", "~1abc", "--encode", "a.puml"])).unwrap_err();
        parse_options(args(&["--decode", "~1abc", "--decode", "~1abd"])).unwrap_err();
    }

    #[test]
    fn rejects_positional_without_encode() {
        parse_options(args(&["a.puml"])).unwrap_err();
    }

    #[test]
    fn rejects_unknown_and_duplicate_flags() {
        parse_options(args(&["--nope"])).unwrap_err();
        parse_options(args(&["--framing", "raw", "--framing", "zlib"])).unwrap_err();
        parse_options(args(&["--encode", "--encode", "a.puml"])).unwrap_err();
    }

    #[test]
    fn rejects_missing_flag_value() {
        parse_options(args(&["--bind"])).unwrap_err();
        parse_options(args(&["--decode"])).unwrap_err();
    }
}
