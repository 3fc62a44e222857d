use anyhow::{bail, Context, Result};
use log::info;
use numlab_cli::commands::Command;
use numlab_cli::config::{init_logger, level_filter, LabConfig};
use std::path::PathBuf;

const USAGE: &str = "usage: numlab [--config <file.toml>] [all | ode [c0 c1 ...] | roots | dft | geometry | info | linalg]";

#[derive(Debug, PartialEq)]
struct Invocation {
    config_path: Option<PathBuf>,
    command: Command,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Invocation> {
    let mut config_path = None;
    let mut positional = Vec::new();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .with_context(|| format!("--config requires a path.\n{USAGE}"))?;
                config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => bail!("{USAGE}"),
            _ => positional.push(arg),
        }
    }

    let command = match positional.first().map(String::as_str) {
        None | Some("all") => Command::All,
        Some("ode") => {
            let coefficients = positional[1..]
                .iter()
                .map(|s| {
                    s.parse::<f64>()
                        .with_context(|| format!("Invalid coefficient \"{s}\"."))
                })
                .collect::<Result<Vec<f64>>>()?;
            Command::Ode(coefficients)
        }
        Some("roots") => Command::Roots,
        Some("dft") => Command::Dft,
        Some("geometry") => Command::Geometry,
        Some("info") => Command::Info,
        Some("linalg") => Command::Linalg,
        Some(other) => bail!("Unknown command \"{other}\".\n{USAGE}"),
    };
    if !matches!(command, Command::Ode(_)) && positional.len() > 1 {
        bail!("Command \"{}\" takes no arguments.\n{USAGE}", positional[0]);
    }

    Ok(Invocation {
        config_path,
        command,
    })
}

fn main() -> Result<()> {
    let invocation = parse_args(std::env::args().skip(1))?;
    let config = match &invocation.config_path {
        Some(path) => LabConfig::load(path)?,
        None => LabConfig::default(),
    };
    init_logger(level_filter(&config.log_level)?);
    info!("running {:?}", invocation.command);

    let report = invocation.command.run(&config)?;
    print!("{report}");
    Ok(())
}
