use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &[
    "ast-json",
    "ast-treeviz",
    "urls",
    "classify-json",
    "render-json",
    "render-treeviz",
    "render-html",
];

const FORMATS: &[&str] = &["html", "json", "treeviz"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("markview")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render and inspect user-authored markdown")
        .arg(
            Arg::new("list-transforms")
                .long("list-transforms")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-themes")
                .long("list-themes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("render")
                .arg(
                    Arg::new("input")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_parser(clap::builder::PossibleValuesParser::new(FORMATS)),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                )
                .arg(Arg::new("top-level").long("top-level").action(ArgAction::SetTrue))
                .arg(Arg::new("nested").long("nested").action(ArgAction::SetTrue))
                .arg(
                    Arg::new("no-fragments")
                        .long("no-fragments")
                        .action(ArgAction::SetTrue),
                )
                .arg(Arg::new("nofollow").long("nofollow").action(ArgAction::SetTrue))
                .arg(Arg::new("probe").long("probe").action(ArgAction::SetTrue))
                .arg(Arg::new("theme").long("theme").value_hint(ValueHint::Other)),
        )
        .subcommand(
            Command::new("inspect")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        );

    generate_to(Bash, &mut cmd, "markview", &outdir)?;
    generate_to(Zsh, &mut cmd, "markview", &outdir)?;
    generate_to(Fish, &mut cmd, "markview", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
