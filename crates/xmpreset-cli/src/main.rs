//! xmpreset - convert XMP develop settings into a filter preset

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, trace};
use xmpreset_core::ConvertOptions;

mod logging;
mod output;

#[derive(Parser)]
#[command(name = "xmpreset")]
#[command(author, version, about = "Convert XMP develop settings into a filter preset")]
#[command(long_about = "
Reads the camera-raw develop settings of an XMP sidecar and writes the
equivalent ordered filter list as a JSON preset.

Examples:
  xmpreset look.xmp look.json
  xmpreset look.xmp presets/look.json --key look --compact
  xmpreset look.xmp look.json --language de-DE -v
")]
struct Cli {
    /// Input XMP sidecar
    input: PathBuf,

    /// Output preset file (parent directories are created)
    output: PathBuf,

    /// Preset key (defaults to the output path)
    #[arg(short, long)]
    key: Option<String>,

    /// Preferred language for localized fields
    #[arg(short, long, default_value = "en-US")]
    language: String,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        let key = self
            .key
            .clone()
            .unwrap_or_else(|| self.output.to_string_lossy().into_owned());
        ConvertOptions::new(key).with_language(self.language.clone())
    }
}

fn run(cli: &Cli) -> Result<()> {
    trace!(input = %cli.input.display(), output = %cli.output.display(), "xmpreset::run");

    let xml = output::read_sidecar(&cli.input)?;
    let conversion = xmpreset_core::convert_xmp(&xml, &cli.options())
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;

    output::write_preset(&conversion.preset, &cli.output, !cli.compact)?;

    info!(
        filters = conversion.preset.filters.len(),
        warnings = conversion.warnings.len(),
        output = %cli.output.display(),
        "wrote preset"
    );
    if cli.verbose {
        println!(
            "{} -> {} ({} filters)",
            cli.input.display(),
            cli.output.display(),
            conversion.preset.filters.len()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    run(&cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SIDECAR: &str = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
 <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
  <rdf:Description rdf:about=""
    xmlns:crs="http://ns.adobe.com/camera-raw-settings/1.0/"
    crs:Exposure2012="+0.50"
    crs:Vibrance="+40"/>
 </rdf:RDF>
</x:xmpmeta>"#;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("xmpreset").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_key_defaults_to_output_path() {
        let cli = cli(&["in.xmp", "presets/look.json"]);
        let options = cli.options();
        assert_eq!(options.key, "presets/look.json");
        assert_eq!(options.language, "en-US");
        assert!(!cli.compact);
    }

    #[test]
    fn test_explicit_key_and_language() {
        let options = cli(&["in.xmp", "out.json", "--key", "look", "--language", "fr-FR"]).options();
        assert_eq!(options.key, "look");
        assert_eq!(options.language, "fr-FR");
    }

    #[test]
    fn test_missing_output_is_rejected() {
        assert!(Cli::try_parse_from(["xmpreset", "in.xmp"]).is_err());
    }

    #[test]
    fn test_run_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("look.xmp");
        let output = dir.path().join("out/look.json");
        fs::write(&input, SIDECAR).unwrap();

        let cli = cli(&[
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--key",
            "look",
            "--compact",
        ]);
        run(&cli).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.starts_with(r#"{"key":"look","info":{},"filters":[{"key":"CIExposureAdjust""#));
        assert!(written.contains("CIVibrance"));
    }

    #[test]
    fn test_run_reports_broken_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.xmp");
        fs::write(&input, "<x:xmpmeta><rdf:RDF></x:xmpmeta>").unwrap();
        let output = dir.path().join("look.json");

        let cli = cli(&[input.to_str().unwrap(), output.to_str().unwrap()]);
        let err = run(&cli).unwrap_err();
        assert!(err.to_string().starts_with("Failed to convert"));
        assert!(!output.exists());
    }
}
