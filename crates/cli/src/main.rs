use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use overlay::{assemble, AssemblyOutput, ZoneConfig};
use pdf_core::TemplatePdf;
use roster::load_entries;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "verso", about = "Overlay names and addresses on PDF verso pages", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate recto/verso PDFs from CSV rows and a template
    Generate {
        /// Input CSV file(s), concatenated in order
        #[arg(short, long, required = true, num_args = 1..)]
        csv: Vec<PathBuf>,

        /// Template PDF whose first page is the recto
        #[arg(short, long)]
        template: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        out_dir: PathBuf,

        /// Produce a single combined PDF instead of one per row
        #[arg(long)]
        single: bool,

        /// Also bundle the generated PDFs into a ZIP next to the first CSV
        #[arg(long)]
        zip: bool,

        /// Name zone as JSON, e.g. '{"left":20,"bottom":250,"width":80,"height":30}'
        #[arg(long)]
        name_zone: Option<String>,

        /// Address zone as JSON, e.g. '{"left":95,"bottom":20,"width":100,"height":40}'
        #[arg(long)]
        address_zone: Option<String>,
    },

    /// Show the detected columns and rows of the CSV inputs
    Preview {
        /// Input CSV file(s), concatenated in order
        #[arg(short, long, required = true, num_args = 1..)]
        csv: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    match Cli::parse().command {
        Commands::Generate {
            csv,
            template,
            out_dir,
            single,
            zip,
            name_zone,
            address_zone,
        } => generate(
            &csv,
            &template,
            &out_dir,
            single,
            zip,
            name_zone.as_deref(),
            address_zone.as_deref(),
        ),
        Commands::Preview { csv } => preview(&csv),
    }
}

fn generate(
    csv: &[PathBuf],
    template_path: &Path,
    out_dir: &Path,
    single: bool,
    zip: bool,
    name_zone: Option<&str>,
    address_zone: Option<&str>,
) -> Result<()> {
    let name_zone = parse_zone(name_zone).context("invalid --name-zone")?;
    let address_zone = parse_zone(address_zone).context("invalid --address-zone")?;

    let roster = load_entries(csv)?;
    println!(
        "{} row(s) read (address column '{}')",
        roster.entries.len(),
        roster.address_column
    );

    let template = TemplatePdf::open(template_path)
        .with_context(|| format!("cannot open template {}", template_path.display()))?;

    let assembly = assemble(
        &template,
        &roster.entries,
        name_zone.as_ref(),
        address_zone.as_ref(),
        single,
    )?;
    print!("{}", assembly.log);

    fs::create_dir_all(out_dir)
        .with_context(|| format!("cannot create output directory {}", out_dir.display()))?;

    let written = match &assembly.output {
        AssemblyOutput::Combined(bytes) => {
            let path = out_dir.join("courrier_all.pdf");
            fs::write(&path, bytes)?;
            println!("Combined PDF written: {}", path.display());
            vec![path]
        }
        AssemblyOutput::PerEntry(documents) => {
            let mut paths = Vec::with_capacity(documents.len());
            for document in documents {
                let path = out_dir.join(format!("courrier_{}.pdf", document.row));
                fs::write(&path, &document.bytes)?;
                paths.push(path);
            }
            println!("{} PDF(s) written to {}", paths.len(), out_dir.display());
            paths
        }
    };

    if zip {
        let stem = csv[0]
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("verso");
        let zip_path = csv[0]
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!("{stem}_pdfs.zip"));
        write_zip(&zip_path, &written)?;
        println!("ZIP written: {}", zip_path.display());
    }

    Ok(())
}

fn preview(csv: &[PathBuf]) -> Result<()> {
    let roster = load_entries(csv)?;
    match &roster.name_column {
        Some(column) => println!("Name column: {column}"),
        None => println!("Name column: (none, names left empty)"),
    }
    println!("Address column: {}", roster.address_column);
    println!("{} row(s):", roster.entries.len());
    for entry in &roster.entries {
        let address = entry.address.replace("\\n", " / ").replace('\n', " / ");
        println!("  {:>4}  {}  {}", entry.row, entry.name, address);
    }
    Ok(())
}

fn parse_zone(raw: Option<&str>) -> Result<Option<ZoneConfig>> {
    match raw {
        None => Ok(None),
        Some(text) => {
            let config: ZoneConfig = serde_json::from_str(text)?;
            Ok(Some(config))
        }
    }
}

/// Bundle the written PDFs, mirroring the desktop workflow's ZIP handoff
fn write_zip(zip_path: &Path, files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        bail!("nothing to bundle");
    }
    let file = fs::File::create(zip_path)
        .with_context(|| format!("cannot create {}", zip_path.display()))?;
    let mut archive = zip::ZipWriter::new(file);
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for path in files {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("unrepresentable file name")?;
        archive.start_file(name, options)?;
        archive.write_all(&fs::read(path)?)?;
    }
    archive.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_zone_roundtrip() {
        let zone = parse_zone(Some(r#"{"left":95,"bottom":20,"width":100,"height":40}"#))
            .unwrap()
            .unwrap();
        assert_eq!(zone.left, Some(95.0));
        assert_eq!(zone.height, Some(40.0));
    }

    #[test]
    fn test_parse_zone_absent() {
        assert!(parse_zone(None).unwrap().is_none());
    }

    #[test]
    fn test_parse_zone_invalid() {
        assert!(parse_zone(Some("{nope")).is_err());
    }

    #[test]
    fn test_generate_args() {
        let cli = Cli::parse_from([
            "verso", "generate", "--csv", "a.csv", "--csv", "b.csv", "--template", "recto.pdf",
            "--single", "--zip",
        ]);
        match cli.command {
            Commands::Generate {
                csv, single, zip, ..
            } => {
                assert_eq!(csv.len(), 2);
                assert!(single);
                assert!(zip);
            }
            _ => panic!("expected generate subcommand"),
        }
    }
}
