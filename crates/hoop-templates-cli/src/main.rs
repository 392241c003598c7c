//! hoop CLI - export template tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use hoop_templates::placeholders::{self, PlaceholderScope};
use hoop_templates::prelude::*;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hoop")]
#[command(author, version, about = "Club export templates: preview, map and generate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known placeholders
    Placeholders {
        /// Only placeholders of this scope
        #[arg(short, long)]
        scope: Option<Scope>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the editor preview of an xlsx template as JSON
    Preview {
        /// Template file (xlsx)
        input: PathBuf,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate placeholder mappings and write them into an xlsx template
    Map {
        /// Template file (xlsx)
        input: PathBuf,

        /// JSON array of {"row", "col", "value"} (0-based)
        #[arg(short, long)]
        mappings: PathBuf,

        /// Output file (default: <input>-mapped.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the placeholders a template uses
    Inspect {
        /// Template file (xlsx or docx)
        input: PathBuf,
    },

    /// Render a template for a season's players
    Generate {
        /// Template file (xlsx or docx)
        input: PathBuf,

        /// Generation context as JSON
        #[arg(short, long)]
        context: PathBuf,

        /// Template name used in the output file name (default: input file stem)
        #[arg(short, long)]
        name: Option<String>,

        /// Render options as JSON
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output file (default: <name>-<season>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create an xlsx template with one header row of placeholders
    Scaffold {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Placeholder keys, e.g. {{playerLastName}}
        #[arg(required = true)]
        columns: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Scope {
    Document,
    Row,
}

impl From<Scope> for PlaceholderScope {
    fn from(scope: Scope) -> Self {
        match scope {
            Scope::Document => PlaceholderScope::Document,
            Scope::Row => PlaceholderScope::Row,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));
    let cli = Cli::parse();

    match cli.command {
        Commands::Placeholders { scope, json } => list_placeholders(scope, json),
        Commands::Preview { input, output } => preview(&input, output.as_deref()),
        Commands::Map {
            input,
            mappings,
            output,
        } => {
            map(&input, &mappings, output.as_deref())?;
            Ok(())
        }
        Commands::Inspect { input } => inspect(&input),
        Commands::Generate {
            input,
            context,
            name,
            options,
            output,
        } => {
            let path = generate_file(
                &input,
                &context,
                name.as_deref(),
                options.as_deref(),
                output.as_deref(),
            )?;
            eprintln!("Wrote '{}'", path.display());
            Ok(())
        }
        Commands::Scaffold { output, columns } => scaffold(&output, &columns),
    }
}

fn list_placeholders(scope: Option<Scope>, json: bool) -> Result<()> {
    let definitions: Vec<_> = match scope {
        Some(scope) => placeholders::definitions_by_scope(scope.into()),
        None => placeholders::REGISTRY.iter().collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }
    for def in definitions {
        println!("{:<22} {:<9} {}", def.key, def.scope.as_str(), def.description);
    }
    Ok(())
}

fn preview(input: &Path, output: Option<&Path>) -> Result<()> {
    let bytes = read(input)?;
    let filename = file_name(input);
    let preview = preview_template(&filename, &bytes)
        .with_context(|| format!("Failed to preview '{}'", input.display()))?;
    let json = serde_json::to_string_pretty(&preview)?;

    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => {
            let mut stdout = io::stdout();
            writeln!(stdout, "{}", json).context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn map(input: &Path, mappings: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let bytes = read(input)?;
    let mappings: Vec<CellMapping> = read_json(mappings)?;
    let prepared = prepare_upload(&file_name(input), &bytes, Some(&mappings))
        .with_context(|| format!("Failed to map '{}'", input.display()))?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_file_name(format!("{}-mapped.xlsx", file_stem(input))),
    };
    write(&path, &prepared.bytes)?;
    eprintln!(
        "Wrote {} mappings ({} placeholders) to '{}'",
        mappings.len(),
        prepared.placeholders.len(),
        path.display()
    );
    Ok(path)
}

fn inspect(input: &Path) -> Result<()> {
    let bytes = read(input)?;
    let prepared = prepare_upload(&file_name(input), &bytes, None)
        .with_context(|| format!("Failed to inspect '{}'", input.display()))?;

    println!("File: {}", input.display());
    println!("Format: {}", prepared.format);
    if prepared.placeholders.is_empty() {
        println!("No placeholders");
    }
    for key in &prepared.placeholders {
        let scope = placeholders::lookup(key).map_or("", |d| d.scope.as_str());
        println!("  {:<22} {}", key, scope);
    }
    Ok(())
}

fn generate_file(
    input: &Path,
    context: &Path,
    name: Option<&str>,
    options: Option<&Path>,
    output: Option<&Path>,
) -> Result<PathBuf> {
    let format = TemplateFormat::from_filename(&file_name(input))?;
    let name = name.map_or_else(|| file_stem(input), str::to_string);
    let template = StoredTemplate::new(name, format, read(input)?);

    let options: RenderOptions = match options {
        Some(path) => read_json(path)?,
        None => RenderOptions::default(),
    };
    let mut context: GenerationContext = read_json(context)?;
    if context.export_date.is_empty() {
        context.export_date = options.format_date(chrono::Local::now().date_naive());
    }
    log::debug!(
        "generating '{}' for {} players",
        template.name,
        context.players.len()
    );

    let document = generate(&template, &context, &options)
        .with_context(|| format!("Failed to generate from '{}'", input.display()))?;
    let path = output.map_or_else(|| PathBuf::from(&document.filename), Path::to_path_buf);
    write(&path, &document.bytes)?;
    Ok(path)
}

fn scaffold(output: &Path, columns: &[String]) -> Result<()> {
    let (bytes, kept) = scaffold_template(columns)?;
    write(output, &bytes)?;
    eprintln!("Wrote {} columns to '{}'", kept.len(), output.display());
    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to open '{}'", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to open '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in '{}'", path.display()))
}

fn write(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).with_context(|| format!("Failed to write '{}'", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "template".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn roster(dir: &Path) -> PathBuf {
        let path = dir.join("roster.xlsx");
        let (bytes, _) = scaffold_template(&["{{order}}", "{{playerLastName}}"]).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_map_writes_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = roster(dir.path());
        let mappings = dir.path().join("mappings.json");
        fs::write(
            &mappings,
            r#"[{"row": 2, "col": 0, "value": "Club: {{clubName}}"}]"#,
        )
        .unwrap();

        let path = map(&input, &mappings, None).unwrap();
        assert_eq!(path, dir.path().join("roster-mapped.xlsx"));
        let preview = parse_preview(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            preview.cell(2, 0).and_then(|c| c.placeholder.clone()),
            Some("{{clubName}}".to_string())
        );
    }

    #[test]
    fn test_map_rejects_unknown_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let input = roster(dir.path());
        let mappings = dir.path().join("mappings.json");
        fs::write(&mappings, r#"[{"row": 0, "col": 0, "value": "{{unknownToken}}"}]"#).unwrap();

        let err = map(&input, &mappings, None).unwrap_err();
        let source = err.downcast_ref::<TemplateError>().unwrap();
        assert_eq!(source.to_string(), "Invalid placeholder keys: {{unknownToken}}");
    }

    #[test]
    fn test_generate_fills_export_date_and_names_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = roster(dir.path());
        let context = dir.path().join("context.json");
        fs::write(
            &context,
            r#"{
                "seasonLabel": "2025-2026",
                "players": [
                    {"firstName": "Ana", "lastName": "Diaz", "birthDate": "2015-06-15", "gender": "F"},
                    {"firstName": "Ben", "lastName": "Moreau", "birthDate": "2017-02-01", "gender": "G"}
                ]
            }"#,
        )
        .unwrap();
        let output = dir.path().join("out.xlsx");

        let path = generate_file(&input, &context, Some("Roster"), None, Some(&output)).unwrap();
        assert_eq!(path, output);

        let preview = parse_preview(&fs::read(&path).unwrap()).unwrap();
        // the scaffolded header row is the template row
        assert_eq!(preview.row_count, 2);
        assert_eq!(preview.cell(0, 0).map(|c| c.value.as_str()), Some("1"));
        assert_eq!(preview.cell(1, 1).map(|c| c.value.as_str()), Some("Moreau"));
    }

    #[test]
    fn test_generate_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("roster.ods");
        fs::write(&input, b"").unwrap();
        let err = generate_file(&input, &input, None, None, None).unwrap_err();
        assert!(err.downcast_ref::<TemplateError>().is_some());
    }
}
