//! CLI tool to parse and render fixed-width data files through a template.
//!
//! Usage:
//!   fixedform parse <template.tpl> <input.data> [-o output]
//!   fixedform render <template.tpl> <values.txt> [-o output]
//!
//! `parse` compiles the template (one template line per record line) and
//! processes the input in blocks of one template height, writing one
//! `name: value` line per field with a blank line between records.
//! `render` reads records in that same format and writes them back out as
//! fixed-width lines. If no output file is specified, writes to stdout.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use fixedform::{Context, MatchMode, Record, Template, Value};

#[derive(Parser)]
#[command(
    name = "fixedform",
    about = "Parse and render fixed-width records through column templates"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse fixed-width data lines into name/value records.
    Parse {
        /// Template file, one template line per record line.
        template: PathBuf,
        /// Input data file.
        input: PathBuf,
        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Require every field at full width instead of tolerating trimmed
        /// trailing whitespace.
        #[arg(long)]
        exact: bool,
    },
    /// Render name/value records back into fixed-width lines.
    Render {
        /// Template file, one template line per record line.
        template: PathBuf,
        /// Values file: `name: value` lines, blank line between records.
        values: PathBuf,
        /// Output file (default: stdout).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Parse {
            template,
            input,
            output,
            exact,
        } => run_parse(&template, &input, output.as_deref(), exact),
        Command::Render {
            template,
            values,
            output,
        } => run_render(&template, &values, output.as_deref()),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn compile_template(path: &Path, mode: MatchMode) -> Result<Template, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Error reading template file '{}': {}", path.display(), e))?;
    let template = Template::compile_with(&text, mode)
        .map_err(|e| format!("Error compiling template '{}': {}", path.display(), e))?;
    if template.is_empty() {
        return Err(format!("Template '{}' is empty", path.display()));
    }
    Ok(template)
}

fn run_parse(
    template_path: &Path,
    input_path: &Path,
    output_path: Option<&Path>,
    exact: bool,
) -> Result<(), String> {
    let mode = if exact {
        MatchMode::Exact
    } else {
        MatchMode::TrimTolerant
    };
    let template = compile_template(template_path, mode)?;

    let input_text = fs::read_to_string(input_path)
        .map_err(|e| format!("Error reading input file '{}': {}", input_path.display(), e))?;
    let lines: Vec<&str> = input_text.lines().collect();

    let mut out = String::new();
    let mut count = 0;
    for (block_idx, block) in lines.chunks(template.len()).enumerate() {
        let context = Context::new()
            .with_file(input_path.display().to_string())
            .with_line_num(block_idx * template.len() + 1)
            .with_excerpt(block.join("\n"));
        let record = template
            .process_lines(block, &context)
            .map_err(|e| e.to_string())?;
        if count > 0 {
            out.push('\n');
        }
        for (name, value) in &record {
            out.push_str(&format!("{}: {}\n", name, value));
        }
        count += 1;
    }

    write_output(&out, output_path)?;
    eprintln!("Processed {} record(s)", count);
    Ok(())
}

fn run_render(
    template_path: &Path,
    values_path: &Path,
    output_path: Option<&Path>,
) -> Result<(), String> {
    let template = compile_template(template_path, MatchMode::default())?;

    let values_text = fs::read_to_string(values_path).map_err(|e| {
        format!(
            "Error reading values file '{}': {}",
            values_path.display(),
            e
        )
    })?;

    let mut out = String::new();
    let mut count = 0;
    for block in values_text.split("\n\n") {
        let record = parse_record(block)?;
        if record.is_empty() && block.trim().is_empty() {
            continue;
        }
        out.push_str(&template.render(&record));
        count += 1;
    }

    write_output(&out, output_path)?;
    eprintln!("Rendered {} record(s)", count);
    Ok(())
}

/// Parse one `name: value` block into a record. An empty value is a blank
/// integer column; a value that parses as an integer is numeric; anything
/// else is text.
fn parse_record(block: &str) -> Result<Record, String> {
    let mut record = Record::new();
    for line in block.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| format!("Malformed value line (expected 'name: value'): {:?}", line))?;
        let value = value.strip_prefix(' ').unwrap_or(value);
        let value = if value.is_empty() {
            Value::Blank
        } else if let Ok(n) = value.parse::<i64>() {
            Value::Int(n)
        } else {
            Value::Text(value.to_string())
        };
        record.insert(name.trim().to_string(), value);
    }
    Ok(record)
}

fn write_output(output: &str, path: Option<&Path>) -> Result<(), String> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(|e| {
                    format!("Error creating output directory for '{}': {}", path.display(), e)
                })?;
            }
            fs::write(path, output)
                .map_err(|e| format!("Error writing output file '{}': {}", path.display(), e))
        }
        None => io::stdout()
            .write_all(output.as_bytes())
            .map_err(|e| format!("Error writing output: {}", e)),
    }
}
