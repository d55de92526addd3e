use clap::{Parser, ValueEnum};
use flow2code::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// CLI-side mirror of the library's target enum, so the library needs no clap.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TargetCli {
    Typescript,
    Javascript,
    Python,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModuleCli {
    Esm,
    Cjs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatCli {
    /// `{ nodes, edges }` with explicit anchors and parameters
    Canonical,
    /// React-Flow style editor export
    Reactflow,
}

/// Compiles a visual LLM flow into a runnable source module
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the flow JSON file
    flow_path: PathBuf,

    /// Input document format
    #[arg(short, long, value_enum, default_value = "canonical")]
    format: FormatCli,

    /// Generation settings as JSON; flags below override individual fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    target: Option<TargetCli>,

    #[arg(long, value_enum)]
    module: Option<ModuleCli>,

    /// Also generate a test module
    #[arg(long)]
    tests: bool,

    /// Add a file header and per-node comments
    #[arg(long)]
    docs: bool,

    /// Enable run tracing in the generated program
    #[arg(long)]
    tracing: bool,

    /// Environment variable set up by the generated program, as KEY=VALUE
    #[arg(short, long = "env", value_parser = parse_env_pair)]
    env: Vec<(String, String)>,

    #[arg(long)]
    indent: Option<usize>,

    #[arg(long)]
    single_quotes: bool,

    #[arg(long)]
    no_semicolons: bool,

    #[arg(long)]
    no_trailing_commas: bool,

    /// Name of the generated module (file stem)
    #[arg(long)]
    module_name: Option<String>,

    /// Directory to write the module, tests and manifest into; stdout when absent
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Lower nodes in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json_report: bool,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);
    let total_start = Instant::now();

    // --- 1. Configuration ---
    let ctx = build_context(&cli);

    // --- 2. Loading ---
    let json = fs::read_to_string(&cli.flow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read flow file '{}': {}",
            cli.flow_path.display(),
            e
        ))
    });
    let document = match cli.format {
        FormatCli::Canonical => FlowDocument::from_json(&json),
        FormatCli::Reactflow => {
            ReactFlowExport::from_json(&json).and_then(IntoFlowDocument::into_flow_document)
        }
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to load flow: {}", e)));

    // --- 3. Conversion ---
    let registry = ConverterRegistry::with_defaults()
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid converter catalogue: {}", e)));
    let compiler = Compiler::builder(Arc::new(registry))
        .parallel(cli.parallel)
        .build();
    let convert_start = Instant::now();
    let output = compiler.convert_document(document, &ctx);
    let convert_duration = convert_start.elapsed();

    // --- 4. Report ---
    if cli.json_report {
        let json = serde_json::to_string_pretty(&output.report)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialise report: {}", e)));
        eprintln!("{}", json);
    } else {
        eprintln!("{}", ReportFormatter::format_report(&output.report));
    }

    let Some(source) = &output.source else {
        exit_with_error("Conversion failed; no code was generated.");
    };

    // --- 5. Output ---
    match &cli.out_dir {
        Some(dir) => write_outputs(dir, &ctx, source, &output),
        None => print!("{}", source),
    }

    eprintln!("Converted in {:?} (total {:?})", convert_duration, total_start.elapsed());
}

fn build_context(cli: &Cli) -> GenerationContext {
    let base = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to read config '{}': {}", path.display(), e))
            });
            GenerationContext::from_json(&json)
                .unwrap_or_else(|e| exit_with_error(&format!("Invalid config: {}", e)))
        }
        None => GenerationContext::default(),
    };

    let mut ctx = base;
    if let Some(target) = cli.target {
        ctx.target = match target {
            TargetCli::Typescript => TargetLanguage::TypeScript,
            TargetCli::Javascript => TargetLanguage::JavaScript,
            TargetCli::Python => TargetLanguage::Python,
        };
    }
    if let Some(module) = cli.module {
        ctx.module_style = match module {
            ModuleCli::Esm => ModuleStyle::Esm,
            ModuleCli::Cjs => ModuleStyle::Cjs,
        };
    }
    ctx.features.include_tests |= cli.tests;
    ctx.features.include_docs |= cli.docs;
    ctx.features.tracing |= cli.tracing;
    ctx.env.extend(cli.env.iter().cloned());
    if let Some(indent) = cli.indent {
        ctx.style.indent_width = indent;
    }
    if cli.single_quotes {
        ctx.style.quote = QuoteStyle::Single;
    }
    if cli.no_semicolons {
        ctx.style.semicolons = false;
    }
    if cli.no_trailing_commas {
        ctx.style.trailing_commas = false;
    }
    if let Some(name) = &cli.module_name {
        ctx.module_name = name.clone();
    }
    ctx
}

fn write_outputs(dir: &Path, ctx: &GenerationContext, source: &str, output: &ConversionOutput) {
    fs::create_dir_all(dir).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to create '{}': {}", dir.display(), e))
    });
    let ext = ctx.target.file_extension();
    let module = &ctx.module_name;

    write_file(&dir.join(format!("{}.{}", module, ext)), source);
    if let Some(tests) = &output.tests {
        let name = if ctx.is_python() {
            format!("test_{}.py", module)
        } else {
            format!("{}.test.{}", module, ext)
        };
        write_file(&dir.join(name), tests);
    }

    if ctx.is_python() {
        let mut lines = output.dependencies.clone();
        lines.extend(output.dev_dependencies.iter().cloned());
        write_file(&dir.join("requirements.txt"), &format!("{}\n", lines.join("\n")));
    } else {
        let versions = |packages: &[String]| -> serde_json::Map<String, serde_json::Value> {
            packages
                .iter()
                .map(|p| (p.clone(), serde_json::Value::String("latest".to_string())))
                .collect()
        };
        let manifest = serde_json::json!({
            "name": module,
            "private": true,
            "type": if ctx.uses_esm_exports() { "module" } else { "commonjs" },
            "dependencies": versions(&output.dependencies),
            "devDependencies": versions(&output.dev_dependencies),
        });
        let text = serde_json::to_string_pretty(&manifest)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialise manifest: {}", e)));
        write_file(&dir.join("package.json"), &format!("{}\n", text));
    }
    eprintln!("Wrote generated files to '{}'", dir.display());
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
    });
}

fn parse_env_pair(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .filter(|(key, _)| !key.trim().is_empty())
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("flow2code=debug")
        } else {
            EnvFilter::new("flow2code=warn")
        }
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Helper function to print an error message and exit the process.
fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
