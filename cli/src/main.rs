use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use quill::{Engine, EngineOptions, Error, Program, TreeTracer, render_error};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

/// Quill - a small imperative scripting language
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Run Quill programs", long_about = None)]
struct Args {
    /// Program file to run (if neither FILE nor --eval is given, reads from stdin)
    #[arg(conflicts_with = "eval")]
    file: Option<PathBuf>,

    /// Program text to run
    #[arg(short, long, value_name = "EXPR")]
    eval: Option<String>,

    /// Print the compiled instructions before running
    #[arg(long)]
    debug_code: bool,

    /// Print the grammar rules tried while parsing
    #[arg(long)]
    trace_parse: bool,
}

fn read_source(args: &Args) -> Result<String> {
    if let Some(source) = &args.eval {
        return Ok(source.clone());
    }
    match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .into_diagnostic()
                .wrap_err("failed to read the program from stdin")?;
            Ok(source)
        }
    }
}

fn compile(engine: &Engine, source: &str, args: &Args) -> Result<Program, Error> {
    if !args.trace_parse {
        return engine.compile(source);
    }
    let mut tracer = TreeTracer::new();
    let program = engine.compile_traced(source, &mut tracer);
    println!("=== Parse Trace ===");
    print!("{}", tracer.render());
    println!();
    program
}

fn interpret(engine: &Engine, source: &str, args: &Args) -> Result<String, Error> {
    let program = compile(engine, source, args)?;

    if args.debug_code {
        println!("=== Code ===");
        println!("{:?}", program.code());
    }

    program.run()
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG to control the log level; default to WARN if not set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let source = read_source(&args)?;
    let engine = Engine::with_stdlib(EngineOptions::default())
        .map_err(|err| miette::miette!("failed to register the standard library: {err}"))?;

    match interpret(&engine, &source, &args) {
        Ok(result) => {
            println!("{}", result);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(error = %err, "program failed");
            println!("ERROR");
            render_error(&source, &err);
            Ok(ExitCode::FAILURE)
        }
    }
}
