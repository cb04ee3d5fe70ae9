use anyhow::{bail, Context, Result};
use clap::Parser;
use nc_compiler::backend::{run, StdHost};
use nc_compiler::frontend::lexer::lex;
use nc_compiler::frontend::token_stream::TokenStream;
use nc_compiler::{compile, parse, CompileOptions};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ncc")]
#[command(about = "Compiler for a small C-like language with bound-driven integer narrowing")]
struct Args {
    /// Path to the source file to compile. A built-in sample is used when omitted.
    file: Option<PathBuf>,

    /// Print the token stream and stop
    #[arg(long)]
    tokens: bool,

    /// Print the parsed AST and stop
    #[arg(long)]
    ast: bool,

    /// Print the IR (the default output)
    #[arg(long)]
    ir: bool,

    /// Print the IR module as JSON
    #[arg(long)]
    emit_json: bool,

    /// Skip the 64 -> 32 bit narrowing pass
    #[arg(long)]
    no_narrow: bool,

    /// Write the IR text to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Module to link against
    #[arg(long)]
    link: Option<PathBuf>,

    /// Interpret the compiled module and print the entry function's result
    #[arg(long)]
    run: bool,

    /// Function to start from with --run
    #[arg(long, default_value = "main")]
    entry: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = execute(args) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(args: Args) -> Result<()> {
    let (src, module_name) = match &args.file {
        Some(path) => {
            let src = fs::read_to_string(path)
                .with_context(|| format!("reading '{}'", path.display()))?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "main".to_string());
            (src, name)
        }
        None => (DEFAULT_SAMPLE.trim().to_string(), "sample".to_string()),
    };

    if args.tokens {
        print!("{}", TokenStream::new(lex(&src)?));
        return Ok(());
    }

    if args.ast {
        println!("{:#?}", parse(&src)?);
        return Ok(());
    }

    let options = CompileOptions {
        module_name,
        link: args.link.clone(),
        narrow: !args.no_narrow,
    };
    let module = compile(&src, &options)?;
    tracing::info!(
        module = %module.name,
        functions = module.functions.len(),
        narrowed = options.narrow,
        "compiled"
    );

    if args.emit_json {
        println!("{}", serde_json::to_string_pretty(&module)?);
    }

    let want_ir = args.ir || (!args.emit_json && !args.run) || args.output.is_some();
    if want_ir {
        let text = module.to_string();
        match &args.output {
            Some(path) => fs::write(path, text)
                .with_context(|| format!("writing '{}'", path.display()))?,
            None => print!("{}", text),
        }
    }

    if args.run {
        if module.function(&args.entry).is_none() {
            bail!("entry function '{}' is not defined", args.entry);
        }
        let result = run(&module, &args.entry, &[], &mut StdHost)?;
        println!("{} returned {}", args.entry, result);
    }

    Ok(())
}

const DEFAULT_SAMPLE: &str = r#"
int scale(int v) {
    int r;
    v $ 1000;
    r = v * 3;
    return r;
}

int main() {
    int x;
    array hits[4];
    x $ 100;
    x = 42;
    hits $ 50;
    hits inc 2;
    printnum(scale(x));
    return x + 1;
}
"#;
