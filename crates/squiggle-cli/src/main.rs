use clap::Parser;
use squiggle_ast::pretty::print_program;
use squiggle_expr::print_expression;
use squiggle_runtime::context::MAX_GENERATED_LENGTH;
use squiggle_runtime::{compile, result_to_string, run, Environment, ModelEvaluator, SquiggleError};
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "squiggle", version, about = "Evaluate Squiggle programs")]
struct Opt {
    /// Program text
    #[arg(short = 'e', long = "eval", conflicts_with = "file")]
    eval: Option<String>,

    /// Program file
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Environment as JSON ({"sampleCount": .., "xyPointLength": .., "seed": ..})
    #[arg(long = "environment", value_name = "JSON_FILE")]
    environment: Option<PathBuf>,

    #[arg(long = "sample-count")]
    sample_count: Option<usize>,

    #[arg(long = "seed")]
    seed: Option<u64>,

    /// Print the AST as an S-expression
    #[arg(long = "dump-ast", default_value_t = false)]
    dump_ast: bool,

    /// Print the lowered expression
    #[arg(long = "dump-expr", default_value_t = false)]
    dump_expr: bool,

    /// Print the lowered expression as JSON
    #[arg(long = "dump-expr-json", default_value_t = false)]
    dump_expr_json: bool,

    /// Also print top-level bindings
    #[arg(long = "bindings", default_value_t = false)]
    bindings: bool,

    /// Build a comparison cache from the model's `fn` over these ids
    #[arg(long = "compare-ids", value_delimiter = ',')]
    compare_ids: Option<Vec<String>>,

    #[arg(short = 'v', long = "verbose", default_value_t = false)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::from_default_env() };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_environment(opt: &Opt) -> Result<Environment, Box<dyn std::error::Error>> {
    let mut env = match &opt.environment {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => Environment::default(),
    };
    if let Some(n) = opt.sample_count {
        env.sample_count = n;
    }
    if opt.seed.is_some() {
        env.seed = opt.seed;
    }
    if env.sample_count > MAX_GENERATED_LENGTH {
        return Err(format!("sample count must be at most {}", MAX_GENERATED_LENGTH).into());
    }
    Ok(env)
}

fn report(e: SquiggleError) -> ExitCode {
    eprintln!("{}", result_to_string(&Err(e)));
    ExitCode::FAILURE
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let opt = Opt::parse();
    init_tracing(opt.verbose);

    let code = match (&opt.eval, &opt.file) {
        (Some(code), _) => code.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("either -e <CODE> or <FILE> is required".into()),
    };
    let env = load_environment(&opt)?;
    debug!(?env, "environment loaded");

    if opt.dump_ast {
        return Ok(match squiggle_parser::parse_program(&code) {
            Ok(program) => {
                println!("{}", print_program(&program));
                ExitCode::SUCCESS
            }
            Err(e) => report(e.into()),
        });
    }
    if opt.dump_expr || opt.dump_expr_json {
        let expression = match compile(&code) {
            Ok(e) => e,
            Err(e) => return Ok(report(e)),
        };
        if opt.dump_expr_json {
            println!("{}", serde_json::to_string_pretty(&expression)?);
        } else {
            println!("{}", print_expression(&expression));
        }
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(ids) = &opt.compare_ids {
        let model = match ModelEvaluator::create(&code, env) {
            Ok(m) => m,
            Err(e) => return Ok(report(e)),
        };
        let rows = model.build_comparison_cache(ids, &HashSet::new());
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(ExitCode::SUCCESS);
    }

    match run(&code, env) {
        Ok(out) => {
            if opt.bindings {
                for (name, value) in &out.bindings {
                    println!("{} = {}", name, value);
                }
            }
            println!("{}", out.result);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report(e)),
    }
}
