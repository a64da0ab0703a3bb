// word-arith - chain word-vector arithmetic from the command line
//
// This is the main entry point. Parses CLI args, loads the model and
// dispatches to handlers.

use anyhow::{bail, Context};
use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use word_arith_lib::{
    core::Searcher, model::loader, repl::Repl, Config, Session, Vocabulary,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();

    // --model can go anywhere, everything else is positional
    let mut model_override: Option<PathBuf> = None;
    let mut rest = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--model" => {
                i += 1;
                match args.get(i) {
                    Some(dir) => model_override = Some(PathBuf::from(dir)),
                    None => bail!("--model needs a directory"),
                }
            }
            arg => rest.push(arg.to_string()),
        }
        i += 1;
    }

    let command = rest.first().map(String::as_str).unwrap_or("repl");
    let params = rest.get(1..).unwrap_or(&[]);

    match command {
        "version" | "-v" | "--version" => {
            println!("word-arith v{}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        "help" | "-h" | "--help" => {
            print_usage();
            return Ok(());
        }
        _ => {}
    }

    let mut config = Config::load().context("could not load configuration")?;
    if let Some(dir) = model_override {
        config.model_dir = dir;
    }

    match command {
        "repl" => handle_repl(&config).await,
        "run" => handle_run(&config, params).await,
        "similar" => handle_neighbor(&config, params, false).await,
        "different" => handle_neighbor(&config, params, true).await,
        "phrase" => handle_phrase(&config, params).await,
        "cosine" => handle_cosine(&config, params).await,
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            Ok(())
        }
    }
}

fn init_logging() {
    // Stay quiet unless asked; the interpreter already reports to the user
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn load_vocabulary(config: &Config) -> anyhow::Result<Arc<Vocabulary>> {
    eprintln!("Loading...");
    let vocab = loader::load_dir(&config.model_dir, config.dimension)
        .await
        .with_context(|| format!("could not load model from {}", config.model_dir.display()))?;
    Ok(Arc::new(vocab))
}

async fn handle_repl(config: &Config) -> anyhow::Result<()> {
    let vocab = load_vocabulary(config).await?;
    println!(
        "{} words loaded. Chain commands with '{}', 'exit' to quit.",
        vocab.len(),
        config.delimiter
    );

    let session = Session::with_delimiter(vocab, &config.delimiter);
    let mut repl = Repl::new(session, &config.prompt);

    let stdin = io::stdin();
    repl.run(stdin.lock(), io::stdout())?;
    Ok(())
}

async fn handle_run(config: &Config, args: &[String]) -> anyhow::Result<()> {
    if args.is_empty() {
        eprintln!("Error: No command line provided");
        return Ok(());
    }

    let vocab = load_vocabulary(config).await?;
    let session = Session::with_delimiter(vocab, &config.delimiter);
    let mut repl = Repl::new(session, &config.prompt);

    repl.execute_line(&args.join(" "), &mut io::stdout())?;
    Ok(())
}

async fn handle_neighbor(config: &Config, args: &[String], farthest: bool) -> anyhow::Result<()> {
    let Some(word) = args.first() else {
        eprintln!("Error: No word provided");
        return Ok(());
    };

    let searcher = Searcher::new(load_vocabulary(config).await?);
    let found = if farthest {
        searcher.most_different_word(word)
    } else {
        searcher.most_similar_word(word)
    };

    match found {
        Some(neighbor) => println!("{} (score {:.4})", neighbor.word, neighbor.score),
        None => println!("No match for '{}'", word),
    }
    Ok(())
}

async fn handle_phrase(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let vocab = load_vocabulary(config).await?;
    println!("{}", vocab.lookup_phrase(args));
    Ok(())
}

async fn handle_cosine(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let [first, second] = args else {
        eprintln!("Error: cosine needs exactly two words");
        return Ok(());
    };

    let searcher = Searcher::new(load_vocabulary(config).await?);
    match searcher.words_cosine_similarity(first, second) {
        Some(similarity) => println!("{:.4}", similarity),
        None => println!("undefined (unknown word)"),
    }
    Ok(())
}

fn print_usage() {
    println!(
        r#"word-arith v{} - Word vector arithmetic

USAGE:
    word-arith [--model <dir>] [COMMAND]

COMMANDS:
    repl                   Interactive session (default)
    run <line>             Execute one command line and exit
    similar <word>         Nearest word
    different <word>       Farthest word
    phrase <words...>      Average vector of a phrase
    cosine <w1> <w2>       Cosine similarity of two words
    version                Show version
    help                   Show this help

SESSION COMMANDS (chain with '>>'):
    get <name>             Load a variable or word into the result
    add|sub <name>         Add / subtract a variable or word
    mul|div <number>       Scale the result
    mean <w1,w2,...>       Average of several words
    neg | norm             Negate / normalize the result
    cos <name>             Cosine similarity with the result
    sim [w1,-w2,...]       Nearest word to the result, or an analogy
    saveto <name>          Store the result in a variable
    res | vars             Show the result / all variables
    reset                  Clear the result and all variables
    exit                   Quit

EXAMPLES:
    word-arith run "get king >> sub man >> add woman >> sim"
    word-arith run "sim king,-man,woman"
    word-arith similar day

CONFIGURATION:
    ~/.word-arith/config.json, WORD_ARITH_MODEL_DIR, WORD_ARITH_DIMENSION
"#,
        env!("CARGO_PKG_VERSION")
    );
}
