use jsref::*;

#[derive(clap::Parser)]
#[command(name = "js", version, about = "Evaluator for the JavaScript syntax reference")]
struct Cli {
    /// Evaluate the given code and print the result
    #[arg(short, long)]
    eval: Option<String>,

    /// JavaScript file to evaluate
    file: Option<std::path::PathBuf>,
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn main() -> Result<(), BoxError> {
    // Initialize logger (controlled by RUST_LOG)
    env_logger::init();

    let cli = <Cli as clap::Parser>::parse();

    let script_content = if let Some(script) = cli.eval {
        script
    } else if let Some(ref file) = cli.file {
        match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file {}: {e}", file.display());
                std::process::exit(1);
            }
        }
    } else {
        run_persistent_repl()?;
        return Ok(());
    };

    match evaluate(&script_content, None) {
        Ok(result) => println!("{result}"),
        Err(err) => {
            eprintln!("{err}");
            log::debug!("raised at {}", err.raised_at());
            if let Some(file_path) = cli.file.as_ref() {
                if let (Some(line), Some(col)) = (err.js_line(), err.js_column()) {
                    eprintln!("  in file: {}:{line}:{col}", file_path.display());
                } else {
                    eprintln!("  in file: {}", file_path.display());
                }
            }
            std::process::exit(1);
        }
    }
    Ok(())
}

#[allow(clippy::println_empty_string)]
fn run_persistent_repl() -> Result<(), BoxError> {
    use rustyline::Editor;
    use rustyline::error::ReadlineError;
    use std::path::PathBuf;

    let ver = clap::crate_version!();
    println!("jsref REPL v{ver}. Type 'exit' or Ctrl-D to quit.");

    let mut rl = match Editor::<(), rustyline::history::FileHistory>::new() {
        Ok(e) => e,
        Err(err) => {
            eprintln!("Failed to initialize line editor: {err}");
            std::process::exit(1);
        }
    };

    let history_path: Option<PathBuf> = std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".jsref_history"));
    if let Some(ref p) = history_path
        && let Err(e) = rl.load_history(p)
    {
        log::debug!("no history loaded from {}: {e}", p.display());
    }

    let repl = Repl::new();
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "js> " } else { ".... " };

        match rl.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if buffer.is_empty() && (trimmed == "exit" || trimmed == ".exit") {
                    break;
                }

                if !buffer.is_empty() {
                    buffer.push('\n');
                }
                buffer.push_str(&line);

                if !Repl::is_complete_input(&buffer) {
                    continue;
                }
                if buffer.trim().is_empty() {
                    buffer.clear();
                    continue;
                }

                rl.add_history_entry(buffer.as_str())?;

                match repl.eval(&buffer) {
                    Ok(val) => println!("{val}"),
                    Err(e) => {
                        eprintln!("{e}");
                        if buffer.lines().count() == 1 {
                            eprintln!("  at: {}", buffer.trim());
                        } else {
                            eprintln!("  in:");
                            for line in buffer.lines() {
                                eprintln!("    {line}");
                            }
                        }
                    }
                }
                buffer.clear();
            }
            Err(ReadlineError::Interrupted) => {
                println!("");
                buffer.clear();
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye");
                break;
            }
            Err(err) => {
                eprintln!("Readline error: {err}");
                break;
            }
        }
    }

    if let Some(ref p) = history_path {
        rl.save_history(p)?;
    }
    Ok(())
}
