use std::env;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use tracing::{error, info};
use treeline::commands::OptionEntry;
use treeline::logging::init_logging;
use treeline::{load_config, Branch, CommandTree, ExitReason, TermError, Terminal};

fn build_tree() -> Result<CommandTree, TermError> {
    let mut tree = CommandTree::new();

    tree.add_keyword("print", Some("print text"))?
        .add_text("content", Some("text to print"))?
        .set_exec(|term, argv| {
            let _ = term.print(&format!("{}\n", argv[1]));
        });

    tree.add_keyword("sleep", Some("block for a few seconds"))?
        .add_text("seconds", None)?
        .set_exec(|term, argv| match argv[1].parse::<u64>() {
            Ok(seconds) => thread::sleep(Duration::from_secs(seconds)),
            Err(_) => {
                let _ = term.print(&format!("invalid number \"{}\"\n", argv[1]));
            }
        });

    tree.add_keyword("set", Some("set action"))?
        .add_keyword("prompt", Some("set prompt"))?
        .add_text("content", Some("prompt content"))?
        .set_exec(|term, argv| match term.password("password:") {
            Ok(Some(password)) if password == "123" => term.set_prompt(Some(&argv[2])),
            Ok(Some(password)) => {
                let _ = term.print(&format!(
                    "invalid password \"{password}\", mismatch with \"123\"\n"
                ));
            }
            Ok(None) => {
                let _ = term.print("Cancel\n");
            }
            Err(err) => error!(error = %err, "password prompt failed"),
        });

    tree.add_keyword("ask", Some("read a line"))?
        .set_exec(|term, _| match term.getline("name?") {
            Ok(Some(name)) => {
                let _ = term.print(&format!("hello {name}\n"));
            }
            Ok(None) => {
                let _ = term.print("Cancel\n");
            }
            Err(err) => error!(error = %err, "getline failed"),
        });

    tree.add_keyword("printasync", Some("print from a background thread"))?
        .set_exec(|term, _| {
            let printer = term.printer();
            thread::spawn(move || {
                for tick in 1..=3 {
                    thread::sleep(Duration::from_secs(1));
                    let _ = printer.print(&format!("async tick {tick}"));
                }
            });
        });

    let show = tree.add_keyword("show", Some("show information"))?;
    let camera = show
        .add_select("camera")?
        .add_option("c4-2f-90-f8-67-d3", Some("GigE camera"))?
        .add_option("/dev/video0", Some("USB camera"))?;
    camera.set_exec(|term, argv| {
        let _ = term.print(&format!("showing camera {}\n", argv[1]));
    });

    let color = tree.add_keyword("color", Some("mix colours"))?;
    let mix = color.add_multi_select("colors", true)?;
    mix.set_option_provider(|| {
        ["red", "green", "blue"]
            .into_iter()
            .map(|word| OptionEntry::new(word, None))
            .collect()
    })?;
    mix.set_exec(|term, argv| {
        let picked = if argv[1].is_empty() { "nothing" } else { argv[1].as_str() };
        let _ = term.print(&format!("mixing {picked}\n"));
    });

    tree.add_keyword("exit", Some("leave"))?
        .set_exec(|term, _| term.exit());
    tree.add_keyword("quit", Some("leave"))?
        .set_exec(|term, _| term.exit());

    Ok(tree)
}

fn run() -> Result<ExitReason, TermError> {
    let root = env::current_dir()?;
    let config = load_config(&root);
    let mut term = Terminal::builder("test$", build_tree()?)
        .config(&config)
        .build()?;
    term.run()
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(reason) => {
            info!(?reason, "editor finished");
            ExitCode::SUCCESS
        }
        Err(TermError::UnsupportedTerminal(_)) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("treeline: {err}");
            ExitCode::FAILURE
        }
    }
}
