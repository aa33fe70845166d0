use std::fmt::Display;
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use promptline_cli::arguments::build_args;
use promptline_cli::cli_args::{Args, Command};
use promptline_cli::console::{Console, StdioConsole};
use promptline_cli::menu::Menu;
use promptline_cli::question::Question;
use promptline_core::answers::{Answer, Choice, Int, Text};
use promptline_core::error::{Error, Result};
use promptline_core::strformat::compile;
use promptline_core::{config, file_handling};

/// Builds the stdio console the global flags describe.
fn build_console(args: &Args) -> Result<StdioConsole> {
    let color_scheme_path = config::get_color_scheme_path(&args.color_scheme);
    debug!("Color scheme path: `{}`", color_scheme_path);

    // A scheme named on the command line has to exist; the default one is optional
    let scheme = if args.color_scheme.is_some() {
        file_handling::get_color_scheme(&color_scheme_path)?
    } else {
        file_handling::get_optional_color_scheme(&color_scheme_path)?
    };

    let mut console = Console::stdio()
        .color_scheme(scheme)
        .colors(!args.no_colors);
    if let Some(wrap_at) = args.wrap_at {
        console = console.wrap_at(wrap_at);
    }
    Ok(console)
}

fn ask_and_print<A>(
    console: &mut StdioConsole,
    question: Question<A>,
    default: Option<String>,
) -> Result<()>
where
    A: Answer,
    A::Output: Display,
{
    let mut question = match default {
        Some(default) => question.default(default),
        None => question,
    };
    let answer = console.ask(&mut question)?;
    println!("{answer}");
    Ok(())
}

fn print_compiled(template: &str) -> Result<()> {
    let template = compile(template)?;
    let yaml = serde_yaml::to_string(&template)
        .map_err(|e| Error::Misc(format!("Could not serialize template: {e}")))?;
    print!("{yaml}");
    Ok(())
}

fn execute() -> Result<()> {
    let args = Args::parse();

    if let Command::Compile { template } = &args.command {
        return print_compiled(template);
    }

    let mut console = build_console(&args)?;

    match args.command {
        Command::Say {
            template,
            parameters,
            arguments,
        } => {
            let template_args = build_args(&arguments, &parameters)?;
            console.say(&template, &template_args)
        }
        Command::Ask {
            prompt,
            default,
            choices,
            integer,
        } => {
            if integer {
                ask_and_print(&mut console, Question::new(prompt, Int::new()), default)
            } else if choices.is_empty() {
                ask_and_print(&mut console, Question::new(prompt, Text::new()), default)
            } else {
                let question = Question::new(prompt, Choice::new(choices));
                ask_and_print(&mut console, question, default)
            }
        }
        Command::Agree { prompt, character } => {
            let agreed = console.agree_with(&prompt, character, None)?;
            if character {
                println!();
            }
            if agreed {
                Ok(())
            } else {
                Err(Error::Misc("Answered no".to_string()))
            }
        }
        Command::Choose { items, header } => {
            let mut menu: Menu = Menu::new().choices(items);
            if let Some(header) = header {
                menu = menu.header(header);
            }
            let chosen = console.choose(&menu)?;
            println!("{chosen}");
            Ok(())
        }
        Command::Compile { template } => print_compiled(&template),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
