use clap::{
    crate_authors, crate_description, crate_name, crate_version, Arg, ArgAction, ArgMatches,
    Command,
};
use colored::Colorize;
use fencepack::{
    api::{self, FencepackError, Report},
    config::Config,
    deliver::{archive_name, DirectorySink, WriterSink},
    errors::{FileOperation, IoError},
    extract, preview, prompt, request, PackOptions,
};
use std::{
    io::Read,
    path::{Path, PathBuf},
};

// The CLI layer should only parse inputs and forward them to library code.
fn main() -> miette::Result<()> {
    let matches = Command::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .subcommand(
            Command::new("pack")
                .about("Packages the files found in a response into <name>.zip")
                .arg(input_arg())
                .arg(
                    Arg::new("name")
                        .short('n')
                        .long("name")
                        .help("Project name, the archive is saved as <name>.zip"),
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .help("Directory to save the archive into, or '-' for stdout"),
                )
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Save without asking for confirmation")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the result as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("strict-paths")
                        .long("strict-paths")
                        .help("Reject absolute entry paths and paths containing '..'")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("Path to a fencepack.toml config file"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("Lists the files found in a response without packaging them")
                .arg(input_arg()),
        )
        .subcommand(
            Command::new("prompt")
                .about("Prints a request asking a model for a complete web project")
                .arg(
                    Arg::new("topic")
                        .help("What the web project is about")
                        .required(true),
                ),
        )
        .get_matches();

    let is_verbose = matches.get_flag("verbose");

    let default_filter = if is_verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match matches.subcommand() {
        Some(("pack", args)) => handle_pack(args),
        Some(("list", args)) => handle_list(args),
        Some(("prompt", args)) => {
            let topic = args.get_one::<String>("topic").expect("topic required");
            println!("{}", request::web_project_request(topic));
            Ok(())
        }
        _ => unreachable!(),
    }
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("File holding the AI response, or '-' to read stdin")
        .required(true)
}

fn read_input(args: &ArgMatches) -> Result<String, IoError> {
    let input = args.get_one::<String>("input").expect("input required");

    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|error| IoError::new(FileOperation::Read, PathBuf::from("<stdin>"), error))?;

        Ok(text)
    } else {
        std::fs::read_to_string(input)
            .map_err(|error| IoError::new(FileOperation::Read, PathBuf::from(input), error))
    }
}

fn handle_pack(args: &ArgMatches) -> miette::Result<()> {
    let config = Config::discover_in_cwd(args.get_one::<String>("config").map(Path::new))?;

    let text = read_input(args)?;

    let project_name = args
        .get_one::<String>("name")
        .cloned()
        .or(config.project_name.clone());

    let options = PackOptions {
        strict_paths: args.get_flag("strict-paths") || config.strict_paths,
    };

    let out = args
        .get_one::<String>("out")
        .map(PathBuf::from)
        .or(config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let as_json = args.get_flag("json");
    let to_stdout = out.as_os_str() == "-";
    let interactive = !(args.get_flag("yes") || as_json || to_stdout);

    if interactive {
        let files = extract(&text);
        let name = archive_name(project_name.as_deref());

        if !files.is_empty() {
            preview::preview_as_tree(&files, &name);

            if !prompt::confirm_delivery(&name)? {
                println!("{}", "canceled".yellow());
                return Ok(());
            }
        }
    }

    let result = if to_stdout {
        let mut sink = WriterSink::new(std::io::stdout().lock());
        api::try_process(&text, project_name.as_deref(), &options, &mut sink)
    } else {
        let mut sink = DirectorySink::new(&out);
        api::try_process(&text, project_name.as_deref(), &options, &mut sink)
    };

    if as_json {
        return print_report(result, to_stdout);
    }

    let outcome = result?;

    if !to_stdout {
        println!(
            "{} {}",
            "create".green(),
            out.join(&outcome.archive_name).display()
        );
        for file in &outcome.files {
            println!("  {} {}", "+".green(), file);
        }
    }

    Ok(())
}

/// Prints the JSON report; it goes to stderr when stdout carries the archive.
fn print_report(
    result: Result<api::Outcome, FencepackError>,
    archive_on_stdout: bool,
) -> miette::Result<()> {
    let report = Report::from(result);

    let json = serde_json::to_string_pretty(&report)
        .map_err(|error| miette::miette!("unable to serialize report: {}", error))?;

    if archive_on_stdout {
        eprintln!("{}", json);
    } else {
        println!("{}", json);
    }

    if report.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

fn handle_list(args: &ArgMatches) -> miette::Result<()> {
    let text = read_input(args)?;

    let files = extract(&text);

    if files.is_empty() {
        return Err(FencepackError::NoFilesFound.into());
    }

    preview::preview_as_tree(&files, &archive_name(None));

    for file in &files {
        let encoding = match file.encoding {
            fencepack::Encoding::Text => "text  ".green(),
            fencepack::Encoding::Base64 => "base64".magenta(),
        };
        println!("{} {} ({} chars)", encoding, file.path, file.content.chars().count());
    }

    Ok(())
}
