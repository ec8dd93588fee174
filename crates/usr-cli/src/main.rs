use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use usr_cli::{
    check_command, decode_command, encode_command, load_config, plan_upload, read_input,
    upload_command, vocab_command, CommandOutput, LogFormat,
};
use usr_codec::{BlockTag, DecodeMode};

fn cli() -> Command {
    Command::new("usr")
        .version(usr_cli::VERSION)
        .about("Decode, check and upload USR blocks")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML config file"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(value_parser!(LogFormat))
                .help("Log output: text or json"),
        )
        .subcommand(
            Command::new("decode")
                .about("Decode blocks to JSON")
                .arg(Arg::new("file").required(true).help("Input file, - for stdin"))
                .arg(
                    Arg::new("raw")
                        .long("raw")
                        .action(ArgAction::SetTrue)
                        .help("Keep block bodies verbatim"),
                ),
        )
        .subcommand(
            Command::new("encode")
                .about("Encode JSON records to blocks")
                .arg(Arg::new("file").required(true).help("JSON file, - for stdin"))
                .arg(
                    Arg::new("segment-id")
                        .long("segment-id")
                        .help("Block id; overrides ids in the input"),
                )
                .arg(
                    Arg::new("text")
                        .long("text")
                        .help("Sentence for the # line; overrides comments in the input"),
                )
                .arg(
                    Arg::new("sent-id")
                        .long("sent-id")
                        .action(ArgAction::SetTrue)
                        .help("Write <sent_id=...> blocks"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Validate every block")
                .arg(Arg::new("file").required(true).help("Input file, - for stdin")),
        )
        .subcommand(
            Command::new("vocab")
                .about("List vocabularies, or the values of one")
                .arg(Arg::new("table").help("Vocabulary name, e.g. dependency_relation")),
        )
        .subcommand(
            Command::new("upload")
                .about("Upload blocks or JSON lines to the service")
                .arg(Arg::new("file").required(true).help("Input file, - for stdin"))
                .arg(
                    Arg::new("segment")
                        .long("segment")
                        .help("Send every item to this segment"),
                )
                .arg(
                    Arg::new("chapter")
                        .long("chapter")
                        .help("Match block tags against this chapter's segments"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Show targets without uploading"),
                ),
        )
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn file_arg(args: &ArgMatches) -> anyhow::Result<String> {
    let path = args
        .get_one::<String>("file")
        .map_or("-", String::as_str);
    read_input(path)
}

async fn run(matches: &ArgMatches) -> anyhow::Result<CommandOutput> {
    let config = load_config(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("decode", args)) => {
            let mode = if args.get_flag("raw") {
                DecodeMode::Raw
            } else {
                DecodeMode::Full
            };
            decode_command(&file_arg(args)?, mode)
        }
        Some(("encode", args)) => {
            let tag = if args.get_flag("sent-id") {
                BlockTag::SentId
            } else {
                BlockTag::SegmentId
            };
            encode_command(
                &file_arg(args)?,
                args.get_one::<String>("segment-id").map(String::as_str),
                args.get_one::<String>("text").map(String::as_str),
                tag,
            )
        }
        Some(("check", args)) => Ok(check_command(&file_arg(args)?, &config)),
        Some(("vocab", args)) => vocab_command(args.get_one::<String>("table").map(String::as_str)),
        Some(("upload", args)) => {
            let input = file_arg(args)?;
            let segment = args.get_one::<String>("segment").map(String::as_str);
            if args.get_flag("dry-run") {
                Ok(plan_upload(&input, segment))
            } else {
                let chapter = args.get_one::<String>("chapter").map(String::as_str);
                upload_command(&input, segment, chapter, &config).await
            }
        }
        _ => Ok(CommandOutput::default()),
    }
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();
    init_tracing(
        matches
            .get_one::<LogFormat>("log-format")
            .copied()
            .unwrap_or_default(),
    );

    match run(&matches).await {
        Ok(output) => {
            if !output.stdout.is_empty() {
                println!("{}", output.stdout);
            }
            for line in &output.diagnostics {
                eprintln!("{line}");
            }
            std::process::exit(output.exit_code());
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}
