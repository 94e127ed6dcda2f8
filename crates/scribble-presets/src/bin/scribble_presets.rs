//! Inspect and edit presets from the command line, or serve a preset file
//! over HTTP.

use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use scribble_presets::{
    FilePresetStorage, HttpTransport, LocalTransport, PresetClient, PresetHttpServer,
    PresetRegistry, PresetService, PresetTransport, ServiceConfig,
};
use scribble_style::Theme;

enum Command {
    List,
    Export,
    Save { name: String, text_file: PathBuf },
    Delete { name: String },
    Serve { addr: String },
}

struct Config {
    file: Option<PathBuf>,
    url: Option<String>,
    command: Command,
}

const DEFAULT_ADDR: &str = "127.0.0.1:8188";

fn print_usage() {
    eprintln!(
        "Usage: scribble-presets [--file <presets.json> | --url <base-url>] <command>\n\
         \n\
         Commands:\n\
           list                      print preset names and update times\n\
           export                    print the full list as JSON\n\
           save <name> <text-file>   upsert a preset with the default theme\n\
           delete <name>             remove a preset\n\
           serve [<addr>]            serve the preset file over HTTP\n\
                                     (default {DEFAULT_ADDR})\n\
         \n\
         --url talks to a running server instead of the file. Without\n\
         --file the location comes from SCRIBBLE_PRESETS_DIR,\n\
         XDG_DATA_HOME, or HOME."
    );
}

fn parse_args() -> Result<Config, String> {
    let mut args = env::args().skip(1);
    let mut file: Option<PathBuf> = None;
    let mut url: Option<String> = None;
    let mut positional: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--file" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--file requires a value".to_string())?;
                file = Some(PathBuf::from(value));
            }
            "--url" => {
                url = Some(
                    args.next()
                        .ok_or_else(|| "--url requires a value".to_string())?,
                );
            }
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("list") => Command::List,
        Some("export") => Command::Export,
        Some("save") => {
            let name = positional
                .next()
                .ok_or_else(|| "save requires a name".to_string())?;
            let text_file = positional
                .next()
                .map(PathBuf::from)
                .ok_or_else(|| "save requires a text file".to_string())?;
            Command::Save { name, text_file }
        }
        Some("delete") => {
            let name = positional
                .next()
                .ok_or_else(|| "delete requires a name".to_string())?;
            Command::Delete { name }
        }
        Some("serve") => Command::Serve {
            addr: positional.next().unwrap_or_else(|| DEFAULT_ADDR.to_string()),
        },
        Some(other) => return Err(format!("unknown command {other:?}")),
        None => return Err("missing command".to_string()),
    };
    if let Some(extra) = positional.next() {
        return Err(format!("unexpected argument {extra:?}"));
    }
    if url.is_some() && file.is_some() {
        return Err("--file and --url are exclusive".to_string());
    }
    if url.is_some() && matches!(command, Command::Serve { .. }) {
        return Err("serve works on a file, not --url".to_string());
    }
    Ok(Config { file, url, command })
}

fn file_service(file: Option<PathBuf>) -> Arc<PresetService> {
    let storage = match file {
        Some(path) => FilePresetStorage::new(path),
        None => FilePresetStorage::default_location(),
    };
    tracing::debug!(path = %storage.path().display(), "using preset file");
    Arc::new(PresetService::new(
        PresetRegistry::new(Box::new(storage)),
        &ServiceConfig::default(),
    ))
}

fn run(config: Config) -> Result<(), Box<dyn Error>> {
    if let Command::Serve { addr } = &config.command {
        let server = PresetHttpServer::bind(addr.as_str(), file_service(config.file))?;
        eprintln!("serving presets on {}", server.base_url());
        server.run();
        return Ok(());
    }

    let transport: Arc<dyn PresetTransport> = match config.url {
        Some(url) => Arc::new(HttpTransport::new(url)?),
        None => Arc::new(LocalTransport::new(file_service(config.file))),
    };
    let mut client = PresetClient::new(transport);

    match config.command {
        Command::List => {
            for preset in client.list()? {
                println!(
                    "{}\t{}",
                    preset.name,
                    preset.updated_at.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Export => println!("{}", client.export_json()?),
        Command::Save { name, text_file } => {
            let text = fs::read_to_string(&text_file)?;
            if !client.save(&name, &text, &Theme::DEFAULT)? {
                return Err("preset name is empty".into());
            }
            println!("saved {name:?} ({} presets)", client.presets().len());
        }
        Command::Delete { name } => {
            client.delete(&name)?;
            println!("deleted {name:?} ({} presets)", client.presets().len());
        }
        Command::Serve { .. } => {}
    }
    Ok(())
}

fn main() {
    if let Err(err) = scribble_core::logging::init() {
        eprintln!("warning: logging disabled: {err}");
    }
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            print_usage();
            std::process::exit(2);
        }
    };
    if let Err(err) = run(config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
