//! VP prompt tool: load a saved annotation session and print its prompt.
//!
//! ```text
//! vp-prompt <session.json> [--numbers] [--resave] [--request]
//! ```
//!
//! - `--numbers`  suffix object descriptions with `(annotation N)`
//! - `--resave`   write the session back in the current document format
//! - `--request`  print the AI-enhancement request JSON instead of the prompt

mod file_slot;

use file_slot::FileSlot;
use vp_editor::{EditorConfig, EditorSession, EnhanceSettings};

struct Args {
    path: String,
    numbers: bool,
    resave: bool,
    request: bool,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut path = None;
    let mut numbers = false;
    let mut resave = false;
    let mut request = false;
    for arg in args {
        match arg.as_str() {
            "--numbers" => numbers = true,
            "--resave" => resave = true,
            "--request" => request = true,
            flag if flag.starts_with("--") => return Err(format!("unknown flag '{flag}'")),
            other if path.is_none() => path = Some(other.to_string()),
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }
    let path = path.ok_or_else(|| "missing session path".to_string())?;
    Ok(Args {
        path,
        numbers,
        resave,
        request,
    })
}

fn run(args: Args) -> Result<(), String> {
    let mut slot = FileSlot::new(&args.path);
    let mut session = EditorSession::load(&slot, EditorConfig::default())
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("{} does not exist", args.path))?;

    if args.numbers {
        session.set_include_numbers(true);
    }

    if args.request {
        let request = session
            .enhance_request(&EnhanceSettings::default())
            .map_err(|e| e.to_string())?;
        let json = serde_json::to_string_pretty(&request).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        println!("{}", session.generate().map_err(|e| e.to_string())?);
    }

    if args.resave {
        session.save(&mut slot).map_err(|e| e.to_string())?;
        log::info!("rewrote {}", args.path);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("vp-prompt error: {e}");
            eprintln!("  usage: vp-prompt <session.json> [--numbers] [--resave] [--request]");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("vp-prompt error: {e}");
        std::process::exit(1);
    }
}
