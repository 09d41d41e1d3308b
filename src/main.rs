//! Photoblend - AI group-photo compositing CLI.

mod adapters;
mod cassette;
mod cli;
mod config;
mod context;
mod crop;
mod error;
mod inline;
mod output;
mod ports;
mod prompt;
mod session;
mod upload;

use std::path::Path;
use std::process;

use base64::Engine;
use clap::Parser;

use crate::cli::{BlendArgs, Cli, Command, HistoryAction};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::BlendError;
use crate::inline::UploadedImage;
use crate::output::{history_filename, resolve_output_path, save_image};
use crate::ports::image_blender::{BlendRequest, ImagePayload};
use crate::prompt::{validate_aspect_ratio, validate_resolution};
use crate::session::{FileBackend, HistoryRecord, SessionStore};
use crate::upload::{transition, SlotEvent, SlotNotice, SlotState};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), BlendError> {
    // Load config
    let config_path = config::discover_config_path(cli.config.as_deref());
    let config = Config::load(&config_path).map_err(BlendError::Config)?;

    let mut store = SessionStore::new(Box::new(FileBackend::new(config::discover_state_dir(
        &config,
    ))));

    match cli.command {
        Command::Blend(args) => blend(args, &config, &mut store, cli.verbose).await,
        Command::Register { username, password } => {
            let account = store.register(&username, &password)?;
            eprintln!("Registered: {}", account.username);
            Ok(())
        }
        Command::Login { username, password } => {
            let account = store.login(&username, &password)?;
            eprintln!("Logged in as: {}", account.username);
            Ok(())
        }
        Command::Logout => {
            store.logout();
            eprintln!("Logged out.");
            Ok(())
        }
        Command::History { action } => history(action, &mut store),
    }
}

async fn blend(
    args: BlendArgs,
    config: &Config,
    store: &mut SessionStore,
    verbose: bool,
) -> Result<(), BlendError> {
    // Resolve options: CLI flag, then config default
    let resolution =
        args.resolution.clone().unwrap_or_else(|| config.defaults.resolution.clone());
    let aspect_ratio =
        args.aspect_ratio.clone().unwrap_or_else(|| config.defaults.aspect_ratio.clone());
    let model = args.model.clone().unwrap_or_else(|| config.defaults.model.clone());

    validate_resolution(&resolution).map_err(BlendError::InvalidArgument)?;
    validate_aspect_ratio(&aspect_ratio).map_err(BlendError::InvalidArgument)?;

    if verbose {
        eprintln!("Model: {model}");
        eprintln!("Options: resolution={resolution} aspect_ratio={aspect_ratio}");
    }

    // Stage both upload slots
    let group = load_slot(&args.group, args.group_crop.as_deref(), args.group_display.as_deref(), verbose)?;
    let person =
        load_slot(&args.person, args.person_crop.as_deref(), args.person_display.as_deref(), verbose)?;

    // Inline representations are captured before the images move into the
    // request, so a successful generation can be recorded to history.
    let group_inline = group.inline_representation()?;
    let person_inline = person.inline_representation()?;

    let request = BlendRequest {
        model,
        group: ImagePayload { data: group.data, mime_type: group.mime_type },
        person: ImagePayload { data: person.data, mime_type: person.mime_type },
        resolution: resolution.clone(),
        aspect_ratio: aspect_ratio.clone(),
    };

    // Create context based on mode (live / recording / replaying)
    let replay_path = std::env::var("PHOTOBLEND_REPLAY").ok();
    let is_recording = std::env::var("PHOTOBLEND_REC").is_ok_and(|v| v == "true" || v == "1");

    let (ctx, recording_session) = if let Some(ref cassette_path) = replay_path {
        if verbose {
            eprintln!("Replaying from: {cassette_path}");
        }
        (ServiceContext::replaying(Path::new(cassette_path))?, None)
    } else if is_recording {
        if verbose {
            eprintln!("Recording mode enabled");
        }
        let (ctx, session) = ServiceContext::recording(config)?;
        (ctx, Some(session))
    } else {
        (ServiceContext::live(config)?, None)
    };

    // The single long-latency call; no retry, the user resubmits explicitly.
    let response = ctx.blender.blend(&request).await?;

    let output_path = resolve_output_path(args.output.as_deref());
    save_image(&response.image.data, &response.image.mime_type, &output_path)?;
    eprintln!("Saved: {}", output_path.display());

    // History is best-effort: failures warn, never fail the blend.
    if let Some(user) = store.current_user() {
        let record = HistoryRecord::new(
            group_inline,
            person_inline,
            resolution,
            aspect_ratio,
            base64::engine::general_purpose::STANDARD.encode(&response.image.data),
            response.image.mime_type.clone(),
        );
        let id = record.id.clone();
        match store.push_history(&user.username, record) {
            Ok(()) => {
                if verbose {
                    eprintln!("History record: {id}");
                }
            }
            Err(e) => eprintln!("Warning: failed to save history: {e}"),
        }
    }

    if let Some(session) = recording_session {
        match session.finish() {
            Ok(path) => eprintln!("Cassette saved: {}", path.display()),
            Err(e) => eprintln!("Warning: failed to save cassette: {e}"),
        }
    }

    Ok(())
}

/// Drive one upload slot from file selection through crop confirmation.
fn load_slot(
    path: &str,
    crop_spec: Option<&str>,
    display_spec: Option<&str>,
    verbose: bool,
) -> Result<UploadedImage, BlendError> {
    let data = std::fs::read(path)?;
    let file_name = Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned());

    let t = transition(SlotState::Empty, SlotEvent::FileChosen { file_name, data });
    if let Some(SlotNotice::UnsupportedFileType(message)) = t.notice {
        return Err(BlendError::UnsupportedFileType(message));
    }
    let SlotState::Cropping(staged) = t.next else {
        return Err(BlendError::InvalidArgument(format!("could not stage {path}")));
    };

    let confirmed = match crop_spec {
        Some(spec) => {
            let (natural_w, natural_h) = crop::dimensions(&staged)?;
            let (display_w, display_h) = match display_spec {
                Some(d) => crop::parse_display_spec(d)?,
                None => (f64::from(natural_w), f64::from(natural_h)),
            };
            let region = if spec == "default" {
                crop::default_region(display_w, display_h)
            } else {
                crop::parse_crop_spec(spec)?
            };
            if verbose {
                eprintln!(
                    "Cropping {path}: region {region:?} against display {display_w}x{display_h}"
                );
            }
            crop::crop_to_region(&staged, &region, display_w, display_h)?
        }
        None => staged.clone(),
    };

    let t = transition(SlotState::Cropping(staged), SlotEvent::CropConfirmed(confirmed));
    match t.next {
        SlotState::Filled(image) => Ok(image),
        _ => Err(BlendError::InvalidArgument(format!("could not confirm crop for {path}"))),
    }
}

fn history(action: Option<HistoryAction>, store: &mut SessionStore) -> Result<(), BlendError> {
    let user = store.current_user().ok_or(BlendError::NotLoggedIn)?;

    match action.unwrap_or(HistoryAction::List) {
        HistoryAction::List => {
            let records = store.history(&user.username);
            if records.is_empty() {
                eprintln!("No history yet. Your previous generations will appear here.");
                return Ok(());
            }
            for record in &records {
                println!("{}  {}  {}", record.id, record.resolution, record.aspect_ratio);
            }
            eprintln!("{} record(s).", records.len());
            Ok(())
        }
        HistoryAction::Export { id, output } => {
            let records = store.history(&user.username);
            let record = records
                .iter()
                .find(|r| r.id == id)
                .ok_or_else(|| BlendError::InvalidArgument(format!("no history record '{id}'")))?;

            let data = base64::engine::general_purpose::STANDARD
                .decode(&record.generated_image)
                .map_err(|e| BlendError::MalformedInlineData(e.to_string()))?;

            let path = output.map_or_else(
                || std::path::PathBuf::from(history_filename(record)),
                std::path::PathBuf::from,
            );
            save_image(&data, &record.generated_mime, &path)?;
            eprintln!("Saved: {}", path.display());
            Ok(())
        }
        HistoryAction::Clear { yes } => {
            let count = store.history(&user.username).len();
            if count == 0 {
                eprintln!("History is already empty.");
                return Ok(());
            }
            if !yes {
                eprintln!(
                    "This will remove {count} saved generation(s). Re-run with --yes to confirm."
                );
                return Ok(());
            }
            store.clear_history(&user.username)?;
            eprintln!("History cleared.");
            Ok(())
        }
    }
}
