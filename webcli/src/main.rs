// SPDX-FileCopyrightText: Copyright (C) 2024-2026 tubelist contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))] // Forbid warnings in release builds
#![warn(clippy::all, rust_2018_idioms)]

use std::{env, process::ExitCode, sync::Arc};

use anyhow::Context as _;
use clap::{Arg, ArgMatches, Command};
use tokio::signal;

use tubelist_client::{
    models::{playlist, roster},
    prelude::{message_channel, message_loop, send_message, Environment, Message},
    webapi::{emit_change_intents, Config, WebApiGateway, API_KEY_ENV, SERVICE_URL_ENV},
};
use tubelist_core::{EntryId, PlaylistEntry, Submission};

const DEFAULT_LOG_FILTER: &str = "info";

const SERVICE_URL_ARG: &str = "service-url";

const API_KEY_ARG: &str = "api-key";

const PASSCODE_ARG: &str = "passcode";

const TITLE_ARG: &str = "title";

const URL_ARG: &str = "url";

const ENTRY_ID_ARG: &str = "entry-id";

const PASSCODE_ENV: &str = "TUBELIST_ADMIN_PASSCODE";

const INCORRECT_PASSCODE_MESSAGE: &str = "Incorrect passcode.";

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let matches = Command::new("tubelist")
        .about("A shared video playlist on top of a hosted data store")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg(
            Arg::new(SERVICE_URL_ARG)
                .long(SERVICE_URL_ARG)
                .num_args(1)
                .required(false)
                .help(format!("The endpoint URL of the hosted store, overrides {SERVICE_URL_ENV}")),
        )
        .arg(
            Arg::new(API_KEY_ARG)
                .long(API_KEY_ARG)
                .num_args(1)
                .required(false)
                .help(format!("The public API key of the hosted store, overrides {API_KEY_ENV}")),
        )
        .arg(
            Arg::new(PASSCODE_ARG)
                .long(PASSCODE_ARG)
                .num_args(1)
                .required(false)
                .help(format!("The shared admin passcode, compared against {PASSCODE_ENV}")),
        )
        .subcommand(
            Command::new("playlist")
                .about("Read-only playlist views")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("Prints the current playlist"))
                .subcommand(
                    Command::new("play")
                        .about("Resolves the embedded player URL of a playlist entry")
                        .arg(
                            Arg::new(ENTRY_ID_ARG)
                                .help("The id of the playlist entry")
                                .num_args(1)
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("watch")
                        .about("Reprints the playlist on every remote change until Ctrl-C"),
                ),
        )
        .subcommand(
            Command::new("admin")
                .about("Administrative playlist editing, gated by the shared passcode")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .about("Adds a new video to the playlist")
                        .arg(
                            Arg::new(TITLE_ARG)
                                .help("The display title of the video")
                                .num_args(1)
                                .required(true),
                        )
                        .arg(
                            Arg::new(URL_ARG)
                                .help("The video URL")
                                .num_args(1)
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Removes a video from the playlist")
                        .arg(
                            Arg::new(ENTRY_ID_ARG)
                                .help("The id of the playlist entry")
                                .num_args(1)
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("watch")
                        .about("Reprints the roster on every remote change until Ctrl-C"),
                ),
        )
        .get_matches();

    let config = load_config(&matches)?;
    let gateway = WebApiGateway::new(config)?;
    let shared_env = Arc::new(Environment::new(Arc::new(gateway)));

    match matches.subcommand() {
        Some(("playlist", playlist_matches)) => match playlist_matches.subcommand() {
            Some(("list", _)) => run_playlist_list(shared_env).await,
            Some(("play", play_matches)) => {
                let entry_id = play_matches
                    .get_one::<String>(ENTRY_ID_ARG)
                    .expect(ENTRY_ID_ARG)
                    .parse()
                    .expect(ENTRY_ID_ARG);
                run_playlist_play(shared_env, entry_id).await
            }
            Some(("watch", _)) => run_playlist_watch(shared_env).await,
            _ => unreachable!("unknown playlist subcommand"),
        },
        Some(("admin", admin_matches)) => {
            if !passcode_accepted(&matches) {
                eprintln!("{INCORRECT_PASSCODE_MESSAGE}");
                return Ok(ExitCode::FAILURE);
            }
            match admin_matches.subcommand() {
                Some(("add", add_matches)) => {
                    let title = add_matches.get_one::<String>(TITLE_ARG).expect(TITLE_ARG);
                    let url = add_matches.get_one::<String>(URL_ARG).expect(URL_ARG);
                    run_admin_add(shared_env, Submission::new(title, url)).await
                }
                Some(("remove", remove_matches)) => {
                    let entry_id = remove_matches
                        .get_one::<String>(ENTRY_ID_ARG)
                        .expect(ENTRY_ID_ARG)
                        .parse()
                        .expect(ENTRY_ID_ARG);
                    run_admin_remove(shared_env, entry_id).await
                }
                Some(("watch", _)) => run_admin_watch(shared_env).await,
                _ => unreachable!("unknown admin subcommand"),
            }
        }
        _ => unreachable!("unknown subcommand"),
    }
}

/// Resolves the connection settings, command-line arguments take
/// precedence over the environment.
fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let service_url_arg = matches.get_one::<String>(SERVICE_URL_ARG);
    let api_key_arg = matches.get_one::<String>(API_KEY_ARG);
    if service_url_arg.is_none() && api_key_arg.is_none() {
        return Config::from_env();
    }
    let service_url = match service_url_arg {
        Some(input) => input.clone(),
        None => env::var(SERVICE_URL_ENV).with_context(|| {
            format!("missing service endpoint URL (--{SERVICE_URL_ARG} or {SERVICE_URL_ENV})")
        })?,
    };
    let service_url = service_url
        .parse()
        .with_context(|| format!("invalid service endpoint URL \"{service_url}\""))?;
    let api_key = match api_key_arg {
        Some(input) => input.clone(),
        None => env::var(API_KEY_ENV).with_context(|| {
            format!("missing public API key (--{API_KEY_ARG} or {API_KEY_ENV})")
        })?,
    };
    Ok(Config {
        service_url,
        api_key,
    })
}

/// Compares the shared admin passcode.
///
/// A deterrent against casual misuse, not an authentication scheme. The
/// shared secret travels in plain sight and anyone with the API key
/// could bypass the client altogether.
fn passcode_accepted(matches: &ArgMatches) -> bool {
    let Ok(expected) = env::var(PASSCODE_ENV) else {
        log::warn!("No admin passcode configured ({PASSCODE_ENV}), admin commands are ungated");
        return true;
    };
    matches
        .get_one::<String>(PASSCODE_ARG)
        .is_some_and(|passcode| passcode == &expected)
}

fn print_entries(entries: &[PlaylistEntry]) {
    if entries.is_empty() {
        println!("The playlist is empty.");
        return;
    }
    for (position, entry) in entries.iter().enumerate() {
        let PlaylistEntry {
            id,
            title,
            url,
            created_at,
        } = entry;
        println!(
            "{position:>3}. [{id}] {title} <{url}> added {created_at}",
            position = position + 1
        );
    }
}

fn spawn_ctrl_c_terminator<I, E>(
    message_tx: tubelist_client::prelude::MessageSender<I, E>,
    terminate_intent: I,
) where
    I: std::fmt::Debug + Send + 'static,
    E: std::fmt::Debug + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("Failed to receive Ctrl-C/SIGINT signal: {err}");
        }
        log::info!("Terminating after receiving Ctrl-C/SIGINT...");
        send_message(&message_tx, Message::Intent(terminate_intent));
    });
}

async fn run_playlist_list(shared_env: Arc<Environment>) -> anyhow::Result<ExitCode> {
    let (message_tx, message_rx) = message_channel();
    send_message(&message_tx, Message::Intent(playlist::Intent::FetchEntries));
    let mut finished = false;
    let final_state = message_loop(
        shared_env,
        (message_tx, message_rx),
        playlist::State::default(),
        Box::new(move |state: &playlist::State| {
            if finished {
                return None;
            }
            if let Some(message) = state.last_failure() {
                eprintln!("{message}");
                finished = true;
                return Some(playlist::Intent::Terminate);
            }
            if let Some(entries) = state.entries() {
                print_entries(entries);
                finished = true;
                return Some(playlist::Intent::Terminate);
            }
            None
        }),
    )
    .await;
    if final_state.last_failure().is_some() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_playlist_play(
    shared_env: Arc<Environment>,
    entry_id: EntryId,
) -> anyhow::Result<ExitCode> {
    let (message_tx, message_rx) = message_channel();
    send_message(&message_tx, Message::Intent(playlist::Intent::FetchEntries));
    let mut selection_submitted = false;
    let mut finished = false;
    let selected_entry_id = entry_id.clone();
    let final_state = message_loop(
        shared_env,
        (message_tx, message_rx),
        playlist::State::default(),
        Box::new(move |state: &playlist::State| {
            if finished {
                return None;
            }
            if let Some(message) = state.last_failure() {
                eprintln!("{message}");
                finished = true;
                return Some(playlist::Intent::Terminate);
            }
            if state.entries().is_none() {
                return None;
            }
            if !selection_submitted {
                selection_submitted = true;
                return Some(playlist::Intent::SelectEntry(selected_entry_id.clone()));
            }
            finished = true;
            match state.view_mode() {
                playlist::ViewMode::Player(video_id) => {
                    println!("{embed_url}", embed_url = video_id.embed_url());
                }
                _ => {
                    eprintln!("Cannot play entry {selected_entry_id}.");
                }
            }
            Some(playlist::Intent::Terminate)
        }),
    )
    .await;
    if matches!(final_state.view_mode(), playlist::ViewMode::Player(_)) {
        return Ok(ExitCode::SUCCESS);
    }
    Ok(ExitCode::FAILURE)
}

async fn run_playlist_watch(shared_env: Arc<Environment>) -> anyhow::Result<ExitCode> {
    let (message_tx, message_rx) = message_channel();
    let subscription = shared_env.gateway().subscribe_changes().await?;
    tokio::spawn(emit_change_intents(subscription, message_tx.clone(), |_| {
        playlist::Intent::ChangesOccurred
    }));
    spawn_ctrl_c_terminator(message_tx.clone(), playlist::Intent::Terminate);
    send_message(&message_tx, Message::Intent(playlist::Intent::FetchEntries));
    message_loop(
        shared_env,
        (message_tx, message_rx),
        playlist::State::default(),
        Box::new(|state: &playlist::State| {
            if let Some(message) = state.last_failure() {
                eprintln!("{message}");
            } else if state.remote().entries().is_ready() {
                print_entries(state.entries().unwrap_or_default());
            }
            None
        }),
    )
    .await;
    Ok(ExitCode::SUCCESS)
}

async fn run_admin_add(
    shared_env: Arc<Environment>,
    submission: Submission,
) -> anyhow::Result<ExitCode> {
    let (message_tx, message_rx) = message_channel();
    send_message(&message_tx, Message::Intent(roster::Intent::AddEntry(submission)));
    let mut finished = false;
    let final_state = message_loop(
        shared_env,
        (message_tx, message_rx),
        roster::State::default(),
        Box::new(move |state: &roster::State| {
            if finished {
                return None;
            }
            if let Some(feedback) = state.feedback() {
                println!("{message}", message = feedback.message());
                finished = true;
                return Some(roster::Intent::Terminate);
            }
            None
        }),
    )
    .await;
    if final_state.feedback() == Some(roster::Feedback::Added) {
        return Ok(ExitCode::SUCCESS);
    }
    Ok(ExitCode::FAILURE)
}

async fn run_admin_remove(
    shared_env: Arc<Environment>,
    entry_id: EntryId,
) -> anyhow::Result<ExitCode> {
    let (message_tx, message_rx) = message_channel();
    send_message(
        &message_tx,
        Message::Intent(roster::Intent::RemoveEntry(entry_id.clone())),
    );
    let mut finished = false;
    let removed_entry_id = entry_id.clone();
    let final_state = message_loop(
        shared_env,
        (message_tx, message_rx),
        roster::State::default(),
        Box::new(move |state: &roster::State| {
            if finished {
                return None;
            }
            if let Some(feedback) = state.feedback() {
                eprintln!("{message}", message = feedback.message());
                finished = true;
                return Some(roster::Intent::Terminate);
            }
            if !state.is_removal_pending(&removed_entry_id) {
                log::info!("Removed entry {removed_entry_id}");
                finished = true;
                return Some(roster::Intent::Terminate);
            }
            None
        }),
    )
    .await;
    if final_state.feedback().is_some() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_admin_watch(shared_env: Arc<Environment>) -> anyhow::Result<ExitCode> {
    let (message_tx, message_rx) = message_channel();
    let subscription = shared_env.gateway().subscribe_changes().await?;
    tokio::spawn(emit_change_intents(subscription, message_tx.clone(), |_| {
        roster::Intent::ChangesOccurred
    }));
    spawn_ctrl_c_terminator(message_tx.clone(), roster::Intent::Terminate);
    send_message(&message_tx, Message::Intent(roster::Intent::FetchEntries));
    message_loop(
        shared_env,
        (message_tx, message_rx),
        roster::State::default(),
        Box::new(|state: &roster::State| {
            if let Some(message) = state.last_failure() {
                eprintln!("{message}");
            } else if state.remote().entries().is_ready() {
                print_entries(state.entries().unwrap_or_default());
            }
            if let Some(feedback) = state.feedback() {
                println!("{message}", message = feedback.message());
            }
            None
        }),
    )
    .await;
    Ok(ExitCode::SUCCESS)
}
