//! SoundRecorder CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sound_recorder::cli::{
    app::{load_merged_config, run_record, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    devices_cmd::handle_devices,
    library_cmd::{handle_delete, handle_export, handle_list, handle_rename},
    presenter::Presenter,
};
use sound_recorder::infrastructure::{CpalDeviceProvider, FsRecordingStore, XdgConfigStore};

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("sound_recorder=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let presenter = Presenter::new();
    let config_store = XdgConfigStore::new();
    let config = load_merged_config(&config_store).await;
    let library = FsRecordingStore::new(config.recordings_dir_or_default());
    let devices = CpalDeviceProvider::new();

    let result = match cli.command {
        Commands::Record(args) => return run_record(args, &config_store, &library, &devices).await,
        Commands::Config { action } => handle_config_command(action, &config_store, &presenter)
            .await
            .map_err(|e| e.to_string()),
        Commands::Devices { json } => {
            handle_devices(&devices, json, &presenter).map_err(|e| e.to_string())
        }
        Commands::List(args) => handle_list(args, &library, &config_store, &config, &presenter)
            .await
            .map_err(|e| e.to_string()),
        Commands::Rename { name, new_name } => handle_rename(&library, &presenter, &name, &new_name)
            .await
            .map_err(|e| e.to_string()),
        Commands::Delete { names } => handle_delete(&library, &presenter, &names)
            .await
            .map_err(|e| e.to_string()),
        Commands::Export { name, destination } => {
            handle_export(&library, &presenter, &name, &destination)
                .await
                .map_err(|e| e.to_string())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presenter.error(&e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
