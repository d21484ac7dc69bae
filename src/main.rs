use anyhow::{bail, Context};
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::Parser;
use shatterchess::core::{
    default_settings_path, load_settings, save_settings, Cli, CorePlugin, FatalReport,
};
use shatterchess::engine::EngineSession;
use shatterchess::game::GamePlugin;
use shatterchess::rendering::RenderingPlugin;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings_path = cli.settings.clone().unwrap_or_else(default_settings_path);
    let mut settings = load_settings(&settings_path);
    cli.apply(&mut settings);

    if cli.save_settings {
        save_settings(&settings_path, &settings)
            .with_context(|| format!("failed to save settings to {}", settings_path.display()))?;
    }

    let window = Window {
        title: "ShatterChess".to_string(),
        ..default()
    };
    let log = LogPlugin {
        filter: settings.log_filter.clone(),
        ..default()
    };

    // DefaultPlugins installs the log subscriber, so the engine handshake is
    // logged; the window only opens once the app runs
    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(window),
                ..default()
            })
            .set(log),
    );

    // Refuse to open a window without an engine to play against
    let engine = EngineSession::start(
        &settings.engine_command,
        &settings.engine_args,
        settings.difficulty,
    )
    .with_context(|| format!("could not start engine '{}'", settings.engine_command))?;

    let report = FatalReport::default();
    let exit = app
        .insert_resource(settings)
        .insert_resource(engine)
        .insert_resource(report.clone())
        .add_plugins(CorePlugin)
        .add_plugins(GamePlugin)
        .add_plugins(RenderingPlugin)
        .run();

    if exit.is_error() {
        match report.message() {
            Some(message) => bail!("game ended after a fatal error: {message}"),
            None => bail!("game ended with an error exit"),
        }
    }
    Ok(())
}
