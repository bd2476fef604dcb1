#![allow(
    clippy::allow_attributes,
    reason = "allow attributes are needed for wasm"
)]

use bevy::asset::{AssetMetaCheck, AssetMode, AssetPlugin};
use bevy::prelude::*;
use bevy::render::RenderPlugin;
use bevy::render::settings::{
    Backends, PowerPreference, RenderCreation, WgpuSettings, WgpuSettingsPriority,
};
use bevy::window::{PresentMode, WindowMode, WindowResolution};

use crate::{HostCommunicationPlugin, RibbitMessageHandler};

#[cfg(not(target_arch = "wasm32"))]
pub const FONT: &str = "../../bits_helpers/assets/fonts/FiraSans-Bold.ttf";
#[cfg(target_arch = "wasm32")]
pub const FONT: &str = concat!(
    "../../bits_helpers-",
    env!("CARGO_PKG_VERSION"),
    "/assets/fonts/FiraSans-Bold.ttf"
);

// portrait phone, 9:16
pub const WINDOW_WIDTH: f32 = 360.0;
pub const WINDOW_HEIGHT: f32 = 640.0;

/// Largest surface wgpu accepts on the browser backends
#[cfg(target_arch = "wasm32")]
const MAX_SURFACE_EXTENT: f32 = 2048.0;

/// Builds the app every bit shares: windowing, rendering, asset paths, frame pacing
/// and the host message bridge.
pub fn get_default_app<T: RibbitMessageHandler>(bit_name: &str, bit_version: &str) -> App {
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(asset_plugin(bit_name, bit_version))
            .set(window_plugin(bit_name))
            .set(render_plugin()),
    )
    // keeps mobile batteries alive
    .add_plugins(bevy_framepace::FramepacePlugin)
    .add_plugins(HostCommunicationPlugin::<T>::default())
    .insert_resource(ClearColor(Color::BLACK));

    #[cfg(target_arch = "wasm32")]
    app.add_systems(PreUpdate, follow_browser_size);

    app
}

#[allow(unused_variables, reason = "bit_name and bit_version are used in wasm")]
fn asset_plugin(bit_name: &str, bit_version: &str) -> AssetPlugin {
    AssetPlugin {
        mode: AssetMode::Unprocessed,
        #[cfg(not(target_arch = "wasm32"))]
        file_path: "assets".to_owned(),
        #[cfg(target_arch = "wasm32")]
        file_path: format!("bits/{bit_name}-{bit_version}/assets"),
        processed_file_path: "imported_assets/Default".to_owned(),
        watch_for_changes_override: None,
        meta_check: AssetMetaCheck::Never,
    }
}

fn window_plugin(bit_name: &str) -> WindowPlugin {
    WindowPlugin {
        primary_window: Some(Window {
            title: bit_name.to_owned(),
            present_mode: PresentMode::Fifo,
            resolution: WindowResolution::new(WINDOW_WIDTH, WINDOW_HEIGHT),
            canvas: Some("#bit".into()),
            fit_canvas_to_parent: true,
            mode: WindowMode::Windowed,
            // leave F5, Ctrl+R and friends to the browser
            prevent_default_event_handling: false,
            ..default()
        }),
        ..default()
    }
}

fn render_plugin() -> RenderPlugin {
    RenderPlugin {
        render_creation: RenderCreation::Automatic(WgpuSettings {
            backends: Some(Backends::BROWSER_WEBGPU | Backends::GL),
            power_preference: PowerPreference::HighPerformance,
            priority: WgpuSettingsPriority::Functionality,
            ..default()
        }),
        ..default()
    }
}

/// Resizes the primary window to the browser's inner size, clamped to what the surface supports.
#[cfg(target_arch = "wasm32")]
fn follow_browser_size(mut windows: Query<&mut Window, With<bevy::window::PrimaryWindow>>) {
    let Some((width, height)) = browser_inner_size() else {
        return;
    };
    let width = width.min(MAX_SURFACE_EXTENT);
    let height = height.min(MAX_SURFACE_EXTENT);

    for mut window in &mut windows {
        if (window.resolution.width() - width).abs() > f32::EPSILON
            || (window.resolution.height() - height).abs() > f32::EPSILON
        {
            window.resolution.set(width, height);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_inner_size() -> Option<(f32, f32)> {
    let browser = web_sys::window()?;
    let width = browser.inner_width().ok()?.as_f64()?;
    let height = browser.inner_height().ok()?.as_f64()?;
    Some((width as f32, height as f32))
}
