use std::sync::mpsc;

use bevy::asset::RenderAssetUsages;
use bevy::image::ImageSampler;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use bevy::window::PrimaryWindow;

use crate::render::RgbImage;

use super::sink::SharedFrameState;

const WINDOW_WIDTH: f32 = 768.0;
const WINDOW_HEIGHT: f32 = 768.0;
const WINDOW_TITLE: &str = "MAGE";

#[derive(Resource)]
struct ViewerState {
    shared: SharedFrameState,
}

#[derive(Resource)]
struct ReadySignal {
    sender: Option<mpsc::Sender<()>>,
}

#[derive(Resource)]
struct FrameTexture {
    handle: Handle<Image>,
    last_sequence: u64,
    finished: bool,
}

#[derive(Component)]
struct ViewerFrame;

/// Open a window showing the latest published frame. Blocks until the window is closed.
///
/// `ready_tx` fires once the window is set up so the simulation thread can start.
pub fn run_viewer(shared: SharedFrameState, ready_tx: mpsc::Sender<()>) {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: WINDOW_TITLE.to_string(),
                resolution: (WINDOW_WIDTH as u32, WINDOW_HEIGHT as u32).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.15)))
        .insert_resource(ViewerState {
            shared: shared.clone(),
        })
        .insert_resource(ReadySignal {
            sender: Some(ready_tx),
        })
        .add_systems(Startup, setup)
        .add_systems(Update, update_frame)
        .run();

    if let Ok(mut state) = shared.lock() {
        state.viewer_closed = true;
    }
    tracing::info!("Viewer closed");
}

fn setup(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    mut ready_signal: ResMut<ReadySignal>,
) {
    commands.spawn(Camera2d);

    let handle = images.add(frame_image(&RgbImage::new(1, 1)));
    commands.spawn((
        Sprite {
            image: handle.clone(),
            custom_size: Some(Vec2::new(WINDOW_WIDTH, WINDOW_HEIGHT)),
            ..default()
        },
        Transform::default(),
        ViewerFrame,
    ));
    commands.insert_resource(FrameTexture {
        handle,
        last_sequence: 0,
        finished: false,
    });

    if let Some(sender) = ready_signal.sender.take() {
        let _ = sender.send(());
        tracing::info!("Viewer ready, signaling simulation thread to start...");
    }
}

fn update_frame(
    viewer: Res<ViewerState>,
    texture: Option<ResMut<FrameTexture>>,
    mut images: ResMut<Assets<Image>>,
    mut sprites: Query<&mut Sprite, With<ViewerFrame>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Some(mut texture) = texture else {
        return;
    };

    // Clone the snapshot so the lock is released before touching GPU assets
    let (snapshot, finished) = {
        let Ok(shared) = viewer.shared.lock() else {
            return;
        };
        match &shared.latest {
            Some(snapshot)
                if snapshot.sequence != texture.last_sequence
                    || shared.producer_closed != texture.finished =>
            {
                (snapshot.clone(), shared.producer_closed)
            }
            _ => return,
        }
    };
    texture.last_sequence = snapshot.sequence;
    texture.finished = finished;

    if let Some(image) = images.get_mut(&texture.handle) {
        *image = frame_image(&snapshot.frame);
    }

    let (width, height) = (snapshot.frame.width() as f32, snapshot.frame.height() as f32);
    let scale = (WINDOW_WIDTH / width).min(WINDOW_HEIGHT / height) * 0.95;
    for mut sprite in &mut sprites {
        sprite.custom_size = Some(Vec2::new(width * scale, height * scale));
    }

    if let Ok(mut window) = windows.single_mut() {
        let mut title = match &snapshot.caption {
            Some(caption) => format!("{} - {}", WINDOW_TITLE, caption),
            None => WINDOW_TITLE.to_string(),
        };
        if finished {
            title.push_str(" (finished)");
        }
        window.title = title;
    }
}

fn frame_image(frame: &RgbImage) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: frame.width(),
            height: frame.height(),
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        frame.to_rgba(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::default(),
    );
    // Keep tile edges crisp when scaled up
    image.sampler = ImageSampler::nearest();
    image
}
