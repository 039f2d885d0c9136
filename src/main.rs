use std::{path::PathBuf, rc::Rc};

use post_apocalypse::{
    config::{SceneConfig, DEFAULT_CONFIG_PATH},
    logging,
    renderer::{
        drawable::{Drawable, MeshDrawable},
        program::RecordingProgram,
    },
    resource_system::store::AssetStore,
    scene::{self, Scene},
    sim::{camera::Camera, frame::FrameClock, input::InputState},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = SceneConfig::load(&config_path)?;

    let mut store = AssetStore::new();
    let models = scene::load_assets(&config, &mut store, &config.import_options())?;
    let mut drawables = vec![];
    let mut scene = Scene::from_config(&config, &store, &models, |_, model| {
        let drawable = Rc::new(MeshDrawable::from_model(model));
        drawables.push(drawable.clone());
        drawable as Rc<dyn Drawable>
    })?;

    let mut camera = Camera::new(config.camera.position.into());
    camera.movement_speed = config.camera.movement_speed;
    camera.mouse_sensitivity = config.camera.sensitivity;
    let mut input = InputState::default();
    let mut clock = FrameClock::new();
    let mut program = RecordingProgram::new("skinned");

    // update strictly before draw, one frame at a time
    for i in 0..config.frames {
        let frame = clock.tick(f64::from(i) * f64::from(config.fixed_delta));
        if camera.apply_input(&mut input, frame.delta_time) {
            log::info!("exit requested at frame {}", frame.frame_index);
            break;
        }
        let frame = frame.with_camera(&camera, config.aspect);
        scene.update(&frame, &store);
        scene.draw(&frame, &mut program, config.max_bones)?;
    }

    log::info!(
        "ran {} frames: {} draws, {} indices, {} uniform writes",
        clock.frames(),
        drawables.iter().map(|d| d.draws()).sum::<usize>(),
        drawables.iter().map(|d| d.indices_drawn()).sum::<usize>(),
        program.writes()
    );
    log::info!(
        "{} vertex bytes buffered",
        drawables.iter().map(|d| d.vertex_bytes()).sum::<usize>()
    );
    for character in &scene.characters {
        log::info!(
            "{}: clip time {:.3}, {} bone matrices",
            character.name,
            character.animator.current_time(),
            character.animator.final_bone_matrices().len()
        );
    }
    Ok(())
}
